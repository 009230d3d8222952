//! The keystroke controller: a timed three-state machine deciding, once per tick, which key (if
//! any) the host should see pressed.
//!
//! ```text
//!            start            slides left: PageDown
//!   Init ───────────▶ Start ─────────────────────────▶ Hold
//!    ▲      (T)        │ ▲                               │
//!    │                 │ └────── now >= timeout ─────────┘
//!    └──── no slides ──┘
//!           (End)
//! ```
//!
//! Reset overrides everything: whatever the state, a pressed reset line sends the controller back
//! to `Init` and makes `Home` the key for that tick.

use crate::config::{
    BOOT_SLIDES, BOOT_WAIT_SECONDS, SLIDES_PER_RUN, WAIT_SECONDS_FAST, WAIT_SECONDS_NORMAL,
};
use crate::keycode::{KeyCode, Keycodes, NO_KEYS};
use crate::sample::Inputs;
use core::fmt;

/// Keys placed in the first three slots when reset is pressed. Only the first one is ever
/// transmitted, see [crate::report::ReportEmitter::emit].
const RESET_KEYS: [KeyCode; 3] = [KeyCode::Home, KeyCode::R, KeyCode::T];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Idle. Pacing is (re)configured every tick until a run is started.
    #[default]
    Init,
    /// A slide advance, or the end of the run, is due.
    Start,
    /// Waiting for the pacing deadline.
    Hold,
}

impl State {
    pub const fn name(self) -> &'static str {
        match self {
            State::Init => "Init",
            State::Start => "Start",
            State::Hold => "Hold",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All state that persists between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controller {
    state: State,
    wait_seconds: u32,
    remaining_slides: u32,
    /// Instant (ms since boot) at which `Hold` gives way to `Start`. Only written on entry to `Hold`.
    timeout: u64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub const fn new() -> Self {
        Controller {
            state: State::Init,
            wait_seconds: BOOT_WAIT_SECONDS,
            remaining_slides: BOOT_SLIDES,
            timeout: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn wait_seconds(&self) -> u32 {
        self.wait_seconds
    }

    pub fn remaining_slides(&self) -> u32 {
        self.remaining_slides
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Advance the state machine by one tick and return this tick's keycode slots.
    ///
    /// Slot 0 is the key that will be reported; it is zero when nothing should be held.
    pub fn tick(&mut self, inputs: &Inputs, now_ms: u64) -> Keycodes {
        let mut keycodes = NO_KEYS;

        if inputs.reset {
            self.state = State::Init;
            for (slot, key) in keycodes.iter_mut().zip(RESET_KEYS) {
                *slot = key.usage();
            }
        }

        match self.state {
            State::Init => {
                self.wait_seconds = if inputs.fast_mode {
                    WAIT_SECONDS_FAST
                } else {
                    WAIT_SECONDS_NORMAL
                };
                self.remaining_slides = SLIDES_PER_RUN;
                // Reset keeps slot 0 for Home, so start waits until reset is released.
                if inputs.start && !inputs.reset {
                    keycodes[0] = KeyCode::T.usage();
                    self.state = State::Start;
                }
            }
            State::Start => match self.remaining_slides.checked_sub(1) {
                Some(remaining) => {
                    self.remaining_slides = remaining;
                    self.timeout = now_ms.saturating_add(u64::from(self.wait_seconds) * 1000);
                    self.state = State::Hold;
                    keycodes[0] = KeyCode::PageDown.usage();
                }
                None => {
                    keycodes[0] = KeyCode::End.usage();
                    self.state = State::Init;
                }
            },
            State::Hold => {
                if now_ms >= self.timeout {
                    self.state = State::Start;
                }
            }
        }

        keycodes
    }

    /// Everything the diagnostic log shows about the controller at `now_ms`.
    pub fn snapshot(&self, now_ms: u64) -> Snapshot {
        Snapshot {
            now_ms,
            state: self.state,
            wait_seconds: self.wait_seconds,
            remaining_slides: self.remaining_slides,
            timeout: self.timeout,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub now_ms: u64,
    pub state: State,
    pub wait_seconds: u32,
    pub remaining_slides: u32,
    pub timeout: u64,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "now:{}, state:{}, wait:{}, slides:{}, timeout:{}",
            self.now_ms, self.state, self.wait_seconds, self.remaining_slides, self.timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Inputs = Inputs { fast_mode: false, reserved: false, start: false, reset: false };
    const START: Inputs = Inputs { fast_mode: false, reserved: false, start: true, reset: false };
    const RESET: Inputs = Inputs { fast_mode: false, reserved: false, start: false, reset: true };

    fn at(state: State, wait_seconds: u32, remaining_slides: u32, timeout: u64) -> Controller {
        Controller { state, wait_seconds, remaining_slides, timeout }
    }

    fn all_inputs() -> impl Iterator<Item = Inputs> {
        (0u8..16).map(|bits| Inputs {
            fast_mode: bits & 1 != 0,
            reserved: bits & 2 != 0,
            start: bits & 4 != 0,
            reset: bits & 8 != 0,
        })
    }

    #[test]
    fn boots_idle_with_boot_pacing() {
        let controller = Controller::new();
        assert_eq!(controller.state(), State::Init);
        assert_eq!(controller.wait_seconds(), 100);
        assert_eq!(controller.remaining_slides(), 10);
        assert_eq!(controller.timeout(), 0);
    }

    #[test]
    fn start_sends_t_and_arms_run() {
        let mut controller = at(State::Init, 100, 5, 0);
        let keys = controller.tick(&Inputs::from([false, false, true, false]), 0);
        assert_eq!(keys[0], KeyCode::T.usage());
        assert_eq!(controller.state(), State::Start);
        assert_eq!(controller.remaining_slides(), 5);
    }

    #[test]
    fn idle_without_start_sends_nothing() {
        let mut controller = Controller::new();
        assert_eq!(controller.tick(&IDLE, 10), NO_KEYS);
        assert_eq!(controller.state(), State::Init);
        assert_eq!(controller.remaining_slides(), 5);
    }

    #[test]
    fn fast_mode_selects_short_wait() {
        let mut controller = Controller::new();
        controller.tick(&Inputs { fast_mode: true, ..IDLE }, 0);
        assert_eq!(controller.wait_seconds(), 5);
    }

    #[test]
    fn normal_mode_selects_long_wait() {
        let mut controller = at(State::Init, 5, 0, 0);
        controller.tick(&IDLE, 0);
        assert_eq!(controller.wait_seconds(), 100);
    }

    #[test]
    fn fast_mode_is_only_read_while_idle() {
        let mut controller = at(State::Start, 100, 3, 0);
        controller.tick(&Inputs { fast_mode: true, ..IDLE }, 1_000);
        assert_eq!(controller.wait_seconds(), 100);
        assert_eq!(controller.timeout(), 101_000);
    }

    #[test]
    fn start_advances_slide_and_sets_deadline() {
        let mut controller = at(State::Start, 5, 3, 0);
        let keys = controller.tick(&IDLE, 1_234);
        assert_eq!(keys[0], KeyCode::PageDown.usage());
        assert_eq!(controller.state(), State::Hold);
        assert_eq!(controller.remaining_slides(), 2);
        assert_eq!(controller.timeout(), 6_234);
    }

    #[test]
    fn start_without_slides_sends_end() {
        let mut controller = at(State::Start, 5, 0, 42);
        let keys = controller.tick(&IDLE, 50_000);
        assert_eq!(keys[0], KeyCode::End.usage());
        assert_eq!(controller.state(), State::Init);
        assert_eq!(controller.remaining_slides(), 0);
        assert_eq!(controller.timeout(), 42);
    }

    #[test]
    fn hold_boundary() {
        let mut controller = at(State::Hold, 5, 2, 10_000);
        assert_eq!(controller.tick(&IDLE, 9_999), NO_KEYS);
        assert_eq!(controller.state(), State::Hold);
        assert_eq!(controller.tick(&IDLE, 10_000), NO_KEYS);
        assert_eq!(controller.state(), State::Start);
    }

    #[test]
    fn start_is_ignored_outside_init() {
        let mut controller = at(State::Hold, 5, 2, 10_000);
        assert_eq!(controller.tick(&START, 500), NO_KEYS);
        assert_eq!(controller.state(), State::Hold);
    }

    #[test]
    fn countdown_ends_after_exactly_n_cycles() {
        for n in 1..=5u32 {
            let mut controller = at(State::Start, 5, n, 0);
            let mut now = 0;
            let mut page_downs = 0;
            loop {
                let keys = controller.tick(&IDLE, now);
                if keys[0] == KeyCode::End.usage() {
                    break;
                }
                if keys[0] == KeyCode::PageDown.usage() {
                    page_downs += 1;
                    now = controller.timeout();
                    controller.tick(&IDLE, now);
                    assert_eq!(controller.state(), State::Start);
                }
                assert!(page_downs <= n);
            }
            assert_eq!(page_downs, n);
            assert_eq!(controller.state(), State::Init);
        }
    }

    #[test]
    fn reset_overrides_every_state_and_input() {
        let states = [
            at(State::Init, 5, 5, 0),
            at(State::Start, 100, 3, 0),
            at(State::Start, 100, 0, 0),
            at(State::Hold, 100, 1, 500_000),
            at(State::Hold, 5, 4, 0),
        ];
        for start in states.iter() {
            for inputs in all_inputs().filter(|inputs| inputs.reset) {
                let mut controller = start.clone();
                let keys = controller.tick(&inputs, 1_000);
                assert_eq!(keys[0], KeyCode::Home.usage());
                assert_eq!(controller.state(), State::Init);
                assert_eq!(controller.remaining_slides(), 5);
            }
        }
    }

    #[test]
    fn reset_fills_home_r_t() {
        let mut controller = at(State::Hold, 100, 3, 9_999_999);
        let keys = controller.tick(&RESET, 0);
        assert_eq!(
            keys,
            [KeyCode::Home.usage(), KeyCode::R.usage(), KeyCode::T.usage(), 0, 0, 0]
        );
    }

    #[test]
    fn reset_still_reads_fast_mode() {
        let mut controller = at(State::Hold, 100, 3, 0);
        controller.tick(&Inputs { fast_mode: true, ..RESET }, 0);
        assert_eq!(controller.wait_seconds(), 5);
    }

    #[test]
    fn run_starts_once_reset_is_released() {
        let mut controller = Controller::new();
        controller.tick(&Inputs { start: true, ..RESET }, 0);
        assert_eq!(controller.state(), State::Init);
        let keys = controller.tick(&START, 2);
        assert_eq!(keys[0], KeyCode::T.usage());
        assert_eq!(controller.state(), State::Start);
    }

    #[test]
    fn deadline_saturates() {
        let mut controller = at(State::Start, 100, 1, 0);
        controller.tick(&IDLE, u64::MAX - 10);
        assert_eq!(controller.timeout(), u64::MAX);
    }

    #[test]
    fn snapshot_formats_like_serial_log() {
        let controller = at(State::Hold, 5, 4, 7_002);
        let line = format!("{}", controller.snapshot(2_002));
        assert_eq!(line, "now:2002, state:Hold, wait:5, slides:4, timeout:7002");
    }
}
