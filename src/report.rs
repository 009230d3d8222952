//! Turning a tick's keycodes into HID reports: press reports while a key is due, a single release
//! report afterwards, and nothing at all while the transport is busy.

use crate::config::REPORT_ID;
use crate::keycode::{Keycodes, NO_KEYS};
use usbd_hid::descriptor::KeyboardReport;

/// The USB HID side of the firmware, as seen by the emitter.
pub trait HidTransport {
    /// `false` while a previous report is still in flight.
    fn ready(&mut self) -> bool;
    fn send_key_report(&mut self, report_id: u8, modifier: u8, keycodes: Keycodes);
    fn send_release(&mut self, report_id: u8);
    /// The host has suspended the bus.
    fn suspended(&self) -> bool;
    fn remote_wakeup(&mut self);
}

/// What [ReportEmitter::emit] did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Emission {
    /// Transport busy; nothing sent, nothing recorded.
    Skipped,
    /// A press report carrying this keycode was sent.
    Pressed(u8),
    /// The all-zero report was sent.
    Released,
    /// Already released; nothing to send.
    Idle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportEmitter {
    key_pressed_previously: bool,
}

impl ReportEmitter {
    pub const fn new() -> Self {
        ReportEmitter { key_pressed_previously: false }
    }

    /// Whether the last report that went out had a key in it.
    pub fn key_pressed_previously(&self) -> bool {
        self.key_pressed_previously
    }

    /// Send whatever this tick's `keycodes` call for.
    ///
    /// Only slot 0 decides whether a key is pressed, and only slot 0 is put in the press report.
    /// `active_keys` is the number of pressed inputs; any while suspended asks the host to wake.
    pub fn emit<T: HidTransport>(
        &mut self,
        transport: &mut T,
        keycodes: &Keycodes,
        active_keys: u8,
    ) -> Emission {
        if active_keys > 0 && transport.suspended() {
            transport.remote_wakeup();
        }

        if !transport.ready() {
            return Emission::Skipped;
        }

        let key = keycodes[0];
        if key != 0 {
            let mut pressed = NO_KEYS;
            pressed[0] = key;
            self.key_pressed_previously = true;
            transport.send_key_report(REPORT_ID, 0, pressed);
            Emission::Pressed(key)
        } else if self.key_pressed_previously {
            self.key_pressed_previously = false;
            transport.send_release(REPORT_ID);
            Emission::Released
        } else {
            Emission::Idle
        }
    }
}

/// Wire form of a keyboard report. A release is `keyboard_report(0, NO_KEYS)`.
pub fn keyboard_report(modifier: u8, keycodes: Keycodes) -> KeyboardReport {
    let mut report = KeyboardReport::default();
    report.modifier = modifier;
    report.keycodes = keycodes;
    report
}
