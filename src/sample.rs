//! Input sampling: reads every configured line once per tick and turns the active-low electrical
//! level into a "pressed" flag. No debouncing beyond the polling interval.

use crate::config::PIN_COUNT;
use embedded_hal::digital::InputPin;

/// Sample all lines in order. A line that cannot be read counts as released.
pub fn sample<P: InputPin, const N: usize>(pins: &mut [P; N]) -> [bool; N] {
    let mut pressed = [false; N];
    for (slot, pin) in pressed.iter_mut().zip(pins.iter_mut()) {
        *slot = pin.is_low().unwrap_or(false);
    }
    pressed
}

/// One tick's worth of sampled inputs, named by role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    pub fast_mode: bool,
    /// Wired and sampled, but no controller behaviour is attached to it.
    pub reserved: bool,
    pub start: bool,
    pub reset: bool,
}

impl Inputs {
    /// How many lines are currently pressed.
    pub fn pressed_count(&self) -> u8 {
        [self.fast_mode, self.reserved, self.start, self.reset]
            .iter()
            .filter(|pressed| **pressed)
            .count() as u8
    }
}

impl From<[bool; PIN_COUNT]> for Inputs {
    fn from(pressed: [bool; PIN_COUNT]) -> Self {
        let [fast_mode, reserved, start, reset] = pressed;
        Inputs { fast_mode, reserved, start, reset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    /// Electrical level of a fake pin.
    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl embedded_hal::digital::Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = Broken;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, Broken> {
            Err(Broken)
        }
        fn is_low(&mut self) -> Result<bool, Broken> {
            Err(Broken)
        }
    }

    #[test]
    fn low_level_reads_as_pressed() {
        let mut pins = [Level(true), Level(false), Level(true), Level(false)];
        assert_eq!(sample(&mut pins), [false, true, false, true]);
    }

    #[test]
    fn all_pulled_up_is_nothing_pressed() {
        let mut pins = [Level(true), Level(true), Level(true), Level(true)];
        assert_eq!(sample(&mut pins), [false; 4]);
    }

    #[test]
    fn unreadable_line_counts_as_released() {
        let mut pins = [BrokenPin, BrokenPin];
        assert_eq!(sample(&mut pins), [false, false]);
    }

    #[test]
    fn roles_follow_pin_order() {
        let inputs = Inputs::from([true, false, true, false]);
        assert!(inputs.fast_mode);
        assert!(!inputs.reserved);
        assert!(inputs.start);
        assert!(!inputs.reset);
    }

    #[test]
    fn pressed_count_includes_reserved_line() {
        assert_eq!(Inputs::default().pressed_count(), 0);
        assert_eq!(Inputs::from([false, true, false, false]).pressed_count(), 1);
        assert_eq!(Inputs::from([true, true, true, true]).pressed_count(), 4);
    }
}
