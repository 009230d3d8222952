//! The few HID Keyboard/Keypad usage codes (usage page 0x07) that the controller sends.

/// Keycode slots of one keyboard report, as laid out in the boot protocol.
pub type Keycodes = [u8; 6];

/// No key in any slot.
pub const NO_KEYS: Keycodes = [0; 6];

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyCode {
    R = 0x15,
    T = 0x17,
    Home = 0x4a,
    End = 0x4d,
    PageDown = 0x4e,
}

impl KeyCode {
    pub const fn usage(self) -> u8 {
        self as u8
    }
}

impl From<KeyCode> for u8 {
    fn from(code: KeyCode) -> u8 {
        code.usage()
    }
}
