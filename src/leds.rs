//! Host-to-device keyboard LED state (boot protocol output report).
//!
//! The firmware only reports what the host says; no LED is driven from it.

/// Direction/kind of a HID report delivered to the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

/// Bitmap in the first byte of the keyboard output report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardLeds(u8);

impl KeyboardLeds {
    const NUM_LOCK: u8 = 1 << 0;
    const CAPS_LOCK: u8 = 1 << 1;
    const SCROLL_LOCK: u8 = 1 << 2;
    const COMPOSE: u8 = 1 << 3;
    const KANA: u8 = 1 << 4;

    pub const fn from_bits(bits: u8) -> Self {
        KeyboardLeds(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn num_lock(self) -> bool {
        self.0 & Self::NUM_LOCK != 0
    }

    pub const fn caps_lock(self) -> bool {
        self.0 & Self::CAPS_LOCK != 0
    }

    pub const fn scroll_lock(self) -> bool {
        self.0 & Self::SCROLL_LOCK != 0
    }

    pub const fn compose(self) -> bool {
        self.0 & Self::COMPOSE != 0
    }

    pub const fn kana(self) -> bool {
        self.0 & Self::KANA != 0
    }
}

/// Pull the LED bitmap out of a report sent by the host. Anything that is not a non-empty output
/// report is ignored.
pub fn decode_output_report(kind: ReportKind, data: &[u8]) -> Option<KeyboardLeds> {
    if kind != ReportKind::Output {
        return None;
    }
    data.first().copied().map(KeyboardLeds::from_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_lock_only() {
        let leds = decode_output_report(ReportKind::Output, &[0b0000_0010]).unwrap();
        assert!(leds.caps_lock());
        assert!(!leds.num_lock());
        assert!(!leds.scroll_lock());
        assert!(!leds.compose());
        assert!(!leds.kana());
    }

    #[test]
    fn every_bit_decodes() {
        let leds = decode_output_report(ReportKind::Output, &[0x1f, 0xaa]).unwrap();
        assert_eq!(leds.bits(), 0x1f);
        assert!(leds.num_lock() && leds.caps_lock() && leds.scroll_lock());
        assert!(leds.compose() && leds.kana());
    }

    #[test]
    fn non_output_reports_ignored() {
        assert_eq!(decode_output_report(ReportKind::Feature, &[0x02]), None);
        assert_eq!(decode_output_report(ReportKind::Input, &[0x02]), None);
    }

    #[test]
    fn empty_report_ignored() {
        assert_eq!(decode_output_report(ReportKind::Output, &[]), None);
    }
}
