//! Compile-time configuration: pin roles, pacing defaults and USB identity.
//!
//! Nothing here is read at runtime from anywhere else; change a constant and reflash.

// Inputs
//
// All inputs are active-low with the internal pull-up enabled, wired in `main.rs`:
//
//   index 0  GPIO0   fast mode (short pacing if held while idle)
//   index 1  GPIO3   reserved, sampled but unused by the controller
//   index 2  GPIO7   start a presentation run
//   index 3  GPIO11  reset to the first slide

/// Number of sampled input lines.
pub const PIN_COUNT: usize = 4;

/// Delay between two polling ticks (ms). Also bounds the effective debounce.
pub const POLL_INTERVAL_MS: u64 = 2;

/// Pacing delay before the first pass through `Init` (seconds).
pub const BOOT_WAIT_SECONDS: u32 = 100;
/// Slide count before the first pass through `Init`.
pub const BOOT_SLIDES: u32 = 10;

/// Pacing delay between slide advances (seconds).
pub const WAIT_SECONDS_NORMAL: u32 = 100;
/// Pacing delay when the fast-mode input is held while idle (seconds).
pub const WAIT_SECONDS_FAST: u32 = 5;
/// Slides advanced per run before `End` is sent.
pub const SLIDES_PER_RUN: u32 = 5;

// USB

/// HID report ID. The keyboard descriptor has no report IDs, so always 0.
pub const REPORT_ID: u8 = 0;

pub const USB_VID: u16 = 0xfeed;
pub const USB_PID: u16 = 0x51de;
pub const USB_MANUFACTURER: &str = "Tom's";
pub const USB_PRODUCT: &str = "Pico Slide Clicker";
pub const USB_SERIAL_NUMBER: &str = "001";

/// HID endpoint polling interval requested from the host (ms).
pub const USB_HID_POLL_MS: u8 = 2;

/// Interval between checks while waiting for the host to configure the device (ms).
pub const MOUNT_POLL_MS: u64 = 1;

// Diagnostics

/// Capacity of one formatted diagnostic line sent over the CDC serial port.
pub const DIAGNOSTIC_LINE_CAPACITY: usize = 96;
/// Lines buffered for the CDC task before new ones are dropped.
pub const DIAGNOSTIC_QUEUE_DEPTH: usize = 4;
