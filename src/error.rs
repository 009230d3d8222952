//! Error type for the firmware's USB plumbing.
//!
//! The controller itself cannot fail; only getting bytes to the host can. Variants carry no data
//! so the enum stays `Copy` and cheap to log.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The endpoint is not enabled (host not connected or not configured).
    EndpointDisabled,
    /// A packet was larger than the endpoint buffer.
    BufferOverflow,
    /// A diagnostic line did not fit its fixed-size buffer.
    LineTooLong,
    /// The queue to a USB task was full and the item was dropped.
    QueueFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::EndpointDisabled => "endpoint disabled",
            Error::BufferOverflow => "endpoint buffer overflow",
            Error::LineTooLong => "diagnostic line too long",
            Error::QueueFull => "queue full",
        };
        f.write_str(msg)
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::LineTooLong
    }
}

#[cfg(feature = "build-binary")]
impl From<embassy_usb::driver::EndpointError> for Error {
    fn from(e: embassy_usb::driver::EndpointError) -> Self {
        match e {
            embassy_usb::driver::EndpointError::BufferOverflow => Error::BufferOverflow,
            embassy_usb::driver::EndpointError::Disabled => Error::EndpointDisabled,
        }
    }
}
