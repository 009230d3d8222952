//! This "library" build is here for running unit tests on the local arch, without depending on
//! any hardware-related stuff. (This is necessary as main.rs is inherently hardware-related code.)
//! See the `run-tests` script in the project root for more information.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod error;
pub mod keycode;
pub mod leds;
pub mod report;
pub mod sample;
