//! Firmware for a Raspberry Pi Pico presentation clicker: a USB keyboard that advances slides on
//! its own at a configurable pace, built on the [embassy_rp] framework.

#![no_main]
#![no_std]

mod config;
mod controller;
mod error;
mod keycode;
mod leds;
mod report;
mod sample;
mod usb;

use controller::Controller;
use defmt::{info, trace, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Instant, Timer};
use error::Error;
use report::{Emission, ReportEmitter};
use sample::{sample, Inputs};

use defmt_rtt as _;
use panic_reset as _;

macro_rules! input_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(Input::new($dev.$pin, Pull::Up)),* ]}
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Order sets the role, see `config`.
    let pins: [Input; config::PIN_COUNT] = input_pins!(p; PIN_0, PIN_3, PIN_7, PIN_11);

    let usb_driver = embassy_rp::usb::Driver::new(p.USB, usb::Irqs);
    let (usb_device, hid, cdc) = usb::get_device(usb_driver);
    spawner.spawn(usb::run(usb_device, hid, cdc)).expect("spawn usb");

    spawner.spawn(run_controller(pins)).expect("spawn controller");
}

#[embassy_executor::task]
async fn run_controller(mut pins: [Input<'static>; config::PIN_COUNT]) {
    while !usb::is_configured() {
        Timer::after_millis(config::MOUNT_POLL_MS).await;
    }
    info!("Control loop started");
    diagnostic("Alive!");

    let mut controller = Controller::new();
    let mut emitter = ReportEmitter::new();
    let mut transport = usb::ChannelTransport;

    loop {
        Timer::after_millis(config::POLL_INTERVAL_MS).await;

        let now = Instant::now().as_millis();
        let snapshot = controller.snapshot(now);
        trace!("{}", snapshot);
        diagnostic(snapshot);

        let inputs = Inputs::from(sample(&mut pins));
        let keycodes = controller.tick(&inputs, now);
        match emitter.emit(&mut transport, &keycodes, inputs.pressed_count()) {
            Emission::Pressed(key) => info!("Key {=u8:#x} down ({})", key, controller.state()),
            Emission::Released => trace!("Keys released"),
            Emission::Skipped | Emission::Idle => {}
        }
    }
}

/// Best effort: a full queue just means nobody is reading fast enough.
fn diagnostic(message: impl core::fmt::Display) {
    match usb::log(message) {
        Ok(()) | Err(Error::QueueFull) => {}
        Err(e) => warn!("Diagnostic line dropped: {}", e),
    }
}
