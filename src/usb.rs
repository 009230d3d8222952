//! Implements the USB device and task: a boot keyboard HID interface fed by the control loop, and
//! a CDC-ACM serial port carrying the diagnostic log.
//! Mostly lifted from [embassy_usb] examples.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::config;
use crate::error::Error;
use crate::keycode::{Keycodes, NO_KEYS};
use crate::leds::{self, ReportKind};
use crate::report::{keyboard_report, HidTransport};

use defmt::{debug, info, warn};
use embassy_futures::{
    join::join4,
    select::{select, Either},
};
use embassy_rp::{
    peripherals::USB,
    usb::{Driver, InterruptHandler},
    bind_interrupts,
};
use embassy_sync::{channel::Channel, signal::Signal};
use embassy_usb::{
    class::hid::{HidReaderWriter, ReportId, RequestHandler, State as HidState},
    class::cdc_acm::{CdcAcmClass, State as CdcState},
    control::OutResponse,
    Builder, Handler, UsbDevice,
};
use heapless::String;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use static_cell::StaticCell;

type RawMutex = embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
type MyDriver = Driver<'static, USB>;
type MyUsbDevice = UsbDevice<'static, MyDriver>;
type MyHidReaderWriter = HidReaderWriter<'static, MyDriver, 1, 8>;
type MyCdcAcmClass = CdcAcmClass<'static, MyDriver>;

pub type DiagnosticLine = String<{ config::DIAGNOSTIC_LINE_CAPACITY }>;

const CDC_PACKET_SIZE: usize = 64;

/// Reports on their way to the HID writer. A full slot means the transport is busy.
static REPORTS: Channel<RawMutex, KeyboardReport, 1> = Channel::new();
static DIAGNOSTICS: Channel<RawMutex, DiagnosticLine, { config::DIAGNOSTIC_QUEUE_DEPTH }> =
    Channel::new();
static REMOTE_WAKEUP: Signal<RawMutex, ()> = Signal::new();
static CONFIGURED: AtomicBool = AtomicBool::new(false);
static SUSPENDED: AtomicBool = AtomicBool::new(false);

bind_interrupts!(pub(crate) struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

pub fn get_device(driver: MyDriver) -> (MyUsbDevice, MyHidReaderWriter, MyCdcAcmClass) {
    let mut usb_config = embassy_usb::Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    static DEVICE_HANDLER: StaticCell<MyDeviceHandler> = StaticCell::new();

    // Create embassy-usb DeviceBuilder using the driver and config.
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
    let mut builder = Builder::new(
        driver,
        usb_config,
        &mut CONFIG_DESC.init([0; 256])[..],
        &mut BOS_DESC.init([0; 256])[..],
        &mut [], // no msos descriptors
        &mut CONTROL_BUF.init([0; 128])[..],
    );

    static STATE: StaticCell<HidState> = StaticCell::new();

    builder.handler(DEVICE_HANDLER.init(MyDeviceHandler));

    let hid_config = embassy_usb::class::hid::Config {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let hid = HidReaderWriter::<_, 1, 8>::new(&mut builder, STATE.init(HidState::new()), hid_config);

    let cdc = {
        static STATE: StaticCell<CdcState> = StaticCell::new();
        let state = STATE.init(CdcState::new());
        CdcAcmClass::new(&mut builder, state, CDC_PACKET_SIZE as u16)
    };

    info!("USB device built: keyboard + diagnostic serial");

    (builder.build(), hid, cdc)
}

#[embassy_executor::task]
pub async fn run(mut usb: MyUsbDevice, hid: MyHidReaderWriter, mut cdc: MyCdcAcmClass) {
    // Run the USB device, leaving it only to service remote wakeup while suspended.
    let usb_fut = async {
        loop {
            usb.run_until_suspend().await;
            REMOTE_WAKEUP.reset();
            match select(usb.wait_resume(), REMOTE_WAKEUP.wait()).await {
                Either::First(()) => {}
                Either::Second(()) => {
                    info!("Waking host");
                    if usb.remote_wakeup().await.is_err() {
                        warn!("Remote wakeup not permitted by host");
                    }
                }
            }
        }
    };

    let (reader, mut writer) = hid.split();

    let in_fut = async {
        loop {
            let report = REPORTS.receive().await;
            if let Err(e) = writer.write_serialize(&report).await {
                warn!("Failed to send report: {}", Error::from(e));
            }
        }
    };

    let out_fut = async {
        static REQUEST_HANDLER: StaticCell<MyRequestHandler> = StaticCell::new();
        reader.run(false, REQUEST_HANDLER.init(MyRequestHandler {})).await;
    };

    let diag_fut = async {
        loop {
            cdc.wait_connection().await;
            loop {
                let line = DIAGNOSTICS.receive().await;
                if !cdc.dtr() {
                    continue;
                }
                if let Err(e) = write_line(&mut cdc, line.as_bytes()).await {
                    warn!("Diagnostic serial write failed: {}", e);
                    break;
                }
            }
        }
    };

    // Run everything concurrently.
    join4(usb_fut, in_fut, out_fut, diag_fut).await;
}

async fn write_line(cdc: &mut MyCdcAcmClass, bytes: &[u8]) -> Result<(), Error> {
    for packet in bytes.chunks(CDC_PACKET_SIZE) {
        cdc.write_packet(packet).await?;
    }
    // A full last packet needs a zero-length packet to end the transfer.
    if bytes.len() % CDC_PACKET_SIZE == 0 {
        cdc.write_packet(&[]).await?;
    }
    Ok(())
}

/// Queue one line for the diagnostic serial port. Never waits.
pub fn log(message: impl fmt::Display) -> Result<(), Error> {
    let mut line = DiagnosticLine::new();
    write!(line, "{}\r\n", message)?;
    DIAGNOSTICS.try_send(line).map_err(|_| Error::QueueFull)
}

/// The host has configured the device, so reports will reach it.
pub fn is_configured() -> bool {
    CONFIGURED.load(Ordering::Relaxed)
}

/// [HidTransport] backed by the report channel and the device handler's flags.
pub struct ChannelTransport;

impl ChannelTransport {
    fn queue(&self, report: KeyboardReport) {
        if REPORTS.try_send(report).is_err() {
            warn!("Report dropped: {}", Error::QueueFull);
        }
    }
}

impl HidTransport for ChannelTransport {
    fn ready(&mut self) -> bool {
        !REPORTS.is_full()
    }

    // The descriptor declares no report IDs, so the ID never goes on the wire.
    fn send_key_report(&mut self, _report_id: u8, modifier: u8, keycodes: Keycodes) {
        self.queue(keyboard_report(modifier, keycodes));
    }

    fn send_release(&mut self, _report_id: u8) {
        self.queue(keyboard_report(0, NO_KEYS));
    }

    fn suspended(&self) -> bool {
        SUSPENDED.load(Ordering::Relaxed)
    }

    fn remote_wakeup(&mut self) {
        REMOTE_WAKEUP.signal(());
    }
}

struct MyRequestHandler;

impl RequestHandler for MyRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let kind = match id {
            ReportId::In(_) => ReportKind::Input,
            ReportId::Out(_) => ReportKind::Output,
            ReportId::Feature(_) => ReportKind::Feature,
        };
        if let Some(leds) = leds::decode_output_report(kind, data) {
            debug!(
                "Host LEDs: num={} caps={} scroll={}",
                leds.num_lock(),
                leds.caps_lock(),
                leds.scroll_lock()
            );
        }
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _dur: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

struct MyDeviceHandler;

impl Handler for MyDeviceHandler {
    fn enabled(&mut self, enabled: bool) {
        CONFIGURED.store(false, Ordering::Relaxed);
        SUSPENDED.store(false, Ordering::Relaxed);
        if enabled {
            info!("Device enabled");
        } else {
            info!("Device disabled");
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
        info!("Bus reset");
    }

    fn addressed(&mut self, _addr: u8) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        if configured {
            info!("Device configured");
        } else {
            info!("Device no longer configured");
        }
    }

    fn suspended(&mut self, suspended: bool) {
        SUSPENDED.store(suspended, Ordering::Relaxed);
        if suspended {
            info!("Bus suspended");
        } else {
            info!("Bus resumed");
        }
    }
}
