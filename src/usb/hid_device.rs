//! USB HID mouse device.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one HID endpoint for the emulated mouse.

use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use hidmouse::config;
use hidmouse::hid::mouse::{ReportSink, MOTION_REPORT_SIZE, MOUSE_REPORT_DESCRIPTOR};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type MouseWriter = HidWriter<'static, UsbDriver, { config::USB_HID_MAX_PACKET }>;

static MOUSE_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// One queued report: ID plus up to a motion report's worth of payload.
#[derive(Clone, Copy, defmt::Format)]
pub struct OutboundReport {
    pub report_id: u8,
    pub len: u8,
    pub data: [u8; MOTION_REPORT_SIZE],
}

impl OutboundReport {
    fn new(report_id: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > MOTION_REPORT_SIZE {
            return None;
        }
        let mut data = [0u8; MOTION_REPORT_SIZE];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            report_id,
            len: payload.len() as u8,
            data,
        })
    }
}

pub type ReportSender =
    Sender<'static, CriticalSectionRawMutex, OutboundReport, { config::REPORT_CHANNEL_DEPTH }>;
pub type ReportReceiver =
    Receiver<'static, CriticalSectionRawMutex, OutboundReport, { config::REPORT_CHANNEL_DEPTH }>;

/// [`ReportSink`] that hands reports to the USB writer task.
///
/// Never blocks: if the writer is behind, the report is dropped.
pub struct ChannelSink {
    tx: ReportSender,
}

impl ChannelSink {
    pub fn new(tx: ReportSender) -> Self {
        Self { tx }
    }
}

impl ReportSink for ChannelSink {
    fn send_report(&mut self, report_id: u8, data: &[u8]) {
        let Some(report) = OutboundReport::new(report_id, data) else {
            warn!("report {} too long ({} bytes)", report_id, data.len());
            return;
        };
        if self.tx.try_send(report).is_err() {
            warn!("HID report channel full - dropping report {}", report_id);
        }
    }

    fn register_descriptor(&mut self, descriptor: &'static [u8]) {
        // The descriptor is baked into the HID interface by `init`.
        info!("mouse report descriptor: {} bytes", descriptor.len());
    }
}

/// Build result containing the USB device runner and the mouse writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub mouse_writer: MouseWriter,
}

/// Initialise the USB stack and create the HID mouse device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let mouse_state = MOUSE_STATE.init(State::new());
    let mouse_config = HidConfig {
        report_descriptor: MOUSE_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: config::USB_HID_MAX_PACKET as u16,
    };
    let mouse_writer = HidWriter::new(&mut builder, mouse_state, mouse_config);

    let device = builder.build();

    info!("USB HID mouse initialised");

    UsbHidDevice {
        device,
        mouse_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// HID report forwarding task - reads queued reports and writes them,
/// prefixed with their report ID, to the HID IN endpoint.
pub async fn hid_writer_task(mut mouse: MouseWriter, report_rx: ReportReceiver) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; config::USB_HID_MAX_PACKET];

    loop {
        let report = report_rx.receive().await;
        let len = usize::from(report.len);

        buf[0] = report.report_id;
        buf[1..=len].copy_from_slice(&report.data[..len]);

        if let Err(_e) = mouse.write(&buf[..=len]).await {
            warn!("USB mouse write failed (report {})", report.report_id);
        }
    }
}
