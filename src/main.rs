//! hidmouse firmware for nRF52840.
//!
//! Enumerates as a USB HID relative mouse and takes its orders from a host
//! over the UART console (see `hidmouse::command` for the line protocol).
//!
//! Tasks:
//! - `usb_task`: runs the USB device stack.
//! - `hid_writer`: drains queued reports into the HID endpoint.
//! - `console`: reads command lines and drives the [`MouseEmulator`].

#![no_std]
#![no_main]

mod usb;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_nrf::{bind_interrupts, pac, peripherals, uarte};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use hidmouse::command::{Command, LineBuffer};
use hidmouse::config;
use hidmouse::hid::MouseEmulator;
use usb::hid_device::{self, ChannelSink, MouseWriter, OutboundReport, UsbDriver};
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

static REPORT_CHANNEL: Channel<
    CriticalSectionRawMutex,
    OutboundReport,
    { config::REPORT_CHANNEL_DEPTH },
> = Channel::new();

#[embassy_executor::task]
async fn usb_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_writer(writer: MouseWriter) -> ! {
    hid_device::hid_writer_task(writer, REPORT_CHANNEL.receiver()).await
}

#[embassy_executor::task]
async fn console(mut rx: uarte::UarteRx<'static, peripherals::UARTE0>) -> ! {
    let mut mouse = MouseEmulator::new(ChannelSink::new(REPORT_CHANNEL.sender()));
    let mut lines: LineBuffer<{ config::SERIAL_LINE_MAX }> = LineBuffer::new();
    let mut byte = [0u8; 1];

    info!("console ready");

    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("UART read failed: {}", e);
            lines.clear();
            continue;
        }

        let line = match lines.push(byte[0]) {
            None => continue,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("dropping console line: {}", e);
                continue;
            }
        };

        match Command::parse(&line) {
            Ok(cmd) => {
                info!("command: {}", cmd);
                cmd.apply(&mut mouse);
            }
            Err(e) => warn!("bad command {=str}: {}", line.as_str(), e),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());

    // USB needs the external high-frequency crystal.
    pac::CLOCK.tasks_hfclkstart().write_value(1);
    while pac::CLOCK.events_hfclkstarted().read() != 1 {}

    let usb = hid_device::init(p.USBD);

    let mut uart_config = uarte::Config::default();
    uart_config.parity = uarte::Parity::EXCLUDED;
    uart_config.baudrate = uarte::Baudrate::BAUD115200;
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config);
    let (_tx, rx) = uart.split();

    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(hid_writer(usb.mouse_writer));
    spawner.must_spawn(console(rx));

    info!("hidmouse running");
}
