//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "hidmouse";
pub const USB_PRODUCT: &str = "HID Mouse Emulator";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

/// Largest report on the wire: report ID byte + 6-byte motion report.
pub const USB_HID_MAX_PACKET: usize = 8;

// Serial console
//
// The host drives the emulator over UARTE0 (nRF52840-DK VCOM pins):
//
//   UART RX  → P0.08
//   UART TX  → P0.06
//
// Line settings are fixed at 115200 8N1 in `main.rs`.

/// Longest accepted command line, excluding the terminator.
pub const SERIAL_LINE_MAX: usize = 32;

/// Depth of the command → USB report channel.
pub const REPORT_CHANNEL_DEPTH: usize = 16;
