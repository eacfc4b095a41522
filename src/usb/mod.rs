//! USB Device subsystem - presents the emulated mouse to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  A single HID interface carries both mouse reports:
//!
//! - Report ID 1: buttons + X/Y + wheel
//! - Report ID 2: horizontal pan
//!
//! The console task queues reports through [`hid_device::ChannelSink`];
//! the writer task drains the queue into the HID IN endpoint.

pub mod hid_device;
