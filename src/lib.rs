//! USB HID mouse emulator and HID mouse report parser.
//!
//! This crate holds the pure logic that can be tested on the host
//! (no embedded hardware required):
//!
//! - [`hid::mouse`]: relative mouse emulator producing report ID 1
//!   (buttons + X/Y + wheel) and report ID 2 (pan) byte buffers.
//! - [`hid::parser`]: stateful parser for reports from a physical mouse,
//!   raising edge-triggered button, move and scroll events.
//! - [`command`]: the serial console protocol that drives the emulator
//!   and reports button edges back to the host.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is only built with the `embedded` feature.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to later modules.
mod fmt;

pub mod command;
pub mod config;
pub mod error;
pub mod hid;

pub use error::Error;
