//! USB HID relative mouse emulator.
//!
//! Motion report, report ID 1 (6 bytes):
//! ```text
//! Byte 0:   Button bitfield (5 bits) + 3 padding bits
//!           Bit 0 = Left, 1 = Right, 2 = Middle, 3 = Prev, 4 = Next
//! Byte 1-2: X displacement (i16 LE, -2048..2047)
//! Byte 3-4: Y displacement (i16 LE, -2048..2047)
//! Byte 5:   Scroll wheel  (i8, -127..127)
//! ```
//!
//! Pan report, report ID 2 (2 bytes):
//! ```text
//! Byte 0: Horizontal pan (i8)
//! Byte 1: Reserved (0)
//! ```

use super::buttons::ButtonMask;

/// Report ID of the buttons + X/Y + wheel report.
pub const MOTION_REPORT_ID: u8 = 1;
/// Report ID of the horizontal pan report.
pub const PAN_REPORT_ID: u8 = 2;

/// Motion report size in bytes.
pub const MOTION_REPORT_SIZE: usize = 6;
/// Pan report size in bytes.
pub const PAN_REPORT_SIZE: usize = 2;

/// Low five bits of the button byte; the rest is padding.
const BUTTON_FIELD_MASK: u8 = 0x1F;

/// Destination of outbound reports (a USB HID IN endpoint).
pub trait ReportSink {
    /// Transmit `data` under `report_id`.
    fn send_report(&mut self, report_id: u8, data: &[u8]);

    /// Called once by [`MouseEmulator::new`] with the report descriptor.
    fn register_descriptor(&mut self, _descriptor: &'static [u8]) {}
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn send_report(&mut self, report_id: u8, data: &[u8]) {
        (**self).send_report(report_id, data)
    }

    fn register_descriptor(&mut self, descriptor: &'static [u8]) {
        (**self).register_descriptor(descriptor)
    }
}

/// Relative motion report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionReport {
    pub buttons: ButtonMask,
    /// Relative X movement.
    pub x: i16,
    /// Relative Y movement.
    pub y: i16,
    /// Scroll wheel delta.
    pub wheel: i8,
}

impl MotionReport {
    pub fn to_bytes(&self) -> [u8; MOTION_REPORT_SIZE] {
        let x = self.x.to_le_bytes();
        let y = self.y.to_le_bytes();
        [
            self.buttons.bits() & BUTTON_FIELD_MASK,
            x[0],
            x[1],
            y[0],
            y[1],
            self.wheel as u8,
        ]
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOTION_REPORT_SIZE {
            return 0;
        }
        buf[..MOTION_REPORT_SIZE].copy_from_slice(&self.to_bytes());
        MOTION_REPORT_SIZE
    }

    /// Parse a motion report as this emulator emits it.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < MOTION_REPORT_SIZE {
            return None;
        }
        Some(Self {
            buttons: ButtonMask::from_raw(data[0]),
            x: i16::from_le_bytes([data[1], data[2]]),
            y: i16::from_le_bytes([data[3], data[4]]),
            wheel: data[5] as i8,
        })
    }
}

/// Horizontal pan report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanReport {
    pub pan: i8,
}

impl PanReport {
    pub fn to_bytes(&self) -> [u8; PAN_REPORT_SIZE] {
        [self.pan as u8, 0]
    }
}

/// Emulated relative mouse.
///
/// Holds the current button state and turns intent into reports pushed
/// through a [`ReportSink`]. The held mask always equals the buttons of
/// the last transmitted motion report.
#[derive(Debug)]
pub struct MouseEmulator<S: ReportSink> {
    sink: S,
    buttons: ButtonMask,
}

impl<S: ReportSink> MouseEmulator<S> {
    /// Create the emulator and register the report descriptor with `sink`.
    pub fn new(mut sink: S) -> Self {
        sink.register_descriptor(MOUSE_REPORT_DESCRIPTOR);
        Self {
            sink,
            buttons: ButtonMask::empty(),
        }
    }

    /// Send a relative move with the currently held buttons.
    ///
    /// Always transmits, even for an all-zero move.
    pub fn move_by(&mut self, x: i16, y: i16, wheel: i8) {
        let report = MotionReport {
            buttons: self.buttons,
            x,
            y,
            wheel,
        };
        trace!("motion report: {}", report);
        self.sink.send_report(MOTION_REPORT_ID, &report.to_bytes());
    }

    /// Press `mask`, then release everything: two reports.
    pub fn click(&mut self, mask: ButtonMask) {
        self.buttons = mask;
        self.move_by(0, 0, 0);
        self.buttons = ButtonMask::empty();
        self.move_by(0, 0, 0);
    }

    /// Replace the held buttons, transmitting only when they change.
    pub fn set_buttons(&mut self, mask: ButtonMask) {
        if mask != self.buttons {
            debug!("buttons {} -> {}", self.buttons, mask);
            self.buttons = mask;
            self.move_by(0, 0, 0);
        }
    }

    pub fn press(&mut self, mask: ButtonMask) {
        self.set_buttons(self.buttons | mask);
    }

    pub fn release(&mut self, mask: ButtonMask) {
        self.set_buttons(self.buttons & !mask);
    }

    /// `true` if any button in `mask` is held.
    pub fn is_pressed(&self, mask: ButtonMask) -> bool {
        self.buttons.intersects(mask)
    }

    /// Send a horizontal pan on its own report ID.
    pub fn pan(&mut self, value: i8) {
        let report = PanReport { pan: value };
        trace!("pan report: {}", report);
        self.sink.send_report(PAN_REPORT_ID, &report.to_bytes());
    }

    /// Currently held buttons.
    pub fn buttons(&self) -> ButtonMask {
        self.buttons
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

// USB HID report descriptor for the 5-button relative mouse

/// USB HID Report Descriptor: report ID 1, 5 buttons, 16-bit X/Y, wheel.
#[rustfmt::skip]
pub const MOUSE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x02,       // Usage (Mouse)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x01,       //   Report ID (1)
    0x09, 0x01,       //   Usage (Pointer)
    0xA1, 0x00,       //   Collection (Physical)
    //
    //   - Buttons (5 bits + 3 padding) -
    0x05, 0x09,       //     Usage Page (Buttons)
    0x19, 0x01,       //     Usage Minimum (Button 1)
    0x29, 0x05,       //     Usage Maximum (Button 5)
    0x15, 0x00,       //     Logical Minimum (0)
    0x25, 0x01,       //     Logical Maximum (1)
    0x95, 0x05,       //     Report Count (5)
    0x75, 0x01,       //     Report Size (1)
    0x81, 0x02,       //     Input (Data, Variable, Absolute)
    0x95, 0x01,       //     Report Count (1)
    0x75, 0x03,       //     Report Size (3)
    0x81, 0x01,       //     Input (Constant) - padding
    //
    //   - X, Y displacement -
    0x05, 0x01,       //     Usage Page (Generic Desktop)
    0x09, 0x30,       //     Usage (X)
    0x09, 0x31,       //     Usage (Y)
    0x16, 0x00, 0xF8, //     Logical Minimum (-2048)
    0x26, 0xFF, 0x07, //     Logical Maximum (2047)
    0x75, 0x10,       //     Report Size (16)
    0x95, 0x02,       //     Report Count (2)
    0x81, 0x06,       //     Input (Data, Variable, Relative)
    //
    //   - Scroll wheel -
    0x09, 0x38,       //     Usage (Wheel)
    0x15, 0x81,       //     Logical Minimum (-127)
    0x25, 0x7F,       //     Logical Maximum (127)
    0x75, 0x08,       //     Report Size (8)
    0x95, 0x01,       //     Report Count (1)
    0x81, 0x06,       //     Input (Data, Variable, Relative)
    //
    0xC0,             //   End Collection (Physical)
    0xC0,             // End Collection (Application)
];
