//! Inbound HID mouse report parser.
//!
//! Turns raw reports from a physical mouse into edge-triggered button
//! events plus movement and scroll events.
//!
//! Layout (at least 6 bytes):
//! ```text
//! Byte 0:   Reserved / report ID slot (ignored)
//! Byte 1:   Raw button bitmap (bit 0 = left .. bit 4 = forward)
//! Byte 2-4: Two 12-bit signed deltas, packed:
//!           X = byte2 | (byte3 & 0x0F) << 8
//!           Y = (byte3 >> 4) | byte4 << 4
//! Byte 5:   Wheel delta (i8)
//! ```

use super::buttons::Button;
use crate::error::Error;

/// Minimum accepted inbound report length.
pub const INBOUND_REPORT_MIN_SIZE: usize = 6;

/// Sign-extend a 12-bit two's-complement value.
///
/// Bits above bit 11 are ignored.
pub const fn sign_extend_12(raw: u16) -> i16 {
    (((raw & 0x0FFF) ^ 0x0800) as i16) - 0x0800
}

/// Receiver of decoded mouse events.
///
/// Every method defaults to doing nothing, so an implementation only
/// overrides the events it cares about.
pub trait MouseHandler {
    fn on_button_down(&mut self, _button: Button) {}

    fn on_button_up(&mut self, _button: Button) {}

    /// `scroll` is always 0 when called by [`MouseReportParser`]; the wheel
    /// is reported through [`MouseHandler::on_scroll`].
    fn on_mouse_move(&mut self, _dx: i16, _dy: i16, _scroll: i8) {}

    fn on_scroll(&mut self, _wheel: i8) {}
}

impl<H: MouseHandler + ?Sized> MouseHandler for &mut H {
    fn on_button_down(&mut self, button: Button) {
        (**self).on_button_down(button)
    }

    fn on_button_up(&mut self, button: Button) {
        (**self).on_button_up(button)
    }

    fn on_mouse_move(&mut self, dx: i16, dy: i16, scroll: i8) {
        (**self).on_mouse_move(dx, dy, scroll)
    }

    fn on_scroll(&mut self, wheel: i8) {
        (**self).on_scroll(wheel)
    }
}

/// Optional plain-function hooks. A `None` hook drops its event.
#[derive(Clone, Copy, Default)]
pub struct Callbacks {
    pub on_button_down: Option<fn(Button)>,
    pub on_button_up: Option<fn(Button)>,
    pub on_mouse_move: Option<fn(i16, i16, i8)>,
    pub on_scroll: Option<fn(i8)>,
}

impl MouseHandler for Callbacks {
    fn on_button_down(&mut self, button: Button) {
        if let Some(f) = self.on_button_down {
            f(button);
        }
    }

    fn on_button_up(&mut self, button: Button) {
        if let Some(f) = self.on_button_up {
            f(button);
        }
    }

    fn on_mouse_move(&mut self, dx: i16, dy: i16, scroll: i8) {
        if let Some(f) = self.on_mouse_move {
            f(dx, dy, scroll);
        }
    }

    fn on_scroll(&mut self, wheel: i8) {
        if let Some(f) = self.on_scroll {
            f(wheel);
        }
    }
}

/// A decoded event, for handlers that queue rather than react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseEvent {
    ButtonDown(Button),
    ButtonUp(Button),
    Move { dx: i16, dy: i16, scroll: i8 },
    Scroll(i8),
}

/// Records events in order; events past capacity are dropped.
impl<const N: usize> MouseHandler for heapless::Vec<MouseEvent, N> {
    fn on_button_down(&mut self, button: Button) {
        let _ = self.push(MouseEvent::ButtonDown(button));
    }

    fn on_button_up(&mut self, button: Button) {
        let _ = self.push(MouseEvent::ButtonUp(button));
    }

    fn on_mouse_move(&mut self, dx: i16, dy: i16, scroll: i8) {
        let _ = self.push(MouseEvent::Move { dx, dy, scroll });
    }

    fn on_scroll(&mut self, wheel: i8) {
        let _ = self.push(MouseEvent::Scroll(wheel));
    }
}

/// Fields of one inbound report, before diffing.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundReport {
    /// Raw button bitmap, padding bits included.
    pub buttons: u8,
    pub dx: i16,
    pub dy: i16,
    pub wheel: i8,
}

impl InboundReport {
    /// Decode a raw report. Returns `None` for reports shorter than
    /// [`INBOUND_REPORT_MIN_SIZE`]; extra trailing bytes are ignored.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < INBOUND_REPORT_MIN_SIZE {
            return None;
        }
        let raw_x = u16::from(data[2]) | (u16::from(data[3] & 0x0F) << 8);
        let raw_y = u16::from(data[3] >> 4) | (u16::from(data[4]) << 4);
        Some(Self {
            buttons: data[1],
            dx: sign_extend_12(raw_x),
            dy: sign_extend_12(raw_y),
            wheel: data[5] as i8,
        })
    }
}

/// Transport-facing parser interface: one call per received input report.
pub trait HidReportParser {
    /// `is_rpt_id` tells whether the transport saw a report ID; it does not
    /// change how mouse reports are laid out.
    fn parse(&mut self, is_rpt_id: bool, buf: &[u8]);
}

/// Stateful mouse report parser.
///
/// Remembers the last raw button byte so that only transitions produce
/// button events.
#[derive(Debug)]
pub struct MouseReportParser<H: MouseHandler> {
    handler: H,
    prev_buttons: u8,
}

impl<H: MouseHandler> MouseReportParser<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            prev_buttons: 0,
        }
    }

    /// Parse one report, silently dropping short input.
    pub fn parse(&mut self, buf: &[u8]) {
        let _ = self.try_parse(buf);
    }

    /// Parse one report, reporting short input as an error.
    ///
    /// A rejected report leaves the parser untouched and raises no events.
    pub fn try_parse(&mut self, buf: &[u8]) -> Result<(), Error> {
        let report = InboundReport::from_bytes(buf).ok_or_else(|| {
            debug!("dropping short mouse report ({} bytes)", buf.len());
            Error::ShortReport { len: buf.len() }
        })?;
        self.dispatch(&report);
        Ok(())
    }

    fn dispatch(&mut self, report: &InboundReport) {
        for button in Button::ALL {
            let bit = button.raw_bit();
            let was = self.prev_buttons & bit != 0;
            let now = report.buttons & bit != 0;
            match (was, now) {
                (false, true) => self.handler.on_button_down(button),
                (true, false) => self.handler.on_button_up(button),
                _ => {}
            }
        }
        self.prev_buttons = report.buttons;

        if report.dx != 0 || report.dy != 0 {
            self.handler.on_mouse_move(report.dx, report.dy, 0);
        }

        if report.wheel != 0 {
            self.handler.on_scroll(report.wheel);
        }
    }

    /// Raw button byte from the last accepted report.
    pub fn previous_buttons(&self) -> u8 {
        self.prev_buttons
    }

    /// Forget the remembered button state, e.g. after a device reconnect.
    pub fn reset(&mut self) {
        self.prev_buttons = 0;
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

impl<H: MouseHandler> HidReportParser for MouseReportParser<H> {
    fn parse(&mut self, _is_rpt_id: bool, buf: &[u8]) {
        let _ = self.try_parse(buf);
    }
}
