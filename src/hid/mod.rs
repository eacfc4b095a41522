//! HID mouse report types: outbound emulation and inbound parsing.
//!
//! - [`mouse`]: encodes button/motion/pan intent into reports for the
//!   USB host (report IDs 1 and 2).
//! - [`parser`]: decodes reports from a physical mouse into button edges,
//!   movement and scroll events.
//!
//! The two sides share only [`buttons`]; neither touches the other's state.

pub mod buttons;
pub mod mouse;
pub mod parser;


pub use buttons::{Button, ButtonMask};
pub use mouse::{MotionReport, MouseEmulator, PanReport, ReportSink, MOUSE_REPORT_DESCRIPTOR};
pub use parser::{
    Callbacks, HidReportParser, InboundReport, MouseEvent, MouseHandler, MouseReportParser,
};
