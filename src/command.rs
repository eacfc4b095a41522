//! Serial console protocol.
//!
//! A host drives the emulator with newline-terminated ASCII commands:
//!
//! | Line      | Action                          |
//! |-----------|---------------------------------|
//! | `c`       | click left                      |
//! | `p`       | press left                      |
//! | `r`       | release left                    |
//! | `m<x>,<y>`| relative move, e.g. `m-12,40`   |
//!
//! In the other direction, button edges decoded from a physical mouse are
//! reported as `BD:<code>` (down) and `BU:<code>` (up) lines, where `<code>`
//! is the logical button code (1, 2, 4, 8, 16).

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::error::Error;
use crate::hid::{Button, ButtonMask, MouseEmulator, MouseHandler, ReportSink};

const BUTTON_DOWN_PREFIX: &str = "BD:";
const BUTTON_UP_PREFIX: &str = "BU:";

/// Largest per-report delta an 8-bit host can send.
pub const MAX_CHUNK: i32 = 127;

/// One parsed console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Click,
    Press,
    Release,
    Move { x: i16, y: i16 },
}

impl Command {
    /// Parse one line (terminator already stripped).
    pub fn parse(line: &str) -> Result<Self, Error> {
        let line = line.trim();
        let mut chars = line.chars();
        let op = chars.next().ok_or(Error::EmptyCommand)?;
        let args = chars.as_str().trim();

        match op {
            'm' => parse_move(args),
            'c' | 'p' | 'r' if !args.is_empty() => Err(Error::InvalidArgument),
            'c' => Ok(Command::Click),
            'p' => Ok(Command::Press),
            'r' => Ok(Command::Release),
            _ => Err(Error::UnknownCommand),
        }
    }

    /// Run the command against the emulator. Button commands act on LEFT.
    pub fn apply<S: ReportSink>(&self, mouse: &mut MouseEmulator<S>) {
        match *self {
            Command::Click => mouse.click(ButtonMask::LEFT),
            Command::Press => mouse.press(ButtonMask::LEFT),
            Command::Release => mouse.release(ButtonMask::LEFT),
            Command::Move { x, y } => mouse.move_by(x, y, 0),
        }
    }
}

/// Wire form, as a host would send it (without the newline).
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Click => f.write_str("c"),
            Command::Press => f.write_str("p"),
            Command::Release => f.write_str("r"),
            Command::Move { x, y } => write!(f, "m{x},{y}"),
        }
    }
}

fn parse_move(args: &str) -> Result<Command, Error> {
    let (x, y) = args.split_once(',').ok_or(Error::InvalidArgument)?;
    let x = x.trim().parse::<i16>().map_err(|_| Error::InvalidArgument)?;
    let y = y.trim().parse::<i16>().map_err(|_| Error::InvalidArgument)?;
    Ok(Command::Move { x, y })
}

/// Accumulates serial bytes into lines of at most `N` bytes.
#[derive(Debug, Default)]
pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed one byte. Returns a line once `\n` arrives.
    ///
    /// `\r` is dropped. A line longer than `N` bytes is discarded as a
    /// whole and reported as [`Error::BufferOverflow`] at its terminator.
    pub fn push(&mut self, byte: u8) -> Option<Result<String<N>, Error>> {
        match byte {
            b'\n' => Some(self.take_line()),
            b'\r' => None,
            _ => {
                if self.buf.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    fn take_line(&mut self) -> Result<String<N>, Error> {
        let overflowed = core::mem::replace(&mut self.overflowed, false);
        let bytes = core::mem::take(&mut self.buf);
        if overflowed {
            return Err(Error::BufferOverflow);
        }
        let text = core::str::from_utf8(&bytes).map_err(|_| Error::NotUtf8)?;
        let mut line = String::new();
        line.push_str(text).map_err(|_| Error::BufferOverflow)?;
        Ok(line)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }
}

/// Mouse handler that writes button edges as console lines.
///
/// Movement and scroll are not reported.
#[derive(Debug)]
pub struct SerialReporter<W: Write> {
    out: W,
}

impl<W: Write> SerialReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, prefix: &str, button: Button) {
        if writeln!(self.out, "{prefix}{}", button.code()).is_err() {
            warn!("serial reporter output full, dropped {}", button);
        }
    }
}

impl<W: Write> MouseHandler for SerialReporter<W> {
    fn on_button_down(&mut self, button: Button) {
        self.emit(BUTTON_DOWN_PREFIX, button);
    }

    fn on_button_up(&mut self, button: Button) {
        self.emit(BUTTON_UP_PREFIX, button);
    }
}

/// Host-side view of the physical mouse buttons, rebuilt from
/// `BD:`/`BU:` lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressedButtons {
    held: ButtonMask,
}

impl PressedButtons {
    pub const fn new() -> Self {
        Self {
            held: ButtonMask::empty(),
        }
    }

    /// Apply one console line. Lines that are not button events yield
    /// [`Error::UnknownCommand`] and change nothing.
    pub fn apply_line(&mut self, line: &str) -> Result<(), Error> {
        let line = line.trim();
        if let Some(code) = line.strip_prefix(BUTTON_DOWN_PREFIX) {
            self.held |= parse_button_code(code)?.mask();
        } else if let Some(code) = line.strip_prefix(BUTTON_UP_PREFIX) {
            self.held &= !parse_button_code(code)?.mask();
        } else {
            return Err(Error::UnknownCommand);
        }
        Ok(())
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.held.contains(button.mask())
    }

    pub fn held(&self) -> ButtonMask {
        self.held
    }
}

fn parse_button_code(code: &str) -> Result<Button, Error> {
    code.trim()
        .parse::<u8>()
        .ok()
        .and_then(Button::from_code)
        .ok_or(Error::InvalidArgument)
}

/// Split `value` into steps of at most ±[`MAX_CHUNK`].
///
/// Zero yields a single zero step.
pub fn split_delta(value: i32) -> SplitDelta {
    SplitDelta {
        remaining: value,
        done: false,
    }
}

/// Iterator returned by [`split_delta`].
#[derive(Clone, Debug)]
pub struct SplitDelta {
    remaining: i32,
    done: bool,
}

impl Iterator for SplitDelta {
    type Item = i8;

    fn next(&mut self) -> Option<i8> {
        if self.done {
            return None;
        }
        if self.remaining.unsigned_abs() > MAX_CHUNK as u32 {
            let step = if self.remaining < 0 { -MAX_CHUNK } else { MAX_CHUNK };
            self.remaining -= step;
            return Some(step as i8);
        }
        self.done = true;
        Some(self.remaining as i8)
    }
}

/// Split a move into per-axis steps; the shorter axis is padded with 0.
pub fn split_move(x: i32, y: i32) -> SplitMove {
    SplitMove {
        x: split_delta(x),
        y: split_delta(y),
    }
}

/// Iterator returned by [`split_move`].
#[derive(Clone, Debug)]
pub struct SplitMove {
    x: SplitDelta,
    y: SplitDelta,
}

impl Iterator for SplitMove {
    type Item = (i8, i8);

    fn next(&mut self) -> Option<(i8, i8)> {
        match (self.x.next(), self.y.next()) {
            (None, None) => None,
            (x, y) => Some((x.unwrap_or(0), y.unwrap_or(0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::mouse::MOTION_REPORT_ID;

    #[derive(Default)]
    struct Recorder {
        reports: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
    }

    impl ReportSink for Recorder {
        fn send_report(&mut self, report_id: u8, data: &[u8]) {
            self.reports.push((report_id, data.to_vec()));
        }
    }

    #[test]
    fn parse_button_commands() {
        assert_eq!(Command::parse("c"), Ok(Command::Click));
        assert_eq!(Command::parse("p"), Ok(Command::Press));
        assert_eq!(Command::parse(" r \r"), Ok(Command::Release));
    }

    #[test]
    fn parse_move_accepts_both_spellings() {
        assert_eq!(Command::parse("m50,-3"), Ok(Command::Move { x: 50, y: -3 }));
        assert_eq!(
            Command::parse("m 100, 100"),
            Ok(Command::Move { x: 100, y: 100 })
        );
    }

    #[test]
    fn parse_rejects_bad_lines() {
        assert_eq!(Command::parse(""), Err(Error::EmptyCommand));
        assert_eq!(Command::parse("   "), Err(Error::EmptyCommand));
        assert_eq!(Command::parse("x"), Err(Error::UnknownCommand));
        assert_eq!(Command::parse("cc"), Err(Error::InvalidArgument));
        assert_eq!(Command::parse("m10"), Err(Error::InvalidArgument));
        assert_eq!(Command::parse("m10,abc"), Err(Error::InvalidArgument));
        assert_eq!(Command::parse("m40000,0"), Err(Error::InvalidArgument));
    }

    #[test]
    fn display_is_parseable() {
        for cmd in [
            Command::Click,
            Command::Press,
            Command::Release,
            Command::Move { x: -2048, y: 2047 },
        ] {
            let mut line: String<16> = String::new();
            write!(line, "{cmd}").unwrap();
            assert_eq!(Command::parse(&line), Ok(cmd));
        }
    }

    #[test]
    fn press_move_release_drags() {
        let mut mouse = MouseEmulator::new(Recorder::default());
        for line in ["p", "m30,0", "r"] {
            Command::parse(line).unwrap().apply(&mut mouse);
        }

        let reports = &mouse.sink().reports;
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|(id, _)| *id == MOTION_REPORT_ID));
        assert_eq!(reports[0].1, [0x01, 0, 0, 0, 0, 0]);
        assert_eq!(reports[1].1, [0x01, 30, 0, 0, 0, 0]);
        assert_eq!(reports[2].1, [0x00, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn line_buffer_splits_lines() {
        let mut lines: LineBuffer<8> = LineBuffer::new();
        let mut out = std::vec::Vec::new();
        for &b in b"c\r\nm1,2\n" {
            if let Some(line) = lines.push(b) {
                out.push(line.unwrap());
            }
        }
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_str(), "c");
        assert_eq!(out[1].as_str(), "m1,2");
    }

    #[test]
    fn line_buffer_discards_overlong_line() {
        let mut lines: LineBuffer<4> = LineBuffer::new();
        for &b in b"m1000,1000" {
            assert!(lines.push(b).is_none());
        }
        assert_eq!(lines.push(b'\n'), Some(Err(Error::BufferOverflow)));

        // The next line starts clean.
        lines.push(b'c');
        assert_eq!(lines.push(b'\n').unwrap().unwrap().as_str(), "c");
    }

    #[test]
    fn line_buffer_rejects_invalid_utf8() {
        let mut lines: LineBuffer<4> = LineBuffer::new();
        lines.push(0xFF);
        assert_eq!(lines.push(b'\n'), Some(Err(Error::NotUtf8)));
    }

    #[test]
    fn reporter_writes_button_lines_only() {
        let mut reporter = SerialReporter::new(String::<64>::new());
        reporter.on_button_down(Button::Left);
        reporter.on_mouse_move(3, 4, 0);
        reporter.on_scroll(1);
        reporter.on_button_up(Button::Next);
        assert_eq!(reporter.get_ref().as_str(), "BD:1\nBU:16\n");
    }

    #[test]
    fn pressed_buttons_tracks_lines() {
        let mut pressed = PressedButtons::new();
        pressed.apply_line("BD:2").unwrap();
        pressed.apply_line("BD:1\r").unwrap();
        assert!(pressed.is_pressed(Button::Right));
        assert!(pressed.is_pressed(Button::Left));

        pressed.apply_line("BU:2").unwrap();
        assert!(!pressed.is_pressed(Button::Right));
        assert_eq!(pressed.held(), ButtonMask::LEFT);

        assert_eq!(pressed.apply_line("hello"), Err(Error::UnknownCommand));
        assert_eq!(pressed.apply_line("BD:3"), Err(Error::InvalidArgument));
        assert_eq!(pressed.apply_line("BU:x"), Err(Error::InvalidArgument));
        assert_eq!(pressed.held(), ButtonMask::LEFT);
    }

    #[test]
    fn split_delta_chunks() {
        let zero: std::vec::Vec<i8> = split_delta(0).collect();
        assert_eq!(zero, [0]);

        let small: std::vec::Vec<i8> = split_delta(-50).collect();
        assert_eq!(small, [-50]);

        let exact: std::vec::Vec<i8> = split_delta(254).collect();
        assert_eq!(exact, [127, 127]);

        let large: std::vec::Vec<i8> = split_delta(-300).collect();
        assert_eq!(large, [-127, -127, -46]);
    }

    #[test]
    fn split_move_pads_shorter_axis() {
        let steps: std::vec::Vec<(i8, i8)> = split_move(300, 5).collect();
        assert_eq!(steps, [(127, 5), (127, 0), (46, 0)]);

        let total_x: i32 = steps.iter().map(|(x, _)| i32::from(*x)).sum();
        let total_y: i32 = steps.iter().map(|(_, y)| i32::from(*y)).sum();
        assert_eq!((total_x, total_y), (300, 5));
    }
}
