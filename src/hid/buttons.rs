//! Mouse button model shared by the emulator and the parser.
//!
//! Logical button codes (what callbacks receive and what the emulator
//! transmits) and raw inbound bit positions happen to use the same values,
//! but they are declared separately since they belong to different devices.

bitflags::bitflags! {
    /// Set of held mouse buttons.
    ///
    /// Only the low five bits have meaning; the wire form pads the rest.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ButtonMask: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const PREV = 1 << 3;
        const NEXT = 1 << 4;
    }
}

impl ButtonMask {
    /// Build a mask from a raw byte, dropping the padding bits.
    pub const fn from_raw(raw: u8) -> Self {
        Self::from_bits_truncate(raw)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ButtonMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ButtonMask({=u8:#04x})", self.bits())
    }
}

impl From<Button> for ButtonMask {
    fn from(button: Button) -> Self {
        button.mask()
    }
}

/// Raw button bits as laid out in byte 1 of an inbound mouse report.
pub mod raw {
    pub const BUTTON_LEFT: u8 = 0x01;
    pub const BUTTON_RIGHT: u8 = 0x02;
    pub const BUTTON_MIDDLE: u8 = 0x04;
    pub const BUTTON_BACK: u8 = 0x08;
    pub const BUTTON_FORWARD: u8 = 0x10;
}

/// One logical mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Button {
    Left = 1,
    Right = 2,
    Middle = 4,
    /// Back / "previous" side button.
    Prev = 8,
    /// Forward / "next" side button.
    Next = 16,
}

impl Button {
    /// All buttons in the order the parser evaluates them.
    pub const ALL: [Button; 5] = [
        Button::Left,
        Button::Right,
        Button::Middle,
        Button::Prev,
        Button::Next,
    ];

    /// Logical button code handed to callbacks.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn mask(self) -> ButtonMask {
        ButtonMask::from_bits_truncate(self as u8)
    }

    /// Bit carrying this button in an inbound raw report.
    pub const fn raw_bit(self) -> u8 {
        match self {
            Button::Left => raw::BUTTON_LEFT,
            Button::Right => raw::BUTTON_RIGHT,
            Button::Middle => raw::BUTTON_MIDDLE,
            Button::Prev => raw::BUTTON_BACK,
            Button::Next => raw::BUTTON_FORWARD,
        }
    }

    /// Look a button up by its logical code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() == code)
    }
}
