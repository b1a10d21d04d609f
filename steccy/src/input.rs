//! Input controller (C7): maps host keyboard scancodes and joystick axes
//! onto the ZX matrix / Kempston register (spec §4.7).
use crate::io::IoBus;
use steccy_core::joystick::{self, Directions, JoystickEdit, Scheme};
use steccy_core::ZXKeyboardMap;

/// One entry: a 9-bit PS/2 scancode (extended codes have bit 8 set, `0x1xx`)
/// mapped to the ZX matrix key it represents. A modest, representative
/// subset — letters, digits, shift and enter — rather than an exhaustive
/// 104-key table.
pub const SCANCODE_TABLE: &[(u16, ZXKeyboardMap)] = &[
    (0x1C, ZXKeyboardMap::A),
    (0x32, ZXKeyboardMap::B),
    (0x21, ZXKeyboardMap::C),
    (0x23, ZXKeyboardMap::D),
    (0x24, ZXKeyboardMap::E),
    (0x2B, ZXKeyboardMap::F),
    (0x34, ZXKeyboardMap::G),
    (0x33, ZXKeyboardMap::H),
    (0x43, ZXKeyboardMap::I),
    (0x3B, ZXKeyboardMap::J),
    (0x42, ZXKeyboardMap::K),
    (0x4B, ZXKeyboardMap::L),
    (0x3A, ZXKeyboardMap::M),
    (0x31, ZXKeyboardMap::N),
    (0x44, ZXKeyboardMap::O),
    (0x4D, ZXKeyboardMap::P),
    (0x15, ZXKeyboardMap::Q),
    (0x2D, ZXKeyboardMap::R),
    (0x1B, ZXKeyboardMap::S),
    (0x2C, ZXKeyboardMap::T),
    (0x3C, ZXKeyboardMap::U),
    (0x2A, ZXKeyboardMap::V),
    (0x1D, ZXKeyboardMap::W),
    (0x22, ZXKeyboardMap::X),
    (0x35, ZXKeyboardMap::Y),
    (0x1A, ZXKeyboardMap::Z),
    (0x45, ZXKeyboardMap::N0),
    (0x16, ZXKeyboardMap::N1),
    (0x1E, ZXKeyboardMap::N2),
    (0x26, ZXKeyboardMap::N3),
    (0x25, ZXKeyboardMap::N4),
    (0x2E, ZXKeyboardMap::N5),
    (0x36, ZXKeyboardMap::N6),
    (0x3D, ZXKeyboardMap::N7),
    (0x3E, ZXKeyboardMap::N8),
    (0x46, ZXKeyboardMap::N9),
    (0x5A, ZXKeyboardMap::EN),   // Enter
    (0x29, ZXKeyboardMap::BR),   // Space (BREAK/space key)
    (0x12, ZXKeyboardMap::CS),   // Left Shift -> CAPS SHIFT
    (0x59, ZXKeyboardMap::CS),   // Right Shift -> CAPS SHIFT
    (0x111, ZXKeyboardMap::SS),  // Right Alt (E0 11) -> SYMBOL SHIFT
];

fn lookup(scancode: u16) -> Option<ZXKeyboardMap> {
    SCANCODE_TABLE
        .iter()
        .find(|(code, _)| *code == scancode)
        .map(|(_, key)| *key)
}

/// Tracks which ZX matrix keys are currently held down from scancode
/// events, and presents them as the active-low row bytes the ULA expects.
#[derive(Debug, Default)]
pub struct KeyboardInput {
    pressed: ZXKeyboardMap,
}

/// Row-select lines in the order C2's `IoBus::set_matrix_row` expects.
const ROW_LINES: [u8; 8] = [0xFE, 0xFD, 0xFB, 0xF7, 0xEF, 0xDF, 0xBF, 0x7F];

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(scancode, released)` per spec §6's keyboard/joystick interface.
    pub fn handle_scancode(&mut self, scancode: u16, released: bool) {
        if let Some(key) = lookup(scancode) {
            if released {
                self.pressed.remove(key);
            } else {
                self.pressed.insert(key);
            }
        }
    }

    pub fn pressed(&self) -> ZXKeyboardMap {
        self.pressed
    }

    /// Push the current matrix (plus any keys asserted by the active
    /// joystick scheme) into the I/O fabric.
    pub fn apply_to(&self, io: &mut IoBus, extra: ZXKeyboardMap) {
        let effective = self.pressed | extra;
        for (row, &line) in ROW_LINES.iter().enumerate() {
            io.set_matrix_row(row, effective.read_keyboard(line));
        }
    }
}

/// Thresholds analogue joystick axes into the four ZX directions and maps
/// them through the active scheme (spec §4.7).
#[derive(Debug, Clone, Copy)]
pub struct JoystickInput {
    pub scheme: Scheme,
    /// Axis magnitude, in the unit range documented in spec §3, beyond
    /// which a direction is considered active.
    pub threshold: i16,
}

impl JoystickInput {
    pub fn new(scheme: Scheme) -> Self {
        JoystickInput { scheme, threshold: 64 }
    }

    /// `x`/`y` in `-32768..=32767`, `buttons` a 16-bit bitmap (bit 0 = fire),
    /// per spec §6's joystick event form.
    pub fn handle_axes(&self, x: i16, y: i16, buttons: u16) -> JoystickEdit {
        let mut dirs = Directions::empty();
        if x < -self.threshold {
            dirs |= Directions::LEFT;
        }
        if x > self.threshold {
            dirs |= Directions::RIGHT;
        }
        if y < -self.threshold {
            dirs |= Directions::UP;
        }
        if y > self.threshold {
            dirs |= Directions::DOWN;
        }
        let fire = buttons & 0x0001 != 0;
        joystick::apply(self.scheme, dirs, fire)
    }
}
