//! Joystick direction bitflags and the four selectable mapping schemes
//! (spec §4.7).
use crate::keys::ZXKeyboardMap;

bitflags! {
    /// Bit = 1 is active, bit = 0 is inactive — mirrors the teacher's
    /// `peripherals::joystick::Directions` bitflags exactly.
    #[derive(Default)]
    pub struct Directions: u8 {
        const UP    = 0b0000_0001;
        const RIGHT = 0b0000_0010;
        const DOWN  = 0b0000_0100;
        const LEFT  = 0b0000_1000;
    }
}

/// Which physical/virtual joystick convention host input is translated
/// through before it reaches the ULA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Keys 5 (left), 8 (right), 7 (up), 6 (down), 0 (fire).
    Cursor,
    /// Interface 2 "right" port: 6,7,9,8,0.
    SinclairP1,
    /// Interface 2 "left" port: 1,2,4,3,5.
    SinclairP2,
    /// Active-high 5-bit I/O register read from port `0x1F`.
    Kempston,
}

/// The result of mapping a joystick state through a [`Scheme`]: either a
/// set of ZX matrix keys to OR into the keyboard state, or a Kempston
/// register value to present verbatim on port `0x1F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickEdit {
    Keys(ZXKeyboardMap),
    Kempston(u8),
}

/// Kempston register bit layout (spec §4.7): left=bit2, right=bit0,
/// up=bit3, down=bit1, fire=bit4.
pub const KEMPSTON_RIGHT: u8 = 0b0000_0001;
pub const KEMPSTON_DOWN: u8 = 0b0000_0010;
pub const KEMPSTON_LEFT: u8 = 0b0000_0100;
pub const KEMPSTON_UP: u8 = 0b0000_1000;
pub const KEMPSTON_FIRE: u8 = 0b0001_0000;

/// Map a direction/fire reading through the active scheme.
pub fn apply(scheme: Scheme, dirs: Directions, fire: bool) -> JoystickEdit {
    match scheme {
        Scheme::Kempston => {
            let mut bits = 0u8;
            if dirs.contains(Directions::RIGHT) {
                bits |= KEMPSTON_RIGHT;
            }
            if dirs.contains(Directions::LEFT) {
                bits |= KEMPSTON_LEFT;
            }
            if dirs.contains(Directions::DOWN) {
                bits |= KEMPSTON_DOWN;
            }
            if dirs.contains(Directions::UP) {
                bits |= KEMPSTON_UP;
            }
            if fire {
                bits |= KEMPSTON_FIRE;
            }
            JoystickEdit::Kempston(bits)
        }
        keyboard_scheme => {
            let (left, right, up, down, fire_key) = match keyboard_scheme {
                Scheme::Cursor => (
                    ZXKeyboardMap::N5,
                    ZXKeyboardMap::N8,
                    ZXKeyboardMap::N7,
                    ZXKeyboardMap::N6,
                    ZXKeyboardMap::N0,
                ),
                Scheme::SinclairP1 => (
                    ZXKeyboardMap::N6,
                    ZXKeyboardMap::N7,
                    ZXKeyboardMap::N9,
                    ZXKeyboardMap::N8,
                    ZXKeyboardMap::N0,
                ),
                Scheme::SinclairP2 => (
                    ZXKeyboardMap::N1,
                    ZXKeyboardMap::N2,
                    ZXKeyboardMap::N4,
                    ZXKeyboardMap::N3,
                    ZXKeyboardMap::N5,
                ),
                Scheme::Kempston => unreachable!(),
            };
            let mut keys = ZXKeyboardMap::empty();
            if dirs.contains(Directions::LEFT) {
                keys |= left;
            }
            if dirs.contains(Directions::RIGHT) {
                keys |= right;
            }
            if dirs.contains(Directions::UP) {
                keys |= up;
            }
            if dirs.contains(Directions::DOWN) {
                keys |= down;
            }
            if fire {
                keys |= fire_key;
            }
            JoystickEdit::Keys(keys)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kempston_right_sets_bit0() {
        match apply(Scheme::Kempston, Directions::RIGHT, false) {
            JoystickEdit::Kempston(bits) => assert_eq!(bits, 0x01),
            _ => panic!("expected Kempston edit"),
        }
    }

    #[test]
    fn cursor_fire_presses_key_0() {
        match apply(Scheme::Cursor, Directions::empty(), true) {
            JoystickEdit::Keys(keys) => assert_eq!(keys, ZXKeyboardMap::N0),
            _ => panic!("expected Keys edit"),
        }
    }

    #[test]
    fn sinclair_p2_up_presses_key_4() {
        match apply(Scheme::SinclairP2, Directions::UP, false) {
            JoystickEdit::Keys(keys) => assert_eq!(keys, ZXKeyboardMap::N4),
            _ => panic!("expected Keys edit"),
        }
    }
}
