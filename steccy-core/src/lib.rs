//! Shared value types for the STECCY ZX Spectrum emulation core.
//!
//! This crate carries no I/O, no CPU state and no file parsing — just the
//! small, widely-shared types that both `steccy` and `steccy-formats` need:
//! the keyboard matrix bitmap, joystick direction/scheme mapping, the RGB565
//! border/ink/paper palette, and the T-state clock type alias.
#[macro_use]
extern crate bitflags;

pub mod clock;
pub mod color;
pub mod joystick;
pub mod keys;

pub use clock::TStates;
pub use keys::ZXKeyboardMap;
