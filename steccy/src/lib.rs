//! STECCY: an emulation core for the ZX Spectrum 48K/128K.
//!
//! A Z80 interpreter, banked address space, ULA-compatible I/O fabric,
//! screen refresh engine, tape/snapshot loader and the interactive menu
//! state machine that drives them, assembled by [`machine::Machine`].
#[macro_use]
extern crate bitflags;

pub mod cpu;
pub mod error;
pub mod input;
pub mod io;
pub mod machine;
pub mod memory;
pub mod menu;
pub mod romhook;
pub mod screen;

pub use cpu::Cpu;
pub use error::MachineError;
pub use io::IoBus;
pub use machine::Machine;
pub use memory::Memory;
