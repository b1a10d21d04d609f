//! Tape and snapshot file formats: `.tap`, `.tzx` and `.z80` (spec C5).
//!
//! This crate has no dependency on a live CPU or banked memory model — it
//! only parses and produces the on-disk byte layouts. `steccy::machine`
//! depends on this crate and maps the results onto its own runtime state.
#[macro_use]
extern crate bitflags;

pub mod error;
pub mod tap;
pub mod tzx;
pub mod z80snap;

pub use error::{FormatError, Result};
pub use tap::{parse_tap_blocks, HeaderInfo, Tape, TapBlock};
pub use tzx::parse_tzx_blocks;
pub use z80snap::Snapshot;
