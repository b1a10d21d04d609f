//! `.z80` snapshot format: registers plus a compressed or raw memory image
//! (spec §3/§4.5/§9).
//!
//! Version 1 files are 30-byte header + one raw/compressed 48K memory
//! image. Version 2/3 files have a zero PC field in the base header, an
//! extension header (23 or 54 bytes) carrying the real PC and hardware
//! mode, followed by a sequence of `<length:u16><page_id:u8><data>` memory
//! pages (`length == 0xFFFF` means 16384 raw bytes).
//!
//! This crate has no notion of a live CPU or banked address space — both
//! live in the `steccy` crate, which depends on this one. [`Snapshot`] is
//! therefore a plain data bag; `steccy::machine` maps [`Snapshot::pages`]
//! onto its own RAM banks and [`Snapshot::registers`] onto its own `Regs`.
mod common;
mod compress;
mod decompress;
mod loader;
mod saver;

pub use common::{CpuRegisters, PageData, Z80Version};
pub use loader::load;
pub use saver::save;

/// A fully parsed `.z80` snapshot, independent of any particular memory
/// layout.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: Z80Version,
    pub registers: CpuRegisters,
    pub border: u8,
    pub port_7ffd: Option<u8>,
    pub is_128k: bool,
    /// One entry per memory page found in the file, each already
    /// decompressed to exactly 16384 bytes, tagged with the file's own
    /// page-id numbering (spec §4.5: "Page-id-to-bank mapping differs for
    /// 48K ... vs 128K").
    pub pages: Vec<PageData>,
}
