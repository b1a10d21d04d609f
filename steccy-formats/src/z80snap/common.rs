//! Shared header layout, flags and register bag for `.z80` snapshots.
pub const PAGE_SIZE: usize = 0x4000;
pub const V1_HEADER_SIZE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Z80Version {
    V1,
    V2,
    V3,
}

bitflags! {
    /// Byte 12 of the base header.
    #[derive(Default)]
    pub struct Flags1: u8 {
        const R_HIGH_BIT     = 0b0000_0001;
        const BORDER_COLOR   = 0b0000_1110;
        const BASIC_SAMROM   = 0b0001_0000;
        const MEM_COMPRESSED = 0b0010_0000;
    }
}

bitflags! {
    /// Byte 29 of the base header (version 1 only; v2/v3 reuse offset 29
    /// for the low two bits of IM, same as v1).
    #[derive(Default)]
    pub struct Flags2: u8 {
        const INTR_MODE_MASK   = 0b0000_0011;
        const ISSUE2_EMULATION = 0b0000_0100;
        const DOUBLE_INTERRUPT = 0b0000_1000;
    }
}

/// The full register file plus interrupt state, as stored in a `.z80` file
/// — independent of any live CPU representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuRegisters {
    pub a: u8,
    pub f: u8,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub a_alt: u8,
    pub f_alt: u8,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
}

/// One decompressed 16KiB memory page tagged with the file's own page-id.
#[derive(Debug, Clone)]
pub struct PageData {
    pub page_id: u8,
    pub data: Vec<u8>,
}

impl PageData {
    pub fn new(page_id: u8, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        PageData { page_id, data }
    }
}

/// Map a `.z80` v1/v2/v3 page id to a RAM bank index, for 48K snapshots
/// (spec §4.5: "4→bank 1 in slot 1, 5→slot 3, 8→slot 2"). The returned
/// bank numbering matches `steccy::memory`'s 48K bank assignment: bank 0 at
/// slot 1 (`0x4000`), bank 1 at slot 2 (`0x8000`), bank 2 at slot 3
/// (`0xC000`).
pub fn page_id_to_48k_bank(page_id: u8) -> Option<u8> {
    match page_id {
        8 => Some(0), // $4000
        4 => Some(1), // $8000
        5 => Some(2), // $C000
        _ => None,
    }
}

/// Map a `.z80` v2/v3 page id to a 128K RAM bank (spec §4.5: "pages 3..10 →
/// RAM banks 0..7").
pub fn page_id_to_128k_bank(page_id: u8) -> Option<u8> {
    if (3..=10).contains(&page_id) {
        Some(page_id - 3)
    } else {
        None
    }
}

/// Inverse of [`page_id_to_48k_bank`], used by the saver.
pub fn bank_to_page_id_48k(bank: u8) -> Option<u8> {
    match bank {
        0 => Some(8),
        1 => Some(4),
        2 => Some(5),
        _ => None,
    }
}

/// Inverse of [`page_id_to_128k_bank`], used by the saver.
pub fn bank_to_page_id_128k(bank: u8) -> Option<u8> {
    if bank <= 7 {
        Some(bank + 3)
    } else {
        None
    }
}
