//! `.z80` snapshot saving, the inverse of [`super::loader`]. Always emits a
//! version 2 file (23-byte extension header) — the simplest format that can
//! carry both 48K and 128K machines and round-trips cleanly through
//! [`super::loader::load`].
use super::common::{Flags1, PageData, PAGE_SIZE, V1_HEADER_SIZE};
use super::compress::compress;
use crate::z80snap::Snapshot;

pub fn save(snapshot: &Snapshot) -> Vec<u8> {
    let r = &snapshot.registers;
    let mut out = vec![0u8; V1_HEADER_SIZE];
    out[0] = r.a;
    out[1] = r.f;
    out[2..4].copy_from_slice(&r.bc.to_le_bytes());
    out[4..6].copy_from_slice(&r.hl.to_le_bytes());
    out[6..8].copy_from_slice(&0u16.to_le_bytes()); // PC == 0 signals v2/v3
    out[8..10].copy_from_slice(&r.sp.to_le_bytes());
    out[10] = r.i;
    out[11] = r.r & 0x7F;

    let mut flags1 = Flags1::empty();
    if r.r & 0x80 != 0 {
        flags1.insert(Flags1::R_HIGH_BIT);
    }
    flags1 |= Flags1::from_bits_truncate((snapshot.border & 0x07) << 1);
    out[12] = flags1.bits();

    out[13..15].copy_from_slice(&r.de.to_le_bytes());
    out[15..17].copy_from_slice(&r.bc_alt.to_le_bytes());
    out[17..19].copy_from_slice(&r.de_alt.to_le_bytes());
    out[19..21].copy_from_slice(&r.hl_alt.to_le_bytes());
    out[21] = r.a_alt;
    out[22] = r.f_alt;
    out[23..25].copy_from_slice(&r.iy.to_le_bytes());
    out[25..27].copy_from_slice(&r.ix.to_le_bytes());
    out[27] = r.iff1 as u8;
    out[28] = r.iff2 as u8;
    out[29] = r.im & 0x03;

    let ext_len: u16 = 23;
    out.extend_from_slice(&ext_len.to_le_bytes());
    let mut ext = vec![0u8; 23];
    ext[0..2].copy_from_slice(&r.pc.to_le_bytes());
    ext[2] = if snapshot.is_128k { 4 } else { 0 };
    ext[3] = snapshot.port_7ffd.unwrap_or(0);
    out.extend_from_slice(&ext);

    for page in &snapshot.pages {
        write_page(&mut out, page);
    }
    out
}

fn write_page(out: &mut Vec<u8>, page: &PageData) {
    debug_assert_eq!(page.data.len(), PAGE_SIZE);
    let compressed = compress(&page.data);
    out.extend_from_slice(&(compressed.len() as u16).to_le_bytes());
    out.push(page.page_id);
    out.extend_from_slice(&compressed);
}

#[cfg(test)]
mod tests {
    use super::super::common::{CpuRegisters, Z80Version};
    use super::super::loader::load;
    use super::*;

    #[test]
    fn round_trips_registers_and_pages() {
        let registers = CpuRegisters {
            a: 0x12,
            f: 0x34,
            bc: 0x1122,
            de: 0x3344,
            hl: 0x5566,
            pc: 0x8abc,
            sp: 0xfffe,
            i: 0x3f,
            r: 0xaa,
            iff1: true,
            iff2: false,
            im: 1,
            ..Default::default()
        };
        let mut page_data = vec![0u8; PAGE_SIZE];
        page_data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        page_data[100..200].fill(0x77);
        let snapshot = Snapshot {
            version: Z80Version::V2,
            registers,
            border: 5,
            port_7ffd: Some(0x10),
            is_128k: true,
            pages: vec![PageData::new(3, page_data.clone())],
        };

        let bytes = save(&snapshot);
        let reloaded = load(&bytes).unwrap();

        assert_eq!(reloaded.registers.pc, registers.pc);
        assert_eq!(reloaded.registers.a, registers.a);
        assert_eq!(reloaded.registers.r, registers.r);
        assert_eq!(reloaded.border, 5);
        assert_eq!(reloaded.port_7ffd, Some(0x10));
        assert!(reloaded.is_128k);
        assert_eq!(reloaded.pages.len(), 1);
        assert_eq!(reloaded.pages[0].page_id, 3);
        assert_eq!(reloaded.pages[0].data, page_data);
    }
}
