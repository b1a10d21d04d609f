//! `.z80` snapshot loading: version detection plus register and page
//! extraction (spec §3/§4.5/§9).
use super::common::{CpuRegisters, Flags1, Flags2, PageData, Z80Version, PAGE_SIZE, V1_HEADER_SIZE};
use super::decompress::decompress_into;
use crate::error::{FormatError, Result};
use crate::z80snap::Snapshot;

/// The v1 end-of-data marker for compressed 48K images: `00 ED ED 00`.
const V1_END_MARKER: [u8; 4] = [0x00, 0xED, 0xED, 0x00];

pub fn load(data: &[u8]) -> Result<Snapshot> {
    if data.len() < V1_HEADER_SIZE {
        return Err(FormatError::BadFile("file shorter than .z80 base header".into()));
    }
    let h = &data[..V1_HEADER_SIZE];
    let pc = u16::from_le_bytes([h[6], h[7]]);
    let flags1_raw = if h[12] == 0xFF { 0x01 } else { h[12] };
    let flags1 = Flags1::from_bits_truncate(flags1_raw);

    let mut regs = CpuRegisters {
        a: h[0],
        f: h[1],
        bc: u16::from_le_bytes([h[2], h[3]]),
        hl: u16::from_le_bytes([h[4], h[5]]),
        pc,
        sp: u16::from_le_bytes([h[8], h[9]]),
        i: h[10],
        r: (h[11] & 0x7F) | if flags1.contains(Flags1::R_HIGH_BIT) { 0x80 } else { 0 },
        de: u16::from_le_bytes([h[13], h[14]]),
        bc_alt: u16::from_le_bytes([h[15], h[16]]),
        de_alt: u16::from_le_bytes([h[17], h[18]]),
        hl_alt: u16::from_le_bytes([h[19], h[20]]),
        a_alt: h[21],
        f_alt: h[22],
        iy: u16::from_le_bytes([h[23], h[24]]),
        ix: u16::from_le_bytes([h[25], h[26]]),
        iff1: h[27] != 0,
        iff2: h[28] != 0,
        im: 0,
    };
    let border = (flags1.bits() & Flags1::BORDER_COLOR.bits()) >> 1;

    if pc != 0 {
        return load_v1(data, regs, border, flags1);
    }

    if data.len() < V1_HEADER_SIZE + 2 {
        return Err(FormatError::BadFile("truncated .z80 extension header length".into()));
    }
    let ext_len = u16::from_le_bytes([data[30], data[31]]) as usize;
    let ext_start = V1_HEADER_SIZE + 2;
    if data.len() < ext_start + ext_len {
        return Err(FormatError::BadFile("truncated .z80 extension header".into()));
    }
    let ext = &data[ext_start..ext_start + ext_len];
    if ext.len() < 4 {
        return Err(FormatError::BadFile("extension header too short to carry PC/mode".into()));
    }
    regs.pc = u16::from_le_bytes([ext[0], ext[1]]);
    let hw_mode = ext[2];
    let out_7ffd = ext[3];
    let flags2 = Flags2::from_bits_truncate(h[29]);
    regs.im = (flags2 & Flags2::INTR_MODE_MASK).bits();

    let version = match ext_len {
        23 => Z80Version::V2,
        54 | 55 => Z80Version::V3,
        other => {
            return Err(FormatError::BadFile(format!(
                "unrecognised .z80 extension header length {}",
                other
            )))
        }
    };
    let is_128k = match version {
        Z80Version::V2 => matches!(hw_mode, 3 | 4),
        Z80Version::V3 => matches!(hw_mode, 3 | 4 | 5 | 6 | 7),
        Z80Version::V1 => false,
    };

    let pages_start = ext_start + ext_len;
    let pages = parse_page_blocks(&data[pages_start..])?;

    Ok(Snapshot {
        version,
        registers: regs,
        border,
        port_7ffd: if is_128k { Some(out_7ffd) } else { None },
        is_128k,
        pages,
    })
}

fn load_v1(data: &[u8], regs: CpuRegisters, border: u8, flags1: Flags1) -> Result<Snapshot> {
    let body = &data[V1_HEADER_SIZE..];
    let mut image = vec![0u8; 3 * PAGE_SIZE];
    if flags1.contains(Flags1::MEM_COMPRESSED) {
        let end = body
            .windows(4)
            .position(|w| w == V1_END_MARKER)
            .unwrap_or(body.len());
        decompress_into(&body[..end], &mut image);
    } else {
        let n = body.len().min(image.len());
        image[..n].copy_from_slice(&body[..n]);
    }
    let pages = vec![
        PageData::new(8, image[0..PAGE_SIZE].to_vec()),
        PageData::new(4, image[PAGE_SIZE..2 * PAGE_SIZE].to_vec()),
        PageData::new(5, image[2 * PAGE_SIZE..3 * PAGE_SIZE].to_vec()),
    ];
    Ok(Snapshot {
        version: Z80Version::V1,
        registers: regs,
        border,
        port_7ffd: None,
        is_128k: false,
        pages,
    })
}

fn parse_page_blocks(mut rest: &[u8]) -> Result<Vec<PageData>> {
    let mut pages = Vec::new();
    while rest.len() >= 3 {
        let length = u16::from_le_bytes([rest[0], rest[1]]);
        let page_id = rest[2];
        rest = &rest[3..];
        if length == 0xFFFF {
            if rest.len() < PAGE_SIZE {
                return Err(FormatError::BadBlock(format!(
                    "uncompressed page {} truncated",
                    page_id
                )));
            }
            pages.push(PageData::new(page_id, rest[..PAGE_SIZE].to_vec()));
            rest = &rest[PAGE_SIZE..];
        } else {
            let length = length as usize;
            if rest.len() < length {
                return Err(FormatError::BadBlock(format!(
                    "compressed page {} declares {} bytes but only {} remain",
                    page_id,
                    length,
                    rest.len()
                )));
            }
            let mut image = vec![0u8; PAGE_SIZE];
            decompress_into(&rest[..length], &mut image);
            pages.push(PageData::new(page_id, image));
            rest = &rest[length..];
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_header(pc: u16, compressed: bool) -> Vec<u8> {
        let mut h = vec![0u8; V1_HEADER_SIZE];
        h[6..8].copy_from_slice(&pc.to_le_bytes());
        h[12] = if compressed { 0x20 } else { 0x00 };
        h
    }

    #[test]
    fn loads_uncompressed_v1_snapshot() {
        let mut file = v1_header(0x8000, false);
        file.extend_from_slice(&vec![0xAAu8; 3 * PAGE_SIZE]);
        let snap = load(&file).unwrap();
        assert_eq!(snap.version, Z80Version::V1);
        assert_eq!(snap.registers.pc, 0x8000);
        assert_eq!(snap.pages.len(), 3);
        assert!(snap.pages.iter().all(|p| p.data == vec![0xAAu8; PAGE_SIZE]));
    }

    #[test]
    fn loads_compressed_v1_snapshot_with_end_marker() {
        let mut file = v1_header(0x8000, true);
        let mut body = super::super::compress::compress(&vec![0x11u8; 3 * PAGE_SIZE]);
        body.extend_from_slice(&V1_END_MARKER);
        file.extend_from_slice(&body);
        let snap = load(&file).unwrap();
        assert!(snap.pages.iter().all(|p| p.data == vec![0x11u8; PAGE_SIZE]));
    }

    #[test]
    fn detects_v2_extension_header_and_pages() {
        let mut file = v1_header(0, false);
        let ext_len = 23u16;
        file.extend_from_slice(&ext_len.to_le_bytes());
        let mut ext = vec![0u8; 23];
        ext[0..2].copy_from_slice(&0x9000u16.to_le_bytes()); // real PC
        ext[2] = 4; // 128k mode
        ext[3] = 0x07; // last OUT to 0x7ffd
        file.extend_from_slice(&ext);
        // one raw page, id 8
        file.extend_from_slice(&0xFFFFu16.to_le_bytes());
        file.push(8);
        file.extend_from_slice(&[0x55u8; PAGE_SIZE]);
        let snap = load(&file).unwrap();
        assert_eq!(snap.version, Z80Version::V2);
        assert_eq!(snap.registers.pc, 0x9000);
        assert!(snap.is_128k);
        assert_eq!(snap.port_7ffd, Some(0x07));
        assert_eq!(snap.pages.len(), 1);
        assert_eq!(snap.pages[0].page_id, 8);
    }

    #[test]
    fn rejects_file_shorter_than_base_header() {
        assert!(load(&[0u8; 10]).is_err());
    }
}
