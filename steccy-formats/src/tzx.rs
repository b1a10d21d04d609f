//! `.tzx` container parsing, normalised to [`tap::TapBlock`]s.
//!
//! A `.tzx` file opens with the signature `ZXTape!\x1A` followed by two
//! version bytes, then a sequence of blocks identified by a leading ID byte.
//! Only `0x10` (standard speed data) and `0x11` (turbo speed data) carry a
//! tape-shaped payload that the ROM-hook trap can read; every other
//! supported ID is skipped using its own declared length field, never
//! heuristically (spec §4.5, design note "`.tzx` skipping").
use crate::error::{FormatError, Result};
use crate::tap::TapBlock;

const SIGNATURE: &[u8] = b"ZXTape!\x1A";

/// Parse a `.tzx` file into the data blocks it carries, normalised to the
/// same shape `parse_tap_blocks` produces (flag + payload + checksum).
pub fn parse_tzx_blocks(data: &[u8]) -> Result<Vec<TapBlock>> {
    if data.len() < SIGNATURE.len() + 2 {
        return Err(FormatError::BadFile("file shorter than TZX header".into()));
    }
    if &data[..SIGNATURE.len()] != SIGNATURE {
        return Err(FormatError::BadFile("missing ZXTape!\\x1A signature".into()));
    }
    let mut pos = SIGNATURE.len() + 2; // skip major/minor version bytes
    let mut blocks = Vec::new();

    while pos < data.len() {
        let id = data[pos];
        pos += 1;
        let rest = &data[pos..];
        let (payload, consumed) = read_block(id, rest)?;
        if let Some(payload) = payload {
            blocks.push(TapBlock::from_raw(payload));
        }
        pos += consumed;
    }
    Ok(blocks)
}

fn need(rest: &[u8], n: usize, what: &str) -> Result<()> {
    if rest.len() < n {
        Err(FormatError::BadBlock(format!(
            "{} needs {} bytes but only {} remain",
            what,
            n,
            rest.len()
        )))
    } else {
        Ok(())
    }
}

fn le16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le24(b: &[u8]) -> usize {
    b[0] as usize | (b[1] as usize) << 8 | (b[2] as usize) << 16
}

fn le32(b: &[u8]) -> usize {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
}

/// Returns the normalised tap-shaped payload (if the block carries one) and
/// the number of bytes consumed from `rest` (not counting the ID byte
/// already stripped by the caller).
fn read_block(id: u8, rest: &[u8]) -> Result<(Option<Vec<u8>>, usize)> {
    match id {
        // Standard speed data block: pause(2) + length(2) + data.
        0x10 => {
            need(rest, 4, "standard speed data block")?;
            let length = le16(&rest[2..4]) as usize;
            need(rest, 4 + length, "standard speed data payload")?;
            Ok((Some(rest[4..4 + length].to_vec()), 4 + length))
        }
        // Turbo speed data block: six u16 timing fields + used-bits(1) +
        // pause(2) + 24-bit length + data. Timings are ignored at replay;
        // the payload is preserved verbatim for C4.
        0x11 => {
            need(rest, 18, "turbo speed data block header")?;
            let length = le24(&rest[15..18]);
            need(rest, 18 + length, "turbo speed data payload")?;
            Ok((Some(rest[18..18 + length].to_vec()), 18 + length))
        }
        // Pure tone: pulse length(2) + num pulses(2).
        0x12 => {
            need(rest, 4, "pure tone block")?;
            Ok((None, 4))
        }
        // Pulse sequence: num pulses(1) + pulses(2 * num).
        0x13 => {
            need(rest, 1, "pulse sequence block")?;
            let n = rest[0] as usize;
            need(rest, 1 + 2 * n, "pulse sequence data")?;
            Ok((None, 1 + 2 * n))
        }
        // Pure data block: zero(2) + one(2) + used-bits(1) + pause(2) + 24-bit length + data.
        0x14 => {
            need(rest, 10, "pure data block header")?;
            let length = le24(&rest[7..10]);
            need(rest, 10 + length, "pure data block payload")?;
            Ok((None, 10 + length))
        }
        // Direct recording: t-states/sample(2) + pause(2) + used-bits(1) + 24-bit length + data.
        0x15 => {
            need(rest, 8, "direct recording header")?;
            let length = le24(&rest[5..8]);
            need(rest, 8 + length, "direct recording payload")?;
            Ok((None, 8 + length))
        }
        // Pause (silence) / stop the tape: duration(2) — this *is* the body, not a length prefix.
        0x20 => {
            need(rest, 2, "pause/stop block")?;
            Ok((None, 2))
        }
        // Group start: length(1) + name.
        0x21 => {
            need(rest, 1, "group start block")?;
            let n = rest[0] as usize;
            need(rest, 1 + n, "group start name")?;
            Ok((None, 1 + n))
        }
        // Group end: no body.
        0x22 => Ok((None, 0)),
        // Text description: length(1) + text.
        0x30 => {
            need(rest, 1, "text description block")?;
            let n = rest[0] as usize;
            need(rest, 1 + n, "text description body")?;
            Ok((None, 1 + n))
        }
        // Archive info: length(2) + data.
        0x32 => {
            need(rest, 2, "archive info block")?;
            let n = le16(&rest[0..2]) as usize;
            need(rest, 2 + n, "archive info body")?;
            Ok((None, 2 + n))
        }
        // Hardware type: count(1) + 3 bytes per entry.
        0x33 => {
            need(rest, 1, "hardware type block")?;
            let n = rest[0] as usize;
            need(rest, 1 + 3 * n, "hardware type entries")?;
            Ok((None, 1 + 3 * n))
        }
        // C64 ROM/turbo tape data (deprecated since TZX 1.10): 32-bit length + data.
        0x16 | 0x17 => {
            need(rest, 4, "deprecated C64 data block")?;
            let length = le32(&rest[0..4]);
            need(rest, 4 + length, "deprecated C64 data payload")?;
            Ok((None, 4 + length))
        }
        // CSW recording / generalized data block: 32-bit length + data.
        0x18 | 0x19 => {
            need(rest, 4, "CSW/generalized data block header")?;
            let length = le32(&rest[0..4]);
            need(rest, 4 + length, "CSW/generalized data payload")?;
            Ok((None, 4 + length))
        }
        // Jump to block: relative block offset(2).
        0x23 => {
            need(rest, 2, "jump block")?;
            Ok((None, 2))
        }
        // Loop start: repeat count(2).
        0x24 => {
            need(rest, 2, "loop start block")?;
            Ok((None, 2))
        }
        // Loop end: no body.
        0x25 => Ok((None, 0)),
        // Call sequence: num calls(2) + offset(2) per call.
        0x26 => {
            need(rest, 2, "call sequence block")?;
            let n = le16(&rest[0..2]) as usize;
            need(rest, 2 + 2 * n, "call sequence offsets")?;
            Ok((None, 2 + 2 * n))
        }
        // Return from sequence: no body.
        0x27 => Ok((None, 0)),
        // Select block: length(2) + data.
        0x28 => {
            need(rest, 2, "select block")?;
            let n = le16(&rest[0..2]) as usize;
            need(rest, 2 + n, "select block body")?;
            Ok((None, 2 + n))
        }
        // Stop the tape if in 48K mode: 32-bit length, always 0, no further data.
        0x2A => {
            need(rest, 4, "stop-if-48k block")?;
            Ok((None, 4))
        }
        // Set signal level: 32-bit length (always 1) + signal level(1).
        0x2B => {
            need(rest, 5, "set signal level block")?;
            Ok((None, 5))
        }
        // Message block: display time(1) + length(1) + text.
        0x31 => {
            need(rest, 2, "message block header")?;
            let n = rest[1] as usize;
            need(rest, 2 + n, "message block text")?;
            Ok((None, 2 + n))
        }
        // Emulation info (deprecated): fixed 8 bytes.
        0x34 => {
            need(rest, 8, "emulation info block")?;
            Ok((None, 8))
        }
        // Custom info block: id(10) + length(4) + data.
        0x35 => {
            need(rest, 14, "custom info block header")?;
            let length = le32(&rest[10..14]);
            need(rest, 14 + length, "custom info payload")?;
            Ok((None, 14 + length))
        }
        // Snapshot block (deprecated): 24-bit length + data.
        0x40 => {
            need(rest, 3, "snapshot block header")?;
            let length = le24(rest);
            need(rest, 3 + length, "snapshot block payload")?;
            Ok((None, 3 + length))
        }
        // Glue block: fixed 9-byte body ("XTape!\x1A" + major + minor).
        0x5A => {
            need(rest, 9, "glue block")?;
            Ok((None, 9))
        }
        other => Err(FormatError::BadBlock(format!(
            "unsupported TZX block id 0x{:02X}",
            other
        ))),
    }
}
