//! Cycle accounting.
//!
//! Per the core's design notes we keep a single cumulative T-state counter
//! rather than the per-chipset contended-memory clock a cycle-exact
//! implementation would need; frame boundaries are derived by comparing
//! this counter against [`FRAME_TSTATES_48K`]/[`FRAME_TSTATES_128K`], not by
//! a secondary periodic timer.

/// Cumulative T-state counter type. 64 bits so it never wraps in practice:
/// at 3.5 MHz this overflows after roughly 83,000 years of emulated time.
pub type TStates = u64;

/// T-states per 48K PAL video frame (50.08 Hz refresh).
pub const FRAME_TSTATES_48K: u32 = 69_888;

/// T-states per 128K PAL video frame.
pub const FRAME_TSTATES_128K: u32 = 70_908;

/// CPU clock, 48K/128K models (both run the Z80 at 3.5 MHz).
pub const CPU_HZ: u32 = 3_500_000;

/// Video frames per second, nominal PAL rate used to derive the 50 Hz
/// refresh/FLASH cadence (spec §4.6: FLASH toggles every 16 frames).
pub const FRAMES_PER_SECOND: u32 = 50;

/// Number of frames between FLASH phase toggles.
pub const FLASH_FRAME_PERIOD: u32 = 16;
