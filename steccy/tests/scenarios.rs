//! End-to-end scenarios from spec.md §8, exercised through the public API
//! rather than any module's internals.
use steccy::cpu::{Cpu, Flags};
use steccy::io::IoBus;
use steccy::machine::Machine;
use steccy::memory::{Memory, PAGE_SIZE};
use steccy::screen::{FrameSink, Screen};
use steccy_core::color::palette_entry;

#[derive(Default)]
struct RecordingSink {
    fills: Vec<(u16, u16, u16, u16, u16)>,
    pixels: Vec<u16>,
}

impl FrameSink for RecordingSink {
    fn set_window(&mut self, _x0: u16, _y0: u16, _x1: u16, _y1: u16) {}
    fn write_pixel(&mut self, rgb565: u16) {
        self.pixels.push(rgb565);
    }
    fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, rgb565: u16) {
        self.fills.push((x0, y0, x1, y1, rgb565));
    }
}

fn tap_header_chunk() -> Vec<u8> {
    let mut payload = vec![0x00u8]; // flag: header
    payload.push(3); // type CODE
    payload.extend_from_slice(b"TEST      ");
    payload.extend_from_slice(&2u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&32768u16.to_le_bytes());
    let checksum = payload.iter().fold(0u8, |a, &b| a ^ b);
    payload.push(checksum);
    payload
}

fn tap_file() -> Vec<u8> {
    let chunk = tap_header_chunk();
    let mut file = (chunk.len() as u16).to_le_bytes().to_vec();
    file.extend_from_slice(&chunk);
    file
}

/// Scenario 1: LD-BYTES fast-path, header success.
#[test]
fn ld_bytes_fast_path_loads_header_and_sets_carry() {
    let mut m = Machine::new(false, &[[0u8; PAGE_SIZE]], 1);
    m.load_tap(&tap_file()).expect("tap parses");

    let chunk = tap_header_chunk();
    let len = (chunk.len() - 1) as u16; // payload + checksum, minus flag byte

    m.cpu.regs.pc = 0x0556;
    m.cpu.regs.sp = 0xFFF0;
    m.memory.write16(0xFFF0, 0x8123);
    m.cpu.regs.f.insert(Flags::C); // expecting a header block
    m.cpu.regs.ix.set(0x5CCC);
    m.cpu.regs.de.set(len);
    m.cpu.regs.a_alt = 0x00; // expected type: header

    let mut sink = RecordingSink::default();
    m.run_frame(&mut sink);

    assert!(m.cpu.regs.f.contains(Flags::C));
    assert_eq!(m.cpu.regs.pc, 0x8123);
    assert_eq!(m.memory.read8(0x5CCC), chunk[1]);
}

/// Scenario 2: FLASH attribute toggles every 16 frames.
#[test]
fn flash_attribute_toggles_every_sixteen_frames() {
    let mut mem = Memory::new(false, &[[0u8; PAGE_SIZE]]);
    let io = IoBus::new();
    mem.write8(0x5800, 0x8F); // flash, ink white, paper black
    mem.write8(0x4000, 0xAA);

    let mut screen = Screen::new(1);
    let mut sink = RecordingSink::default();

    screen.render_frame(&mem, &io, &mut sink); // frame 1: forced full repaint
    let before_flip = sink.pixels.clone();
    assert!(!before_flip.is_empty());

    for _ in 0..14 {
        sink.pixels.clear();
        screen.render_frame(&mem, &io, &mut sink);
    }
    assert!(sink.pixels.is_empty()); // frames 2..15: nothing changed, cell not re-emitted

    sink.pixels.clear();
    screen.render_frame(&mem, &io, &mut sink); // frame 16: phase flips, cell re-emitted
    assert!(!sink.pixels.is_empty());
    // Ink/paper swapped on the flip, so every pixel in the 8x1 block inverts.
    assert_ne!(sink.pixels, before_flip);

    for _ in 0..15 {
        sink.pixels.clear();
        screen.render_frame(&mem, &io, &mut sink);
    }
    assert!(sink.pixels.is_empty()); // frames 17..31: nothing changed again

    sink.pixels.clear();
    screen.render_frame(&mem, &io, &mut sink); // frame 32: reverted
    assert_eq!(sink.pixels, before_flip);
}

/// Scenario 3: paging lock.
#[test]
fn paging_lock_keeps_bank_zero_mapped_after_locked_out() {
    let mut cpu = Cpu::new();
    let mut mem = Memory::new(true, &[[0u8; PAGE_SIZE]; 2]);
    let mut io = IoBus::new();

    let mut bank0 = [0u8; PAGE_SIZE];
    bank0[0] = 0xAA;
    mem.load_ram_bank(0, &bank0);
    let mut bank1 = [0u8; PAGE_SIZE];
    bank1[0] = 0xBB;
    mem.load_ram_bank(1, &bank1);

    // LD BC,0x7FFD ; LD A,0x20 ; OUT (C),A ; LD A,0x01 ; OUT (C),A
    let program: [u8; 10] = [0x01, 0xFD, 0x7F, 0x3E, 0x20, 0xED, 0x79, 0x3E, 0x01, 0xED];
    cpu.regs.pc = 0x8000;
    for (i, &b) in program.iter().enumerate() {
        mem.write8(0x8000 + i as u16, b);
    }
    mem.write8(0x8000 + program.len() as u16, 0x79); // second OUT (C),A's trailing byte

    for _ in 0..5 {
        cpu.step(&mut mem, &mut io);
    }

    assert!(mem.paging_locked());
    assert_eq!(mem.read8(0xC000), 0xAA); // still bank 0, the second OUT was ignored
}

/// Scenario 4: Kempston right.
#[test]
fn kempston_right_reads_back_as_bit_zero() {
    let mut cpu = Cpu::new();
    let mut mem = Memory::new(false, &[[0u8; PAGE_SIZE]]);
    let mut io = IoBus::new();
    io.set_kempston(0x01); // right pressed, per joystick::apply(Scheme::Kempston, RIGHT, false)

    cpu.regs.pc = 0x8000;
    mem.write8(0x8000, 0xDB); // IN A,(n)
    mem.write8(0x8001, 0x1F);

    cpu.step(&mut mem, &mut io);
    assert_eq!(cpu.regs.a, 0x01);
}

/// Scenario 5: border change.
#[test]
fn border_change_repaints_border_only() {
    let mem = Memory::new(false, &[[0u8; PAGE_SIZE]]);
    let mut io = IoBus::new();
    let mut screen = Screen::new(1);
    let mut sink = RecordingSink::default();
    screen.render_frame(&mem, &io, &mut sink); // initial forced repaint

    let mut paging_mem = Memory::new(false, &[[0u8; PAGE_SIZE]]);
    io.out8(0x00FE, 0x02, &mut paging_mem);
    sink.fills.clear();
    screen.render_frame(&mem, &io, &mut sink);

    assert!(!sink.fills.is_empty());
    let red = palette_entry(2, false);
    assert!(sink.fills.iter().all(|&(_, _, _, _, colour)| colour == red));
}

/// Scenario 6: DDCB semantics.
#[test]
fn ddcb_bit_test_advances_pc_by_four_and_bumps_r_twice() {
    let mut cpu = Cpu::new();
    let mut mem = Memory::new(false, &[[0u8; PAGE_SIZE]]);
    let mut io = IoBus::new();

    cpu.regs.pc = 0x8000;
    cpu.regs.ix.set(0x4000);
    mem.write8(0x8000, 0xDD);
    mem.write8(0x8001, 0xCB);
    mem.write8(0x8002, 0x05);
    mem.write8(0x8003, 0x40); // BIT 0,(IX+5)
    mem.write8(0x4005, 0x01);

    let r_before = cpu.regs.r;
    cpu.step(&mut mem, &mut io);

    assert_eq!(cpu.regs.pc, 0x8004);
    assert!(!cpu.regs.f.contains(Flags::Z));
    assert!(!cpu.regs.f.contains(Flags::N));
    assert!(cpu.regs.f.contains(Flags::H));
    assert_eq!((cpu.regs.r.wrapping_sub(r_before)) & 0x7F, 2);
}
