//! `Machine`: owns C1-C7 and drives the frame loop (spec §9 design notes).
//!
//! This replaces the teacher's generic `ControlUnit`/`Video` trait sprawl —
//! built to support many incompatible chipsets (ULA, ULA128, ULA3, SCLD,
//! ULA+) — with one concrete struct, since this core only ever targets the
//! 48K/128K ULA (REDESIGN FLAGS).
use std::collections::VecDeque;

use log::warn;

use steccy_core::clock::{FRAME_TSTATES_128K, FRAME_TSTATES_48K};
use steccy_core::joystick::{JoystickEdit, Scheme};
use steccy_core::ZXKeyboardMap;
use steccy_formats::{parse_tap_blocks, parse_tzx_blocks, z80snap, FormatError, Tape};

use crate::cpu::{Cpu, Flags};
use crate::error::MachineError;
use crate::input::{JoystickInput, KeyboardInput};
use crate::io::IoBus;
use crate::memory::Memory;
use crate::menu::{autostart_sequence, Menu, MenuAction, PokeList};
use crate::romhook::{RomHook, RomHookTable};
use crate::screen::{FrameSink, Screen};

/// Owns the whole emulated machine and every piece of mutable state an
/// embedder would otherwise have to wire up by hand. `!Sync` by design —
/// the screen shadow buffers and tape cursor are only ever touched from the
/// single owning thread (spec §5), same posture as the teacher's `Ula`.
pub struct Machine {
    pub memory: Memory,
    pub io: IoBus,
    pub cpu: Cpu,
    pub romhook: RomHook,
    pub screen: Screen,
    pub keyboard: KeyboardInput,
    pub joystick: JoystickInput,
    pub menu: Menu,
    pokes: PokeList,
    tape: Option<Tape>,
    autostart_enabled: bool,
    autostart_queue: VecDeque<ZXKeyboardMap>,
    autostart_hold: Option<ZXKeyboardMap>,
    joystick_edit: JoystickEdit,
}

impl Machine {
    /// `rom_images` must hold exactly 1 image for 48K or 2 for 128K, same
    /// requirement as [`Memory::new`].
    pub fn new(is_128k: bool, rom_images: &[[u8; crate::memory::PAGE_SIZE]], zoom: u16) -> Self {
        Machine {
            memory: Memory::new(is_128k, rom_images),
            io: IoBus::new(),
            cpu: Cpu::new(),
            romhook: RomHook::new(RomHookTable::default()),
            screen: Screen::new(zoom),
            keyboard: KeyboardInput::new(),
            joystick: JoystickInput::new(Scheme::Kempston),
            menu: Menu::new(),
            pokes: PokeList::new(),
            tape: None,
            autostart_enabled: false,
            autostart_queue: VecDeque::new(),
            autostart_hold: None,
            joystick_edit: JoystickEdit::Keys(ZXKeyboardMap::empty()),
        }
    }

    /// Reset the CPU and address space and force a full screen repaint
    /// (spec §9 "Menu -> CPU resumption" applies equally here).
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.memory.reset();
        self.screen.force_redraw();
    }

    pub fn set_autostart_enabled(&mut self, enabled: bool) {
        self.autostart_enabled = enabled;
    }

    pub fn autostart_enabled(&self) -> bool {
        self.autostart_enabled
    }

    pub fn pokes_mut(&mut self) -> &mut PokeList {
        &mut self.pokes
    }

    pub fn pokes(&self) -> &PokeList {
        &self.pokes
    }

    /// Apply every stored POKE entry to RAM immediately (SPEC_FULL §10).
    pub fn apply_pokes(&mut self) {
        self.pokes.apply(&mut self.memory);
    }

    pub fn load_tap(&mut self, data: &[u8]) -> Result<(), MachineError> {
        let blocks = parse_tap_blocks(data)?;
        self.tape = Some(Tape::new(blocks));
        self.romhook.set_enabled(true);
        Ok(())
    }

    pub fn load_tzx(&mut self, data: &[u8]) -> Result<(), MachineError> {
        let blocks = parse_tzx_blocks(data)?;
        self.tape = Some(Tape::new(blocks));
        self.romhook.set_enabled(true);
        Ok(())
    }

    pub fn tape_loaded(&self) -> bool {
        self.tape.is_some()
    }

    /// Load a `.z80` snapshot onto this machine's register file and RAM
    /// banks (spec §4.5/§9). The snapshot's hardware mode must match the
    /// machine it's loaded into — this core never reconfigures a running
    /// machine's bank count on the fly.
    pub fn load_z80_snapshot(&mut self, data: &[u8]) -> Result<(), MachineError> {
        let snap = z80snap::load(data)?;
        if snap.is_128k != self.memory.is_128k() {
            return Err(MachineError::Format(FormatError::BadFile(
                "snapshot hardware mode does not match this machine".into(),
            )));
        }

        let r = &snap.registers;
        self.cpu.regs.a = r.a;
        self.cpu.regs.f = Flags::from_bits_truncate(r.f);
        self.cpu.regs.bc.set(r.bc);
        self.cpu.regs.de.set(r.de);
        self.cpu.regs.hl.set(r.hl);
        self.cpu.regs.a_alt = r.a_alt;
        self.cpu.regs.f_alt = Flags::from_bits_truncate(r.f_alt);
        self.cpu.regs.bc_alt.set(r.bc_alt);
        self.cpu.regs.de_alt.set(r.de_alt);
        self.cpu.regs.hl_alt.set(r.hl_alt);
        self.cpu.regs.ix.set(r.ix);
        self.cpu.regs.iy.set(r.iy);
        self.cpu.regs.sp = r.sp;
        self.cpu.regs.pc = r.pc;
        self.cpu.regs.i = r.i;
        self.cpu.regs.r = r.r;
        self.cpu.regs.iff1 = r.iff1;
        self.cpu.regs.iff2 = r.iff2;
        self.cpu.regs.im = r.im;

        self.io.out8(0x00FE, snap.border & 0x07, &mut self.memory);

        if let Some(p7ffd) = snap.port_7ffd {
            self.memory.set_paging(p7ffd);
        }

        for page in &snap.pages {
            let bank = if self.memory.is_128k() {
                z80snap::page_id_to_128k_bank(page.page_id)
            } else {
                z80snap::page_id_to_48k_bank(page.page_id)
            };
            match bank {
                Some(bank) => self.memory.load_ram_bank(bank, &page.data),
                None => warn!("snapshot page id {} has no bank mapping, ignored", page.page_id),
            }
        }

        self.screen.force_redraw();
        self.memory.mark_video_ram_changed();
        Ok(())
    }

    /// `(scancode, released)` PS/2-style keyboard event (spec §6).
    pub fn handle_scancode(&mut self, scancode: u16, released: bool) {
        self.keyboard.handle_scancode(scancode, released);
    }

    /// Analogue joystick axes plus a button bitmap (spec §6).
    pub fn handle_joystick_axes(&mut self, x: i16, y: i16, buttons: u16) {
        self.joystick_edit = self.joystick.handle_axes(x, y, buttons);
    }

    /// Route a keypress to the menu while it's open; returns the action the
    /// embedder must perform, applying the ones this core can service
    /// itself (`Reset`, `ToggleAutostart`, `Resume`) along the way.
    pub fn handle_menu_key(&mut self, key: ZXKeyboardMap) -> Option<MenuAction> {
        let action = self.menu.handle_key(key)?;
        match action {
            MenuAction::Reset => self.reset(),
            MenuAction::ToggleAutostart => self.autostart_enabled = !self.autostart_enabled,
            MenuAction::Resume => {
                self.screen.force_redraw();
                self.memory.mark_video_ram_changed();
            }
            MenuAction::ToggleRecording | MenuAction::RequestLoad | MenuAction::RequestSnapshot => {}
        }
        Some(action)
    }

    fn frame_tstates(&self) -> u32 {
        if self.memory.is_128k() {
            FRAME_TSTATES_128K
        } else {
            FRAME_TSTATES_48K
        }
    }

    fn queue_autostart(&mut self) {
        if self.autostart_enabled {
            self.autostart_queue = autostart_sequence().iter().copied().collect();
        }
    }

    /// Drains one keystroke of the autostart sequence every other frame: a
    /// key is held for exactly one frame, then released for the next, so
    /// the guest's keyboard scan routine can observe a real press edge.
    fn next_autostart_key(&mut self) -> ZXKeyboardMap {
        if let Some(key) = self.autostart_hold.take() {
            return key;
        }
        if let Some(key) = self.autostart_queue.pop_front() {
            self.autostart_hold = Some(key);
            return key;
        }
        ZXKeyboardMap::empty()
    }

    /// Run the CPU for one video frame's worth of T-states, feeding the ROM
    /// hook, keyboard matrix and IRQ cadence exactly as spec §4.3/§9
    /// describe, then repaint via `sink`. A no-op (and returns 0) while the
    /// menu is open, since the CPU loop is suspended for the duration (spec
    /// §5).
    pub fn run_frame(&mut self, sink: &mut dyn FrameSink) -> u32 {
        if self.menu.is_active() {
            return 0;
        }

        let budget = self.frame_tstates();
        let mut consumed = 0u32;
        while consumed < budget {
            if let Some(tape) = self.tape.as_mut() {
                if self.romhook.try_intercept(&mut self.cpu, &mut self.memory, tape) {
                    if tape.is_exhausted() {
                        self.queue_autostart();
                    }
                    continue;
                }
            }
            consumed += self.cpu.step(&mut self.memory, &mut self.io);
        }
        self.cpu.request_irq();

        let autostart_key = self.next_autostart_key();
        match self.joystick_edit {
            JoystickEdit::Keys(keys) => self.keyboard.apply_to(&mut self.io, keys | autostart_key),
            JoystickEdit::Kempston(bits) => {
                self.keyboard.apply_to(&mut self.io, autostart_key);
                self.io.set_kempston(bits);
            }
        }

        self.screen.render_frame(&self.memory, &self.io, sink);
        self.memory.clear_video_ram_changed();
        consumed
    }
}
