//! The unprefixed opcode table (`x=0..3` groups), also used — with a
//! substituted [`Prefix`] — for the bulk of `DD`/`FD` instructions (spec
//! §4.3).
use super::{alu, fields, pair_get, pair_set, qq_get, qq_set, reg8_get, reg8_set, resolve_addr6, Cpu, Flags, Prefix};
use crate::io::IoBus;
use crate::memory::Memory;

fn condition(cpu: &Cpu, y: u8) -> bool {
    let f = cpu.regs.f;
    match y {
        0 => !f.contains(Flags::Z),
        1 => f.contains(Flags::Z),
        2 => !f.contains(Flags::C),
        3 => f.contains(Flags::C),
        4 => !f.contains(Flags::PV),
        5 => f.contains(Flags::PV),
        6 => !f.contains(Flags::S),
        7 => f.contains(Flags::S),
        _ => unreachable!(),
    }
}

fn alu_op(cpu: &mut Cpu, y: u8, operand: u8) {
    let a = cpu.regs.a;
    let (result, flags) = match y {
        0 => alu::add8(a, operand, false),
        1 => alu::add8(a, operand, cpu.regs.f.contains(Flags::C)),
        2 => alu::sub8(a, operand, false),
        3 => alu::sub8(a, operand, cpu.regs.f.contains(Flags::C)),
        4 => alu::and8(a, operand),
        5 => alu::xor8(a, operand),
        6 => alu::or8(a, operand),
        7 => {
            cpu.regs.f = alu::cp8(a, operand);
            return;
        }
        _ => unreachable!(),
    };
    cpu.regs.a = result;
    cpu.regs.f = flags;
}

/// Flat surcharge for DD/FD forms that only substitute a whole 16-bit pair
/// or an 8-bit half-register (`IXH`/`IXL`) for `HL`/`H`/`L` — no displacement
/// byte is fetched, so the real hardware only spends the 4 T-states of the
/// prefix fetch itself.
fn register_bonus(prefix: Prefix) -> u32 {
    if prefix != Prefix::None {
        4
    } else {
        0
    }
}

/// Surcharge for 8-bit load/INC/DEC/ALU forms that read or write through
/// `(IX+d)`/`(IY+d)` (i.e. went through [`resolve_addr6`] with a live
/// prefix): the real hardware fetches the prefix, the opcode and the
/// displacement byte before touching memory, 12 T-states more than the
/// equivalent `(HL)` form.
fn indexed_bonus(prefix: Prefix) -> u32 {
    if prefix != Prefix::None {
        12
    } else {
        0
    }
}

/// Execute one opcode from the unprefixed table, substituting `IX`/`IY`
/// for `HL`-shaped operands when `prefix != Prefix::None` (used for the
/// bulk of `DD xx`/`FD xx` instructions).
///
/// `x0`/`x1`/`x2` compute their own prefix surcharge per arm, since
/// `resolve_addr6`-based forms (INC/DEC/LD/ALU through `(IX+d)`/`(IY+d)`)
/// cost far more than the flat +4 the register-substitution forms pay;
/// `x3` never touches `resolve_addr6`, so a flat +4 is correct for all of it.
pub fn execute(cpu: &mut Cpu, opcode: u8, mem: &mut Memory, io: &mut IoBus, prefix: Prefix) -> u32 {
    let f = fields(opcode);
    match f.x {
        0 => execute_x0(cpu, f, mem, prefix),
        1 => execute_x1(cpu, f, mem, prefix),
        2 => execute_x2(cpu, f, mem, prefix),
        3 => execute_x3(cpu, f, mem, io, prefix) + register_bonus(prefix),
        _ => unreachable!(),
    }
}

fn execute_x0(cpu: &mut Cpu, f: super::Fields, mem: &mut Memory, prefix: Prefix) -> u32 {
    match f.z {
        0 => {
            register_bonus(prefix)
                + match f.y {
                    0 => 4, // NOP
                    1 => {
                        cpu.regs.ex_af_af();
                        4
                    }
                    2 => {
                        cpu.regs.bc.hi = cpu.regs.bc.hi.wrapping_sub(1);
                        let d = cpu.fetch_byte(mem) as i8;
                        if cpu.regs.bc.hi != 0 {
                            cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                            13
                        } else {
                            8
                        }
                    }
                    3 => {
                        let d = cpu.fetch_byte(mem) as i8;
                        cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                        12
                    }
                    y => {
                        let d = cpu.fetch_byte(mem) as i8;
                        if condition(cpu, y - 4) {
                            cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                            12
                        } else {
                            7
                        }
                    }
                }
        }
        1 => {
            register_bonus(prefix)
                + if f.q == 0 {
                    let nn = cpu.fetch_word(mem);
                    pair_set(cpu, f.p, prefix, nn);
                    10
                } else {
                    let hl = pair_get(cpu, 2, prefix);
                    let operand = pair_get(cpu, f.p, prefix);
                    let (result, flags) = alu::add16(hl, operand, cpu.regs.f);
                    pair_set(cpu, 2, prefix, result);
                    cpu.regs.f = flags;
                    11
                }
        }
        2 => execute_indirect_load(cpu, f, mem, prefix) + register_bonus(prefix),
        3 => {
            let v = pair_get(cpu, f.p, prefix);
            let result = if f.q == 0 { v.wrapping_add(1) } else { v.wrapping_sub(1) };
            pair_set(cpu, f.p, prefix, result);
            6 + register_bonus(prefix)
        }
        4 => {
            if f.y == 6 {
                let addr = resolve_addr6(cpu, mem, prefix);
                let v = mem.read8(addr);
                let (result, flags) = alu::inc8(v, cpu.regs.f);
                mem.write8(addr, result);
                cpu.regs.f = flags;
                11 + indexed_bonus(prefix)
            } else {
                let v = reg8_get(cpu, f.y, prefix);
                let (result, flags) = alu::inc8(v, cpu.regs.f);
                reg8_set(cpu, f.y, prefix, result);
                cpu.regs.f = flags;
                4 + register_bonus(prefix)
            }
        }
        5 => {
            if f.y == 6 {
                let addr = resolve_addr6(cpu, mem, prefix);
                let v = mem.read8(addr);
                let (result, flags) = alu::dec8(v, cpu.regs.f);
                mem.write8(addr, result);
                cpu.regs.f = flags;
                11 + indexed_bonus(prefix)
            } else {
                let v = reg8_get(cpu, f.y, prefix);
                let (result, flags) = alu::dec8(v, cpu.regs.f);
                reg8_set(cpu, f.y, prefix, result);
                cpu.regs.f = flags;
                4 + register_bonus(prefix)
            }
        }
        6 => {
            if f.y == 6 {
                let addr = resolve_addr6(cpu, mem, prefix);
                let n = cpu.fetch_byte(mem);
                mem.write8(addr, n);
                // LD (IX+d),n: prefix + opcode + displacement + immediate,
                // 9 T-states more than the unprefixed `LD (HL),n` (not the
                // 12 the other indexed forms pay, since there is no
                // register-select byte to re-read).
                10 + if prefix != Prefix::None { 9 } else { 0 }
            } else {
                let n = cpu.fetch_byte(mem);
                reg8_set(cpu, f.y, prefix, n);
                7 + register_bonus(prefix)
            }
        }
        7 => {
            match f.y {
                0 => {
                    let (result, flags) = alu::rlc8(cpu.regs.a);
                    cpu.regs.a = result;
                    cpu.regs.f = preserve_szpv(cpu.regs.f, flags);
                }
                1 => {
                    let (result, flags) = alu::rrc8(cpu.regs.a);
                    cpu.regs.a = result;
                    cpu.regs.f = preserve_szpv(cpu.regs.f, flags);
                }
                2 => {
                    let (result, flags) = alu::rl8(cpu.regs.a, cpu.regs.f.contains(Flags::C));
                    cpu.regs.a = result;
                    cpu.regs.f = preserve_szpv(cpu.regs.f, flags);
                }
                3 => {
                    let (result, flags) = alu::rr8(cpu.regs.a, cpu.regs.f.contains(Flags::C));
                    cpu.regs.a = result;
                    cpu.regs.f = preserve_szpv(cpu.regs.f, flags);
                }
                4 => {
                    let (result, flags) = alu::daa(cpu.regs.a, cpu.regs.f);
                    cpu.regs.a = result;
                    cpu.regs.f = flags;
                }
                5 => {
                    let (result, flags) = alu::cpl(cpu.regs.a, cpu.regs.f);
                    cpu.regs.a = result;
                    cpu.regs.f = flags;
                }
                6 => {
                    let yx = Flags::from_bits_truncate(cpu.regs.a & (Flags::Y.bits() | Flags::X.bits()));
                    cpu.regs.f = (cpu.regs.f & (Flags::S | Flags::Z | Flags::PV)) | yx | Flags::C;
                }
                7 => {
                    let had_carry = cpu.regs.f.contains(Flags::C);
                    let yx = Flags::from_bits_truncate(cpu.regs.a & (Flags::Y.bits() | Flags::X.bits()));
                    let mut new_f = (cpu.regs.f & (Flags::S | Flags::Z | Flags::PV)) | yx;
                    if had_carry {
                        new_f |= Flags::H;
                    } else {
                        new_f |= Flags::C;
                    }
                    cpu.regs.f = new_f;
                }
                _ => unreachable!(),
            }
            4 + register_bonus(prefix)
        }
        _ => unreachable!(),
    }
}

/// `RLCA`/`RRCA`/`RLA`/`RRA`/`SCF`/`CCF` only ever touch C, H, N and Y/X —
/// S, Z and P/V from the rotate helper (computed for the general CB case)
/// must be discarded and the caller's S/Z/PV preserved.
fn preserve_szpv(original: Flags, rotated: Flags) -> Flags {
    (original & (Flags::S | Flags::Z | Flags::PV)) | (rotated & (Flags::C | Flags::H | Flags::N | Flags::Y | Flags::X))
}

fn execute_indirect_load(cpu: &mut Cpu, f: super::Fields, mem: &mut Memory, prefix: Prefix) -> u32 {
    if f.q == 0 {
        match f.p {
            0 => {
                mem.write8(cpu.regs.bc.get(), cpu.regs.a);
                7
            }
            1 => {
                mem.write8(cpu.regs.de.get(), cpu.regs.a);
                7
            }
            2 => {
                let nn = cpu.fetch_word(mem);
                mem.write16(nn, pair_get(cpu, 2, prefix));
                16
            }
            3 => {
                let nn = cpu.fetch_word(mem);
                mem.write8(nn, cpu.regs.a);
                13
            }
            _ => unreachable!(),
        }
    } else {
        match f.p {
            0 => {
                cpu.regs.a = mem.read8(cpu.regs.bc.get());
                7
            }
            1 => {
                cpu.regs.a = mem.read8(cpu.regs.de.get());
                7
            }
            2 => {
                let nn = cpu.fetch_word(mem);
                let v = mem.read16(nn);
                pair_set(cpu, 2, prefix, v);
                16
            }
            3 => {
                let nn = cpu.fetch_word(mem);
                cpu.regs.a = mem.read8(nn);
                13
            }
            _ => unreachable!(),
        }
    }
}

fn execute_x1(cpu: &mut Cpu, f: super::Fields, mem: &mut Memory, prefix: Prefix) -> u32 {
    if f.z == 6 && f.y == 6 {
        cpu.regs.halted = true;
        return 4 + register_bonus(prefix);
    }
    match (f.y == 6, f.z == 6) {
        (true, false) => {
            let addr = resolve_addr6(cpu, mem, prefix);
            let v = reg8_get(cpu, f.z, Prefix::None);
            mem.write8(addr, v);
            7 + indexed_bonus(prefix)
        }
        (false, true) => {
            let addr = resolve_addr6(cpu, mem, prefix);
            let v = mem.read8(addr);
            reg8_set(cpu, f.y, Prefix::None, v);
            7 + indexed_bonus(prefix)
        }
        (false, false) => {
            let v = reg8_get(cpu, f.z, prefix);
            reg8_set(cpu, f.y, prefix, v);
            4 + register_bonus(prefix)
        }
        (true, true) => unreachable!(),
    }
}

fn execute_x2(cpu: &mut Cpu, f: super::Fields, mem: &mut Memory, prefix: Prefix) -> u32 {
    if f.z == 6 {
        let addr = resolve_addr6(cpu, mem, prefix);
        let v = mem.read8(addr);
        alu_op(cpu, f.y, v);
        7 + indexed_bonus(prefix)
    } else {
        let v = reg8_get(cpu, f.z, prefix);
        alu_op(cpu, f.y, v);
        4 + register_bonus(prefix)
    }
}

fn execute_x3(cpu: &mut Cpu, f: super::Fields, mem: &mut Memory, io: &mut IoBus, prefix: Prefix) -> u32 {
    match f.z {
        0 => {
            if condition(cpu, f.y) {
                cpu.regs.pc = cpu.pop16(mem);
                11
            } else {
                5
            }
        }
        1 => {
            if f.q == 0 {
                let v = cpu.pop16(mem);
                qq_set(cpu, f.p, prefix, v);
                10
            } else {
                match f.p {
                    0 => {
                        cpu.regs.pc = cpu.pop16(mem);
                        10
                    }
                    1 => {
                        cpu.regs.exx();
                        4
                    }
                    2 => {
                        cpu.regs.pc = pair_get(cpu, 2, prefix);
                        4
                    }
                    3 => {
                        cpu.regs.sp = pair_get(cpu, 2, prefix);
                        6
                    }
                    _ => unreachable!(),
                }
            }
        }
        2 => {
            let nn = cpu.fetch_word(mem);
            if condition(cpu, f.y) {
                cpu.regs.pc = nn;
            }
            10
        }
        3 => match f.y {
            0 => {
                let nn = cpu.fetch_word(mem);
                cpu.regs.pc = nn;
                10
            }
            2 => {
                let n = cpu.fetch_byte(mem);
                io.out8(u16::from_be_bytes([cpu.regs.a, n]), cpu.regs.a, mem);
                11
            }
            3 => {
                let n = cpu.fetch_byte(mem);
                cpu.regs.a = io.in8(u16::from_be_bytes([cpu.regs.a, n]));
                11
            }
            4 => {
                let pair = pair_get(cpu, 2, prefix);
                let sp_val = mem.read16(cpu.regs.sp);
                mem.write16(cpu.regs.sp, pair);
                pair_set(cpu, 2, prefix, sp_val);
                19
            }
            5 => {
                let hl = cpu.regs.hl.get();
                cpu.regs.hl.set(cpu.regs.de.get());
                cpu.regs.de.set(hl);
                4
            }
            6 => {
                cpu.regs.iff1 = false;
                cpu.regs.iff2 = false;
                4
            }
            7 => {
                cpu.regs.iff1 = true;
                cpu.regs.iff2 = true;
                cpu.regs.ei_delay = true;
                4
            }
            _ => unreachable!(),
        },
        4 => {
            let nn = cpu.fetch_word(mem);
            if condition(cpu, f.y) {
                cpu.push16(mem, cpu.regs.pc);
                cpu.regs.pc = nn;
                17
            } else {
                10
            }
        }
        5 => {
            if f.q == 0 {
                let v = qq_get(cpu, f.p, prefix);
                cpu.push16(mem, v);
                11
            } else if f.p == 0 {
                let nn = cpu.fetch_word(mem);
                cpu.push16(mem, cpu.regs.pc);
                cpu.regs.pc = nn;
                17
            } else {
                unreachable!("DD/ED/FD prefixes are intercepted before base::execute")
            }
        }
        6 => {
            let n = cpu.fetch_byte(mem);
            alu_op(cpu, f.y, n);
            7
        }
        7 => {
            cpu.push16(mem, cpu.regs.pc);
            cpu.regs.pc = (f.y as u16) * 8;
            11
        }
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> (Cpu, Memory, IoBus) {
        (Cpu::new(), Memory::new(false, &[[0u8; crate::memory::PAGE_SIZE]]), IoBus::new())
    }

    #[test]
    fn ld_bc_nn_loads_immediate() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        mem.write8(0x8000, 0x01);
        mem.write16(0x8001, 0x1234);
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.bc.get(), 0x1234);
    }

    #[test]
    fn inc_b_sets_zero_flag_on_wrap() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.bc.hi = 0xFF;
        mem.write8(0x8000, 0x04); // INC B
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.bc.hi, 0x00);
        assert!(cpu.regs.f.contains(Flags::Z));
    }

    #[test]
    fn jp_nn_sets_pc() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        mem.write8(0x8000, 0xC3);
        mem.write16(0x8001, 0x9000);
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.pc, 0x9000);
    }

    #[test]
    fn call_and_ret_roundtrip_pc_through_stack() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.sp = 0xFFF0;
        mem.write8(0x8000, 0xCD); // CALL nn
        mem.write16(0x8001, 0x9000);
        mem.write8(0x9000, 0xC9); // RET
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.pc, 0x9000);
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.pc, 0x8003);
    }

    #[test]
    fn ld_ix_plus_d_reads_through_displacement() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.ix.set(0x4000);
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x7E); // LD A,(IX+d)
        mem.write8(0x8002, 0x05);
        mem.write8(0x4005, 0x99);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.a, 0x99);
        assert_eq!(states, 19);
    }

    #[test]
    fn inc_ix_plus_d_costs_twenty_three_tstates() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.ix.set(0x4000);
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x34); // INC (IX+d)
        mem.write8(0x8002, 0x05);
        mem.write8(0x4005, 0x41);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(mem.read8(0x4005), 0x42);
        assert_eq!(states, 23);
    }

    #[test]
    fn dec_iy_plus_d_costs_twenty_three_tstates() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.iy.set(0x4000);
        mem.write8(0x8000, 0xFD);
        mem.write8(0x8001, 0x35); // DEC (IY+d)
        mem.write8(0x8002, 0x05);
        mem.write8(0x4005, 0x41);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(mem.read8(0x4005), 0x40);
        assert_eq!(states, 23);
    }

    #[test]
    fn ld_ix_plus_d_immediate_costs_nineteen_tstates() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.ix.set(0x4000);
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x36); // LD (IX+d),n
        mem.write8(0x8002, 0x05);
        mem.write8(0x8003, 0x77);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(mem.read8(0x4005), 0x77);
        assert_eq!(states, 19);
    }

    #[test]
    fn ld_ix_plus_d_from_register_costs_nineteen_tstates() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.ix.set(0x4000);
        cpu.regs.bc.hi = 0x55;
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x70); // LD (IX+d),B
        mem.write8(0x8002, 0x05);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(mem.read8(0x4005), 0x55);
        assert_eq!(states, 19);
    }

    #[test]
    fn add_a_ix_plus_d_costs_nineteen_tstates() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.ix.set(0x4000);
        cpu.regs.a = 0x01;
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x86); // ADD A,(IX+d)
        mem.write8(0x8002, 0x05);
        mem.write8(0x4005, 0x02);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.a, 0x03);
        assert_eq!(states, 19);
    }

    #[test]
    fn ld_ixh_immediate_costs_eleven_tstates_no_displacement() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        mem.write8(0x8000, 0xDD);
        mem.write8(0x8001, 0x26); // LD IXH,n
        mem.write8(0x8002, 0x12);
        let states = cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.ix.hi, 0x12);
        assert_eq!(states, 11);
    }

    #[test]
    fn out_and_in_round_trip_border_port() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        cpu.regs.a = 0x04;
        mem.write8(0x8000, 0xD3); // OUT (n),A
        mem.write8(0x8001, 0xFE);
        cpu.step(&mut mem, &mut io);
        assert_eq!(io.border(), 0x04);
    }

    #[test]
    fn halt_sets_flag_and_idles() {
        let (mut cpu, mut mem, mut io) = machine();
        cpu.regs.pc = 0x8000;
        mem.write8(0x8000, 0x76);
        cpu.step(&mut mem, &mut io);
        assert!(cpu.regs.halted);
        let pc_before = cpu.regs.pc;
        cpu.step(&mut mem, &mut io);
        assert_eq!(cpu.regs.pc, pc_before);
    }
}
