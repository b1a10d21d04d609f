//! Flag-computing ALU helpers shared by the base, CB, ED and DD/FD tables
//! (spec §9 "Flag Y/X mirroring" — every helper here sets Y/X from its own
//! result byte so callers never need to patch them in afterwards).
use super::regs::Flags;

fn sz53(result: u8) -> Flags {
    let mut f = Flags::empty();
    if result == 0 {
        f |= Flags::Z;
    }
    if result & 0x80 != 0 {
        f |= Flags::S;
    }
    f |= Flags::from_bits_truncate(result & (Flags::Y.bits() | Flags::X.bits()));
    f
}

fn parity(v: u8) -> bool {
    v.count_ones() % 2 == 0
}

pub fn add8(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let c = carry_in as u16;
    let sum = a as u16 + b as u16 + c;
    let result = sum as u8;
    let mut f = sz53(result);
    if sum > 0xFF {
        f |= Flags::C;
    }
    if (a & 0x0F) + (b & 0x0F) + c as u8 > 0x0F {
        f |= Flags::H;
    }
    let overflow = (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0;
    if overflow {
        f |= Flags::PV;
    }
    (result, f)
}

pub fn sub8(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let c = carry_in as u16;
    let diff = a as u16 as i32 - b as u16 as i32 - c as i32;
    let result = diff as u8;
    let mut f = sz53(result) | Flags::N;
    if diff < 0 {
        f |= Flags::C;
    }
    if ((a & 0x0F) as i32 - (b & 0x0F) as i32 - c as i32) < 0 {
        f |= Flags::H;
    }
    let overflow = (a ^ b) & 0x80 != 0 && (a ^ result) & 0x80 != 0;
    if overflow {
        f |= Flags::PV;
    }
    (result, f)
}

pub fn cp8(a: u8, b: u8) -> Flags {
    let (result, mut f) = sub8(a, b, false);
    // CP sets Y/X from the operand compared against, not the (discarded) result.
    f &= !(Flags::Y | Flags::X);
    f |= Flags::from_bits_truncate(b & (Flags::Y.bits() | Flags::X.bits()));
    let _ = result;
    f
}

pub fn and8(a: u8, b: u8) -> (u8, Flags) {
    let result = a & b;
    let mut f = sz53(result) | Flags::H;
    if parity(result) {
        f |= Flags::PV;
    }
    (result, f)
}

pub fn or8(a: u8, b: u8) -> (u8, Flags) {
    let result = a | b;
    let mut f = sz53(result);
    if parity(result) {
        f |= Flags::PV;
    }
    (result, f)
}

pub fn xor8(a: u8, b: u8) -> (u8, Flags) {
    let result = a ^ b;
    let mut f = sz53(result);
    if parity(result) {
        f |= Flags::PV;
    }
    (result, f)
}

pub fn inc8(a: u8, carry_in: Flags) -> (u8, Flags) {
    let result = a.wrapping_add(1);
    let mut f = sz53(result);
    if a & 0x0F == 0x0F {
        f |= Flags::H;
    }
    if a == 0x7F {
        f |= Flags::PV;
    }
    f |= carry_in & Flags::C; // INC/DEC never touch carry
    (result, f)
}

pub fn dec8(a: u8, carry_in: Flags) -> (u8, Flags) {
    let result = a.wrapping_sub(1);
    let mut f = sz53(result) | Flags::N;
    if a & 0x0F == 0x00 {
        f |= Flags::H;
    }
    if a == 0x80 {
        f |= Flags::PV;
    }
    f |= carry_in & Flags::C;
    (result, f)
}

pub fn add16(a: u16, b: u16, carry_in: Flags) -> (u16, Flags) {
    let sum = a as u32 + b as u32;
    let result = sum as u16;
    let mut f = carry_in & (Flags::S | Flags::Z | Flags::PV);
    if sum > 0xFFFF {
        f |= Flags::C;
    }
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        f |= Flags::H;
    }
    let hi = (result >> 8) as u8;
    f |= Flags::from_bits_truncate(hi & (Flags::Y.bits() | Flags::X.bits()));
    (result, f)
}

pub fn adc16(a: u16, b: u16, carry_in: bool) -> (u16, Flags) {
    let c = carry_in as u32;
    let sum = a as u32 + b as u32 + c;
    let result = sum as u16;
    let mut f = Flags::empty();
    if result == 0 {
        f |= Flags::Z;
    }
    if result & 0x8000 != 0 {
        f |= Flags::S;
    }
    if sum > 0xFFFF {
        f |= Flags::C;
    }
    if (a & 0x0FFF) + (b & 0x0FFF) + c as u16 > 0x0FFF {
        f |= Flags::H;
    }
    let overflow = (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0;
    if overflow {
        f |= Flags::PV;
    }
    let hi = (result >> 8) as u8;
    f |= Flags::from_bits_truncate(hi & (Flags::Y.bits() | Flags::X.bits()));
    (result, f)
}

pub fn sbc16(a: u16, b: u16, carry_in: bool) -> (u16, Flags) {
    let c = carry_in as i32;
    let diff = a as i32 - b as i32 - c;
    let result = diff as u16;
    let mut f = Flags::N;
    if result == 0 {
        f |= Flags::Z;
    }
    if result & 0x8000 != 0 {
        f |= Flags::S;
    }
    if diff < 0 {
        f |= Flags::C;
    }
    if (a & 0x0FFF) as i32 - (b & 0x0FFF) as i32 - c < 0 {
        f |= Flags::H;
    }
    let overflow = (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0;
    if overflow {
        f |= Flags::PV;
    }
    let hi = (result >> 8) as u8;
    f |= Flags::from_bits_truncate(hi & (Flags::Y.bits() | Flags::X.bits()));
    (result, f)
}

pub fn rlc8(v: u8) -> (u8, Flags) {
    let carry = v & 0x80 != 0;
    let result = v.rotate_left(1);
    finish_rotate(result, carry)
}

pub fn rrc8(v: u8) -> (u8, Flags) {
    let carry = v & 0x01 != 0;
    let result = v.rotate_right(1);
    finish_rotate(result, carry)
}

pub fn rl8(v: u8, carry_in: bool) -> (u8, Flags) {
    let carry = v & 0x80 != 0;
    let result = (v << 1) | carry_in as u8;
    finish_rotate(result, carry)
}

pub fn rr8(v: u8, carry_in: bool) -> (u8, Flags) {
    let carry = v & 0x01 != 0;
    let result = (v >> 1) | ((carry_in as u8) << 7);
    finish_rotate(result, carry)
}

pub fn sla8(v: u8) -> (u8, Flags) {
    let carry = v & 0x80 != 0;
    finish_rotate(v << 1, carry)
}

pub fn sra8(v: u8) -> (u8, Flags) {
    let carry = v & 0x01 != 0;
    let result = (v >> 1) | (v & 0x80);
    finish_rotate(result, carry)
}

/// Undocumented SLL/SL1: shifts left, feeding a 1 into bit 0.
pub fn sll8(v: u8) -> (u8, Flags) {
    let carry = v & 0x80 != 0;
    finish_rotate((v << 1) | 0x01, carry)
}

pub fn srl8(v: u8) -> (u8, Flags) {
    let carry = v & 0x01 != 0;
    finish_rotate(v >> 1, carry)
}

fn finish_rotate(result: u8, carry: bool) -> (u8, Flags) {
    let mut f = sz53(result);
    if parity(result) {
        f |= Flags::PV;
    }
    if carry {
        f |= Flags::C;
    }
    (result, f)
}

/// `BIT b,value`: Z/PV mirror whether the bit is clear, H is always set, N
/// always clear; Y/X mirror the tested byte (spec's documented simplification
/// for the register/`(HL)` forms — the indexed `(IX+d)`/`(IY+d)` forms use
/// the high byte of the computed address instead, which this core does not
/// model since no testable property in this spec depends on it).
pub fn bit_test(value: u8, bit: u8, carry_in: Flags) -> Flags {
    let set = value & (1 << bit) != 0;
    let mut f = Flags::H | (carry_in & Flags::C);
    if !set {
        f |= Flags::Z | Flags::PV;
    }
    if bit == 7 && set {
        f |= Flags::S;
    }
    f |= Flags::from_bits_truncate(value & (Flags::Y.bits() | Flags::X.bits()));
    f
}

pub fn res(value: u8, bit: u8) -> u8 {
    value & !(1 << bit)
}

pub fn set(value: u8, bit: u8) -> u8 {
    value | (1 << bit)
}

pub fn cpl(a: u8, carry_in: Flags) -> (u8, Flags) {
    let result = !a;
    let mut f = carry_in & (Flags::S | Flags::Z | Flags::PV | Flags::C);
    f |= Flags::H | Flags::N;
    f |= Flags::from_bits_truncate(result & (Flags::Y.bits() | Flags::X.bits()));
    (result, f)
}

pub fn neg8(a: u8) -> (u8, Flags) {
    sub8(0, a, false)
}

/// `DAA`, decimal-adjusting `A` after an 8-bit BCD add/subtract.
pub fn daa(a: u8, f: Flags) -> (u8, Flags) {
    let mut correction = 0u8;
    let mut carry = f.contains(Flags::C);
    let half_carry = f.contains(Flags::H);
    let subtract = f.contains(Flags::N);

    if half_carry || (!subtract && (a & 0x0F) > 9) {
        correction |= 0x06;
    }
    if carry || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }

    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };

    let mut out = sz53(result);
    if parity(result) {
        out |= Flags::PV;
    }
    if subtract {
        out |= Flags::N;
    }
    if carry {
        out |= Flags::C;
    }
    let half = if subtract {
        half_carry && (a & 0x0F) < 6
    } else {
        (a & 0x0F) + (correction & 0x0F) > 0x0F
    };
    if half {
        out |= Flags::H;
    }
    (result, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add8_sets_half_and_full_carry() {
        let (result, f) = add8(0x0F, 0x01, false);
        assert_eq!(result, 0x10);
        assert!(f.contains(Flags::H));
        assert!(!f.contains(Flags::C));
    }

    #[test]
    fn sub8_overflow_flag_on_signed_wrap() {
        let (result, f) = sub8(0x80, 0x01, false);
        assert_eq!(result, 0x7F);
        assert!(f.contains(Flags::PV));
    }

    #[test]
    fn bit_test_clears_z_when_bit_set() {
        let f = bit_test(0x01, 0, Flags::empty());
        assert!(!f.contains(Flags::Z));
        let f = bit_test(0x00, 0, Flags::empty());
        assert!(f.contains(Flags::Z));
    }

    #[test]
    fn daa_after_bcd_add_carries_into_tens() {
        // 0x09 + 0x01 = 0x0A, half-carry set, DAA should produce 0x10 with H? per table +0x06
        let (sum, f) = add8(0x09, 0x01, false);
        let (result, _) = daa(sum, f);
        assert_eq!(result, 0x10);
    }
}
