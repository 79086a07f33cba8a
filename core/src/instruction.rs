// Instruction decoding
//
// An opcode is split into nibbles `[o x y n]`:
// * `o` selects the instruction group
// * `x` and `y` name registers VX and VY
// * `n`, `kk` (low byte) and `nnn` (low 12 bits) carry immediates
//
// Groups 0x0, 0x8 and 0xE are further selected by `n`, group 0xF by `kk`.

use std::fmt;

/// Register index, always in `0..16`.
pub type Reg = u8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XKK
    SkipEqImm(Reg, u8),
    /// 4XKK
    SkipNeqImm(Reg, u8),
    /// 5XY0
    SkipEqReg(Reg, Reg),
    /// 6XKK
    SetImm(Reg, u8),
    /// 7XKK
    AddImm(Reg, u8),
    /// 8XY0
    Set(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    Add(Reg, Reg),
    /// 8XY5
    Sub(Reg, Reg),
    /// 8XY6
    ShiftRight(Reg, Reg),
    /// 8XY7
    SubReverse(Reg, Reg),
    /// 8XYE
    ShiftLeft(Reg, Reg),
    /// 9XY0
    SkipNeqReg(Reg, Reg),
    /// ANNN
    SetIndex(u16),
    /// BNNN, the register is X (only used by the jump-with-VX quirk)
    JumpOffset(Reg, u16),
    /// CXKK
    Random(Reg, u8),
    /// DXYN
    Draw(Reg, Reg, u8),
    /// EX9E
    SkipKeyPressed(Reg),
    /// EXA1
    SkipKeyNotPressed(Reg),
    /// FX07
    GetDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    SetDelay(Reg),
    /// FX18
    SetSound(Reg),
    /// FX1E
    AddIndex(Reg),
    /// FX29
    Glyph(Reg),
    /// FX33
    Bcd(Reg),
    /// FX55
    Store(Reg),
    /// FX65
    Load(Reg),
    /// Any word without a handler in its group; executes as a no-op.
    Unknown(u16),
}

fn x(op: u16) -> Reg {
    ((op & 0x0F00) >> 8) as u8
}

fn y(op: u16) -> Reg {
    ((op & 0x00F0) >> 4) as u8
}

fn n(op: u16) -> u8 {
    (op & 0x000F) as u8
}

fn kk(op: u16) -> u8 {
    (op & 0x00FF) as u8
}

fn nnn(op: u16) -> u16 {
    op & 0x0FFF
}

impl Instruction {
    pub fn decode(op: u16) -> Instruction {
        use Instruction::*;

        match op >> 12 {
            0x0 => Self::decode_system(op),
            0x1 => Jump(nnn(op)),
            0x2 => Call(nnn(op)),
            0x3 => SkipEqImm(x(op), kk(op)),
            0x4 => SkipNeqImm(x(op), kk(op)),
            0x5 => SkipEqReg(x(op), y(op)),
            0x6 => SetImm(x(op), kk(op)),
            0x7 => AddImm(x(op), kk(op)),
            0x8 => Self::decode_alu(op),
            0x9 => SkipNeqReg(x(op), y(op)),
            0xA => SetIndex(nnn(op)),
            0xB => JumpOffset(x(op), nnn(op)),
            0xC => Random(x(op), kk(op)),
            0xD => Draw(x(op), y(op), n(op)),
            0xE => Self::decode_keys(op),
            _ => Self::decode_misc(op),
        }
    }

    /// Group 0x0, selected by the low nibble.
    fn decode_system(op: u16) -> Instruction {
        match n(op) {
            0x0 => Instruction::ClearScreen,
            0xE => Instruction::Return,
            _ => Instruction::Unknown(op),
        }
    }

    /// Group 0x8, selected by the low nibble.
    fn decode_alu(op: u16) -> Instruction {
        use Instruction::*;

        let (vx, vy) = (x(op), y(op));
        match n(op) {
            0x0 => Set(vx, vy),
            0x1 => Or(vx, vy),
            0x2 => And(vx, vy),
            0x3 => Xor(vx, vy),
            0x4 => Add(vx, vy),
            0x5 => Sub(vx, vy),
            0x6 => ShiftRight(vx, vy),
            0x7 => SubReverse(vx, vy),
            0xE => ShiftLeft(vx, vy),
            _ => Unknown(op),
        }
    }

    /// Group 0xE, selected by the low nibble.
    fn decode_keys(op: u16) -> Instruction {
        match n(op) {
            0xE => Instruction::SkipKeyPressed(x(op)),
            0x1 => Instruction::SkipKeyNotPressed(x(op)),
            _ => Instruction::Unknown(op),
        }
    }

    /// Group 0xF, selected by the low byte.
    fn decode_misc(op: u16) -> Instruction {
        use Instruction::*;

        let vx = x(op);
        match kk(op) {
            0x07 => GetDelay(vx),
            0x0A => WaitKey(vx),
            0x15 => SetDelay(vx),
            0x18 => SetSound(vx),
            0x1E => AddIndex(vx),
            0x29 => Glyph(vx),
            0x33 => Bcd(vx),
            0x55 => Store(vx),
            0x65 => Load(vx),
            _ => Unknown(op),
        }
    }
}

impl From<u16> for Instruction {
    fn from(op: u16) -> Self {
        Instruction::decode(op)
    }
}

/// Assembly-like mnemonic, used for trace logging.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JP 0x{:03x}", addr),
            Call(addr) => write!(f, "CALL 0x{:03x}", addr),
            SkipEqImm(vx, byte) => write!(f, "SE V{:X}, 0x{:02x}", vx, byte),
            SkipNeqImm(vx, byte) => write!(f, "SNE V{:X}, 0x{:02x}", vx, byte),
            SkipEqReg(vx, vy) => write!(f, "SE V{:X}, V{:X}", vx, vy),
            SetImm(vx, byte) => write!(f, "LD V{:X}, 0x{:02x}", vx, byte),
            AddImm(vx, byte) => write!(f, "ADD V{:X}, 0x{:02x}", vx, byte),
            Set(vx, vy) => write!(f, "LD V{:X}, V{:X}", vx, vy),
            Or(vx, vy) => write!(f, "OR V{:X}, V{:X}", vx, vy),
            And(vx, vy) => write!(f, "AND V{:X}, V{:X}", vx, vy),
            Xor(vx, vy) => write!(f, "XOR V{:X}, V{:X}", vx, vy),
            Add(vx, vy) => write!(f, "ADD V{:X}, V{:X}", vx, vy),
            Sub(vx, vy) => write!(f, "SUB V{:X}, V{:X}", vx, vy),
            ShiftRight(vx, vy) => write!(f, "SHR V{:X}, V{:X}", vx, vy),
            SubReverse(vx, vy) => write!(f, "SUBN V{:X}, V{:X}", vx, vy),
            ShiftLeft(vx, vy) => write!(f, "SHL V{:X}, V{:X}", vx, vy),
            SkipNeqReg(vx, vy) => write!(f, "SNE V{:X}, V{:X}", vx, vy),
            SetIndex(addr) => write!(f, "LD I, 0x{:03x}", addr),
            JumpOffset(_, addr) => write!(f, "JP V0, 0x{:03x}", addr),
            Random(vx, byte) => write!(f, "RND V{:X}, 0x{:02x}", vx, byte),
            Draw(vx, vy, rows) => write!(f, "DRW V{:X}, V{:X}, {}", vx, vy, rows),
            SkipKeyPressed(vx) => write!(f, "SKP V{:X}", vx),
            SkipKeyNotPressed(vx) => write!(f, "SKNP V{:X}", vx),
            GetDelay(vx) => write!(f, "LD V{:X}, DT", vx),
            WaitKey(vx) => write!(f, "LD V{:X}, K", vx),
            SetDelay(vx) => write!(f, "LD DT, V{:X}", vx),
            SetSound(vx) => write!(f, "LD ST, V{:X}", vx),
            AddIndex(vx) => write!(f, "ADD I, V{:X}", vx),
            Glyph(vx) => write!(f, "LD F, V{:X}", vx),
            Bcd(vx) => write!(f, "LD B, V{:X}", vx),
            Store(vx) => write!(f, "LD [I], V{:X}", vx),
            Load(vx) => write!(f, "LD V{:X}, [I]", vx),
            Unknown(op) => write!(f, "DATA 0x{:04x}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_fields() {
        assert_eq!(Instruction::decode(0x1ABC), Jump(0xABC));
        assert_eq!(Instruction::decode(0x2123), Call(0x123));
        assert_eq!(Instruction::decode(0x3A42), SkipEqImm(0xA, 0x42));
        assert_eq!(Instruction::decode(0x4B42), SkipNeqImm(0xB, 0x42));
        assert_eq!(Instruction::decode(0x5120), SkipEqReg(0x1, 0x2));
        assert_eq!(Instruction::decode(0x6CFF), SetImm(0xC, 0xFF));
        assert_eq!(Instruction::decode(0x7D01), AddImm(0xD, 0x01));
        assert_eq!(Instruction::decode(0x9AB0), SkipNeqReg(0xA, 0xB));
        assert_eq!(Instruction::decode(0xABCD), SetIndex(0xBCD));
        assert_eq!(Instruction::decode(0xB234), JumpOffset(0x2, 0x234));
        assert_eq!(Instruction::decode(0xC30F), Random(0x3, 0x0F));
        assert_eq!(Instruction::decode(0xD12F), Draw(0x1, 0x2, 0xF));
    }

    #[test]
    fn test_decode_system_group() {
        assert_eq!(Instruction::decode(0x00E0), ClearScreen);
        assert_eq!(Instruction::decode(0x00EE), Return);
        // Only the low nibble selects within the group; SYS addr is not supported
        assert_eq!(Instruction::decode(0x0123), Unknown(0x0123));
        assert_eq!(Instruction::decode(0x0A5F), Unknown(0x0A5F));
        assert_eq!(Instruction::decode(0x01E0), ClearScreen);
    }

    #[test]
    fn test_decode_alu_group() {
        assert_eq!(Instruction::decode(0x8120), Set(1, 2));
        assert_eq!(Instruction::decode(0x8121), Or(1, 2));
        assert_eq!(Instruction::decode(0x8122), And(1, 2));
        assert_eq!(Instruction::decode(0x8123), Xor(1, 2));
        assert_eq!(Instruction::decode(0x8124), Add(1, 2));
        assert_eq!(Instruction::decode(0x8125), Sub(1, 2));
        assert_eq!(Instruction::decode(0x8126), ShiftRight(1, 2));
        assert_eq!(Instruction::decode(0x8127), SubReverse(1, 2));
        assert_eq!(Instruction::decode(0x812E), ShiftLeft(1, 2));
        for op in [0x8128, 0x8129, 0x812A, 0x812B, 0x812C, 0x812D, 0x812F] {
            assert_eq!(Instruction::decode(op), Unknown(op));
        }
    }

    #[test]
    fn test_decode_shift_register_mask() {
        // VX comes from the second nibble only, not from a wider mask
        assert_eq!(Instruction::decode(0x8F06), ShiftRight(0xF, 0x0));
        assert_eq!(Instruction::decode(0x830E), ShiftLeft(0x3, 0x0));
    }

    #[test]
    fn test_decode_key_group() {
        assert_eq!(Instruction::decode(0xE59E), SkipKeyPressed(5));
        assert_eq!(Instruction::decode(0xE5A1), SkipKeyNotPressed(5));
        assert_eq!(Instruction::decode(0xE5A0), Unknown(0xE5A0));
        assert_eq!(Instruction::decode(0xE59F), Unknown(0xE59F));
    }

    #[test]
    fn test_decode_misc_group() {
        assert_eq!(Instruction::decode(0xF707), GetDelay(7));
        assert_eq!(Instruction::decode(0xF70A), WaitKey(7));
        assert_eq!(Instruction::decode(0xF715), SetDelay(7));
        assert_eq!(Instruction::decode(0xF718), SetSound(7));
        assert_eq!(Instruction::decode(0xF71E), AddIndex(7));
        assert_eq!(Instruction::decode(0xF729), Glyph(7));
        assert_eq!(Instruction::decode(0xF733), Bcd(7));
        assert_eq!(Instruction::decode(0xF755), Store(7));
        assert_eq!(Instruction::decode(0xF765), Load(7));
        assert_eq!(Instruction::decode(0xF7FF), Unknown(0xF7FF));
        assert_eq!(Instruction::decode(0xF775), Unknown(0xF775));
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Instruction::decode(0x00E0).to_string(), "CLS");
        assert_eq!(Instruction::decode(0xD12F).to_string(), "DRW V1, V2, 15");
        assert_eq!(Instruction::decode(0xA050).to_string(), "LD I, 0x050");
        assert_eq!(Instruction::decode(0xFA65).to_string(), "LD VA, [I]");
        assert_eq!(Instruction::decode(0x5121).to_string(), "SE V1, V2");
        assert_eq!(Instruction::decode(0xFFFF).to_string(), "DATA 0xffff");
    }
}
