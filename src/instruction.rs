/// # instruction set
///
/// Every CHIP-8 instruction is one big-endian 16-bit word. The top nibble picks
/// the family; families 0, 8, E and F are further split on the low nibble or
/// byte. Field names follow the usual notation:
///
///  * `nnn` 12-bit address
///  * `nn`  8-bit literal
///  * `n`   4-bit literal
///  * `x`, `y` register numbers
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN call machine code routine; treated as a jump
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(u8, u8),
    /// 4XNN
    SkipNeImm(u8, u8),
    /// 5XY0
    SkipEqReg(u8, u8),
    /// 6XNN
    SetImm(u8, u8),
    /// 7XNN, no carry
    AddImm(u8, u8),
    /// 8XY0
    SetReg(u8, u8),
    /// 8XY1
    Or(u8, u8),
    /// 8XY2
    And(u8, u8),
    /// 8XY3
    Xor(u8, u8),
    /// 8XY4 VF = carry
    AddCarry(u8, u8),
    /// 8XY5 VX = VX - VY, VF = VX > VY
    Sub(u8, u8),
    /// 8XY6 VF = bit shifted out
    ShiftRight(u8, u8),
    /// 8XY7 VX = VY - VX, VF = VY > VX
    SubReversed(u8, u8),
    /// 8XYE VF = bit shifted out
    ShiftLeft(u8, u8),
    /// 9XY0
    SkipNeReg(u8, u8),
    /// ANNN
    SetIndex(u16),
    /// BNNN
    JumpV0(u16),
    /// CXNN
    Random(u8, u8),
    /// DXYN
    Draw(u8, u8, u8),
    /// EX9E
    SkipKeyPressed(u8),
    /// EXA1
    SkipKeyNotPressed(u8),
    /// FX07
    GetDelay(u8),
    /// FX0A
    WaitKey(u8),
    /// FX15
    SetDelay(u8),
    /// FX18
    SetSound(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    FontGlyph(u8),
    /// FX33
    StoreBcd(u8),
    /// FX55
    StoreRegisters(u8),
    /// FX65
    LoadRegisters(u8),
}

impl Instruction {
    /// `None` for anything outside the instruction set
    pub fn decode(opcode: u16) -> Option<Instruction> {
        use Instruction::*;

        let nnn = opcode & 0x0fff;
        let nn = (opcode & 0x00ff) as u8;
        let n = (opcode & 0x000f) as u8;
        let x = ((opcode >> 8) & 0xf) as u8;
        let y = ((opcode >> 4) & 0xf) as u8;

        let instruction = match opcode >> 12 {
            0x0 => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => Sys(nnn),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqImm(x, nn),
            0x4 => SkipNeImm(x, nn),
            0x5 if n == 0 => SkipEqReg(x, y),
            0x6 => SetImm(x, nn),
            0x7 => AddImm(x, nn),
            0x8 => match n {
                0x0 => SetReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddCarry(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReversed(x, y),
                0xe => ShiftLeft(x, y),
                _ => return None,
            },
            0x9 if n == 0 => SkipNeReg(x, y),
            0xa => SetIndex(nnn),
            0xb => JumpV0(nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipKeyPressed(x),
                0xa1 => SkipKeyNotPressed(x),
                _ => return None,
            },
            0xf => match nn {
                0x07 => GetDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => FontGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

/// assembler-ish mnemonics, handy in logs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sys(a) => write!(f, "SYS  {:03X}", a),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP   {:03X}", a),
            Call(a) => write!(f, "CALL {:03X}", a),
            SkipEqImm(x, nn) => write!(f, "SE   V{:X}, {:02X}", x, nn),
            SkipNeImm(x, nn) => write!(f, "SNE  V{:X}, {:02X}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE   V{:X}, V{:X}", x, y),
            SetImm(x, nn) => write!(f, "LD   V{:X}, {:02X}", x, nn),
            AddImm(x, nn) => write!(f, "ADD  V{:X}, {:02X}", x, nn),
            SetReg(x, y) => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR   V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR  V{:X}, V{:X}", x, y),
            AddCarry(x, y) => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReversed(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE  V{:X}, V{:X}", x, y),
            SetIndex(a) => write!(f, "LD   I, {:03X}", a),
            JumpV0(a) => write!(f, "JP   V0, {:03X}", a),
            Random(x, nn) => write!(f, "RND  V{:X}, {:02X}", x, nn),
            Draw(x, y, n) => write!(f, "DRW  V{:X}, V{:X}, {:X}", x, y, n),
            SkipKeyPressed(x) => write!(f, "SKP  V{:X}", x),
            SkipKeyNotPressed(x) => write!(f, "SKNP V{:X}", x),
            GetDelay(x) => write!(f, "LD   V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD   V{:X}, K", x),
            SetDelay(x) => write!(f, "LD   DT, V{:X}", x),
            SetSound(x) => write!(f, "LD   ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD  I, V{:X}", x),
            FontGlyph(x) => write!(f, "LD   F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD   B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD   V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_families() {
        assert_eq!(Instruction::decode(0x00e0), Some(ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Some(Return));
        assert_eq!(Instruction::decode(0x0123), Some(Sys(0x123)));
        assert_eq!(Instruction::decode(0x1abc), Some(Jump(0xabc)));
        assert_eq!(Instruction::decode(0x2200), Some(Call(0x200)));
        assert_eq!(Instruction::decode(0x6a02), Some(SetImm(0xa, 0x02)));
        assert_eq!(Instruction::decode(0x8ab4), Some(AddCarry(0xa, 0xb)));
        assert_eq!(Instruction::decode(0x8abe), Some(ShiftLeft(0xa, 0xb)));
        assert_eq!(Instruction::decode(0xd125), Some(Draw(1, 2, 5)));
        assert_eq!(Instruction::decode(0xe39e), Some(SkipKeyPressed(3)));
        assert_eq!(Instruction::decode(0xf40a), Some(WaitKey(4)));
        assert_eq!(Instruction::decode(0xf565), Some(LoadRegisters(5)));
    }

    #[test]
    fn test_decode_rejects_unknown() {
        for op in [0x5121, 0x912f, 0x8128, 0x812f, 0xe1ff, 0xf1ff, 0xf100] {
            assert_eq!(Instruction::decode(op), None, "0x{:04x}", op);
        }
    }

    #[test]
    fn test_all_forms_decode() {
        // one representative per form
        let ops = [
            0x0123, 0x00e0, 0x00ee, 0x1222, 0x2222, 0x3122, 0x4122, 0x5120, 0x6122, 0x7122,
            0x8120, 0x8121, 0x8122, 0x8123, 0x8124, 0x8125, 0x8126, 0x8127, 0x812e, 0x9120,
            0xa222, 0xb222, 0xc1ff, 0xd125, 0xe19e, 0xe1a1, 0xf107, 0xf10a, 0xf115, 0xf118,
            0xf11e, 0xf129, 0xf133, 0xf155, 0xf165,
        ];
        let decoded: Vec<_> = ops.iter().filter_map(|op| Instruction::decode(*op)).collect();
        assert_eq!(decoded.len(), 35);
        for (i, a) in decoded.iter().enumerate() {
            for b in &decoded[i + 1..] {
                assert_ne!(std::mem::discriminant(a), std::mem::discriminant(b));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::decode(0xd125).unwrap().to_string(), "DRW  V1, V2, 5");
        assert_eq!(Instruction::decode(0xa2f0).unwrap().to_string(), "LD   I, 2F0");
    }
}
