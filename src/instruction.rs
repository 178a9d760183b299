//! Decoding of 16-bit instruction words.
//!
//! Decoding happens in two steps. [`Opcode`] splits a word into its four
//! nibbles and never fails. [`Instruction`] is the tagged form the interpreter
//! dispatches on; converting an `Opcode` into one is where an unrecognised
//! word is rejected.
use crate::error::Fault;
use std::fmt;

/// A raw instruction word split into nibbles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub word: u16,
    /// instruction family
    pub n1: u8,
    /// usually register X
    pub n2: u8,
    /// usually register Y
    pub n3: u8,
    /// sub-opcode or 4-bit immediate
    pub n4: u8,
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode {
            word,
            n1: ((word & 0xf000) >> 12) as u8,
            n2: ((word & 0x0f00) >> 8) as u8,
            n3: ((word & 0x00f0) >> 4) as u8,
            n4: (word & 0x000f) as u8,
        }
    }
}

impl Opcode {
    /// 12-bit address, n2|n3|n4
    pub fn addr(&self) -> u16 {
        self.word & 0x0fff
    }

    /// 8-bit immediate, n3|n4
    pub fn nn(&self) -> u8 {
        (self.word & 0x00ff) as u8
    }

    pub fn x(&self) -> u8 {
        self.n2
    }

    pub fn y(&self) -> u8 {
        self.n3
    }
}

/// Every operation the machine knows. Register operands are indexes 0..=15,
/// addresses are 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jp { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SeImm { x: u8, nn: u8 },
    /// 4XNN
    SneImm { x: u8, nn: u8 },
    /// 5XY0
    SeReg { x: u8, y: u8 },
    /// 6XNN
    LdImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Ld { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    Add { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    Shr { x: u8 },
    /// 8XY7
    Subn { x: u8, y: u8 },
    /// 8XYE
    Shl { x: u8 },
    /// 9XY0
    SneReg { x: u8, y: u8 },
    /// ANNN
    LdI { addr: u16 },
    /// BNNN
    JpV0 { addr: u16 },
    /// CXNN
    Rnd { x: u8, nn: u8 },
    /// DXYN
    Drw { x: u8, y: u8, n: u8 },
    /// EX9E
    Skp { x: u8 },
    /// EXA1
    Sknp { x: u8 },
    /// FX07
    LdVxDt { x: u8 },
    /// FX0A
    LdVxK { x: u8 },
    /// FX15
    LdDtVx { x: u8 },
    /// FX18
    LdStVx { x: u8 },
    /// FX1E
    AddIVx { x: u8 },
    /// FX29
    LdFVx { x: u8 },
    /// FX33
    LdBVx { x: u8 },
    /// FX55
    LdIVx { x: u8 },
    /// FX65
    LdVxI { x: u8 },
}

impl TryFrom<Opcode> for Instruction {
    type Error = Fault;

    fn try_from(op: Opcode) -> Result<Self, Self::Error> {
        use Instruction::*;
        let (x, y, nn, addr) = (op.x(), op.y(), op.nn(), op.addr());
        let instruction = match (op.n1, op.n2, op.n3, op.n4) {
            (0x0, 0x0, 0xe, 0x0) => Cls,
            (0x0, 0x0, 0xe, 0xe) => Ret,
            (0x1, _, _, _) => Jp { addr },
            (0x2, _, _, _) => Call { addr },
            (0x3, _, _, _) => SeImm { x, nn },
            (0x4, _, _, _) => SneImm { x, nn },
            (0x5, _, _, 0x0) => SeReg { x, y },
            (0x6, _, _, _) => LdImm { x, nn },
            (0x7, _, _, _) => AddImm { x, nn },
            (0x8, _, _, 0x0) => Ld { x, y },
            (0x8, _, _, 0x1) => Or { x, y },
            (0x8, _, _, 0x2) => And { x, y },
            (0x8, _, _, 0x3) => Xor { x, y },
            (0x8, _, _, 0x4) => Add { x, y },
            (0x8, _, _, 0x5) => Sub { x, y },
            (0x8, _, _, 0x6) => Shr { x },
            (0x8, _, _, 0x7) => Subn { x, y },
            (0x8, _, _, 0xe) => Shl { x },
            (0x9, _, _, 0x0) => SneReg { x, y },
            (0xa, _, _, _) => LdI { addr },
            (0xb, _, _, _) => JpV0 { addr },
            (0xc, _, _, _) => Rnd { x, nn },
            (0xd, _, _, n) => Drw { x, y, n },
            (0xe, _, 0x9, 0xe) => Skp { x },
            (0xe, _, 0xa, 0x1) => Sknp { x },
            (0xf, _, 0x0, 0x7) => LdVxDt { x },
            (0xf, _, 0x0, 0xa) => LdVxK { x },
            (0xf, _, 0x1, 0x5) => LdDtVx { x },
            (0xf, _, 0x1, 0x8) => LdStVx { x },
            (0xf, _, 0x1, 0xe) => AddIVx { x },
            (0xf, _, 0x2, 0x9) => LdFVx { x },
            (0xf, _, 0x3, 0x3) => LdBVx { x },
            (0xf, _, 0x5, 0x5) => LdIVx { x },
            (0xf, _, 0x6, 0x5) => LdVxI { x },
            _ => return Err(Fault::UnknownOpcode),
        };
        Ok(instruction)
    }
}

impl TryFrom<u16> for Instruction {
    type Error = Fault;

    fn try_from(word: u16) -> Result<Self, Self::Error> {
        Instruction::try_from(Opcode::from(word))
    }
}

/// mnemonics, for trace logging
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp { addr } => write!(f, "JP {:#05x}", addr),
            Call { addr } => write!(f, "CALL {:#05x}", addr),
            SeImm { x, nn } => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SneImm { x, nn } => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LdImm { x, nn } => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Ld { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr { x } => write!(f, "SHR V{:X}", x),
            Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl { x } => write!(f, "SHL V{:X}", x),
            SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI { addr } => write!(f, "LD I, {:#05x}", addr),
            JpV0 { addr } => write!(f, "JP V0, {:#05x}", addr),
            Rnd { x, nn } => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp { x } => write!(f, "SKP V{:X}", x),
            Sknp { x } => write!(f, "SKNP V{:X}", x),
            LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            LdVxK { x } => write!(f, "LD V{:X}, K", x),
            LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            AddIVx { x } => write!(f, "ADD I, V{:X}", x),
            LdFVx { x } => write!(f, "LD F, V{:X}", x),
            LdBVx { x } => write!(f, "LD B, V{:X}", x),
            LdIVx { x } => write!(f, "LD [I], V{:X}", x),
            LdVxI { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
