use std::io;
use thiserror::Error;

/// Something that went wrong while executing a single instruction. These are
/// wrapped into a [`Chip8Error::Halted`] together with the instruction word and
/// where it was fetched from.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unrecognised opcode")]
    UnknownOpcode,

    #[error("call stack overflow")]
    StackOverflow,

    #[error("call stack underflow")]
    StackUnderflow,

    #[error("memory access out of bounds at {addr:#06x}")]
    MemoryOutOfBounds { addr: usize },
}

/// Fatal conditions; any of these ends the run
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program counter out of memory bounds: {pc:#06x}")]
    PcOutOfBounds { pc: u16 },

    #[error("halted executing {opcode:#06x} at {pc:#06x}: {fault}")]
    Halted { opcode: u16, pc: u16, fault: Fault },

    #[error("program is {size} bytes but only {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Chip8Error {
    /// the fault behind a halt, if that's what this is
    pub fn fault(&self) -> Option<Fault> {
        match self {
            Chip8Error::Halted { fault, .. } => Some(*fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_message_names_opcode_and_pc() {
        let e = Chip8Error::Halted {
            opcode: 0x5121,
            pc: 0x0204,
            fault: Fault::UnknownOpcode,
        };
        assert_eq!(
            e.to_string(),
            "halted executing 0x5121 at 0x0204: unrecognised opcode"
        );
        assert_eq!(e.fault(), Some(Fault::UnknownOpcode));
    }

    #[test]
    fn test_fetch_message() {
        let e = Chip8Error::PcOutOfBounds { pc: 0x0fff };
        assert_eq!(e.to_string(), "program counter out of memory bounds: 0x0fff");
        assert_eq!(e.fault(), None);
    }
}
