use std::io;
use thiserror::Error;

/// Everything that can go wrong loading, running or persisting a CHIP-8 machine.
#[derive(Debug, Error)]
pub enum Chip8Error {
    /// program image doesn't fit between 0x200 and the top of RAM
    #[error("program is {size} bytes, at most {max} fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    /// decode failed; the run can't continue
    #[error("unknown opcode 0x{opcode:04X} at 0x{address:03X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("call at 0x{address:03X} with a full stack")]
    StackOverflow { address: u16 },

    #[error("return at 0x{address:03X} with an empty stack")]
    StackUnderflow { address: u16 },

    #[error("save slot {slot} is empty")]
    SlotEmpty { slot: usize },

    #[error("save slot {slot} does not exist ({slots} slots)")]
    SlotOutOfRange { slot: usize, slots: usize },

    #[error("save file version {found} can't be read (expected {expected})")]
    IncompatibleSave { found: u32, expected: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl Chip8Error {
    /// true for conditions a front end should report and carry on from
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Chip8Error::ProgramTooLarge { .. }
                | Chip8Error::SlotEmpty { .. }
                | Chip8Error::SlotOutOfRange { .. }
                | Chip8Error::IncompatibleSave { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_opcode_message() {
        let e = Chip8Error::UnknownOpcode {
            opcode: 0x5ab1,
            address: 0x204,
        };
        assert_eq!(e.to_string(), "unknown opcode 0x5AB1 at 0x204");
    }

    #[test]
    fn test_recoverable() {
        assert!(Chip8Error::SlotEmpty { slot: 2 }.is_recoverable());
        assert!(!Chip8Error::StackUnderflow { address: 0x200 }.is_recoverable());
    }
}
