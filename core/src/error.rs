use thiserror::Error;

/// Errors raised while configuring the machine or loading a program into it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    /// The program does not fit in memory at the requested offset.
    /// Memory is left untouched.
    #[error("program of {len} bytes does not fit at offset 0x{offset:03x} (memory is {capacity} bytes)")]
    OutOfSpace {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("font sprite must be 80 bytes, got {len}")]
    InvalidFont { len: usize },
}

/// Recoverable conditions hit while executing a program.
///
/// A fault never stops the machine: the offending instruction is resolved
/// as a no-op (see each variant) and execution continues with the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// CALL with 16 return addresses already on the stack. The jump is skipped.
    #[error("stack overflow at 0x{pc:03x}")]
    StackOverflow { pc: u16 },

    /// RETURN with an empty stack. The program counter is left unchanged.
    #[error("stack underflow at 0x{pc:03x}")]
    StackUnderflow { pc: u16 },

    #[error("unknown opcode {opcode:04x} at 0x{pc:03x}")]
    UnknownOpcode { pc: u16, opcode: u16 },
}
