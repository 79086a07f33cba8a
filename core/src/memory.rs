use crate::error::Chip8Error;

pub const MEMORY_SIZE: usize = 0x1000;

/// Address of the built-in glyph table.
pub const FONT_START: u16 = 0x050;

/// Size in bytes of a single glyph in the font table.
pub const GLYPH_SIZE: u16 = 5;

/// Programs are loaded here; everything below is reserved for the interpreter.
pub const PROGRAM_START: u16 = 0x200;

pub static DEFAULT_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat 4K address space. Every access wraps modulo [`MEMORY_SIZE`], so no
/// address a program can compute is out of bounds.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
    font: [u8; 80],
}

impl Memory {
    /// Zeroed memory with the default font installed.
    pub fn new() -> Memory {
        Memory::with_font(DEFAULT_FONT)
    }

    pub fn with_font(font: [u8; 80]) -> Memory {
        let mut memory = Memory {
            bytes: Box::new([0u8; MEMORY_SIZE]),
            font,
        };
        memory.initialize();
        memory
    }

    /// Zero all bytes and reinstall the glyph table.
    pub fn initialize(&mut self) {
        self.bytes.fill(0);
        let start = FONT_START as usize;
        self.bytes[start..start + self.font.len()].copy_from_slice(&self.font);
    }

    /// Copy `data` into memory starting at `offset`.
    ///
    /// Fails without touching memory when the data would run past the end of
    /// the address space.
    pub fn load(&mut self, data: &[u8], offset: u16) -> Result<(), Chip8Error> {
        let start = offset as usize;
        let end = start
            .checked_add(data.len())
            .filter(|end| *end <= MEMORY_SIZE)
            .ok_or(Chip8Error::OutOfSpace {
                offset: start,
                len: data.len(),
                capacity: MEMORY_SIZE,
            })?;

        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    pub fn read_u8(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % MEMORY_SIZE]
    }

    /// Big-endian word at `addr`; the second byte wraps around to address 0.
    pub fn read_u16_be(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_u8(addr), self.read_u8(addr.wrapping_add(1))])
    }

    pub fn write_u8(&mut self, addr: u16, data: u8) {
        self.bytes[addr as usize % MEMORY_SIZE] = data;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
