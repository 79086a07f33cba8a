// CHIP-8 virtual machine
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Building a CHIP-8 Emulator](https://austinmorlan.com/posts/chip8_emulator/)
// * [high-level assembler for the Chip8 virtual machine](https://github.com/JohnEarnest/Octo/blob/gh-pages/js/emulator.js)
//

use log::{debug, trace, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::color::{Chip8Color, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR};
use crate::display::Display;
use crate::error::{Chip8Error, Fault};
use crate::instruction::{Instruction, Reg};
use crate::memory::{Memory, DEFAULT_FONT, FONT_START, GLYPH_SIZE, PROGRAM_START};

/// Number of return addresses the call stack can hold.
pub const STACK_DEPTH: usize = 16;
/// Number of keys on the hex keypad.
pub const KEY_COUNT: usize = 16;

/// Flag register
const VF: usize = 0xF;

/// Longest sprite a single DXYN can draw.
const MAX_SPRITE_ROWS: usize = 15;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Chip8Mode {
    /// No quirks enabled
    #[default]
    STANDARD,
    COSMAC_VIP,
    CHIP_48,
    SUPER_CHIP,
}

/// Behaviour that differs between historical interpreters. The default has
/// every quirk disabled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Quirks {
    /// Bitwise shift (8XY6 and 8XYE): VY is copied into VX before shifting (COSMAC VIP)
    pub shift_copies_vy: bool,
    /// Jump with offset (BNNN/BXNN): jump to the address XNN plus the value in the register VX (CHIP-48 and SUPER-CHIP),
    /// instead of the address NNN plus the value in the register V0 (COSMAC VIP)
    pub jump_with_vx: bool,
    /// Store and load memory (FX55/FX65): I is left pointing past the last register transferred (COSMAC VIP)
    pub load_store_increments_index: bool,
    /// Logical operations (8XY1, 8XY2 and 8XY3) reset VF to zero (COSMAC VIP)
    pub logic_resets_vf: bool,
}

impl From<Chip8Mode> for Quirks {
    fn from(mode: Chip8Mode) -> Quirks {
        match mode {
            Chip8Mode::STANDARD => Quirks::default(),
            Chip8Mode::COSMAC_VIP => Quirks {
                shift_copies_vy: true,
                load_store_increments_index: true,
                logic_resets_vf: true,
                ..Quirks::default()
            },
            Chip8Mode::CHIP_48 | Chip8Mode::SUPER_CHIP => Quirks {
                jump_with_vx: true,
                ..Quirks::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chip8Builder {
    /// ROM
    rom: Option<Vec<u8>>,
    /// Font sprite
    font: Option<Vec<u8>>,
    // PRNG Seed
    rng_seed: Option<u64>,
    quirks: Quirks,
    foreground: Chip8Color,
    background: Chip8Color,
}

pub struct Chip8 {
    /// General purpose registers
    regs: [u8; 16],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack
    stack: [u16; STACK_DEPTH],
    /// Stack pointer, number of live entries in `stack`
    sp: u8,
    /// Delay Timer
    delay_timer: u8,
    /// Sound Timer
    sound_timer: u8,
    memory: Memory,
    display: Display,
    /// Keypad snapshot published by the host
    keys: [bool; KEY_COUNT],
    quirks: Quirks,
    /// PRNG Generator
    rng: StdRng,
    /// Most recent fault, if not yet taken
    fault: Option<Fault>,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder {
            rom: None,
            font: None,
            rng_seed: None,
            quirks: Quirks::default(),
            foreground: DEFAULT_FOREGROUND_COLOR,
            background: DEFAULT_BACKGROUND_COLOR,
        }
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = Some(rom);
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: Chip8Mode) -> Self {
        self.quirks = mode.into();
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_foreground(mut self, color: Chip8Color) -> Self {
        self.foreground = color;
        self
    }

    pub fn with_background(mut self, color: Chip8Color) -> Self {
        self.background = color;
        self
    }

    pub fn build(&self) -> Result<Chip8, Chip8Error> {
        let font: [u8; 80] = match &self.font {
            Some(font) => font[..]
                .try_into()
                .map_err(|_| Chip8Error::InvalidFont { len: font.len() })?,
            None => DEFAULT_FONT,
        };

        // Pseudo random number generator
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut chip = Chip8::with_parts(
            Memory::with_font(font),
            Display::new(self.foreground, self.background),
            self.quirks,
            rng,
        );

        if let Some(rom) = &self.rom {
            chip.load_program(rom)?;
        }

        Ok(chip)
    }
}

impl Default for Chip8Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8 {
    /// Machine with the default font, no quirks and no program loaded.
    pub fn new() -> Chip8 {
        Chip8::with_parts(
            Memory::new(),
            Display::default(),
            Quirks::default(),
            StdRng::from_entropy(),
        )
    }

    fn with_parts(memory: Memory, display: Display, quirks: Quirks, rng: StdRng) -> Chip8 {
        Chip8 {
            regs: [0u8; 16],
            index: 0,
            pc: PROGRAM_START,
            stack: [0u16; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            memory,
            display,
            keys: [false; KEY_COUNT],
            quirks,
            rng,
            fault: None,
        }
    }

    /// Load a program at the program start address and point pc at it.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.load_program_at(program, PROGRAM_START)?;
        self.pc = PROGRAM_START;
        Ok(())
    }

    /// Copy raw bytes into memory at `offset`. Memory is unchanged on error.
    pub fn load_program_at(&mut self, program: &[u8], offset: u16) -> Result<(), Chip8Error> {
        self.memory.load(program, offset)?;
        debug!("Loaded {} bytes at 0x{:03x}", program.len(), offset);
        Ok(())
    }

    /// Return to the power-on state. The loaded program is discarded.
    pub fn reset(&mut self) {
        self.memory.initialize();
        self.display.clear();
        self.regs = [0u8; 16];
        self.index = 0;
        self.pc = PROGRAM_START;
        self.stack = [0u16; STACK_DEPTH];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; KEY_COUNT];
        self.fault = None;
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// Timers are not touched, the host calls [`Chip8::tick_timers`] at 60 Hz.
    pub fn cycle(&mut self) {
        let pc = self.pc;
        let opcode = self.memory.read_u16_be(pc);
        self.pc = pc.wrapping_add(2);

        let inst = Instruction::decode(opcode);
        trace!("0x{:03x}: {:04x} {}", pc, opcode, inst);

        if let Err(fault) = self.execute(inst, pc) {
            warn!("{}", fault);
            self.fault = Some(fault);
        }
    }

    /// Decrement delay and sound timers, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Publish the current keypad state, index is the key's hex value.
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The display, if it changed since the previous call.
    pub fn take_frame(&mut self) -> Option<&Display> {
        if self.display.dirty() {
            self.display.set_presented();
            Some(&self.display)
        } else {
            None
        }
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Most recent fault since the last call, if any.
    pub fn take_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.regs
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Live return addresses, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Decode the instruction at pc without executing it.
    pub fn peek_instruction(&self) -> Instruction {
        Instruction::decode(self.memory.read_u16_be(self.pc))
    }

    /// Apply one decoded instruction. `pc` has already been advanced past it;
    /// `at` is the address it was fetched from.
    fn execute(&mut self, inst: Instruction, at: u16) -> Result<(), Fault> {
        use Instruction::*;

        match inst {
            // 00E0: Clear screen
            ClearScreen => self.display.clear(),
            // 00EE: Return subroutine from stack
            Return => {
                if self.sp == 0 {
                    return Err(Fault::StackUnderflow { pc: at });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            // 1NNN: Jump to memory location NNN
            Jump(addr) => self.pc = addr,
            // 2NNN: Call subroutine at memory location NNN
            Call(addr) => {
                if self.sp as usize == STACK_DEPTH {
                    return Err(Fault::StackOverflow { pc: at });
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            // 3XKK: Skip next instruction if VX == KK
            SkipEqImm(x, byte) => self.skip_if(self.reg(x) == byte),
            // 4XKK: Skip next instruction if VX != KK
            SkipNeqImm(x, byte) => self.skip_if(self.reg(x) != byte),
            // 5XY0: Skip next instruction if VX == VY
            SkipEqReg(x, y) => self.skip_if(self.reg(x) == self.reg(y)),
            // 6XKK: Set register VX to the value KK
            SetImm(x, byte) => self.set_reg(x, byte),
            // 7XKK: Add the value KK to VX, no carry
            AddImm(x, byte) => self.set_reg(x, self.reg(x).wrapping_add(byte)),
            // 8XY0: Set register VX to the value of VY
            Set(x, y) => self.set_reg(x, self.reg(y)),
            // 8XY1/8XY2/8XY3: Binary OR/AND/XOR of VX and VY stored in VX
            Or(x, y) => self.logic(x, self.reg(x) | self.reg(y)),
            And(x, y) => self.logic(x, self.reg(x) & self.reg(y)),
            Xor(x, y) => self.logic(x, self.reg(x) ^ self.reg(y)),
            // 8XY4: VX = VX + VY, VF = carry
            Add(x, y) => {
                let (res, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_reg_with_flag(x, res, carry);
            }
            // 8XY5: VX = VX - VY, VF = VX > VY
            Sub(x, y) => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_reg_with_flag(x, vx.wrapping_sub(vy), vx > vy);
            }
            // 8XY6: Shift VX right by one, VF = bit shifted out
            ShiftRight(x, y) => {
                let value = self.shift_operand(x, y);
                self.set_reg_with_flag(x, value >> 1, value & 0x01 == 1);
            }
            // 8XY7: VX = VY - VX, VF = VY > VX
            SubReverse(x, y) => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_reg_with_flag(x, vy.wrapping_sub(vx), vy > vx);
            }
            // 8XYE: Shift VX left by one, VF = bit shifted out
            ShiftLeft(x, y) => {
                let value = self.shift_operand(x, y);
                self.set_reg_with_flag(x, value << 1, value & 0x80 != 0);
            }
            // 9XY0: Skip next instruction if VX != VY
            SkipNeqReg(x, y) => self.skip_if(self.reg(x) != self.reg(y)),
            // ANNN: Set index register I to the value NNN
            SetIndex(addr) => self.index = addr,
            // BNNN: Jump to NNN + V0 (or XNN + VX with the quirk)
            JumpOffset(x, addr) => {
                let offset = if self.quirks.jump_with_vx {
                    self.reg(x)
                } else {
                    self.regs[0]
                };
                self.pc = addr.wrapping_add(offset as u16);
            }
            // CXKK: VX = random byte AND KK
            Random(x, mask) => {
                let n = self.rng.next_u32() as u8;
                self.set_reg(x, n & mask);
            }
            // DXYN: Draw an N rows tall sprite from memory at I to (VX, VY), VF = collision
            Draw(x, y, rows) => {
                let rows = rows as usize;
                let mut sprite = [0u8; MAX_SPRITE_ROWS];
                for (row, data) in sprite[..rows].iter_mut().enumerate() {
                    *data = self.memory.read_u8(self.index.wrapping_add(row as u16));
                }

                let (vx, vy) = (self.reg(x), self.reg(y));
                let collision = self.display.draw_sprite(vx, vy, &sprite[..rows]);
                self.regs[VF] = collision as u8;
            }
            // EX9E: Skip next instruction if key VX is pressed
            SkipKeyPressed(x) => self.skip_if(self.key_pressed(self.reg(x))),
            // EXA1: Skip next instruction if key VX is not pressed
            SkipKeyNotPressed(x) => self.skip_if(!self.key_pressed(self.reg(x))),
            // FX07: VX = delay timer
            GetDelay(x) => self.set_reg(x, self.delay_timer),
            // FX0A: Wait for a key press, VX = key. Re-executes until a key is down.
            WaitKey(x) => match self.keys.iter().position(|pressed| *pressed) {
                Some(key) => self.set_reg(x, key as u8),
                None => self.pc = self.pc.wrapping_sub(2),
            },
            // FX15: delay timer = VX
            SetDelay(x) => self.delay_timer = self.reg(x),
            // FX18: sound timer = VX
            SetSound(x) => self.sound_timer = self.reg(x),
            // FX1E: I = I + VX, no flag
            AddIndex(x) => self.index = self.index.wrapping_add(self.reg(x) as u16),
            // FX29: I = address of the glyph for digit VX
            Glyph(x) => self.index = FONT_START + GLYPH_SIZE * self.reg(x) as u16,
            // FX33: Store the decimal digits of VX at I, I+1 and I+2
            Bcd(x) => {
                let value = self.reg(x);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (offset, digit) in digits.into_iter().enumerate() {
                    self.memory
                        .write_u8(self.index.wrapping_add(offset as u16), digit);
                }
            }
            // FX55: Store V0..=VX at memory addresses starting at I
            Store(x) => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.memory.write_u8(addr, self.regs[i as usize]);
                }
                self.advance_index_after_transfer(x);
            }
            // FX65: Load V0..=VX from memory addresses starting at I
            Load(x) => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.set_reg(i, self.memory.read_u8(addr));
                }
                self.advance_index_after_transfer(x);
            }
            Unknown(opcode) => return Err(Fault::UnknownOpcode { pc: at, opcode }),
        }

        Ok(())
    }

    fn reg(&self, x: Reg) -> u8 {
        self.regs[x as usize]
    }

    fn set_reg(&mut self, x: Reg, value: u8) {
        self.regs[x as usize] = value;
    }

    /// VF is written last so it holds the flag even when X is F.
    fn set_reg_with_flag(&mut self, x: Reg, value: u8, flag: bool) {
        self.regs[x as usize] = value;
        self.regs[VF] = flag as u8;
    }

    fn logic(&mut self, x: Reg, value: u8) {
        self.set_reg(x, value);
        if self.quirks.logic_resets_vf {
            self.regs[VF] = 0;
        }
    }

    fn shift_operand(&mut self, x: Reg, y: Reg) -> u8 {
        if self.quirks.shift_copies_vy {
            self.set_reg(x, self.reg(y));
        }
        self.reg(x)
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// Keys outside the keypad are never pressed.
    fn key_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    fn advance_index_after_transfer(&mut self, x: Reg) {
        if self.quirks.load_store_increments_index {
            self.index = self.index.wrapping_add(x as u16 + 1);
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
