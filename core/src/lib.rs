mod chip8;
mod color;
mod display;
mod error;
pub mod instruction;
pub mod memory;

pub use chip8::{Chip8, Chip8Builder, Chip8Mode, Quirks, KEY_COUNT, STACK_DEPTH};
pub use color::{
    Chip8Color, Chip8ColorParseError, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR,
};
pub use display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::{Chip8Error, Fault};
pub use instruction::Instruction;
