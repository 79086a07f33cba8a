use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

pub const DEFAULT_BACKGROUND_COLOR: Chip8Color = Chip8Color::new(0, 0, 0);
pub const DEFAULT_FOREGROUND_COLOR: Chip8Color = Chip8Color::new(255, 255, 255);

/// A single pixel of the render buffer, laid out as RGBX8888 on little endian
/// hosts so the buffer can be streamed straight into an SDL texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Chip8Color {
    padding: u8,
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Chip8Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Chip8Color {
        Chip8Color { r, g, b, padding: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse hex color {0:?}, expected RRGGBB or 0xRRGGBB")]
pub struct Chip8ColorParseError(pub String);

impl FromStr for Chip8Color {
    type Err = Chip8ColorParseError;

    fn from_str(s: &str) -> Result<Chip8Color, Chip8ColorParseError> {
        let err = || Chip8ColorParseError(s.to_string());

        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| err())
        };

        Ok(Chip8Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        let color: Chip8Color = "0xAABBCC".parse().unwrap();
        assert_eq!(color, Chip8Color::new(0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn test_parse_bare() {
        let color: Chip8Color = "10ff7f".parse().unwrap();
        assert_eq!(color, Chip8Color::new(0x10, 0xFF, 0x7F));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("0xABC".parse::<Chip8Color>().is_err());
        assert!("GGGGGG".parse::<Chip8Color>().is_err());
        assert!("0x+1+2+3".parse::<Chip8Color>().is_err());
        assert!("".parse::<Chip8Color>().is_err());
    }

    #[test]
    fn test_byte_layout() {
        let color = Chip8Color::new(1, 2, 3);
        assert_eq!(bytemuck::bytes_of(&color), &[0, 3, 2, 1]);
    }
}
