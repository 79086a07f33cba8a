use std::fmt;

use crate::color::{Chip8Color, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR};

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// 64x32 monochrome framebuffer.
///
/// Pixel state is kept as one `u64` per scanline, the leftmost pixel in the
/// most significant bit, which makes XOR drawing with horizontal wraparound
/// a single rotate per sprite row. A colour buffer mirrors the state for
/// renderers.
#[derive(Clone)]
pub struct Display {
    rows: [u64; SCREEN_HEIGHT],
    /// RGBX pixels for SDL compatibility
    buffer: Vec<Chip8Color>,
    foreground: Chip8Color,
    background: Chip8Color,
    dirty: bool,
}

impl Display {
    pub fn new(foreground: Chip8Color, background: Chip8Color) -> Display {
        Display {
            rows: [0; SCREEN_HEIGHT],
            buffer: vec![background; SCREEN_WIDTH * SCREEN_HEIGHT],
            foreground,
            background,
            dirty: true,
        }
    }

    /// Pixel state at (x, y); coordinates wrap around the screen edges.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let row = self.rows[y % SCREEN_HEIGHT];
        (row >> (SCREEN_WIDTH - 1 - x % SCREEN_WIDTH)) & 1 == 1
    }

    /// Raw scanlines, bit 63 is the leftmost pixel.
    pub fn rows(&self) -> &[u64; SCREEN_HEIGHT] {
        &self.rows
    }

    /// Render buffer as RGBX8888 bytes, `SCREEN_WIDTH * 4` bytes per line.
    pub fn buffer(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffer[..])
    }

    /// Whether the screen changed since it was last presented.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_presented(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn clear(&mut self) {
        self.rows = [0; SCREEN_HEIGHT];
        self.buffer.fill(self.background);
        self.dirty = true;
    }

    /// XOR one 8 pixel wide sprite onto the screen with its top left corner
    /// at (x, y). Every sprite pixel wraps independently in both directions.
    ///
    /// Returns true if any pixel was switched from on to off.
    pub(crate) fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x = x as u32 % SCREEN_WIDTH as u32;
        let mut collision = false;

        for (line, byte) in sprite.iter().enumerate() {
            let row = (y as usize + line) % SCREEN_HEIGHT;
            let bits = ((*byte as u64) << (SCREEN_WIDTH - 8)).rotate_right(x);

            collision |= self.rows[row] & bits != 0;
            self.rows[row] ^= bits;
            self.refresh_row(row);
        }

        self.dirty = true;
        collision
    }

    fn refresh_row(&mut self, row: usize) {
        let bits = self.rows[row];
        let line = &mut self.buffer[row * SCREEN_WIDTH..(row + 1) * SCREEN_WIDTH];
        for (x, pxl) in line.iter_mut().enumerate() {
            let on = (bits >> (SCREEN_WIDTH - 1 - x)) & 1 == 1;
            *pxl = if on { self.foreground } else { self.background };
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Display::new(DEFAULT_FOREGROUND_COLOR, DEFAULT_BACKGROUND_COLOR)
    }
}

/// Text rendering, one line per scanline.
impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let pxl = if self.pixel(x, y) { '█' } else { ' ' };
                write!(f, "{}", pxl)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("rows", &self.rows)
            .field("dirty", &self.dirty)
            .finish()
    }
}
