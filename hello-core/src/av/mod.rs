//! Software video for hello-core.
//!
//! The core owns a single RGB565 framebuffer of `WIDTH * HEIGHT` pixels. Every frame
//! starts with `clear`, then draws are purely additive (no blending, no depth).
//! The finished buffer is handed to the host's video sink as-is.

use crate::abi::colors::BLACK;
use crate::abi::{HEIGHT, PITCH, WIDTH};
use crate::error::CoreError;
use crate::font::{self, GLYPH_SIZE};


/// Host-visible framebuffer (RGB565, row-major).
pub struct Framebuffer {
    pixels: Vec<u16>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; WIDTH * HEIGHT],
        }
    }
}

impl Framebuffer {
    pub fn width(&self) -> u32 {
        WIDTH as u32
    }

    pub fn height(&self) -> u32 {
        HEIGHT as u32
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        PITCH
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u16> {
        index(x, y).map(|idx| self.pixels[idx])
    }

    /// Set every pixel to black.
    pub fn clear(&mut self) {
        self.pixels.fill(BLACK);
    }

    /// Write a single pixel; off-screen coordinates are dropped.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u16) {
        if let Some(idx) = index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Rasterize one 8x8 glyph with its top-left corner at `(x, y)`.
    ///
    /// Only set bits are written. Pixels falling outside the framebuffer are
    /// clipped. A character without a glyph leaves the buffer untouched.
    pub fn draw_glyph(&mut self, x: i32, y: i32, c: char, color: u16) -> Result<(), CoreError> {
        let glyph = font::glyph(c).ok_or(CoreError::InvalidGlyph(c))?;

        for (gy, row) in (0..GLYPH_SIZE).zip(glyph) {
            let Some(py) = y.checked_add(gy) else { break };
            for gx in 0..GLYPH_SIZE {
                if row & (0x80 >> gx) == 0 {
                    continue;
                }
                // Overflow lands past the right edge anyway.
                if let Some(px) = x.checked_add(gx) {
                    self.put_pixel(px, py, color);
                }
            }
        }

        Ok(())
    }

    /// Draw `text` left to right starting at `(x, y)`.
    ///
    /// The cursor advances by one glyph width per character, including characters
    /// that have no glyph. Those are collected and returned once the whole string
    /// has been drawn.
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str, color: u16) -> Result<(), CoreError> {
        let mut skipped = Vec::new();
        let mut cx = x;

        for c in text.chars() {
            if self.draw_glyph(cx, y, c, color).is_err() {
                skipped.push(c);
            }
            cx = cx.saturating_add(GLYPH_SIZE);
        }

        if skipped.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidGlyphs(skipped))
        }
    }

    /// Fill a `w` x `h` rectangle, clipped to the framebuffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u16) {
        let x_start = x.max(0);
        let y_start = y.max(0);
        let w = i32::try_from(w).unwrap_or(i32::MAX);
        let h = i32::try_from(h).unwrap_or(i32::MAX);
        let x_end = x.saturating_add(w).min(WIDTH as i32);
        let y_end = y.saturating_add(h).min(HEIGHT as i32);

        if x_start >= x_end || y_start >= y_end {
            return;
        }

        for curr_y in y_start..y_end {
            let start_idx = (curr_y as usize) * WIDTH + (x_start as usize);
            let end_idx = (curr_y as usize) * WIDTH + (x_end as usize);
            self.pixels[start_idx..end_idx].fill(color);
        }
    }
}

fn index(x: i32, y: i32) -> Option<usize> {
    if x >= 0 && (x as usize) < WIDTH && y >= 0 && (y as usize) < HEIGHT {
        Some(y as usize * WIDTH + x as usize)
    } else {
        None
    }
}
