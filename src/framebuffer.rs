use serde::{Deserialize, Serialize};

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;
pub const CHIP8_HIRES_DISPLAY_HEIGHT: usize = 64;

/// Monochrome, one bool per pixel, row major. Length is always width * height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Framebuffer {
    pub fn new(hi_res: bool) -> Self {
        let height = if hi_res {
            CHIP8_HIRES_DISPLAY_HEIGHT
        } else {
            CHIP8_DISPLAY_HEIGHT
        };
        Framebuffer {
            width: CHIP8_DISPLAY_WIDTH,
            height,
            pixels: vec![false; CHIP8_DISPLAY_WIDTH * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_hi_res(&self) -> bool {
        self.height == CHIP8_HIRES_DISPLAY_HEIGHT
    }

    /// read-only view for whoever renders the screen
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % self.height) * self.width + (x % self.width)]
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
    }

    /// XOR an 8-pixel-wide sprite onto the screen, one byte per row. The
    /// origin wraps onto the screen and so does every pixel after it.
    /// Returns true if any lit pixel got switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let ox = x as usize % self.width;
        let oy = y as usize % self.height;
        let mut collision = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = (oy + row) % self.height;
            for column in 0..8 {
                if bits & (0x80 >> column) == 0 {
                    continue;
                }
                let px = (ox + column) % self.width;
                let p = &mut self.pixels[py * self.width + px];
                collision |= *p;
                *p = !*p;
            }
        }
        collision
    }

    /// (x, y) of every lit pixel, top left first
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, lit)| **lit)
            .map(move |(i, _)| (i % w, i / w))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(Framebuffer::new(false).pixels().len(), 2048);
        let hires = Framebuffer::new(true);
        assert_eq!(hires.pixels().len(), 4096);
        assert!(hires.is_hi_res());
    }

    #[test]
    fn test_draw_sets_pixels() {
        let mut fb = Framebuffer::new(false);
        assert!(!fb.draw_sprite(1, 2, &[0b1000_0001]));
        assert!(fb.pixel(1, 2));
        assert!(fb.pixel(8, 2));
        assert!(!fb.pixel(2, 2));
        assert_eq!(fb.lit_pixels().collect::<Vec<_>>(), vec![(1, 2), (8, 2)]);
    }

    #[test]
    fn test_draw_twice_restores_and_collides() {
        let mut fb = Framebuffer::new(false);
        fb.draw_sprite(0, 0, &[0xff]);
        let before = fb.clone();
        let sprite = [0xf0, 0x90, 0x90, 0x90, 0xf0];
        assert!(!fb.draw_sprite(60, 30, &sprite));
        assert!(fb.draw_sprite(60, 30, &sprite));
        assert_eq!(fb, before);
    }

    #[test]
    fn test_draw_wraps_both_axes() {
        let mut fb = Framebuffer::new(false);
        fb.draw_sprite(62, 31, &[0xf0, 0x80]);
        assert!(fb.pixel(62, 31));
        assert!(fb.pixel(63, 31));
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(1, 31));
        assert!(fb.pixel(62, 0));
    }

    #[test]
    fn test_origin_wraps() {
        let mut fb = Framebuffer::new(false);
        fb.draw_sprite(64 + 3, 32 + 4, &[0x80]);
        assert!(fb.pixel(3, 4));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(true);
        fb.draw_sprite(10, 40, &[0xff, 0xff]);
        fb.clear();
        assert!(fb.pixels().iter().all(|p| !p));
    }
}
