//! Off-screen RGB565 framebuffer

use std::path::Path;

use super::color::Rgb565;
use super::surface::DrawSurface;

#[derive(Debug, thiserror::Error)]
pub enum FramebufferError {
    #[error("cannot allocate {width}x{height} surface")]
    Alloc { width: usize, height: usize },
    #[error("image encode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Software render target
///
/// Owned exclusively by the renderer. A vertical clip window restricts
/// writes; it is reset at the start of every frame so the target is always
/// left in a defined state even if a draw step bails early.
pub struct Framebuffer {
    pub pixels: Vec<u16>,
    pub width: usize,
    pub height: usize,
    clip_top: i32,
    clip_bottom: i32,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
            clip_top: 0,
            clip_bottom: height as i32,
        }
    }

    /// Fallible allocation for large surfaces
    pub fn try_new(width: usize, height: usize) -> Result<Self, FramebufferError> {
        let len = width
            .checked_mul(height)
            .ok_or(FramebufferError::Alloc { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| FramebufferError::Alloc { width, height })?;
        pixels.resize(len, 0);
        Ok(Self {
            pixels,
            width,
            height,
            clip_top: 0,
            clip_bottom: height as i32,
        })
    }

    /// Reset the clip window and clear to `color`
    pub fn begin_frame(&mut self, color: Rgb565) {
        self.reset_clip();
        self.clear(color);
    }

    pub fn clear(&mut self, color: Rgb565) {
        self.pixels.fill(color.0);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Rgb565 {
        if x < self.width && y < self.height {
            Rgb565(self.pixels[y * self.width + x])
        } else {
            Rgb565::BLACK
        }
    }

    /// Copy rows `0..rows` of `src` (wrapping horizontally from `offset_x`)
    pub fn blit_wrapped(&mut self, src: &Framebuffer, offset_x: i32, rows: usize) {
        if src.width == 0 {
            return;
        }
        let rows = rows.min(self.height).min(src.height);
        let top = self.clip_top.max(0) as usize;
        let bottom = (self.clip_bottom.max(0) as usize).min(rows);
        let ox = offset_x.rem_euclid(src.width as i32) as usize;
        for y in top..bottom {
            let src_row = &src.pixels[y * src.width..(y + 1) * src.width];
            let dst_row = &mut self.pixels[y * self.width..(y + 1) * self.width];
            for (x, dst) in dst_row.iter_mut().enumerate() {
                *dst = src_row[(x + ox) % src.width];
            }
        }
    }

    /// Expand to RGBA bytes, e.g. for `Texture2D::from_rgba8`
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&Rgb565(p).to_rgba());
        }
        out
    }

    /// Write the current frame as a PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), FramebufferError> {
        let img = image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba8())
            .ok_or(FramebufferError::Alloc { width: self.width, height: self.height })?;
        img.save(path)?;
        Ok(())
    }
}

impl DrawSurface for Framebuffer {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn set_clip_rows(&mut self, top: i32, bottom: i32) {
        self.clip_top = top.clamp(0, self.height as i32);
        self.clip_bottom = bottom.clamp(self.clip_top, self.height as i32);
    }

    fn reset_clip(&mut self) {
        self.clip_top = 0;
        self.clip_bottom = self.height as i32;
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if x >= 0 && (x as usize) < self.width && y >= self.clip_top && y < self.clip_bottom {
            self.pixels[y as usize * self.width + x as usize] = color.0;
        }
    }

    fn fill_span(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565) {
        if y < self.clip_top || y >= self.clip_bottom {
            return;
        }
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let lo = lo.max(0);
        let hi = hi.min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let row = y as usize * self.width;
        self.pixels[row + lo as usize..=row + hi as usize].fill(color.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::TextStyle;

    #[test]
    fn test_span_clipped_to_bounds() {
        let mut fb = Framebuffer::new(16, 8);
        fb.fill_span(-100, 100, 3, Rgb565::RED);
        assert!((0..16).all(|x| fb.get_pixel(x, 3) == Rgb565::RED));
        assert_eq!(fb.get_pixel(0, 2), Rgb565::BLACK);
        // off-screen rows are ignored
        fb.fill_span(0, 4, -1, Rgb565::RED);
        fb.fill_span(0, 4, 8, Rgb565::RED);
    }

    #[test]
    fn test_clip_window() {
        let mut fb = Framebuffer::new(8, 8);
        fb.set_clip_rows(0, 4);
        fb.fill_rect(0, 0, 8, 8, Rgb565::WHITE);
        assert_eq!(fb.get_pixel(3, 3), Rgb565::WHITE);
        assert_eq!(fb.get_pixel(3, 4), Rgb565::BLACK);
        fb.begin_frame(Rgb565::BLUE);
        fb.set_pixel(3, 7, Rgb565::RED);
        assert_eq!(fb.get_pixel(3, 7), Rgb565::RED);
    }

    #[test]
    fn test_triangle_fills_interior() {
        let mut fb = Framebuffer::new(32, 32);
        fb.triangle(2, 2, 28, 2, 15, 28, Rgb565::GREEN);
        assert_eq!(fb.get_pixel(15, 10), Rgb565::GREEN);
        assert_eq!(fb.get_pixel(2, 27), Rgb565::BLACK);
        // degenerate and huge triangles are harmless
        fb.triangle(0, 0, 0, 0, 0, 0, Rgb565::RED);
        fb.triangle(-1_000_000, 0, 1_000_000, 0, 0, 1_000_000, Rgb565::RED);
    }

    #[test]
    fn test_text_advances_cursor() {
        let mut fb = Framebuffer::new(64, 16);
        let style = TextStyle::new(1, Rgb565::WHITE);
        let end = fb.text(0, 0, "AB", &style);
        assert_eq!(end, 12);
        // 'A' has its crossbar on row 4 of column 1
        assert_eq!(fb.get_pixel(1, 4), Rgb565::WHITE);
    }

    #[test]
    fn test_blit_wraps() {
        let mut bg = Framebuffer::new(4, 2);
        bg.set_pixel(0, 0, Rgb565::RED);
        let mut fb = Framebuffer::new(4, 2);
        fb.blit_wrapped(&bg, 3, 2);
        assert_eq!(fb.get_pixel(1, 0), Rgb565::RED);
    }
}
