//! Drawing surface abstraction
//!
//! Every primitive the game needs is built on two backend operations:
//! a clipped pixel write and a clipped horizontal span. Backends only
//! implement those (plus size and clip window); the rest is provided.

use super::color::Rgb565;
use super::font;

/// Radii beyond this are degenerate projections and get skipped
const MAX_RADIUS: i32 = 2048;
/// Vertices further out than this are dropped rather than walked
const MAX_COORD: i32 = 1 << 16;

/// Text rendering parameters
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Integer glyph scale (1 = 6x8 cell)
    pub size: i32,
    pub fg: Rgb565,
    /// Cell background, `None` for transparent
    pub bg: Option<Rgb565>,
}

impl TextStyle {
    pub fn new(size: i32, fg: Rgb565) -> Self {
        Self { size: size.max(1), fg, bg: None }
    }

    pub fn with_bg(mut self, bg: Rgb565) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Pixel width of `text` in this style
    pub fn measure(&self, text: &str) -> i32 {
        text.chars().count() as i32 * font::CELL_W * self.size
    }
}

/// Print-style cursor that advances across a surface
#[derive(Debug, Clone, Copy)]
pub struct TextCursor {
    pub x: i32,
    pub y: i32,
    pub style: TextStyle,
}

impl TextCursor {
    pub fn new(x: i32, y: i32, style: TextStyle) -> Self {
        Self { x, y, style }
    }

    pub fn print<S: DrawSurface + ?Sized>(&mut self, surface: &mut S, text: &str) {
        self.x = surface.text(self.x, self.y, text, &self.style);
    }
}

pub trait DrawSurface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Restrict drawing to rows `top..bottom`
    fn set_clip_rows(&mut self, top: i32, bottom: i32);
    fn reset_clip(&mut self);

    /// Write one pixel; out-of-bounds and clipped writes are dropped
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565);

    /// Fill the inclusive span `x0..=x1` on row `y`
    fn fill_span(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565);

    fn h_line(&mut self, x: i32, y: i32, w: i32, color: Rgb565) {
        if w > 0 {
            self.fill_span(x, x + w - 1, y, color);
        }
    }

    fn v_line(&mut self, x: i32, y: i32, h: i32, color: Rgb565) {
        for yy in y..y + h {
            self.set_pixel(x, yy, color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        if w <= 0 || h <= 0 {
            return;
        }
        let y0 = y.max(0);
        let y1 = (y + h).min(self.height());
        for yy in y0..y1 {
            self.fill_span(x, x + w - 1, yy, color);
        }
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.h_line(x, y, w, color);
        self.h_line(x, y + h - 1, w, color);
        self.v_line(x, y, h, color);
        self.v_line(x + w - 1, y, h, color);
    }

    /// Bresenham line
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        if [x0, y0, x1, y1].iter().any(|c| c.abs() > MAX_COORD) {
            return;
        }
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        // bounded so wild coordinates can't stall a frame
        let max_steps = (dx - dy) as i64 + 1;
        for _ in 0..=max_steps {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Filled triangle via scanline edge walking
    fn triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb565) {
        let mut v = [(x0, y0), (x1, y1), (x2, y2)];
        if v.iter().any(|&(x, y)| x.abs() > MAX_COORD || y.abs() > MAX_COORD) {
            return;
        }
        v.sort_by_key(|p| p.1);
        let [(ax, ay), (bx, by), (cx, cy)] = v;
        if ay == cy {
            let lo = ax.min(bx).min(cx);
            let hi = ax.max(bx).max(cx);
            self.fill_span(lo, hi, ay, color);
            return;
        }
        let top = ay.max(0);
        let bottom = cy.min(self.height() - 1);
        for y in top..=bottom {
            let long = ax as f32 + (cx - ax) as f32 * (y - ay) as f32 / (cy - ay) as f32;
            let short = if y < by {
                if by == ay {
                    bx as f32
                } else {
                    ax as f32 + (bx - ax) as f32 * (y - ay) as f32 / (by - ay) as f32
                }
            } else if cy == by {
                bx as f32
            } else {
                bx as f32 + (cx - bx) as f32 * (y - by) as f32 / (cy - by) as f32
            };
            let (l, r) = if long < short { (long, short) } else { (short, long) };
            self.fill_span(l.round() as i32, r.round() as i32, y, color);
        }
    }

    /// Convex quad as two triangles (corners in winding order)
    fn fill_quad(&mut self, p: [(i32, i32); 4], color: Rgb565) {
        self.triangle(p[0].0, p[0].1, p[1].0, p[1].1, p[2].0, p[2].1, color);
        self.triangle(p[0].0, p[0].1, p[2].0, p[2].1, p[3].0, p[3].1, color);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        if !(0..=MAX_RADIUS).contains(&r) {
            return;
        }
        let r_sq = r * r;
        for dy in -r..=r {
            let dx = ((r_sq - dy * dy) as f32).sqrt() as i32;
            self.fill_span(cx - dx, cx + dx, cy + dy, color);
        }
    }

    /// Midpoint circle outline
    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        if r > MAX_RADIUS {
            return;
        }
        if r <= 0 {
            self.set_pixel(cx, cy, color);
            return;
        }
        let (mut x, mut y) = (r, 0);
        let mut err = 1 - r;
        while x >= y {
            for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.set_pixel(cx + px, cy + py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Rgb565) {
        if rx <= 0 || ry <= 0 || rx > MAX_RADIUS || ry > MAX_RADIUS {
            return;
        }
        for dy in -ry..=ry {
            let t = dy as f32 / ry as f32;
            let dx = (rx as f32 * (1.0 - t * t).max(0.0).sqrt()) as i32;
            self.fill_span(cx - dx, cx + dx, cy + dy, color);
        }
    }

    /// Draw `text` at (x, y); returns the x just past the last glyph
    fn text(&mut self, x: i32, y: i32, text: &str, style: &TextStyle) -> i32 {
        let s = style.size.max(1);
        let mut pen = x;
        for ch in text.chars() {
            if let Some(bg) = style.bg {
                self.fill_rect(pen, y, font::CELL_W * s, font::CELL_H * s, bg);
            }
            let columns = font::glyph(ch);
            for (col, bits) in columns.iter().enumerate() {
                for row in 0..font::GLYPH_H {
                    if bits & (1 << row) != 0 {
                        let px = pen + col as i32 * s;
                        let py = y + row * s;
                        if s == 1 {
                            self.set_pixel(px, py, style.fg);
                        } else {
                            self.fill_rect(px, py, s, s, style.fg);
                        }
                    }
                }
            }
            pen += font::CELL_W * s;
        }
        pen
    }

    /// Text horizontally centred on `cx`
    fn text_centered(&mut self, cx: i32, y: i32, text: &str, style: &TextStyle) {
        let w = style.measure(text);
        self.text(cx - w / 2, y, text, style);
    }
}
