//! Parallax sky and horizon

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::palette::Palette;
use super::road::TUNNEL_GLOOM;
use crate::config::{SCREEN_CY, SCREEN_WIDTH, SKY_CURVE_SCROLL, SKY_STEER_PARALLAX};
use crate::rasterizer::{DrawSurface, Framebuffer, Rgb565};
use crate::settings::TimeOfDay;

/// Two screens wide so the sun only shows once
pub const BACKGROUND_WIDTH: usize = SCREEN_WIDTH as usize * 2;

const FALLBACK_TOP: Rgb565 = Rgb565::rgb(40, 40, 80);
const FALLBACK_BOTTOM: Rgb565 = Rgb565::rgb(150, 100, 150);
const HORIZON: Rgb565 = Rgb565::rgb(100, 100, 100);
const LIT_WINDOW: Rgb565 = Rgb565::rgb(255, 220, 120);

const STARS_X: [i32; 17] = [15, 45, 78, 120, 155, 190, 225, 260, 290, 310, 33, 67, 105, 145, 185, 230, 275];
const STARS_Y: [i32; 17] = [8, 25, 15, 5, 30, 12, 22, 8, 18, 28, 40, 48, 35, 50, 42, 55, 38];

/// Pre-rendered sky strip, built once per time of day and read-only afterwards
pub struct Background {
    surface: Option<Framebuffer>,
}

impl Background {
    pub fn new(palette: &Palette, time: TimeOfDay, seed: u64) -> Self {
        match Framebuffer::try_new(BACKGROUND_WIDTH, SCREEN_CY as usize) {
            Ok(mut fb) => {
                paint(&mut fb, palette, time, seed);
                debug!(?time, "background built");
                Self { surface: Some(fb) }
            }
            Err(e) => {
                warn!(error = %e, "background unavailable, using flat sky");
                Self { surface: None }
            }
        }
    }

    /// Flat two-band sky
    #[cfg(test)]
    pub fn flat() -> Self {
        Self { surface: None }
    }
}

fn gradient(palette: &Palette, y: i32) -> Rgb565 {
    let t = y as f32 / (SCREEN_CY - 1).max(1) as f32;
    if t < 0.5 {
        palette.sky[0].lerp(palette.sky[1], t * 2.0)
    } else {
        palette.sky[1].lerp(palette.sky[2], (t - 0.5) * 2.0)
    }
}

fn paint(fb: &mut Framebuffer, palette: &Palette, time: TimeOfDay, seed: u64) {
    let width = fb.width as i32;
    for y in 0..SCREEN_CY {
        fb.h_line(0, y, width, gradient(palette, y));
    }

    let cx = width / 2;
    match time {
        TimeOfDay::Day => {
            fb.fill_circle(cx, 30, 16, palette.sky[0].lerp(Rgb565::WHITE, 0.5));
            fb.fill_circle(cx, 30, 12, Rgb565::rgb(255, 240, 150));
        }
        TimeOfDay::Sunset => {
            let sun_y = SCREEN_CY - 22;
            fb.fill_circle(cx, sun_y, 24, Rgb565::rgb(255, 200, 80));
            // horizontal cut-outs across the lower half
            for k in 0..4 {
                let y = sun_y + 4 + k * 5;
                for row in y..y + k + 1 {
                    fb.h_line(cx - 24, row, 49, gradient(palette, row));
                }
            }
        }
        TimeOfDay::Night => {
            fb.fill_circle(cx, 28, 9, Rgb565::rgb(230, 230, 210));
            fb.fill_circle(cx + 4, 25, 8, gradient(palette, 25));
        }
    }

    draw_skyline(fb, palette, time, seed);
}

/// Seeded silhouette of blocks along the bottom of the strip
fn draw_skyline(fb: &mut Framebuffer, palette: &Palette, time: TimeOfDay, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let width = fb.width as i32;
    let silhouette = palette.sky[2].lerp(Rgb565::BLACK, 0.5);
    let lit = time != TimeOfDay::Day;

    let mut x = 0;
    while x < width {
        let w: i32 = rng.gen_range(12..32);
        let h: i32 = rng.gen_range(8..40);
        let top = SCREEN_CY - h;
        for shift in [0, -width] {
            fb.fill_rect(x + shift, top, w, h, silhouette);
        }
        if lit {
            for wy in (top + 3..SCREEN_CY - 2).step_by(5) {
                for wx in (x + 2..x + w - 2).step_by(4) {
                    if rng.gen_bool(0.15) {
                        fb.set_pixel(wx.rem_euclid(width), wy, LIT_WINDOW);
                    }
                }
            }
        }
        x += w + rng.gen_range(0..6);
    }
}

/// Horizontal scroll of the sky, driven by road curvature and steering
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkyScroll {
    offset: f32,
}

impl SkyScroll {
    pub fn advance(&mut self, curve: f32, speed_fraction: f32, dt: f32) {
        self.offset += curve * speed_fraction * SKY_CURVE_SCROLL * dt;
        self.offset = self.offset.rem_euclid(BACKGROUND_WIDTH as f32);
    }

    /// Pixel offset into the background for a player at lateral `player_x`
    pub fn pixels(&self, player_x: f32) -> i32 {
        (self.offset + player_x * SKY_STEER_PARALLAX) as i32
    }
}

/// Sky rows above the horizon; inside a tunnel only the gloom shows
pub fn draw_sky(fb: &mut Framebuffer, background: &Background, in_tunnel: bool, time: TimeOfDay, offset: i32) {
    if in_tunnel {
        fb.fill_rect(0, 0, SCREEN_WIDTH, SCREEN_CY, TUNNEL_GLOOM);
        return;
    }

    match &background.surface {
        Some(strip) => fb.blit_wrapped(strip, offset, SCREEN_CY as usize),
        None => {
            fb.fill_rect(0, 0, SCREEN_WIDTH, SCREEN_CY / 2, FALLBACK_TOP);
            fb.fill_rect(0, SCREEN_CY / 2, SCREEN_WIDTH, SCREEN_CY / 2, FALLBACK_BOTTOM);
        }
    }

    if time == TimeOfDay::Night {
        for (&x, &y) in STARS_X.iter().zip(STARS_Y.iter()) {
            fb.set_pixel(x, y, Rgb565::WHITE);
        }
    }

    fb.h_line(0, SCREEN_CY, SCREEN_WIDTH, HORIZON);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SCREEN_HEIGHT;

    fn screen() -> Framebuffer {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.clear(Rgb565::BLACK);
        fb
    }

    #[test]
    fn test_background_fills_every_sky_row() {
        let palette = Palette::for_time(TimeOfDay::Day);
        let bg = Background::new(&palette, TimeOfDay::Day, 7);
        assert!(bg.surface.is_some());
        let mut fb = screen();
        draw_sky(&mut fb, &bg, false, TimeOfDay::Day, 0);
        // top row is plain gradient
        assert_eq!(fb.get_pixel(0, 0), palette.sky[0]);
        assert_eq!(fb.get_pixel(100, SCREEN_CY as usize), HORIZON);
        // the ground below is left alone
        assert_eq!(fb.get_pixel(100, SCREEN_CY as usize + 5), Rgb565::BLACK);
    }

    #[test]
    fn test_skyline_is_seeded() {
        let palette = Palette::for_time(TimeOfDay::Night);
        let a = Background::new(&palette, TimeOfDay::Night, 3);
        let b = Background::new(&palette, TimeOfDay::Night, 3);
        let c = Background::new(&palette, TimeOfDay::Night, 4);
        let pixels = |bg: &Background| bg.surface.as_ref().map(|s| s.pixels.clone()).unwrap_or_default();
        assert_eq!(pixels(&a), pixels(&b));
        assert_ne!(pixels(&a), pixels(&c));
    }

    #[test]
    fn test_offset_scrolls_the_strip() {
        let palette = Palette::for_time(TimeOfDay::Sunset);
        let bg = Background::new(&palette, TimeOfDay::Sunset, 1);
        let mut a = screen();
        let mut b = screen();
        draw_sky(&mut a, &bg, false, TimeOfDay::Sunset, 0);
        draw_sky(&mut b, &bg, false, TimeOfDay::Sunset, 10);
        let y = SCREEN_CY as usize - 3;
        let row = |fb: &Framebuffer, x: usize| fb.get_pixel(x, y);
        for x in 0..100 {
            assert_eq!(row(&b, x), row(&a, x + 10));
        }
    }

    #[test]
    fn test_flat_fallback_and_stars() {
        let mut fb = screen();
        draw_sky(&mut fb, &Background::flat(), false, TimeOfDay::Night, 0);
        assert_eq!(fb.get_pixel(1, 1), FALLBACK_TOP);
        assert_eq!(fb.get_pixel(1, SCREEN_CY as usize - 1), FALLBACK_BOTTOM);
        assert_eq!(fb.get_pixel(15, 8), Rgb565::WHITE);
        assert_eq!(fb.get_pixel(275, 38), Rgb565::WHITE);
    }

    #[test]
    fn test_tunnel_hides_the_sky() {
        let palette = Palette::for_time(TimeOfDay::Day);
        let bg = Background::new(&palette, TimeOfDay::Day, 7);
        let mut fb = screen();
        draw_sky(&mut fb, &bg, true, TimeOfDay::Night, 0);
        assert_eq!(fb.get_pixel(15, 8), TUNNEL_GLOOM);
        assert_eq!(fb.get_pixel(100, SCREEN_CY as usize), Rgb565::BLACK);
    }

    #[test]
    fn test_scroll_follows_curve_and_steering() {
        let mut scroll = SkyScroll::default();
        scroll.advance(2.0, 1.0, 0.5);
        assert!(scroll.pixels(0.0) > 0);
        assert!(scroll.pixels(1.0) > scroll.pixels(0.0));
        scroll.advance(-2.0, 1.0, 0.5);
        assert_eq!(scroll.pixels(0.0), 0);
    }
}
