//! Roadside props

use crate::config::SCREEN_WIDTH;
use crate::rasterizer::{DrawSurface, Rgb565};
use crate::track::SceneryKind;

/// Props further than this off-screen are skipped
const MARGIN: i32 = 60;

const TRUNK_DARK: Rgb565 = Rgb565::rgb(80, 50, 20);
const TRUNK_LIGHT: Rgb565 = Rgb565::rgb(120, 80, 30);
const ROCK: Rgb565 = Rgb565::rgb(100, 95, 90);

/// Foliage colour, dimmed at night
fn foliage(kind: SceneryKind, night: bool) -> Rgb565 {
    match (kind, night) {
        (SceneryKind::Pine, false) => Rgb565::rgb(0, 130, 25),
        (SceneryKind::Pine, true) => Rgb565::rgb(0, 50, 10),
        (SceneryKind::RoundTree, false) => Rgb565::rgb(0, 140, 30),
        (SceneryKind::RoundTree, true) => Rgb565::rgb(0, 55, 12),
        (_, false) => Rgb565::rgb(20, 130, 20),
        (_, true) => Rgb565::rgb(0, 48, 10),
    }
}

/// Draw a prop standing on the ground at (`sx`, `sy`)
///
/// Sizes are world units times the perspective `scale`, so props shrink
/// with distance exactly like the road.
pub fn draw_scenery<S: DrawSurface + ?Sized>(fb: &mut S, kind: SceneryKind, sx: i32, sy: i32, scale: f32, night: bool) {
    if sy <= 0 || sx < -MARGIN || sx > SCREEN_WIDTH + MARGIN || !(scale > 0.0) {
        return;
    }
    let px = |world: f32| (scale * world) as i32;

    match kind {
        SceneryKind::Pine => {
            let h = px(28_000.0);
            let w = px(10_000.0);
            if h < 3 || w < 2 {
                return;
            }
            let trunk_h = h / 4;
            let trunk_w = (w / 5).max(2);
            fb.fill_rect(sx - trunk_w / 2, sy - trunk_h, trunk_w, trunk_h, TRUNK_DARK);
            fb.triangle(sx, sy - h, sx - w / 2, sy - trunk_h, sx + w / 2, sy - trunk_h, foliage(kind, night));
        }
        SceneryKind::RoundTree => {
            let h = px(26_000.0);
            let w = px(12_000.0);
            if h < 3 || w < 2 {
                return;
            }
            let trunk_h = h * 2 / 3;
            let trunk_w = (w / 8).max(2);
            let leaf_r = (w / 2).max(2);
            fb.fill_rect(sx - trunk_w / 2, sy - trunk_h, trunk_w, trunk_h, TRUNK_LIGHT);
            fb.fill_circle(sx, sy - trunk_h - leaf_r / 2, leaf_r, foliage(kind, night));
        }
        SceneryKind::Bush => {
            let r = px(6_000.0).max(2);
            fb.fill_circle(sx, sy - r, r, foliage(kind, night));
        }
        SceneryKind::Rock => {
            let rh = px(6_000.0).max(2);
            let rw = px(8_000.0).max(3);
            fb.fill_rect(sx - rw / 2, sy - rh, rw, rh, ROCK);
        }
        SceneryKind::Pole => {
            let ph = px(14_000.0).max(3);
            const PW: i32 = 3;
            fb.fill_rect(sx - PW / 2, sy - ph, PW, ph, Rgb565::WHITE);
            if ph > 6 {
                fb.fill_rect(sx - PW / 2, sy - ph, PW, 3, Rgb565::RED);
            }
        }
    }
}
