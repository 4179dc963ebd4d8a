//! Roadside skyline blocks

use super::projection::RenderPoint;
use crate::config::{BUILDING_OFFSET, BUILDING_STYLES, BUILDING_W};
use crate::rasterizer::{DrawSurface, Rgb565};
use crate::track::Building;

/// Which side of the road a block stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Screen direction away from the road
    fn sign(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// Pixels per storey when spacing facade details
const FLOOR_PX: i32 = 25;

const WINDOW_WARM: Rgb565 = Rgb565::rgb(220, 220, 180);
const GLASS: Rgb565 = Rgb565::rgb(100, 200, 255);
const NEON_MAGENTA: Rgb565 = Rgb565::rgb(255, 0, 255);
const NEON_CYAN: Rgb565 = Rgb565::rgb(0, 255, 255);
const DOOR: Rgb565 = Rgb565::rgb(20, 20, 20);

/// Projected corners of one building slice
struct Footprint {
    /// Wall facing the road, near and far
    side0: i32,
    side1: i32,
    /// Back edge, near and far
    outer0: i32,
    outer1: i32,
    y0: i32,
    y1: i32,
    h0: i32,
    h1: i32,
    /// Near depth in pixels
    bw0: i32,
}

impl Footprint {
    fn new(near: &RenderPoint, far: &RenderPoint, height: u32, side: Side) -> Self {
        let s = side.sign();
        let side0 = near.x + s * (near.w as f32 * BUILDING_OFFSET) as i32;
        let side1 = far.x + s * (far.w as f32 * BUILDING_OFFSET) as i32;
        let bw0 = (near.scale * BUILDING_W) as i32;
        let bw1 = (far.scale * BUILDING_W) as i32;
        Self {
            side0,
            side1,
            outer0: side0 + s * bw0,
            outer1: side1 + s * bw1,
            y0: near.y,
            y1: far.y,
            h0: (near.scale * height as f32) as i32,
            h1: (far.scale * height as f32) as i32,
            bw0,
        }
    }

    /// Line across the road-facing wall at fraction `t` of its height
    fn wall_line<S: DrawSurface + ?Sized>(&self, fb: &mut S, t: f32, color: Rgb565) {
        let wy0 = self.y0 - (self.h0 as f32 * t) as i32;
        let wy1 = self.y1 - (self.h1 as f32 * t) as i32;
        fb.line(self.side0, wy0, self.side1, wy1, color);
    }
}

/// Facade details on the road-facing wall, picked by segment index
fn draw_facade<S: DrawSurface + ?Sized>(fb: &mut S, f: &Footprint, segment_index: usize) {
    let floors = f.h0 / FLOOR_PX;
    if floors <= 1 || floors >= 30 {
        return;
    }
    match segment_index % BUILDING_STYLES {
        // offices
        0 => {
            for fl in 1..floors {
                f.wall_line(fb, fl as f32 / floors as f32, WINDOW_WARM);
            }
        }
        // glass tower
        1 => {
            f.wall_line(fb, 0.5, GLASS);
            f.wall_line(fb, 1.0, Rgb565::WHITE);
        }
        // residential, every other floor lit
        2 => {
            for fl in 1..floors {
                if (fl as usize + segment_index) % 2 == 0 {
                    continue;
                }
                f.wall_line(fb, fl as f32 / floors as f32, Rgb565::YELLOW);
            }
        }
        3 => {
            if floors > 5 {
                f.wall_line(fb, 0.8, Rgb565::WHITE);
            }
        }
        // obstruction light
        4 => {
            if floors > 2 {
                let wy0 = f.y0 - (f.h0 as f32 * 0.9) as i32;
                let wy1 = f.y1 - (f.h1 as f32 * 0.9) as i32;
                fb.draw_circle((f.side0 + f.side1) / 2, (wy0 + wy1) / 2, 2, Rgb565::RED);
            }
        }
        _ => {
            let neon = if segment_index % 2 == 0 { NEON_MAGENTA } else { NEON_CYAN };
            fb.line(f.side0, f.y0, f.side0, f.y0 - f.h0, neon);
        }
    }
}

/// Draw one slice of a block between two projected segment edges
///
/// `show_front` adds the end facade facing the camera, for the first
/// slice of a run.
pub fn draw_building<S: DrawSurface + ?Sized>(
    fb: &mut S,
    near: &RenderPoint,
    far: &RenderPoint,
    building: &Building,
    segment_index: usize,
    side: Side,
    show_front: bool,
) {
    if !building.exists() || !near.is_visible() || !far.is_visible() {
        return;
    }
    let f = Footprint::new(near, far, building.height, side);

    fb.fill_quad(
        [(f.side0, f.y0), (f.side1, f.y1), (f.side1, f.y1 - f.h1), (f.side0, f.y0 - f.h0)],
        building.color.darken(0.6),
    );
    draw_facade(fb, &f, segment_index);

    fb.fill_quad(
        [
            (f.side0, f.y0 - f.h0),
            (f.side1, f.y1 - f.h1),
            (f.outer1, f.y1 - f.h1),
            (f.outer0, f.y0 - f.h0),
        ],
        building.color.darken(0.85),
    );

    if show_front {
        fb.fill_quad(
            [(f.side0, f.y0), (f.outer0, f.y0), (f.outer0, f.y0 - f.h0), (f.side0, f.y0 - f.h0)],
            building.color,
        );
        if f.h0 > 15 && f.bw0 > 10 {
            let door_h = f.h0 / 5;
            let door_w = f.bw0 / 3;
            let door_x = f.side0 + side.sign() * f.bw0 / 2 - door_w / 2;
            fb.fill_rect(door_x, f.y0 - door_h, door_w, door_h, DOOR);
        }
    }
}

/// A slice starts a new facade when the block before it differs
pub fn starts_run(building: &Building, previous: &Building, previous_in_tunnel: bool) -> bool {
    (!previous.exists() || previous.height != building.height) && !previous_in_tunnel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::rasterizer::Framebuffer;

    fn edge(x: i32, y: i32, w: i32, scale: f32) -> RenderPoint {
        RenderPoint { x, y, w, scale, ceiling: 0 }
    }

    #[test]
    fn test_building_stands_beside_the_road() {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.clear(Rgb565::BLACK);
        let near = edge(160, 200, 40, 0.0003);
        let far = edge(160, 190, 36, 0.00027);
        let block = Building { height: 200_000, color: Rgb565::rgb(200, 100, 50) };
        draw_building(&mut fb, &near, &far, &block, 7, Side::Right, true);

        // nothing on the road itself
        for x in 120..200 {
            assert_eq!(fb.get_pixel(x, 195), Rgb565::BLACK, "x = {}", x);
        }
        // wall rises right of the building line
        assert_ne!(fb.get_pixel(225, 170), Rgb565::BLACK);
        // left side untouched
        assert_eq!(fb.get_pixel(50, 170), Rgb565::BLACK);
    }

    #[test]
    fn test_hidden_or_missing_blocks_draw_nothing() {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.clear(Rgb565::BLACK);
        let near = edge(160, 200, 40, 0.0003);
        draw_building(&mut fb, &near, &RenderPoint::HIDDEN, &Building { height: 200_000, color: Rgb565::WHITE }, 0, Side::Left, true);
        draw_building(&mut fb, &near, &near, &Building::NONE, 0, Side::Left, true);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_run_start() {
        let a = Building { height: 150_000, color: Rgb565::WHITE };
        let b = Building { height: 250_000, color: Rgb565::WHITE };
        assert!(starts_run(&a, &Building::NONE, false));
        assert!(starts_run(&a, &b, false));
        assert!(!starts_run(&a, &a, false));
        assert!(!starts_run(&a, &Building::NONE, true));
    }
}
