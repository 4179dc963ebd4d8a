//! Road scene compositing
//!
//! After projection, every segment is painted far to near in one loop:
//! tunnel ceiling and walls, buildings, then the segment's own road band.
//! Nearer segments overwrite farther ones, which is what keeps hills and
//! skyline blocks layered correctly. Props and cars go last, again far to
//! near, each clipped to the ground horizon in front of its segment.

use super::building::{draw_building, starts_run, Side};
use super::palette::Palette;
use super::projection::{Band, RenderPoint, RoadProjection};
use super::scenery::draw_scenery;
use super::vehicles::{draw_polygon_car, CarPose};
use crate::config::*;
use crate::physics::SimulationState;
use crate::rasterizer::{DrawSurface, Rgb565};
use crate::settings::TimeOfDay;
use crate::track::Segment;
use crate::util::lerp;

const TUNNEL_MARGIN_LIGHT: Rgb565 = Rgb565::rgb(35, 32, 30);
const TUNNEL_MARGIN_DARK: Rgb565 = Rgb565::rgb(28, 25, 22);
const TUNNEL_WALL_LIGHT: Rgb565 = Rgb565::rgb(80, 120, 200);
const TUNNEL_WALL_DARK: Rgb565 = Rgb565::rgb(50, 80, 150);
/// Deep-tunnel darkness the walls fade into
pub const TUNNEL_GLOOM: Rgb565 = Rgb565::rgb(25, 22, 20);
const TUNNEL_ROCK: Rgb565 = Rgb565::rgb(110, 90, 70);
const LAMP: Rgb565 = Rgb565::rgb(200, 180, 50);
const LAMP_CORE: Rgb565 = Rgb565::rgb(255, 255, 150);

/// Rows per colour sub-band, at most three sub-bands per segment
fn subdivisions(height: i32) -> i32 {
    if height > 6 {
        (height / 3).min(3)
    } else {
        1
    }
}

/// Fill `x0..x1` on rows `top..top + h`
fn span<S: DrawSurface + ?Sized>(fb: &mut S, x0: i32, x1: i32, top: i32, h: i32, color: Rgb565) {
    fb.fill_rect(x0, top, x1 - x0, h, color);
}

/// Grass (or tunnel floor margin), rumble strips, road and lane ticks of one segment
#[allow(clippy::too_many_arguments)]
fn draw_band<S: DrawSurface + ?Sized>(
    fb: &mut S,
    band: Band,
    near: &RenderPoint,
    far: &RenderPoint,
    segment: &Segment,
    segment_index: usize,
    fog: f32,
    palette: &Palette,
) {
    let light = (segment_index / RUMBLE_LENGTH) % 2 == 0;
    let (grass, road, rumble) = palette.stripe(light);
    // tunnels are lit artificially
    let road_fog = if segment.tunnel { 0.0 } else { fog };
    let margin = match (segment.tunnel, light) {
        (true, true) => TUNNEL_MARGIN_LIGHT,
        (true, false) => TUNNEL_MARGIN_DARK,
        (false, _) => grass.lerp(palette.fog, fog),
    };
    let road = road.lerp(palette.fog, road_fog);
    let rumble = rumble.lerp(palette.fog, road_fog);
    let lane = palette.lane.lerp(palette.fog, road_fog);

    let height = band.height();
    let parts = subdivisions(height);
    for s in 0..parts {
        let top = band.top + s * height / parts;
        let bottom = band.top + (s + 1) * height / parts;
        let h = bottom - top;
        if h <= 0 {
            continue;
        }
        let t = (2 * s + 1) as f32 / (2 * parts) as f32;
        let cx = lerp(far.x as f32, near.x as f32, t) as i32;
        let hw = lerp(far.w as f32, near.w as f32, t) as i32;
        let rw = (hw / 6).max(1);
        let (road_l, road_r) = (cx - hw, cx + hw);
        let (rumble_l, rumble_r) = (road_l - rw, road_r + rw);

        span(fb, 0, rumble_l.min(SCREEN_WIDTH), top, h, margin);
        span(fb, rumble_r.max(0), SCREEN_WIDTH, top, h, margin);
        span(fb, rumble_l, road_l, top, h, rumble);
        span(fb, road_r, rumble_r, top, h, rumble);
        span(fb, road_l, road_r, top, h, road);
    }

    if light && near.w > 15 && height > 1 {
        let mid_x = (near.x + far.x) / 2;
        let mid_w = (near.w + far.w) / 2;
        let mid_y = band.top + height / 2;
        let lh = height.min(3);
        let lw = (mid_w / 30).max(1);
        for l in 1..LANES {
            let lt = l as f32 / LANES as f32;
            let lx = lerp((mid_x - mid_w) as f32, (mid_x + mid_w) as f32, lt) as i32;
            fb.fill_rect(lx - lw / 2, mid_y, lw, lh, lane);
        }
    }
}

/// Ceiling, walls, lamps and (on entry) the rock portal of one tunnel segment
fn draw_tunnel_section<S: DrawSurface + ?Sized>(
    fb: &mut S,
    near: &RenderPoint,
    far: &RenderPoint,
    segment_index: usize,
    fog: f32,
    palette: &Palette,
    entrance: bool,
) {
    let light = (segment_index / RUMBLE_LENGTH) % 2 == 0;
    let ceiling = if light { palette.road_light } else { palette.road_dark };
    let base = if light { TUNNEL_WALL_LIGHT } else { TUNNEL_WALL_DARK };
    let wall = base.lerp(TUNNEL_GLOOM, fog);

    let near_half = (near.w as f32 * TUNNEL_WIDTH) as i32;
    let far_half = (far.w as f32 * TUNNEL_WIDTH) as i32;

    // ceiling recedes downward towards the vanishing point
    let top = near.ceiling.max(0);
    let bottom = far.ceiling.min(SCREEN_HEIGHT);
    let height = bottom - top;
    if height > 0 {
        let parts = subdivisions(height);
        for s in 0..parts {
            let sub_top = top + s * height / parts;
            let sub_bottom = top + (s + 1) * height / parts;
            if sub_bottom <= sub_top {
                continue;
            }
            let t = (2 * s + 1) as f32 / (2 * parts) as f32;
            let cx = lerp(near.x as f32, far.x as f32, t) as i32;
            let hw = lerp(near_half as f32, far_half as f32, t) as i32;
            span(fb, cx - hw, cx + hw, sub_top, sub_bottom - sub_top, ceiling);
        }
    }

    let (nl, nr) = (near.x - near_half, near.x + near_half);
    let (fl, fr) = (far.x - far_half, far.x + far_half);
    fb.fill_quad([(nl, near.y), (fl, far.y), (fl, far.ceiling), (nl, near.ceiling)], wall);
    fb.fill_quad([(nr, near.y), (nr, near.ceiling), (fr, far.ceiling), (fr, far.y)], wall);

    if segment_index % TUNNEL_LIGHT_SPACING == 0 {
        let r = ((near.scale * 4000.0) as i32).clamp(1, 6);
        let ly = near.ceiling + r + 1;
        fb.fill_circle(near.x, ly, r, LAMP);
        fb.fill_circle(near.x, ly, (r / 3).max(1), LAMP_CORE);
    }

    if entrance {
        let outer = near.w * 4;
        let rock_top = near.y - (near.y - near.ceiling) * 3 / 2;
        span(fb, near.x - outer, nl, rock_top, near.y - rock_top, TUNNEL_ROCK);
        span(fb, nr, near.x + outer, rock_top, near.y - rock_top, TUNNEL_ROCK);
        span(fb, nl, nr, rock_top, near.ceiling - rock_top, TUNNEL_ROCK);
    }
}

/// Everything on the ground: grass, road, tunnels, buildings, props and cars
///
/// Returns the projection so later layers can reuse it.
pub fn draw_road<S: DrawSurface + ?Sized>(
    fb: &mut S,
    state: &SimulationState,
    palette: &Palette,
    time: TimeOfDay,
) -> RoadProjection {
    let track = &state.track;
    let proj = RoadProjection::new(track, state.player.position, state.player.x, &state.rig);

    if proj.horizon > SCREEN_CY {
        fb.fill_rect(
            0,
            SCREEN_CY,
            SCREEN_WIDTH,
            proj.horizon - SCREEN_CY,
            palette.grass_dark.lerp(palette.fog, 0.7),
        );
    }

    for n in (1..DRAW_DISTANCE).rev() {
        let idx = proj.segment_index(n, track);
        let seg = track.get(idx);
        let prev = track.prev(idx);
        let near = proj.points[n];
        let far = proj.points[n + 1];
        let fog = RoadProjection::fog(n);

        if near.is_visible() && far.is_visible() {
            if seg.tunnel {
                draw_tunnel_section(fb, &near, &far, idx, fog, palette, !prev.tunnel);
            } else {
                for (side, left) in [(Side::Left, true), (Side::Right, false)] {
                    let block = seg.building(left);
                    let front = starts_run(block, prev.building(left), prev.tunnel);
                    draw_building(fb, &near, &far, block, idx, side, front);
                }
            }
        }
        if let Some(band) = proj.bands[n] {
            draw_band(fb, band, &near, &far, seg, idx, fog, palette);
        }
    }

    draw_roadside(fb, &proj, state, time == TimeOfDay::Night);
    proj
}

/// A car waiting to be drawn at a point inside its segment
struct Placed {
    t: f32,
    offset: f32,
    yaw: f32,
    color: Rgb565,
}

/// Props and cars, far to near, each held above the ground horizon in front of it
fn draw_roadside<S: DrawSurface + ?Sized>(fb: &mut S, proj: &RoadProjection, state: &SimulationState, night: bool) {
    let track = &state.track;
    let cx = SCREEN_CX as f32;
    let lateral = |p: &RenderPoint, offset: f32| p.x + (p.scale * offset * ROAD_WIDTH * cx) as i32;
    let within = |z: f32| z.rem_euclid(SEGMENT_LENGTH) / SEGMENT_LENGTH;

    for n in (1..DRAW_DISTANCE).rev() {
        let idx = proj.segment_index(n, track);
        let near = proj.points[n];
        if !near.is_visible() {
            continue;
        }
        fb.set_clip_rows(0, proj.clip[n]);

        if let Some(prop) = track.get(idx).scenery {
            if near.y < SCREEN_HEIGHT {
                draw_scenery(fb, prop.kind, lateral(&near, prop.offset), near.y, near.scale, night);
            }
        }

        let mut cars: Vec<Placed> = state
            .traffic
            .iter()
            .filter(|c| track.index_at(c.z) == idx)
            .map(|c| Placed { t: within(c.z), offset: c.offset, yaw: 0.0, color: c.color })
            .chain(
                state
                    .competitors
                    .iter()
                    .filter(|c| track.index_at(c.z) == idx)
                    .map(|c| Placed {
                        t: within(c.z),
                        offset: c.offset,
                        yaw: (c.velocity_x * 0.5).clamp(-MAX_DRIFT_ANGLE, MAX_DRIFT_ANGLE),
                        color: c.color,
                    }),
            )
            .collect();
        cars.sort_by(|a, b| b.t.total_cmp(&a.t));

        for car in &cars {
            let Some(ground) = proj.anchor(n, car.t) else {
                continue;
            };
            let pose = CarPose {
                x: lateral(&ground, car.offset),
                y: ground.y,
                scale: ground.scale,
                yaw: car.yaw,
            };
            draw_polygon_car(fb, &pose, state.rig.depth, car.color, false);
        }
    }
    fb.reset_clip();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Framebuffer;
    use crate::settings::TrafficMode;
    use crate::track::{Building, Scenery, SceneryKind, Track, TrafficCar};

    const SENTINEL: Rgb565 = Rgb565::rgb(255, 0, 255);

    fn frame() -> Framebuffer {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.begin_frame(SENTINEL);
        fb
    }

    fn sim(track: Track) -> SimulationState {
        SimulationState::new(track, TrafficMode::None, 3, 5)
    }

    #[test]
    fn test_flat_road_fills_lower_half() {
        let state = sim(Track::flat());
        let mut fb = frame();
        let palette = Palette::for_time(TimeOfDay::Day);
        let proj = draw_road(&mut fb, &state, &palette, TimeOfDay::Day);

        for y in proj.horizon.max(SCREEN_CY + 1) as usize..SCREEN_HEIGHT as usize {
            for x in 0..SCREEN_WIDTH as usize {
                assert_ne!(fb.get_pixel(x, y), SENTINEL, "hole at {},{}", x, y);
            }
        }
        // grey road straight ahead, green grass at the edges
        let (r, g, b) = fb.get_pixel(SCREEN_CX as usize, SCREEN_HEIGHT as usize - 1).channels();
        assert!(r.abs_diff(g) < 16 && g.abs_diff(b) < 16 && r > 60);
        let (r, g, b) = fb.get_pixel(0, SCREEN_HEIGHT as usize - 1).channels();
        assert!(g > r && g > b);
        // sky untouched
        assert_eq!(fb.get_pixel(5, 5), SENTINEL);
    }

    #[test]
    fn test_tunnel_covers_the_sky() {
        let mut track = Track::flat();
        for i in 0..60 {
            track.get_mut(i).tunnel = true;
        }
        let state = sim(track);
        let mut fb = frame();
        draw_road(&mut fb, &state, &Palette::for_time(TimeOfDay::Day), TimeOfDay::Day);
        // ceiling overhead
        assert_ne!(fb.get_pixel(SCREEN_CX as usize, 10), SENTINEL);
        // blue walls somewhere above the horizon
        let found_wall = (0..SCREEN_CY as usize).any(|y| {
            (0..SCREEN_WIDTH as usize).any(|x| {
                let (r, _, b) = fb.get_pixel(x, y).channels();
                fb.get_pixel(x, y) != SENTINEL && b > r + 20
            })
        });
        assert!(found_wall);
    }

    #[test]
    fn test_buildings_rise_above_the_horizon() {
        let mut track = Track::flat();
        let block = Building { height: 300_000, color: Rgb565::rgb(180, 160, 140) };
        for i in 0..TOTAL_SEGMENTS {
            track.get_mut(i).left = block;
            track.get_mut(i).right = block;
        }
        let state = sim(track);
        let mut fb = frame();
        draw_road(&mut fb, &state, &Palette::for_time(TimeOfDay::Day), TimeOfDay::Day);
        let above_horizon = (0..SCREEN_WIDTH as usize).any(|x| fb.get_pixel(x, SCREEN_CY as usize - 10) != SENTINEL);
        assert!(above_horizon);
        // the road itself stays clear of them
        assert_ne!(fb.get_pixel(SCREEN_CX as usize, SCREEN_CY as usize - 10), block.color);
    }

    #[test]
    fn test_props_and_cars_are_drawn() {
        let mut track = Track::flat();
        for i in 0..TOTAL_SEGMENTS {
            track.get_mut(i).scenery = Some(Scenery { kind: SceneryKind::Pole, offset: -1.6 });
        }
        let mut state = sim(track);
        let mut bare = frame();
        draw_road(&mut bare, &sim(Track::flat()), &Palette::for_time(TimeOfDay::Day), TimeOfDay::Day);

        let car_z = state.player_car_z() + 3.0 * SEGMENT_LENGTH;
        state.traffic.push(TrafficCar { offset: 0.0, z: car_z, speed: 0.0, color: Rgb565::rgb(0, 0, 248) });
        let mut fb = frame();
        draw_road(&mut fb, &state, &Palette::for_time(TimeOfDay::Day), TimeOfDay::Day);

        let diff = fb.pixels.iter().zip(&bare.pixels).filter(|(a, b)| a != b).count();
        assert!(diff > 100, "only {} pixels changed", diff);
        // the car's roof colour shows up
        assert!(fb.pixels.iter().any(|&p| p == Rgb565::rgb(0, 0, 248).0));
    }

    #[test]
    fn test_subdivisions() {
        assert_eq!(subdivisions(1), 1);
        assert_eq!(subdivisions(6), 1);
        assert_eq!(subdivisions(7), 2);
        assert_eq!(subdivisions(100), 3);
    }
}
