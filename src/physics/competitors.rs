//! Rival drivers and race ranking

use super::SimulationState;
use crate::config::*;
use crate::track::{Competitor, Track};
use crate::util::{loop_increase, per_tick};

/// Signed shortest distance from `from` to `to` on a loop of `length`
fn wrapped_delta(from: f32, to: f32, length: f32) -> f32 {
    let d = (to - from).rem_euclid(length);
    if d > length / 2.0 {
        d - length
    } else {
        d
    }
}

/// One step of the player's driving model, tuned per driver
fn drive(c: &mut Competitor, track: &Track, max_speed: f32, dt: f32) {
    let idx = track.index_at(c.z);
    let seg = *track.get(idx);
    let slope = (seg.elevation - track.prev(idx).elevation) / SEGMENT_LENGTH;
    let top = max_speed * c.speed_factor;

    if c.speed < top * ACCEL_NEAR_MAX {
        c.accel = (c.accel + ACCEL_RAMP * dt).min(top * ACCEL_TARGET);
    } else {
        c.accel *= per_tick(ACCEL_DAMPING, dt);
    }
    if c.speed < top * CRAWL_SPEED {
        c.accel = c.accel.max(0.0);
    } else {
        c.accel += -slope * GRAVITY_FACTOR * dt;
    }

    c.speed *= per_tick(FRICTION, dt);
    c.speed += c.accel * dt;
    c.speed = c.speed.clamp(0.0, top);

    // hold the lane, leaning into the bend
    let target = c.lane - seg.curve * COUNTER_STEER * c.steer_factor;
    c.offset += (target - c.offset) * STEER_AUTO * c.steer_factor * dt;

    let speed_pct = c.speed / max_speed;
    c.velocity_x += seg.curve * CENTRIFUGAL * speed_pct * dt * CURVE_FORCE;
    c.velocity_x *= per_tick(LATERAL_FRICTION, dt);
    c.offset -= c.velocity_x * dt;
    c.offset -= dt * CENTRIFUGAL_DX * speed_pct * speed_pct * seg.curve * CENTRIFUGAL;
    c.offset = c.offset.clamp(-COMPETITOR_RANGE, COMPETITOR_RANGE);

    let prev = c.z;
    c.z = loop_increase(c.z, c.speed * dt, track.length());
    if c.z < prev {
        c.laps_completed += 1;
    }
}

/// Push touching rivals apart and slow whoever is behind
fn separate(competitors: &mut [Competitor], track_length: f32) {
    let n = competitors.len();
    for i in 0..n {
        for j in i + 1..n {
            let dz = wrapped_delta(competitors[i].z, competitors[j].z, track_length);
            let dx = competitors[j].offset - competitors[i].offset;
            if dz.abs() >= COMPETITOR_Z_WINDOW || dx.abs() >= COMPETITOR_WIDTH {
                continue;
            }
            let push = if dx >= 0.0 { COMPETITOR_PUSH } else { -COMPETITOR_PUSH };
            competitors[i].offset = (competitors[i].offset - push).clamp(-COMPETITOR_RANGE, COMPETITOR_RANGE);
            competitors[j].offset = (competitors[j].offset + push).clamp(-COMPETITOR_RANGE, COMPETITOR_RANGE);

            let trailing = if dz >= 0.0 { i } else { j };
            competitors[trailing].speed *= COMPETITOR_TRAILING_SLOW;
        }
    }
}

/// Advance every rival, then resolve rival-vs-rival contact
pub fn update_competitors(state: &mut SimulationState, dt: f32) {
    let max_speed = state.rig.max_speed;
    for c in state.competitors.iter_mut() {
        drive(c, &state.track, max_speed, dt);
    }
    separate(&mut state.competitors, state.track.length());
}

/// Distance the player's car has covered since the start
pub fn player_progress(state: &SimulationState) -> f32 {
    state.player.wraps as f32 * state.track.length() + state.player_car_z()
}

/// 1-based race position of the player
pub fn player_rank(state: &SimulationState) -> usize {
    let length = state.track.length();
    let mine = player_progress(state);
    1 + state.competitors.iter().filter(|c| c.progress(length) > mine).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Rgb565;
    use crate::settings::TrafficMode;
    use crate::track::{build_procedural, Track};

    fn rival(z: f32, offset: f32, speed: f32) -> Competitor {
        Competitor {
            offset,
            z,
            speed,
            accel: 0.0,
            velocity_x: 0.0,
            lane: offset,
            speed_factor: 0.9,
            steer_factor: 1.0,
            laps_completed: 0,
            color: Rgb565::BLUE,
        }
    }

    #[test]
    fn test_wrapped_delta() {
        assert_eq!(wrapped_delta(100.0, 300.0, 1000.0), 200.0);
        assert_eq!(wrapped_delta(950.0, 50.0, 1000.0), 100.0);
        assert_eq!(wrapped_delta(50.0, 950.0, 1000.0), -100.0);
    }

    #[test]
    fn test_competitors_drive_and_stay_bounded() {
        let mut state = SimulationState::new(build_procedural(12), TrafficMode::Competitors, 3, 12);
        let start: Vec<f32> = state.competitors.iter().map(|c| c.z).collect();
        for _ in 0..600 {
            update_competitors(&mut state, 1.0 / 60.0);
            for c in &state.competitors {
                assert!(c.offset.abs() <= COMPETITOR_RANGE);
                assert!(c.speed >= 0.0 && c.speed <= state.rig.max_speed * c.speed_factor);
                assert!(c.z >= 0.0 && c.z < state.track.length());
            }
        }
        for (c, z0) in state.competitors.iter().zip(start) {
            assert!(c.z != z0 || c.laps_completed > 0);
        }
    }

    #[test]
    fn test_contact_pushes_apart_and_slows_trailing() {
        let len = 100_000.0;
        let mut cars = [rival(1000.0, 0.0, 5000.0), rival(1100.0, 0.1, 5000.0)];
        separate(&mut cars, len);
        assert!((cars[0].offset + COMPETITOR_PUSH).abs() < 1e-6);
        assert!((cars[1].offset - 0.1 - COMPETITOR_PUSH).abs() < 1e-6);
        // car 0 is behind
        assert!((cars[0].speed - 5000.0 * COMPETITOR_TRAILING_SLOW).abs() < 1e-3);
        assert_eq!(cars[1].speed, 5000.0);
    }

    #[test]
    fn test_contact_across_the_start_line() {
        let len = 100_000.0;
        let mut cars = [rival(50.0, 0.0, 5000.0), rival(len - 50.0, 0.0, 5000.0)];
        separate(&mut cars, len);
        // car 1 trails, just before the line
        assert_eq!(cars[0].speed, 5000.0);
        assert!(cars[1].speed < 5000.0);
        assert!(cars[0].offset != cars[1].offset);

        let mut apart = [rival(0.0, 0.0, 1.0), rival(5000.0, 0.0, 1.0)];
        separate(&mut apart, len);
        assert_eq!(apart[0].offset, 0.0);
    }

    #[test]
    fn test_rank_compares_laps_then_position() {
        let mut state = SimulationState::new(Track::flat(), TrafficMode::None, 3, 0);
        let len = state.track.length();
        state.player.position = 20_000.0;
        let mine = state.player_car_z();
        state.competitors = vec![rival(mine + 500.0, 0.0, 0.0), rival(mine - 500.0, 0.0, 0.0), rival(1000.0, 0.0, 0.0)];
        state.competitors[2].laps_completed = 1;
        assert_eq!(player_rank(&state), 3);

        state.player.wraps = 1;
        assert_eq!(player_rank(&state), 1);
        assert!(player_progress(&state) > len);
    }
}
