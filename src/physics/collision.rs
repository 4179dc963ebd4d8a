//! Contact checks for the player's car
//!
//! Every rule below is evaluated each step and their effects stack: a car
//! scraping the tunnel wall while rear-ending traffic takes both penalties.

use tracing::debug;

use super::SimulationState;
use crate::config::*;
use crate::util::overlaps;

/// Segments between two indices on the loop, whichever way round is shorter
fn segment_gap(a: usize, b: usize, count: usize) -> usize {
    let d = a.abs_diff(b);
    d.min(count - d)
}

/// Resolve collisions at the player's car; returns whether anything crashed it
pub fn check_collisions(state: &mut SimulationState, now_ms: u64) -> bool {
    let max_speed = state.rig.max_speed;
    let track_length = state.track.length();
    let count = state.track.len();
    let player_seg = state.track.index_at(state.player_car_z());
    let seg = *state.track.get(player_seg);
    let p = &mut state.player;
    let mut crashed = false;

    // Slower cars ahead: traffic and rivals share the same rule
    let others = state
        .traffic
        .iter()
        .map(|c| (c.z, c.offset, c.speed, CAR_WIDTH))
        .chain(state.competitors.iter().map(|c| (c.z, c.offset, c.speed, COMPETITOR_WIDTH)));
    for (z, offset, speed, width) in others {
        if segment_gap(state.track.index_at(z), player_seg, count) > CAR_HIT_SEGMENTS {
            continue;
        }
        if p.speed > speed && overlaps(p.x, PLAYER_WIDTH, offset, width) {
            p.speed = speed * CAR_HIT_SPEED_KEEP;
            p.push_back(p.speed * CAR_HIT_PUSHBACK, track_length);
            if p.speed > max_speed * CAR_HIT_CRASH {
                debug!(speed = p.speed, "rear-ended a car");
                crashed = true;
            }
        }
    }

    if seg.tunnel && p.x.abs() > TUNNEL_WALL_X {
        p.x = p.x.clamp(-TUNNEL_WALL_X, TUNNEL_WALL_X);
        p.velocity_x = 0.0;
        p.speed *= TUNNEL_HIT_SPEED_KEEP;
        if p.speed > max_speed * TUNNEL_HIT_CRASH {
            debug!(speed = p.speed, "hit the tunnel wall");
            crashed = true;
        }
    }

    let blocked = (p.x > BUILDING_OFFSET && seg.right.exists()) || (p.x < -BUILDING_OFFSET && seg.left.exists());
    if blocked {
        p.x = p.x.clamp(-BUILDING_OFFSET, BUILDING_OFFSET);
        p.velocity_x = 0.0;
        p.speed *= BUILDING_HIT_SPEED_KEEP;
        if p.speed > max_speed * BUILDING_HIT_CRASH {
            debug!(speed = p.speed, "hit a building");
            crashed = true;
        }
    }

    // props only stand off the paved lanes
    if p.x.abs() > 1.0 {
        if let Some(prop) = seg.scenery {
            if overlaps(p.x, PLAYER_WIDTH, prop.offset, SCENERY_WIDTH) {
                p.speed *= SCENERY_HIT_SPEED_KEEP;
                if p.speed > max_speed * SCENERY_HIT_CRASH {
                    debug!(speed = p.speed, kind = ?prop.kind, "hit scenery");
                    crashed = true;
                }
            }
        }
    }

    if p.x.abs() >= OFFROAD_X {
        p.speed *= OFFROAD_SPEED_KEEP;
        if p.speed > max_speed * OFFROAD_CRASH {
            debug!(speed = p.speed, "far off the road");
            crashed = true;
        }
    }

    if crashed {
        p.crash(now_ms);
    }
    crashed
}
