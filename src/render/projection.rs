//! Per-frame segment projection
//!
//! One pass near to far turns segment edges into screen points and records
//! which rows each segment's road band may occupy. The running ground
//! horizon only ever rises, so a crest hides everything behind it. Drawing
//! then walks the same data far to near.

use crate::config::*;
use crate::physics::CameraRig;
use crate::track::Track;
use crate::util::{exp_fog, lerp};

/// One projected segment edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint {
    pub x: i32,
    pub y: i32,
    /// Road half-width in pixels
    pub w: i32,
    /// Perspective scale, camera depth over distance; 0 when not projected
    pub scale: f32,
    /// Tunnel ceiling above this edge
    pub ceiling: i32,
}

impl RenderPoint {
    pub const HIDDEN: RenderPoint = RenderPoint {
        x: SCREEN_CX,
        y: SCREEN_HEIGHT,
        w: 0,
        scale: 0.0,
        ceiling: SCREEN_HEIGHT,
    };

    pub fn is_visible(&self) -> bool {
        self.scale > 0.0
    }

    /// Point a fraction `t` of the way towards `far`
    pub fn toward(&self, far: &RenderPoint, t: f32) -> RenderPoint {
        let mix = |a: i32, b: i32| lerp(a as f32, b as f32, t) as i32;
        RenderPoint {
            x: mix(self.x, far.x),
            y: mix(self.y, far.y),
            w: mix(self.w, far.w),
            scale: lerp(self.scale, far.scale, t),
            ceiling: mix(self.ceiling, far.ceiling),
        }
    }
}

/// Rows `top..bottom` a road band covers after horizon clipping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub top: i32,
    pub bottom: i32,
}

impl Band {
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Screen-space view of the next `DRAW_DISTANCE` segments
#[derive(Debug, Clone)]
pub struct RoadProjection {
    /// Segment under the camera
    pub base_index: usize,
    pub camera_y: f32,
    /// Edge `n` is the near edge of the n-th segment ahead, `n + 1` its far edge
    pub points: [RenderPoint; DRAW_DISTANCE + 1],
    pub bands: [Option<Band>; DRAW_DISTANCE],
    /// Ground horizon in front of segment `n`; sprites there stay above it
    pub clip: [i32; DRAW_DISTANCE],
    /// Ground horizon after the farthest segment
    pub horizon: i32,
}

impl RoadProjection {
    pub fn new(track: &Track, position: f32, player_x: f32, rig: &CameraRig) -> Self {
        let base_index = track.index_at(position);
        let pos_offset = position.rem_euclid(SEGMENT_LENGTH);
        let base_pct = pos_offset / SEGMENT_LENGTH;
        let camera_y = track.elevation_at(position + rig.player_z) + CAMERA_HEIGHT;

        let cx = SCREEN_CX as f32;
        let cy = SCREEN_CY as f32;
        let project = |z: f32, world_y: f32, world_x: f32| {
            let scale = rig.depth / z;
            RenderPoint {
                x: SCREEN_CX + (scale * world_x * cx) as i32,
                y: SCREEN_CY - (scale * (world_y - camera_y) * cy) as i32,
                w: (scale * ROAD_WIDTH * cx) as i32,
                scale,
                ceiling: SCREEN_CY - (scale * (world_y + TUNNEL_HEIGHT - camera_y) * cy) as i32,
            }
        };

        let mut points = [RenderPoint::HIDDEN; DRAW_DISTANCE + 1];
        let mut bands = [None; DRAW_DISTANCE];
        let mut clip = [SCREEN_HEIGHT; DRAW_DISTANCE];
        let mut max_y = SCREEN_HEIGHT;

        let mut curve_x = 0.0;
        let mut curve_dx = -track.get(base_index).curve * base_pct;

        for n in 0..DRAW_DISTANCE {
            clip[n] = max_y;
            let idx = base_index + n;
            let seg = track.get(idx);
            let z1 = n as f32 * SEGMENT_LENGTH - pos_offset;
            let z2 = z1 + SEGMENT_LENGTH;
            if z1 <= rig.depth {
                continue;
            }

            let near = project(z1, track.prev(idx).elevation, -(player_x * ROAD_WIDTH - curve_x));
            let far = project(z2, seg.elevation, -(player_x * ROAD_WIDTH - curve_x - curve_dx));
            curve_x += curve_dx;
            curve_dx += seg.curve;

            points[n] = near;
            points[n + 1] = far;

            // back-facing (downhill behind a crest) or already hidden
            if near.y <= far.y || far.y >= max_y {
                continue;
            }
            let band = Band {
                top: far.y.max(0),
                bottom: near.y.min(max_y),
            };
            if band.height() <= 0 {
                continue;
            }
            bands[n] = Some(band);
            max_y = band.top;
        }

        Self {
            base_index,
            camera_y,
            points,
            bands,
            clip,
            horizon: max_y,
        }
    }

    /// Track index of the n-th segment ahead
    pub fn segment_index(&self, n: usize, track: &Track) -> usize {
        track.wrap(self.base_index + n)
    }

    /// Fog amount at the n-th segment ahead
    pub fn fog(n: usize) -> f32 {
        exp_fog(n as f32 / DRAW_DISTANCE as f32, FOG_DENSITY)
    }

    /// Ground point a fraction `t` into the n-th segment ahead, if both edges projected
    pub fn anchor(&self, n: usize, t: f32) -> Option<RenderPoint> {
        if n >= DRAW_DISTANCE {
            return None;
        }
        let near = self.points[n];
        let far = self.points[n + 1];
        if !near.is_visible() || !far.is_visible() {
            return None;
        }
        Some(near.toward(&far, t))
    }
}
