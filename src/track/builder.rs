//! Track construction
//!
//! Both procedural and hand-authored tracks go through the same pipeline:
//! sections are laid down until the segment budget runs out, a closing
//! section levels the loop back to zero elevation, leftovers are padded
//! flat, then the tunnel, skyline and scenery passes decorate the result.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::layout::{RoadSection, TrackLayout};
use super::segment::{Building, Scenery, SceneryKind, Segment, Track};
use crate::config::*;
use crate::rasterizer::Rgb565;
use crate::util::{ease_in, ease_in_out};

/// Incremental segment writer with a hard capacity
struct TrackBuilder {
    segments: Vec<Segment>,
    rng: SmallRng,
}

impl TrackBuilder {
    fn new(seed: u64) -> Self {
        Self {
            segments: Vec::with_capacity(TOTAL_SEGMENTS),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn last_y(&self) -> f32 {
        self.segments.last().map(|s| s.elevation).unwrap_or(0.0)
    }

    fn remaining(&self) -> usize {
        TOTAL_SEGMENTS - self.segments.len()
    }

    fn add_segment(&mut self, curve: f32, elevation: f32) {
        if self.segments.len() < TOTAL_SEGMENTS {
            self.segments.push(Segment::new(curve, elevation));
        }
    }

    /// Ease curvature in, hold, ease out; elevation eases across the whole
    /// section and lands exactly on the target at the last segment
    fn add_road(&mut self, section: &RoadSection) {
        let start_y = self.last_y();
        let end_y = start_y + section.hill * SEGMENT_LENGTH;
        let total = section.len().max(1) as f32;
        let y_at = |n: usize| ease_in_out(start_y, end_y, (n + 1) as f32 / total);

        for n in 0..section.enter {
            let t = n as f32 / section.enter as f32;
            self.add_segment(ease_in(0.0, section.curve, t), y_at(n));
        }
        for n in 0..section.hold {
            self.add_segment(section.curve, y_at(section.enter + n));
        }
        for n in 0..section.leave {
            let t = n as f32 / section.leave as f32;
            self.add_segment(
                ease_in_out(section.curve, 0.0, t),
                y_at(section.enter + section.hold + n),
            );
        }
    }

    /// Largest hill, in segment lengths, that an eased section of `len`
    /// segments can climb without exceeding `MAX_SLOPE`
    fn hill_cap(len: usize) -> f32 {
        (MAX_SLOPE * 2.0 * len as f32 / std::f32::consts::PI).min(MAX_HILL)
    }

    fn phase_len(&mut self) -> usize {
        let lo = SECTION_PHASE_MIN.max(1);
        let hi = SECTION_PHASE_MAX.max(lo);
        self.rng.gen_range(lo..=hi)
    }

    /// Random sections until the next one would eat into the closing budget
    fn add_random_sections(&mut self) {
        let budget = TOTAL_SEGMENTS.saturating_sub(CLOSING_BUDGET);
        let mut pending_hill: Option<f32> = None;

        loop {
            let (enter, hold, leave) = (self.phase_len(), self.phase_len(), self.phase_len());
            if self.segments.len() + enter + hold + leave > budget {
                break;
            }

            let mut curve = self.rng.gen_range(-MAX_CURVE..=MAX_CURVE);
            if curve.abs() < CURVE_DEADZONE {
                curve = 0.0;
            }

            let y = self.last_y();
            let cap = Self::hill_cap(enter + hold + leave);
            let mut compensating = false;
            let mut hill = if y.abs() > ELEVATION_LIMIT {
                // too far from level: head back and forget any scheduled swing
                pending_hill = None;
                compensating = true;
                -y / SEGMENT_LENGTH
            } else if let Some(h) = pending_hill.take() {
                compensating = true;
                h
            } else {
                self.rng.gen_range(-MAX_HILL..=MAX_HILL)
            };
            hill = hill
                .clamp(-cap, cap)
                .clamp((-ELEVATION_MAX - y) / SEGMENT_LENGTH, (ELEVATION_MAX - y) / SEGMENT_LENGTH);
            if hill.abs() < HILL_DEADZONE {
                hill = 0.0;
            }
            if hill != 0.0 && !compensating {
                pending_hill = Some(-hill * self.rng.gen_range(0.6..1.0));
            }

            self.add_road(&RoadSection::new(enter, hold, leave, curve, hill));
        }
    }

    /// Hand-authored sections in order; a section that doesn't fit ends the list
    fn add_layout_sections(&mut self, layout: &TrackLayout) {
        let budget = TOTAL_SEGMENTS.saturating_sub(CLOSING_BUDGET);
        debug!(layout = %layout.name, segments = layout.total_segments(), budget, "laying out sections");
        for (i, section) in layout.sections.iter().enumerate() {
            if self.segments.len() + section.len() > budget {
                warn!(
                    layout = %layout.name,
                    dropped = layout.sections.len() - i,
                    "layout exceeds segment budget, truncating"
                );
                break;
            }
            self.add_road(section);
        }
    }

    /// Spend the rest of the budget returning to zero elevation
    fn close_loop(&mut self) {
        let remaining = self.remaining();
        if remaining >= 3 {
            let hill = (-self.last_y() / SEGMENT_LENGTH).clamp(-CLOSING_HILL_MAX, CLOSING_HILL_MAX);
            let third = remaining / 3;
            self.add_road(&RoadSection::new(third, third, remaining - 2 * third, 0.0, hill));
        }
        let y = self.last_y();
        while self.remaining() > 0 {
            self.add_segment(0.0, y);
        }
    }

    fn finish(mut self) -> Track {
        self.close_loop();
        let mut track = Track::from_segments(self.segments);
        mark_tunnel(&mut track);
        let rng = &mut self.rng;
        build_skyline(&mut track, rng, true);
        build_skyline(&mut track, rng, false);
        scatter_scenery(&mut track, rng);
        track
    }
}

fn mark_tunnel(track: &mut Track) {
    let start = track.len() / 3;
    for i in start..start + TUNNEL_LENGTH {
        let seg = track.get_mut(i);
        seg.tunnel = true;
        seg.left = Building::NONE;
        seg.right = Building::NONE;
    }
}

fn random_building(rng: &mut SmallRng) -> Building {
    Building {
        height: rng.gen_range(BUILDING_H_MIN..=BUILDING_H_MAX.max(BUILDING_H_MIN)),
        color: Rgb565::rgb(rng.gen_range(60..150), rng.gen_range(60..150), rng.gen_range(80..180)),
    }
}

fn run_length(rng: &mut SmallRng, min: u32, max: u32) -> u32 {
    let lo = min.max(1);
    let hi = max.max(lo);
    rng.gen_range(lo..=hi)
}

/// Alternating building and gap runs along one side
fn build_skyline(track: &mut Track, rng: &mut SmallRng, left: bool) {
    let mut remaining = 0u32;
    let mut current = Building::NONE;
    for i in 0..track.len() {
        if track.get(i).tunnel {
            remaining = 0;
            continue;
        }
        if remaining == 0 {
            if rng.gen_bool(BUILDING_CHANCE) {
                current = random_building(rng);
                remaining = run_length(rng, BUILDING_SEG_MIN, BUILDING_SEG_MAX);
            } else {
                current = Building::NONE;
                remaining = run_length(rng, BUILDING_GAP_MIN, BUILDING_GAP_MAX);
            }
        }
        let seg = track.get_mut(i);
        if left {
            seg.left = current;
        } else {
            seg.right = current;
        }
        remaining -= 1;
    }
}

/// Sparse props in open country, alternating sides
fn scatter_scenery(track: &mut Track, rng: &mut SmallRng) {
    let mut left_side = rng.gen_bool(0.5);
    for i in SCENERY_START..track.len() {
        let seg = track.get(i);
        if seg.tunnel || seg.left.exists() || seg.right.exists() {
            continue;
        }
        if rng.gen_range(0..100) >= SCENERY_CHANCE {
            continue;
        }
        let kind = SceneryKind::ALL[rng.gen_range(0..SceneryKind::ALL.len())];
        let distance = match kind {
            SceneryKind::Pole => 1.2,
            _ => rng.gen_range(1.4..2.2),
        };
        let offset = if left_side { -distance } else { distance };
        track.get_mut(i).scenery = Some(Scenery { kind, offset });
        left_side = !left_side;
    }
}

fn log_build(track: &Track, source: &str, seed: u64) {
    let first = track.get(0).elevation;
    let last = track.get(track.len() - 1).elevation;
    let tunnel = track.segments().iter().filter(|s| s.tunnel).count();
    let buildings = track
        .segments()
        .iter()
        .filter(|s| s.left.exists() || s.right.exists())
        .count();
    info!(source, seed, segments = track.len(), residual = last - first, "track built");
    debug!(tunnel, buildings, "track decoration");
}

/// Random closed-loop circuit, deterministic for a given seed
pub fn build_procedural(seed: u64) -> Track {
    let mut builder = TrackBuilder::new(seed);
    builder.add_road(&RoadSection::new(0, START_STRAIGHT, 0, 0.0, 0.0));
    builder.add_random_sections();
    let track = builder.finish();
    log_build(&track, "procedural", seed);
    track
}

/// Circuit from a hand-authored layout; decoration still uses `seed`
pub fn build_from_layout(layout: &TrackLayout, seed: u64) -> Track {
    let mut builder = TrackBuilder::new(seed);
    builder.add_layout_sections(layout);
    let track = builder.finish();
    log_build(&track, &layout.name, seed);
    track
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_closed(track: &Track) {
        assert_eq!(track.len(), TOTAL_SEGMENTS);
        let first = track.get(0).elevation;
        let last = track.get(TOTAL_SEGMENTS - 1).elevation;
        assert!((first - last).abs() < 1.0, "first {} last {}", first, last);
    }

    #[test]
    fn test_procedural_track_closes() {
        for seed in [0, 1, 7, 42, 1234, 0xDEAD_BEEF] {
            assert_closed(&build_procedural(seed));
        }
    }

    #[test]
    fn test_layout_track_closes() {
        assert_closed(&build_from_layout(&TrackLayout::classic(), 3));
        let empty = TrackLayout { name: "empty".into(), sections: vec![] };
        assert_closed(&build_from_layout(&empty, 3));
    }

    #[test]
    fn test_procedural_is_deterministic() {
        let a = build_procedural(99);
        let b = build_procedural(99);
        assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn test_curvature_and_slope_bounded() {
        for seed in 0..64 {
            let track = build_procedural(seed);
            for i in 0..track.len() {
                let seg = track.get(i);
                assert!(seg.curve.abs() <= MAX_CURVE + 1e-4);
                assert!(seg.elevation.abs() <= ELEVATION_MAX + 1.0, "seed {} height {}", seed, seg.elevation);
                let slope = (seg.elevation - track.prev(i).elevation).abs() / SEGMENT_LENGTH;
                assert!(slope <= MAX_SLOPE + 1e-3, "seed {} slope {} at {}", seed, slope, i);
            }
        }
    }

    #[test]
    fn test_closing_section_can_level_any_height() {
        let cap = TrackBuilder::hill_cap(CLOSING_BUDGET);
        assert!(cap * SEGMENT_LENGTH >= ELEVATION_MAX);
        assert!(cap <= CLOSING_HILL_MAX);
        for seed in 100..132 {
            assert_closed(&build_procedural(seed));
        }
    }

    #[test]
    fn test_single_tunnel_without_buildings() {
        let track = build_procedural(11);
        let start = TOTAL_SEGMENTS / 3;
        for i in 0..track.len() {
            let seg = track.get(i);
            let inside = i >= start && i < start + TUNNEL_LENGTH;
            assert_eq!(seg.tunnel, inside, "segment {}", i);
            if inside {
                assert!(!seg.left.exists() && !seg.right.exists());
            }
        }
    }

    #[test]
    fn test_skyline_runs_and_scenery_placement() {
        let track = build_procedural(21);
        let mut saw_building = false;
        for i in 0..track.len() {
            let seg = track.get(i);
            for b in [seg.left, seg.right] {
                if b.exists() {
                    saw_building = true;
                    assert!((BUILDING_H_MIN..=BUILDING_H_MAX).contains(&b.height));
                }
            }
            if seg.scenery.is_some() {
                assert!(!seg.tunnel && !seg.left.exists() && !seg.right.exists());
                assert!(i >= SCENERY_START);
            }
        }
        assert!(saw_building);
    }

    #[test]
    fn test_add_road_ends_on_target() {
        let mut builder = TrackBuilder::new(0);
        builder.add_road(&RoadSection::new(5, 5, 5, 3.0, 10.0));
        assert_eq!(builder.segments.len(), 15);
        assert!((builder.last_y() - 10.0 * SEGMENT_LENGTH).abs() < 1e-2);
        assert_eq!(builder.segments[0].curve, 0.0);
        assert_eq!(builder.segments[7].curve, 3.0);
    }
}
