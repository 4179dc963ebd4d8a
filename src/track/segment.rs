//! Track segments and the circular segment buffer

use serde::{Deserialize, Serialize};

use crate::config::{SEGMENT_LENGTH, TOTAL_SEGMENTS};
use crate::rasterizer::Rgb565;
use crate::util::segment_index_in;

/// Roadside prop kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneryKind {
    Pine,
    RoundTree,
    Bush,
    Rock,
    Pole,
}

impl SceneryKind {
    pub const ALL: [SceneryKind; 5] = [
        SceneryKind::Pine,
        SceneryKind::RoundTree,
        SceneryKind::Bush,
        SceneryKind::Rock,
        SceneryKind::Pole,
    ];
}

/// One prop placed relative to the road centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenery {
    pub kind: SceneryKind,
    /// Lateral position in road half-widths
    pub offset: f32,
}

/// Skyline block flanking one side of a segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Building {
    /// World height, 0 = no building
    pub height: u32,
    pub color: Rgb565,
}

impl Building {
    pub const NONE: Building = Building { height: 0, color: Rgb565::BLACK };

    pub fn exists(&self) -> bool {
        self.height > 0
    }
}

/// One slice of track
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Segment {
    /// Horizontal drift contributed per segment
    pub curve: f32,
    /// Height at the far edge
    pub elevation: f32,
    pub scenery: Option<Scenery>,
    pub tunnel: bool,
    pub left: Building,
    pub right: Building,
}

impl Segment {
    pub fn new(curve: f32, elevation: f32) -> Self {
        Self {
            curve,
            elevation,
            ..Default::default()
        }
    }

    pub fn building(&self, left: bool) -> &Building {
        if left {
            &self.left
        } else {
            &self.right
        }
    }
}

/// Closed loop of exactly `TOTAL_SEGMENTS` segments
///
/// Populated once by the builder, read-only during a race. All indexing
/// wraps, so callers never need to reduce indices themselves.
#[derive(Debug, Clone)]
pub struct Track {
    segments: Box<[Segment]>,
}

impl Track {
    /// Wrap a fully built segment list; anything but `TOTAL_SEGMENTS` is
    /// truncated or padded flat
    pub fn from_segments(mut segments: Vec<Segment>) -> Self {
        let last = segments.last().map(|s| s.elevation).unwrap_or(0.0);
        segments.resize(TOTAL_SEGMENTS, Segment::new(0.0, last));
        Self {
            segments: segments.into_boxed_slice(),
        }
    }

    /// Straight, level, empty loop
    pub fn flat() -> Self {
        Self::from_segments(vec![Segment::default(); TOTAL_SEGMENTS])
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// World length of one lap
    pub fn length(&self) -> f32 {
        self.len() as f32 * SEGMENT_LENGTH
    }

    pub fn wrap(&self, index: usize) -> usize {
        index % self.len()
    }

    /// Segment at `index` (wrapping)
    pub fn get(&self, index: usize) -> &Segment {
        &self.segments[index % self.segments.len()]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Segment {
        let n = self.segments.len();
        &mut self.segments[index % n]
    }

    /// Segment before `index` (wrapping)
    pub fn prev(&self, index: usize) -> &Segment {
        self.get(index + self.len() - 1)
    }

    /// Segment index containing position `z`
    pub fn index_at(&self, z: f32) -> usize {
        segment_index_in(z, self.len())
    }

    pub fn segment_at(&self, z: f32) -> &Segment {
        self.get(self.index_at(z))
    }

    /// Ground height at position `z`, interpolated across the segment
    pub fn elevation_at(&self, z: f32) -> f32 {
        let idx = self.index_at(z);
        let pct = z.rem_euclid(SEGMENT_LENGTH) / SEGMENT_LENGTH;
        crate::util::lerp(self.prev(idx).elevation, self.get(idx).elevation, pct)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
