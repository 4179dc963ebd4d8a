//! Hand-authored track layouts
//!
//! Uses RON (Rusty Object Notation) for human-readable layout files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One ease-in / hold / ease-out road section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSection {
    pub enter: usize,
    pub hold: usize,
    pub leave: usize,
    /// Target curvature reached after `enter`
    pub curve: f32,
    /// Elevation change across the section, in segment lengths
    pub hill: f32,
}

impl RoadSection {
    pub const fn new(enter: usize, hold: usize, leave: usize, curve: f32, hill: f32) -> Self {
        Self { enter, hold, leave, curve, hill }
    }

    pub fn len(&self) -> usize {
        self.enter + self.hold + self.leave
    }
}

/// Ordered section list; the builder pads, levels and decorates it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub name: String,
    pub sections: Vec<RoadSection>,
}

impl TrackLayout {
    /// Start straight, left bend, climbing right, gentle descent, hairpin down
    pub fn classic() -> Self {
        Self {
            name: "Classic".to_string(),
            sections: vec![
                RoadSection::new(25, 25, 25, 0.0, 0.0),
                RoadSection::new(50, 50, 50, -2.0, 0.0),
                RoadSection::new(50, 50, 50, 4.0, 40.0),
                RoadSection::new(50, 50, 50, 2.0, -20.0),
                RoadSection::new(50, 50, 50, -4.0, -40.0),
            ],
        }
    }

    pub fn total_segments(&self) -> usize {
        self.sections.iter().map(RoadSection::len).sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Load a layout from a RON file
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<TrackLayout, LayoutError> {
    let contents = fs::read_to_string(path)?;
    load_layout_from_str(&contents)
}

/// Load a layout from a RON string (for embedded layouts or testing)
pub fn load_layout_from_str(s: &str) -> Result<TrackLayout, LayoutError> {
    Ok(ron::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let src = r#"(
            name: "Test",
            sections: [
                (enter: 10, hold: 5, leave: 10, curve: -2.5, hill: 12.0),
                (enter: 3, hold: 3, leave: 3, curve: 0.0, hill: 0.0),
            ],
        )"#;
        let layout = load_layout_from_str(src).expect("valid layout");
        assert_eq!(layout.name, "Test");
        assert_eq!(layout.sections.len(), 2);
        assert_eq!(layout.sections[0].curve, -2.5);
        assert_eq!(layout.total_segments(), 34);
    }

    #[test]
    fn test_reject_malformed_layout() {
        assert!(matches!(
            load_layout_from_str("(name: \"x\", sections: [(enter: 1)])"),
            Err(LayoutError::Parse(_))
        ));
    }

    #[test]
    fn test_classic_serializes() {
        let layout = TrackLayout::classic();
        let text = ron::ser::to_string_pretty(&layout, ron::ser::PrettyConfig::new()).expect("serialize");
        assert_eq!(load_layout_from_str(&text).expect("parse"), layout);
        assert_eq!(layout.total_segments(), 675);
    }

    #[test]
    fn test_bundled_layout_parses() {
        let layout = load_layout_from_str(include_str!("../../assets/tracks/coast.ron")).expect("bundled layout");
        assert_eq!(layout.name, "Coast Road");
        assert_eq!(layout.total_segments(), 455);
    }
}
