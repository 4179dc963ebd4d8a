//! Runtime race selection
//!
//! Everything tunable about the simulation itself is compile-time (see
//! `config`); this file only chooses *which* race to run. Stored as RON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOTAL_LAPS;

/// Default settings file, looked up in the working directory
pub const CONFIG_FILE: &str = "outrun.ron";

/// Where the track comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackSource {
    Procedural,
    Classic,
    File(PathBuf),
}

/// Which agents share the road with the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficMode {
    None,
    RandomTraffic,
    Competitors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Sunset,
    Night,
}

impl TimeOfDay {
    pub fn next(self) -> Self {
        match self {
            TimeOfDay::Day => TimeOfDay::Sunset,
            TimeOfDay::Sunset => TimeOfDay::Night,
            TimeOfDay::Night => TimeOfDay::Day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    Autopilot,
    Human,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Autopilot => ControlMode::Human,
            ControlMode::Human => ControlMode::Autopilot,
        }
    }
}

/// How the player's car is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarStyle {
    Polygon,
    Textured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Fixed seed; `None` draws one from the clock at race start
    pub seed: Option<u64>,
    pub track: TrackSource,
    pub traffic: TrafficMode,
    pub time_of_day: TimeOfDay,
    pub control: ControlMode,
    pub total_laps: u32,
    pub car_style: CarStyle,
    /// Wavefront OBJ for the textured car
    pub car_mesh: Option<PathBuf>,
    /// PNG/JPEG/BMP livery for the textured car
    pub car_texture: Option<PathBuf>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            track: TrackSource::Procedural,
            traffic: TrafficMode::Competitors,
            time_of_day: TimeOfDay::Day,
            control: ControlMode::Autopilot,
            total_laps: DEFAULT_TOTAL_LAPS,
            car_style: CarStyle::Textured,
            car_mesh: None,
            car_texture: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Load race settings from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RaceConfig, SettingsError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Save race settings to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RaceConfig, path: P) -> Result<(), SettingsError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn load_config_from_str(s: &str) -> Result<RaceConfig, SettingsError> {
    let mut config: RaceConfig = ron::from_str(s)?;
    config.total_laps = config.total_laps.max(1);
    Ok(config)
}
