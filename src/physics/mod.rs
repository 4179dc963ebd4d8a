//! Vehicle simulation
//!
//! All mutable race state lives in one `SimulationState` owned by the game
//! controller and handed by reference to each step, in this order each frame:
//! `handle_input` → `update_physics` → `update_competitors` → `check_collisions`.

mod collision;
mod competitors;
mod player;

pub use collision::*;
pub use competitors::*;
pub use player::*;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::{CAMERA_HEIGHT, FOV_DEGREES, SEGMENT_LENGTH, SPEED_MULTIPLIER};
use crate::settings::TrafficMode;
use crate::track::{init_competitors, init_traffic, Competitor, Track, TrafficCar};

/// Camera constants derived from the field of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Projection depth, 1 / tan(fov / 2)
    pub depth: f32,
    /// Distance from the camera to the player's car; also the steering look-ahead
    pub player_z: f32,
    pub max_speed: f32,
}

impl CameraRig {
    pub fn new() -> Self {
        let depth = 1.0 / (FOV_DEGREES.to_radians() / 2.0).tan();
        Self {
            depth,
            player_z: CAMERA_HEIGHT * depth,
            max_speed: SEGMENT_LENGTH * SPEED_MULTIPLIER,
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse race flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Countdown,
    Racing,
    Finished,
}

/// Everything the simulation mutates during a race
pub struct SimulationState {
    pub track: Track,
    pub rig: CameraRig,
    pub player: PlayerState,
    pub traffic: Vec<TrafficCar>,
    pub competitors: Vec<Competitor>,
    pub mode: TrafficMode,
    pub rng: SmallRng,
}

impl SimulationState {
    /// Fresh race on `track`; agents are seeded from `seed`
    pub fn new(track: Track, mode: TrafficMode, total_laps: u32, seed: u64) -> Self {
        let mut state = Self {
            track,
            rig: CameraRig::new(),
            player: PlayerState::new(total_laps, mode == TrafficMode::Competitors),
            traffic: Vec::new(),
            competitors: Vec::new(),
            mode,
            rng: SmallRng::seed_from_u64(seed),
        };
        state.reset();
        state
    }

    /// Put every car back on the start line
    pub fn reset(&mut self) {
        let total_laps = self.player.laps.total_laps;
        self.player = PlayerState::new(total_laps, self.mode == TrafficMode::Competitors);
        self.traffic.clear();
        self.competitors.clear();
        match self.mode {
            TrafficMode::None => {}
            TrafficMode::RandomTraffic => {
                self.traffic = init_traffic(&mut self.rng, self.rig.max_speed);
            }
            TrafficMode::Competitors => {
                self.competitors = init_competitors(&mut self.rng, self.rig.player_z);
            }
        }
        info!(
            mode = ?self.mode,
            laps = total_laps,
            traffic = self.traffic.len(),
            competitors = self.competitors.len(),
            "race reset"
        );
    }

    /// Track position of the player's car (camera position plus look-ahead)
    pub fn player_car_z(&self) -> f32 {
        self.player.position + self.rig.player_z
    }

    pub fn speed_fraction(&self) -> f32 {
        self.player.speed / self.rig.max_speed
    }
}
