//! Player car: driver input, longitudinal/lateral integration, lap timing

use rand::Rng;
use tracing::info;

use super::SimulationState;
use crate::config::*;
use crate::settings::ControlMode;
use crate::util::{loop_increase, per_tick};

/// Left/right button state for the human driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverInput {
    pub left: bool,
    pub right: bool,
}

impl DriverInput {
    /// -1 (left), 0 or 1 (right)
    pub fn steer(&self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }
}

/// What a lap-line crossing meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapOutcome {
    None,
    LapCompleted,
    RaceFinished,
}

/// Lap counter and timers (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapTimer {
    /// 1-based
    pub current_lap: u32,
    pub total_laps: u32,
    pub current_time: f32,
    pub last_time: f32,
    /// 0 until a lap has been completed
    pub best_time: f32,
    /// End the race after the final lap instead of wrapping to lap 1
    pub finish_on_last: bool,
}

impl LapTimer {
    pub fn new(total_laps: u32, finish_on_last: bool) -> Self {
        Self {
            current_lap: 1,
            total_laps: total_laps.max(1),
            current_time: 0.0,
            last_time: 0.0,
            best_time: 0.0,
            finish_on_last,
        }
    }

    /// Account for a move from `prev` to `pos` taking `dt` seconds
    pub fn advance(&mut self, prev: f32, pos: f32, track_length: f32, dt: f32) -> LapOutcome {
        let mut outcome = LapOutcome::None;
        if pos < prev && prev > track_length * 0.9 {
            // short laps are wrap jitter, not real crossings
            if self.current_time > MIN_LAP_TIME {
                self.last_time = self.current_time;
                if self.best_time <= 0.0 || self.current_time < self.best_time {
                    self.best_time = self.current_time;
                }
                outcome = if self.current_lap < self.total_laps {
                    self.current_lap += 1;
                    LapOutcome::LapCompleted
                } else if self.finish_on_last {
                    LapOutcome::RaceFinished
                } else {
                    self.current_lap = 1;
                    LapOutcome::LapCompleted
                };
            }
            self.current_time = 0.0;
        }
        self.current_time += dt;
        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Camera position along the track
    pub position: f32,
    /// Lateral offset in road half-widths
    pub x: f32,
    pub speed: f32,
    pub accel: f32,
    /// Lateral drift velocity
    pub velocity_x: f32,
    /// Visual yaw from drifting, radians
    pub drift_angle: f32,
    pub laps: LapTimer,
    /// Start-line crossings regardless of lap validity, for ranking
    pub wraps: u32,
    pub crashed: bool,
    pub crash_time_ms: u64,
}

impl PlayerState {
    pub fn new(total_laps: u32, finish_on_last: bool) -> Self {
        Self {
            position: 0.0,
            x: 0.0,
            speed: 0.0,
            accel: 0.0,
            velocity_x: 0.0,
            drift_angle: 0.0,
            laps: LapTimer::new(total_laps, finish_on_last),
            wraps: 0,
            crashed: false,
            crash_time_ms: 0,
        }
    }

    pub fn crash(&mut self, now_ms: u64) {
        self.crashed = true;
        self.crash_time_ms = now_ms;
    }

    /// Clear the crash flag once its banner has been shown long enough
    pub fn update_crash(&mut self, now_ms: u64) {
        if self.crashed && now_ms.saturating_sub(self.crash_time_ms) > CRASH_DISPLAY_MS {
            self.crashed = false;
        }
    }

    /// Move back along the track, undoing a start-line crossing if needed
    pub fn push_back(&mut self, distance: f32, track_length: f32) {
        let prev = self.position;
        self.position = loop_increase(self.position, -distance, track_length);
        if self.position > prev {
            self.wraps = self.wraps.saturating_sub(1);
        }
    }
}

/// Engine ramp plus steering, from the autopilot or the buttons
pub fn handle_input(state: &mut SimulationState, control: ControlMode, input: DriverInput, dt: f32) {
    let max_speed = state.rig.max_speed;
    let curve = state.track.segment_at(state.player_car_z()).curve;
    let p = &mut state.player;

    if p.speed < max_speed * ACCEL_NEAR_MAX {
        p.accel = (p.accel + ACCEL_RAMP * dt).min(max_speed * ACCEL_TARGET);
    } else {
        p.accel *= per_tick(ACCEL_DAMPING, dt);
    }

    match control {
        ControlMode::Autopilot => {
            let target = -curve * COUNTER_STEER;
            p.x += (target - p.x) * STEER_AUTO * dt;
            p.x = p.x.clamp(-AUTOPILOT_RANGE, AUTOPILOT_RANGE);
        }
        ControlMode::Human => {
            let speed_pct = p.speed / max_speed;
            p.x += input.steer() * HUMAN_STEER_RATE * speed_pct * dt;
            p.x = p.x.clamp(-HUMAN_RANGE, HUMAN_RANGE);
        }
    }
}

/// Integrate the player one step and move ambient traffic
pub fn update_physics(state: &mut SimulationState, dt: f32) -> LapOutcome {
    let max_speed = state.rig.max_speed;
    let track_length = state.track.length();
    let idx = state.track.index_at(state.player_car_z());
    let seg = *state.track.get(idx);
    let slope = (seg.elevation - state.track.prev(idx).elevation) / SEGMENT_LENGTH;
    let p = &mut state.player;

    // uphill slows, downhill speeds up; a crawling car just pulls away
    if p.speed < max_speed * CRAWL_SPEED {
        p.accel = p.accel.max(0.0);
    } else {
        p.accel += -slope * GRAVITY_FACTOR * dt;
    }

    p.speed *= per_tick(FRICTION, dt);
    p.speed += p.accel * dt;
    p.speed = p.speed.clamp(0.0, max_speed);

    let speed_pct = p.speed / max_speed;
    p.velocity_x += seg.curve * CENTRIFUGAL * speed_pct * dt * CURVE_FORCE;
    p.velocity_x *= per_tick(LATERAL_FRICTION, dt);
    p.x -= p.velocity_x * dt;
    p.x -= dt * CENTRIFUGAL_DX * speed_pct * speed_pct * seg.curve * CENTRIFUGAL;

    if p.speed > 0.1 {
        p.drift_angle = ((p.velocity_x * 10.0).atan2(speed_pct) * 0.5).clamp(-MAX_DRIFT_ANGLE, MAX_DRIFT_ANGLE);
    } else {
        p.drift_angle *= per_tick(0.9, dt);
    }

    let prev = p.position;
    p.position = loop_increase(p.position, p.speed * dt, track_length);
    if p.position < prev {
        p.wraps += 1;
    }

    let outcome = p.laps.advance(prev, p.position, track_length, dt);
    match outcome {
        LapOutcome::LapCompleted => info!(
            lap = p.laps.current_lap,
            time = p.laps.last_time,
            best = p.laps.best_time,
            "lap completed"
        ),
        LapOutcome::RaceFinished => info!(time = p.laps.last_time, best = p.laps.best_time, "race finished"),
        LapOutcome::None => {}
    }

    for car in state.traffic.iter_mut() {
        car.z = loop_increase(car.z, car.speed * dt, track_length);
        if state.rng.gen_range(0..200) < 2 {
            car.offset = (car.offset + state.rng.gen_range(-1..2) as f32 * 0.1).clamp(-0.8, 0.8);
        }
    }

    outcome
}
