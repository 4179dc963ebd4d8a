//! Game controller
//!
//! Owns the race settings, the simulation and everything the renderer keeps
//! between frames. The host feeds it one `FrameInput` per frame plus the
//! wall clock, then asks it to draw into the framebuffer.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::*;
use crate::physics::{
    check_collisions, handle_input, player_rank, update_competitors, update_physics, DriverInput, GameState,
    LapOutcome, SimulationState,
};
use crate::rasterizer::{Framebuffer, Rgb565};
use crate::render::{
    draw_countdown, draw_crash_message, draw_hud, draw_race_results, draw_road, draw_sky, draw_title_screen,
    Background, Palette, PlayerCar, SkyScroll,
};
use crate::settings::{RaceConfig, TrackSource, TrafficMode};
use crate::track::{build_from_layout, build_procedural, load_layout, Track, TrackLayout};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Race,
}

/// Buttons sampled by the host this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub steer: DriverInput,
    /// Leave the title screen
    pub start: bool,
    pub restart: bool,
    pub cycle_time_of_day: bool,
    pub toggle_control: bool,
}

/// Build the configured track, falling back to a procedural one
pub fn build_track(source: &TrackSource, seed: u64) -> Track {
    match source {
        TrackSource::Procedural => build_procedural(seed),
        TrackSource::Classic => build_from_layout(&TrackLayout::classic(), seed),
        TrackSource::File(path) => match load_layout(path) {
            Ok(layout) => build_from_layout(&layout, seed),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "layout load failed, generating a track");
                build_procedural(seed)
            }
        },
    }
}

/// File name for a screenshot taken at `stamp`
pub fn screenshot_path(stamp: u64) -> PathBuf {
    PathBuf::from(format!("outrun_{}.png", stamp))
}

pub struct Game {
    pub config: RaceConfig,
    pub screen: Screen,
    pub state: GameState,
    pub sim: SimulationState,
    seed: u64,
    palette: Palette,
    background: Background,
    player_car: PlayerCar,
    sky: SkyScroll,
    countdown_start_ms: u64,
    /// Set once when the results podium first shows
    results_shown_ms: Option<u64>,
    title_time: f32,
}

impl Game {
    /// `clock_seed` is used when the settings don't fix a seed
    pub fn new(config: RaceConfig, clock_seed: u64) -> Self {
        let seed = config.seed.unwrap_or(clock_seed);
        let track = build_track(&config.track, seed);
        let sim = SimulationState::new(track, config.traffic, config.total_laps, seed);
        let palette = Palette::for_time(config.time_of_day);
        let background = Background::new(&palette, config.time_of_day, seed);
        let player_car = PlayerCar::load(&config);

        Self {
            screen: Screen::Title,
            state: GameState::Racing,
            sim,
            seed,
            palette,
            background,
            player_car,
            sky: SkyScroll::default(),
            countdown_start_ms: 0,
            results_shown_ms: None,
            title_time: 0.0,
            config,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Everything back on the grid; rivals wait for the countdown
    pub fn restart(&mut self, now_ms: u64) {
        self.sim.reset();
        self.sky = SkyScroll::default();
        self.results_shown_ms = None;
        self.countdown_start_ms = now_ms;
        self.state = if self.config.traffic == TrafficMode::Competitors {
            GameState::Countdown
        } else {
            GameState::Racing
        };
        info!(seed = self.seed, state = ?self.state, control = ?self.config.control, "race start");
    }

    /// Rebuild palette and sky for the next time of day
    pub fn cycle_time_of_day(&mut self) {
        let time = self.config.time_of_day.next();
        self.config.time_of_day = time;
        self.palette = Palette::for_time(time);
        self.background = Background::new(&self.palette, time, self.seed);
        info!(?time, "time of day");
    }

    pub fn toggle_control(&mut self) {
        self.config.control = self.config.control.toggled();
        info!(control = ?self.config.control, "control mode");
    }

    fn player_in_tunnel(&self) -> bool {
        self.sim.track.segment_at(self.sim.player_car_z()).tunnel
    }

    pub fn update(&mut self, input: &FrameInput, dt: f32, now_ms: u64) {
        if input.cycle_time_of_day {
            self.cycle_time_of_day();
        }
        if input.toggle_control {
            self.toggle_control();
        }

        if self.screen == Screen::Title {
            self.title_time += dt;
            if input.start {
                self.screen = Screen::Race;
                self.restart(now_ms);
            }
            return;
        }
        if input.restart {
            self.restart(now_ms);
            return;
        }

        match self.state {
            GameState::Countdown => {
                if now_ms.saturating_sub(self.countdown_start_ms) >= COUNTDOWN_MS {
                    self.state = GameState::Racing;
                }
            }
            GameState::Racing => self.step(input, dt, now_ms),
            GameState::Finished => {
                let shown = *self.results_shown_ms.get_or_insert(now_ms);
                if now_ms.saturating_sub(shown) >= RESULTS_MS {
                    self.restart(now_ms);
                }
            }
        }
    }

    /// One simulation step in the fixed order the physics expects
    fn step(&mut self, input: &FrameInput, dt: f32, now_ms: u64) {
        handle_input(&mut self.sim, self.config.control, input.steer, dt);
        let outcome = update_physics(&mut self.sim, dt);
        update_competitors(&mut self.sim, dt);
        check_collisions(&mut self.sim, now_ms);
        self.sim.player.update_crash(now_ms);

        let curve = self.sim.track.segment_at(self.sim.player_car_z()).curve;
        self.sky.advance(curve, self.sim.speed_fraction(), dt);

        if outcome == LapOutcome::RaceFinished {
            self.state = GameState::Finished;
            self.results_shown_ms = Some(now_ms);
            info!(position = player_rank(&self.sim), "results");
        }
    }

    pub fn render(&mut self, fb: &mut Framebuffer, now_ms: u64) {
        fb.begin_frame(Rgb565::BLACK);
        if self.screen == Screen::Title {
            draw_title_screen(fb, &self.player_car, self.title_time);
            return;
        }

        let time = self.config.time_of_day;
        draw_sky(fb, &self.background, self.player_in_tunnel(), time, self.sky.pixels(self.sim.player.x));
        draw_road(fb, &self.sim, &self.palette, time);
        self.player_car.draw(fb, &self.sim);
        draw_hud(fb, &self.sim);

        if self.sim.player.crashed {
            draw_crash_message(fb);
        }
        match self.state {
            GameState::Finished => draw_race_results(fb, &self.sim),
            _ if self.config.traffic == TrafficMode::Competitors => {
                draw_countdown(fb, now_ms.saturating_sub(self.countdown_start_ms));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::settings::ControlMode;

    fn config(traffic: TrafficMode) -> RaceConfig {
        RaceConfig {
            seed: Some(11),
            track: TrackSource::Classic,
            traffic,
            ..RaceConfig::default()
        }
    }

    fn started(traffic: TrafficMode) -> Game {
        let mut game = Game::new(config(traffic), 0);
        game.update(&FrameInput { start: true, ..FrameInput::default() }, 0.016, 0);
        game
    }

    fn screen() -> Framebuffer {
        Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize)
    }

    #[test]
    fn test_title_waits_for_start() {
        let mut game = Game::new(config(TrafficMode::None), 0);
        assert_eq!(game.seed(), 11);
        game.update(&FrameInput::default(), 0.016, 0);
        assert_eq!(game.screen, Screen::Title);
        game.update(&FrameInput { start: true, ..FrameInput::default() }, 0.016, 16);
        assert_eq!(game.screen, Screen::Race);
        assert_eq!(game.state, GameState::Racing);
    }

    #[test]
    fn test_countdown_holds_the_grid() {
        let mut game = started(TrafficMode::Competitors);
        assert_eq!(game.state, GameState::Countdown);
        for i in 0..100 {
            game.update(&FrameInput::default(), 0.016, i * 16);
        }
        assert_eq!(game.sim.player.position, 0.0);
        game.update(&FrameInput::default(), 0.016, COUNTDOWN_MS);
        assert_eq!(game.state, GameState::Racing);
        for i in 0..60 {
            game.update(&FrameInput::default(), 0.016, COUNTDOWN_MS + i * 16);
        }
        assert!(game.sim.player.speed > 0.0);
    }

    #[test]
    fn test_results_restart_the_race() {
        let mut game = started(TrafficMode::Competitors);
        game.state = GameState::Finished;
        game.results_shown_ms = Some(10_000);
        game.update(&FrameInput::default(), 0.016, 10_000 + RESULTS_MS - 1);
        assert_eq!(game.state, GameState::Finished);
        game.update(&FrameInput::default(), 0.016, 10_000 + RESULTS_MS);
        assert_eq!(game.state, GameState::Countdown);
        assert!(game.results_shown_ms.is_none());
    }

    #[test]
    fn test_toggles() {
        let mut game = started(TrafficMode::None);
        assert_eq!(game.config.control, ControlMode::Autopilot);
        game.update(
            &FrameInput { toggle_control: true, cycle_time_of_day: true, ..FrameInput::default() },
            0.016,
            16,
        );
        assert_eq!(game.config.control, ControlMode::Human);
        assert_eq!(game.palette, Palette::for_time(game.config.time_of_day));
        assert_ne!(game.config.time_of_day, RaceConfig::default().time_of_day);
    }

    #[test]
    fn test_restart_key_resets_the_car() {
        let mut game = started(TrafficMode::RandomTraffic);
        for i in 0..120 {
            game.update(&FrameInput::default(), 0.016, i * 16);
        }
        assert!(game.sim.player.position > 0.0);
        game.update(&FrameInput { restart: true, ..FrameInput::default() }, 0.016, 5_000);
        assert_eq!(game.sim.player.position, 0.0);
    }

    #[test]
    fn test_frames_render() {
        let mut game = Game::new(config(TrafficMode::Competitors), 0);
        let mut fb = screen();
        game.render(&mut fb, 0);
        assert_eq!(fb.get_pixel(0, 101), Rgb565::RED);

        game.update(&FrameInput { start: true, ..FrameInput::default() }, 0.016, 0);
        game.render(&mut fb, 500);
        // lap box frame
        assert_eq!(fb.get_pixel(0, 0), Rgb565::RED);
        // countdown box outline
        assert_eq!(fb.get_pixel(SCREEN_CX as usize - 40, SCREEN_CY as usize - 50), Rgb565::WHITE);
    }

    #[test]
    fn test_missing_layout_falls_back() {
        let track = build_track(&TrackSource::File(PathBuf::from("/nonexistent/layout.ron")), 3);
        assert_eq!(track.len(), TOTAL_SEGMENTS);
        assert_eq!(screenshot_path(42), PathBuf::from("outrun_42.png"));
    }
}
