//! OutRun Engine: pseudo-3D arcade racer
//!
//! The whole scene is drawn by a 16-bit software rasterizer into a 320x240
//! framebuffer; this host only scales it into a window and reads the keys:
//! - Left / Right (or A / D) steer in human mode
//! - Enter / Space start from the title screen
//! - Tab toggles autopilot, T cycles the time of day, R restarts
//! - F5 saves the current settings, F12 saves a screenshot

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod physics;
mod rasterizer;
mod render;
mod settings;
mod track;
mod util;

use std::time::{SystemTime, UNIX_EPOCH};

use macroquad::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use app::{screenshot_path, FrameInput, Game};
use config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use physics::DriverInput;
use rasterizer::Framebuffer;
use settings::{load_config, save_config, RaceConfig, CONFIG_FILE};

/// Longest step fed to the simulation, so a stall can't tunnel through cars
const MAX_FRAME_TIME: f32 = 0.05;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("OutRun Engine v{}", VERSION),
        window_width: SCREEN_WIDTH * 3,
        window_height: SCREEN_HEIGHT * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_settings() -> RaceConfig {
    match load_config(CONFIG_FILE) {
        Ok(config) => {
            info!(file = CONFIG_FILE, "loaded settings");
            config
        }
        Err(e) => {
            warn!(file = CONFIG_FILE, error = %e, "using default settings");
            RaceConfig::default()
        }
    }
}

fn unix_time() -> std::time::Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
}

fn read_input() -> FrameInput {
    FrameInput {
        steer: DriverInput {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        },
        start: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space),
        restart: is_key_pressed(KeyCode::R),
        cycle_time_of_day: is_key_pressed(KeyCode::T),
        toggle_control: is_key_pressed(KeyCode::Tab),
    }
}

/// Scale the framebuffer into the window, keeping the aspect ratio
fn present(fb: &Framebuffer) {
    clear_background(BLACK);
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba8());
    texture.set_filter(FilterMode::Nearest);

    let scale = (screen_width() / fb.width as f32).min(screen_height() / fb.height as f32);
    let draw_w = fb.width as f32 * scale;
    let draw_h = fb.height as f32 * scale;
    draw_texture_ex(
        &texture,
        (screen_width() - draw_w) / 2.0,
        (screen_height() - draw_h) / 2.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(Vec2::new(draw_w, draw_h)),
            ..Default::default()
        },
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging();
    info!(version = VERSION, "=== OutRun Engine ===");

    let config = load_settings();
    let mut game = Game::new(config, unix_time().as_secs());
    let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);

    loop {
        let dt = get_frame_time().min(MAX_FRAME_TIME);
        let now_ms = (get_time() * 1000.0) as u64;

        game.update(&read_input(), dt, now_ms);
        game.render(&mut fb, now_ms);

        if is_key_pressed(KeyCode::F5) {
            match save_config(&game.config, CONFIG_FILE) {
                Ok(()) => info!(file = CONFIG_FILE, "settings saved"),
                Err(e) => error!(file = CONFIG_FILE, error = %e, "settings not saved"),
            }
        }
        if is_key_pressed(KeyCode::F12) {
            let path = screenshot_path(unix_time().as_millis() as u64);
            match fb.save_png(&path) {
                Ok(()) => info!(path = %path.display(), "screenshot saved"),
                Err(e) => error!(path = %path.display(), error = %e, "screenshot failed"),
            }
        }

        present(&fb);
        next_frame().await;
    }
}
