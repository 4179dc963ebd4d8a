//! Heads-up display and full-screen overlays

use super::vehicles::PlayerCar;
use crate::config::*;
use crate::physics::{player_rank, SimulationState};
use crate::rasterizer::{DrawSurface, Rgb565, TextCursor, TextStyle};

const ORANGE: Rgb565 = Rgb565::rgb(255, 165, 0);
const DIAL: Rgb565 = Rgb565::rgb(20, 20, 20);
const DIAL_RIM: Rgb565 = Rgb565::rgb(60, 60, 60);
const NEEDLE_SHADOW: Rgb565 = Rgb565::rgb(10, 10, 10);
const PODIUM_TRIM: Rgb565 = Rgb565::rgb(80, 70, 0);
const SHADOW: Rgb565 = Rgb565::rgb(15, 15, 15);

/// Top of the dial scale
const DIAL_MAX_KMH: i32 = 300;
const DIAL_START_DEG: f32 = -225.0;
const DIAL_SWEEP_DEG: f32 = 270.0;

/// Point at `deg` degrees, `r` pixels from (cx, cy)
fn polar(cx: i32, cy: i32, deg: f32, r: i32) -> (i32, i32) {
    let a = deg.to_radians();
    (cx + (a.cos() * r as f32) as i32, cy + (a.sin() * r as f32) as i32)
}

/// Dial reading for a speed
pub fn speed_kmh(speed: f32, max_speed: f32) -> i32 {
    if max_speed <= 0.0 {
        return 0;
    }
    (speed * DIAL_MAX_KMH as f32 / max_speed) as i32
}

fn needle_color(kmh: i32) -> Rgb565 {
    if kmh > 250 {
        Rgb565::RED
    } else if kmh > 200 {
        Rgb565::YELLOW
    } else {
        Rgb565::WHITE
    }
}

/// Round dial in the bottom-right corner
pub fn draw_speedometer<S: DrawSurface + ?Sized>(fb: &mut S, speed: f32, max_speed: f32) {
    let cx = SCREEN_WIDTH - 55;
    let cy = SCREEN_HEIGHT - 55;
    let r = 42;

    fb.fill_circle(cx, cy, r + 3, DIAL);
    fb.draw_circle(cx, cy, r + 3, Rgb565::DARK_GREY);
    fb.draw_circle(cx, cy, r + 2, DIAL_RIM);

    let kmh = speed_kmh(speed, max_speed);

    let label = TextStyle::new(1, Rgb565::WHITE).with_bg(DIAL);
    for i in 0..=6 {
        let deg = DIAL_START_DEG + i as f32 * 75.0;
        let (x1, y1) = polar(cx, cy, deg, r - 8);
        let (x2, y2) = polar(cx, cy, deg, r - 2);
        fb.line(x1, y1, x2, y2, if i >= 5 { Rgb565::RED } else { ORANGE });

        if i % 2 == 0 {
            let (tx, ty) = polar(cx, cy, deg, r - 18);
            fb.text(tx - 6, ty - 4, &(i * 50).to_string(), &label);
        }
    }

    let deg = DIAL_START_DEG + kmh as f32 / DIAL_MAX_KMH as f32 * DIAL_SWEEP_DEG;
    let (nx, ny) = polar(cx, cy, deg, r - 10);
    let color = needle_color(kmh);
    fb.line(cx + 1, cy + 1, nx + 1, ny + 1, NEEDLE_SHADOW);
    fb.line(cx, cy, nx, ny, color);
    fb.line(cx - 1, cy, nx - 1, ny, color);
    fb.line(cx, cy - 1, nx, ny - 1, color);

    fb.fill_circle(cx, cy, 4, color);
    fb.draw_circle(cx, cy, 5, Rgb565::DARK_GREY);

    fb.text(cx - 18, cy + 12, &format!("{:>3}", kmh), &TextStyle::new(2, color).with_bg(DIAL));
}

/// `m:ss.cc`, or `s.cc` under a minute
pub fn format_lap_time(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds as u32;
    let hundredths = ((seconds - whole as f32) * 100.0) as u32;
    let (mins, secs) = (whole / 60, whole % 60);
    if mins > 0 {
        format!("{}:{:02}.{:02}", mins, secs, hundredths)
    } else {
        format!("{}.{:02}", secs, hundredths)
    }
}

/// Lap counter, timers and speedometer
pub fn draw_hud<S: DrawSurface + ?Sized>(fb: &mut S, state: &SimulationState) {
    let laps = &state.player.laps;

    fb.fill_rect(0, 0, 90, 36, Rgb565::BLACK);
    fb.draw_rect(0, 0, 90, 36, Rgb565::RED);
    fb.draw_rect(1, 1, 88, 34, Rgb565::DARK_GREY);

    let mut cursor = TextCursor::new(5, 4, TextStyle::new(2, Rgb565::RED).with_bg(Rgb565::BLACK));
    cursor.print(fb, "LAP ");
    cursor.style.fg = Rgb565::WHITE;
    cursor.print(fb, &format!("{}/{}", laps.current_lap, laps.total_laps));

    let mut cursor = TextCursor::new(5, 22, TextStyle::new(1, Rgb565::YELLOW).with_bg(Rgb565::BLACK));
    cursor.print(fb, "TIME ");
    cursor.style.fg = Rgb565::WHITE;
    cursor.print(fb, &format_lap_time(laps.current_time));

    let best = laps.best_time;
    if best > 0.0 && best < 999.0 {
        let tenths = ((best - best.trunc()) * 10.0) as u32;
        fb.text(
            SCREEN_WIDTH - 82,
            2,
            &format!("BEST {}.{} ", best as u32, tenths),
            &TextStyle::new(1, Rgb565::GREEN).with_bg(Rgb565::BLACK),
        );
    }

    draw_speedometer(fb, state.player.speed, state.rig.max_speed);
}

/// 3-2-1-GO, keyed off milliseconds since the countdown began
pub fn draw_countdown<S: DrawSurface + ?Sized>(fb: &mut S, elapsed_ms: u64) {
    if elapsed_ms >= COUNTDOWN_GO_MS {
        return;
    }
    let cx = SCREEN_CX;
    let cy = SCREEN_CY - 20;

    fb.fill_rect(cx - 40, cy - 30, 80, 60, Rgb565::BLACK);
    fb.draw_rect(cx - 40, cy - 30, 80, 60, Rgb565::WHITE);

    let digit = match elapsed_ms {
        0..=999 => Some(("3", Rgb565::RED)),
        1000..=1999 => Some(("2", Rgb565::YELLOW)),
        2000..=2999 => Some(("1", Rgb565::GREEN)),
        _ => None,
    };
    match digit {
        Some((label, color)) => {
            fb.text(cx - 12, cy - 16, label, &TextStyle::new(4, color).with_bg(Rgb565::BLACK));
        }
        None => {
            fb.fill_rect(cx - 52, cy - 20, 104, 40, Rgb565::GREEN);
            fb.text(cx - 24, cy - 10, "GO!", &TextStyle::new(3, Rgb565::WHITE).with_bg(Rgb565::GREEN));
        }
    }
}

/// "1ST", "2ND", ...
pub fn ordinal(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "TH",
        (1, _) => "ST",
        (2, _) => "ND",
        (3, _) => "RD",
        _ => "TH",
    };
    format!("{}{}", rank, suffix)
}

/// Finishing position podium
pub fn draw_race_results<S: DrawSurface + ?Sized>(fb: &mut S, state: &SimulationState) {
    let rank = player_rank(state);
    let (cx, cy) = (SCREEN_CX, SCREEN_CY);

    fb.fill_rect(cx - 90, cy - 55, 180, 110, Rgb565::BLACK);
    fb.draw_rect(cx - 90, cy - 55, 180, 110, Rgb565::YELLOW);
    fb.draw_rect(cx - 89, cy - 54, 178, 108, PODIUM_TRIM);

    let on_black = |size, fg| TextStyle::new(size, fg).with_bg(Rgb565::BLACK);
    fb.text(cx - 70, cy - 45, "RACE FINISH!", &on_black(2, Rgb565::YELLOW));
    fb.text(cx - 80, cy - 22, "YOUR POSITION: ", &on_black(1, Rgb565::WHITE));

    let color = match rank {
        1 => Rgb565::YELLOW,
        2 => Rgb565::WHITE,
        _ => ORANGE,
    };
    fb.text(cx - 30, cy - 10, &ordinal(rank), &on_black(3, color));
    fb.text(cx - 55, cy + 30, "Restarting in 3 sec...", &on_black(1, Rgb565::DARK_GREY));
}

pub fn draw_crash_message<S: DrawSurface + ?Sized>(fb: &mut S) {
    fb.fill_rect(SCREEN_CX - 70, SCREEN_CY - 15, 140, 30, Rgb565::BLACK);
    fb.draw_rect(SCREEN_CX - 71, SCREEN_CY - 16, 142, 32, Rgb565::RED);
    fb.text(
        SCREEN_CX - 55,
        SCREEN_CY - 8,
        "CRASH!",
        &TextStyle::new(3, Rgb565::RED).with_bg(Rgb565::BLACK),
    );
}

/// Start screen with the player's car on a turntable
pub fn draw_title_screen<S: DrawSurface + ?Sized>(fb: &mut S, car: &PlayerCar, time: f32) {
    fb.fill_rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, Rgb565::BLACK);

    fb.fill_rect(0, 100, SCREEN_WIDTH, 3, Rgb565::RED);
    fb.fill_rect(0, 105, SCREEN_WIDTH, 3, Rgb565::WHITE);

    fb.text(22, 115, "OUTRUN ENGINE", &TextStyle::new(3, Rgb565::RED));
    fb.text(60, 145, "3D RACING", &TextStyle::new(2, Rgb565::YELLOW));
    let small = TextStyle::new(1, Rgb565::WHITE);
    fb.text(30, 170, "LEFT / RIGHT to steer", &small);
    fb.text(30, 185, "Car accelerates automatically", &small);
    fb.text_centered(SCREEN_CX, 205, "ENTER to start", &TextStyle::new(1, Rgb565::DARK_GREY));

    fb.fill_ellipse(SCREEN_CX, 95, 55, 18, SHADOW);
    car.draw_turntable(fb, SCREEN_CX, 75, time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Framebuffer;
    use crate::settings::{RaceConfig, TrafficMode};
    use crate::track::Track;

    fn blank() -> Framebuffer {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.clear(Rgb565::BLUE);
        fb
    }

    fn dial_center(fb: &Framebuffer) -> Rgb565 {
        fb.get_pixel((SCREEN_WIDTH - 55) as usize, (SCREEN_HEIGHT - 55) as usize)
    }

    #[test]
    fn test_needle_color_tracks_speed() {
        let mut fb = blank();
        draw_speedometer(&mut fb, 0.0, 13_000.0);
        assert_eq!(dial_center(&fb), Rgb565::WHITE);
        draw_speedometer(&mut fb, 9_500.0, 13_000.0);
        assert_eq!(dial_center(&fb), Rgb565::YELLOW);
        draw_speedometer(&mut fb, 13_000.0, 13_000.0);
        assert_eq!(dial_center(&fb), Rgb565::RED);
    }

    #[test]
    fn test_speed_scale() {
        assert_eq!(speed_kmh(13_000.0, 13_000.0), 300);
        assert_eq!(speed_kmh(6_500.0, 13_000.0), 150);
        assert_eq!(speed_kmh(100.0, 0.0), 0);
    }

    #[test]
    fn test_lap_time_format() {
        assert_eq!(format_lap_time(5.25), "5.25");
        assert_eq!(format_lap_time(65.5), "1:05.50");
        assert_eq!(format_lap_time(0.0), "0.00");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1ST");
        assert_eq!(ordinal(2), "2ND");
        assert_eq!(ordinal(3), "3RD");
        assert_eq!(ordinal(4), "4TH");
        assert_eq!(ordinal(12), "12TH");
    }

    #[test]
    fn test_countdown_phases() {
        let box_pixel = |elapsed| {
            let mut fb = blank();
            draw_countdown(&mut fb, elapsed);
            // inside the GO banner but outside the digit box
            fb.get_pixel((SCREEN_CX - 48) as usize, (SCREEN_CY - 20) as usize)
        };
        assert_eq!(box_pixel(500), Rgb565::BLUE);
        assert_eq!(box_pixel(3_200), Rgb565::GREEN);
        assert_eq!(box_pixel(COUNTDOWN_GO_MS), Rgb565::BLUE);

        let mut fb = blank();
        draw_countdown(&mut fb, 1_500);
        assert!(fb.pixels.iter().any(|&p| Rgb565(p) == Rgb565::YELLOW));
    }

    #[test]
    fn test_hud_panels() {
        let mut state = SimulationState::new(Track::flat(), TrafficMode::None, 3, 1);
        state.player.laps.best_time = 42.3;
        let mut fb = blank();
        draw_hud(&mut fb, &state);
        assert_eq!(fb.get_pixel(0, 0), Rgb565::RED);
        assert!(fb.pixels.iter().any(|&p| Rgb565(p) == Rgb565::GREEN));
        assert_eq!(fb.get_pixel(SCREEN_CX as usize, SCREEN_CY as usize), Rgb565::BLUE);
    }

    #[test]
    fn test_results_and_banners() {
        let state = SimulationState::new(Track::flat(), TrafficMode::Competitors, 3, 1);
        let mut fb = blank();
        draw_race_results(&mut fb, &state);
        assert_eq!(fb.get_pixel((SCREEN_CX - 90) as usize, SCREEN_CY as usize), Rgb565::YELLOW);

        let mut fb = blank();
        draw_crash_message(&mut fb);
        assert_eq!(fb.get_pixel((SCREEN_CX - 71) as usize, SCREEN_CY as usize), Rgb565::RED);
    }

    #[test]
    fn test_title_screen_shows_the_car() {
        let car = PlayerCar::load(&RaceConfig::default());
        let mut fb = blank();
        draw_title_screen(&mut fb, &car, 0.0);
        assert_eq!(fb.get_pixel(0, 101), Rgb565::RED);
        assert_eq!(fb.get_pixel(0, 106), Rgb565::WHITE);
        // something other than the shadow and black above the bars
        assert!((40..100).any(|y| (100..220).any(|x| {
            let p = fb.get_pixel(x, y);
            p != Rgb565::BLACK && p != SHADOW
        })));
    }
}
