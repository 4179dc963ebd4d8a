//! Compile-time configuration
//!
//! Screen geometry, track dimensions and every physics tuning value.
//! Nothing here is runtime-configurable; race selection lives in `settings`.

// =============================================================
//  Screen
// =============================================================

/// Logical screen size (small TFT panel)
pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 240;
pub const SCREEN_CX: i32 = SCREEN_WIDTH / 2;
pub const SCREEN_CY: i32 = SCREEN_HEIGHT / 2;

// =============================================================
//  Track and camera
// =============================================================

/// Length of one segment along the track
pub const SEGMENT_LENGTH: f32 = 200.0;
/// Segments per rumble strip colour band
pub const RUMBLE_LENGTH: usize = 3;
/// Segments projected per frame
pub const DRAW_DISTANCE: usize = 40;
/// Segments in the closed loop
pub const TOTAL_SEGMENTS: usize = 500;
/// Road half-width in world units
pub const ROAD_WIDTH: f32 = 2000.0;
pub const LANES: i32 = 3;
pub const FOV_DEGREES: f32 = 100.0;
pub const CAMERA_HEIGHT: f32 = 1000.0;
pub const FOG_DENSITY: f32 = 5.0;

/// Total track length in world units
pub const TRACK_LENGTH: f32 = TOTAL_SEGMENTS as f32 * SEGMENT_LENGTH;

// =============================================================
//  Car physics
// =============================================================

/// Per-tick multipliers below are tuned at this rate
pub const REFERENCE_FPS: f32 = 60.0;

/// max_speed = SEGMENT_LENGTH * SPEED_MULTIPLIER (~246 km/h)
pub const SPEED_MULTIPLIER: f32 = 65.0;
/// Acceleration ramps toward max_speed * ACCEL_TARGET
pub const ACCEL_TARGET: f32 = 0.9;
/// Engine ramp (units/s^2 per second)
pub const ACCEL_RAMP: f32 = 180.0;
/// Above this speed fraction acceleration decays instead of ramping
pub const ACCEL_NEAR_MAX: f32 = 0.90;
pub const ACCEL_DAMPING: f32 = 0.97;
/// Rolling/air friction (~3.3s to stop from max)
pub const FRICTION: f32 = 0.996;
/// Slope contribution to acceleration
pub const GRAVITY_FACTOR: f32 = 1600.0;
/// Below this fraction of top speed the slope stops feeding acceleration
pub const CRAWL_SPEED: f32 = 0.1;
pub const CENTRIFUGAL: f32 = 0.18;
/// Lateral force multiplier in curves
pub const CURVE_FORCE: f32 = 3.0;
pub const LATERAL_FRICTION: f32 = 0.90;
/// Autopilot response to curves
pub const STEER_AUTO: f32 = 1.8;
/// Direct centrifugal push factor
pub const CENTRIFUGAL_DX: f32 = 1.5;
/// Autopilot counter-steer per unit of curvature
pub const COUNTER_STEER: f32 = 0.12;
/// Autopilot lateral range
pub const AUTOPILOT_RANGE: f32 = 0.8;
/// Manual steering rate (half road widths per second at full speed)
pub const HUMAN_STEER_RATE: f32 = 2.2;
/// Manual steering range (lets the player leave the road)
pub const HUMAN_RANGE: f32 = 3.0;
pub const MAX_DRIFT_ANGLE: f32 = 0.5;
/// Lap timer must exceed this before a wrap counts as a lap
pub const MIN_LAP_TIME: f32 = 5.0;

// =============================================================
//  Collisions
// =============================================================

pub const PLAYER_WIDTH: f32 = 0.15;
pub const CAR_WIDTH: f32 = 0.15;
/// Segment window for car contacts
pub const CAR_HIT_SEGMENTS: usize = 3;
pub const CAR_HIT_SPEED_KEEP: f32 = 0.7;
pub const CAR_HIT_PUSHBACK: f32 = 0.05;
pub const CAR_HIT_CRASH: f32 = 0.5;

pub const TUNNEL_WALL_X: f32 = 0.95;
pub const TUNNEL_HIT_SPEED_KEEP: f32 = 0.3;
pub const TUNNEL_HIT_CRASH: f32 = 0.35;

pub const BUILDING_HIT_SPEED_KEEP: f32 = 0.3;
pub const BUILDING_HIT_CRASH: f32 = 0.35;

pub const SCENERY_WIDTH: f32 = 0.4;
pub const SCENERY_HIT_SPEED_KEEP: f32 = 0.2;
pub const SCENERY_HIT_CRASH: f32 = 0.25;

pub const OFFROAD_X: f32 = 2.4;
pub const OFFROAD_SPEED_KEEP: f32 = 0.5;
pub const OFFROAD_CRASH: f32 = 0.4;

/// How long the crash banner stays up
pub const CRASH_DISPLAY_MS: u64 = 1500;

// =============================================================
//  Track generator
// =============================================================

/// Segments per ease-in / hold / ease-out phase
pub const SECTION_PHASE_MIN: usize = 10;
pub const SECTION_PHASE_MAX: usize = 30;
pub const MAX_CURVE: f32 = 5.0;
/// Curves weaker than this are snapped to straight
pub const CURVE_DEADZONE: f32 = 1.0;
/// Hill delta in segment lengths
pub const MAX_HILL: f32 = 30.0;
pub const HILL_DEADZONE: f32 = 8.0;
/// Steepest per-segment slope of a generated hill
pub const MAX_SLOPE: f32 = 0.45;
/// Above this accumulated elevation the next section heads back to zero
pub const ELEVATION_LIMIT: f32 = 2400.0;
/// Generated sections never end higher or lower than this; the closing
/// section can level it within `CLOSING_BUDGET` at `MAX_SLOPE`
pub const ELEVATION_MAX: f32 = 3200.0;
/// Segments reserved at the end for the leveling section
pub const CLOSING_BUDGET: usize = 60;
pub const CLOSING_HILL_MAX: f32 = 80.0;
/// Straight run at the start line
pub const START_STRAIGHT: usize = 10;

pub const TUNNEL_LENGTH: usize = 40;
pub const TUNNEL_HEIGHT: f32 = 9000.0;
/// Wall distance in road half-widths
pub const TUNNEL_WIDTH: f32 = 1.15;
/// Ceiling light every N segments
pub const TUNNEL_LIGHT_SPACING: usize = 4;

// =============================================================
//  Buildings
// =============================================================

pub const BUILDING_H_MIN: u32 = 120_000;
pub const BUILDING_H_MAX: u32 = 350_000;
pub const BUILDING_W: f32 = 400_000.0;
/// Building line in road half-widths
pub const BUILDING_OFFSET: f32 = 1.5;
pub const BUILDING_SEG_MIN: u32 = 6;
pub const BUILDING_SEG_MAX: u32 = 16;
pub const BUILDING_GAP_MIN: u32 = 4;
pub const BUILDING_GAP_MAX: u32 = 10;
/// Chance a finished run is followed by a building instead of a gap
pub const BUILDING_CHANCE: f64 = 0.6;
pub const BUILDING_STYLES: usize = 6;

/// Percent chance of a scenery prop on an open segment
pub const SCENERY_CHANCE: u32 = 12;
/// First segments left clear for the start grid
pub const SCENERY_START: usize = 5;

// =============================================================
//  Traffic and race
// =============================================================

pub const MAX_TRAFFIC_CARS: usize = 6;
pub const NUM_COMPETITORS: usize = 3;
pub const DEFAULT_TOTAL_LAPS: u32 = 3;

/// Competitors closer than this (half road widths) are touching
pub const COMPETITOR_WIDTH: f32 = 0.25;
/// Longitudinal contact window between competitors
pub const COMPETITOR_Z_WINDOW: f32 = SEGMENT_LENGTH * 1.5;
pub const COMPETITOR_PUSH: f32 = 0.05;
pub const COMPETITOR_TRAILING_SLOW: f32 = 0.9;
pub const COMPETITOR_RANGE: f32 = 0.9;

pub const COUNTDOWN_MS: u64 = 3000;
/// "GO!" stays up until this point
pub const COUNTDOWN_GO_MS: u64 = 3600;
pub const RESULTS_MS: u64 = 3000;

/// Horizontal parallax travel per unit of curve at full speed
pub const SKY_CURVE_SCROLL: f32 = 60.0;
/// Horizontal parallax per unit of lateral offset
pub const SKY_STEER_PARALLAX: f32 = 40.0;

// =============================================================
//  Car models
// =============================================================

/// World units per model unit across and up
pub const CAR_MODEL_SCALE: f32 = 10.0;
/// World units per model unit along the car
pub const CAR_MODEL_DEPTH_SCALE: f32 = 5.0;
/// Fixed perspective scale of the polygon player car (about 44 px wide)
pub const PLAYER_CAR_SCALE: f32 = 0.00069;
/// Gap between the player car's ground point and the screen bottom
pub const PLAYER_CAR_LIFT: i32 = 20;
