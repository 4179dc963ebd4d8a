//! Moving agents on the track: ambient traffic and race competitors

use rand::Rng;

use crate::config::{MAX_TRAFFIC_CARS, NUM_COMPETITORS, SEGMENT_LENGTH, TOTAL_SEGMENTS};
use crate::rasterizer::Rgb565;

/// Body colours cycled across traffic cars
pub const TRAFFIC_COLORS: [Rgb565; 12] = [
    Rgb565(0x051C), // blue
    Rgb565(0xDDE0), // yellow
    Rgb565(0xC618), // grey
    Rgb565(0x05A0), // green
    Rgb565(0xFC60), // orange
    Rgb565(0xA01C), // purple
    Rgb565(0x05BC), // cyan
    Rgb565(0xB1E8), // dark red
    Rgb565(0xFDB2), // pink
    Rgb565(0x6318), // slate blue
    Rgb565(0x0780), // dark green
    Rgb565(0xC5E0), // gold
];

const COMPETITOR_COLORS: [Rgb565; NUM_COMPETITORS] = [
    Rgb565::rgb(0, 90, 230),
    Rgb565::rgb(250, 200, 0),
    Rgb565::rgb(240, 240, 240),
];

/// Ambient car cruising at a constant speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficCar {
    /// Lateral position in road half-widths
    pub offset: f32,
    /// Track position
    pub z: f32,
    pub speed: f32,
    pub color: Rgb565,
}

/// AI rival driven by the same model as the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Competitor {
    pub offset: f32,
    pub z: f32,
    pub speed: f32,
    pub accel: f32,
    /// Lateral drift velocity
    pub velocity_x: f32,
    /// Lane the driver settles back into
    pub lane: f32,
    /// Fraction of the player's top speed this driver targets
    pub speed_factor: f32,
    /// Scales how hard the driver counter-steers
    pub steer_factor: f32,
    /// Full laps driven (start line crossings)
    pub laps_completed: u32,
    pub color: Rgb565,
}

impl Competitor {
    /// Lap currently being driven (1-based)
    pub fn lap(&self) -> u32 {
        self.laps_completed + 1
    }

    /// Distance covered since the start, for ranking
    pub fn progress(&self, track_length: f32) -> f32 {
        self.laps_completed as f32 * track_length + self.z
    }
}

/// Scatter traffic around the loop at 20-70% of top speed
pub fn init_traffic<R: Rng>(rng: &mut R, max_speed: f32) -> Vec<TrafficCar> {
    (0..MAX_TRAFFIC_CARS)
        .map(|i| TrafficCar {
            offset: rng.gen_range(-8..9) as f32 / 10.0,
            z: rng.gen_range(0..TOTAL_SEGMENTS) as f32 * SEGMENT_LENGTH,
            speed: max_speed * (0.2 + rng.gen_range(0..50) as f32 / 100.0),
            color: TRAFFIC_COLORS[i % TRAFFIC_COLORS.len()],
        })
        .collect()
}

/// Starting grid just ahead of the player's car
pub fn init_competitors<R: Rng>(rng: &mut R, grid_start: f32) -> Vec<Competitor> {
    const LANES: [f32; 3] = [-0.45, 0.45, 0.0];
    (0..NUM_COMPETITORS)
        .map(|i| Competitor {
            offset: LANES[i % LANES.len()],
            z: grid_start + (i as f32 + 1.0) * 2.0 * SEGMENT_LENGTH,
            speed: 0.0,
            accel: 0.0,
            velocity_x: 0.0,
            lane: LANES[i % LANES.len()],
            speed_factor: rng.gen_range(0.86..0.97),
            steer_factor: rng.gen_range(0.8..1.2),
            laps_completed: 0,
            color: COMPETITOR_COLORS[i % COMPETITOR_COLORS.len()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_traffic_ranges() {
        let mut rng = SmallRng::seed_from_u64(8);
        let cars = init_traffic(&mut rng, 1000.0);
        assert_eq!(cars.len(), MAX_TRAFFIC_CARS);
        for car in &cars {
            assert!((-0.8..=0.8).contains(&car.offset));
            assert!((200.0..=700.0).contains(&car.speed));
            assert!(car.z >= 0.0 && car.z < TOTAL_SEGMENTS as f32 * SEGMENT_LENGTH);
        }
        assert_eq!(cars[1].color, TRAFFIC_COLORS[1]);
    }

    #[test]
    fn test_competitors_start_ahead() {
        let mut rng = SmallRng::seed_from_u64(8);
        let grid = init_competitors(&mut rng, 800.0);
        assert_eq!(grid.len(), NUM_COMPETITORS);
        assert!(grid.iter().all(|c| c.z > 800.0 && c.lap() == 1 && c.speed == 0.0));
    }

    #[test]
    fn test_traffic_palette_matches_packing() {
        assert_eq!(TRAFFIC_COLORS[4], Rgb565::rgb(255, 140, 0));
        assert_eq!(TRAFFIC_COLORS[9], Rgb565::rgb(100, 96, 192));
        // slate blue leans blue, the grey is neutral
        let (r, g, b) = TRAFFIC_COLORS[9].channels();
        assert!(b > r && b > g);
        let (r, g, b) = TRAFFIC_COLORS[2].channels();
        assert!(r == g && g == b);
    }
}
