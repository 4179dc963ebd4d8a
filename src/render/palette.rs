//! Time-of-day colour tables

use crate::rasterizer::Rgb565;
use crate::settings::TimeOfDay;

/// Colours for the sky, ground, road and fog of one time of day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Top, middle and horizon bands of the sky gradient
    pub sky: [Rgb565; 3],
    pub grass_light: Rgb565,
    pub grass_dark: Rgb565,
    pub road_light: Rgb565,
    pub road_dark: Rgb565,
    pub rumble_light: Rgb565,
    pub rumble_dark: Rgb565,
    pub lane: Rgb565,
    pub fog: Rgb565,
}

const DAY: Palette = Palette {
    sky: [Rgb565::rgb(115, 185, 255), Rgb565::rgb(80, 140, 230), Rgb565::rgb(50, 100, 200)],
    grass_light: Rgb565::rgb(16, 200, 16),
    grass_dark: Rgb565::rgb(0, 154, 0),
    road_light: Rgb565::rgb(107, 107, 107),
    road_dark: Rgb565::rgb(105, 105, 105),
    rumble_light: Rgb565::WHITE,
    rumble_dark: Rgb565::RED,
    lane: Rgb565::rgb(204, 204, 204),
    fog: Rgb565::rgb(180, 215, 255),
};

const SUNSET: Palette = Palette {
    sky: [Rgb565::rgb(255, 140, 60), Rgb565::rgb(255, 90, 30), Rgb565::rgb(140, 30, 10)],
    grass_light: Rgb565::rgb(80, 120, 20),
    grass_dark: Rgb565::rgb(50, 80, 10),
    road_light: Rgb565::rgb(95, 85, 80),
    road_dark: Rgb565::rgb(85, 75, 70),
    rumble_light: Rgb565::rgb(240, 200, 150),
    rumble_dark: Rgb565::rgb(200, 50, 30),
    lane: Rgb565::rgb(200, 180, 140),
    fog: Rgb565::rgb(200, 120, 60),
};

const NIGHT: Palette = Palette {
    sky: [Rgb565::rgb(10, 15, 50), Rgb565::rgb(5, 8, 30), Rgb565::rgb(0, 2, 15)],
    grass_light: Rgb565::rgb(0, 60, 15),
    grass_dark: Rgb565::rgb(0, 40, 8),
    road_light: Rgb565::rgb(55, 55, 65),
    road_dark: Rgb565::rgb(45, 45, 55),
    rumble_light: Rgb565::rgb(100, 100, 120),
    rumble_dark: Rgb565::rgb(80, 10, 10),
    lane: Rgb565::rgb(110, 110, 130),
    fog: Rgb565::rgb(15, 15, 40),
};

impl Palette {
    pub fn for_time(time: TimeOfDay) -> Self {
        match time {
            TimeOfDay::Day => DAY,
            TimeOfDay::Sunset => SUNSET,
            TimeOfDay::Night => NIGHT,
        }
    }

    /// Grass, road and rumble colours for a light or dark stripe
    pub fn stripe(&self, light: bool) -> (Rgb565, Rgb565, Rgb565) {
        if light {
            (self.grass_light, self.road_light, self.rumble_light)
        } else {
            (self.grass_dark, self.road_dark, self.rumble_dark)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_are_distinct() {
        let day = Palette::for_time(TimeOfDay::Day);
        let sunset = Palette::for_time(TimeOfDay::Sunset);
        let night = Palette::for_time(TimeOfDay::Night);
        assert_ne!(day, sunset);
        assert_ne!(sunset, night);
        assert_eq!(day.rumble_dark, Rgb565::RED);
        assert_eq!(night.fog, Rgb565::rgb(15, 15, 40));
    }

    #[test]
    fn test_stripe_alternates() {
        let day = Palette::for_time(TimeOfDay::Day);
        assert_eq!(day.stripe(true).2, Rgb565::WHITE);
        assert_eq!(day.stripe(false).2, Rgb565::RED);
        assert_eq!(day.stripe(false).0, day.grass_dark);
    }
}
