//! Scene rendering on top of the rasterizer
//!
//! Each frame is drawn in layers: sky, then the road scene (projection,
//! tunnels, buildings, road bands, props and cars), then the player's car,
//! then the HUD and overlays.

mod building;
mod hud;
mod palette;
mod projection;
mod road;
mod scenery;
mod sky;
mod vehicles;

pub use hud::*;
pub use palette::*;
pub use projection::*;
pub use road::{draw_road, TUNNEL_GLOOM};
pub use sky::*;
pub use vehicles::{draw_polygon_car, CarPose, PlayerCar, PLAYER_COLOR};
