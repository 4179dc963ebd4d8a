//! Cars: flat-shaded polygon models for traffic and rivals, and the
//! player's car in either polygon or textured-mesh form

use tracing::{info, warn};

use crate::config::*;
use crate::physics::SimulationState;
use crate::rasterizer::{edge_cross, render_mesh, DrawSurface, Mesh, MeshView, Rgb565, Texture, Vec3};
use crate::settings::{CarStyle, RaceConfig};

/// Shading role of a face; each picks a tone of the body colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shade {
    Hood,
    Body,
    Dark,
    Glass,
    Grill,
}

impl Shade {
    fn color(self, body: Rgb565) -> Rgb565 {
        match self {
            Shade::Hood => body,
            Shade::Body => body.darken(0.85),
            Shade::Dark => body.darken(0.65),
            Shade::Glass => Rgb565::rgb(80, 180, 255),
            Shade::Grill => Rgb565::rgb(30, 30, 30),
        }
    }
}

/// Model units: x across, y up, z along the car with -z towards the camera
const CAR_VERTS: [[f32; 3]; 16] = [
    // chassis
    [-18.0, 3.0, -40.0],
    [18.0, 3.0, -40.0],
    [18.0, 0.0, 40.0],
    [-18.0, 0.0, 40.0],
    [-18.0, 11.0, -40.0],
    [18.0, 11.0, -40.0],
    [20.0, 10.0, 40.0],
    [-20.0, 10.0, 40.0],
    // cabin
    [-15.0, 11.0, -13.0],
    [15.0, 11.0, -13.0],
    [17.0, 11.0, 21.0],
    [-17.0, 11.0, 21.0],
    [-12.0, 21.0, -4.0],
    [12.0, 21.0, -4.0],
    [12.0, 20.0, 13.0],
    [-12.0, 20.0, 13.0],
];

/// Faces in draw order, far parts first; front-facing when the screen
/// winding is positive
const CAR_FACES: [([usize; 4], Shade); 11] = [
    ([6, 7, 3, 2], Shade::Dark),
    ([14, 15, 11, 10], Shade::Grill),
    ([7, 6, 5, 4], Shade::Hood),
    ([7, 4, 0, 3], Shade::Body),
    ([5, 6, 2, 1], Shade::Body),
    ([15, 14, 13, 12], Shade::Hood),
    ([13, 14, 10, 9], Shade::Body),
    ([15, 12, 8, 11], Shade::Body),
    ([12, 13, 9, 8], Shade::Glass),
    ([0, 1, 2, 3], Shade::Dark),
    ([4, 5, 1, 0], Shade::Grill),
];

/// Rear wing: two posts and the blade
const SPOILER_VERTS: [[f32; 3]; 14] = [
    [-22.0, 17.0, -40.0],
    [22.0, 17.0, -40.0],
    [22.0, 17.0, -32.0],
    [-22.0, 17.0, -32.0],
    [-22.0, 15.0, -40.0],
    [22.0, 15.0, -40.0],
    [-14.0, 11.0, -38.0],
    [-11.0, 11.0, -38.0],
    [-11.0, 15.0, -38.0],
    [-14.0, 15.0, -38.0],
    [11.0, 11.0, -38.0],
    [14.0, 11.0, -38.0],
    [14.0, 15.0, -38.0],
    [11.0, 15.0, -38.0],
];

const SPOILER_FACES: [([usize; 4], Shade); 4] = [
    ([9, 8, 7, 6], Shade::Grill),
    ([13, 12, 11, 10], Shade::Grill),
    ([3, 2, 1, 0], Shade::Body),
    ([0, 1, 5, 4], Shade::Dark),
];

/// Where a car stands: its ground point on screen, the perspective scale
/// there and its heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarPose {
    pub x: i32,
    pub y: i32,
    pub scale: f32,
    pub yaw: f32,
}

/// Projects model vertices around a car's ground point
struct CarProjector {
    /// Camera-space position of the ground point
    origin: Vec3,
    depth: f32,
    cos: f32,
    sin: f32,
}

impl CarProjector {
    fn new(pose: &CarPose, depth: f32) -> Option<Self> {
        if !(pose.scale > 0.0) || !pose.scale.is_finite() {
            return None;
        }
        let s = pose.scale;
        let origin = Vec3::new(
            (pose.x - SCREEN_CX) as f32 / (s * SCREEN_CX as f32),
            (SCREEN_CY - pose.y) as f32 / (s * SCREEN_CY as f32),
            depth / s,
        );
        Some(Self {
            origin,
            depth,
            cos: pose.yaw.cos(),
            sin: pose.yaw.sin(),
        })
    }

    fn project(&self, v: [f32; 3]) -> Option<(f32, f32)> {
        let rx = v[0] * self.cos - v[2] * self.sin;
        let rz = v[0] * self.sin + v[2] * self.cos;
        let z = self.origin.z + rz * CAR_MODEL_DEPTH_SCALE;
        // keep well clear of the camera plane
        if z <= self.depth * 2.0 {
            return None;
        }
        let s = self.depth / z;
        let x = SCREEN_CX as f32 + s * (self.origin.x + rx * CAR_MODEL_SCALE) * SCREEN_CX as f32;
        let y = SCREEN_CY as f32 - s * (self.origin.y + v[1] * CAR_MODEL_SCALE) * SCREEN_CY as f32;
        Some((x, y))
    }
}

fn draw_faces<S: DrawSurface + ?Sized>(
    fb: &mut S,
    points: &[(f32, f32)],
    faces: &[([usize; 4], Shade)],
    body: Rgb565,
) {
    let height = fb.height() as f32;
    for &(corners, shade) in faces {
        let [a, b, c, d] = corners.map(|i| points[i]);
        let cross = edge_cross(
            Vec3::new(a.0, a.1, 0.0),
            Vec3::new(b.0, b.1, 0.0),
            Vec3::new(c.0, c.1, 0.0),
        );
        if cross <= 0.0 {
            continue;
        }
        let top = a.1.min(b.1).min(c.1).min(d.1);
        let bottom = a.1.max(b.1).max(c.1).max(d.1);
        if bottom < 0.0 || top > height {
            continue;
        }
        let q = [a, b, c, d].map(|(x, y)| (x as i32, y as i32));
        fb.fill_quad(q, shade.color(body));
    }
}

/// Flat-shaded polygon car; the spoiler marks the player's car
pub fn draw_polygon_car<S: DrawSurface + ?Sized>(fb: &mut S, pose: &CarPose, depth: f32, body: Rgb565, spoiler: bool) {
    // under two pixels wide there is nothing to see
    if pose.scale * 40.0 * CAR_MODEL_SCALE * (SCREEN_CX as f32) < 2.0 {
        return;
    }
    if pose.y < 0 || pose.y >= SCREEN_HEIGHT + SCREEN_HEIGHT / 2 {
        return;
    }
    let Some(projector) = CarProjector::new(pose, depth) else {
        return;
    };
    let Some(body_points) = CAR_VERTS.iter().map(|&v| projector.project(v)).collect::<Option<Vec<_>>>() else {
        return;
    };
    draw_faces(fb, &body_points, &CAR_FACES, body);

    if spoiler {
        if let Some(wing) = SPOILER_VERTS.iter().map(|&v| projector.project(v)).collect::<Option<Vec<_>>>() {
            draw_faces(fb, &wing, &SPOILER_FACES, body);
        }
    }
}

/// Body colour of the player's polygon car
pub const PLAYER_COLOR: Rgb565 = Rgb565::rgb(220, 20, 20);

/// Road pitch blending per frame
const PITCH_SMOOTHING: f32 = 0.15;
/// Segments ahead sampled for the road slope
const SLOPE_SAMPLES: usize = 6;

/// The player's car model and the smoothed road pitch it follows
pub struct PlayerCar {
    pub style: CarStyle,
    mesh: Mesh,
    texture: Texture,
    smooth_pitch: f32,
}

impl PlayerCar {
    /// Load car assets named in the race settings, falling back to the
    /// built-in model and livery
    pub fn load(config: &RaceConfig) -> Self {
        let builtin = Mesh::builtin_car();
        let mesh = match &config.car_mesh {
            Some(path) => match Mesh::from_obj_file(path) {
                Ok(mesh) => {
                    info!(path = %path.display(), faces = mesh.faces.len(), "loaded car mesh");
                    mesh.fitted(builtin.radius())
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "car mesh unavailable, using built-in model");
                    builtin
                }
            },
            None => builtin,
        };
        let texture = match &config.car_texture {
            Some(path) => Texture::from_file(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "car texture unavailable, using built-in livery");
                Texture::livery(PLAYER_COLOR)
            }),
            None => Texture::livery(PLAYER_COLOR),
        };
        Self {
            style: config.car_style,
            mesh,
            texture,
            smooth_pitch: 0.0,
        }
    }

    /// Ease the model pitch towards the slope of the road just ahead
    fn follow_road_pitch(&mut self, state: &SimulationState) {
        let idx = state.track.index_at(state.player_car_z());
        let y0 = state.track.get(idx).elevation;
        let y1 = state.track.get(idx + SLOPE_SAMPLES).elevation;
        let slope = (y1 - y0) / (SEGMENT_LENGTH * SLOPE_SAMPLES as f32);
        let road_pitch = (slope.atan() * 0.2).clamp(-0.25, 0.25);
        self.smooth_pitch += (road_pitch - self.smooth_pitch) * PITCH_SMOOTHING;
    }

    /// Draw the car at the bottom centre of the screen
    pub fn draw<S: DrawSurface + ?Sized>(&mut self, fb: &mut S, state: &SimulationState) {
        self.follow_road_pitch(state);
        match self.style {
            CarStyle::Textured => {
                let view = MeshView {
                    center_x: SCREEN_CX as f32,
                    center_y: (SCREEN_HEIGHT - 40) as f32,
                    yaw: state.player.x * 0.5,
                    pitch: 0.28 + self.smooth_pitch,
                    distance: 6.5,
                    focal: 130.0,
                    y_offset: 0.5,
                };
                render_mesh(fb, &self.mesh, &self.texture, &view);
            }
            CarStyle::Polygon => {
                let pose = CarPose {
                    x: SCREEN_CX,
                    y: SCREEN_HEIGHT - PLAYER_CAR_LIFT,
                    scale: PLAYER_CAR_SCALE,
                    yaw: state.player.drift_angle,
                };
                draw_polygon_car(fb, &pose, state.rig.depth, PLAYER_COLOR, true);
            }
        }
    }

    /// Slowly spinning car for the title screen
    pub fn draw_turntable<S: DrawSurface + ?Sized>(&self, fb: &mut S, center_x: i32, center_y: i32, time: f32) {
        let view = MeshView {
            center_x: center_x as f32,
            center_y: center_y as f32,
            yaw: time * 1.5,
            pitch: 0.5,
            distance: 5.0,
            focal: 130.0,
            y_offset: 0.5,
        };
        render_mesh(fb, &self.mesh, &self.texture, &view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::CameraRig;
    use crate::rasterizer::Framebuffer;

    fn blank() -> Framebuffer {
        let mut fb = Framebuffer::new(SCREEN_WIDTH as usize, SCREEN_HEIGHT as usize);
        fb.clear(Rgb565::BLACK);
        fb
    }

    fn lit(fb: &Framebuffer) -> usize {
        fb.pixels.iter().filter(|&&p| p != 0).count()
    }

    #[test]
    fn test_projector_round_trips_the_ground_point() {
        let depth = CameraRig::new().depth;
        let pose = CarPose { x: 200, y: 150, scale: 0.0004, yaw: 0.0 };
        let p = CarProjector::new(&pose, depth).expect("valid pose");
        let (x, y) = p.project([0.0, 0.0, 0.0]).expect("in front");
        assert!((x - 200.0).abs() < 0.5);
        assert!((y - 150.0).abs() < 0.5);
        assert!(CarProjector::new(&CarPose { scale: 0.0, ..pose }, depth).is_none());
    }

    #[test]
    fn test_rear_and_top_are_visible_from_behind() {
        let depth = CameraRig::new().depth;
        let pose = CarPose { x: 160, y: 200, scale: 0.0006, yaw: 0.0 };
        let mut fb = blank();
        draw_polygon_car(&mut fb, &pose, depth, Rgb565::BLUE, false);
        // rear grill faces the camera
        assert_eq!(fb.get_pixel(160, 207), Shade::Grill.color(Rgb565::BLUE));
        assert!(lit(&fb) > 200);
        // the car sits on its ground point
        assert_eq!(fb.get_pixel(160, 215), Rgb565::BLACK);
    }

    #[test]
    fn test_spoiler_adds_pixels() {
        let depth = CameraRig::new().depth;
        let pose = CarPose { x: SCREEN_CX, y: SCREEN_HEIGHT - PLAYER_CAR_LIFT, scale: PLAYER_CAR_SCALE, yaw: 0.0 };
        let mut plain = blank();
        let mut winged = blank();
        draw_polygon_car(&mut plain, &pose, depth, PLAYER_COLOR, false);
        draw_polygon_car(&mut winged, &pose, depth, PLAYER_COLOR, true);
        assert!(lit(&winged) > lit(&plain));
        // the whole car fits on screen
        for x in 0..SCREEN_WIDTH as usize {
            assert_eq!(plain.get_pixel(x, 0), Rgb565::BLACK);
        }
    }

    #[test]
    fn test_tiny_or_invalid_cars_are_skipped() {
        let depth = CameraRig::new().depth;
        let mut fb = blank();
        draw_polygon_car(&mut fb, &CarPose { x: 160, y: 130, scale: 0.000001, yaw: 0.0 }, depth, Rgb565::WHITE, false);
        draw_polygon_car(&mut fb, &CarPose { x: 160, y: 130, scale: f32::NAN, yaw: 0.0 }, depth, Rgb565::WHITE, false);
        draw_polygon_car(&mut fb, &CarPose { x: 160, y: -5, scale: 0.001, yaw: 0.0 }, depth, Rgb565::WHITE, false);
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_missing_assets_fall_back() {
        let config = RaceConfig {
            car_mesh: Some("/nonexistent/car.obj".into()),
            car_texture: Some("/nonexistent/car.png".into()),
            ..RaceConfig::default()
        };
        let car = PlayerCar::load(&config);
        assert_eq!(car.mesh.faces.len(), Mesh::builtin_car().faces.len());
        assert_eq!(car.texture.name, "livery");
    }
}
