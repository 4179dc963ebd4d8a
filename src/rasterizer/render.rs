//! Textured mesh rendering
//! Affine-mapped triangles, painter's sort, no depth buffer

use super::color::Rgb565;
use super::math::{barycentric, edge_cross, Vec2, Vec3};
use super::surface::DrawSurface;
use super::types::{Mesh, Texture};

/// Vertices projected outside the screen by more than this drop their face
const SCREEN_MARGIN: f32 = 20.0;
/// Faces wider than this on screen are projection artifacts
const MAX_FACE_WIDTH: f32 = 160.0;
const NEAR_Z: f32 = 0.01;

/// Light direction in model space (above and slightly behind)
const LIGHT_DIR: Vec3 = Vec3::new(0.0, 0.7, -0.7);
const AMBIENT: f32 = 0.35;

/// Where and how a mesh is viewed
#[derive(Debug, Clone, Copy)]
pub struct MeshView {
    pub center_x: f32,
    pub center_y: f32,
    /// Rotation about the vertical axis
    pub yaw: f32,
    /// Camera tilt looking down on the model
    pub pitch: f32,
    /// Camera distance behind the model origin
    pub distance: f32,
    /// Focal length in pixels
    pub focal: f32,
    /// Lowers the model so the wheels sit near the view centre
    pub y_offset: f32,
}

/// Projected surface (triangle ready for rasterization)
struct Surface {
    v1: Vec3,
    v2: Vec3,
    v3: Vec3,
    uv1: Vec2,
    uv2: Vec2,
    uv3: Vec2,
    depth: f32,
    light: f32,
}

/// Lambert term for a model-space face
fn face_light(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let n = (b - a).cross(c - a).normalize();
    AMBIENT + (1.0 - AMBIENT) * n.dot(LIGHT_DIR).max(0.0)
}

/// Model point to screen; `None` when behind the near plane
fn project(p: Vec3, view: &MeshView) -> Option<Vec3> {
    let v = Vec3::new(p.x, p.y - view.y_offset, p.z)
        .rotate_y(-view.yaw)
        .rotate_x(view.pitch);
    let z = v.z + view.distance;
    if z <= NEAR_Z {
        return None;
    }
    Some(Vec3::new(
        view.center_x + v.x * view.focal / z,
        view.center_y - v.y * view.focal / z,
        z,
    ))
}

fn on_screen<S: DrawSurface + ?Sized>(p: Vec3, surface: &S) -> bool {
    p.x >= -SCREEN_MARGIN
        && p.x <= surface.width() as f32 + SCREEN_MARGIN
        && p.y >= -SCREEN_MARGIN
        && p.y <= surface.height() as f32 + SCREEN_MARGIN
}

/// Rasterize a single triangle
fn rasterize_triangle<S: DrawSurface + ?Sized>(fb: &mut S, surface: &Surface, texture: &Texture) {
    let min_x = surface.v1.x.min(surface.v2.x).min(surface.v3.x).max(0.0) as i32;
    let max_x = (surface.v1.x.max(surface.v2.x).max(surface.v3.x) + 1.0).min(fb.width() as f32) as i32;
    let min_y = surface.v1.y.min(surface.v2.y).min(surface.v3.y).max(0.0) as i32;
    let max_y = (surface.v1.y.max(surface.v2.y).max(surface.v3.y) + 1.0).min(fb.height() as f32) as i32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Vec3::new(x as f32, y as f32, 0.0);
            let bc = barycentric(p, surface.v1, surface.v2, surface.v3);

            const ERR: f32 = -0.0001;
            if bc.x >= ERR && bc.y >= ERR && bc.z >= ERR {
                // Affine - linear interpolation in screen space
                let u = bc.x * surface.uv1.x + bc.y * surface.uv2.x + bc.z * surface.uv3.x;
                let v = bc.x * surface.uv1.y + bc.y * surface.uv2.y + bc.z * surface.uv3.y;

                let mut color = texture.sample(u, 1.0 - v);
                if surface.light < 0.99 {
                    color = color.darken(surface.light);
                }
                fb.set_pixel(x, y, color);
            }
        }
    }
}

/// Render a textured mesh back to front
pub fn render_mesh<S: DrawSurface + ?Sized>(fb: &mut S, mesh: &Mesh, texture: &Texture, view: &MeshView) {
    let projected: Vec<Option<Vec3>> = mesh.vertices.iter().map(|v| project(v.pos, view)).collect();

    let mut surfaces: Vec<Surface> = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let (Some(v1), Some(v2), Some(v3)) = (projected[face.v0], projected[face.v1], projected[face.v2]) else {
            continue;
        };

        if !(on_screen(v1, fb) && on_screen(v2, fb) && on_screen(v3, fb)) {
            continue;
        }

        // front faces wind positively once y is flipped to screen space
        if edge_cross(v1, v2, v3) <= 0.0 {
            continue;
        }

        let width = v1.x.max(v2.x).max(v3.x) - v1.x.min(v2.x).min(v3.x);
        if width > MAX_FACE_WIDTH {
            continue;
        }

        let (a, b, c) = (&mesh.vertices[face.v0], &mesh.vertices[face.v1], &mesh.vertices[face.v2]);
        surfaces.push(Surface {
            v1,
            v2,
            v3,
            uv1: a.uv,
            uv2: b.uv,
            uv3: c.uv,
            depth: (v1.z + v2.z + v3.z) / 3.0,
            light: face_light(a.pos, b.pos, c.pos),
        });
    }

    // Painter's algorithm: farthest average depth first
    surfaces.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    for surface in &surfaces {
        rasterize_triangle(fb, surface, texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Framebuffer;

    fn rear_view() -> MeshView {
        MeshView {
            center_x: 160.0,
            center_y: 200.0,
            yaw: 0.0,
            pitch: 0.28,
            distance: 6.5,
            focal: 130.0,
            y_offset: 0.5,
        }
    }

    #[test]
    fn test_car_renders_near_centre() {
        let mut fb = Framebuffer::new(320, 240);
        let mesh = Mesh::builtin_car();
        render_mesh(&mut fb, &mesh, &Texture::livery(Rgb565::RED), &rear_view());
        let lit = fb.pixels.iter().filter(|&&p| p != 0).count();
        assert!(lit > 200, "only {} pixels drawn", lit);
        assert_ne!(fb.get_pixel(160, 200), Rgb565::BLACK);
        assert_eq!(fb.get_pixel(5, 5), Rgb565::BLACK);
    }

    #[test]
    fn test_mesh_behind_camera_is_skipped() {
        let mut fb = Framebuffer::new(320, 240);
        let mut view = rear_view();
        view.distance = -10.0;
        render_mesh(&mut fb, &Mesh::builtin_car(), &Texture::livery(Rgb565::RED), &view);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }
}
