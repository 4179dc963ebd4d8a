//! Mesh and texture types for the textured car model

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::color::Rgb565;
use super::math::{Vec2, Vec3};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("obj line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("mesh has no faces")]
    Empty,
}

/// A vertex with position and texture coordinate
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub pos: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(pos: Vec3, uv: Vec2) -> Self {
        Self { pos, uv }
    }
}

/// A triangle face (indices into vertex array)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub v0: usize,
    pub v1: usize,
    pub v2: usize,
}

impl Face {
    pub fn new(v0: usize, v1: usize, v2: usize) -> Self {
        Self { v0, v1, v2 }
    }
}

/// RGB565 texture
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgb565>,
    pub name: String,
}

impl Texture {
    /// Load texture from an image file, converting to RGB565
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(&bytes, name)
    }

    /// Decode texture from raw image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, AssetError> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Rgb565> = rgba
            .pixels()
            .map(|p| Rgb565::rgb(p[0], p[1], p[2]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Procedural racing livery used when no texture asset is available
    ///
    /// Rows 0-15 paint the body, 16-29 the glasshouse, 30-31 the tyres.
    pub fn livery(body: Rgb565) -> Self {
        const W: usize = 32;
        const H: usize = 32;
        let stripe = Rgb565::WHITE;
        let trim = body.darken(0.6);
        let glass = Rgb565::rgb(80, 180, 255);
        let frame = Rgb565::rgb(30, 30, 30);
        let mut pixels = Vec::with_capacity(W * H);
        for y in 0..H {
            for x in 0..W {
                let c = match y {
                    0..=1 | 14..=15 => trim,
                    6..=8 if x % 8 != 0 => stripe,
                    0..=15 => body,
                    16..=17 | 28..=29 => frame,
                    16..=29 if x % 16 == 0 => frame,
                    16..=29 => glass.darken(0.7 + (y - 16) as f32 * 0.02),
                    _ => Rgb565::rgb(20, 20, 20),
                };
                pixels.push(c);
            }
        }
        Self { width: W, height: H, pixels, name: "livery".to_string() }
    }

    /// Nearest sample with clamped UVs
    pub fn sample(&self, u: f32, v: f32) -> Rgb565 {
        if self.width == 0 || self.height == 0 {
            return Rgb565::WHITE;
        }
        let tx = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let ty = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn from_obj_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_obj_str(&text)
    }

    /// Parse Wavefront OBJ text (positions, UVs, polygon faces)
    ///
    /// Polygons are fan-triangulated. Each unique position/UV pair becomes
    /// one vertex. Winding is normalized so faces point outward.
    pub fn from_obj_str(text: &str) -> Result<Self, AssetError> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut uvs: Vec<Vec2> = Vec::new();
        let mut mesh = Mesh::default();
        let mut lookup: HashMap<(usize, Option<usize>), usize> = HashMap::new();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let mut parts = raw.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let c = parse_floats(parts, 3, line)?;
                    positions.push(Vec3::new(c[0], c[1], c[2]));
                }
                Some("vt") => {
                    let c = parse_floats(parts, 2, line)?;
                    uvs.push(Vec2::new(c[0], c[1]));
                }
                Some("f") => {
                    let mut corners = Vec::new();
                    for token in parts {
                        let mut refs = token.split('/');
                        let vi = resolve_index(refs.next(), positions.len(), line)?
                            .ok_or_else(|| parse_err(line, "face without position"))?;
                        let ti = resolve_index(refs.next(), uvs.len(), line)?;
                        let idx = *lookup.entry((vi, ti)).or_insert_with(|| {
                            let uv = ti.map(|t| uvs[t]).unwrap_or_default();
                            mesh.vertices.push(Vertex::new(positions[vi], uv));
                            mesh.vertices.len() - 1
                        });
                        corners.push(idx);
                    }
                    if corners.len() < 3 {
                        return Err(parse_err(line, "face needs 3 corners"));
                    }
                    for k in 1..corners.len() - 1 {
                        mesh.faces.push(Face::new(corners[0], corners[k], corners[k + 1]));
                    }
                }
                _ => {}
            }
        }

        if mesh.faces.is_empty() {
            return Err(AssetError::Empty);
        }
        mesh.normalize_winding();
        Ok(mesh)
    }

    /// Flip every face if the mesh encloses negative volume
    pub fn normalize_winding(&mut self) {
        let volume: f32 = self
            .faces
            .iter()
            .map(|f| {
                let a = self.vertices[f.v0].pos;
                let b = self.vertices[f.v1].pos;
                let c = self.vertices[f.v2].pos;
                a.dot(b.cross(c))
            })
            .sum();
        if volume < 0.0 {
            for f in &mut self.faces {
                std::mem::swap(&mut f.v1, &mut f.v2);
            }
        }
    }

    /// Largest extent from the origin, used to fit the model to the screen
    pub fn radius(&self) -> f32 {
        self.vertices.iter().map(|v| v.pos.len()).fold(0.0, f32::max)
    }

    /// Uniformly rescale so the farthest vertex sits at `radius`
    pub fn fitted(mut self, radius: f32) -> Self {
        let current = self.radius();
        if current > 0.0 {
            let k = radius / current;
            for v in &mut self.vertices {
                v.pos = v.pos.scale(k);
            }
        }
        self
    }

    /// Low-poly sports car matching the `Texture::livery` layout
    ///
    /// Nose points toward +z, wheels sit on y = 0.
    pub fn builtin_car() -> Self {
        let mut mesh = Mesh::default();
        let body_uv = [0.0, 0.0, 1.0, 0.5];
        let glass_uv = [0.0, 0.5, 1.0, 0.9];
        let tyre_uv = [0.0, 0.94, 1.0, 1.0];

        // lower body, slightly wedge shaped at the nose
        mesh.push_hexahedron(
            [
                Vec3::new(-0.9, 0.15, -2.0),
                Vec3::new(0.9, 0.15, -2.0),
                Vec3::new(-0.9, 0.6, -2.0),
                Vec3::new(0.9, 0.6, -2.0),
                Vec3::new(-0.95, 0.15, 2.0),
                Vec3::new(0.95, 0.15, 2.0),
                Vec3::new(-0.95, 0.45, 2.0),
                Vec3::new(0.95, 0.45, 2.0),
            ],
            body_uv,
        );
        // cabin, tapered toward the roof
        mesh.push_hexahedron(
            [
                Vec3::new(-0.75, 0.6, -1.1),
                Vec3::new(0.75, 0.6, -1.1),
                Vec3::new(-0.6, 1.05, -0.8),
                Vec3::new(0.6, 1.05, -0.8),
                Vec3::new(-0.8, 0.55, 0.7),
                Vec3::new(0.8, 0.55, 0.7),
                Vec3::new(-0.6, 1.0, 0.3),
                Vec3::new(0.6, 1.0, 0.3),
            ],
            glass_uv,
        );
        for (x, z) in [(-0.85, -1.3), (0.85, -1.3), (-0.85, 1.3), (0.85, 1.3)] {
            let (x0, x1) = if x < 0.0 { (x - 0.12, x + 0.18) } else { (x - 0.18, x + 0.12) };
            mesh.push_box(Vec3::new(x0, 0.0, z - 0.35), Vec3::new(x1, 0.4, z + 0.35), tyre_uv);
        }
        mesh
    }

    fn push_box(&mut self, min: Vec3, max: Vec3, uv: [f32; 4]) {
        let c = |ix: u8, iy: u8, iz: u8| {
            Vec3::new(
                if ix == 0 { min.x } else { max.x },
                if iy == 0 { min.y } else { max.y },
                if iz == 0 { min.z } else { max.z },
            )
        };
        self.push_hexahedron(
            [c(0, 0, 0), c(1, 0, 0), c(0, 1, 0), c(1, 1, 0), c(0, 0, 1), c(1, 0, 1), c(0, 1, 1), c(1, 1, 1)],
            uv,
        );
    }

    /// Six quads from eight corners indexed `x + 2y + 4z`, wound outward
    fn push_hexahedron(&mut self, p: [Vec3; 8], uv: [f32; 4]) {
        const QUADS: [[usize; 4]; 6] = [
            [1, 3, 7, 5], // +x
            [0, 4, 6, 2], // -x
            [2, 6, 7, 3], // +y
            [0, 1, 5, 4], // -y
            [4, 5, 7, 6], // +z
            [0, 2, 3, 1], // -z
        ];
        // uv rect is given in texture rows; store bottom-up like OBJ
        let [u0, v0, u1, v1] = uv;
        let (b0, b1) = (1.0 - v0, 1.0 - v1);
        let corner_uv = [Vec2::new(u0, b1), Vec2::new(u1, b1), Vec2::new(u1, b0), Vec2::new(u0, b0)];
        for quad in QUADS {
            let base = self.vertices.len();
            for (k, &i) in quad.iter().enumerate() {
                self.vertices.push(Vertex::new(p[i], corner_uv[k]));
            }
            self.faces.push(Face::new(base, base + 1, base + 2));
            self.faces.push(Face::new(base, base + 2, base + 3));
        }
    }
}

fn parse_err(line: usize, msg: &str) -> AssetError {
    AssetError::Parse { line, msg: msg.to_string() }
}

fn parse_floats<'a>(
    parts: impl Iterator<Item = &'a str>,
    count: usize,
    line: usize,
) -> Result<Vec<f32>, AssetError> {
    let values: Vec<f32> = parts
        .take(count)
        .map(|p| p.parse::<f32>().map_err(|e| parse_err(line, &e.to_string())))
        .collect::<Result<_, _>>()?;
    if values.len() < count {
        return Err(parse_err(line, "missing coordinate"));
    }
    Ok(values)
}

/// 1-based (or negative relative) OBJ index to a 0-based one
fn resolve_index(token: Option<&str>, len: usize, line: usize) -> Result<Option<usize>, AssetError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_err(line, "bad index"))?;
    let idx = if raw < 0 { len as i64 + raw } else { raw - 1 };
    if idx < 0 || idx >= len as i64 {
        return Err(parse_err(line, "index out of range"));
    }
    Ok(Some(idx as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
# unit square facing +z
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn test_obj_fan_triangulation() {
        let mesh = Mesh::from_obj_str(QUAD_OBJ).expect("parse");
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.vertices[2].uv, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_obj_negative_indices() {
        let mesh = Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").expect("parse");
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_obj_errors() {
        assert!(matches!(Mesh::from_obj_str("v 0 0 0\n"), Err(AssetError::Empty)));
        assert!(matches!(
            Mesh::from_obj_str("v 0 0 0\nf 1 2 3\n"),
            Err(AssetError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            Mesh::from_obj_str("v 0 zero 0\n"),
            Err(AssetError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_builtin_car_winds_outward() {
        let mut mesh = Mesh::builtin_car();
        let before = mesh.faces.clone();
        mesh.normalize_winding();
        assert_eq!(before, mesh.faces);
        assert!(mesh.radius() > 1.5);
    }

    #[test]
    fn test_livery_sample_clamps() {
        let tex = Texture::livery(Rgb565::RED);
        assert_eq!(tex.sample(-5.0, 0.3), tex.sample(0.0, 0.3));
        assert_eq!(tex.sample(0.5, 2.0), tex.pixels[tex.pixels.len() - 1 - 15]);
    }
}
