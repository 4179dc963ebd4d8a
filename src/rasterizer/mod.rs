//! 16-bit software rasterizer
//!
//! Features:
//! - RGB565 framebuffer with a vertical clip window
//! - Drawing-surface trait (spans, lines, triangles, circles, ellipses, text)
//! - Built-in 5x7 bitmap font
//! - Affine textured meshes sorted with the painter's algorithm

mod color;
mod font;
mod framebuffer;
mod math;
mod render;
mod surface;
mod types;

pub use color::*;
pub use framebuffer::*;
pub use math::*;
pub use render::*;
pub use surface::*;
pub use types::*;
