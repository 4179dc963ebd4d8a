//! Track data: segments, hand-authored layouts, generation and agents

mod builder;
mod layout;
mod segment;
mod traffic;

pub use builder::{build_from_layout, build_procedural};
pub use layout::*;
pub use segment::*;
pub use traffic::*;
