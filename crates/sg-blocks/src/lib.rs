//! Octant block renderer: 2×4 pixel blocks become one glyph plus two colors.

pub mod glyphs;
pub mod quantize;
pub mod render;

pub use quantize::{Cell, Sample};
pub use render::{render, render_with};
