//! Color model, bitmaps, configuration, and errors shared by the semigraph workspace.
//!
//! Everything in here is pure data and arithmetic: no terminal I/O, no decoding.

pub mod bitmap;
pub mod color;
pub mod config;
pub mod error;
pub mod sgr;

pub use bitmap::{Bitmap, PixelLayout};
pub use color::{Channel, Color, Rgb};
pub use config::{BlendSpace, Config, Palette, PlaybackConfig, RenderConfig};
pub use error::CoreError;
