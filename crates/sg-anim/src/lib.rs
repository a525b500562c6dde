//! Composition des animations et lecture dans le terminal.

pub mod canvas;
pub mod compositor;
pub mod player;

pub use compositor::{Animation, Container, Disposal, Frame, check_canvas_size};
pub use player::{Playback, Player, StopHandle, StopSignal, spawn_playback, stop_channel};
