//! Frame annotation for the tracking and motion views.

mod annotator;
mod canvas;

pub use annotator::{Annotator, RenderConfig, TrackingScene};
pub use canvas::{Canvas, Color, DrawCommand, DrawList};
