//! Click-to-track and motion highlighting for live camera and video streams.
//!
//! The user drags a rectangle (or clicks a point) on the live view, a
//! single-object tracker follows that region from frame to frame, and the view
//! is annotated with the tracked box, its center and the measured update rate.
//! A second mode highlights moving regions found by background subtraction.
//!
//! Capture, display and tracking sit behind the [`FrameSource`], [`Window`],
//! [`ObjectTracker`] and [`MotionDetector`] traits. OpenCV implementations are
//! available with the `opencv-backend` feature.

pub mod config;
pub mod integration;
pub mod render;
pub mod selection;
pub mod tracker;

pub use config::{AppConfig, ConfigError};
pub use integration::{
    FrameSource, KeyCode, LoopError, LoopExit, LoopSettings, MotionDetector, MotionLoop,
    TrackingLoop, Window,
};
pub use render::{Annotator, Canvas, Color, DrawList, RenderConfig};
pub use selection::{PointerEvent, RegionSelector, SelectionMode, SelectionOutcome};
pub use tracker::{
    BoundingBox, MotionBlob, MotionTracker, ObjectTracker, Point, Region, SessionState,
    TemplateTracker, TrackedObjectInfo, TrackerSession,
};
