//! Integration module for connecting capture, display and tracking backends.
//!
//! This module provides the backend traits and the frame loops that drive the
//! tracking and motion views. An OpenCV implementation of every backend trait
//! lives behind the `opencv-backend` feature.

mod capture;
mod detector;
mod motion_loop;
mod pipeline;

pub use capture::{FrameSource, KeyCode, LoopError, LoopExit, LoopSettings, ParseKeyError, Window};
pub use detector::MotionDetector;
pub use motion_loop::MotionLoop;
pub use pipeline::TrackingLoop;

#[cfg(feature = "opencv-backend")]
mod opencv_backend;

#[cfg(feature = "opencv-backend")]
pub use opencv_backend::{
    HighGuiWindow, KcfTracker, Mog2Detector, TemplateMatError, TemplateMatTracker, VideoSource,
};
