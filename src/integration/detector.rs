//! Trait for motion detection backends.

use crate::tracker::MotionBlob;

/// Trait for background-subtraction backends.
///
/// Implement this trait to feed any moving-region detector into a
/// [`MotionLoop`](super::MotionLoop).
///
/// # Example
///
/// ```ignore
/// use clicktrack::{MotionBlob, MotionDetector};
///
/// struct FrameDiff {
///     // Previous frame here
/// }
///
/// impl MotionDetector for FrameDiff {
///     type Frame = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Vec<u8>) -> Result<Vec<MotionBlob>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait MotionDetector {
    type Frame;

    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Update the background model with `frame` and return the moving regions.
    ///
    /// # Returns
    /// One blob per external contour of the foreground mask, in scan order.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<MotionBlob>, Self::Error>;
}
