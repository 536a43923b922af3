//! Trait for single-object visual tracking backends.

use crate::tracker::geometry::BoundingBox;

/// A single-object tracker that follows one box from frame to frame.
///
/// Implement this trait to plug any tracking algorithm into a
/// [`TrackerSession`](crate::tracker::TrackerSession).
///
/// # Example
///
/// ```ignore
/// use clicktrack::{BoundingBox, ObjectTracker};
///
/// struct MyTracker {
///     // Algorithm state here
/// }
///
/// impl ObjectTracker for MyTracker {
///     type Frame = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn init(&mut self, frame: &Vec<u8>, bbox: BoundingBox) -> Result<(), Self::Error> {
///         Ok(())
///     }
///
///     fn update(&mut self, frame: &Vec<u8>) -> Result<Option<BoundingBox>, Self::Error> {
///         Ok(None)
///     }
/// }
/// ```
pub trait ObjectTracker {
    /// Image type the tracker consumes.
    type Frame;

    /// Error type for backend failures.
    type Error: std::error::Error;

    /// Bind the tracker to `bbox` in `frame`, discarding any previous target.
    fn init(&mut self, frame: &Self::Frame, bbox: BoundingBox) -> Result<(), Self::Error>;

    /// Locate the target in the next frame.
    ///
    /// # Returns
    /// `Some(bbox)` when the target was found, `None` when the tracker lost it,
    /// or an error when the backend itself failed.
    fn update(&mut self, frame: &Self::Frame) -> Result<Option<BoundingBox>, Self::Error>;
}
