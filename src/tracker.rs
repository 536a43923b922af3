mod fps;
mod geometry;
mod motion;
mod object_tracker;
mod session;
mod session_state;
mod template;

pub use fps::{Clock, FpsCounter, SystemClock};
pub use geometry::{BoundingBox, Point, Region};
pub use motion::{MotionBlob, MotionTracker, MotionTrackerConfig, MotionUpdate, position_report};
pub use object_tracker::ObjectTracker;
pub use session::{
    InitError, LostError, TRACKED_OBJECT_LABEL, TrackUpdate, TrackedObjectInfo, TrackerSession,
};
pub use session_state::SessionState;
pub use template::{GrayFrame, TemplateConfig, TemplateError, TemplateTracker};
