//! Tracker session: the lifecycle of one tracker bound to one selected region.

use std::fmt;
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::tracker::fps::FpsCounter;
use crate::tracker::geometry::{BoundingBox, Point, Region};
use crate::tracker::object_tracker::ObjectTracker;
use crate::tracker::session_state::SessionState;

/// Label attached to every tracked object record.
pub const TRACKED_OBJECT_LABEL: &str = "Tracking object";

/// Failure to start tracking a region.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("invalid rectangle size {width}x{height}, please select a valid rectangle")]
    DegenerateRegion { width: i32, height: i32 },
    #[error("tracker already initialized")]
    AlreadyTracking,
    #[error("tracker rejected the region: {0}")]
    TrackerInitFailure(String),
}

/// Failure to follow the target in a new frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LostError {
    #[error("tracker lost the object")]
    NotFound,
    #[error("tracker failed during update: {0}")]
    Failed(String),
    #[error("no tracker is active")]
    NotTracking,
}

/// Telemetry record for the tracked object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedObjectInfo {
    pub label: &'static str,
    pub first_detected_coordinates: Point,
    pub last_detected_coordinates: Point,
    pub fps: u32,
}

impl TrackedObjectInfo {
    fn from_region(region: &Region) -> Self {
        Self {
            label: TRACKED_OBJECT_LABEL,
            first_detected_coordinates: region.start,
            last_detected_coordinates: region.end,
            fps: 0,
        }
    }
}

/// One-line record layout scraped from the console by downstream tooling.
impl fmt::Display for TrackedObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.first_detected_coordinates;
        let last = self.last_detected_coordinates;
        write!(
            f,
            "{{'object': '{}', 'first_detected_coordinates': ({}, {}), 'last_detected_coordinates': ({}, {}), 'fps': {}}}",
            self.label, first.x, first.y, last.x, last.y, self.fps
        )
    }
}

/// Result of a successful tracker update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackUpdate {
    pub bbox: BoundingBox,
    /// Whether FPS and telemetry were refreshed on this update.
    pub refreshed: bool,
}

/// Owns a tracking backend and the state of the object it follows.
pub struct TrackerSession<T: ObjectTracker> {
    tracker: T,
    state: SessionState,
    region: Option<Region>,
    info: Option<TrackedObjectInfo>,
    last_box: Option<BoundingBox>,
    fps: FpsCounter,
}

impl<T: ObjectTracker> TrackerSession<T> {
    pub fn new(tracker: T) -> Self {
        Self {
            tracker,
            state: SessionState::Idle,
            region: None,
            info: None,
            last_box: None,
            fps: FpsCounter::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == SessionState::Tracking
    }

    /// Region the current tracker was initialized with.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn info(&self) -> Option<&TrackedObjectInfo> {
        self.info.as_ref()
    }

    /// Box reported by the most recent successful update.
    pub fn last_box(&self) -> Option<BoundingBox> {
        self.last_box
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// A new selection gesture started; any active target is abandoned.
    pub fn begin_selection(&mut self) {
        if self.state == SessionState::Tracking {
            debug!("selection started while tracking, releasing current target");
        }
        self.clear();
        self.state = SessionState::Selecting;
    }

    /// Bind the tracker to `region` in `frame`.
    ///
    /// A degenerate region or an active target leaves the session untouched.
    /// A backend rejection leaves the session `Idle`.
    pub fn initialize(
        &mut self,
        frame: &T::Frame,
        region: Region,
        now: Instant,
    ) -> Result<(), InitError> {
        if !self.state.accepts_selection() {
            return Err(InitError::AlreadyTracking);
        }
        if region.is_degenerate() {
            return Err(InitError::DegenerateRegion {
                width: region.width(),
                height: region.height(),
            });
        }

        if let Err(e) = self.tracker.init(frame, region.bounding_box()) {
            self.reset();
            return Err(InitError::TrackerInitFailure(e.to_string()));
        }

        self.info = Some(TrackedObjectInfo::from_region(&region));
        self.region = Some(region);
        self.last_box = None;
        self.fps.start(now);
        self.state = SessionState::Tracking;

        info!(
            "tracker initialized on ({}, {}) -> ({}, {})",
            region.start.x, region.start.y, region.end.x, region.end.y
        );
        Ok(())
    }

    /// Follow the target into `frame`.
    ///
    /// On failure the session moves to `Lost` and accepts a new selection.
    pub fn update(&mut self, frame: &T::Frame, now: Instant) -> Result<TrackUpdate, LostError> {
        if self.state != SessionState::Tracking {
            return Err(LostError::NotTracking);
        }

        let bbox = match self.tracker.update(frame) {
            Ok(Some(bbox)) => bbox,
            Ok(None) => return Err(self.lose(LostError::NotFound)),
            Err(e) => return Err(self.lose(LostError::Failed(e.to_string()))),
        };

        let refreshed = self.fps.tick(now);
        if let Some(info) = self.info.as_mut() {
            info.last_detected_coordinates = bbox.bottom_right();
            if refreshed {
                info.fps = self.fps.fps();
            }
        }
        self.last_box = Some(bbox);

        Ok(TrackUpdate { bbox, refreshed })
    }

    /// Drop all tracking state and return to `Idle`.
    pub fn reset(&mut self) {
        self.clear();
        self.state = SessionState::Idle;
    }

    fn lose(&mut self, error: LostError) -> LostError {
        warn!("{error}, select a new region to resume tracking");
        self.clear();
        self.state = SessionState::Lost;
        error
    }

    fn clear(&mut self) {
        self.region = None;
        self.info = None;
        self.last_box = None;
        self.fps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Debug, Error)]
    #[error("mock backend failure")]
    struct MockError;

    #[derive(Default)]
    struct MockTracker {
        reject_init: bool,
        inits: usize,
        updates: VecDeque<Option<BoundingBox>>,
    }

    impl ObjectTracker for MockTracker {
        type Frame = ();
        type Error = MockError;

        fn init(&mut self, _frame: &(), _bbox: BoundingBox) -> Result<(), MockError> {
            if self.reject_init {
                return Err(MockError);
            }
            self.inits += 1;
            Ok(())
        }

        fn update(&mut self, _frame: &()) -> Result<Option<BoundingBox>, MockError> {
            self.updates.pop_front().ok_or(MockError)
        }
    }

    fn region(x1: i32, y1: i32, x2: i32, y2: i32) -> Region {
        Region::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_initialize_records_region_corners() {
        let mut session = TrackerSession::new(MockTracker::default());
        session
            .initialize(&(), region(10, 10, 110, 60), Instant::now())
            .unwrap();

        let info = session.info().unwrap();
        assert_eq!(session.state(), SessionState::Tracking);
        assert_eq!(info.label, TRACKED_OBJECT_LABEL);
        assert_eq!(info.first_detected_coordinates, Point::new(10, 10));
        assert_eq!(info.last_detected_coordinates, Point::new(110, 60));
        assert_eq!(info.fps, 0);
    }

    #[test]
    fn test_degenerate_region_leaves_state_unchanged() {
        let mut session = TrackerSession::new(MockTracker::default());
        session.begin_selection();

        let err = session
            .initialize(&(), region(50, 50, 50, 50), Instant::now())
            .unwrap_err();

        assert_eq!(err, InitError::DegenerateRegion { width: 0, height: 0 });
        assert_eq!(session.state(), SessionState::Selecting);
        assert_eq!(session.tracker().inits, 0);
        assert!(session.info().is_none());
    }

    #[test]
    fn test_init_rejected_by_backend_returns_to_idle() {
        let tracker = MockTracker {
            reject_init: true,
            ..Default::default()
        };
        let mut session = TrackerSession::new(tracker);
        session.begin_selection();

        let err = session
            .initialize(&(), region(0, 0, 20, 20), Instant::now())
            .unwrap_err();

        assert!(matches!(err, InitError::TrackerInitFailure(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_second_initialize_is_refused_while_tracking() {
        let mut session = TrackerSession::new(MockTracker::default());
        let now = Instant::now();
        session.initialize(&(), region(0, 0, 20, 20), now).unwrap();

        let err = session
            .initialize(&(), region(30, 30, 60, 60), now)
            .unwrap_err();

        assert_eq!(err, InitError::AlreadyTracking);
        assert_eq!(session.region(), Some(&region(0, 0, 20, 20)));
        assert_eq!(session.tracker().inits, 1);
    }

    #[test]
    fn test_update_moves_last_coordinates_to_bottom_right() {
        let mut tracker = MockTracker::default();
        tracker.updates.push_back(Some(BoundingBox::new(12, 14, 100, 50)));
        let mut session = TrackerSession::new(tracker);

        let t0 = Instant::now();
        session.initialize(&(), region(10, 10, 110, 60), t0).unwrap();
        let update = session.update(&(), t0 + Duration::from_millis(125)).unwrap();

        assert!(update.refreshed);
        assert_eq!(update.bbox, BoundingBox::new(12, 14, 100, 50));
        let info = session.info().unwrap();
        assert_eq!(info.last_detected_coordinates, Point::new(112, 64));
        assert_eq!(info.fps, 8);
        assert_eq!(info.first_detected_coordinates, Point::new(10, 10));
    }

    #[test]
    fn test_same_instant_updates_keep_fps() {
        let mut tracker = MockTracker::default();
        tracker.updates.push_back(Some(BoundingBox::new(0, 0, 20, 20)));
        tracker.updates.push_back(Some(BoundingBox::new(2, 0, 20, 20)));
        tracker.updates.push_back(Some(BoundingBox::new(4, 0, 20, 20)));
        let mut session = TrackerSession::new(tracker);

        let t0 = Instant::now();
        let t = t0 + Duration::from_millis(500);
        session.initialize(&(), region(0, 0, 20, 20), t0).unwrap();

        let first = session.update(&(), t).unwrap();
        let fps_first = session.info().unwrap().fps;
        let second = session.update(&(), t).unwrap();
        let fps_second = session.info().unwrap().fps;

        assert!(first.refreshed);
        assert!(!second.refreshed);
        assert_eq!(fps_first, 2);
        assert_eq!(fps_first, fps_second);
        // Coordinates still follow the box on a stale frame.
        assert_eq!(
            session.info().unwrap().last_detected_coordinates,
            Point::new(22, 20)
        );

        session.update(&(), t + Duration::from_millis(250)).unwrap();
        assert_eq!(session.info().unwrap().fps, 4);
    }

    #[test]
    fn test_lost_target_allows_new_selection() {
        let mut tracker = MockTracker::default();
        tracker.updates.push_back(None);
        let mut session = TrackerSession::new(tracker);

        let now = Instant::now();
        session.initialize(&(), region(0, 0, 20, 20), now).unwrap();
        assert_eq!(session.update(&(), now).unwrap_err(), LostError::NotFound);
        assert_eq!(session.state(), SessionState::Lost);
        assert!(session.last_box().is_none());

        session.initialize(&(), region(5, 5, 30, 30), now).unwrap();
        assert_eq!(session.state(), SessionState::Tracking);
        assert_eq!(session.tracker().inits, 2);
    }

    #[test]
    fn test_backend_error_counts_as_lost() {
        let mut session = TrackerSession::new(MockTracker::default());
        let now = Instant::now();
        session.initialize(&(), region(0, 0, 20, 20), now).unwrap();

        let err = session.update(&(), now).unwrap_err();
        assert!(matches!(err, LostError::Failed(_)));
        assert_eq!(session.state(), SessionState::Lost);
    }

    #[test]
    fn test_update_requires_tracking() {
        let mut session = TrackerSession::new(MockTracker::default());
        assert_eq!(
            session.update(&(), Instant::now()).unwrap_err(),
            LostError::NotTracking
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_selection_releases_target() {
        let mut session = TrackerSession::new(MockTracker::default());
        session
            .initialize(&(), region(0, 0, 20, 20), Instant::now())
            .unwrap();

        session.begin_selection();
        assert_eq!(session.state(), SessionState::Selecting);
        assert!(session.info().is_none());
        assert!(session.region().is_none());
    }

    #[test]
    fn test_reset() {
        let mut session = TrackerSession::new(MockTracker::default());
        session
            .initialize(&(), region(0, 0, 20, 20), Instant::now())
            .unwrap();

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.info().is_none());
    }

    #[test]
    fn test_record_layout() {
        let info = TrackedObjectInfo {
            label: TRACKED_OBJECT_LABEL,
            first_detected_coordinates: Point::new(10, 10),
            last_detected_coordinates: Point::new(110, 60),
            fps: 0,
        };
        assert_eq!(
            info.to_string(),
            "{'object': 'Tracking object', 'first_detected_coordinates': (10, 10), 'last_detected_coordinates': (110, 60), 'fps': 0}"
        );
    }
}
