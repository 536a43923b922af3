//! Last-location bookkeeping for motion detection.

use crate::tracker::geometry::BoundingBox;

/// Candidate moving region produced by a background-subtraction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBlob {
    pub bbox: BoundingBox,
    /// Contour area in square pixels
    pub area: f64,
}

#[derive(Debug, Clone)]
pub struct MotionTrackerConfig {
    /// Blobs with an area at or below this are ignored
    pub min_area: f64,
    /// Highlight the last location only on frames without a detection
    pub highlight_stale_only: bool,
}

impl Default for MotionTrackerConfig {
    fn default() -> Self {
        Self {
            min_area: 8000.0,
            highlight_stale_only: false,
        }
    }
}

/// Outcome of one motion frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionUpdate {
    /// Boxes of the blobs that passed the area filter
    pub detections: Vec<BoundingBox>,
    /// Last known location to highlight on this frame
    pub highlight: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    config: MotionTrackerConfig,
    last_location: Option<BoundingBox>,
}

impl MotionTracker {
    pub fn new(config: MotionTrackerConfig) -> Self {
        Self {
            config,
            last_location: None,
        }
    }

    pub fn last_location(&self) -> Option<BoundingBox> {
        self.last_location
    }

    pub fn update(&mut self, blobs: &[MotionBlob]) -> MotionUpdate {
        let detections: Vec<BoundingBox> = blobs
            .iter()
            .filter(|b| b.area > self.config.min_area)
            .map(|b| b.bbox)
            .collect();

        // Later contours win, matching the scan order of the detector.
        if let Some(&last) = detections.last() {
            self.last_location = Some(last);
        }

        let highlight = if self.config.highlight_stale_only && !detections.is_empty() {
            None
        } else {
            self.last_location
        };

        MotionUpdate {
            detections,
            highlight,
        }
    }

    pub fn reset(&mut self) {
        self.last_location = None;
    }
}

/// Console line describing a highlighted location.
pub fn position_report(bbox: &BoundingBox) -> String {
    format!(
        "Last Tracked Position: X={}, Y={}, Width={}, Height={}",
        bbox.x, bbox.y, bbox.width, bbox.height
    )
}
