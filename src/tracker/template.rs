//! Template-matching tracker over grayscale `ndarray` frames.
//!
//! The patch under the initial box is kept as the template. Each update scans a
//! square neighbourhood around the last position for the window with the lowest
//! mean squared difference; a best score above `max_mse` means the target is
//! gone.

use ndarray::{Array2, ArrayView2, s};
use serde::Deserialize;
use thiserror::Error;

use crate::tracker::geometry::BoundingBox;
use crate::tracker::object_tracker::ObjectTracker;

/// Single-channel 8-bit frame, indexed `[row, col]`.
pub type GrayFrame = Array2<u8>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template box {0:?} is empty")]
    EmptyBox(BoundingBox),
    #[error("template box {bbox:?} does not fit in a {cols}x{rows} frame")]
    OutOfBounds {
        bbox: BoundingBox,
        cols: i32,
        rows: i32,
    },
    #[error("template tracker used before init")]
    NotInitialized,
}

/// Configuration for the template tracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Maximum displacement in pixels searched per frame
    pub search_radius: i32,
    /// Best-match score above which the target counts as lost
    pub max_mse: f32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            search_radius: 16,
            max_mse: 2500.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateTracker {
    config: TemplateConfig,
    template: Option<Array2<f32>>,
    position: (i32, i32),
}

impl TemplateTracker {
    pub fn new(config: TemplateConfig) -> Self {
        Self {
            config,
            template: None,
            position: (0, 0),
        }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    fn frame_size(frame: &GrayFrame) -> (i32, i32) {
        let (rows, cols) = frame.dim();
        (cols as i32, rows as i32)
    }

    fn window(frame: &GrayFrame, x: i32, y: i32, w: i32, h: i32) -> ArrayView2<'_, u8> {
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        frame.slice(s![y..y + h, x..x + w])
    }

    fn mean_squared_error(window: ArrayView2<'_, u8>, template: &Array2<f32>) -> f32 {
        let sum: f32 = window
            .iter()
            .zip(template.iter())
            .map(|(&a, &b)| {
                let d = f32::from(a) - b;
                d * d
            })
            .sum();
        sum / template.len() as f32
    }
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(TemplateConfig::default())
    }
}

impl ObjectTracker for TemplateTracker {
    type Frame = GrayFrame;
    type Error = TemplateError;

    fn init(&mut self, frame: &GrayFrame, bbox: BoundingBox) -> Result<(), TemplateError> {
        if bbox.is_empty() {
            return Err(TemplateError::EmptyBox(bbox));
        }
        let (cols, rows) = Self::frame_size(frame);
        if !bbox.fits_within(cols, rows) {
            return Err(TemplateError::OutOfBounds { bbox, cols, rows });
        }

        let patch = Self::window(frame, bbox.x, bbox.y, bbox.width, bbox.height);
        self.template = Some(patch.mapv(f32::from));
        self.position = (bbox.x, bbox.y);
        Ok(())
    }

    fn update(&mut self, frame: &GrayFrame) -> Result<Option<BoundingBox>, TemplateError> {
        let template = self.template.as_ref().ok_or(TemplateError::NotInitialized)?;
        let (th, tw) = template.dim();
        let (tw, th) = (tw as i32, th as i32);
        let (cols, rows) = Self::frame_size(frame);
        if cols < tw || rows < th {
            return Ok(None);
        }

        let r = self.config.search_radius;
        let (px, py) = self.position;
        let (min_x, max_x) = (
            px.saturating_sub(r).max(0),
            px.saturating_add(r).min(cols - tw),
        );
        let (min_y, max_y) = (
            py.saturating_sub(r).max(0),
            py.saturating_add(r).min(rows - th),
        );

        let mut best: Option<(f32, i32, i32)> = None;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let score = Self::mean_squared_error(Self::window(frame, x, y, tw, th), template);
                if best.is_none_or(|(s, _, _)| score < s) {
                    best = Some((score, x, y));
                }
            }
        }

        match best {
            Some((score, x, y)) if score <= self.config.max_mse => {
                self.position = (x, y);
                Ok(Some(BoundingBox::new(x, y, tw, th)))
            }
            _ => Ok(None),
        }
    }
}
