//! Annotation of display frames: crosshair, selection, tracked box and telemetry.

use serde::Deserialize;

use crate::render::canvas::{Canvas, Color};
use crate::selection::SelectionMode;
use crate::tracker::{
    BoundingBox, MotionUpdate, Point, Region, SessionState, TrackUpdate, TrackedObjectInfo,
};

/// Rendering geometry. Lengths in centimeters go through `pixels_per_cm`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub pixels_per_cm: f64,
    /// Full length of each crosshair line
    pub crosshair_cm: f64,
    /// Diameter of the circle marking the tracked center
    pub circle_cm: f64,
    pub thickness: i32,
    pub font_scale: f64,
    /// Label drawn next to motion detections; empty for none
    pub motion_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_cm: 100.0,
            crosshair_cm: 0.5,
            circle_cm: 0.5,
            thickness: 1,
            font_scale: 0.5,
            motion_label: "Moving object".to_string(),
        }
    }
}

/// Everything the tracking view needs to know about the current frame.
#[derive(Debug, Clone, Copy)]
pub struct TrackingScene<'a> {
    pub selection_mode: SelectionMode,
    /// In-progress selection, if a gesture is active
    pub preview: Option<Region>,
    pub state: SessionState,
    /// Result of this frame's tracker update
    pub update: Option<TrackUpdate>,
    pub info: Option<&'a TrackedObjectInfo>,
    /// Frame-rate value to show when not tracking, if refreshed this frame
    pub frame_fps: Option<u32>,
}

/// Stateless annotator for tracking and motion views.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: RenderConfig,
}

impl Annotator {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn cm_to_px(&self, cm: f64) -> i32 {
        (cm * self.config.pixels_per_cm) as i32
    }

    pub fn render_tracking<C: Canvas>(&self, canvas: &mut C, scene: &TrackingScene<'_>) {
        let (cols, rows) = canvas.size();
        self.draw_crosshair(canvas, Point::new(cols / 2, rows / 2), Color::GREEN);

        let tracking = scene.state == SessionState::Tracking;

        if !tracking {
            if let Some(region) = scene.preview {
                self.draw_selection(canvas, scene.selection_mode, &region);
            }
            if let Some(fps) = scene.frame_fps {
                self.text(canvas, &format!("FPS: {fps}"), Point::new(10, 20), Color::GREEN);
            }
            return;
        }

        let Some(update) = scene.update else {
            return;
        };
        let bbox = update.bbox;
        canvas.rectangle(
            bbox.top_left(),
            bbox.bottom_right(),
            Color::RED,
            self.config.thickness,
        );

        if !update.refreshed {
            return;
        }
        if let Some(info) = scene.info {
            self.draw_telemetry(canvas, &bbox, info);
        }
    }

    pub fn render_motion<C: Canvas>(&self, canvas: &mut C, update: &MotionUpdate) {
        for bbox in &update.detections {
            canvas.rectangle(bbox.top_left(), bbox.bottom_right(), Color::GREEN, 2);
            if !self.config.motion_label.is_empty() {
                self.text(
                    canvas,
                    &self.config.motion_label,
                    Point::new(bbox.x, bbox.y - 10),
                    Color::GREEN,
                );
            }
        }

        if let Some(bbox) = update.highlight {
            canvas.rectangle(bbox.top_left(), bbox.bottom_right(), Color::BLUE, 2);
        }
    }

    fn draw_crosshair<C: Canvas>(&self, canvas: &mut C, center: Point, color: Color) {
        let arm = self.cm_to_px(self.config.crosshair_cm) / 2;
        let t = self.config.thickness;
        canvas.line(
            Point::new(center.x - arm, center.y),
            Point::new(center.x + arm, center.y),
            color,
            t,
        );
        canvas.line(
            Point::new(center.x, center.y - arm),
            Point::new(center.x, center.y + arm),
            color,
            t,
        );
    }

    fn draw_selection<C: Canvas>(&self, canvas: &mut C, mode: SelectionMode, region: &Region) {
        let bbox = region.bounding_box();
        match mode {
            SelectionMode::Drag => {
                canvas.rectangle(
                    bbox.top_left(),
                    bbox.bottom_right(),
                    Color::BLUE,
                    self.config.thickness,
                );
            }
            SelectionMode::ClickCenter => {
                canvas.rectangle(
                    bbox.top_left(),
                    bbox.bottom_right(),
                    Color::RED,
                    self.config.thickness,
                );
                self.draw_crosshair(canvas, bbox.center(), Color::GREEN);
            }
        }
    }

    fn draw_telemetry<C: Canvas>(&self, canvas: &mut C, bbox: &BoundingBox, info: &TrackedObjectInfo) {
        let center = bbox.center();
        let radius = self.cm_to_px(self.config.circle_cm) / 2;
        canvas.circle(center, radius, Color::RED, self.config.thickness);

        let last = info.last_detected_coordinates;
        self.text(canvas, &format!("FPS: {}", info.fps), Point::new(10, 20), Color::RED);
        self.text(
            canvas,
            &format!("last_detected_coordinates: ({}, {})", last.x, last.y),
            Point::new(10, 40),
            Color::RED,
        );
        self.text(
            canvas,
            "Object Detected",
            Point::new(bbox.x, bbox.y - 10),
            Color::RED,
        );
        self.text(
            canvas,
            &format!("x: {}, y: {}", center.x, center.y),
            Point::new(bbox.x, bbox.y + bbox.height + 20),
            Color::RED,
        );
    }

    fn text<C: Canvas>(&self, canvas: &mut C, text: &str, origin: Point, color: Color) {
        canvas.text(
            text,
            origin,
            self.config.font_scale,
            color,
            self.config.thickness,
        );
    }
}
