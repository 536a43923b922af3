//! MotionLoop for background-subtraction views.

use std::io::{self, Write};

use log::{debug, error, info};

use super::capture::{FrameSource, LoopError, LoopExit, LoopSettings, Window};
use super::detector::MotionDetector;
use crate::render::{Annotator, Canvas};
use crate::tracker::{MotionTracker, MotionUpdate, position_report};

/// Highlights moving regions and remembers where motion was last seen.
pub struct MotionLoop<S, W, D, O = io::Stdout> {
    source: S,
    window: W,
    detector: D,
    tracker: MotionTracker,
    annotator: Annotator,
    settings: LoopSettings,
    telemetry: O,
}

impl<S, W, D> MotionLoop<S, W, D> {
    pub fn new(
        source: S,
        window: W,
        detector: D,
        tracker: MotionTracker,
        annotator: Annotator,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            window,
            detector,
            tracker,
            annotator,
            settings,
            telemetry: io::stdout(),
        }
    }
}

impl<S, W, D, O> MotionLoop<S, W, D, O>
where
    S: FrameSource<Frame = D::Frame>,
    W: Window<Frame = D::Frame>,
    D: MotionDetector,
    D::Frame: Canvas + Clone,
    O: Write,
{
    /// Replace the sink receiving position reports.
    pub fn with_telemetry<O2: Write>(self, telemetry: O2) -> MotionLoop<S, W, D, O2> {
        MotionLoop {
            source: self.source,
            window: self.window,
            detector: self.detector,
            tracker: self.tracker,
            annotator: self.annotator,
            settings: self.settings,
            telemetry,
        }
    }

    pub fn run(&mut self) -> Result<LoopExit, LoopError> {
        info!("motion loop started, press {} to quit", self.settings.quit_key);
        loop {
            if let Some(exit) = self.step()? {
                info!("motion loop finished: {exit:?}");
                return Ok(exit);
            }
        }
    }

    pub fn step(&mut self) -> Result<Option<LoopExit>, LoopError> {
        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(Some(LoopExit::EndOfStream)),
            Err(e) => {
                error!("failed to read frame: {e}");
                return Ok(Some(LoopExit::ReadFailure));
            }
        };

        let blobs = self.detector.detect(&frame).map_err(LoopError::detector)?;
        let update = self.tracker.update(&blobs);
        self.report(&update);

        let mut display = frame.clone();
        self.annotator.render_motion(&mut display, &update);
        self.window.show(&display).map_err(LoopError::display)?;

        match self
            .window
            .poll_key(self.settings.poll_timeout_ms)
            .map_err(LoopError::display)?
        {
            Some(key) if key == self.settings.quit_key => Ok(Some(LoopExit::QuitKey)),
            Some(key) if key == self.settings.reset_key => {
                self.tracker.reset();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn report(&mut self, update: &MotionUpdate) {
        let Some(bbox) = update.highlight else {
            return;
        };
        if let Err(e) = writeln!(self.telemetry, "{}", position_report(&bbox)) {
            debug!("telemetry write failed: {e}");
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn tracker(&self) -> &MotionTracker {
        &self.tracker
    }

    pub fn telemetry(&self) -> &O {
        &self.telemetry
    }
}
