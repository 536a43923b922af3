//! TrackingLoop for driving selection, tracking and annotation from a frame source.

use std::io::{self, Write};
use std::time::Instant;

use log::{debug, error, info, warn};

use super::capture::{FrameSource, LoopError, LoopExit, LoopSettings, Window};
use crate::render::{Annotator, Canvas, TrackingScene};
use crate::selection::{PointerEvent, RegionSelector, SelectionOutcome};
use crate::tracker::{Clock, FpsCounter, ObjectTracker, SystemClock, TrackUpdate, TrackerSession};

/// Interactive click-to-track loop.
///
/// Each iteration reads one frame, applies buffered pointer input, updates the
/// tracker, draws the annotations on a copy of the frame and shows it. A
/// finished selection binds the tracker to the frame that was on screen while
/// the user made it, and the same iteration updates it on the new frame. The
/// telemetry record of every refreshed update is written as one line to the
/// telemetry sink (stdout by default).
pub struct TrackingLoop<S, W, T, C = SystemClock, O = io::Stdout>
where
    T: ObjectTracker,
{
    source: S,
    window: W,
    session: TrackerSession<T>,
    selector: RegionSelector,
    annotator: Annotator,
    settings: LoopSettings,
    frame_fps: FpsCounter,
    /// Frame on screen while the pending pointer input was produced
    last_shown: Option<(T::Frame, Instant)>,
    clock: C,
    telemetry: O,
}

impl<S, W, T> TrackingLoop<S, W, T>
where
    T: ObjectTracker,
{
    /// Create a loop using the system clock and stdout telemetry.
    pub fn new(
        source: S,
        window: W,
        tracker: T,
        selector: RegionSelector,
        annotator: Annotator,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            window,
            session: TrackerSession::new(tracker),
            selector,
            annotator,
            settings,
            frame_fps: FpsCounter::new(),
            last_shown: None,
            clock: SystemClock,
            telemetry: io::stdout(),
        }
    }
}

impl<S, W, T, C, O> TrackingLoop<S, W, T, C, O>
where
    S: FrameSource<Frame = T::Frame>,
    W: Window<Frame = T::Frame>,
    T: ObjectTracker,
    T::Frame: Canvas + Clone,
    C: Clock,
    O: Write,
{
    /// Replace the clock used for FPS measurement.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> TrackingLoop<S, W, T, C2, O> {
        TrackingLoop {
            source: self.source,
            window: self.window,
            session: self.session,
            selector: self.selector,
            annotator: self.annotator,
            settings: self.settings,
            frame_fps: self.frame_fps,
            last_shown: self.last_shown,
            clock,
            telemetry: self.telemetry,
        }
    }

    /// Replace the sink receiving telemetry records.
    pub fn with_telemetry<O2: Write>(self, telemetry: O2) -> TrackingLoop<S, W, T, C, O2> {
        TrackingLoop {
            source: self.source,
            window: self.window,
            session: self.session,
            selector: self.selector,
            annotator: self.annotator,
            settings: self.settings,
            frame_fps: self.frame_fps,
            last_shown: self.last_shown,
            clock: self.clock,
            telemetry,
        }
    }

    /// Run until end of stream, a read failure or the quit key.
    pub fn run(&mut self) -> Result<LoopExit, LoopError> {
        info!(
            "tracking loop started, press {} to quit, {} to reset",
            self.settings.quit_key, self.settings.reset_key
        );
        loop {
            if let Some(exit) = self.step()? {
                info!("tracking loop finished: {exit:?}");
                return Ok(exit);
            }
        }
    }

    /// Process a single frame. Returns `Some` when the loop should stop.
    pub fn step(&mut self) -> Result<Option<LoopExit>, LoopError> {
        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(Some(LoopExit::EndOfStream)),
            Err(e) => {
                error!("failed to read frame: {e}");
                return Ok(Some(LoopExit::ReadFailure));
            }
        };
        let now = self.clock.now();

        // Selections refer to the frame that was on screen when they were made.
        let previous = self.last_shown.take();
        let (selection_frame, selected_at) = match &previous {
            Some((shown, at)) => (shown, *at),
            None => (&frame, now),
        };
        for event in self.window.take_pointer_events() {
            self.handle_pointer(event, selection_frame, selected_at);
        }

        let update = self.update_tracker(&frame, now);
        let frame_fps = self.frame_fps.tick(now).then(|| self.frame_fps.fps());

        let mut display = frame.clone();
        let scene = TrackingScene {
            selection_mode: self.selector.mode(),
            preview: self.selector.preview(),
            state: self.session.state(),
            update,
            info: self.session.info(),
            frame_fps,
        };
        self.annotator.render_tracking(&mut display, &scene);

        self.window.show(&display).map_err(LoopError::display)?;
        self.last_shown = Some((frame, now));

        match self
            .window
            .poll_key(self.settings.poll_timeout_ms)
            .map_err(LoopError::display)?
        {
            Some(key) if key == self.settings.quit_key => Ok(Some(LoopExit::QuitKey)),
            Some(key) if key == self.settings.reset_key => {
                info!("tracker reset");
                self.session.reset();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent, frame: &T::Frame, at: Instant) {
        match self.selector.handle(event) {
            SelectionOutcome::Started => self.session.begin_selection(),
            SelectionOutcome::Finalized(region) => {
                if let Err(e) = self.session.initialize(frame, region, at) {
                    warn!("{e}");
                }
            }
            SelectionOutcome::Rejected(e) => warn!("{e}"),
            SelectionOutcome::Dragging | SelectionOutcome::Ignored => {}
        }
    }

    fn update_tracker(&mut self, frame: &T::Frame, now: Instant) -> Option<TrackUpdate> {
        if !self.session.is_tracking() {
            return None;
        }

        // Loss is logged by the session, which then accepts a new selection.
        let update = self.session.update(frame, now).ok()?;
        if update.refreshed {
            if let Some(info) = self.session.info() {
                if let Err(e) = writeln!(self.telemetry, "{info}") {
                    debug!("telemetry write failed: {e}");
                }
            }
        }
        Some(update)
    }

    pub fn session(&self) -> &TrackerSession<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TrackerSession<T> {
        &mut self.session
    }

    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn telemetry(&self) -> &O {
        &self.telemetry
    }

    /// Consume the loop, releasing the source and window.
    pub fn into_parts(self) -> (S, W, TrackerSession<T>) {
        (self.source, self.window, self.session)
    }
}
