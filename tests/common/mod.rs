#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

use clicktrack::tracker::Clock;
use clicktrack::{
    BoundingBox, Canvas, DrawList, FrameSource, KeyCode, MotionBlob, MotionDetector, ObjectTracker,
    PointerEvent, Window,
};

pub const COLS: i32 = 640;
pub const ROWS: i32 = 480;

/// Frame source replaying a fixed list of reads, then end of stream.
///
/// Frame `i` is `COLS + i` pixels wide so tests can tell frames apart.
pub struct ScriptedSource {
    reads: VecDeque<io::Result<Option<DrawList>>>,
}

impl ScriptedSource {
    pub fn frames(n: usize) -> Self {
        Self {
            reads: (0..n)
                .map(|i| Ok(Some(DrawList::new(COLS + i as i32, ROWS))))
                .collect(),
        }
    }

    pub fn then_fail(mut self) -> Self {
        self.reads
            .push_back(Err(io::Error::new(io::ErrorKind::Other, "camera unplugged")));
        self
    }
}

impl FrameSource for ScriptedSource {
    type Frame = DrawList;
    type Error = io::Error;

    fn read(&mut self) -> io::Result<Option<DrawList>> {
        self.reads.pop_front().unwrap_or(Ok(None))
    }
}

/// Window delivering scripted input per frame index and keeping shown frames.
///
/// Input scripted for frame `i` is produced while frame `i` is on screen, so
/// the loop drains it in the following iteration.
#[derive(Default)]
pub struct ScriptedWindow {
    pointer: HashMap<usize, Vec<PointerEvent>>,
    keys: HashMap<usize, KeyCode>,
    pub shown: Vec<DrawList>,
}

impl ScriptedWindow {
    pub fn pointer_on(mut self, frame: usize, events: Vec<PointerEvent>) -> Self {
        self.pointer.insert(frame, events);
        self
    }

    pub fn key_on(mut self, frame: usize, key: KeyCode) -> Self {
        self.keys.insert(frame, key);
        self
    }
}

impl Window for ScriptedWindow {
    type Frame = DrawList;
    type Error = io::Error;

    fn show(&mut self, frame: &DrawList) -> io::Result<()> {
        self.shown.push(frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, _timeout_ms: i32) -> io::Result<Option<KeyCode>> {
        Ok(self.keys.get(&(self.shown.len() - 1)).copied())
    }

    fn take_pointer_events(&mut self) -> Vec<PointerEvent> {
        self.shown
            .len()
            .checked_sub(1)
            .and_then(|on_screen| self.pointer.remove(&on_screen))
            .unwrap_or_default()
    }
}

/// Tracker replaying a list of update results; an exhausted list means lost.
#[derive(Default)]
pub struct ScriptedTracker {
    responses: VecDeque<Option<BoundingBox>>,
    pub inits: Vec<BoundingBox>,
    /// Size of every frame passed to `init`
    pub init_frames: Vec<(i32, i32)>,
    /// Size of every frame passed to `update`
    pub update_frames: Vec<(i32, i32)>,
    pub reject_init: bool,
}

impl ScriptedTracker {
    pub fn new(responses: impl IntoIterator<Item = Option<BoundingBox>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_init: true,
            ..Self::default()
        }
    }
}

impl ObjectTracker for ScriptedTracker {
    type Frame = DrawList;
    type Error = io::Error;

    fn init(&mut self, frame: &DrawList, bbox: BoundingBox) -> io::Result<()> {
        self.init_frames.push(frame.size());
        if self.reject_init {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no features"));
        }
        self.inits.push(bbox);
        Ok(())
    }

    fn update(&mut self, frame: &DrawList) -> io::Result<Option<BoundingBox>> {
        self.update_frames.push(frame.size());
        Ok(self.responses.pop_front().flatten())
    }
}

/// Detector replaying one blob list per frame.
#[derive(Default)]
pub struct ScriptedDetector {
    frames: VecDeque<Vec<MotionBlob>>,
}

impl ScriptedDetector {
    pub fn new(frames: impl IntoIterator<Item = Vec<MotionBlob>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl MotionDetector for ScriptedDetector {
    type Frame = DrawList;
    type Error = io::Error;

    fn detect(&mut self, _frame: &DrawList) -> io::Result<Vec<MotionBlob>> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

/// Clock returning scripted offsets in milliseconds from a fixed origin.
pub struct ManualClock {
    origin: Instant,
    offsets_ms: VecDeque<u64>,
    last: Instant,
}

impl ManualClock {
    pub fn at(offsets_ms: &[u64]) -> Self {
        let origin = Instant::now();
        Self {
            origin,
            offsets_ms: offsets_ms.iter().copied().collect(),
            last: origin,
        }
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Instant {
        if let Some(ms) = self.offsets_ms.pop_front() {
            self.last = self.origin + Duration::from_millis(ms);
        }
        self.last
    }
}
