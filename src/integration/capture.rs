//! Traits for frame acquisition and interactive display backends.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::selection::PointerEvent;

/// Ordered supply of frames from a camera or video file.
///
/// The underlying device is released when the source is dropped.
pub trait FrameSource {
    type Frame;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the next frame, or `None` at end of stream.
    fn read(&mut self) -> Result<Option<Self::Frame>, Self::Error>;
}

/// Window that shows frames and reports keyboard and pointer input.
///
/// The window is closed when dropped.
pub trait Window {
    type Frame;
    type Error: std::error::Error + Send + Sync + 'static;

    fn show(&mut self, frame: &Self::Frame) -> Result<(), Self::Error>;

    /// Wait up to `timeout_ms` for a key press.
    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<KeyCode>, Self::Error>;

    /// Drain pointer events received since the previous call, oldest first.
    fn take_pointer_events(&mut self) -> Vec<PointerEvent>;
}

/// Key code as reported by the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "KeySpec")]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const ESC: KeyCode = KeyCode(27);

    pub const fn from_char(c: char) -> Self {
        KeyCode(c as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key `{0}`, expected `esc`, a single character or a key code")]
pub struct ParseKeyError(String);

impl FromStr for KeyCode {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("esc") || s.eq_ignore_ascii_case("escape") {
            return Ok(KeyCode::ESC);
        }
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyCode::from_char(c));
        }
        s.parse::<i32>()
            .map(KeyCode)
            .map_err(|_| ParseKeyError(s.to_string()))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KeyCode::ESC => write!(f, "esc"),
            KeyCode(code) => match char::from_u32(code as u32) {
                Some(c) if c.is_ascii_graphic() => write!(f, "{c}"),
                _ => write!(f, "{code}"),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeySpec {
    Code(i32),
    Name(String),
}

impl TryFrom<KeySpec> for KeyCode {
    type Error = ParseKeyError;

    fn try_from(key: KeySpec) -> Result<Self, Self::Error> {
        match key {
            KeySpec::Code(code) => Ok(KeyCode(code)),
            KeySpec::Name(name) => name.parse(),
        }
    }
}

/// Why a frame loop stopped. Every variant is a normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The source ran out of frames
    EndOfStream,
    /// The source failed to deliver a frame
    ReadFailure,
    /// The user pressed the quit key
    QuitKey,
}

/// Failure that aborts a frame loop.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("display failed: {0}")]
    Display(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("motion detector failed: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LoopError {
    pub(crate) fn display<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        LoopError::Display(Box::new(e))
    }

    pub(crate) fn detector<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        LoopError::Detector(Box::new(e))
    }
}

/// Key handling shared by the frame loops.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Bounded wait for a key press after each frame
    pub poll_timeout_ms: i32,
    pub quit_key: KeyCode,
    /// Drops the current target in the tracking view
    pub reset_key: KeyCode,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 30,
            quit_key: KeyCode::ESC,
            reset_key: KeyCode::from_char('r'),
        }
    }
}
