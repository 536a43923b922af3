//! Pointer-driven region selection.
//!
//! The selector turns press/move/release events into a [`Region`]. It never
//! touches tracker state: callers feed the returned [`SelectionOutcome`] to
//! their [`TrackerSession`](crate::tracker::TrackerSession).

use serde::Deserialize;
use thiserror::Error;

use crate::tracker::{Point, Region};

/// Pointer input in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// How a release turns into a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Rectangle from the press point to the release point
    #[default]
    Drag,
    /// Fixed-size square centered on the release point
    #[serde(alias = "click")]
    ClickCenter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid rectangle ({}, {}) -> ({}, {}), please select a valid rectangle",
        .0.start.x, .0.start.y, .0.end.x, .0.end.y)]
    DegenerateRegion(Region),
    #[error("invalid starting point, please press within the frame")]
    NoSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The event had no effect
    Ignored,
    /// A new selection gesture began
    Started,
    /// The in-progress selection changed
    Dragging,
    /// A valid region was produced
    Finalized(Region),
    /// The gesture ended without a usable region
    Rejected(SelectionError),
}

#[derive(Debug, Clone)]
pub struct RegionSelector {
    mode: SelectionMode,
    square_side: i32,
    start: Option<Point>,
    current: Option<Point>,
}

impl RegionSelector {
    /// Create a selector. `square_side` is the side of the click-mode square.
    pub fn new(mode: SelectionMode, square_side: i32) -> Self {
        Self {
            mode,
            square_side,
            start: None,
            current: None,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn square_side(&self) -> i32 {
        self.square_side
    }

    pub fn is_selecting(&self) -> bool {
        self.start.is_some()
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectionOutcome {
        match event {
            PointerEvent::Down(p) => {
                self.start = Some(p);
                self.current = Some(p);
                SelectionOutcome::Started
            }
            PointerEvent::Move(p) => {
                if self.start.is_none() {
                    return SelectionOutcome::Ignored;
                }
                self.current = Some(p);
                SelectionOutcome::Dragging
            }
            PointerEvent::Up(p) => {
                let Some(start) = self.start.take() else {
                    return SelectionOutcome::Rejected(SelectionError::NoSelection);
                };
                self.current = None;

                let region = self.region_for(start, p);
                if region.is_degenerate() {
                    SelectionOutcome::Rejected(SelectionError::DegenerateRegion(region))
                } else {
                    SelectionOutcome::Finalized(region)
                }
            }
        }
    }

    /// Region the current gesture would produce if released now.
    pub fn preview(&self) -> Option<Region> {
        let start = self.start?;
        let current = self.current.unwrap_or(start);
        Some(self.region_for(start, current))
    }

    fn region_for(&self, start: Point, release: Point) -> Region {
        match self.mode {
            SelectionMode::Drag => Region::new(start, release),
            SelectionMode::ClickCenter => Region::centered_square(release, self.square_side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_drag_selection() {
        let mut selector = RegionSelector::new(SelectionMode::Drag, 100);

        assert_eq!(selector.handle(PointerEvent::Down(p(10, 10))), SelectionOutcome::Started);
        assert!(selector.is_selecting());
        assert_eq!(selector.handle(PointerEvent::Move(p(60, 30))), SelectionOutcome::Dragging);
        assert_eq!(selector.preview(), Some(Region::new(p(10, 10), p(60, 30))));

        let outcome = selector.handle(PointerEvent::Up(p(110, 60)));
        assert_eq!(outcome, SelectionOutcome::Finalized(Region::new(p(10, 10), p(110, 60))));
        assert!(!selector.is_selecting());
        assert_eq!(selector.preview(), None);
    }

    #[test]
    fn test_click_without_drag_is_degenerate() {
        let mut selector = RegionSelector::new(SelectionMode::Drag, 100);
        selector.handle(PointerEvent::Down(p(50, 50)));

        let outcome = selector.handle(PointerEvent::Up(p(50, 50)));
        assert_eq!(
            outcome,
            SelectionOutcome::Rejected(SelectionError::DegenerateRegion(Region::new(
                p(50, 50),
                p(50, 50)
            )))
        );
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut selector = RegionSelector::new(SelectionMode::Drag, 100);
        assert_eq!(selector.handle(PointerEvent::Move(p(5, 5))), SelectionOutcome::Ignored);
        assert_eq!(selector.preview(), None);
    }

    #[test]
    fn test_release_without_press() {
        let mut selector = RegionSelector::new(SelectionMode::Drag, 100);
        assert_eq!(
            selector.handle(PointerEvent::Up(p(5, 5))),
            SelectionOutcome::Rejected(SelectionError::NoSelection)
        );
    }

    #[test]
    fn test_click_center_square() {
        let mut selector = RegionSelector::new(SelectionMode::ClickCenter, 100);
        selector.handle(PointerEvent::Down(p(190, 140)));
        assert_eq!(selector.preview(), Some(Region::new(p(140, 90), p(240, 190))));

        let outcome = selector.handle(PointerEvent::Up(p(200, 150)));
        assert_eq!(outcome, SelectionOutcome::Finalized(Region::new(p(150, 100), p(250, 200))));
    }

    #[test]
    fn test_click_center_with_zero_side_is_rejected() {
        let mut selector = RegionSelector::new(SelectionMode::ClickCenter, 0);
        selector.handle(PointerEvent::Down(p(20, 20)));
        assert!(matches!(
            selector.handle(PointerEvent::Up(p(20, 20))),
            SelectionOutcome::Rejected(SelectionError::DegenerateRegion(_))
        ));
    }

    #[test]
    fn test_mode_names() {
        let mode: SelectionMode = serde_yaml::from_str("click").unwrap();
        assert_eq!(mode, SelectionMode::ClickCenter);
        let mode: SelectionMode = serde_yaml::from_str("drag").unwrap();
        assert_eq!(mode, SelectionMode::Drag);
    }
}
