//! Drawing surface abstraction.

use crate::tracker::Point;

/// Color in BGR channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const GREEN: Color = Color::bgr(0, 255, 0);
    pub const RED: Color = Color::bgr(0, 0, 255);
    pub const BLUE: Color = Color::bgr(255, 0, 0);

    pub const fn bgr(b: u8, g: u8, r: u8) -> Self {
        Self { b, g, r }
    }
}

/// A frame that annotations can be drawn onto.
///
/// Drawing never fails from the caller's point of view: out-of-range
/// coordinates are the implementation's concern.
pub trait Canvas {
    /// Frame size as (cols, rows).
    fn size(&self) -> (i32, i32);

    fn line(&mut self, from: Point, to: Point, color: Color, thickness: i32);

    fn rectangle(&mut self, top_left: Point, bottom_right: Point, color: Color, thickness: i32);

    fn circle(&mut self, center: Point, radius: i32, color: Color, thickness: i32);

    /// Draw `text` with its baseline starting at `origin`.
    fn text(&mut self, text: &str, origin: Point, scale: f64, color: Color, thickness: i32);
}

/// Single recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        color: Color,
    },
    Rectangle {
        top_left: Point,
        bottom_right: Point,
        color: Color,
    },
    Circle {
        center: Point,
        radius: i32,
        color: Color,
    },
    Text {
        text: String,
        origin: Point,
        color: Color,
    },
}

/// Canvas that records commands instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cols: i32,
    rows: i32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn rectangles(&self) -> impl Iterator<Item = (Point, Point, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Rectangle {
                top_left,
                bottom_right,
                color,
            } => Some((*top_left, *bottom_right, *color)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for DrawList {
    fn size(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    fn line(&mut self, from: Point, to: Point, color: Color, _thickness: i32) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn rectangle(&mut self, top_left: Point, bottom_right: Point, color: Color, _thickness: i32) {
        self.commands.push(DrawCommand::Rectangle {
            top_left,
            bottom_right,
            color,
        });
    }

    fn circle(&mut self, center: Point, radius: i32, color: Color, _thickness: i32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, origin: Point, _scale: f64, color: Color, _thickness: i32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            color,
        });
    }
}
