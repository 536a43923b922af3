/// Pixel coordinate in frame space.
pub type Point = nalgebra::Point2<i32>;

/// Bounding box representation in integer pixel coordinates.
///
/// Stored as TLWH: top-left x, top-left y, width, height. Trackers report boxes
/// in this layout; the corner helpers give the TLBR view used for drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Top-left x coordinate
    pub x: i32,
    /// Top-left y coordinate
    pub y: i32,
    /// Width of the bounding box
    pub width: i32,
    /// Height of the bounding box
    pub height: i32,
}

impl BoundingBox {
    /// Create a new box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box spanning two arbitrary corners.
    ///
    /// The corners may be given in any order; the result always has a
    /// non-negative width and height.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Center of the box, rounded toward the top-left.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the box lies entirely inside a `cols` x `rows` frame.
    pub fn fits_within(&self, cols: i32, rows: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + self.width <= cols && self.y + self.height <= rows
    }
}

/// User-selected rectangle, kept as the two corners the user produced.
///
/// `start` is where the selection began and `end` where it was released, so
/// `start` is not necessarily the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Point,
    pub end: Point,
}

impl Region {
    #[inline]
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Square region of side `side` centered on `center`.
    pub fn centered_square(center: Point, side: i32) -> Self {
        let half = side / 2;
        let start = Point::new(center.x - half, center.y - half);
        let end = start + nalgebra::Vector2::new(side, side);
        Self { start, end }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        (self.end.x - self.start.x).abs()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        (self.end.y - self.start.y).abs()
    }

    /// A region with zero width or zero height cannot seed a tracker.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn center(&self) -> Point {
        self.bounding_box().center()
    }

    /// Normalized TLWH box covering the region.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.start, self.end)
    }
}
