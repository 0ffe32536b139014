/// A point in PDF user or device space (origin bottom-left, y up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine transformation matrix `[a b c d e f]`.
///
/// Points are row vectors: `[x' y' 1] = [x y 1] × M`, so
/// `x' = a·x + c·y + e` and `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Build from a six-element operand array, as found in `cm`, `Tm` and `/Matrix`.
    pub fn from_array(values: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = values;
        Self::new(a, b, c, d, e, f)
    }

    /// Matrix product `self × other`.
    ///
    /// Applying the result to a point applies `self` first, then `other`.
    /// `cm` is therefore `operand.concat(&ctm)`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Horizontal scaling factor. Falls back to `a` when the matrix has no skew.
    pub fn scaling_factor_x(&self) -> f64 {
        if self.b != 0.0 {
            (self.a * self.a + self.b * self.b).sqrt()
        } else {
            self.a
        }
    }
}

/// Round `value` to `precision` decimal places. `None` leaves it untouched.
pub fn round_to(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(digits) => {
            let factor = 10f64.powi(digits.min(15) as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

/// Axis-aligned rectangle in PDF space (y grows upward).
///
/// [`Rectangle::EMPTY`] has inverted infinite bounds and is the identity
/// element for [`Rectangle::extend`] and [`Rectangle::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Rectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Rectangle {
    pub const EMPTY: Rectangle = Rectangle {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Rectangle spanning both corners. Corners may be given in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Smallest rectangle containing every point. `EMPTY` for no points.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut rect = Self::EMPTY;
        for p in points {
            rect.include_point(p);
        }
        rect
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn include_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Grow in place to cover `other`.
    pub fn extend(&mut self, other: &Rectangle) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let mut rect = *self;
        rect.extend(other);
        rect
    }

    /// Overlapping region, or `None` when the rectangles are disjoint.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let rect = Rectangle {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        (!rect.is_empty()).then_some(rect)
    }

    /// Whether `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.overlaps_horizontally(other) && self.overlaps_vertically(other)
    }

    pub fn overlaps_horizontally(&self, other: &Rectangle) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x
    }

    pub fn overlaps_vertically(&self, other: &Rectangle) -> bool {
        self.min_y <= other.max_y && other.min_y <= self.max_y
    }

    /// Length of the shared x-interval, zero when disjoint.
    pub fn horizontal_overlap(&self, other: &Rectangle) -> f64 {
        (self.max_x.min(other.max_x) - self.min_x.max(other.min_x)).max(0.0)
    }

    /// Length of the shared y-interval, zero when disjoint.
    pub fn vertical_overlap(&self, other: &Rectangle) -> f64 {
        (self.max_y.min(other.max_y) - self.min_y.max(other.min_y)).max(0.0)
    }

    /// Intersection area relative to `self`'s area. Zero for degenerate rectangles.
    pub fn overlap_ratio(&self, other: &Rectangle) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.intersection(other).map_or(0.0, |r| r.area() / area)
    }

    /// Copy with every bound rounded by [`round_to`].
    pub fn rounded(&self, precision: Option<u32>) -> Rectangle {
        if self.is_empty() {
            return *self;
        }
        Rectangle {
            min_x: round_to(self.min_x, precision),
            min_y: round_to(self.min_y, precision),
            max_x: round_to(self.max_x, precision),
            max_y: round_to(self.max_y, precision),
        }
    }
}
