use crate::geometry::{Ctm, Point, Rectangle};

/// A segment of a PDF path, in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Move to a new point (starts a new subpath).
    MoveTo(Point),
    /// Straight line from current point to target.
    LineTo(Point),
    /// Cubic Bezier curve with two control points and an endpoint.
    CurveTo { cp1: Point, cp2: Point, end: Point },
    /// Close the current subpath (line back to the subpath start).
    ClosePath,
}

/// A complete path consisting of segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Min/max box over every stored point; `None` for a path without points.
    ///
    /// Curves are bounded by their control polygon, so the box may be
    /// larger than the painted area.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        bounds_of(&self.segments)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn segment_points(seg: &PathSegment) -> impl Iterator<Item = Point> {
    let points = match *seg {
        PathSegment::MoveTo(p) | PathSegment::LineTo(p) => [Some(p), None, None],
        PathSegment::CurveTo { cp1, cp2, end } => [Some(cp1), Some(cp2), Some(end)],
        PathSegment::ClosePath => [None; 3],
    };
    points.into_iter().flatten()
}

fn bounds_of(segments: &[PathSegment]) -> Option<Rectangle> {
    let rect = Rectangle::from_points(segments.iter().flat_map(segment_points));
    (!rect.is_empty()).then_some(rect)
}

/// Builder for constructing paths from PDF path operators.
///
/// Coordinates are transformed through the CTM when they are appended, so
/// a later `cm` never affects points that are already stored.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
    current_point: Option<Point>,
    subpath_start: Option<Point>,
    ctm: Ctm,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new(Ctm::identity())
    }
}

impl PathBuilder {
    pub fn new(ctm: Ctm) -> Self {
        Self {
            segments: Vec::new(),
            current_point: None,
            subpath_start: None,
            ctm,
        }
    }

    /// Set the CTM used for subsequently appended points.
    pub fn set_ctm(&mut self, ctm: Ctm) {
        self.ctm = ctm;
    }

    pub fn ctm(&self) -> &Ctm {
        &self.ctm
    }

    /// `m` operator: move to a new point, starting a new subpath.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.ctm.transform_point(Point::new(x, y));
        self.start_subpath(p);
    }

    /// `l` operator: straight line from current point to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let p = self.ctm.transform_point(Point::new(x, y));
        self.segments.push(PathSegment::LineTo(p));
        self.current_point = Some(p);
    }

    /// `c` operator. Without a current point it degrades to a moveto at the endpoint.
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let end = self.ctm.transform_point(Point::new(x3, y3));
        if self.current_point.is_none() {
            self.start_subpath(end);
            return;
        }
        let cp1 = self.ctm.transform_point(Point::new(x1, y1));
        let cp2 = self.ctm.transform_point(Point::new(x2, y2));
        self.push_curve(cp1, cp2, end);
    }

    /// `v` operator: the first control point replicates the current point.
    pub fn curve_to_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let end = self.ctm.transform_point(Point::new(x3, y3));
        let Some(cp1) = self.current_point else {
            self.start_subpath(end);
            return;
        };
        let cp2 = self.ctm.transform_point(Point::new(x2, y2));
        self.push_curve(cp1, cp2, end);
    }

    /// `y` operator: the second control point replicates the endpoint.
    pub fn curve_to_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        let end = self.ctm.transform_point(Point::new(x3, y3));
        if self.current_point.is_none() {
            self.start_subpath(end);
            return;
        }
        let cp1 = self.ctm.transform_point(Point::new(x1, y1));
        self.push_curve(cp1, end, end);
    }

    /// `h` operator: close the current subpath.
    pub fn close_path(&mut self) {
        if self.current_point.is_none() {
            return;
        }
        self.segments.push(PathSegment::ClosePath);
        self.current_point = self.subpath_start;
    }

    /// `re` operator: moveto + 3 lineto + closepath over the four corners.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Current point, already in device space.
    pub fn current_point(&self) -> Option<Point> {
        self.current_point
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounds of the path built so far; `None` while no point was appended.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        bounds_of(&self.segments)
    }

    /// Take the accumulated segments as a `Path` and reset the builder.
    pub fn take_and_reset(&mut self) -> Path {
        let segments = std::mem::take(&mut self.segments);
        self.current_point = None;
        self.subpath_start = None;
        Path { segments }
    }

    fn start_subpath(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
        self.current_point = Some(p);
        self.subpath_start = Some(p);
    }

    fn push_curve(&mut self, cp1: Point, cp2: Point, end: Point) {
        self.segments.push(PathSegment::CurveTo { cp1, cp2, end });
        self.current_point = Some(end);
    }
}
