//! Contains the geometric primitives that the force model is built on. This
//! includes points, displacement vectors, segments and infinite lines, and
//! things like the intersection of two lines and the length of vectors.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// The tolerance used when comparing coordinates and distances.
pub const EPSILON: f64 = 1e-5;

/// \returns True if \p x and \p y are within EPSILON of each other.
pub fn fuzzy_eq(x: f64, y: f64) -> bool {
    (x - y).abs() < EPSILON
}

/// \returns True if \p x is numerically zero.
pub fn fuzzy_zero(x: f64) -> bool {
    fuzzy_eq(x, 0.)
}

// Stores a 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn zero() -> Point {
        Self { x: 0., y: 0. }
    }

    pub fn new(x: f64, y: f64) -> Point {
        Self { x, y }
    }

    pub fn splat(s: f64) -> Point {
        Point::new(s, s)
    }

    /// Move the point by the displacement \p v.
    pub fn translate(&self, v: Vector) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        Vector::between(*self, other).magnitude()
    }

    /// Clamp both coordinates into the rectangle \p lo .. \p hi. The lower
    /// bound is applied first, so if the rectangle is empty the upper bound
    /// wins. NaN coordinates end up on the lower bound.
    pub fn clamp(&self, lo: Point, hi: Point) -> Point {
        Point::new(self.x.max(lo.x).min(hi.x), self.y.max(lo.y).min(hi.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(x: {:.3}, y: {:.3})", self.x, self.y)
    }
}

/// A displacement in the plane. Forces are vectors too.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn zero() -> Vector {
        Self { x: 0., y: 0. }
    }

    pub fn new(x: f64, y: f64) -> Vector {
        Self { x, y }
    }

    /// The unit vector that points along the x axis.
    pub fn unit() -> Vector {
        Vector::new(1., 0.)
    }

    /// \returns the vector that leads from \p from to \p to.
    pub fn between(from: Point, to: Point) -> Vector {
        Vector::new(to.x - from.x, to.y - from.y)
    }

    pub fn neg(&self) -> Vector {
        Vector::new(-self.x, -self.y)
    }

    pub fn add(&self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector) -> Vector {
        self.add(other.neg())
    }

    pub fn scale(&self, s: f64) -> Vector {
        Vector::new(self.x * s, self.y * s)
    }

    pub fn div(&self, s: f64) -> Vector {
        Vector::new(self.x / s, self.y / s)
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// The z component of the 3D cross product.
    pub fn cross(&self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotate the vector counter-clockwise by \p angle radians.
    pub fn rotate(&self, angle: f64) -> Vector {
        let x = self.x;
        let y = self.y;
        Vector::new(
            x * angle.cos() - y * angle.sin(),
            x * angle.sin() + y * angle.cos(),
        )
    }

    pub fn rotate_deg(&self, degrees: f64) -> Vector {
        self.rotate(degrees.to_radians())
    }

    pub fn is_zero(&self) -> bool {
        fuzzy_zero(self.magnitude())
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, other: Vector) -> Vector {
        Vector::add(&self, other)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, other: Vector) {
        *self = Vector::add(self, other);
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, other: Vector) -> Vector {
        Vector::sub(&self, other)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::neg(&self)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, s: f64) -> Vector {
        self.scale(s)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;
    fn div(self, s: f64) -> Vector {
        Vector::div(&self, s)
    }
}

impl std::iter::Sum for Vector {
    fn sum<I: Iterator<Item = Vector>>(iter: I) -> Vector {
        iter.fold(Vector::zero(), |acc, v| acc + v)
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn direction(&self) -> Vector {
        Vector::between(self.start, self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction().is_zero()
    }

    /// The infinite line that the segment lies on.
    pub fn line(&self) -> Line {
        Line::new(self.start, self.direction())
    }

    /// \returns True if \p p lies within the bounding rectangle of the
    /// segment, up to EPSILON. Callers use this on points that are already
    /// known to be on the segment's line.
    pub fn has(&self, p: Point) -> bool {
        let lo_x = self.start.x.min(self.end.x);
        let hi_x = self.start.x.max(self.end.x);
        let lo_y = self.start.y.min(self.end.y);
        let hi_y = self.start.y.max(self.end.y);
        in_range((lo_x - EPSILON, hi_x + EPSILON), p.x)
            && in_range((lo_y - EPSILON, hi_y + EPSILON), p.y)
    }

    /// \returns the endpoint that is closer to \p p. Ties go to the end.
    pub fn closer_endpoint(&self, p: Point) -> Point {
        if p.distance_to(self.start) < p.distance_to(self.end) {
            return self.start;
        }
        self.end
    }

    /// \returns the point of the segment that is nearest to \p p. This is the
    /// foot of the perpendicular from \p p, if it falls within the segment,
    /// or the closer endpoint otherwise.
    ///
    /// ```text
    ///            p
    ///            |
    ///   start----o-------end
    /// ```
    pub fn nearest_point(&self, p: Point) -> Point {
        let perpendicular = Line::new(p, self.direction().rotate_deg(90.));
        match perpendicular.intersection(&self.line()) {
            Some(foot) if self.has(foot) => foot,
            _ => self.closer_endpoint(p),
        }
    }
}

/// An infinite line, represented by a point on it and its direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    point: Point,
    direction: Vector,
}

impl Line {
    pub fn new(point: Point, direction: Vector) -> Self {
        Self { point, direction }
    }

    /// The line that passes through \p a and \p b.
    pub fn through(a: Point, b: Point) -> Self {
        Self::new(a, Vector::between(a, b))
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    /// \returns True if the directions of the lines are parallel. A zero
    /// direction is parallel to everything.
    pub fn is_parallel(&self, other: &Line) -> bool {
        let d1 = self.direction;
        let d2 = other.direction;
        d1.cross(d2).abs() <= EPSILON * d1.magnitude() * d2.magnitude()
    }

    /// Solve p1 + t * d1 = p2 + s * d2 for t.
    /// \returns the intersection point, or None if the lines are parallel.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        if self.is_parallel(other) {
            return None;
        }
        let d1 = self.direction;
        let d2 = other.direction;
        let delta = Vector::between(self.point, other.point);
        let t = delta.cross(d2) / d1.cross(d2);
        Some(self.point.translate(d1.scale(t)))
    }
}

/// \return true if \p x is in the inclusive range P.x .. P.y.
pub fn in_range(range: (f64, f64), x: f64) -> bool {
    x >= range.0 && x <= range.1
}

#[cfg(test)]
fn almost(a: f64, b: f64) {
    let abs_difference = (b - a).abs();
    assert!(abs_difference < 1e-10, "{} != {}", a, b);
}

#[test]
fn test_rotate() {
    // 180'
    let r = Vector::unit().rotate_deg(180.);
    almost(r.x, -1.);
    almost(r.y, 0.);

    //90'
    let r = Vector::unit().rotate_deg(90.);
    almost(r.x, 0.);
    almost(r.y, 1.);

    //45'
    let r = Vector::unit().rotate_deg(45.);
    almost(r.x, 1. / 2_f64.sqrt());
    almost(r.y, 1. / 2_f64.sqrt());

    // Rotation keeps the length.
    let v = Vector::new(3., 4.).rotate_deg(123.);
    almost(v.magnitude(), 5.);
}

#[test]
fn test_vector_arithmetic() {
    let a = Point::new(1., 2.);
    let b = Point::new(4., 6.);
    let v = Vector::between(a, b);
    assert_eq!(v, Vector::new(3., 4.));
    assert_eq!(v.magnitude(), 5.);
    assert_eq!(a.translate(v), b);
    assert_eq!(v / 5. * 10., Vector::new(6., 8.));
    assert_eq!(v + v.neg(), Vector::zero());
    let total: Vector = vec![v, v, v].into_iter().sum();
    assert_eq!(total, Vector::new(9., 12.));
}

#[test]
fn test_line_intersection() {
    // The diagonals of a square meet in the middle.
    let l0 = Line::through(Point::new(0., 0.), Point::new(10., 10.));
    let l1 = Line::through(Point::new(0., 10.), Point::new(10., 0.));
    let p = l0.intersection(&l1).unwrap();
    almost(p.x, 5.);
    almost(p.y, 5.);

    // Parallel lines don't intersect.
    let l2 = Line::through(Point::new(0., 1.), Point::new(10., 11.));
    assert!(l0.intersection(&l2).is_none());

    // Neither does a line with no direction.
    let l3 = Line::new(Point::new(3., 3.), Vector::zero());
    assert!(l0.intersection(&l3).is_none());
}

#[test]
fn test_segment_nearest_point() {
    let seg = Segment::new(Point::new(0., 0.), Point::new(100., 0.));
    assert!(seg.has(Point::new(50., 0.)));
    assert!(seg.has(Point::new(100. + EPSILON / 2., 0.)));
    assert!(!seg.has(Point::new(101., 0.)));

    // Above the middle of the segment.
    let p = seg.nearest_point(Point::new(30., 40.));
    almost(p.x, 30.);
    almost(p.y, 0.);

    // Past the end of the segment.
    let p = seg.nearest_point(Point::new(130., 40.));
    assert_eq!(p, Point::new(100., 0.));
    let p = seg.nearest_point(Point::new(-30., -40.));
    assert_eq!(p, Point::new(0., 0.));

    // A segment that collapsed into a point.
    let seg = Segment::new(Point::new(5., 5.), Point::new(5., 5.));
    assert!(seg.is_degenerate());
    assert_eq!(seg.nearest_point(Point::new(0., 0.)), Point::new(5., 5.));
}

#[test]
fn test_clamp() {
    let lo = Point::new(50., 50.);
    let hi = Point::new(950., 950.);
    assert_eq!(Point::new(-3., 2000.).clamp(lo, hi), Point::new(50., 950.));
    assert_eq!(Point::new(f64::NAN, 70.).clamp(lo, hi), Point::new(50., 70.));
    // An empty range resolves to the upper bound.
    let p = Point::new(10., 10.).clamp(Point::splat(60.), Point::splat(40.));
    assert_eq!(p, Point::splat(40.));
}
