//! Points, bounding boxes and exact bounds of path segments.

use std::f64::consts::{PI, TAU};

use crate::path::Segment;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirror this point through `center`.
    pub fn reflect_about(self, center: Point) -> Point {
        Point::new(2.0 * center.x - self.x, 2.0 * center.y - self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bbox = BBox::from_point(points.next()?);
        for p in points {
            bbox.include(p);
        }
        Some(bbox)
    }

    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(self, other: BBox) -> BBox {
        BBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the box by `amount` on every side.
    pub fn padded(self, amount: f64) -> BBox {
        BBox {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_finite(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Bounds of a whole path, `None` when it has no segments.
pub fn path_bounds(segments: &[Segment]) -> Option<BBox> {
    segments
        .iter()
        .map(segment_bounds)
        .reduce(BBox::union)
}

/// Exact bounds of one segment, curve extrema included.
pub fn segment_bounds(segment: &Segment) -> BBox {
    match *segment {
        Segment::MoveTo(p) => BBox::from_point(p),
        Segment::Line { from, to } => {
            let mut bbox = BBox::from_point(from);
            bbox.include(to);
            bbox
        }
        Segment::Quad { from, ctrl, to } => {
            let mut bbox = BBox::from_point(from);
            bbox.include(to);
            for t in [
                quad_extremum(from.x, ctrl.x, to.x),
                quad_extremum(from.y, ctrl.y, to.y),
            ]
            .into_iter()
            .flatten()
            {
                let mt = 1.0 - t;
                bbox.include(Point::new(
                    mt * mt * from.x + 2.0 * mt * t * ctrl.x + t * t * to.x,
                    mt * mt * from.y + 2.0 * mt * t * ctrl.y + t * t * to.y,
                ));
            }
            bbox
        }
        Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        } => {
            let mut bbox = BBox::from_point(from);
            bbox.include(to);
            let ts = cubic_extrema(from.x, ctrl1.x, ctrl2.x, to.x)
                .into_iter()
                .chain(cubic_extrema(from.y, ctrl1.y, ctrl2.y, to.y))
                .flatten();
            for t in ts {
                bbox.include(Point::new(
                    cubic_at(from.x, ctrl1.x, ctrl2.x, to.x, t),
                    cubic_at(from.y, ctrl1.y, ctrl2.y, to.y, t),
                ));
            }
            bbox
        }
        Segment::Arc {
            from,
            rx,
            ry,
            x_axis_rotation,
            large_arc,
            sweep,
            to,
        } => arc_bounds(from, rx, ry, x_axis_rotation, large_arc, sweep, to),
    }
}

fn in_unit_interval(t: f64) -> Option<f64> {
    (t > 0.0 && t < 1.0).then_some(t)
}

fn quad_extremum(p0: f64, p1: f64, p2: f64) -> Option<f64> {
    let denom = p0 - 2.0 * p1 + p2;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    in_unit_interval((p0 - p1) / denom)
}

/// Roots in (0, 1) of the derivative of a cubic Bézier coordinate.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    let a = 3.0 * (-p0 + 3.0 * p1 - 3.0 * p2 + p3);
    let b = 6.0 * (p0 - 2.0 * p1 + p2);
    let c = 3.0 * (p1 - p0);

    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return [None, None];
        }
        return [in_unit_interval(-c / b), None];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let sq = disc.sqrt();
    [
        in_unit_interval((-b + sq) / (2.0 * a)),
        in_unit_interval((-b - sq) / (2.0 * a)),
    ]
}

fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

/// Bounds of an endpoint-parameterised elliptical arc.
///
/// Converts to center parameterisation (SVG implementation notes, F.6.5)
/// and adds the points where the ellipse reaches its x/y extremes inside
/// the swept angle range.
fn arc_bounds(
    from: Point,
    rx: f64,
    ry: f64,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> BBox {
    let mut bbox = BBox::from_point(from);
    bbox.include(to);

    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if from == to || rx == 0.0 || ry == 0.0 {
        return bbox;
    }

    let phi = x_axis_rotation.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale radii up when they cannot span the endpoints
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (num / den).max(0.0).sqrt();
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    let theta1 = vector_angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = vector_angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && delta > 0.0 {
        delta -= TAU;
    } else if sweep && delta < 0.0 {
        delta += TAU;
    }

    let theta_x = (-ry * sin_phi).atan2(rx * cos_phi);
    let theta_y = (ry * cos_phi).atan2(rx * sin_phi);

    for theta in [theta_x, theta_x + PI, theta_y, theta_y + PI] {
        let swept = if delta >= 0.0 {
            (theta - theta1).rem_euclid(TAU) <= delta
        } else {
            (theta1 - theta).rem_euclid(TAU) <= -delta
        };
        if swept {
            let (sin_t, cos_t) = theta.sin_cos();
            bbox.include(Point::new(
                cx + rx * cos_phi * cos_t - ry * sin_phi * sin_t,
                cy + rx * sin_phi * cos_t + ry * cos_phi * sin_t,
            ));
        }
    }

    bbox
}

fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    (ux * vy - uy * vx).atan2(ux * vx + uy * vy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse_path;

    fn bounds(d: &str) -> BBox {
        path_bounds(&parse_path(d).unwrap()).unwrap()
    }

    fn assert_close(actual: BBox, expected: [f64; 4]) {
        let got = [actual.min_x, actual.min_y, actual.max_x, actual.max_y];
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-6, "got {:?}, expected {:?}", got, expected);
        }
    }

    #[test]
    fn test_line_bounds() {
        assert_close(bounds("M 10 20 L 5 40 H 30"), [5.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_quad_extremum() {
        // Peak of the parabola is at t = 0.5, y = 5
        assert_close(bounds("M0 0 Q5 10 10 0"), [0.0, 0.0, 10.0, 5.0]);
    }

    #[test]
    fn test_cubic_extrema() {
        // Symmetric bump: maximum y = 0.75 * 10
        assert_close(bounds("M0 0 C0 10 10 10 10 0"), [0.0, 0.0, 10.0, 7.5]);
    }

    #[test]
    fn test_half_circle_arc() {
        // Upper half of a radius 5 circle centred at (5, 0) in SVG's y-down space
        assert_close(bounds("M0 0 A5 5 0 0 1 10 0"), [0.0, -5.0, 10.0, 0.0]);
        assert_close(bounds("M0 0 A5 5 0 0 0 10 0"), [0.0, 0.0, 10.0, 5.0]);
    }

    #[test]
    fn test_full_circle_from_two_arcs() {
        let d = "M 5, 10 a 5,5 0 1,0 10,0 a 5,5 0 1,0 -10,0";
        assert_close(bounds(d), [5.0, 5.0, 15.0, 15.0]);
    }

    #[test]
    fn test_arc_radii_scaled_up() {
        // Radius 1 cannot reach; the arc becomes a half circle of radius 5
        assert_close(bounds("M0 0 A1 1 0 0 1 10 0"), [0.0, -5.0, 10.0, 0.0]);
    }

    #[test]
    fn test_zero_radius_arc_is_line() {
        assert_close(bounds("M0 0 A0 5 0 0 1 10 4"), [0.0, 0.0, 10.0, 4.0]);
    }

    #[test]
    fn test_padded() {
        let bbox = BBox::from_points([Point::new(10.0, 20.0), Point::new(40.0, 60.0)]).unwrap();
        let padded = bbox.padded(5.0);
        assert_close(padded, [5.0, 15.0, 45.0, 65.0]);
        assert_eq!(padded.width(), 40.0);
        assert_eq!(padded.height(), 50.0);
    }

    #[test]
    fn test_empty_path_has_no_bounds() {
        assert!(path_bounds(&[]).is_none());
        assert!(BBox::from_points(std::iter::empty()).is_none());
    }
}
