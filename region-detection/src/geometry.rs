use crate::Point;
use geo::{Area, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::Point2;

/// Signed polygon area using the shoelace formula.
///
/// Counter-clockwise rings (in a y-up frame) are positive. Fewer than 3 points is
/// degenerate and yields 0.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let coords: Vec<Coord> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    GeoPolygon::new(LineString::from(coords), vec![]).signed_area()
}

/// Euclidean distance from `p` to the segment `a`-`b`.
///
/// The projection parameter is clamped to [0, 1], so points beyond either end measure
/// to the nearest endpoint.
pub fn point_segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let p = Point2::new(p.x, p.y);
    let a = Point2::new(a.x, a.y);
    let b = Point2::new(b.x, b.y);

    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return nalgebra::distance(&p, &a);
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    nalgebra::distance(&p, &(a + ab * t))
}

/// Boundary-inclusive point-in-polygon test.
///
/// A point within `tolerance` of any edge is inside; drawn polygons carry pixel jitter and
/// a point sitting on a slightly-off edge must not be rejected. Otherwise falls back to
/// even-odd ray casting along +x.
pub fn point_in_polygon(p: &Point, polygon: &[Point], tolerance: f64) -> bool {
    let n = polygon.len();
    if n == 0 {
        return false;
    }

    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        if point_segment_distance(p, a, b) <= tolerance {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn from_points(points: &[Point]) -> Self {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };

        for point in points {
            bbox.min_x = bbox.min_x.min(point.x);
            bbox.min_y = bbox.min_y.min(point.y);
            bbox.max_x = bbox.max_x.max(point.x);
            bbox.max_y = bbox.max_y.max(point.y);
        }

        bbox
    }

    pub fn expanded(&self, margin: f64) -> Self {
        BoundingBox {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}
