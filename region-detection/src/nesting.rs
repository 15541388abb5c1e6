use crate::geometry::{point_in_polygon, signed_area, BoundingBox};
use crate::Point;
use ordered_float::OrderedFloat;
use tracing::trace;

/// A discovered cycle with its resolved geometry
#[derive(Debug, Clone)]
pub struct LoopInfo {
    pub vertex_ids: Vec<String>,
    pub points: Vec<Point>,
    pub signed_area: f64,
    pub area: f64,
    pub bbox: BoundingBox,
}

impl LoopInfo {
    pub fn new(vertex_ids: Vec<String>, points: Vec<Point>) -> Self {
        let signed_area = signed_area(&points);
        let bbox = BoundingBox::from_points(&points);
        Self {
            vertex_ids,
            points,
            signed_area,
            area: signed_area.abs(),
            bbox,
        }
    }

    /// Loops with fewer than 3 points or no area take no part in nesting
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.area > f64::EPSILON
    }
}

/// Parent and depth of every loop, indexed like the input loops
#[derive(Debug, Clone, PartialEq)]
pub struct NestingForest {
    pub parent: Vec<Option<usize>>,
    pub depth: Vec<usize>,
}

/// Every point of `child` lies inside `candidate` (edge band included)
fn encloses(candidate: &LoopInfo, child: &LoopInfo, tolerance: f64) -> bool {
    candidate.bbox.expanded(tolerance).contains_box(&child.bbox)
        && child
            .points
            .iter()
            .all(|p| point_in_polygon(p, &candidate.points, tolerance))
}

/// Resolve the nesting forest of a set of loops.
///
/// The parent of a loop is the smallest-area loop that is strictly larger and contains all
/// of its points, i.e. its tightest enclosing loop. Equal areas never nest, which keeps the
/// parent relation acyclic. The bounding-box check only rules out candidates that the
/// point test would reject anyway.
pub fn resolve_nesting(loops: &[LoopInfo], tolerance: f64) -> NestingForest {
    let parent: Vec<Option<usize>> = loops
        .iter()
        .enumerate()
        .map(|(i, child)| {
            if !child.is_valid() {
                return None;
            }

            loops
                .iter()
                .enumerate()
                .filter(|&(j, candidate)| {
                    j != i
                        && candidate.is_valid()
                        && candidate.area > child.area
                        && encloses(candidate, child, tolerance)
                })
                .min_by_key(|(_, candidate)| OrderedFloat(candidate.area))
                .map(|(j, _)| j)
        })
        .collect();

    let mut depth: Vec<Option<usize>> = vec![None; loops.len()];
    for i in 0..loops.len() {
        // Walk up to the first ancestor with a known depth, then fill in on the way back
        let mut chain = vec![i];
        let mut base = 0;
        while let Some(&top) = chain.last() {
            if let Some(d) = depth[top] {
                chain.pop();
                base = d + 1;
                break;
            }
            match parent[top] {
                Some(p) => chain.push(p),
                None => break,
            }
        }
        for &node in chain.iter().rev() {
            depth[node] = Some(base);
            base += 1;
        }
    }

    let depth: Vec<usize> = depth.into_iter().map(|d| d.unwrap_or(0)).collect();
    trace!("Resolved nesting: parents {:?}, depths {:?}", parent, depth);

    NestingForest { parent, depth }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, min: f64, max: f64) -> LoopInfo {
        LoopInfo::new(
            (0..4).map(|i| format!("{name}{i}")).collect(),
            vec![
                Point::new(min, min),
                Point::new(max, min),
                Point::new(max, max),
                Point::new(min, max),
            ],
        )
    }

    #[test]
    fn test_loop_info_area() {
        let info = square("s", 0.0, 10.0);
        assert!((info.area - 100.0).abs() < 1e-9);
        assert!(info.is_valid());
    }

    #[test]
    fn test_degenerate_loop_is_invalid() {
        let collinear = LoopInfo::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)],
        );
        let short = LoopInfo::new(
            vec!["a".into(), "b".into()],
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
        );
        assert!(!collinear.is_valid());
        assert!(!short.is_valid());
    }

    #[test]
    fn test_disjoint_loops_are_roots() {
        let loops = vec![square("a", 0.0, 10.0), square("b", 100.0, 110.0)];
        let forest = resolve_nesting(&loops, 8.0);

        assert_eq!(forest.parent, vec![None, None]);
        assert_eq!(forest.depth, vec![0, 0]);
    }

    #[test]
    fn test_tightest_parent_is_chosen() {
        // Listed outermost first so the first containing candidate is not the tightest
        let loops = vec![
            square("outer", 0.0, 300.0),
            square("middle", 50.0, 250.0),
            square("inner", 100.0, 200.0),
        ];
        let forest = resolve_nesting(&loops, 8.0);

        assert_eq!(forest.parent, vec![None, Some(0), Some(1)]);
        assert_eq!(forest.depth, vec![0, 1, 2]);
    }

    #[test]
    fn test_depth_independent_of_order() {
        let loops = vec![
            square("inner", 100.0, 200.0),
            square("middle", 50.0, 250.0),
            square("outer", 0.0, 300.0),
        ];
        let forest = resolve_nesting(&loops, 8.0);

        assert_eq!(forest.parent, vec![Some(1), Some(2), None]);
        assert_eq!(forest.depth, vec![2, 1, 0]);
    }

    #[test]
    fn test_equal_area_loops_do_not_nest() {
        let loops = vec![square("a", 0.0, 10.0), square("b", 0.0, 10.0)];
        let forest = resolve_nesting(&loops, 8.0);

        assert_eq!(forest.parent, vec![None, None]);
    }

    #[test]
    fn test_equal_area_parents_first_wins() {
        let left = square("left", 0.0, 100.0);
        let right = square("right", 5.0, 105.0);
        let child = square("child", 40.0, 60.0);

        let loops = vec![left.clone(), right.clone(), child.clone()];
        let forest = resolve_nesting(&loops, 8.0);
        assert_eq!(forest.parent, vec![None, None, Some(0)]);
        assert_eq!(forest.depth, vec![0, 0, 1]);

        let loops = vec![right, left, child];
        assert_eq!(resolve_nesting(&loops, 8.0).parent, vec![None, None, Some(0)]);
    }

    #[test]
    fn test_tolerance_allows_jittered_child() {
        // Inner loop pokes 3 units past the outer edge
        let loops = vec![square("outer", 0.0, 100.0), square("inner", 50.0, 103.0)];

        assert_eq!(resolve_nesting(&loops, 8.0).parent, vec![None, Some(0)]);
        assert_eq!(resolve_nesting(&loops, 1.0).parent, vec![None, None]);
    }

    #[test]
    fn test_invalid_loops_are_skipped_entirely() {
        let degenerate = LoopInfo::new(
            vec!["p".into(), "q".into(), "r".into()],
            vec![Point::new(20.0, 20.0), Point::new(30.0, 20.0), Point::new(40.0, 20.0)],
        );
        let loops = vec![square("outer", 0.0, 100.0), degenerate, square("inner", 10.0, 50.0)];
        let forest = resolve_nesting(&loops, 8.0);

        assert_eq!(forest.parent, vec![None, None, Some(0)]);
        assert_eq!(forest.depth, vec![0, 0, 1]);
    }

    #[test]
    fn test_empty_input() {
        let forest = resolve_nesting(&[], 8.0);
        assert!(forest.parent.is_empty());
        assert!(forest.depth.is_empty());
    }
}
