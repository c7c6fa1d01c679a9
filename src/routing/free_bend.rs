use super::{Anchors, BendAxis};
use crate::geometry::{PathDescriptor, Point};

pub fn default_bend(anchors: &Anchors) -> Point {
    anchors.midpoint()
}

/// Orthogonal route through a bend point.
///
/// `Horizontal` leaves the source horizontally and runs the vertical leg at
/// `bend.x`; `Vertical` leaves vertically and runs the horizontal leg at
/// `bend.y`. Corners are rounded with `radius`, each clamped to half of the
/// shorter adjacent run.
pub fn path(
    source: Point,
    target: Point,
    bend: Point,
    axis: BendAxis,
    radius: f32,
) -> PathDescriptor {
    let corners = match axis {
        BendAxis::Horizontal => [Point::new(bend.x, source.y), Point::new(bend.x, target.y)],
        BendAxis::Vertical => [Point::new(source.x, bend.y), Point::new(target.x, bend.y)],
    };
    rounded_polyline(&[source, corners[0], corners[1], target], radius)
}

/// Polyline through `points` with quadratic arcs at every interior vertex.
pub fn rounded_polyline(points: &[Point], radius: f32) -> PathDescriptor {
    let Some((&first, rest)) = points.split_first() else {
        return PathDescriptor::default();
    };
    let mut path = PathDescriptor::starting_at(first);
    if rest.is_empty() {
        return path;
    }

    let radius = radius.max(0.0);
    for window in points.windows(3) {
        let (prev, corner, next) = (window[0], window[1], window[2]);
        let run_in = prev.distance_to(corner);
        let run_out = corner.distance_to(next);
        let r = radius.min(run_in / 2.0).min(run_out / 2.0);

        if r <= 0.0 {
            path = path.line_to(corner);
            continue;
        }

        let entry = Point::new(
            corner.x - (corner.x - prev.x) / run_in * r,
            corner.y - (corner.y - prev.y) / run_in * r,
        );
        let exit = Point::new(
            corner.x + (next.x - corner.x) / run_out * r,
            corner.y + (next.y - corner.y) / run_out * r,
        );
        path = path.line_to(entry).quadratic(corner, exit);
    }

    match points.last() {
        Some(&last) => path.line_to(last),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_FREE_BEND_RADIUS;

    #[test]
    fn horizontal_bend_rounds_both_corners() {
        let path = path(
            Point::new(0.0, 0.0),
            Point::new(200.0, 100.0),
            Point::new(100.0, 50.0),
            BendAxis::Horizontal,
            DEFAULT_FREE_BEND_RADIUS,
        );
        assert_eq!(
            path.to_svg(),
            "M0,0 L85,0 Q100,0 100,15 L100,85 Q100,100 115,100 L200,100"
        );
    }

    #[test]
    fn vertical_bend_clamps_to_short_runs() {
        let path = path(
            Point::new(0.0, 0.0),
            Point::new(40.0, 200.0),
            Point::new(20.0, 100.0),
            BendAxis::Vertical,
            DEFAULT_FREE_BEND_RADIUS,
        );
        assert_eq!(
            path.to_svg(),
            "M0,0 L0,85 Q0,100 15,100 L25,100 Q40,100 40,115 L40,200"
        );

        let tight = path_with_short_leg();
        assert_eq!(
            tight.to_svg(),
            "M0,0 L0,95 Q0,100 5,100 L5,100 Q10,100 10,105 L10,200"
        );
    }

    fn path_with_short_leg() -> PathDescriptor {
        path(
            Point::new(0.0, 0.0),
            Point::new(10.0, 200.0),
            Point::new(5.0, 100.0),
            BendAxis::Vertical,
            DEFAULT_FREE_BEND_RADIUS,
        )
    }

    #[test]
    fn axis_is_not_re_evaluated_when_stretched() {
        // Anchors are now far taller than wide, but the stored axis wins.
        let path = path(
            Point::new(0.0, 0.0),
            Point::new(20.0, 300.0),
            Point::new(10.0, 150.0),
            BendAxis::Horizontal,
            0.0,
        );
        assert_eq!(path.to_svg(), "M0,0 L10,0 L10,300 L20,300");
    }

    #[test]
    fn zero_length_runs_skip_arcs() {
        let p = Point::new(3.0, 3.0);
        let path = path(p, p, p, BendAxis::Horizontal, 15.0);
        assert_eq!(path.to_svg(), "M3,3 L3,3 L3,3 L3,3");
        assert!(path.is_finite());
    }
}
