use super::Anchors;
use crate::geometry::{PathDescriptor, Point};

pub fn default_control_point(anchors: &Anchors) -> Point {
    anchors.midpoint()
}

/// Orthogonal route through `control`.
///
/// While the control point sits inside the anchors' x-span the route is
/// vertical-horizontal-vertical and only `control.y` matters. Once `crossed`,
/// a leading horizontal run reaches `control.x` first, giving four segments.
pub fn path(source: Point, target: Point, control: Point, crossed: bool) -> PathDescriptor {
    if crossed {
        PathDescriptor::starting_at(source)
            .horizontal(control.x)
            .vertical(control.y)
            .horizontal(target.x)
            .vertical(target.y)
    } else {
        PathDescriptor::starting_at(source)
            .vertical(control.y)
            .horizontal(target.x)
            .vertical(target.y)
    }
}

pub(crate) fn label_position(source: Point, target: Point, control: Point, crossed: bool) -> Point {
    if crossed {
        control
    } else {
        Point::new((source.x + target.x) / 2.0, control.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_segment_route_ignores_control_x() {
        let source = Point::new(0.0, 0.0);
        let target = Point::new(100.0, 100.0);
        let a = path(source, target, Point::new(10.0, 30.0), false);
        let b = path(source, target, Point::new(90.0, 30.0), false);
        assert_eq!(a, b);
        assert_eq!(a.to_svg(), "M0,0 V30 H100 V100");
    }

    #[test]
    fn four_segment_route_passes_through_control() {
        let route = path(
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(-40.0, 60.0),
            true,
        );
        assert_eq!(route.to_svg(), "M0,0 H-40 V60 H100 V100");
    }

    #[test]
    fn label_sits_on_middle_run() {
        let source = Point::new(0.0, 0.0);
        let target = Point::new(100.0, 100.0);
        assert_eq!(
            label_position(source, target, Point::new(20.0, 40.0), false),
            Point::new(50.0, 40.0)
        );
        assert_eq!(
            label_position(source, target, Point::new(140.0, 40.0), true),
            Point::new(140.0, 40.0)
        );
    }
}
