use super::Anchors;
use crate::geometry::{PathDescriptor, Point};

/// Midpoint pushed a quarter of the anchor offset sideways, perpendicular to
/// the source -> target direction, so an untouched edge shows a gentle arc.
pub fn default_control_point(anchors: &Anchors) -> Point {
    let (source, target) = (anchors.source, anchors.target);
    Point {
        x: (source.x + target.x) / 2.0 + (target.y - source.y) / 4.0,
        y: (source.y + target.y) / 2.0 + (source.x - target.x) / 4.0,
    }
}

/// Single cubic segment that uses `control` for both interior handles.
pub fn path(source: Point, target: Point, control: Point) -> PathDescriptor {
    PathDescriptor::starting_at(source).cubic(control, control, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arc_flips_with_direction() {
        let anchors = Anchors::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(default_control_point(&anchors), Point::new(50.0, -25.0));

        let reversed = Anchors::new(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(default_control_point(&reversed), Point::new(50.0, 25.0));
    }

    #[test]
    fn path_repeats_control_point() {
        let path = path(
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(75.0, 25.0),
        );
        assert_eq!(path.to_svg(), "M0,0 C75,25 75,25 100,100");
    }
}
