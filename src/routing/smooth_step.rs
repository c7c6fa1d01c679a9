use super::free_bend::rounded_polyline;
use crate::geometry::{PathDescriptor, Point};

/// Step route with every right angle replaced by a quadratic arc of `radius`.
///
/// Each joint's radius is clamped to half of both runs meeting there, so an
/// arc never overshoots the target anchor or doubles back on a short leg. A
/// joint between a zero-length run and its neighbour stays a plain corner.
pub fn path(
    source: Point,
    target: Point,
    control: Point,
    crossed: bool,
    radius: f32,
) -> PathDescriptor {
    if crossed {
        rounded_polyline(
            &[
                source,
                Point::new(control.x, source.y),
                control,
                Point::new(target.x, control.y),
                target,
            ],
            radius,
        )
    } else {
        rounded_polyline(
            &[
                source,
                Point::new(source.x, control.y),
                Point::new(target.x, control.y),
                target,
            ],
            radius,
        )
    }
}
