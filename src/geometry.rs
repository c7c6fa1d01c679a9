use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in whatever space the caller works in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn from_origin_size(origin: Point, width: f32, height: f32) -> Self {
        Self {
            min_x: origin.x,
            min_y: origin.y,
            max_x: origin.x + width,
            max_y: origin.y + height,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let eps = 1e-3_f32;
        point.x >= self.min_x - eps
            && point.x <= self.max_x + eps
            && point.y >= self.min_y - eps
            && point.y <= self.max_y + eps
    }

    pub fn union(self, other: Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn include(self, point: Point) -> Rect {
        Rect {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }
}

/// One SVG path segment command, always in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Horizontal(f32),
    Vertical(f32),
    Quadratic { control: Point, to: Point },
    Cubic {
        control1: Point,
        control2: Point,
        to: Point,
    },
}

impl PathCommand {
    fn coordinates(&self) -> Vec<f32> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p.x, p.y],
            PathCommand::Horizontal(x) => vec![x],
            PathCommand::Vertical(y) => vec![y],
            PathCommand::Quadratic { control, to } => vec![control.x, control.y, to.x, to.y],
            PathCommand::Cubic {
                control1,
                control2,
                to,
            } => vec![
                control1.x, control1.y, control2.x, control2.y, to.x, to.y,
            ],
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(p) => write!(f, "M{}", format_point(p)),
            PathCommand::LineTo(p) => write!(f, "L{}", format_point(p)),
            PathCommand::Horizontal(x) => write!(f, "H{}", format_number(x)),
            PathCommand::Vertical(y) => write!(f, "V{}", format_number(y)),
            PathCommand::Quadratic { control, to } => {
                write!(f, "Q{} {}", format_point(control), format_point(to))
            }
            PathCommand::Cubic {
                control1,
                control2,
                to,
            } => write!(
                f,
                "C{} {} {}",
                format_point(control1),
                format_point(control2),
                format_point(to)
            ),
        }
    }
}

/// Ordered list of path commands describing one stroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathDescriptor {
    commands: Vec<PathCommand>,
}

impl PathDescriptor {
    pub fn starting_at(start: Point) -> Self {
        Self {
            commands: vec![PathCommand::MoveTo(start)],
        }
    }

    pub fn line_to(mut self, to: Point) -> Self {
        self.commands.push(PathCommand::LineTo(to));
        self
    }

    pub fn horizontal(mut self, x: f32) -> Self {
        self.commands.push(PathCommand::Horizontal(x));
        self
    }

    pub fn vertical(mut self, y: f32) -> Self {
        self.commands.push(PathCommand::Vertical(y));
        self
    }

    pub fn quadratic(mut self, control: Point, to: Point) -> Self {
        self.commands.push(PathCommand::Quadratic { control, to });
        self
    }

    pub fn cubic(mut self, control1: Point, control2: Point, to: Point) -> Self {
        self.commands.push(PathCommand::Cubic {
            control1,
            control2,
            to,
        });
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Number of drawing commands, i.e. everything after the initial move.
    pub fn segment_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| !matches!(command, PathCommand::MoveTo(_)))
            .count()
    }

    /// Number of straight runs (`L`, `H`, `V`), ignoring corner arcs.
    pub fn straight_run_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    PathCommand::LineTo(_) | PathCommand::Horizontal(_) | PathCommand::Vertical(_)
                )
            })
            .count()
    }

    pub fn is_finite(&self) -> bool {
        self.commands
            .iter()
            .all(|command| command.coordinates().iter().all(|value| value.is_finite()))
    }

    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, command) in self.commands.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

impl Serialize for PathDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Formats a coordinate for path data: integral values drop the fraction and
/// negative zero prints as `0`.
pub fn format_number(value: f32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

fn format_point(point: Point) -> String {
    format!("{},{}", format_number(point.x), format_number(point.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_integral_and_fractional_numbers() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.25), "-3.25");
    }

    #[test]
    fn renders_commands_in_order() {
        let path = PathDescriptor::starting_at(Point::new(0.0, 0.0))
            .vertical(50.0)
            .horizontal(100.0)
            .quadratic(Point::new(100.0, 60.0), Point::new(95.0, 60.0))
            .cubic(
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0),
                Point::new(5.5, 6.0),
            )
            .line_to(Point::new(7.0, 8.0));

        assert_eq!(
            path.to_svg(),
            "M0,0 V50 H100 Q100,60 95,60 C1,2 3,4 5.5,6 L7,8"
        );
        assert_eq!(path.segment_count(), 5);
        assert_eq!(path.straight_run_count(), 3);
    }

    #[test]
    fn detects_non_finite_coordinates() {
        let path = PathDescriptor::starting_at(Point::new(0.0, 0.0)).horizontal(f32::NAN);
        assert!(!path.is_finite());
        assert!(PathDescriptor::starting_at(Point::new(1.0, 1.0)).is_finite());
    }

    #[test]
    fn rect_union_and_contains() {
        let a = Rect::from_origin_size(Point::new(0.0, 0.0), 10.0, 10.0);
        let b = Rect::from_origin_size(Point::new(20.0, 5.0), 5.0, 20.0);
        let merged = a.union(b);
        assert_eq!(merged.width(), 25.0);
        assert_eq!(merged.height(), 25.0);
        assert!(merged.contains(Point::new(12.0, 12.0)));
        assert!(!a.contains(Point::new(12.0, 12.0)));
    }
}
