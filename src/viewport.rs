use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::interaction::CoordinateProjector;

/// Pan and zoom of the canvas, plus where the canvas element sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f32,
    /// Screen rectangle of the canvas element. `None` until it has been measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

impl Viewport {
    pub const ZOOM_MIN: f32 = 0.1;
    pub const ZOOM_MAX: f32 = 4.0;

    pub fn new() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
            bounds: None,
        }
    }

    pub fn measured(bounds: Rect) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::new()
        }
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom() * factor).clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
    }

    /// Zoom factor safe to divide by.
    pub fn zoom(&self) -> f32 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    /// Inverse of [`Viewport::project`].
    pub fn to_device(&self, point: Point) -> Option<Point> {
        let bounds = self.bounds?;
        let zoom = self.zoom();
        Some(Point::new(
            point.x * zoom + self.pan.x + bounds.min_x,
            point.y * zoom + self.pan.y + bounds.min_y,
        ))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateProjector for Viewport {
    fn project(&self, device: Point) -> Option<Point> {
        let bounds = self.bounds?;
        let zoom = self.zoom();
        Some(Point::new(
            (device.x - bounds.min_x - self.pan.x) / zoom,
            (device.y - bounds.min_y - self.pan.y) / zoom,
        ))
    }
}
