//! Edge geometry for every edge type the canvas knows about.
//!
//! Each curve family lives in its own module and exposes the same two pieces:
//! a default control point derived purely from the anchors, and a path builder.
//! [`EdgeType::route`] picks the family and packages the result as a [`Route`].

pub mod bezier;
pub mod free_bend;
pub mod smooth_step;
pub mod step;

use serde::{Deserialize, Serialize};

use crate::geometry::{PathDescriptor, Point};
use crate::{DEFAULT_FREE_BEND_RADIUS, DEFAULT_HANDLE_RADIUS, DEFAULT_SMOOTH_STEP_RADIUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeType {
    #[default]
    #[serde(rename = "default", alias = "bezier")]
    Bezier,
    #[serde(rename = "straight")]
    Straight,
    #[serde(rename = "step")]
    Step,
    #[serde(rename = "smoothstep")]
    SmoothStep,
    #[serde(rename = "freebend")]
    FreeBend,
}

/// Where a click on the path puts a freshly created control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    AtPointer,
    Midpoint,
    Disabled,
}

/// Side of a shape an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Right,
    Bottom,
    Left,
}

/// Orthogonal routing mode of a free-bend edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BendAxis {
    Horizontal,
    Vertical,
}

impl BendAxis {
    /// Horizontal when the anchors are at least as far apart in x as in y.
    pub fn for_anchors(anchors: &Anchors) -> Self {
        let dx = (anchors.target.x - anchors.source.x).abs();
        let dy = (anchors.target.y - anchors.source.y).abs();
        if dx >= dy {
            BendAxis::Horizontal
        } else {
            BendAxis::Vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchors {
    pub source: Point,
    pub target: Point,
    pub source_side: HandleSide,
    pub target_side: HandleSide,
}

impl Anchors {
    pub fn new(source: Point, target: Point) -> Self {
        Self {
            source,
            target,
            source_side: HandleSide::Bottom,
            target_side: HandleSide::Top,
        }
    }

    pub fn with_sides(mut self, source_side: HandleSide, target_side: HandleSide) -> Self {
        self.source_side = source_side;
        self.target_side = target_side;
        self
    }

    pub fn midpoint(&self) -> Point {
        self.source.midpoint(self.target)
    }

    pub fn min_x(&self) -> f32 {
        self.source.x.min(self.target.x)
    }

    pub fn max_x(&self) -> f32 {
        self.source.x.max(self.target.x)
    }
}

/// `true` when `control.x` lies outside the closed x-span of the anchors.
pub fn is_crossed(anchors: &Anchors, control: Point) -> bool {
    control.x < anchors.min_x() || control.x > anchors.max_x()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    pub smooth_step_radius: f32,
    pub free_bend_radius: f32,
    pub handle_radius: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            smooth_step_radius: DEFAULT_SMOOTH_STEP_RADIUS,
            free_bend_radius: DEFAULT_FREE_BEND_RADIUS,
            handle_radius: DEFAULT_HANDLE_RADIUS,
        }
    }
}

/// Renderable geometry of one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: PathDescriptor,
    /// Control point the path was computed from (the default when none is placed).
    pub control_point: Point,
    pub crossed: bool,
    pub label_position: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bend_axis: Option<BendAxis>,
}

/// Interactive hit target drawn at a placed control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Handle {
    pub center: Point,
    pub radius: f32,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Bezier => "default",
            EdgeType::Straight => "straight",
            EdgeType::Step => "step",
            EdgeType::SmoothStep => "smoothstep",
            EdgeType::FreeBend => "freebend",
        }
    }

    pub fn placement_policy(&self) -> PlacementPolicy {
        match self {
            EdgeType::Bezier | EdgeType::Step | EdgeType::SmoothStep => PlacementPolicy::AtPointer,
            EdgeType::FreeBend => PlacementPolicy::Midpoint,
            EdgeType::Straight => PlacementPolicy::Disabled,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.placement_policy() != PlacementPolicy::Disabled
    }

    /// Whether the path template depends on the crossed flag.
    pub fn tracks_crossing(&self) -> bool {
        matches!(self, EdgeType::Step | EdgeType::SmoothStep)
    }

    pub fn default_control_point(&self, anchors: &Anchors) -> Point {
        match self {
            EdgeType::Bezier => bezier::default_control_point(anchors),
            EdgeType::Step | EdgeType::SmoothStep => step::default_control_point(anchors),
            EdgeType::FreeBend => free_bend::default_bend(anchors),
            EdgeType::Straight => anchors.midpoint(),
        }
    }

    /// Computes the path for this edge type. `bend_axis` is only consulted by
    /// free-bend edges; when absent it is derived from the anchors.
    pub fn route(
        &self,
        anchors: &Anchors,
        control: Option<Point>,
        bend_axis: Option<BendAxis>,
        config: &RoutingConfig,
    ) -> Route {
        let control_point = control.unwrap_or_else(|| self.default_control_point(anchors));
        let (source, target) = (anchors.source, anchors.target);

        match self {
            EdgeType::Bezier => Route {
                path: bezier::path(source, target, control_point),
                control_point,
                crossed: false,
                label_position: control_point,
                bend_axis: None,
            },
            EdgeType::Step => {
                let crossed = is_crossed(anchors, control_point);
                Route {
                    path: step::path(source, target, control_point, crossed),
                    control_point,
                    crossed,
                    label_position: step::label_position(source, target, control_point, crossed),
                    bend_axis: None,
                }
            }
            EdgeType::SmoothStep => {
                let crossed = is_crossed(anchors, control_point);
                Route {
                    path: smooth_step::path(
                        source,
                        target,
                        control_point,
                        crossed,
                        config.smooth_step_radius,
                    ),
                    control_point,
                    crossed,
                    label_position: step::label_position(source, target, control_point, crossed),
                    bend_axis: None,
                }
            }
            EdgeType::FreeBend => {
                let axis = bend_axis.unwrap_or_else(|| BendAxis::for_anchors(anchors));
                Route {
                    path: free_bend::path(
                        source,
                        target,
                        control_point,
                        axis,
                        config.free_bend_radius,
                    ),
                    control_point,
                    crossed: false,
                    label_position: control_point,
                    bend_axis: Some(axis),
                }
            }
            EdgeType::Straight => Route {
                path: PathDescriptor::starting_at(source).line_to(target),
                control_point,
                crossed: false,
                label_position: anchors.midpoint(),
                bend_axis: None,
            },
        }
    }
}
