pub mod diagram;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod routing;
#[cfg(feature = "server")]
pub mod serve;
pub mod utils;
pub mod viewport;

pub use diagram::*;
pub use editor::DiagramEditor;
pub use error::CanvasError;
pub use geometry::*;
pub use interaction::*;
pub use routing::{
    Anchors, BendAxis, EdgeType, Handle, HandleSide, PlacementPolicy, Route, RoutingConfig,
    is_crossed,
};
#[cfg(feature = "server")]
pub use serve::*;
pub use utils::*;
pub use viewport::Viewport;

pub const DEFAULT_SMOOTH_STEP_RADIUS: f32 = 5.0;
pub const DEFAULT_FREE_BEND_RADIUS: f32 = 15.0;
pub const DEFAULT_HANDLE_RADIUS: f32 = 2.0;
pub const NODE_WIDTH: f32 = 150.0;
pub const NODE_HEIGHT: f32 = 40.0;
pub const NEW_NODE_POSITION: Point = Point { x: 100.0, y: 100.0 };
pub const LAYOUT_MARGIN: f32 = 40.0;
pub const NODE_TEXT_LINE_HEIGHT: f32 = 16.0;
pub const NODE_STROKE_COLOR: &str = "#1a192b";
pub const EDGE_STROKE_COLOR: &str = "#b1b1b7";
pub const PARALLELOGRAM_SKEW: f32 = 0.35;
pub const EDGE_LABEL_MIN_WIDTH: f32 = 36.0;
pub const EDGE_LABEL_MIN_HEIGHT: f32 = 28.0;
pub const EDGE_LABEL_LINE_HEIGHT: f32 = 16.0;
pub const EDGE_LABEL_HORIZONTAL_PADDING: f32 = 16.0;
pub const EDGE_LABEL_VERTICAL_PADDING: f32 = 12.0;
pub const EDGE_LABEL_CHAR_WIDTH: f32 = 7.4;
