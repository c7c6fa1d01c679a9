use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as FmtWrite;
use uuid::Uuid;

use crate::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub config: RoutingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Default,
    Rectangle,
    Ellipse,
    Diamond,
    Parallelogram,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub shape: NodeShape,
    /// Top-left corner in diagram coordinates.
    pub position: Point,
    #[serde(default = "default_node_width")]
    pub width: f32,
    #[serde(default = "default_node_height")]
    pub height: f32,
    #[serde(default)]
    pub data: NodeData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, alias = "marker", skip_serializing_if = "Option::is_none")]
    pub control_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bend_axis: Option<BendAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleSide>,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_marker_end")]
    pub marker_end: bool,
    #[serde(default)]
    pub data: EdgeData,
}

/// Partial update for [`EdgeData`]. An outer `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDataPatch {
    #[serde(default, alias = "marker", deserialize_with = "patch_field")]
    pub control_point: Option<Option<Point>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub bend_axis: Option<Option<BendAxis>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub sub_label: Option<Option<String>>,
    #[serde(default, rename = "type")]
    pub shape: Option<NodeShape>,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

/// Routed path plus the handle to draw, if a control point has been placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeGeometry {
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
}

pub(crate) fn patch_field<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_marker_end() -> bool {
    true
}

fn default_node_width() -> f32 {
    NODE_WIDTH
}

fn default_node_height() -> f32 {
    NODE_HEIGHT
}

impl EdgeData {
    pub fn apply(&mut self, patch: &EdgeDataPatch) {
        if let Some(control_point) = patch.control_point {
            self.control_point = control_point;
        }
        if let Some(bend_axis) = patch.bend_axis {
            self.bend_axis = bend_axis;
        }
    }
}

impl EdgeDataPatch {
    pub fn is_empty(&self) -> bool {
        self.control_point.is_none() && self.bend_axis.is_none()
    }
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Default => "default",
            NodeShape::Rectangle => "rectangle",
            NodeShape::Ellipse => "ellipse",
            NodeShape::Diamond => "diamond",
            NodeShape::Parallelogram => "parallelogram",
        }
    }

    fn default_fill_color(&self) -> &'static str {
        match self {
            NodeShape::Default => "#ffffff",
            NodeShape::Rectangle => "#fde68a",
            NodeShape::Ellipse => "#c4f1f9",
            NodeShape::Diamond => "#fbcfe8",
            NodeShape::Parallelogram => "#e9d8fd",
        }
    }
}

impl Node {
    pub fn new(id: impl Into<String>, shape: NodeShape, position: Point, label: &str) -> Self {
        Self {
            id: id.into(),
            shape,
            position,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            data: NodeData {
                label: label.to_string(),
                sub_label: None,
            },
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.width, self.height)
    }

    /// Anchor point on the middle of the given side.
    pub fn handle_point(&self, side: HandleSide) -> Point {
        let bounds = self.bounds();
        let center = bounds.center();
        match side {
            HandleSide::Top => Point::new(center.x, bounds.min_y),
            HandleSide::Bottom => Point::new(center.x, bounds.max_y),
            HandleSide::Left => Point::new(bounds.min_x, center.y),
            HandleSide::Right => Point::new(bounds.max_x, center.y),
        }
    }
}

impl Edge {
    pub fn new(id: impl Into<String>, source: &str, target: &str, edge_type: EdgeType) -> Self {
        Self {
            id: id.into(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
            edge_type,
            label: None,
            animated: false,
            marker_end: true,
            data: EdgeData::default(),
        }
    }

    pub fn source_side(&self) -> HandleSide {
        self.source_handle.unwrap_or(HandleSide::Bottom)
    }

    pub fn target_side(&self) -> HandleSide {
        self.target_handle.unwrap_or(HandleSide::Top)
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let mut diagram: Diagram =
            serde_json::from_str(contents).context("failed to parse diagram document")?;
        diagram.validate()?;
        diagram.freeze_bend_axes();
        Ok(diagram)
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Checks id uniqueness and that every edge connects existing nodes.
    pub fn validate(&self) -> std::result::Result<(), CanvasError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(CanvasError::DuplicateNode(node.id.clone()));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(CanvasError::DuplicateEdge(edge.id.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(CanvasError::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
            if let Some(point) = edge.data.control_point {
                if !point.is_finite() {
                    return Err(CanvasError::NonFiniteControlPoint(edge.id.clone()));
                }
            }
        }

        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    fn edge_mut(&mut self, id: &str) -> std::result::Result<&mut Edge, CanvasError> {
        self.edges
            .iter_mut()
            .find(|edge| edge.id == id)
            .ok_or_else(|| CanvasError::UnknownEdge(id.to_string()))
    }

    pub fn add_node(&mut self, node: Node) -> std::result::Result<(), CanvasError> {
        if self.node(&node.id).is_some() {
            return Err(CanvasError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Adds a node of `shape` at the default drop position, labelled after
    /// its shape and ordinal. Returns the new node's id.
    pub fn add_shape(&mut self, shape: NodeShape) -> String {
        let mut ordinal = self.nodes.len() + 1;
        let mut id = format!("node-{ordinal}");
        while self.node(&id).is_some() {
            ordinal += 1;
            id = format!("node-{ordinal}");
        }

        let label = format!("{} {ordinal}", shape.as_str());
        self.nodes
            .push(Node::new(id.clone(), shape, NEW_NODE_POSITION, &label));
        id
    }

    pub fn add_edge(&mut self, edge: Edge) -> std::result::Result<(), CanvasError> {
        if self.edge(&edge.id).is_some() {
            return Err(CanvasError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if self.node(endpoint).is_none() {
                return Err(CanvasError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        self.freeze_bend_axes();
        Ok(())
    }

    /// Connects two nodes with a new default (bezier) edge.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<HandleSide>,
        target_handle: Option<HandleSide>,
    ) -> std::result::Result<String, CanvasError> {
        let id = format!("edge-{}", Uuid::new_v4());
        let mut edge = Edge::new(id.clone(), source, target, EdgeType::Bezier);
        edge.source_handle = source_handle;
        edge.target_handle = target_handle;
        self.add_edge(edge)?;
        Ok(id)
    }

    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != node_id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges
            .retain(|edge| edge.source != node_id && edge.target != node_id);
        true
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.id != edge_id);
        self.edges.len() != before
    }

    pub fn update_node(
        &mut self,
        node_id: &str,
        patch: NodePatch,
    ) -> std::result::Result<(), CanvasError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| CanvasError::UnknownNode(node_id.to_string()))?;

        if let Some(label) = patch.label {
            node.data.label = label;
        }
        if let Some(sub_label) = patch.sub_label {
            node.data.sub_label = sub_label;
        }
        if let Some(shape) = patch.shape {
            node.shape = shape;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(width) = patch.width.filter(|w| w.is_finite() && *w > 0.0) {
            node.width = width;
        }
        if let Some(height) = patch.height.filter(|h| h.is_finite() && *h > 0.0) {
            node.height = height;
        }
        Ok(())
    }

    pub fn set_edge_type(
        &mut self,
        edge_id: &str,
        edge_type: EdgeType,
    ) -> std::result::Result<(), CanvasError> {
        let edge = self.edge_mut(edge_id)?;
        if edge.edge_type != edge_type && edge_type != EdgeType::FreeBend {
            edge.data.bend_axis = None;
        }
        if !edge_type.is_interactive() {
            edge.data.control_point = None;
        }
        edge.edge_type = edge_type;
        self.freeze_bend_axes();
        Ok(())
    }

    pub fn set_edge_label(
        &mut self,
        edge_id: &str,
        label: Option<String>,
    ) -> std::result::Result<(), CanvasError> {
        let edge = self.edge_mut(edge_id)?;
        edge.label = label.filter(|text| !text.trim().is_empty());
        Ok(())
    }

    pub fn set_edge_animated(
        &mut self,
        edge_id: &str,
        animated: bool,
    ) -> std::result::Result<(), CanvasError> {
        self.edge_mut(edge_id)?.animated = animated;
        Ok(())
    }

    pub fn set_edge_marker_end(
        &mut self,
        edge_id: &str,
        marker_end: bool,
    ) -> std::result::Result<(), CanvasError> {
        self.edge_mut(edge_id)?.marker_end = marker_end;
        Ok(())
    }

    /// Records the bend axis of every free-bend edge that has none yet, chosen
    /// from its current anchors. Later node moves leave a recorded axis alone.
    pub fn freeze_bend_axes(&mut self) {
        let chosen: Vec<(usize, BendAxis)> = self
            .edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                edge.edge_type == EdgeType::FreeBend && edge.data.bend_axis.is_none()
            })
            .filter_map(|(index, edge)| {
                let anchors = self.anchors_for(edge).ok()?;
                Some((index, BendAxis::for_anchors(&anchors)))
            })
            .collect();

        for (index, axis) in chosen {
            self.edges[index].data.bend_axis = Some(axis);
        }
    }

    pub fn anchors(&self, edge_id: &str) -> std::result::Result<Anchors, CanvasError> {
        let edge = self
            .edge(edge_id)
            .ok_or_else(|| CanvasError::UnknownEdge(edge_id.to_string()))?;
        self.anchors_for(edge)
    }

    fn anchors_for(&self, edge: &Edge) -> std::result::Result<Anchors, CanvasError> {
        let source = self.endpoint(edge, &edge.source)?;
        let target = self.endpoint(edge, &edge.target)?;
        let (source_side, target_side) = (edge.source_side(), edge.target_side());

        Ok(Anchors::new(
            source.handle_point(source_side),
            target.handle_point(target_side),
        )
        .with_sides(source_side, target_side))
    }

    fn endpoint(&self, edge: &Edge, node_id: &str) -> std::result::Result<&Node, CanvasError> {
        self.node(node_id).ok_or_else(|| CanvasError::DanglingEdge {
            edge_id: edge.id.clone(),
            node_id: node_id.to_string(),
        })
    }

    /// Routes one edge from its persisted data.
    pub fn route(&self, edge_id: &str) -> std::result::Result<Route, CanvasError> {
        let edge = self
            .edge(edge_id)
            .ok_or_else(|| CanvasError::UnknownEdge(edge_id.to_string()))?;
        let anchors = self.anchors_for(edge)?;
        Ok(edge.edge_type.route(
            &anchors,
            edge.data.control_point,
            edge.data.bend_axis,
            &self.config,
        ))
    }

    /// Geometry of every edge as persisted, keyed by edge id.
    pub fn edge_geometry(&self) -> std::result::Result<HashMap<String, EdgeGeometry>, CanvasError> {
        let mut geometry = HashMap::with_capacity(self.edges.len());
        for edge in &self.edges {
            let route = self.route(&edge.id)?;
            let handle = edge
                .data
                .control_point
                .filter(|_| edge.edge_type.is_interactive())
                .map(|center| Handle {
                    center,
                    radius: self.config.handle_radius,
                });
            geometry.insert(edge.id.clone(), EdgeGeometry { route, handle });
        }
        Ok(geometry)
    }

    /// Bounding box of all nodes and routed control points.
    pub fn bounds(&self, geometry: &HashMap<String, EdgeGeometry>) -> Rect {
        let mut bounds: Option<Rect> = None;
        for node in &self.nodes {
            let rect = node.bounds();
            bounds = Some(bounds.map_or(rect, |acc| acc.union(rect)));
        }
        for edge in geometry.values() {
            if let Some(handle) = edge.handle {
                bounds = bounds.map(|acc| acc.include(handle.center));
            }
        }
        bounds.unwrap_or_default()
    }

    pub fn render_svg(
        &self,
        background: &str,
        geometry: Option<&HashMap<String, EdgeGeometry>>,
    ) -> Result<String> {
        let persisted;
        let geometry = match geometry {
            Some(geometry) => geometry,
            None => {
                persisted = self.edge_geometry()?;
                &persisted
            }
        };

        let bounds = self.bounds(geometry);
        let min_x = bounds.min_x - LAYOUT_MARGIN;
        let min_y = bounds.min_y - LAYOUT_MARGIN;
        let width = bounds.width() + LAYOUT_MARGIN * 2.0;
        let height = bounds.height() + LAYOUT_MARGIN * 2.0;

        let mut svg = String::new();
        write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.0} {:.0} {:.0} {:.0}" font-family="Inter, system-ui, sans-serif">
  <defs>
        <marker id="arrow-end" markerWidth="8" markerHeight="8" refX="6" refY="4" orient="auto" markerUnits="strokeWidth">
            <path d="M1,1 L6,4 L1,7 z" fill="context-stroke" />
        </marker>
  </defs>
  <rect x="{:.0}" y="{:.0}" width="100%" height="100%" fill="{}" />
"##,
            width,
            height,
            min_x,
            min_y,
            width,
            height,
            min_x,
            min_y,
            escape_xml(background)
        )?;

        for edge in &self.edges {
            let Some(edge_geometry) = geometry.get(&edge.id) else {
                continue;
            };
            let route = &edge_geometry.route;

            let dash_attr = if edge.animated {
                " stroke-dasharray=\"5\""
            } else {
                ""
            };
            let marker_attr = if edge.marker_end {
                " marker-end=\"url(#arrow-end)\""
            } else {
                ""
            };

            write!(
                svg,
                "  <path id=\"{}\" class=\"oxflow-edge oxflow-edge-{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"{}{} />\n",
                escape_xml(&edge.id),
                edge.edge_type.as_str(),
                route.path,
                EDGE_STROKE_COLOR,
                marker_attr,
                dash_attr
            )?;

            if let Some(label) = &edge.label {
                write_edge_label(&mut svg, label, route.label_position)?;
            }

            if let Some(handle) = edge_geometry.handle {
                write!(
                    svg,
                    "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"blue\" stroke=\"black\" stroke-width=\"1.5\" class=\"oxflow-handle\" />\n",
                    handle.center.x,
                    handle.center.y,
                    format_number(handle.radius)
                )?;
            }
        }

        for node in &self.nodes {
            write_node(&mut svg, node)?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

impl EdgeStore for Diagram {
    fn update_edge_data(
        &mut self,
        edge_id: &str,
        patch: EdgeDataPatch,
    ) -> std::result::Result<(), CanvasError> {
        if let Some(Some(point)) = patch.control_point {
            if !point.is_finite() {
                return Err(CanvasError::NonFiniteControlPoint(edge_id.to_string()));
            }
        }
        let edge = self.edge_mut(edge_id)?;
        edge.data.apply(&patch);
        self.freeze_bend_axes();
        Ok(())
    }
}

fn write_node(svg: &mut String, node: &Node) -> Result<()> {
    let bounds = node.bounds();
    let center = bounds.center();
    let fill_color = node.shape.default_fill_color();
    let stroke_color = NODE_STROKE_COLOR;

    match node.shape {
        NodeShape::Default | NodeShape::Rectangle => {
            let radius = if node.shape == NodeShape::Rectangle {
                6.0
            } else {
                3.0
            };
            write!(
                svg,
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />\n",
                bounds.min_x,
                bounds.min_y,
                bounds.width(),
                bounds.height(),
                fill_color,
                stroke_color
            )?;
        }
        NodeShape::Ellipse => write!(
            svg,
            "  <ellipse cx=\"{:.1}\" cy=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />\n",
            center.x,
            center.y,
            bounds.width() / 2.0,
            bounds.height() / 2.0,
            fill_color,
            stroke_color
        )?,
        NodeShape::Diamond => write!(
            svg,
            "  <polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />\n",
            center.x,
            bounds.min_y,
            bounds.max_x,
            center.y,
            center.x,
            bounds.max_y,
            bounds.min_x,
            center.y,
            fill_color,
            stroke_color
        )?,
        NodeShape::Parallelogram => {
            let skew = bounds.height() * PARALLELOGRAM_SKEW;
            write!(
                svg,
                "  <polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />\n",
                bounds.min_x + skew,
                bounds.min_y,
                bounds.max_x,
                bounds.min_y,
                bounds.max_x - skew,
                bounds.max_y,
                bounds.min_x,
                bounds.max_y,
                fill_color,
                stroke_color
            )?;
        }
    }

    match &node.data.sub_label {
        Some(sub_label) => {
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#1a202c\" font-size=\"14\" font-weight=\"bold\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
                center.x,
                center.y - NODE_TEXT_LINE_HEIGHT / 2.0,
                escape_xml(&node.data.label)
            )?;
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#718096\" font-size=\"12\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
                center.x,
                center.y + NODE_TEXT_LINE_HEIGHT / 2.0,
                escape_xml(sub_label)
            )?;
        }
        None => {
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#1a202c\" font-size=\"14\" font-weight=\"bold\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
                center.x,
                center.y,
                escape_xml(&node.data.label)
            )?;
        }
    }

    Ok(())
}

fn write_edge_label(svg: &mut String, label: &str, center: Point) -> Result<()> {
    let lines = normalize_label_lines(label);
    if lines.is_empty() {
        return Ok(());
    }

    let (box_width, box_height) = measure_label_box(&lines);
    write!(
        svg,
        "  <g pointer-events=\"none\">\n    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"6\" ry=\"6\" fill=\"white\" fill-opacity=\"0.96\" stroke=\"{}\" stroke-width=\"1\" />\n",
        center.x - box_width / 2.0,
        center.y - box_height / 2.0,
        box_width,
        box_height,
        EDGE_STROKE_COLOR
    )?;

    let start_y = center.y - EDGE_LABEL_LINE_HEIGHT * (lines.len() as f32 - 1.0) / 2.0;
    write!(
        svg,
        "    <text x=\"{:.1}\" fill=\"#2d3748\" font-size=\"13\" text-anchor=\"middle\" xml:space=\"preserve\">\n",
        center.x
    )?;
    for (idx, line_text) in lines.iter().enumerate() {
        let line_y = start_y + EDGE_LABEL_LINE_HEIGHT * idx as f32;
        write!(
            svg,
            "      <tspan x=\"{:.1}\" y=\"{:.1}\" dominant-baseline=\"middle\">{}</tspan>\n",
            center.x,
            line_y,
            escape_xml(line_text)
        )?;
    }
    svg.push_str("    </text>\n  </g>\n");
    Ok(())
}

fn normalize_label_lines(label: &str) -> Vec<String> {
    label
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                " ".to_string()
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn measure_label_box(lines: &[String]) -> (f32, f32) {
    let max_chars = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);

    let width = (EDGE_LABEL_CHAR_WIDTH * max_chars as f32 + EDGE_LABEL_HORIZONTAL_PADDING)
        .max(EDGE_LABEL_MIN_WIDTH);
    let height = (EDGE_LABEL_LINE_HEIGHT * lines.len() as f32 + EDGE_LABEL_VERTICAL_PADDING)
        .max(EDGE_LABEL_MIN_HEIGHT);

    (width, height)
}
