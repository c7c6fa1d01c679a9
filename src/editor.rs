//! Editing session: one [`Diagram`], its [`Viewport`] and a live
//! [`EdgeRouter`] per edge.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::diagram::{Diagram, Edge, EdgeDataPatch, EdgeGeometry, Node, NodePatch, NodeShape};
use crate::error::CanvasError;
use crate::interaction::{EdgeRouter, EdgeStore, GlobalListeners, ListenerHost, PointerEvent};
use crate::routing::{EdgeType, HandleSide, Route};
use crate::viewport::Viewport;

#[derive(Debug)]
pub struct DiagramEditor {
    diagram: Diagram,
    viewport: Viewport,
    routers: HashMap<String, EdgeRouter>,
    listeners: Arc<GlobalListeners>,
}

impl DiagramEditor {
    pub fn new(diagram: Diagram) -> Self {
        let mut editor = Self {
            diagram,
            viewport: Viewport::new(),
            routers: HashMap::new(),
            listeners: Arc::new(GlobalListeners::new()),
        };
        editor.rebuild_routers();
        editor
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn listeners(&self) -> &GlobalListeners {
        &self.listeners
    }

    pub fn router(&self, edge_id: &str) -> Option<&EdgeRouter> {
        self.routers.get(edge_id)
    }

    /// Swaps in a whole new document. Any drag in progress is dropped.
    pub fn replace_diagram(&mut self, diagram: Diagram) {
        self.diagram = diagram;
        self.diagram.freeze_bend_axes();
        self.rebuild_routers();
    }

    /// Feeds a pointer event to the addressed edge and returns its geometry
    /// afterwards.
    pub fn dispatch(
        &mut self,
        edge_id: &str,
        event: PointerEvent,
    ) -> Result<EdgeGeometry, CanvasError> {
        let anchors = self.diagram.anchors(edge_id)?;
        let router = self
            .routers
            .get_mut(edge_id)
            .ok_or_else(|| CanvasError::UnknownEdge(edge_id.to_string()))?;

        router.handle(event, &anchors, &self.viewport, &mut self.diagram);

        let route = router.route(&anchors, &self.diagram.config);
        let handle = router.handle_marker(&self.diagram.config);
        Ok(EdgeGeometry { route, handle })
    }

    /// Current route of one edge, following any uncommitted working point.
    pub fn route(&mut self, edge_id: &str) -> Result<Route, CanvasError> {
        let anchors = self.diagram.anchors(edge_id)?;
        let router = self
            .routers
            .get_mut(edge_id)
            .ok_or_else(|| CanvasError::UnknownEdge(edge_id.to_string()))?;
        Ok(router.route(&anchors, &self.diagram.config))
    }

    pub fn edge_geometry(&mut self) -> Result<HashMap<String, EdgeGeometry>, CanvasError> {
        let mut geometry = HashMap::with_capacity(self.diagram.edges.len());
        for edge in &self.diagram.edges {
            let anchors = self.diagram.anchors(&edge.id)?;
            let router = self
                .routers
                .entry(edge.id.clone())
                .or_insert_with(|| new_router(edge, &self.listeners));
            let route = router.route(&anchors, &self.diagram.config);
            let handle = router.handle_marker(&self.diagram.config);
            geometry.insert(edge.id.clone(), EdgeGeometry { route, handle });
        }
        Ok(geometry)
    }

    pub fn render_svg(&mut self, background: &str) -> Result<String> {
        let geometry = self.edge_geometry()?;
        self.diagram.render_svg(background, Some(&geometry))
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), CanvasError> {
        self.diagram.add_node(node)
    }

    pub fn add_shape(&mut self, shape: NodeShape) -> String {
        self.diagram.add_shape(shape)
    }

    pub fn update_node(&mut self, node_id: &str, patch: NodePatch) -> Result<(), CanvasError> {
        self.diagram.update_node(node_id, patch)
    }

    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let removed = self.diagram.remove_node(node_id);
        if removed {
            let diagram = &self.diagram;
            self.routers
                .retain(|edge_id, _| diagram.edge(edge_id).is_some());
        }
        removed
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), CanvasError> {
        let router = new_router(&edge, &self.listeners);
        let edge_id = edge.id.clone();
        self.diagram.add_edge(edge)?;
        self.routers.insert(edge_id, router);
        Ok(())
    }

    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<HandleSide>,
        target_handle: Option<HandleSide>,
    ) -> Result<String, CanvasError> {
        let edge_id = self
            .diagram
            .connect(source, target, source_handle, target_handle)?;
        if let Some(edge) = self.diagram.edge(&edge_id) {
            let router = new_router(edge, &self.listeners);
            self.routers.insert(edge_id.clone(), router);
        }
        Ok(edge_id)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        self.routers.remove(edge_id);
        self.diagram.remove_edge(edge_id)
    }

    pub fn set_edge_type(&mut self, edge_id: &str, edge_type: EdgeType) -> Result<(), CanvasError> {
        self.diagram.set_edge_type(edge_id, edge_type)?;
        if let (Some(router), Some(edge)) =
            (self.routers.get_mut(edge_id), self.diagram.edge(edge_id))
        {
            router.set_edge_type(edge_type);
            router.sync_from_store(&edge.data);
        }
        Ok(())
    }

    pub fn set_edge_label(
        &mut self,
        edge_id: &str,
        label: Option<String>,
    ) -> Result<(), CanvasError> {
        self.diagram.set_edge_label(edge_id, label)
    }

    pub fn set_edge_animated(&mut self, edge_id: &str, animated: bool) -> Result<(), CanvasError> {
        self.diagram.set_edge_animated(edge_id, animated)
    }

    pub fn set_edge_marker_end(
        &mut self,
        edge_id: &str,
        marker_end: bool,
    ) -> Result<(), CanvasError> {
        self.diagram.set_edge_marker_end(edge_id, marker_end)
    }

    /// Writes edge data from outside the pointer flow. The edge's router is
    /// reset to the stored values unless it is mid-drag.
    pub fn update_edge_data(
        &mut self,
        edge_id: &str,
        patch: EdgeDataPatch,
    ) -> Result<(), CanvasError> {
        self.diagram.update_edge_data(edge_id, patch)?;
        let Some(edge) = self.diagram.edge(edge_id) else {
            return Ok(());
        };
        match self.routers.get(edge_id) {
            Some(router) if router.is_dragging() => {
                log::debug!("edge '{edge_id}': external write during drag, router kept");
            }
            _ => {
                let router = new_router(edge, &self.listeners);
                self.routers.insert(edge_id.to_string(), router);
            }
        }
        Ok(())
    }

    fn rebuild_routers(&mut self) {
        let listeners = &self.listeners;
        self.routers = self
            .diagram
            .edges
            .iter()
            .map(|edge| (edge.id.clone(), new_router(edge, listeners)))
            .collect();
    }
}

fn new_router(edge: &Edge, listeners: &Arc<GlobalListeners>) -> EdgeRouter {
    let host: Arc<dyn ListenerHost> = listeners.clone();
    let mut router = EdgeRouter::new(edge.id.clone(), edge.edge_type).with_listener_host(host);
    router.sync_from_store(&edge.data);
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::interaction::InteractionState;
    use crate::routing::BendAxis;

    fn editor(edge_type: EdgeType) -> DiagramEditor {
        let mut diagram = Diagram::new();
        diagram
            .add_node(Node::new("a", NodeShape::Default, Point::new(0.0, 0.0), "A"))
            .unwrap();
        diagram
            .add_node(Node::new("b", NodeShape::Default, Point::new(0.0, 200.0), "B"))
            .unwrap();
        diagram
            .add_edge(Edge::new("e1", "a", "b", edge_type))
            .unwrap();

        let mut editor = DiagramEditor::new(diagram);
        editor.set_viewport(Viewport::measured(Rect::from_origin_size(
            Point::default(),
            1000.0,
            1000.0,
        )));
        editor
    }

    #[test]
    fn drag_commits_once_on_release() {
        let mut editor = editor(EdgeType::Step);
        editor
            .dispatch("e1", PointerEvent::PathClick { x: 75.0, y: 120.0 })
            .unwrap();
        editor.dispatch("e1", PointerEvent::HandleDown).unwrap();
        assert_eq!(editor.listeners().active_count(), 1);

        let geometry = editor
            .dispatch("e1", PointerEvent::Move { x: 300.0, y: 90.0 })
            .unwrap();
        assert!(geometry.route.crossed);
        assert_eq!(geometry.route.path.segment_count(), 4);
        assert_eq!(editor.diagram().edge("e1").unwrap().data.control_point, None);

        editor.dispatch("e1", PointerEvent::Up).unwrap();
        assert_eq!(editor.listeners().active_count(), 0);
        assert_eq!(
            editor.diagram().edge("e1").unwrap().data.control_point,
            Some(Point::new(300.0, 90.0))
        );
    }

    #[test]
    fn double_click_clears_the_store() {
        let mut editor = editor(EdgeType::Bezier);
        editor
            .dispatch("e1", PointerEvent::PathClick { x: 10.0, y: 100.0 })
            .unwrap();
        editor.dispatch("e1", PointerEvent::HandleDown).unwrap();
        editor.dispatch("e1", PointerEvent::Up).unwrap();
        assert!(editor.diagram().edge("e1").unwrap().data.control_point.is_some());

        let geometry = editor
            .dispatch("e1", PointerEvent::HandleDoubleClick)
            .unwrap();
        assert!(geometry.handle.is_none());
        assert_eq!(editor.diagram().edge("e1").unwrap().data.control_point, None);
        assert_eq!(
            editor.router("e1").unwrap().state(),
            InteractionState::Idle
        );
    }

    #[test]
    fn unmeasured_viewport_ignores_clicks() {
        let mut editor = editor(EdgeType::Step);
        editor.set_viewport(Viewport::new());
        let geometry = editor
            .dispatch("e1", PointerEvent::PathClick { x: 5.0, y: 5.0 })
            .unwrap();
        assert!(geometry.handle.is_none());
        assert_eq!(editor.router("e1").unwrap().state(), InteractionState::Idle);
    }

    #[test]
    fn unknown_edge_is_reported() {
        let mut editor = editor(EdgeType::Step);
        let err = editor.dispatch("nope", PointerEvent::Up).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn removing_an_edge_mid_drag_releases_listeners() {
        let mut editor = editor(EdgeType::SmoothStep);
        editor
            .dispatch("e1", PointerEvent::PathClick { x: 40.0, y: 100.0 })
            .unwrap();
        editor.dispatch("e1", PointerEvent::HandleDown).unwrap();
        assert!(editor.listeners().is_installed_for("e1"));

        assert!(editor.remove_node("b"));
        assert!(editor.router("e1").is_none());
        assert_eq!(editor.listeners().active_count(), 0);
    }

    #[test]
    fn connected_edges_get_routers() {
        let mut editor = editor(EdgeType::Step);
        let id = editor.connect("b", "a", None, None).unwrap();
        assert!(editor.router(&id).is_some());
        let geometry = editor.edge_geometry().unwrap();
        assert_eq!(geometry.len(), 2);
        assert!(editor.remove_edge(&id));
        assert!(editor.router(&id).is_none());
    }

    #[test]
    fn free_bend_commit_records_axis() {
        let mut editor = editor(EdgeType::FreeBend);
        editor
            .dispatch("e1", PointerEvent::PathClick { x: 0.0, y: 0.0 })
            .unwrap();
        editor.dispatch("e1", PointerEvent::HandleDown).unwrap();
        editor
            .dispatch("e1", PointerEvent::Move { x: 120.0, y: 110.0 })
            .unwrap();
        editor.dispatch("e1", PointerEvent::Up).unwrap();

        let data = &editor.diagram().edge("e1").unwrap().data;
        assert_eq!(data.bend_axis, Some(BendAxis::Vertical));
        assert_eq!(data.control_point, Some(Point::new(120.0, 110.0)));
    }

    #[test]
    fn external_writes_reset_idle_routers() {
        let mut editor = editor(EdgeType::Step);
        editor
            .update_edge_data(
                "e1",
                EdgeDataPatch {
                    control_point: Some(Some(Point::new(1.0, 2.0))),
                    bend_axis: None,
                },
            )
            .unwrap();
        assert_eq!(
            editor.router("e1").unwrap().control_point(),
            Some(Point::new(1.0, 2.0))
        );

        editor
            .update_edge_data(
                "e1",
                EdgeDataPatch {
                    control_point: Some(None),
                    bend_axis: None,
                },
            )
            .unwrap();
        assert_eq!(editor.router("e1").unwrap().control_point(), None);
    }

    #[test]
    fn switching_type_updates_router() {
        let mut editor = editor(EdgeType::Step);
        editor.set_edge_type("e1", EdgeType::Straight).unwrap();
        assert_eq!(editor.router("e1").unwrap().edge_type(), EdgeType::Straight);
        let svg = editor.render_svg("white").unwrap();
        assert!(svg.contains("oxflow-edge-straight"));
    }
}
