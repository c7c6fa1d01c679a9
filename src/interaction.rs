//! Pointer interaction shared by every interactive edge type.
//!
//! An [`EdgeRouter`] owns the working copy of one edge's control point and
//! moves through `Idle -> Placed -> Dragging -> Placed -> ... -> Idle`. The
//! only writes that reach the [`EdgeStore`] are the commit on pointer-up and
//! the removal on double-click; intermediate drag frames stay local.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;

use crate::diagram::{EdgeData, EdgeDataPatch};
use crate::error::CanvasError;
use crate::geometry::Point;
use crate::routing::{
    Anchors, BendAxis, EdgeType, Handle, PlacementPolicy, Route, RoutingConfig, is_crossed,
};

/// Maps raw input-device coordinates into diagram space.
///
/// Returns `None` while no screen reference frame exists yet (for example
/// before the canvas element has been measured).
pub trait CoordinateProjector {
    fn project(&self, device: Point) -> Option<Point>;
}

impl<F> CoordinateProjector for F
where
    F: Fn(Point) -> Option<Point>,
{
    fn project(&self, device: Point) -> Option<Point> {
        self(device)
    }
}

/// Receives committed edge data. Implementations merge `patch` into the named
/// edge and leave every other edge untouched.
pub trait EdgeStore {
    fn update_edge_data(&mut self, edge_id: &str, patch: EdgeDataPatch)
    -> Result<(), CanvasError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Top-level input surface that can carry process-wide pointer listeners.
pub trait ListenerHost: Send + Sync {
    fn install(&self, edge_id: &str) -> ListenerToken;
    fn remove(&self, token: ListenerToken);
}

impl fmt::Debug for dyn ListenerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListenerHost")
    }
}

/// Registration of the global move/up listeners for one drag session.
/// Dropping it removes the listeners.
pub struct PointerCapture {
    host: Arc<dyn ListenerHost>,
    token: ListenerToken,
}

impl PointerCapture {
    pub fn acquire(host: Arc<dyn ListenerHost>, edge_id: &str) -> Self {
        let token = host.install(edge_id);
        Self { host, token }
    }

    pub fn token(&self) -> ListenerToken {
        self.token
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.host.remove(self.token);
    }
}

impl fmt::Debug for PointerCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerCapture")
            .field("token", &self.token)
            .finish()
    }
}

/// In-process listener registry used by the editor and the server.
#[derive(Debug, Default)]
pub struct GlobalListeners {
    next_token: AtomicU64,
    active: Mutex<HashMap<ListenerToken, String>>,
}

impl GlobalListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.registry().len()
    }

    pub fn is_installed_for(&self, edge_id: &str) -> bool {
        self.registry().values().any(|id| id == edge_id)
    }

    /// Locks the registry, recovering the map if a previous holder panicked.
    fn registry(&self) -> MutexGuard<'_, HashMap<ListenerToken, String>> {
        self.active.lock().unwrap_or_else(|poisoned| {
            log::warn!("pointer listener registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl ListenerHost for GlobalListeners {
    fn install(&self, edge_id: &str) -> ListenerToken {
        let token = ListenerToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.registry().insert(token, edge_id.to_string());
        log::debug!("installed pointer listeners {token:?} for edge '{edge_id}'");
        token
    }

    fn remove(&self, token: ListenerToken) {
        self.registry().remove(&token);
        log::debug!("removed pointer listeners {token:?}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Placed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    /// Primary click on the rendered path, in device coordinates.
    PathClick { x: f32, y: f32 },
    /// Pointer-down on the control-point handle.
    HandleDown,
    /// Global pointer-move, in device coordinates.
    Move { x: f32, y: f32 },
    /// Global pointer-up.
    Up,
    /// Double-click on the control-point handle.
    HandleDoubleClick,
}

#[derive(Debug)]
struct DragSession {
    _capture: Option<PointerCapture>,
}

#[derive(Debug)]
pub struct EdgeRouter {
    edge_id: String,
    edge_type: EdgeType,
    control_point: Option<Point>,
    bend_axis: Option<BendAxis>,
    crossed: bool,
    session: Option<DragSession>,
    listeners: Option<Arc<dyn ListenerHost>>,
}

impl EdgeRouter {
    pub fn new(edge_id: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            edge_id: edge_id.into(),
            edge_type,
            control_point: None,
            bend_axis: None,
            crossed: false,
            session: None,
            listeners: None,
        }
    }

    pub fn with_listener_host(mut self, host: Arc<dyn ListenerHost>) -> Self {
        self.listeners = Some(host);
        self
    }

    pub fn edge_id(&self) -> &str {
        &self.edge_id
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn state(&self) -> InteractionState {
        if self.session.is_some() {
            InteractionState::Dragging
        } else if self.control_point.is_some() {
            InteractionState::Placed
        } else {
            InteractionState::Idle
        }
    }

    pub fn control_point(&self) -> Option<Point> {
        self.control_point
    }

    pub fn bend_axis(&self) -> Option<BendAxis> {
        self.bend_axis
    }

    pub fn crossed(&self) -> bool {
        self.crossed
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Adopts persisted edge data. Ignored mid-drag so the working copy keeps
    /// following the pointer. An absent persisted point does not discard a
    /// point placed locally but not yet committed.
    pub fn sync_from_store(&mut self, data: &EdgeData) {
        if self.is_dragging() {
            return;
        }
        if let Some(point) = data.control_point {
            self.control_point = Some(point);
        }
        if let Some(axis) = data.bend_axis {
            self.bend_axis = Some(axis);
        }
    }

    /// Switches the curve family. The control point is kept; a frozen bend
    /// axis only survives while the edge stays free-bend.
    pub fn set_edge_type(&mut self, edge_type: EdgeType) {
        if self.edge_type == edge_type {
            return;
        }
        self.end_drag();
        self.edge_type = edge_type;
        if edge_type != EdgeType::FreeBend {
            self.bend_axis = None;
        }
        if !edge_type.is_interactive() {
            self.control_point = None;
        }
    }

    /// Computes the current route from the working control point. Free-bend
    /// edges freeze their routing axis the first time they are routed.
    pub fn route(&mut self, anchors: &Anchors, config: &RoutingConfig) -> Route {
        if self.edge_type == EdgeType::FreeBend && self.bend_axis.is_none() {
            self.bend_axis = Some(BendAxis::for_anchors(anchors));
        }
        self.refresh_crossed(anchors);
        self.edge_type
            .route(anchors, self.control_point, self.bend_axis, config)
    }

    pub fn handle_marker(&self, config: &RoutingConfig) -> Option<Handle> {
        self.control_point.map(|center| Handle {
            center,
            radius: config.handle_radius,
        })
    }

    /// Feeds one pointer event through the state machine. Returns `true` when
    /// the edge needs to be redrawn.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        anchors: &Anchors,
        projector: &dyn CoordinateProjector,
        store: &mut dyn EdgeStore,
    ) -> bool {
        match event {
            PointerEvent::PathClick { x, y } => {
                self.on_path_click(Point::new(x, y), anchors, projector)
            }
            PointerEvent::HandleDown => self.on_handle_down(),
            PointerEvent::Move { x, y } => {
                self.on_pointer_move(Point::new(x, y), anchors, projector)
            }
            PointerEvent::Up => self.on_pointer_up(store),
            PointerEvent::HandleDoubleClick => self.on_handle_double_click(store),
        }
    }

    pub fn on_path_click(
        &mut self,
        device: Point,
        anchors: &Anchors,
        projector: &dyn CoordinateProjector,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(projected) = projector.project(device) else {
            log::debug!(
                "edge '{}': click ignored, no screen reference frame",
                self.edge_id
            );
            return false;
        };

        let placed = match self.edge_type.placement_policy() {
            PlacementPolicy::AtPointer => projected,
            PlacementPolicy::Midpoint => anchors.midpoint(),
            PlacementPolicy::Disabled => return false,
        };

        if self.edge_type == EdgeType::FreeBend && self.bend_axis.is_none() {
            self.bend_axis = Some(BendAxis::for_anchors(anchors));
        }
        self.control_point = Some(placed);
        self.refresh_crossed(anchors);
        log::debug!("edge '{}': control point placed at {placed:?}", self.edge_id);
        true
    }

    pub fn on_handle_down(&mut self) -> bool {
        if self.control_point.is_none() || self.is_dragging() {
            return false;
        }
        let capture = self
            .listeners
            .as_ref()
            .map(|host| PointerCapture::acquire(Arc::clone(host), &self.edge_id));
        self.session = Some(DragSession { _capture: capture });
        log::debug!("edge '{}': drag started", self.edge_id);
        false
    }

    pub fn on_pointer_move(
        &mut self,
        device: Point,
        anchors: &Anchors,
        projector: &dyn CoordinateProjector,
    ) -> bool {
        if !self.is_dragging() || self.control_point.is_none() {
            return false;
        }
        let Some(projected) = projector.project(device) else {
            return false;
        };
        self.control_point = Some(projected);
        self.refresh_crossed(anchors);
        true
    }

    pub fn on_pointer_up(&mut self, store: &mut dyn EdgeStore) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.end_drag();

        let patch = EdgeDataPatch {
            control_point: Some(self.control_point),
            bend_axis: self.bend_axis.map(Some),
        };
        if let Err(err) = store.update_edge_data(&self.edge_id, patch) {
            log::warn!("edge '{}': failed to commit control point: {err}", self.edge_id);
        } else {
            log::debug!(
                "edge '{}': committed control point {:?}",
                self.edge_id,
                self.control_point
            );
        }
        true
    }

    pub fn on_handle_double_click(&mut self, store: &mut dyn EdgeStore) -> bool {
        if self.control_point.is_none() {
            return false;
        }
        self.end_drag();
        self.control_point = None;
        self.crossed = false;

        let patch = EdgeDataPatch {
            control_point: Some(None),
            bend_axis: None,
        };
        if let Err(err) = store.update_edge_data(&self.edge_id, patch) {
            log::warn!("edge '{}': failed to clear control point: {err}", self.edge_id);
        } else {
            log::debug!("edge '{}': control point removed", self.edge_id);
        }
        true
    }

    /// Ends any drag session without committing, releasing its listeners.
    pub fn end_drag(&mut self) {
        self.session = None;
    }

    fn refresh_crossed(&mut self, anchors: &Anchors) {
        self.crossed = match (self.edge_type.tracks_crossing(), self.control_point) {
            (true, Some(point)) => is_crossed(anchors, point),
            _ => false,
        };
    }
}
