use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::diagram::patch_field;
use crate::*;

/// Arguments for running the oxflow web server
#[derive(Debug, Clone, Parser)]
#[command(name = "oxflow serve", about = "Start the oxflow diagram editing API server.")]
pub struct ServeArgs {
    /// Path to the diagram document that should be served.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5151)]
    pub port: u16,

    /// Background color for rendered SVG previews.
    #[arg(long = "background-color", default_value = "white")]
    pub background_color: String,
}

/// Shared server state: one editing session plus the file it is mirrored to.
pub struct ServeState {
    source_path: PathBuf,
    background: String,
    editor: Mutex<DiagramEditor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagramPayload<'a> {
    source_path: String,
    background: &'a str,
    viewport: Viewport,
    nodes: &'a [Node],
    edges: &'a [Edge],
    config: RoutingConfig,
    geometry: HashMap<String, EdgeGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNodeRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    shape: NodeShape,
    #[serde(default)]
    position: Option<Point>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest {
    source: String,
    target: String,
    #[serde(default)]
    source_handle: Option<HandleSide>,
    #[serde(default)]
    target_handle: Option<HandleSide>,
    #[serde(rename = "type", default)]
    edge_type: Option<EdgeType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeUpdateRequest {
    #[serde(rename = "type", default)]
    edge_type: Option<EdgeType>,
    #[serde(default, deserialize_with = "patch_field")]
    label: Option<Option<String>>,
    #[serde(default)]
    animated: Option<bool>,
    #[serde(default)]
    marker_end: Option<bool>,
    #[serde(default)]
    data: Option<EdgeDataPatch>,
}

#[derive(Debug, Serialize)]
struct CreatedPayload {
    id: String,
}

impl ServeState {
    pub fn new(source_path: PathBuf, background: String, diagram: Diagram) -> Self {
        Self {
            source_path,
            background,
            editor: Mutex::new(DiagramEditor::new(diagram)),
        }
    }

    async fn persist(&self, editor: &DiagramEditor) -> Result<()> {
        let json = editor.diagram().to_json()?;
        tokio::fs::write(&self.source_path, json.as_bytes())
            .await
            .with_context(|| format!("failed to write '{}'", self.source_path.display()))?;
        log::debug!("wrote diagram to {}", self.source_path.display());
        Ok(())
    }
}

pub fn router(state: Arc<ServeState>) -> Router {
    Router::new()
        .route("/api/diagram", get(get_diagram).put(put_diagram))
        .route("/api/diagram/svg", get(get_svg))
        .route("/api/diagram/viewport", put(put_viewport))
        .route("/api/diagram/nodes", post(post_node))
        .route(
            "/api/diagram/nodes/:id",
            delete(delete_node).patch(patch_node),
        )
        .route("/api/diagram/edges", post(post_edge))
        .route(
            "/api/diagram/edges/:id",
            delete(delete_edge).patch(patch_edge),
        )
        .route("/api/diagram/edges/:id/events", post(post_edge_event))
        .with_state(state)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let diagram = read_diagram_file(&args.input)?;
    log::info!(
        "loaded {} nodes and {} edges from {}",
        diagram.nodes.len(),
        diagram.edges.len(),
        args.input.display()
    );

    let state = Arc::new(ServeState::new(
        args.input.clone(),
        args.background_color.clone(),
        diagram,
    ));

    let app = router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {addr}"))?;

    log::info!("oxflow server listening on http://{addr}");
    println!("oxflow server listening on http://{addr}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn get_diagram(State(state): State<Arc<ServeState>>) -> Result<Response, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    let geometry = editor.edge_geometry().map_err(canvas_error)?;
    let diagram = editor.diagram();

    let payload = DiagramPayload {
        source_path: state.source_path.display().to_string(),
        background: &state.background,
        viewport: *editor.viewport(),
        nodes: &diagram.nodes,
        edges: &diagram.edges,
        config: diagram.config,
        geometry,
    };

    Ok(Json(payload).into_response())
}

async fn put_diagram(
    State(state): State<Arc<ServeState>>,
    Json(diagram): Json<Diagram>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    diagram.validate().map_err(canvas_error)?;

    let mut editor = state.editor.lock().await;
    editor.replace_diagram(diagram);
    state.persist(&editor).await.map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_svg(State(state): State<Arc<ServeState>>) -> Result<Response, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    let svg = editor
        .render_svg(&state.background)
        .map_err(internal_error)?;

    let mut response = Response::new(svg.into());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("image/svg+xml"),
    );
    Ok(response)
}

async fn put_viewport(
    State(state): State<Arc<ServeState>>,
    Json(viewport): Json<Viewport>,
) -> impl IntoResponse {
    state.editor.lock().await.set_viewport(viewport);
    StatusCode::NO_CONTENT
}

async fn post_node(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<NewNodeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    let id = match request.id {
        Some(id) => {
            let label = request.label.unwrap_or_else(|| id.clone());
            let position = request.position.unwrap_or(NEW_NODE_POSITION);
            editor
                .add_node(Node::new(id.clone(), request.shape, position, &label))
                .map_err(canvas_error)?;
            id
        }
        None => {
            let id = editor.add_shape(request.shape);
            let patch = NodePatch {
                label: request.label,
                position: request.position,
                ..NodePatch::default()
            };
            editor.update_node(&id, patch).map_err(canvas_error)?;
            id
        }
    };

    state.persist(&editor).await.map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(CreatedPayload { id })))
}

async fn patch_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(node_id): AxumPath<String>,
    Json(patch): Json<NodePatch>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    editor.update_node(&node_id, patch).map_err(canvas_error)?;
    state.persist(&editor).await.map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(node_id): AxumPath<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    if !editor.remove_node(&node_id) {
        return Err((StatusCode::NOT_FOUND, format!("node '{node_id}' not found")));
    }
    state.persist(&editor).await.map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_edge(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<ConnectRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    let id = editor
        .connect(
            &request.source,
            &request.target,
            request.source_handle,
            request.target_handle,
        )
        .map_err(canvas_error)?;
    if let Some(edge_type) = request.edge_type {
        editor.set_edge_type(&id, edge_type).map_err(canvas_error)?;
    }

    state.persist(&editor).await.map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(CreatedPayload { id })))
}

async fn patch_edge(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
    Json(update): Json<EdgeUpdateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    if editor.diagram().edge(&edge_id).is_none() {
        return Err(canvas_error(CanvasError::UnknownEdge(edge_id)));
    }

    if let Some(edge_type) = update.edge_type {
        editor
            .set_edge_type(&edge_id, edge_type)
            .map_err(canvas_error)?;
    }
    if let Some(label) = update.label {
        editor.set_edge_label(&edge_id, label).map_err(canvas_error)?;
    }
    if let Some(animated) = update.animated {
        editor
            .set_edge_animated(&edge_id, animated)
            .map_err(canvas_error)?;
    }
    if let Some(marker_end) = update.marker_end {
        editor
            .set_edge_marker_end(&edge_id, marker_end)
            .map_err(canvas_error)?;
    }
    if let Some(data) = update.data {
        editor
            .update_edge_data(&edge_id, data)
            .map_err(canvas_error)?;
    }

    state.persist(&editor).await.map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_edge(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    if !editor.remove_edge(&edge_id) {
        return Err((StatusCode::NOT_FOUND, format!("edge '{edge_id}' not found")));
    }
    state.persist(&editor).await.map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_edge_event(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<EdgeGeometry>, (StatusCode, String)> {
    let mut editor = state.editor.lock().await;
    let before = editor.diagram().edge(&edge_id).map(|edge| edge.data.clone());
    let geometry = editor.dispatch(&edge_id, event).map_err(canvas_error)?;
    let after = editor.diagram().edge(&edge_id).map(|edge| edge.data.clone());

    if before != after {
        state.persist(&editor).await.map_err(internal_error)?;
    }
    Ok(Json(geometry))
}

fn canvas_error(err: CanvasError) -> (StatusCode, String) {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    log::warn!("rejected request: {err}");
    (status, err.to_string())
}

fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
