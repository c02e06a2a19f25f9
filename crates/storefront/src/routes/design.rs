//! Room designer route handlers.
//!
//! The design is kept per visitor and the server is authoritative: the
//! browser script sends pointer events and settings changes, and redraws from
//! the design returned by every call. The 3D view is a server-rendered frame
//! (`/design/frame.png`) that the script reloads after changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use elegant_haven_core::canvas::projection::{Camera, Ndc};
use elegant_haven_core::canvas::scene::Scene;
use elegant_haven_core::canvas::{CanvasPoint, Position};
use elegant_haven_core::{
    CanvasType, Design, FurnitureId, FurnitureItem, FurnitureKind, HexColor,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{existing_visitor_id, visitor_id};
use crate::services::capture::{self, CaptureView, export_filename};
use crate::services::render::{self, FRAME_HEIGHT, FRAME_WIDTH, MAX_BACKGROUND_BYTES};
use crate::state::AppState;

/// Aspect ratio of the 3D viewport when the client does not send one.
const DEFAULT_ASPECT: f32 = FRAME_WIDTH as f32 / FRAME_HEIGHT as f32;

/// Multipart field carrying the background image.
const BACKGROUND_FIELD: &str = "background";

// =============================================================================
// Views
// =============================================================================

/// A design as returned by the JSON API.
///
/// The background image itself is served separately from
/// `/design/api/background`.
#[derive(Debug, Clone, Serialize)]
pub struct DesignView {
    pub canvas_type: CanvasType,
    pub width: f32,
    pub height: f32,
    pub canvas_color: HexColor,
    pub has_background: bool,
    pub items: Vec<FurnitureItem>,
    pub selected: Option<FurnitureId>,
    pub dragging: Option<FurnitureId>,
}

impl From<&Design> for DesignView {
    fn from(design: &Design) -> Self {
        let size = design.size();
        Self {
            canvas_type: design.canvas_type(),
            width: size.width,
            height: size.height,
            canvas_color: design.canvas_color(),
            has_background: design.background().is_some(),
            items: design.items().to_vec(),
            selected: design.selected(),
            dragging: design.drag().map(|drag| drag.id),
        }
    }
}

/// Designer page template.
#[derive(Template, WebTemplate)]
#[template(path = "design/show.html")]
pub struct DesignTemplate {
    pub kinds: Vec<(&'static str, &'static str)>,
    pub nonce: String,
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub canvas_type: Option<CanvasType>,
    pub canvas_color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFurnitureRequest {
    #[serde(rename = "type")]
    pub kind: FurnitureKind,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: Option<FurnitureId>,
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointRequest {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize)]
pub struct ColorRequest {
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct RotationRequest {
    pub rotation: f32,
}

/// A pointer in the 3D viewport, in normalized device coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerRequest {
    pub ndc: Ndc,
    pub aspect: Option<f32>,
}

impl PointerRequest {
    fn camera(&self) -> Camera {
        Camera::design(viewport_aspect(self.aspect))
    }
}

#[derive(Debug, Deserialize)]
pub struct FloorDragRequest {
    pub id: FurnitureId,
    #[serde(flatten)]
    pub pointer: PointerRequest,
}

#[derive(Debug, Deserialize)]
pub struct SceneQuery {
    pub aspect: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: CaptureView,
}

/// Sanitize a client-supplied aspect ratio.
fn viewport_aspect(aspect: Option<f32>) -> f32 {
    aspect
        .filter(|a| a.is_finite() && (0.1..=10.0).contains(a))
        .unwrap_or(DEFAULT_ASPECT)
}

// =============================================================================
// Helpers
// =============================================================================

/// Apply `change` to the visitor's design and return the new view.
///
/// The visitor stays locked from read to response, so concurrent changes
/// from one visitor apply in order.
async fn modify<T>(
    state: &AppState,
    session: &Session,
    change: impl FnOnce(&mut Design) -> Result<T>,
) -> Result<Json<DesignView>> {
    let id = visitor_id(session).await?;
    let mut visitor = state.visitors().lock(id).await;
    change(&mut visitor.design)?;
    Ok(Json(DesignView::from(&visitor.design)))
}

/// Read the visitor's design without creating a visitor.
async fn read_design<T>(
    state: &AppState,
    session: &Session,
    view: impl FnOnce(&Design) -> T,
) -> Result<T> {
    let visitor = existing_visitor_id(session).await?;
    Ok(state.visitors().read(visitor, |v| view(&v.design)).await)
}

// =============================================================================
// Page
// =============================================================================

/// Display the room designer.
#[instrument(skip(nonce))]
pub async fn show(CspNonce(nonce): CspNonce) -> impl IntoResponse {
    DesignTemplate {
        kinds: FurnitureKind::ALL
            .iter()
            .map(|kind| (kind.as_str(), kind.label()))
            .collect(),
        nonce,
    }
}

// =============================================================================
// Design API
// =============================================================================

/// Current design.
#[instrument(skip(state, session))]
pub async fn current(State(state): State<AppState>, session: Session) -> Result<Json<DesignView>> {
    let view = read_design(&state, &session, |design| DesignView::from(design)).await?;
    Ok(Json(view))
}

/// Change canvas type and/or color.
#[instrument(skip(state, session))]
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<DesignView>> {
    let color = request
        .canvas_color
        .as_deref()
        .map(HexColor::parse)
        .transpose()?;

    modify(&state, &session, |design| {
        if let Some(canvas_type) = request.canvas_type {
            design.set_canvas_type(canvas_type);
        }
        if let Some(color) = color {
            design.set_canvas_color(color);
        }
        Ok(())
    })
    .await
}

/// Upload a background image (PNG or JPEG, multipart field `background`).
#[instrument(skip(state, session, multipart))]
pub async fn upload_background(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<DesignView>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?
    {
        if field.name() == Some(BACKGROUND_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .ok_or_else(|| AppError::BadRequest(format!("missing `{BACKGROUND_FIELD}` field")))?;
    if bytes.len() > MAX_BACKGROUND_BYTES {
        return Err(AppError::BadRequest("background image is too large".to_string()));
    }

    let data_url = tokio::task::spawn_blocking(move || render::image_data_url(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    add_breadcrumb("design", "Uploaded background", None);
    modify(&state, &session, |design| {
        design.set_background(Some(data_url));
        Ok(())
    })
    .await
}

/// The stored background image, in its uploaded format.
#[instrument(skip(state, session))]
pub async fn background(State(state): State<AppState>, session: Session) -> Result<Response> {
    let (mime, bytes) = read_design(&state, &session, |design| {
        design.background().map(render::split_data_url)
    })
    .await?
    .ok_or_else(|| AppError::NotFound("background".to_string()))?
    .map_err(|e| AppError::Internal(format!("stored background is invalid: {e}")))?;

    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}

/// Remove the background image.
#[instrument(skip(state, session))]
pub async fn clear_background(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| {
        design.set_background(None);
        Ok(())
    })
    .await
}

/// Place a new furniture item; it becomes the selection.
#[instrument(skip(state, session))]
pub async fn add_furniture(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddFurnitureRequest>,
) -> Result<(StatusCode, Json<DesignView>)> {
    add_breadcrumb("design", "Added furniture", Some(&[("type", request.kind.as_str())]));
    let view = modify(&state, &session, |design| {
        design.add_furniture(request.kind);
        Ok(())
    })
    .await?;
    Ok((StatusCode::CREATED, view))
}

/// Select an item, or clear the selection with `{"id": null}`.
#[instrument(skip(state, session))]
pub async fn select(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectRequest>,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| Ok(design.select(request.id)?)).await
}

/// Move an item; the position is clamped to the canvas.
#[instrument(skip(state, session))]
pub async fn update_position(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<FurnitureId>,
    Json(request): Json<PointRequest>,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| {
        Ok(design.update_position(id, request.x, request.y)?)
    })
    .await
}

/// Recolor an item.
#[instrument(skip(state, session))]
pub async fn update_color(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<FurnitureId>,
    Json(request): Json<ColorRequest>,
) -> Result<Json<DesignView>> {
    let color = HexColor::parse(&request.color)?;
    modify(&state, &session, |design| Ok(design.update_color(id, color)?)).await
}

/// Set an item's rotation in degrees.
#[instrument(skip(state, session))]
pub async fn update_rotation(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<FurnitureId>,
    Json(request): Json<RotationRequest>,
) -> Result<Json<DesignView>> {
    if !request.rotation.is_finite() {
        return Err(AppError::BadRequest("rotation must be a number".to_string()));
    }
    modify(&state, &session, |design| Ok(design.rotate(id, request.rotation)?)).await
}

/// Remove an item.
#[instrument(skip(state, session))]
pub async fn remove_furniture(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<FurnitureId>,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| Ok(design.remove(id)?)).await
}

// =============================================================================
// 2D pointer drag
// =============================================================================

/// Pointer pressed on the 2D canvas.
#[instrument(skip(state, session))]
pub async fn drag_start(
    State(state): State<AppState>,
    session: Session,
    Json(pointer): Json<PointRequest>,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| {
        Ok(design.begin_drag(CanvasPoint::new(pointer.x, pointer.y)))
    })
    .await
}

/// Pointer moved on the 2D canvas.
#[instrument(skip(state, session))]
pub async fn drag_move(
    State(state): State<AppState>,
    session: Session,
    Json(pointer): Json<PointRequest>,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| {
        Ok(design.drag_to(CanvasPoint::new(pointer.x, pointer.y)))
    })
    .await
}

/// Pointer released or left the 2D canvas.
#[instrument(skip(state, session))]
pub async fn drag_end(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DesignView>> {
    modify(&state, &session, |design| {
        design.end_drag();
        Ok(())
    })
    .await
}

// =============================================================================
// 3D pointer interaction
// =============================================================================

/// Click in the 3D view: select the nearest item under the pointer.
#[instrument(skip(state, session))]
pub async fn pick(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PointerRequest>,
) -> Result<Json<DesignView>> {
    let camera = request.camera();
    modify(&state, &session, |design| Ok(design.pick(&camera, request.ndc))).await
}

/// Drag in the 3D view: move an item to the floor point under the pointer.
#[instrument(skip(state, session))]
pub async fn floor_drag(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<FloorDragRequest>,
) -> Result<Json<DesignView>> {
    let camera = request.pointer.camera();
    modify(&state, &session, |design| -> Result<Option<Position>> {
        Ok(design.drag_on_floor(request.id, &camera, request.pointer.ndc)?)
    })
    .await
}

/// The 3D scene graph of the current design.
#[instrument(skip(state, session))]
pub async fn scene(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SceneQuery>,
) -> Result<Json<Scene>> {
    let aspect = viewport_aspect(query.aspect);
    let scene = read_design(&state, &session, |design| Scene::for_design(design, aspect)).await?;
    Ok(Json(scene))
}

// =============================================================================
// Rendering
// =============================================================================

/// Live view frame for the designer page (not a download).
#[instrument(skip(state, session))]
pub async fn frame(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ViewQuery>,
) -> Result<Response> {
    let design = read_design(&state, &session, Design::clone).await?;
    let png = capture::capture(design, query.view)
        .await
        .map_err(|e| AppError::Internal(format!("frame render failed: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Capture the design as a PNG download.
///
/// One export per visitor at a time: a second request while one is running
/// gets 409. The slot is keyed by the session's visitor ID, which is stored
/// on the visitor's first change and never replaced, so every request on one
/// cookie contends for the same slot. A render failure is logged and
/// answered with 204.
#[instrument(skip(state, session))]
pub async fn export(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ViewQuery>,
) -> Result<Response> {
    let id = visitor_id(&session).await?;
    let Some(_guard) = state.captures().try_begin(&id.to_string()) else {
        return Err(AppError::Conflict("a capture is already in progress".to_string()));
    };

    let design = state.visitors().read(Some(id), |v| v.design.clone()).await;
    match capture::capture(design, query.view).await {
        Ok(png) => {
            let filename = export_filename(query.view, chrono::Utc::now().timestamp_millis());
            add_breadcrumb("design", "Exported design", Some(&[("view", query.view.as_str())]));
            Ok((
                [
                    (header::CONTENT_TYPE, "image/png".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                png,
            )
                .into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, view = query.view.as_str(), "Design capture failed");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::StorefrontConfig;

    fn state() -> AppState {
        AppState::new(StorefrontConfig::default(), Catalog::embedded().unwrap())
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn plan_query() -> Query<ViewQuery> {
        Query(ViewQuery {
            view: CaptureView::Plan,
        })
    }

    #[tokio::test]
    async fn test_concurrent_changes_all_apply() {
        let state = state();
        let session = session();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let (state, session) = (state.clone(), session.clone());
            tasks.spawn(async move {
                let request = AddFurnitureRequest {
                    kind: FurnitureKind::Chair,
                };
                add_furniture(State(state), session, Json(request)).await.map(|(status, _)| status)
            });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap().unwrap(), StatusCode::CREATED);
        }

        let Json(view) = current(State(state), session).await.unwrap();
        assert_eq!(view.items.len(), 10);
    }

    #[tokio::test]
    async fn test_reading_creates_no_visitor() {
        let state = state();
        let session = session();

        let Json(view) = current(State(state), session.clone()).await.unwrap();
        assert!(view.items.is_empty());
        assert!(existing_visitor_id(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_export_conflicts_while_capture_in_flight() {
        let state = state();
        let session = session();
        let id = visitor_id(&session).await.unwrap();

        let guard = state.captures().try_begin(&id.to_string()).unwrap();
        let err = export(State(state.clone()), session.clone(), plan_query())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        drop(guard);
        let response = export(State(state), session, plan_query()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_export_render_failure_is_no_content() {
        let state = state();
        let session = session();
        let id = visitor_id(&session).await.unwrap();
        state
            .visitors()
            .lock(id)
            .await
            .design
            .set_background(Some("data:image/png;base64,AAAA".to_string()));

        let response = export(State(state.clone()), session, plan_query()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!state.captures().is_capturing(&id.to_string()));
    }

    #[test]
    fn test_viewport_aspect_sanitized() {
        assert!((viewport_aspect(Some(1.5)) - 1.5).abs() < f32::EPSILON);
        assert!((viewport_aspect(None) - DEFAULT_ASPECT).abs() < f32::EPSILON);
        assert!((viewport_aspect(Some(f32::NAN)) - DEFAULT_ASPECT).abs() < f32::EPSILON);
        assert!((viewport_aspect(Some(0.0)) - DEFAULT_ASPECT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_design_view_hides_background_payload() {
        let mut design = Design::new();
        design.set_background(Some("data:image/png;base64,AAAA".to_string()));
        design.add_furniture(FurnitureKind::Table);

        let view = DesignView::from(&design);
        assert!(view.has_background);
        assert_eq!((view.width, view.height), (600.0, 600.0));

        let json = serde_json::to_value(&view).unwrap();
        assert!(!json.to_string().contains("base64"));
        assert_eq!(json["items"][0]["type"], "table");
    }

    #[test]
    fn test_floor_drag_request_shape() {
        let request: FloorDragRequest = serde_json::from_str(
            r#"{"id": "6f1c2a8e-5d0f-4c56-9b6e-1a2b3c4d5e6f", "ndc": {"x": 0.1, "y": -0.2}}"#,
        )
        .unwrap();
        assert!(request.pointer.aspect.is_none());
        assert!((request.pointer.ndc.y + 0.2).abs() < f32::EPSILON);
    }
}
