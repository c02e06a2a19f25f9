//! Integration tests for the room designer API and rendering.

use elegant_haven_core::FurnitureItem;
use elegant_haven_core::canvas::projection::{Camera, item_world_position};
use elegant_haven_integration_tests::{TestServer, solid_png};
use nalgebra::Point3;
use reqwest::{StatusCode, multipart};
use serde_json::{Value, json};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Aspect ratio of the designer's 3D viewport.
const FRAME_ASPECT: f32 = 4.0 / 3.0;

async fn post_json(server: &TestServer, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = server
        .client
        .post(server.url(path))
        .json(body)
        .send()
        .await
        .expect("request sent");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn add_furniture(server: &TestServer, kind: &str) -> (String, Value) {
    let (status, design) =
        post_json(server, "/design/api/furniture", &json!({"type": kind})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = design["selected"].as_str().expect("new item is selected").to_string();
    (id, design)
}

async fn add_sofa(server: &TestServer) -> (String, Value) {
    add_furniture(server, "sofa").await
}

fn item<'a>(design: &'a Value, id: &str) -> &'a Value {
    design["items"]
        .as_array()
        .and_then(|items| items.iter().find(|item| item["id"] == id))
        .expect("item in design")
}

/// Pointer body aimed at a world point from the design camera.
fn pointer_at(point: &Point3<f32>) -> Value {
    let ndc = Camera::design(FRAME_ASPECT)
        .project(point)
        .expect("point is in front of the camera");
    json!({"ndc": {"x": ndc.x, "y": ndc.y}, "aspect": FRAME_ASPECT})
}

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 0.5)
}

#[tokio::test]
async fn test_new_furniture_is_selected_with_defaults() {
    let server = TestServer::spawn().await;
    let (id, design) = add_sofa(&server).await;

    assert_eq!(design["selected"], json!(id));
    let item = &design["items"][0];
    assert_eq!(item["type"], "sofa");
    assert_eq!(item["width"], 200.0);
    assert_eq!(item["height"], 100.0);
    assert_eq!(item["position"]["x"], 100.0);
    assert_eq!(item["position"]["y"], 100.0);
    assert_eq!(item["rotation"], 0.0);
}

#[tokio::test]
async fn test_positions_are_clamped_to_canvas() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;

    let (status, design) = post_json(
        &server,
        &format!("/design/api/furniture/{id}/position"),
        &json!({"x": 10_000.0, "y": -50.0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(design["items"][0]["position"]["x"], 400.0);
    assert_eq!(design["items"][0]["position"]["y"], 0.0);
}

#[tokio::test]
async fn test_shrinking_canvas_reclamps_items() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;

    let (_, design) =
        post_json(&server, "/design/api/settings", &json!({"canvas_type": "rectangle"})).await;
    assert_eq!(design["width"], 800.0);

    post_json(
        &server,
        &format!("/design/api/furniture/{id}/position"),
        &json!({"x": 600.0, "y": 0.0}),
    )
    .await;

    let (_, design) =
        post_json(&server, "/design/api/settings", &json!({"canvas_type": "square"})).await;
    assert_eq!(design["width"], 600.0);
    assert_eq!(design["items"][0]["position"]["x"], 400.0);
}

#[tokio::test]
async fn test_rotation_and_color_updates() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;

    let (_, design) = post_json(
        &server,
        &format!("/design/api/furniture/{id}/rotation"),
        &json!({"rotation": -90.0}),
    )
    .await;
    assert_eq!(design["items"][0]["rotation"], 270.0);

    let (_, design) = post_json(
        &server,
        &format!("/design/api/furniture/{id}/color"),
        &json!({"color": "#FF0000"}),
    )
    .await;
    assert_eq!(design["items"][0]["color"], "#ff0000");

    let (status, _) = post_json(
        &server,
        &format!("/design/api/furniture/{id}/color"),
        &json!({"color": "red"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_drag_moves_selected_item() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;

    // Sofa spans (100, 100) to (300, 200)
    let (_, design) =
        post_json(&server, "/design/api/drag/start", &json!({"x": 150.0, "y": 120.0})).await;
    assert_eq!(design["dragging"], json!(id));

    let (_, design) =
        post_json(&server, "/design/api/drag/move", &json!({"x": 250.0, "y": 220.0})).await;
    assert_eq!(design["items"][0]["position"]["x"], 200.0);
    assert_eq!(design["items"][0]["position"]["y"], 200.0);

    let (_, design) = post_json(&server, "/design/api/drag/end", &json!({})).await;
    assert_eq!(design["dragging"], Value::Null);
}

#[tokio::test]
async fn test_removed_furniture_is_gone() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;

    let resp = server
        .client
        .delete(server.url(&format!("/design/api/furniture/{id}")))
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::OK);
    let design: Value = resp.json().await.expect("design");
    assert_eq!(design["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(design["selected"], Value::Null);

    let resp = server
        .client
        .delete(server.url(&format!("/design/api/furniture/{id}")))
        .send()
        .await
        .expect("delete again");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_background_upload_round_trip() {
    let server = TestServer::spawn().await;
    let png = solid_png(4, 3, [10, 20, 30]);

    let form = multipart::Form::new().part(
        "background",
        multipart::Part::bytes(png).file_name("room.png").mime_str("image/png").expect("mime"),
    );
    let resp = server
        .client
        .post(server.url("/design/api/background"))
        .multipart(form)
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::OK);
    let design: Value = resp.json().await.expect("design");
    assert_eq!(design["has_background"], true);

    let resp = server
        .client
        .get(server.url("/design/api/background"))
        .send()
        .await
        .expect("background");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.bytes().await.expect("bytes");
    assert!(bytes.starts_with(PNG_SIGNATURE));

    let resp = server
        .client
        .delete(server.url("/design/api/background"))
        .send()
        .await
        .expect("clear");
    let design: Value = resp.json().await.expect("design");
    assert_eq!(design["has_background"], false);
}

#[tokio::test]
async fn test_background_rejects_non_images() {
    let server = TestServer::spawn().await;

    let form = multipart::Form::new().part(
        "background",
        multipart::Part::bytes(b"not an image".to_vec()).file_name("notes.txt"),
    );
    let resp = server
        .client
        .post(server.url("/design/api/background"))
        .multipart(form)
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exports_are_png_attachments() {
    let server = TestServer::spawn().await;
    add_sofa(&server).await;

    for view in ["2d", "3d"] {
        let resp = server
            .client
            .get(server.url(&format!("/design/export.png?view={view}")))
            .send()
            .await
            .expect("export");
        assert_eq!(resp.status(), StatusCode::OK, "{view}");
        let disposition = resp
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            disposition.contains(&format!("furniture-design-{view}-")),
            "{disposition}"
        );
        let bytes = resp.bytes().await.expect("png");
        assert!(bytes.starts_with(PNG_SIGNATURE));
    }
}

#[tokio::test]
async fn test_plan_frame_matches_canvas_size() {
    let server = TestServer::spawn().await;
    post_json(&server, "/design/api/settings", &json!({"canvas_type": "rectangle"})).await;

    let bytes = server
        .client
        .get(server.url("/design/frame.png?view=2d"))
        .send()
        .await
        .expect("frame")
        .bytes()
        .await
        .expect("png");
    let frame = image::load_from_memory(&bytes).expect("decodes");
    assert_eq!((frame.width(), frame.height()), (800, 600));
}

#[tokio::test]
async fn test_scene_lists_furniture_groups() {
    let server = TestServer::spawn().await;
    add_sofa(&server).await;

    let scene: Value = server
        .client
        .get(server.url("/design/api/scene"))
        .send()
        .await
        .expect("scene")
        .json()
        .await
        .expect("json");
    // The room itself plus one group per item
    assert_eq!(scene["groups"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_pick_selects_item_and_miss_clears_selection() {
    let server = TestServer::spawn().await;
    let (id, _) = add_sofa(&server).await;
    post_json(
        &server,
        &format!("/design/api/furniture/{id}/position"),
        &json!({"x": 200.0, "y": 250.0}),
    )
    .await;
    let (_, design) = post_json(&server, "/design/api/select", &json!({"id": null})).await;
    assert_eq!(design["selected"], Value::Null);

    let sofa: FurnitureItem =
        serde_json::from_value(item(&design, &id).clone()).expect("furniture item");
    let (status, design) =
        post_json(&server, "/design/api/pick", &pointer_at(&item_world_position(&sofa))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(design["selected"], json!(id));

    // Top-right corner of the viewport looks over the room
    let miss = json!({"ndc": {"x": 0.95, "y": 0.95}, "aspect": FRAME_ASPECT});
    let (status, design) = post_json(&server, "/design/api/pick", &miss).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(design["selected"], Value::Null);
}

#[tokio::test]
async fn test_floor_drag_moves_and_clamps() {
    let server = TestServer::spawn().await;
    let (chair, _) = add_furniture(&server, "chair").await;
    let (bed, _) = add_furniture(&server, "bed").await;

    // The room center is canvas (300, 300)
    let mut body = pointer_at(&Point3::origin());
    body["id"] = json!(chair);
    let (status, design) = post_json(&server, "/design/api/floor-drag", &body).await;
    assert_eq!(status, StatusCode::OK);
    let position = &item(&design, &chair)["position"];
    assert!(approx(&position["x"], 300.0), "{position}");
    assert!(approx(&position["y"], 300.0), "{position}");

    // World (4.5, 0, 4.5) is canvas (750, 750), past the square canvas
    let mut body = pointer_at(&Point3::new(4.5, 0.0, 4.5));
    body["id"] = json!(bed);
    let (status, design) = post_json(&server, "/design/api/floor-drag", &body).await;
    assert_eq!(status, StatusCode::OK);
    let position = &item(&design, &bed)["position"];
    assert!(approx(&position["x"], 350.0), "{position}");
    assert!(approx(&position["y"], 420.0), "{position}");
}

#[tokio::test]
async fn test_floor_drag_unknown_item_is_404() {
    let server = TestServer::spawn().await;
    add_sofa(&server).await;

    let mut body = pointer_at(&Point3::origin());
    body["id"] = json!("00000000-0000-4000-8000-000000000000");
    let (status, _) = post_json(&server, "/design/api/floor-drag", &body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_changes_are_all_kept() {
    let server = TestServer::spawn().await;
    // The first change sets the session cookie the rest share
    add_sofa(&server).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let client = server.client.clone();
        let url = server.url("/design/api/furniture");
        tasks.spawn(async move {
            client
                .post(url)
                .json(&json!({"type": "chair"}))
                .send()
                .await
                .expect("add furniture")
                .status()
        });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.expect("task"), StatusCode::CREATED);
    }

    let design: Value = server
        .client
        .get(server.url("/design/api"))
        .send()
        .await
        .expect("design")
        .json()
        .await
        .expect("json");
    assert_eq!(design["items"].as_array().map(Vec::len), Some(11));
}

#[tokio::test]
async fn test_concurrent_exports_share_one_slot() {
    let server = TestServer::spawn().await;
    add_sofa(&server).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..4 {
        let client = server.client.clone();
        let url = server.url("/design/export.png?view=3d");
        tasks.spawn(async move { client.get(url).send().await.expect("export").status() });
    }

    let mut statuses = Vec::new();
    while let Some(status) = tasks.join_next().await {
        statuses.push(status.expect("task"));
    }
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::OK || *s == StatusCode::CONFLICT),
        "{statuses:?}"
    );
    assert!(statuses.contains(&StatusCode::OK), "{statuses:?}");
}

#[tokio::test]
async fn test_background_uploads_are_rate_limited() {
    let server = TestServer::spawn().await;

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let form = multipart::Form::new().part(
            "background",
            multipart::Part::bytes(b"not an image".to_vec()).file_name("notes.txt"),
        );
        let resp = server
            .client
            .post(server.url("/design/api/background"))
            .multipart(form)
            .send()
            .await
            .expect("upload");
        statuses.push(resp.status());
    }

    // Burst of five, then the bucket is empty
    let (burst, limited) = statuses.split_at(5);
    assert!(burst.iter().all(|s| *s == StatusCode::BAD_REQUEST), "{statuses:?}");
    assert_eq!(limited, [StatusCode::TOO_MANY_REQUESTS]);
}
