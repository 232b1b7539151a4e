use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use quote_desk::app;
use quote_desk::config::AppState;
use quote_desk::db::MemoryStore;

// -- Helpers --------------------------------------------------------------

fn build_app() -> axum::Router {
    app::router(AppState::in_memory(24))
}

async fn send(app: &axum::Router, method: http::Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn jane_data() -> Value {
    json!({ "fullName": "Jane Doe", "email": "jane@example.co.za" })
}

async fn create_jane(app: &axum::Router) -> Value {
    let (status, json) = send(
        app,
        http::Method::POST,
        "/api/leads/quote",
        Some(json!({ "step": 1, "data": jane_data() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = build_app();
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wizard_walkthrough_creates_a_new_submitted_lead() {
    let app = build_app();

    let created = create_jane(&app).await;
    let lead_id = created["leadId"].as_str().unwrap().to_string();
    let token = created["portalToken"].as_str().unwrap().to_string();
    assert!(created["referenceId"].as_str().unwrap().starts_with("QT-"));
    assert_eq!(created["submitted"], false);

    let mut data = jane_data();
    data["serviceType"] = json!("Tax");
    data["documents"] = json!([{ "name": "IRP5.pdf", "fileType": "application/pdf", "size": 2048 }]);

    for step in 2..=4 {
        let (status, json) = send(
            &app,
            http::Method::POST,
            "/api/leads/quote",
            Some(json!({ "leadId": lead_id, "step": step, "data": data })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leadId"], lead_id.as_str());
    }

    let (status, lead) = send(&app, http::Method::GET, &format!("/api/leads/{lead_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "New");
    assert_eq!(lead["lastStepCompleted"], 4);
    assert!(lead["submittedAt"].is_string());
    assert_eq!(lead["documents"].as_array().unwrap().len(), 1);

    let (status, portal) = send(&app, http::Method::GET, &format!("/api/leads/portal/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(portal["fullName"], "Jane Doe");
    assert_eq!(portal["progress"]["currentIndex"], 0);
    // O portal não expõe contato
    assert!(portal.get("email").is_none());
}

#[tokio::test]
async fn first_save_without_identity_is_rejected() {
    let app = build_app();
    let (status, json) = send(
        &app,
        http::Method::POST,
        "/api/leads/quote",
        Some(json!({ "step": 1, "data": { "fullName": "Jane Doe" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());

    let (_, leads) = send(&app, http::Method::GET, "/api/leads", None).await;
    assert_eq!(leads.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn step_out_of_range_is_rejected() {
    let app = build_app();
    let (status, _) = send(
        &app,
        http::Method::POST,
        "/api/leads/quote",
        Some(json!({ "step": 5, "data": jane_data() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_and_pending_tokens_are_denied() {
    let app = build_app();
    create_jane(&app).await;

    for token in ["garbage-token", "new"] {
        let (status, json) =
            send(&app, http::Method::GET, &format!("/api/leads/portal/{token}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn status_change_is_logged_and_shown_in_portal() {
    let app = build_app();
    let created = create_jane(&app).await;
    let lead_id = created["leadId"].as_str().unwrap();
    let token = created["portalToken"].as_str().unwrap();

    let (status, json) = send(
        &app,
        http::Method::PATCH,
        &format!("/api/leads/{lead_id}/status"),
        Some(json!({ "status": "Qualified", "comment": "Engagement letter signed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["lead"]["status"], "Qualified");
    assert_eq!(json["event"]["oldStatus"], "New");

    // Dashboard: mais recente primeiro
    let (_, detail) = send(&app, http::Method::GET, &format!("/api/leads/{lead_id}"), None).await;
    assert_eq!(detail["statusEvents"][0]["newStatus"], "Qualified");

    // Portal: mais antigo primeiro, stepper na etapa 2
    let (_, portal) = send(&app, http::Method::GET, &format!("/api/leads/portal/{token}"), None).await;
    let events = portal["statusEvents"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["newStatus"], "New");
    assert_eq!(portal["progress"]["currentIndex"], 2);
    assert_eq!(portal["progress"]["stages"][2]["state"], "active");
}

#[tokio::test]
async fn lost_lead_halts_at_furthest_stage() {
    let app = build_app();
    let created = create_jane(&app).await;
    let lead_id = created["leadId"].as_str().unwrap();
    let token = created["portalToken"].as_str().unwrap();

    for status in ["Contacted", "Lost"] {
        let (code, _) = send(
            &app,
            http::Method::PATCH,
            &format!("/api/leads/{lead_id}/status"),
            Some(json!({ "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (_, portal) = send(&app, http::Method::GET, &format!("/api/leads/portal/{token}"), None).await;
    assert_eq!(portal["status"], "Lost");
    assert_eq!(portal["progress"]["lost"], true);
    assert_eq!(portal["progress"]["currentIndex"], 1);
    assert_eq!(portal["progress"]["stages"][1]["state"], "halted");
}

#[tokio::test]
async fn portal_upload_appears_in_dashboard() {
    let app = build_app();
    let created = create_jane(&app).await;
    let lead_id = created["leadId"].as_str().unwrap();
    let token = created["portalToken"].as_str().unwrap();

    let (status, doc) = send(
        &app,
        http::Method::POST,
        &format!("/api/leads/portal/{token}/documents"),
        Some(json!({ "name": "bank_statement.pdf", "fileType": "application/pdf", "size": 1024 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doc["source"], "Portal");

    let (_, detail) = send(&app, http::Method::GET, &format!("/api/leads/{lead_id}"), None).await;
    assert_eq!(detail["documents"][0]["name"], "bank_statement.pdf");
}

#[tokio::test]
async fn tasks_can_be_toggled_and_deleted() {
    let store = Arc::new(MemoryStore::new());
    let request = store
        .insert_service_request("Annual financial statements", Some("Karoo Logistics (Pty) Ltd"))
        .await;
    let app = app::router(AppState::with_memory_store(store, 24));

    let (status, task) = send(
        &app,
        http::Method::POST,
        "/api/tasks",
        Some(json!({
            "title": "Request trial balance",
            "taskType": "DocumentRequest",
            "serviceRequestId": request.id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "Open");
    let task_id = task["id"].as_str().unwrap().to_string();

    let (_, tasks) = send(&app, http::Method::GET, "/api/tasks", None).await;
    assert_eq!(tasks[0]["serviceRequest"]["company"]["name"], "Karoo Logistics (Pty) Ltd");

    let (status, toggled) = send(
        &app,
        http::Method::POST,
        &format!("/api/tasks/{task_id}/toggle"),
        Some(json!({ "currentStatus": "Open" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["task"]["status"], "Done");

    let (status, _) = send(&app, http::Method::DELETE, &format!("/api/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, http::Method::DELETE, &format!("/api/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn malformed_lead_id_is_a_json_bad_request() {
    let app = build_app();
    let (status, json) = send(&app, http::Method::GET, "/api/leads/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn unknown_status_is_a_json_bad_request() {
    let app = build_app();
    let created = create_jane(&app).await;
    let lead_id = created["leadId"].as_str().unwrap();

    let (status, json) = send(
        &app,
        http::Method::PATCH,
        &format!("/api/leads/{lead_id}/status"),
        Some(json!({ "status": "Archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());

    // Nada mudou
    let (_, lead) = send(&app, http::Method::GET, &format!("/api/leads/{lead_id}"), None).await;
    assert_eq!(lead["status"], "New");
}

#[tokio::test]
async fn invalid_task_filter_is_a_json_bad_request() {
    let app = build_app();
    let (status, json) = send(&app, http::Method::GET, "/api/tasks?status=Someday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}
