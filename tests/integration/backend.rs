//! In-process fake of the MedTrack backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Headers of every request the backend received, in arrival order.
#[derive(Clone, Default)]
pub struct Seen {
    headers: Arc<Mutex<Vec<HeaderMap>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap) {
        self.headers.lock().unwrap().push(headers.clone());
    }

    pub fn last(&self) -> HeaderMap {
        self.headers.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.headers.lock().unwrap().len()
    }
}

/// A running fake backend.
pub struct Backend {
    pub url: String,
    pub seen: Seen,
}

/// Start the fake backend on an ephemeral port.
pub async fn spawn() -> Backend {
    let seen = Seen::default();
    let router = Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/me", get(me))
        .route("/api/prescriptions/prescriptions/:patient", get(prescriptions))
        .route("/api/medications/medication-status/:patient", get(broken_proxy))
        .route("/api/medications/medication-response", post(medication_response))
        .route("/api/upload/file", post(upload_file))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Backend {
        url: format!("http://{addr}"),
        seen,
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn signin(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    seen.record(&headers);
    match (body["username_or_email"].as_str(), body["password"].as_str()) {
        (Some("ana"), Some("secret")) => Json(json!({
            "user_id": "u-1",
            "username": "ana",
            "email": "ana@example.com"
        }))
        .into_response(),
        _ => detail(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn me(State(seen): State<Seen>, headers: HeaderMap) -> Response {
    seen.record(&headers);
    match headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        Some(user_id) => Json(json!({ "user_id": user_id, "username": "ana" })).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
}

async fn prescriptions(
    State(seen): State<Seen>,
    Path(patient): Path<String>,
    headers: HeaderMap,
) -> Response {
    seen.record(&headers);
    if patient != "Ana Lima" {
        return detail(StatusCode::NOT_FOUND, "patient not found");
    }
    Json(json!({
        "status": "success",
        "prescriptions": [{
            "_id": "p-1",
            "user_id": "u-1",
            "patient_name": patient,
            "diagnosis": "Sinusitis",
            "medicines": [{"name": "Amoxicillin", "scheduled_times": ["08:30", "20:30"]}]
        }]
    }))
    .into_response()
}

async fn broken_proxy(State(seen): State<Seen>, headers: HeaderMap) -> Response {
    seen.record(&headers);
    (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response()
}

async fn medication_response(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    seen.record(&headers);
    let is_taken = fields.get("message").map(String::as_str) == Some("yes");
    Json(json!({
        "status": "success",
        "message": format!("reply from {}", fields.get("contact_number").cloned().unwrap_or_default()),
        "is_taken": is_taken,
        "log_updated": true
    }))
    .into_response()
}

async fn upload_file(State(seen): State<Seen>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    seen.record(&headers);
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        return Json(json!({
            "filename": filename,
            "url": "N/A",
            "public_id": format!("{}:{}", content_type, bytes.len()),
            "resource_type": "raw"
        }))
        .into_response();
    }
    detail(StatusCode::UNPROCESSABLE_ENTITY, "file field missing")
}
