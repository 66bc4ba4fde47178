//! Minimal Longhorn manager served from the test process

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    deletes: Vec<String>,
    purges: Vec<String>,
}

/// One attached volume holding an orphaned, a stale and a fresh snapshot
pub struct FakeLonghorn {
    pub endpoint: String,
    recorded: Arc<Mutex<Recorded>>,
}

fn volume_json() -> Value {
    json!({
        "id": "pvc-media",
        "name": "pvc-media",
        "state": "attached",
        "lastBackup": "",
        "lastBackupAt": "",
        "kubernetesStatus": { "namespace": "media", "pvcName": "library" },
        "actions": { "snapshotList": "", "snapshotDelete": "", "snapshotPurge": "" }
    })
}

fn snapshots_json() -> Value {
    let fresh = (Utc::now() - Duration::days(1))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();

    json!({
        "data": [
            { "name": "volume-head", "created": fresh, "size": "0" },
            { "name": "c-6fffho-orphan", "created": "2024-05-30T02:00:11Z", "size": "1048576" },
            { "name": "weekly-2020", "created": "2020-01-01T00:00:00Z", "size": "2097152" },
            { "name": "daily-fresh", "created": fresh, "size": "4096" }
        ]
    })
}

async fn list_volumes() -> Json<Value> {
    Json(json!({ "data": [volume_json()] }))
}

async fn get_volume(Path(id): Path<String>) -> Response {
    if id == "pvc-media" {
        Json(volume_json()).into_response()
    } else {
        (StatusCode::NOT_FOUND, "volume not found").into_response()
    }
}

async fn volume_action(
    State(recorded): State<Arc<Mutex<Recorded>>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    match query.get("action").map(String::as_str) {
        Some("snapshotList") => Json(snapshots_json()).into_response(),
        Some("snapshotDelete") => {
            let name = body["name"].as_str().unwrap_or_default().to_string();
            recorded.lock().unwrap().deletes.push(name);
            Json(volume_json()).into_response()
        }
        Some("snapshotPurge") => {
            recorded.lock().unwrap().purges.push("pvc-media".to_string());
            Json(volume_json()).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    }
}

impl FakeLonghorn {
    /// Bind to an ephemeral port and serve in the background
    pub async fn start() -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let app = Router::new()
            .route("/v1/volumes", get(list_volumes))
            .route("/v1/volumes/{id}", get(get_volume).post(volume_action))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("127.0.0.1:{}", addr.port()),
            recorded,
        }
    }

    /// Snapshot names deleted so far
    pub fn deletes(&self) -> Vec<String> {
        self.recorded.lock().unwrap().deletes.clone()
    }

    /// Volume ids purged so far
    pub fn purges(&self) -> Vec<String> {
        self.recorded.lock().unwrap().purges.clone()
    }
}
