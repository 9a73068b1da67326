//! The two mirror routes — read and replace the profiles file.
//!
//! The mirror is schema-free: it reflects whatever the client persists, and
//! the client revalidates on load. Both routes always answer with the
//! normalized `{ rfidProfiles, labelPresets }` shape.

use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use serde_json::{Value, json};
use tracing::error;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub profiles_path: Arc<std::path::PathBuf>,
}

/// Build the router with both mirror routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/profiles.json", get(get_profiles))
        .route("/api/profiles", put(put_profiles))
        .with_state(state)
}

fn empty_profiles() -> Value {
    json!({ "rfidProfiles": [], "labelPresets": [] })
}

/// Coerce non-array (or absent) fields to empty arrays; drop anything else.
fn normalize(value: &Value) -> Value {
    let field = |name: &str| -> Value {
        value
            .get(name)
            .and_then(Value::as_array)
            .cloned()
            .map(Value::Array)
            .unwrap_or_else(|| Value::Array(Vec::new()))
    };
    json!({
        "rfidProfiles": field("rfidProfiles"),
        "labelPresets": field("labelPresets"),
    })
}

/// `GET /profiles.json` — the stored mirror. A missing or unparseable file
/// reads as the empty shape.
async fn get_profiles(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match tokio::fs::read(state.profiles_path.as_ref()).await {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| empty_profiles());
            (StatusCode::OK, Json(normalize(&value)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::OK, Json(empty_profiles()))
        }
        Err(e) => {
            error!("profiles read error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(empty_profiles()))
        }
    }
}

/// `PUT /api/profiles` — normalize the body and replace the stored mirror,
/// creating the data directory if needed.
async fn put_profiles(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    match write_profiles(&state.profiles_path, &body).await {
        Ok(profiles) => (StatusCode::OK, Json(profiles)),
        Err(e) => {
            error!("profiles write error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Write failed" })),
            )
        }
    }
}

async fn write_profiles(path: &Path, body: &[u8]) -> anyhow::Result<Value> {
    let body = if body.is_empty() { b"{}" as &[u8] } else { body };
    let value: Value = serde_json::from_slice(body)?;
    let profiles = normalize(&value);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(&profiles)?).await?;
    Ok(profiles)
}
