use axum::Json;
use serde_json::{json, Value};

/// Liveness probe: the process is up and serving requests.
pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}
