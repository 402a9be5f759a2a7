use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "crisis-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn index() -> &'static str {
    "🌾 Crisis Agent Server is running! Use POST /crisis-agent"
}
