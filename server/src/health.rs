//! Liveness endpoint

use axum::Json;
use portcullis_core::app::VERSION;
use serde_json::{json, Value};

pub async fn get_health() -> Json<Value> {
	Json(json!({ "status": "ok", "version": VERSION }))
}

// vim: ts=4
