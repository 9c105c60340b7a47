use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use portcullis_core::rate_limit::BlacklistLayer;

use crate::prelude::*;
use crate::{contact, health};

fn init_api(app: App) -> Router {
	Router::new()
		.route("/api/contact", post(contact::post_contact))
		.route("/api/health", get(health::get_health))
		.with_state(app)
}

/// Full router: API routes, static content fallback, blacklist and tracing
/// layers
pub fn init(app: App) -> Router {
	Router::new()
		.merge(init_api(app.clone()))
		.fallback_service(ServeDir::new(&*app.opts.content_dir))
		.layer(BlacklistLayer::new(app.blacklist.clone(), app.opts.mode))
		.layer(TraceLayer::new_for_http())
}

// vim: ts=4
