//! Edge blacklist middleware
//!
//! Tower layer refusing every request from a blacklisted address before it
//! reaches the router.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::blacklist::Blacklist;
use super::error::{Refusal, RefuseReason};
use super::extractors::client_key;
use crate::app::ServerMode;
use crate::prelude::*;

#[derive(Clone)]
pub struct BlacklistLayer {
	blacklist: Arc<Blacklist>,
	mode: ServerMode,
}

impl BlacklistLayer {
	pub fn new(blacklist: Arc<Blacklist>, mode: ServerMode) -> Self {
		Self { blacklist, mode }
	}
}

impl<S> Layer<S> for BlacklistLayer {
	type Service = BlacklistService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		BlacklistService { inner, blacklist: self.blacklist.clone(), mode: self.mode }
	}
}

#[derive(Clone)]
pub struct BlacklistService<S> {
	inner: S,
	blacklist: Arc<Blacklist>,
	mode: ServerMode,
}

impl<S> Service<Request<Body>> for BlacklistService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		if let Some(key) = client_key(&req, self.mode) {
			if self.blacklist.contains(&key) {
				debug!("Refusing blacklisted {} {}", key, req.uri().path());
				let refusal = Refusal::new(RefuseReason::Blacklisted, Duration::ZERO);
				return Box::pin(async move { Ok(refusal.into_response()) });
			}
		}

		// The clone is not ready yet; keep the driven service for this call
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		Box::pin(async move { inner.call(req).await })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rate_limit::BlacklistInsert;
	use axum::extract::ConnectInfo;
	use axum::http::StatusCode;
	use axum::routing::get;
	use axum::Router;
	use http_body_util::BodyExt;
	use std::net::SocketAddr;
	use tower::ServiceExt;

	fn request_from(peer: &str) -> Request<Body> {
		let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
		req.extensions_mut().insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
		req
	}

	#[tokio::test]
	async fn test_blacklisted_address_refused() {
		let blacklist = Arc::new(Blacklist::new());
		blacklist.add("10.0.0.66".parse().unwrap());
		let app = Router::new()
			.route("/", get(|| async { "hello" }))
			.layer(BlacklistLayer::new(blacklist, ServerMode::Standalone));

		let res = app.clone().oneshot(request_from("10.0.0.66:1234")).await.unwrap();
		assert_eq!(res.status(), StatusCode::FORBIDDEN);
		let bytes = res.into_body().collect().await.unwrap().to_bytes();
		let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(body["error"]["code"], "E-BLACKLISTED");

		let res = app.oneshot(request_from("10.0.0.67:1234")).await.unwrap();
		assert_eq!(res.status(), StatusCode::OK);
	}
}

// vim: ts=4
