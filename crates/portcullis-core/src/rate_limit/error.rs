//! Refusal types
//!
//! A refusal carries the reason and an advisory back-pressure delay. The
//! admission pipeline never sleeps; callers apply the delay outside of any
//! lock before responding.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Message returned to throttled and banned clients
pub const DOS_MESSAGE: &str =
	"Frequent requests from this address for this operation: Tracking Suspected DoS Attempt";
const COLLISION_MESSAGE: &str = "Internal state collision: request refused";
const BLACKLISTED_MESSAGE: &str = "Access from this address is blocked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefuseReason {
	/// Over the frequency limit, not yet blacklisted
	Throttled { breaches: u32 },
	/// Breach count reached the blacklist threshold
	Banned { breaches: u32 },
	/// A reserved context tag holds a foreign value
	ContextCollision { tag: &'static str },
	/// Refused at the edge by the server blacklist
	Blacklisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
	pub reason: RefuseReason,
	/// Recommended delay before answering the client
	pub delay: Duration,
}

impl Refusal {
	pub fn new(reason: RefuseReason, delay: Duration) -> Self {
		Self { reason, delay }
	}

	pub fn message(&self) -> &'static str {
		match self.reason {
			RefuseReason::Throttled { .. } | RefuseReason::Banned { .. } => DOS_MESSAGE,
			RefuseReason::ContextCollision { .. } => COLLISION_MESSAGE,
			RefuseReason::Blacklisted => BLACKLISTED_MESSAGE,
		}
	}

	pub fn code(&self) -> &'static str {
		match self.reason {
			RefuseReason::Throttled { .. } => "E-DOS-SUSPECTED",
			RefuseReason::Banned { .. } => "E-DOS-BANNED",
			RefuseReason::ContextCollision { .. } => "E-CONTEXT-COLLISION",
			RefuseReason::Blacklisted => "E-BLACKLISTED",
		}
	}

	pub fn status(&self) -> StatusCode {
		StatusCode::FORBIDDEN
	}
}

impl std::fmt::Display for Refusal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.reason {
			RefuseReason::Throttled { breaches } => {
				write!(f, "Throttled after {} breaches", breaches)
			}
			RefuseReason::Banned { breaches } => write!(f, "Banned after {} breaches", breaches),
			RefuseReason::ContextCollision { tag } => {
				write!(f, "Context tag {} holds a foreign value", tag)
			}
			RefuseReason::Blacklisted => write!(f, "Address is blacklisted"),
		}
	}
}

impl IntoResponse for Refusal {
	fn into_response(self) -> Response {
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.message(),
			}
		});
		(self.status(), Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_user_facing_message() {
		let throttled = Refusal::new(RefuseReason::Throttled { breaches: 1 }, Duration::ZERO);
		let banned = Refusal::new(RefuseReason::Banned { breaches: 3 }, Duration::ZERO);

		assert_eq!(throttled.message(), DOS_MESSAGE);
		assert_eq!(banned.message(), DOS_MESSAGE);
		assert_eq!(throttled.code(), "E-DOS-SUSPECTED");
		assert_eq!(banned.code(), "E-DOS-BANNED");
	}

	#[test]
	fn test_collision_is_distinct() {
		let refusal =
			Refusal::new(RefuseReason::ContextCollision { tag: "X" }, Duration::from_secs(1));
		assert_ne!(refusal.message(), DOS_MESSAGE);
		assert_eq!(refusal.to_string(), "Context tag X holds a foreign value");
	}

	#[test]
	fn test_response_is_forbidden() {
		let refusal = Refusal::new(RefuseReason::Blacklisted, Duration::ZERO);
		assert_eq!(refusal.into_response().status(), StatusCode::FORBIDDEN);
	}
}

// vim: ts=4
