//! Error type shared by all portcullis crates

use axum::{http::StatusCode, response::IntoResponse, Json};

pub type PcResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Configuration value out of range (rejected at start-up)
	ConfigInvalid(String),
	/// A shared context tag holds a value of another type
	ContextTypeMismatch { tag: &'static str },
	/// A shared context tag is already populated
	ContextOccupied { tag: &'static str },
	ValidationError(String),
	ServiceUnavailable(String),
	PermissionDenied,
	NotFound,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Self::ConfigInvalid(format!("Cannot parse configuration: {}", err))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
			Error::ContextTypeMismatch { tag } => {
				write!(f, "Shared context tag {} holds a value of another type", tag)
			}
			Error::ContextOccupied { tag } => write!(f, "Shared context tag {} is already set", tag),
			Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
			Error::PermissionDenied => write!(f, "Permission denied"),
			Error::NotFound => write!(f, "Not found"),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, code) = match &self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-NOT-FOUND"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "E-PERMISSION-DENIED"),
			Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "E-VALIDATION"),
			Error::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "E-UNAVAILABLE"),
			_ => (StatusCode::INTERNAL_SERVER_ERROR, "E-INTERNAL"),
		};
		if status.is_server_error() {
			tracing::warn!("Request failed: {}", self);
		}
		// Internal details stay in the log
		let message = match &self {
			Error::ValidationError(msg) => msg.clone(),
			_ if status.is_server_error() => "Internal server error".to_string(),
			_ => self.to_string(),
		};
		let body = serde_json::json!({
			"error": {
				"code": code,
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_messages() {
		assert_eq!(
			Error::ConfigInvalid("Limit must be positive".into()).to_string(),
			"Invalid configuration: Limit must be positive"
		);
		assert_eq!(
			Error::ContextTypeMismatch { tag: "X" }.to_string(),
			"Shared context tag X holds a value of another type"
		);
	}

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
		assert_eq!(Error::PermissionDenied.into_response().status(), StatusCode::FORBIDDEN);
		assert_eq!(
			Error::Internal("boom".into()).into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_io_error_source() {
		let err: Error = std::io::Error::other("disk").into();
		assert!(std::error::Error::source(&err).is_some());
	}
}

// vim: ts=4
