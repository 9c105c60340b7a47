//! Contact form endpoint

use std::collections::BTreeMap;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use portcullis_core::rate_limit::{ClientKey, Decision};
use portcullis_email::settings::DEFAULT_SUBJECT;
use portcullis_email::{ContactMessage, MAIL_TRANSPORT_TAG};

use crate::prelude::*;

const MAIL_FAILED_MESSAGE: &str = "Could not send contact message";

/// POST /api/contact
///
/// Admits the caller through the contact admission pipeline, then mails the
/// submitted fields. Refusals are answered only after the recommended delay.
pub async fn post_contact(
	State(app): State<App>,
	ClientKey(key): ClientKey,
	Form(fields): Form<BTreeMap<String, String>>,
) -> PcResult<Response> {
	let decision = app.contact_admission().admit(&key, app.clock.now_ms());
	if let Decision::Refuse(refusal) = decision {
		if !refusal.delay.is_zero() {
			tokio::time::sleep(refusal.delay).await;
		}
		return Ok(refusal.into_response());
	}

	let subject =
		app.config.section("Mail").get_str("Subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
	let message = ContactMessage::from_form(subject, &fields);
	let transport = app.ext(&MAIL_TRANSPORT_TAG)?;

	match transport.deliver(message).await {
		Ok(()) => {
			info!("Contact message from {} delivered ({} fields)", key, fields.len());
			Ok((StatusCode::OK, Json(json!({ "status": "sent" }))).into_response())
		}
		Err(e) => {
			error!("Contact message from {} not delivered: {}", key, e);
			let body = json!({ "error": { "code": "E-MAIL-FAILED", "message": MAIL_FAILED_MESSAGE } });
			Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
		}
	}
}

// vim: ts=4
