//! Contact message delivery
//!
//! Renders submitted contact forms into plain-text messages and hands them to
//! a `MailTransport`: SMTP through lettre when a `Mail` section is
//! configured, a logging sink otherwise.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod sender;
pub mod settings;

pub use sender::{LogTransport, SmtpMailer};
pub use settings::{MailSettings, TlsMode};

mod prelude;

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use portcullis_core::Tag;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Transport registered for the contact endpoint
pub const MAIL_TRANSPORT_TAG: Tag<Arc<dyn MailTransport>> = Tag::new("ContactHandler.MAIL");

/// A rendered contact form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
	pub subject: String,
	pub body: String,
}

impl ContactMessage {
	pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
		Self { subject: subject.into(), body: body.into() }
	}

	/// Build a message from submitted form fields
	pub fn from_form(subject: impl Into<String>, fields: &BTreeMap<String, String>) -> Self {
		Self::new(subject, render_form(fields))
	}
}

/// Render form fields as `'key':'value'` lines, one per field, in key order
pub fn render_form(fields: &BTreeMap<String, String>) -> String {
	let mut out = String::new();
	for (key, value) in fields {
		let _ = write!(out, "'{}':'{}'\r\n", key, value);
	}
	out
}

#[async_trait]
pub trait MailTransport: Send + Sync {
	async fn deliver(&self, message: ContactMessage) -> PcResult<()>;
}

/// Pick the transport for a configuration: SMTP if a `Mail` section with a
/// host is present, logging otherwise
pub fn transport_from_config(cfg: &portcullis_core::Config) -> PcResult<Arc<dyn MailTransport>> {
	match MailSettings::from_config(&cfg.section("Mail"))? {
		Some(settings) => Ok(Arc::new(SmtpMailer::new(settings)?)),
		None => {
			info!("No mail server configured, contact messages will only be logged");
			Ok(Arc::new(LogTransport))
		}
	}
}


// vim: ts=4
