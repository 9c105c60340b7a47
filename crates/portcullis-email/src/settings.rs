//! Mail server settings
//!
//! Read from the `Mail` section of the configuration.

use std::str::FromStr;
use std::time::Duration;

use portcullis_core::Config;

use crate::prelude::*;

pub const DEFAULT_PORT: u16 = 587;
pub const DEFAULT_SUBJECT: &str = "Contact Email";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
	None,
	StartTls,
	Tls,
}

impl FromStr for TlsMode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"none" => Ok(TlsMode::None),
			"starttls" => Ok(TlsMode::StartTls),
			"tls" => Ok(TlsMode::Tls),
			other => Err(Error::ConfigInvalid(format!(
				"Invalid TLS mode: {}. Must be 'none', 'starttls', or 'tls'",
				other
			))),
		}
	}
}

#[derive(Clone, PartialEq, Eq)]
pub struct MailSettings {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<String>,
	pub sender: String,
	pub receiver: String,
	pub subject: String,
	pub tls_mode: TlsMode,
	pub timeout: Duration,
}

// Keeps the password out of logs
impl std::fmt::Debug for MailSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MailSettings")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("username", &self.username)
			.field("sender", &self.sender)
			.field("receiver", &self.receiver)
			.field("subject", &self.subject)
			.field("tls_mode", &self.tls_mode)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

impl MailSettings {
	/// Parse the `Mail` section. Returns `None` when no host is configured.
	pub fn from_config(cfg: &Config) -> PcResult<Option<Self>> {
		let Some(host) = cfg.get_str("Host").filter(|h| !h.trim().is_empty()) else {
			return Ok(None);
		};

		let port = match cfg.get_i64("Port") {
			Some(port) => u16::try_from(port)
				.ok()
				.filter(|p| *p > 0)
				.ok_or_else(|| Error::ConfigInvalid(format!("Invalid mail port: {}", port)))?,
			None => DEFAULT_PORT,
		};
		let timeout = match cfg.get_i64("TimeoutSecs") {
			Some(secs) => u64::try_from(secs)
				.ok()
				.filter(|s| *s > 0)
				.map(Duration::from_secs)
				.ok_or_else(|| Error::ConfigInvalid(format!("Invalid mail timeout: {}", secs)))?,
			None => DEFAULT_TIMEOUT,
		};
		let tls_mode = match cfg.get_str("TlsMode") {
			Some(mode) => mode.parse()?,
			None => TlsMode::StartTls,
		};

		let sender = required(cfg, "Sender")?;
		let receiver = required(cfg, "Receiver")?;

		Ok(Some(Self {
			host,
			port,
			username: cfg.get_str("Username").filter(|u| !u.is_empty()),
			password: cfg.get_str("Password"),
			sender,
			receiver,
			subject: cfg.get_str("Subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
			tls_mode,
			timeout,
		}))
	}
}

fn required(cfg: &Config, key: &str) -> PcResult<String> {
	cfg.get_str(key)
		.filter(|v| !v.trim().is_empty())
		.ok_or_else(|| Error::ConfigInvalid(format!("Mail.{} is required when Mail.Host is set", key)))
}


// vim: ts=4
