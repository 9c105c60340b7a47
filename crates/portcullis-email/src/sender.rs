//! Mail transports
//!
//! `SmtpMailer` delivers through an SMTP relay using lettre's async tokio
//! transport. `LogTransport` only logs the message.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::prelude::*;
use crate::settings::{MailSettings, TlsMode};
use crate::{ContactMessage, MailTransport};

/// SMTP mail transport
pub struct SmtpMailer {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	sender: Mailbox,
	receiver: Mailbox,
	host: String,
}

impl SmtpMailer {
	/// Create a mailer. Sender and receiver addresses are validated here.
	pub fn new(settings: MailSettings) -> PcResult<Self> {
		let sender = parse_mailbox("sender", &settings.sender)?;
		let receiver = parse_mailbox("receiver", &settings.receiver)?;

		let tls = match settings.tls_mode {
			TlsMode::None => Tls::None,
			TlsMode::StartTls => Tls::Opportunistic(tls_parameters(&settings.host)?),
			TlsMode::Tls => Tls::Wrapper(tls_parameters(&settings.host)?),
		};

		let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
			.port(settings.port)
			.timeout(Some(settings.timeout))
			.tls(tls);
		if let Some(username) = settings.username {
			builder = builder.credentials(Credentials::new(username, settings.password.unwrap_or_default()));
		}

		debug!(
			"Mail transport {}:{} with TLS mode {:?}",
			settings.host, settings.port, settings.tls_mode
		);
		Ok(Self { transport: builder.build(), sender, receiver, host: settings.host })
	}
}

fn parse_mailbox(what: &str, address: &str) -> PcResult<Mailbox> {
	address
		.parse()
		.map_err(|_| Error::ConfigInvalid(format!("Invalid {} email address: {}", what, address)))
}

fn tls_parameters(host: &str) -> PcResult<TlsParameters> {
	TlsParameters::builder(host.to_string())
		.build()
		.map_err(|e| Error::ConfigInvalid(format!("TLS configuration error: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailer {
	async fn deliver(&self, message: ContactMessage) -> PcResult<()> {
		let email = Message::builder()
			.from(self.sender.clone())
			.to(self.receiver.clone())
			.subject(message.subject)
			.header(ContentType::TEXT_PLAIN)
			.body(message.body)
			.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))?;

		match self.transport.send(email).await {
			Ok(response) => {
				info!("Contact email sent via {} (response: {:?})", self.host, response.code());
				Ok(())
			}
			Err(e) => {
				warn!("Failed to send contact email via {}: {}", self.host, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}
}

/// Transport used when no mail server is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
	async fn deliver(&self, message: ContactMessage) -> PcResult<()> {
		info!("Contact message ({}):\n{}", message.subject, message.body);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn settings() -> MailSettings {
		MailSettings {
			host: "localhost".into(),
			port: 2525,
			username: None,
			password: None,
			sender: "Website <web@example.com>".into(),
			receiver: "office@example.com".into(),
			subject: "Contact Email".into(),
			tls_mode: TlsMode::None,
			timeout: Duration::from_secs(1),
		}
	}

	#[tokio::test]
	async fn test_valid_settings_build() {
		assert!(SmtpMailer::new(settings()).is_ok());
	}

	#[tokio::test]
	async fn test_invalid_addresses_rejected() {
		let mut bad_sender = settings();
		bad_sender.sender = "not an address".into();
		assert!(matches!(SmtpMailer::new(bad_sender), Err(Error::ConfigInvalid(_))));

		let mut bad_receiver = settings();
		bad_receiver.receiver = "office".into();
		assert!(matches!(SmtpMailer::new(bad_receiver), Err(Error::ConfigInvalid(_))));
	}

	#[tokio::test]
	async fn test_log_transport_succeeds() {
		let message = ContactMessage::new("Contact Email", "'a':'b'\r\n");
		assert!(LogTransport.deliver(message).await.is_ok());
	}
}

// vim: ts=4
