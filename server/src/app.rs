//! App builder - configures and runs the portcullis server

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use portcullis_core::app::VERSION;
use portcullis_core::rate_limit::{AdmissionConfig, Blacklist};
use portcullis_core::{AppOpts, AppState, Config, MonotonicClock, ServerMode, SharedContext};
use portcullis_email::{MailTransport, MAIL_TRANSPORT_TAG};

use crate::prelude::*;
use crate::routes;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PORTCULLIS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./portcullis.yaml";

/// Configuration file path: the first CLI argument, then `PORTCULLIS_CONFIG`,
/// then `./portcullis.yaml`
pub fn config_path(arg: Option<String>) -> PathBuf {
	arg.or_else(|| std::env::var(CONFIG_ENV).ok())
		.filter(|p| !p.is_empty())
		.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

pub struct AppBuilder {
	opts: AppOpts,
	config: Config,
	contact: AdmissionConfig,
	blacklist: Vec<AddressKey>,
	mail_transport: Option<Arc<dyn MailTransport>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// several builders may exist per process
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppOpts {
				mode: ServerMode::Standalone,
				listen: "127.0.0.1:8080".into(),
				content_dir: PathBuf::from("./content").into(),
			},
			config: Config::new(),
			contact: AdmissionConfig::default(),
			blacklist: Vec::new(),
			mail_transport: None,
		}
	}

	/// Apply a loaded configuration file. Options set afterwards override it.
	pub fn configure(&mut self, config: Config) -> PcResult<&mut Self> {
		if let Some(listen) = config.get_str("Listen") {
			self.opts.listen = listen.into();
		}
		if let Some(mode) = config.get_str("Mode") {
			self.opts.mode = mode.parse()?;
		}
		if let Some(content) = config.get_str("Content") {
			self.opts.content_dir = PathBuf::from(content).into();
		}
		self.contact = AdmissionConfig::from_config(&config.section("Contact"))?;
		self.blacklist = Blacklist::from_config(&config, "Blacklist")?.entries();
		self.config = config;
		Ok(self)
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn content_dir(&mut self, content_dir: impl Into<Box<Path>>) -> &mut Self {
		self.opts.content_dir = content_dir.into();
		self
	}
	pub fn contact(&mut self, contact: AdmissionConfig) -> &mut Self {
		self.contact = contact;
		self
	}
	pub fn blacklist(&mut self, keys: impl IntoIterator<Item = AddressKey>) -> &mut Self {
		self.blacklist.extend(keys);
		self
	}
	pub fn mail_transport(&mut self, transport: Arc<dyn MailTransport>) -> &mut Self {
		self.mail_transport = Some(transport);
		self
	}

	/// Create the app state without binding a listener
	pub fn build(self) -> PcResult<App> {
		let mail_transport = match self.mail_transport {
			Some(transport) => transport,
			None => portcullis_email::transport_from_config(&self.config)?,
		};

		let context = Arc::new(SharedContext::new());
		context.set(&MAIL_TRANSPORT_TAG, mail_transport)?;

		let blacklist = Arc::new(Blacklist::from_keys(self.blacklist));
		info!(
			"Contact admission: {} requests per {} ms, blacklisting after {} breaches",
			self.contact.limit, self.contact.window, self.contact.blacklist_limit
		);

		Ok(Arc::new(AppState {
			opts: self.opts,
			config: self.config,
			clock: MonotonicClock::new(),
			context,
			blacklist,
			contact: self.contact,
		}))
	}

	pub async fn run(self) -> PcResult<()> {
		info!(" ___  ___  ___ _____ ___ _   _ _    _    ___ ___");
		info!("| _ \\/ _ \\| _ \\_   _/ __| | | | |  | |  |_ _/ __|");
		info!("|  _/ (_) |   / | || (__| |_| | |__| |__ | |\\__ \\");
		info!("|_|  \\___/|_|_\\ |_| \\___|\\___/|____|____|___|___/");
		info!("V{}", VERSION);
		info!("");

		let app = self.build()?;
		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(&*app.opts.listen).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			e
		})?;
		info!("Listening on {} ({:?} mode)", app.opts.listen, app.opts.mode);
		info!("Serving content from {}", app.opts.content_dir.display());

		axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		info!("Server stopped");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Cannot listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}


// vim: ts=4
