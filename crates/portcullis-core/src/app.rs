//! App state type

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::clock::MonotonicClock;
use crate::context::{SharedContext, Tag};
use crate::prelude::*;
use crate::rate_limit::{AdmissionConfig, AdmissionController, Blacklist};
use crate::settings::Config;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
	/// Clients connect directly; the peer address identifies them
	Standalone,
	/// Behind a reverse proxy; forwarding headers identify clients
	Proxy,
}

impl FromStr for ServerMode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"standalone" => Ok(ServerMode::Standalone),
			"proxy" => Ok(ServerMode::Proxy),
			other => Err(Error::ConfigInvalid(format!("Unknown server mode: {}", other))),
		}
	}
}

#[derive(Debug)]
pub struct AppOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	pub content_dir: Box<Path>,
}

pub struct AppState {
	pub opts: AppOpts,
	pub config: Config,
	pub clock: MonotonicClock,
	/// Process-wide registry for state that outlives handlers
	pub context: Arc<SharedContext>,
	/// Addresses refused at the edge
	pub blacklist: Arc<Blacklist>,
	/// Options of the contact endpoint's admission pipeline
	pub contact: AdmissionConfig,
}

impl AppState {
	/// Get a registered extension. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self, tag: &Tag<T>) -> PcResult<Arc<T>> {
		self.context.get(tag)?.ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", tag.name()))
		})
	}

	/// Admission controller guarding the contact endpoint
	pub fn contact_admission(&self) -> AdmissionController {
		AdmissionController::new(self.context.clone(), self.blacklist.clone(), self.contact.clone())
	}
}

pub type App = Arc<AppState>;

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	fn state() -> AppState {
		AppState {
			opts: AppOpts {
				mode: ServerMode::Standalone,
				listen: "127.0.0.1:0".into(),
				content_dir: PathBuf::from("./content").into(),
			},
			config: Config::new(),
			clock: MonotonicClock::new(),
			context: Arc::new(SharedContext::new()),
			blacklist: Arc::new(Blacklist::new()),
			contact: AdmissionConfig::default(),
		}
	}

	#[test]
	fn test_server_mode_parse() {
		assert_eq!("Proxy".parse::<ServerMode>().unwrap(), ServerMode::Proxy);
		assert_eq!(" standalone ".parse::<ServerMode>().unwrap(), ServerMode::Standalone);
		assert!("cluster".parse::<ServerMode>().is_err());
	}

	#[test]
	fn test_missing_extension() {
		const MISSING: Tag<u32> = Tag::new("test.missing");
		assert!(matches!(state().ext(&MISSING), Err(Error::Internal(_))));
	}

	#[test]
	fn test_controllers_share_tables() {
		let state = state();
		let key: AddressKey = "10.0.0.1".parse().unwrap();

		for now in [0, 1] {
			assert!(state.contact_admission().admit(&key, now).is_admit());
		}
		assert!(!state.contact_admission().admit(&key, 2).is_admit());
	}
}

// vim: ts=4
