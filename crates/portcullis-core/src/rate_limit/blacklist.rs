//! Server-wide blacklist
//!
//! Addresses on the blacklist are refused at the edge, before routing.
//! Membership is permanent for the life of the process; operators un-ban by
//! editing the `Blacklist` configuration and restarting.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::prelude::*;
use crate::settings::Config;

/// Insert-only view of the blacklist handed to the admission pipeline
pub trait BlacklistInsert: Send + Sync {
	/// Add `key`; returns `true` if it was not listed before
	fn add(&self, key: AddressKey) -> bool;
}

#[derive(Debug, Default)]
pub struct Blacklist {
	entries: RwLock<HashSet<AddressKey>>,
}

impl Blacklist {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_keys(keys: impl IntoIterator<Item = AddressKey>) -> Self {
		Self { entries: RwLock::new(keys.into_iter().collect()) }
	}

	/// Seed from the list under `key` in the server configuration
	pub fn from_config(cfg: &Config, key: &str) -> PcResult<Self> {
		let keys = cfg
			.get_list(key)
			.iter()
			.map(|entry| {
				entry.parse::<AddressKey>().map_err(|_| {
					Error::ConfigInvalid(format!("{} entry is not an address: {}", key, entry))
				})
			})
			.collect::<PcResult<Vec<_>>>()?;
		if !keys.is_empty() {
			info!("Blacklist seeded with {} addresses", keys.len());
		}
		Ok(Self::from_keys(keys))
	}

	pub fn contains(&self, key: &AddressKey) -> bool {
		self.entries.read().contains(key)
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Listed addresses, sorted
	pub fn entries(&self) -> Vec<AddressKey> {
		let mut entries: Vec<AddressKey> = self.entries.read().iter().copied().collect();
		entries.sort_unstable();
		entries
	}
}

impl BlacklistInsert for Blacklist {
	fn add(&self, key: AddressKey) -> bool {
		let added = self.entries.write().insert(key);
		if added {
			info!("Blacklisted {}", key);
		}
		added
	}
}


// vim: ts=4
