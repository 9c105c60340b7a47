//! Admission pipeline configuration
//!
//! Read from the `Contact` section of the configuration. Missing or
//! unparseable options fall back to their defaults; values that parse but
//! are out of range are rejected at start-up.

use std::num::{NonZeroU16, NonZeroU32, NonZeroU64};
use std::time::Duration;

use crate::prelude::*;
use crate::settings::Config;

/// Admissions per window
pub const DEFAULT_LIMIT: u16 = 2;
/// Sliding window size: one hour
pub const DEFAULT_WINDOW: Millis = 60 * 60 * 1000;
/// Refusals before an address is blacklisted
pub const DEFAULT_BLACKLIST_LIMIT: u32 = 3;
/// Recommended back-pressure delay on refusal
pub const DEFAULT_REFUSAL_DELAY: Duration = Duration::from_secs(5);
/// Idle limiter entries older than this are dropped: one day
pub const EXPIRE_AFTER: Millis = 24 * 60 * 60 * 1000;

const LIMIT: &str = "Limit";
const WINDOW: &str = "Window";
const BLACKLIST_LIMIT: &str = "BlacklistLimit";
const REFUSAL_DELAY: &str = "RefusalDelay";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionConfig {
	/// Maximum admitted events per address per window
	pub limit: NonZeroU16,
	/// Window size in milliseconds
	pub window: NonZeroU64,
	/// Breach count at which an address is blacklisted
	pub blacklist_limit: NonZeroU32,
	/// Advisory delay returned with every refusal
	pub refusal_delay: Duration,
}

impl AdmissionConfig {
	pub fn new(limit: u16, window: Millis, blacklist_limit: u32) -> PcResult<Self> {
		Ok(Self {
			limit: NonZeroU16::new(limit)
				.ok_or_else(|| Error::ConfigInvalid(format!("{} must be positive", LIMIT)))?,
			window: NonZeroU64::new(window)
				.ok_or_else(|| Error::ConfigInvalid(format!("{} must be positive", WINDOW)))?,
			blacklist_limit: NonZeroU32::new(blacklist_limit).ok_or_else(|| {
				Error::ConfigInvalid(format!("{} must be positive", BLACKLIST_LIMIT))
			})?,
			refusal_delay: DEFAULT_REFUSAL_DELAY,
		})
	}

	pub fn with_refusal_delay(mut self, delay: Duration) -> Self {
		self.refusal_delay = delay;
		self
	}

	/// Read the pipeline options from a configuration section
	pub fn from_config(cfg: &Config) -> PcResult<Self> {
		let limit = positive(cfg, LIMIT, DEFAULT_LIMIT)?;
		let window = positive(cfg, WINDOW, DEFAULT_WINDOW)?;
		let blacklist_limit = positive(cfg, BLACKLIST_LIMIT, DEFAULT_BLACKLIST_LIMIT)?;

		let refusal_delay = match cfg.get_i64(REFUSAL_DELAY) {
			None => DEFAULT_REFUSAL_DELAY,
			Some(ms) => Duration::from_millis(u64::try_from(ms).map_err(|_| {
				Error::ConfigInvalid(format!("{} must not be negative, got {}", REFUSAL_DELAY, ms))
			})?),
		};

		Ok(Self::new(limit, window, blacklist_limit)?.with_refusal_delay(refusal_delay))
	}
}

impl Default for AdmissionConfig {
	fn default() -> Self {
		Self {
			limit: NonZeroU16::new(DEFAULT_LIMIT).unwrap_or(NonZeroU16::MIN),
			window: NonZeroU64::new(DEFAULT_WINDOW).unwrap_or(NonZeroU64::MIN),
			blacklist_limit: NonZeroU32::new(DEFAULT_BLACKLIST_LIMIT).unwrap_or(NonZeroU32::MIN),
			refusal_delay: DEFAULT_REFUSAL_DELAY,
		}
	}
}

/// Read a positive integer option. Values too large for `T` count as
/// unparseable and yield the default.
fn positive<T: TryFrom<i64> + std::fmt::Display + Copy>(
	cfg: &Config,
	key: &str,
	default: T,
) -> PcResult<T> {
	match cfg.get_i64(key) {
		None => Ok(default),
		Some(n) if n <= 0 => {
			Err(Error::ConfigInvalid(format!("{} must be positive, got {}", key, n)))
		}
		Some(n) => Ok(T::try_from(n).unwrap_or_else(|_| {
			warn!("{} value {} is out of range, using default {}", key, n, default);
			default
		})),
	}
}


// vim: ts=4
