//! Sliding-window operation frequency limiter
//!
//! Records the timestamps of admitted events per address and answers whether
//! one more event fits into the window. An event recorded at `t` counts
//! while `now - t < window`; at exactly `window` it has expired.
//!
//! Histories are pruned lazily: expired timestamps of an address are dropped
//! when that address is admitted again, and whole idle entries are dropped by
//! `expire`. A refused check never touches the address' history.

use std::collections::{HashMap, VecDeque};
use std::num::{NonZeroU16, NonZeroU64};

use super::config::AdmissionConfig;
use crate::prelude::*;

#[derive(Debug)]
pub struct FrequencyLimiter {
	limit: NonZeroU16,
	window: NonZeroU64,
	history: HashMap<AddressKey, VecDeque<Millis>>,
	/// Highest timestamp seen by `check`, the reference point for `expire`
	latest: Millis,
}

impl FrequencyLimiter {
	pub fn new(limit: NonZeroU16, window: NonZeroU64) -> Self {
		Self { limit, window, history: HashMap::new(), latest: 0 }
	}

	pub fn from_config(config: &AdmissionConfig) -> Self {
		Self::new(config.limit, config.window)
	}

	/// Check whether `key` may perform the operation at `now`, recording the
	/// event if so
	///
	/// `now` is clamped to the address' latest recorded timestamp so that
	/// histories stay ordered even if callers race on the clock.
	pub fn check(&mut self, key: &AddressKey, now: Millis) -> bool {
		let window = self.window.get();
		let limit = usize::from(self.limit.get());
		self.latest = self.latest.max(now);

		let (now, expired, live) = match self.history.get(key) {
			Some(history) => {
				let now = history.back().map_or(now, |&last| now.max(last));
				let expired = history.partition_point(|&t| now - t >= window);
				(now, expired, history.len() - expired)
			}
			None => (now, 0, 0),
		};

		if live >= limit {
			return false;
		}

		let history = self.history.entry(*key).or_default();
		history.drain(..expired);
		history.push_back(now);
		true
	}

	/// Drop every address whose most recent event is older than `max_age`
	///
	/// Age is measured against the latest timestamp passed to `check`.
	/// `max_age` is raised to the window size, so an address with an event
	/// still inside the window is never dropped. Returns the number of
	/// addresses removed.
	pub fn expire(&mut self, max_age: Millis) -> usize {
		let max_age = max_age.max(self.window.get());
		let latest = self.latest;
		let before = self.history.len();
		self.history
			.retain(|_, history| history.back().is_some_and(|&last| latest - last <= max_age));
		before - self.history.len()
	}

	/// Change the limit; recorded timestamps are kept
	pub fn set_limit(&mut self, limit: NonZeroU16) {
		self.limit = limit;
	}

	/// Change the window size; recorded timestamps are kept
	pub fn set_window(&mut self, window: NonZeroU64) {
		self.window = window;
	}

	pub fn limit(&self) -> NonZeroU16 {
		self.limit
	}

	pub fn window(&self) -> NonZeroU64 {
		self.window
	}

	/// Number of addresses with recorded events
	pub fn tracked(&self) -> usize {
		self.history.len()
	}

	/// Recorded timestamps for `key`, oldest first
	pub fn history(&self, key: &AddressKey) -> Vec<Millis> {
		self.history.get(key).map(|h| h.iter().copied().collect()).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::Ipv4Addr;

	const HOUR: Millis = 3_600_000;

	fn limiter(limit: u16, window: Millis) -> FrequencyLimiter {
		FrequencyLimiter::new(NonZeroU16::new(limit).unwrap(), NonZeroU64::new(window).unwrap())
	}

	fn key(last: u8) -> AddressKey {
		AddressKey::Ipv4(Ipv4Addr::new(10, 0, 0, last))
	}

	#[test]
	fn test_admits_up_to_limit() {
		let mut fl = limiter(2, HOUR);

		assert!(fl.check(&key(1), 0));
		assert!(fl.check(&key(1), 1000));
		assert!(!fl.check(&key(1), 2000));
		assert_eq!(fl.history(&key(1)), vec![0, 1000]);
	}

	#[test]
	fn test_refusal_leaves_history_untouched() {
		let mut fl = limiter(1, 1000);

		assert!(fl.check(&key(1), 0));
		assert!(!fl.check(&key(1), 999));
		assert_eq!(fl.history(&key(1)), vec![0]);
	}

	#[test]
	fn test_event_expires_at_exact_window() {
		let mut fl = limiter(1, 1000);

		assert!(fl.check(&key(1), 0));
		assert!(!fl.check(&key(1), 999));
		assert!(fl.check(&key(1), 1000));
		// the expired event is pruned on admission
		assert_eq!(fl.history(&key(1)), vec![1000]);
	}

	#[test]
	fn test_window_rollover() {
		let mut fl = limiter(2, HOUR);

		assert!(fl.check(&key(2), 0));
		assert!(fl.check(&key(2), 1000));
		assert!(fl.check(&key(2), HOUR + 500));
		assert_eq!(fl.history(&key(2)), vec![1000, HOUR + 500]);
	}

	#[test]
	fn test_addresses_are_independent() {
		let mut fl = limiter(1, HOUR);

		assert!(fl.check(&key(1), 0));
		assert!(fl.check(&key(2), 0));
		assert!(!fl.check(&key(1), 10));
		assert!(!fl.check(&key(2), 10));
		assert_eq!(fl.tracked(), 2);
	}

	#[test]
	fn test_backwards_clock_is_clamped() {
		let mut fl = limiter(3, 1000);

		assert!(fl.check(&key(1), 500));
		assert!(fl.check(&key(1), 100));
		assert_eq!(fl.history(&key(1)), vec![500, 500]);
	}

	#[test]
	fn test_expire_removes_idle_entries() {
		let mut fl = limiter(2, HOUR);

		fl.check(&key(1), 0);
		fl.check(&key(2), 2 * HOUR);
		fl.check(&key(3), 3 * HOUR);

		assert_eq!(fl.expire(HOUR), 1);
		assert!(fl.history(&key(1)).is_empty());
		assert_eq!(fl.history(&key(2)), vec![2 * HOUR]);
		assert_eq!(fl.tracked(), 2);
	}

	#[test]
	fn test_expire_never_drops_live_history() {
		let mut fl = limiter(1, 48 * HOUR);

		assert!(fl.check(&key(1), 0));
		assert!(fl.check(&key(2), 36 * HOUR));
		assert_eq!(fl.expire(24 * HOUR), 0);
		assert!(!fl.check(&key(1), 36 * HOUR + 1));

		assert!(fl.check(&key(2), 84 * HOUR));
		assert_eq!(fl.expire(24 * HOUR), 1);
		assert!(fl.history(&key(1)).is_empty());
	}

	#[test]
	fn test_expire_keeps_recent_activity() {
		let mut fl = limiter(2, HOUR);

		assert!(fl.check(&key(1), 10 * HOUR));
		assert!(fl.check(&key(1), 10 * HOUR + 1));
		assert_eq!(fl.expire(HOUR), 0);
		assert!(!fl.check(&key(1), 10 * HOUR + 2));
	}

	#[test]
	fn test_reconfigure_keeps_history() {
		let mut fl = limiter(1, HOUR);

		assert!(fl.check(&key(1), 0));
		assert!(!fl.check(&key(1), 1));

		fl.set_limit(NonZeroU16::new(2).unwrap());
		assert!(fl.check(&key(1), 2));
		assert_eq!(fl.history(&key(1)), vec![0, 2]);

		fl.set_window(NonZeroU64::new(10).unwrap());
		assert_eq!(fl.window().get(), 10);
		assert!(fl.check(&key(1), 11));
		assert_eq!(fl.history(&key(1)), vec![2, 11]);
	}
}

// vim: ts=4
