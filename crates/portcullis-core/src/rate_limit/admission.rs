//! Admission controller
//!
//! Composes the frequency limiter, the breach ledger and the blacklist into
//! the per-request decision for a guarded endpoint. Per address the state is
//! derived, not stored:
//!
//! - admitted: the limiter recorded the event
//! - throttled: refused, breach count below the blacklist limit
//! - banned: breach count reached the blacklist limit (address blacklisted)
//!
//! Both tables live in the shared context so they outlive the handler. The
//! limiter and ledger locks are taken in that order and held for the whole
//! decision; they are released before the blacklist is touched and before
//! anything is logged.

use std::sync::Arc;

use parking_lot::Mutex;

use super::blacklist::BlacklistInsert;
use super::config::{AdmissionConfig, EXPIRE_AFTER};
use super::error::{Refusal, RefuseReason};
use super::ledger::BreachLedger;
use super::limiter::FrequencyLimiter;
use crate::context::{SharedContext, Tag};
use crate::prelude::*;

/// Frequency table of the contact endpoint
pub const DOS_TABLE_TAG: Tag<Mutex<FrequencyLimiter>> = Tag::new("ContactHandlerDOS.TABLE");
/// Breach counts of the contact endpoint
pub const BREACH_MAP_TAG: Tag<Mutex<BreachLedger>> = Tag::new("ContactHandlerBREACH.MAP");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Admit,
	Refuse(Refusal),
}

impl Decision {
	pub fn is_admit(&self) -> bool {
		matches!(self, Decision::Admit)
	}
}

/// Result of the locked part of a decision
enum Outcome {
	/// Carries the number of idle limiter entries dropped
	Admitted(usize),
	Throttled(u32),
	/// Already over the threshold before this request
	StillBanned(u32),
}

pub struct AdmissionController {
	context: Arc<SharedContext>,
	blacklist: Arc<dyn BlacklistInsert>,
	config: AdmissionConfig,
}

impl AdmissionController {
	pub fn new(
		context: Arc<SharedContext>,
		blacklist: Arc<dyn BlacklistInsert>,
		config: AdmissionConfig,
	) -> Self {
		Self { context, blacklist, config }
	}

	pub fn config(&self) -> &AdmissionConfig {
		&self.config
	}

	/// The shared frequency table, created on first use
	pub fn limiter(&self) -> PcResult<Arc<Mutex<FrequencyLimiter>>> {
		self.context
			.get_or_init(&DOS_TABLE_TAG, || Mutex::new(FrequencyLimiter::from_config(&self.config)))
	}

	/// The shared breach ledger, created on first use
	pub fn ledger(&self) -> PcResult<Arc<Mutex<BreachLedger>>> {
		self.context.get_or_init(&BREACH_MAP_TAG, || Mutex::new(BreachLedger::new()))
	}

	/// Decide whether `key` may perform the guarded operation at `now`
	pub fn admit(&self, key: &AddressKey, now: Millis) -> Decision {
		let delay = self.config.refusal_delay;
		let (limiter, ledger) = match self.limiter().and_then(|l| Ok((l, self.ledger()?))) {
			Ok(tables) => tables,
			Err(err) => {
				error!("Refusing {}: {}", key, err);
				let tag = match err {
					Error::ContextTypeMismatch { tag } | Error::ContextOccupied { tag } => tag,
					_ => "unknown",
				};
				return Decision::Refuse(Refusal::new(RefuseReason::ContextCollision { tag }, delay));
			}
		};

		let threshold = self.config.blacklist_limit.get();
		let outcome = {
			let mut limiter = limiter.lock();
			let mut ledger = ledger.lock();

			if ledger.get(key) >= threshold {
				Outcome::StillBanned(ledger.bump(key))
			} else if limiter.check(key, now) {
				Outcome::Admitted(limiter.expire(EXPIRE_AFTER))
			} else {
				Outcome::Throttled(ledger.bump(key))
			}
		};

		let breaches = match outcome {
			Outcome::Admitted(expired) => {
				if expired > 0 {
					debug!("Expired {} idle frequency table entries", expired);
				}
				return Decision::Admit;
			}
			Outcome::StillBanned(breaches) => {
				warn!(target: "dos::suspected", "DoS suspected from banned address {}", key);
				warn!(target: "dos::breach", count = breaches, "DoS threshold breached {} times by {}", breaches, key);
				self.blacklist.add(*key);
				return Decision::Refuse(Refusal::new(RefuseReason::Banned { breaches }, delay));
			}
			Outcome::Throttled(breaches) => breaches,
		};

		warn!(target: "dos::suspected", "DoS suspected from {}", key);
		warn!(target: "dos::breach", count = breaches, "DoS threshold breached {} times by {}", breaches, key);

		if breaches >= threshold {
			error!(
				target: "dos::blacklist",
				threshold,
				"DoS detected from {} due to breach count reaching threshold of {} breaches - blacklisting host from server",
				key,
				threshold
			);
			self.blacklist.add(*key);
			Decision::Refuse(Refusal::new(RefuseReason::Banned { breaches }, delay))
		} else {
			Decision::Refuse(Refusal::new(RefuseReason::Throttled { breaches }, delay))
		}
	}
}


// vim: ts=4
