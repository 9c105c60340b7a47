//! Breach ledger: refusals counted per address since process start
//!
//! Counts never decay, so sporadic offenders eventually cross the blacklist
//! threshold too.

use std::collections::HashMap;

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct BreachLedger {
	counts: HashMap<AddressKey, u32>,
}

impl BreachLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one breach for `key` and return the new count
	pub fn bump(&mut self, key: &AddressKey) -> u32 {
		let count = self.counts.entry(*key).or_insert(0);
		*count = count.saturating_add(1);
		*count
	}

	/// Current breach count (0 for unknown addresses)
	pub fn get(&self, key: &AddressKey) -> u32 {
		self.counts.get(key).copied().unwrap_or(0)
	}

	pub fn tracked(&self) -> usize {
		self.counts.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_first_breach_counts_one() {
		let mut ledger = BreachLedger::new();
		let key: AddressKey = "10.0.0.1".parse().unwrap();

		assert_eq!(ledger.get(&key), 0);
		assert_eq!(ledger.bump(&key), 1);
		assert_eq!(ledger.bump(&key), 2);
		assert_eq!(ledger.get(&key), 2);
	}

	#[test]
	fn test_counts_are_per_address() {
		let mut ledger = BreachLedger::new();
		let a: AddressKey = "10.0.0.1".parse().unwrap();
		let b: AddressKey = "10.0.0.2".parse().unwrap();

		ledger.bump(&a);
		ledger.bump(&a);
		ledger.bump(&b);

		assert_eq!(ledger.get(&a), 2);
		assert_eq!(ledger.get(&b), 1);
		assert_eq!(ledger.tracked(), 2);
	}
}

// vim: ts=4
