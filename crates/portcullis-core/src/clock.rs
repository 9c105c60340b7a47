//! Monotonic millisecond clock for admission timestamps

use std::time::Instant;

use crate::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
	start: Instant,
}

impl MonotonicClock {
	pub fn new() -> Self {
		Self { start: Instant::now() }
	}

	/// Milliseconds elapsed since the clock was created
	pub fn now_ms(&self) -> Millis {
		u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
	}
}

impl Default for MonotonicClock {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clock_is_monotonic() {
		let clock = MonotonicClock::new();
		let a = clock.now_ms();
		std::thread::sleep(std::time::Duration::from_millis(5));
		let b = clock.now_ms();
		assert!(b >= a + 5);
	}
}

// vim: ts=4
