use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, RngCore, SeedableRng};

use crate::error::MarkovError;

/// Source of pseudo-random integers used by the weighted walk.
///
/// The generation pipeline never touches a process-wide generator: every
/// operation that needs randomness takes a `RandomSource`, so the caller
/// decides whether a run is reproducible (`SeededRandom`) or not
/// (`DefaultRandom`).
pub trait RandomSource {
	/// Returns a pseudo-random value uniformly distributed over
	/// `[min, max)`.
	///
	/// # Errors
	/// Returns `MarkovError::InvalidArgument` if `min >= max`.
	fn next_in_range(&mut self, min: i64, max: i64) -> Result<i64, MarkovError>;

	/// Returns a pseudo-random value uniformly distributed over
	/// `[0, max)`.
	///
	/// # Errors
	/// Returns `MarkovError::InvalidArgument` if `max <= 0`.
	fn next_below(&mut self, max: i64) -> Result<i64, MarkovError> {
		self.next_in_range(0, max)
	}
}

/// Reproducible random source backed by a seeded `StdRng`.
///
/// Two instances built with the same seed produce bit-identical output
/// sequences for identical call patterns. The test suite and any consumer
/// that needs replayable generation rely on this.
///
/// ## Invariants
/// - Bounded draws are uniform: power-of-two bounds mask the raw bits
///   directly, other bounds use rejection sampling to avoid modulo bias at
///   the top of the range.
#[derive(Debug, Clone)]
pub struct SeededRandom {
	seed: u64,
	rng: StdRng,
}

impl SeededRandom {
	/// Creates a new source from a 64-bit seed.
	pub fn new(seed: u64) -> Self {
		Self {
			seed,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	/// Returns the seed that initialized this source.
	pub fn seed(&self) -> u64 {
		self.seed
	}

	/// Uniform draw over `[0, bound)`, `bound > 0` checked by the caller.
	///
	/// A power-of-two bound keeps the low bits of the raw draw. Any other
	/// bound reduces a non-negative 63-bit draw modulo `bound` and redraws
	/// whenever `bits - val + (bound - 1)` would overflow the positive
	/// range, which is exactly the case where the reduction is biased.
	fn next_bounded(&mut self, bound: i64) -> i64 {
		if bound & bound.wrapping_neg() == bound {
			return (self.rng.next_u64() & (bound as u64 - 1)) as i64;
		}
		loop {
			let bits = (self.rng.next_u64() & (i64::MAX as u64)) as i64;
			let val = bits % bound;
			if (bits - val).checked_add(bound - 1).is_some() {
				return val;
			}
		}
	}
}

impl RandomSource for SeededRandom {
	fn next_in_range(&mut self, min: i64, max: i64) -> Result<i64, MarkovError> {
		if min >= max {
			return Err(MarkovError::InvalidArgument(format!(
				"min ({}) must be less than max ({})",
				min, max
			)));
		}
		Ok(self.next_bounded(max - min) + min)
	}
}

/// Non-reproducible random source for production use.
///
/// Draws entropy from the thread-local generator, so two instances never
/// replay each other. Use `SeededRandom` when reproducibility matters.
#[derive(Debug, Clone)]
pub struct DefaultRandom {
	rng: ThreadRng,
}

impl DefaultRandom {
	pub fn new() -> Self {
		Self { rng: rand::rng() }
	}
}

impl Default for DefaultRandom {
	fn default() -> Self {
		Self::new()
	}
}

impl RandomSource for DefaultRandom {
	fn next_in_range(&mut self, min: i64, max: i64) -> Result<i64, MarkovError> {
		if min >= max {
			return Err(MarkovError::InvalidArgument(format!(
				"min ({}) must be less than max ({})",
				min, max
			)));
		}
		Ok(self.rng.random_range(min..max))
	}
}
