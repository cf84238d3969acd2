use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MarkovError;
use crate::random::RandomSource;

/// Weighted multiset mapping a following token to its occurrence count.
///
/// Conceptually this is one row of the transition matrix: outgoing edges
/// of a Markov node, weighted by how often each edge was observed.
///
/// # Responsibilities
/// - Accumulate occurrence counts during ingestion
/// - Pick a following token by weighted random sampling
/// - Merge with another mapping without mutating either operand
///
/// ## Invariants
/// - `total` always equals the sum of all stored weights
/// - An additive insert of quantity 0 never creates an entry; only `set`
///   may store an explicit zero weight
/// - Insertion order of keys is preserved, so the index-based pick breaks
///   ties deterministically
// The Eq + Hash bound lives on the struct so the serde derives can
// deserialize the inner IndexMap.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProbabilityMapping<T: Eq + Hash> {
	counter: IndexMap<T, u64>,
	total: u64,
}

impl<T: Eq + Hash> ProbabilityMapping<T> {
	/// Creates a new, empty mapping.
	pub fn new() -> Self {
		Self {
			counter: IndexMap::new(),
			total: 0,
		}
	}

	/// Returns the total count of all items added.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Returns true if no entry has ever been stored.
	pub fn is_empty(&self) -> bool {
		self.counter.is_empty()
	}

	/// Iterates over the entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&T, u64)> {
		self.counter.iter().map(|(token, weight)| (token, *weight))
	}

	/// Adds the specified token `quantity` times to this mapping.
	///
	/// A quantity of 0 does nothing: no entry is created and the total is
	/// unchanged.
	pub fn add(&mut self, token: T, quantity: u64) {
		if quantity == 0 {
			return;
		}
		*self.counter.entry(token).or_insert(0) += quantity;
		self.total += quantity;
	}

	/// Adds the specified token one time to this mapping.
	pub fn add_one(&mut self, token: T) {
		self.add(token, 1);
	}

	/// Overwrites the stored weight for `token` to exactly `quantity`,
	/// creating the entry if absent.
	///
	/// Unlike `add`, a quantity of 0 stores an explicit zero-weight entry.
	/// The net effect on the total is `quantity - previous`.
	pub fn set(&mut self, token: T, quantity: u64) {
		if let Some(previous) = self.counter.insert(token, quantity) {
			self.total -= previous;
		}
		self.total += quantity;
	}

	/// Returns the stored weight for `token`, or `None` if never set.
	pub fn get(&self, token: &T) -> Option<u64> {
		self.counter.get(token).copied()
	}

	/// Returns the stored weight for `token`, or `fallback` if never set.
	pub fn get_or_default(&self, token: &T, fallback: u64) -> u64 {
		self.get(token).unwrap_or(fallback)
	}

	/// Picks an entry at random, weighted by occurrence count.
	///
	/// Draws an index uniformly in `[0, total)` and walks the entries in
	/// insertion order, subtracting each weight until the remainder goes
	/// negative: entries with a larger weight occupy a proportionally
	/// larger sub-range.
	///
	/// # Errors
	/// Returns `MarkovError::EmptyState` if the total weight is 0.
	pub fn next_randomly<R: RandomSource>(&self, rng: &mut R) -> Result<&T, MarkovError> {
		if self.total == 0 {
			return Err(MarkovError::EmptyState(
				"values must be added to the mapping before one can be chosen".to_owned(),
			));
		}
		let mut remainder = rng.next_below(self.total as i64)?;

		let mut fallback = None;
		for (token, weight) in &self.counter {
			remainder -= *weight as i64;
			if remainder < 0 {
				return Ok(token);
			}
			fallback = Some(token);
		}

		// The draw is bounded by the total, so the loop always returns
		// unless weights overflowed i64 during the walk.
		fallback.ok_or_else(|| {
			MarkovError::EmptyState("weighted pick exhausted the mapping".to_owned())
		})
	}
}

impl<T: Clone + Eq + Hash> ProbabilityMapping<T> {
	/// Merges this and the specified mapping and returns a new one.
	///
	/// The weight of each token in the result is the sum of the operands'
	/// weights for that token; tokens present in only one operand keep
	/// that operand's weight. Neither operand is mutated, and the result
	/// total equals the sum of both operand totals. Explicit zero-weight
	/// entries do not survive the merge.
	pub fn merge(&self, other: &Self) -> Self {
		let mut merged = Self::new();
		for (token, weight) in self.counter.iter().chain(other.counter.iter()) {
			merged.add(token.clone(), *weight);
		}
		merged
	}

	/// Returns a copy of the internal representation. Changes in the copy
	/// will not reflect in the original, and vice versa.
	pub fn mapping(&self) -> IndexMap<T, u64> {
		self.counter.clone()
	}
}

impl<T: Eq + Hash> Default for ProbabilityMapping<T> {
	fn default() -> Self {
		Self::new()
	}
}

// Order-insensitive comparison of the counters; the running total follows
// from them.
impl<T: Eq + Hash> PartialEq for ProbabilityMapping<T> {
	fn eq(&self, other: &Self) -> bool {
		self.counter == other.counter
	}
}

impl<T: Eq + Hash> Eq for ProbabilityMapping<T> {}
