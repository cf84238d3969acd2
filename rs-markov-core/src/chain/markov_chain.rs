use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::probability_mapping::ProbabilityMapping;
use super::token_sequence::TokenSequence;
use super::windowed::windowed;
use crate::error::MarkovError;
use crate::random::RandomSource;

/// Order-N Markov chain over an arbitrary token type.
///
/// The chain owns a transition matrix mapping each length-N
/// [`TokenSequence`] observed in the ingested streams to the weighted
/// distribution of tokens that followed it. Ingested streams are treated
/// as circular (the tail wraps into the head), so every key has at least
/// one successor and a generation walk can run indefinitely.
///
/// # Responsibilities
/// - Build the matrix from one or more token streams (`add`)
/// - Combine chains of equal order with relative weights (`merge`)
/// - Drive the weighted random generation walk (`stream`, `stream_from`)
///
/// ## Invariants
/// - `order >= 1`, fixed at construction
/// - Every matrix key observed through `add` has exactly `order` tokens
///   (or `order - 1` for the documented degenerate short-corpus case)
/// - The matrix only grows: `add` and merge construction never remove
///   entries
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MarkovChain<T: Eq + Hash> {
	order: usize,
	matrix: IndexMap<TokenSequence<T>, ProbabilityMapping<T>>,
}

impl<T: Clone + Eq + Hash> MarkovChain<T> {
	/// Creates a new Markov chain of the specified order.
	///
	/// # Errors
	/// Returns `MarkovError::InvalidArgument` if `order < 1`.
	pub fn new(order: usize) -> Result<Self, MarkovError> {
		if order < 1 {
			return Err(MarkovError::InvalidArgument(
				"the order of the markov chain must be positive".to_owned(),
			));
		}
		Ok(Self {
			order,
			matrix: IndexMap::new(),
		})
	}

	/// Returns the order of the Markov chain.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Builds transition matrix entries from the specified token stream.
	///
	/// The whole stream is materialized in memory, cut into length-`order`
	/// sliding windows, and `order - 1` extra windows are synthesized to
	/// treat the stream as circular: each one drops the head of the
	/// previous last window and splices in the next token from the start
	/// of the stream. Each window then records the token following it
	/// (with circular indexing) in its probability mapping.
	///
	/// A stream of exactly `order - 1` tokens degenerates to a single
	/// truncated window, which still wraps onto itself; an empty stream
	/// with order 1 is a no-op.
	///
	/// # Errors
	/// Returns `MarkovError::InvalidArgument` if the stream holds fewer
	/// than `order - 1` tokens.
	pub fn add<I>(&mut self, source: I) -> Result<(), MarkovError>
	where
		I: IntoIterator<Item = T>,
	{
		let tokens: Vec<T> = source.into_iter().collect();
		if tokens.len() + 1 < self.order {
			return Err(MarkovError::InvalidArgument(format!(
				"the stream must hold at least {} tokens for an order {} chain, got {}",
				self.order - 1,
				self.order,
				tokens.len()
			)));
		}

		let mut windows: Vec<Vec<T>> = if tokens.len() < self.order {
			if tokens.is_empty() {
				// Order 1 with nothing to ingest
				return Ok(());
			}
			vec![tokens]
		} else {
			windowed(tokens, self.order)?.collect()
		};

		// Imagine the input stream as circular: synthesize the windows
		// that cross the end back into the head
		for i in 1..self.order {
			let last = &windows[windows.len() - 1];
			let mut window: Vec<T> = last.iter().skip(1).cloned().collect();
			window.push(windows[0][i - 1].clone());
			windows.push(window);
		}

		let count = windows.len();
		for i in 0..count {
			let following = windows[(i + 1) % count]
				.last()
				.cloned()
				.ok_or_else(|| {
					MarkovError::EmptyState("windows are never empty".to_owned())
				})?;
			let key = TokenSequence::new(windows[i].clone());
			self.matrix
				.entry(key)
				.or_insert_with(ProbabilityMapping::new)
				.add_one(following);
		}
		debug!("ingested {} windows, matrix now holds {} keys", count, self.matrix.len());
		Ok(())
	}

	/// Merges the specified Markov chains into a new chain, weighting the
	/// contribution of each.
	///
	/// For each key present in any input and each following-token weight
	/// under that key, the merged weight is the sum over all chains of
	/// `weight[c] * chain[c].matrix[key][token]`. The inputs are read
	/// without being mutated.
	///
	/// # Errors
	/// Returns `MarkovError::InvalidArgument` if no chain is given, if the
	/// chain and weight counts differ, or if the chains do not all share
	/// the same order.
	pub fn merge(chains: &[Self], weights: &[u64]) -> Result<Self, MarkovError> {
		let Some(first) = chains.first() else {
			return Err(MarkovError::InvalidArgument(
				"at least one chain must be merged".to_owned(),
			));
		};
		if chains.len() != weights.len() {
			return Err(MarkovError::InvalidArgument(
				"the length of the input arguments must match".to_owned(),
			));
		}
		let order = first.order;
		if chains.iter().any(|chain| chain.order != order) {
			return Err(MarkovError::InvalidArgument(
				"all markov chains must be of the same order".to_owned(),
			));
		}

		let mut matrix: IndexMap<TokenSequence<T>, ProbabilityMapping<T>> = IndexMap::new();
		for (chain, weight) in chains.iter().zip(weights) {
			for (key, mapping) in &chain.matrix {
				let merged = matrix
					.entry(key.clone())
					.or_insert_with(ProbabilityMapping::new);
				for (token, count) in mapping.iter() {
					let previous = merged.get_or_default(token, 0);
					merged.set(token.clone(), previous + count * weight);
				}
			}
		}
		debug!("merged {} chains of order {} into {} keys", chains.len(), order, matrix.len());
		Ok(Self { order, matrix })
	}

	/// Merges the specified Markov chains, all equally weighted.
	///
	/// # Errors
	/// Same conditions as [`MarkovChain::merge`].
	pub fn merge_uniform(chains: &[Self]) -> Result<Self, MarkovError> {
		Self::merge(chains, &vec![1; chains.len()])
	}

	/// Returns an unbounded lazy walk through the transition matrix,
	/// starting from a key picked uniformly at random among the existing
	/// matrix keys (uniform over keys, not weighted by usage).
	///
	/// # Errors
	/// Returns `MarkovError::EmptyState` if the matrix is empty.
	pub fn stream<'a, R: RandomSource>(
		&'a self,
		rng: &'a mut R,
	) -> Result<Walk<'a, T, R>, MarkovError> {
		let start = self.random_key(rng)?;
		Ok(self.stream_from(start, rng))
	}

	/// Returns an unbounded lazy walk through the transition matrix,
	/// starting from the specified sequence.
	///
	/// The walk first emits the tokens of the starting sequence, then
	/// repeatedly weighted-picks the next token from the current key's
	/// mapping, emits it, and advances the key by shifting in the picked
	/// token. Reaching a key absent from the matrix yields an
	/// `Err(MarkovError::EmptyState)` item, after which the walk fuses;
	/// this can happen whenever an externally supplied start leads
	/// outside the trained matrix.
	pub fn stream_from<'a, R: RandomSource>(
		&'a self,
		start: TokenSequence<T>,
		rng: &'a mut R,
	) -> Walk<'a, T, R> {
		Walk {
			chain: self,
			rng,
			head: VecDeque::from(start.tokens()),
			current: start,
			failed: false,
		}
	}

	/// Returns the next token, randomly picked from the mapping of the
	/// specified sequence.
	///
	/// # Errors
	/// Returns `MarkovError::EmptyState` if the sequence has no matrix
	/// entry or its mapping is empty.
	pub fn next_token<R: RandomSource>(
		&self,
		current: &TokenSequence<T>,
		rng: &mut R,
	) -> Result<T, MarkovError> {
		let mapping = self.matrix.get(current).ok_or_else(|| {
			MarkovError::EmptyState(
				"the current sequence has no entry in the transition matrix".to_owned(),
			)
		})?;
		Ok(mapping.next_randomly(rng)?.clone())
	}

	/// Returns a copy of the internal representation. Changes in the copy
	/// will not reflect in the original, and vice versa.
	pub fn snapshot(&self) -> IndexMap<TokenSequence<T>, ProbabilityMapping<T>> {
		self.matrix.clone()
	}

	fn random_key<R: RandomSource>(&self, rng: &mut R) -> Result<TokenSequence<T>, MarkovError> {
		if self.matrix.is_empty() {
			return Err(MarkovError::EmptyState(
				"the transition matrix is empty".to_owned(),
			));
		}
		let index = rng.next_below(self.matrix.len() as i64)? as usize;
		self.matrix
			.get_index(index)
			.map(|(key, _)| key.clone())
			.ok_or_else(|| {
				MarkovError::EmptyState("the transition matrix is empty".to_owned())
			})
	}
}

/// Infinite, lazy, non-restartable walk through a chain's transition
/// matrix.
///
/// Construct with [`MarkovChain::stream`] or [`MarkovChain::stream_from`].
/// Each element is computed on demand from the caller's consumption rate;
/// dropping the iterator is the only cancellation needed. After an
/// `Err` item the walk is fused and yields `None` forever.
#[derive(Debug)]
pub struct Walk<'a, T: Eq + Hash, R: RandomSource> {
	chain: &'a MarkovChain<T>,
	rng: &'a mut R,
	head: VecDeque<T>,
	current: TokenSequence<T>,
	failed: bool,
}

impl<'a, T: Clone + Eq + Hash, R: RandomSource> Iterator for Walk<'a, T, R> {
	type Item = Result<T, MarkovError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}
		if let Some(token) = self.head.pop_front() {
			return Some(Ok(token));
		}
		match self.chain.next_token(&self.current, self.rng) {
			Ok(next) => {
				self.current = self.current.shift(next.clone());
				Some(Ok(next))
			}
			Err(error) => {
				self.failed = true;
				Some(Err(error))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::SeededRandom;

	fn collect_walk<T: Clone + Eq + Hash, R: RandomSource>(
		walk: Walk<'_, T, R>,
		count: usize,
	) -> Vec<T> {
		walk.take(count)
			.collect::<Result<Vec<T>, MarkovError>>()
			.expect("the walk should not leave the trained matrix")
	}

	#[test]
	fn order_zero_is_rejected() {
		assert!(matches!(
			MarkovChain::<i32>::new(0),
			Err(MarkovError::InvalidArgument(_))
		));
	}

	#[test]
	fn order_is_exposed() {
		for order in 1..=10 {
			assert_eq!(MarkovChain::<i32>::new(order).unwrap().order(), order);
		}
	}

	#[test]
	fn circular_walk_reproduces_the_corpus() {
		// Distinct tokens give every key a single successor, so the walk
		// must replay the corpus as if it were circular
		let mut rng = SeededRandom::new(42);
		for order in 1..=10 {
			let mut chain = MarkovChain::new(order).unwrap();
			chain.add(0..100).unwrap();

			let start = TokenSequence::new((0..order as i32).collect::<Vec<i32>>());
			let actual = collect_walk(chain.stream_from(start, &mut rng), 200);
			let expected: Vec<i32> = (0..100).chain(0..100).collect();
			assert_eq!(actual, expected);
		}
	}

	#[test]
	fn single_token_stream_generates_a_constant() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add([1]).unwrap();
		let mut rng = SeededRandom::new(42);
		let actual = collect_walk(chain.stream(&mut rng).unwrap(), 50);
		assert_eq!(actual, vec![1; 50]);
	}

	#[test]
	fn stream_too_short_for_the_order_is_rejected() {
		let mut chain = MarkovChain::<i32>::new(3).unwrap();
		assert!(matches!(
			chain.add([1]),
			Err(MarkovError::InvalidArgument(_))
		));
		let mut chain = MarkovChain::<i32>::new(2).unwrap();
		assert!(matches!(
			chain.add([]),
			Err(MarkovError::InvalidArgument(_))
		));
	}

	#[test]
	fn empty_stream_with_order_one_is_a_no_op() {
		let mut chain = MarkovChain::<i32>::new(1).unwrap();
		chain.add([]).unwrap();
		assert!(chain.snapshot().is_empty());
	}

	#[test]
	fn matrix_records_circular_transitions() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add([1, 2, 3]).unwrap();
		let matrix = chain.snapshot();

		// Windows [1,2] [2,3] plus the wraparound [3,1]
		assert_eq!(matrix.len(), 3);
		let mapping = &matrix[&TokenSequence::new(vec![1, 2])];
		assert_eq!(mapping.get(&3), Some(1));
		let mapping = &matrix[&TokenSequence::new(vec![2, 3])];
		assert_eq!(mapping.get(&1), Some(1));
		let mapping = &matrix[&TokenSequence::new(vec![3, 1])];
		assert_eq!(mapping.get(&2), Some(1));
	}

	#[test]
	fn repeated_add_accumulates_weights() {
		let mut chain = MarkovChain::new(1).unwrap();
		chain.add([5, 5, 5]).unwrap();
		let matrix = chain.snapshot();
		assert_eq!(matrix.len(), 1);
		assert_eq!(matrix[&TokenSequence::new(vec![5])].get(&5), Some(3));
	}

	#[test]
	fn stream_on_empty_matrix_fails() {
		let chain = MarkovChain::<i32>::new(2).unwrap();
		let mut rng = SeededRandom::new(42);
		assert!(matches!(
			chain.stream(&mut rng).err(),
			Some(MarkovError::EmptyState(_))
		));
	}

	#[test]
	fn walk_from_an_untrained_key_fails_then_fuses() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add([1, 2, 3]).unwrap();
		let mut rng = SeededRandom::new(42);
		let start = TokenSequence::new(vec![8, 9]);
		let mut walk = chain.stream_from(start, &mut rng);

		// The supplied start tokens are emitted as-is
		assert_eq!(walk.next(), Some(Ok(8)));
		assert_eq!(walk.next(), Some(Ok(9)));
		assert!(matches!(walk.next(), Some(Err(MarkovError::EmptyState(_)))));
		assert_eq!(walk.next(), None);
	}

	#[test]
	fn next_token_follows_the_matrix() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add([1, 2, 3]).unwrap();
		let mut rng = SeededRandom::new(42);
		let next = chain
			.next_token(&TokenSequence::new(vec![1, 2]), &mut rng)
			.unwrap();
		assert_eq!(next, 3);
	}

	#[test]
	fn merge_of_parts_matches_one_chain_fed_all_parts() {
		for order in 1..=10 {
			let mut whole = MarkovChain::new(order).unwrap();
			whole.add(0..40).unwrap();
			whole.add(40..80).unwrap();
			whole.add(80..120).unwrap();

			let parts: Vec<MarkovChain<i32>> = [0..40, 40..80, 80..120]
				.into_iter()
				.map(|part| {
					let mut chain = MarkovChain::new(order).unwrap();
					chain.add(part).unwrap();
					chain
				})
				.collect();
			let merged = MarkovChain::merge_uniform(&parts).unwrap();

			assert_eq!(merged.order(), order);
			let expected = whole.snapshot();
			let actual = merged.snapshot();
			assert_eq!(expected.len(), actual.len());
			for (key, mapping) in &expected {
				assert_eq!(Some(mapping), actual.get(key));
			}
		}
	}

	#[test]
	fn merge_applies_relative_weights() {
		let mut left = MarkovChain::new(1).unwrap();
		left.add([1, 1, 2]).unwrap();
		let mut right = MarkovChain::new(1).unwrap();
		right.add([2, 2]).unwrap();

		let merged = MarkovChain::merge(&[left, right], &[2, 3]).unwrap();
		let matrix = merged.snapshot();

		// left: [1] -> {1:1, 2:1}, [2] -> {1:1}; right: [2] -> {2:2}
		let mapping = &matrix[&TokenSequence::new(vec![1])];
		assert_eq!(mapping.get(&1), Some(2));
		assert_eq!(mapping.get(&2), Some(2));
		let mapping = &matrix[&TokenSequence::new(vec![2])];
		assert_eq!(mapping.get(&1), Some(2));
		assert_eq!(mapping.get(&2), Some(6));
	}

	#[test]
	fn merge_does_not_mutate_its_inputs() {
		let mut left = MarkovChain::new(2).unwrap();
		left.add([1, 2, 3]).unwrap();
		let mut right = MarkovChain::new(2).unwrap();
		right.add([3, 2, 1]).unwrap();
		let before_left = left.snapshot();
		let before_right = right.snapshot();

		MarkovChain::merge_uniform(&[left.clone(), right.clone()]).unwrap();

		assert_eq!(left.snapshot(), before_left);
		assert_eq!(right.snapshot(), before_right);
	}

	#[test]
	fn merge_with_no_chains_is_rejected() {
		assert!(matches!(
			MarkovChain::<i32>::merge(&[], &[]),
			Err(MarkovError::InvalidArgument(_))
		));
		assert!(matches!(
			MarkovChain::<i32>::merge_uniform(&[]),
			Err(MarkovError::InvalidArgument(_))
		));
	}

	#[test]
	fn merge_with_mismatched_lengths_is_rejected() {
		let chain = MarkovChain::<i32>::new(2).unwrap();
		assert!(matches!(
			MarkovChain::merge(&[chain], &[1, 2]),
			Err(MarkovError::InvalidArgument(_))
		));
	}

	#[test]
	fn merge_with_mismatched_orders_is_rejected() {
		let first = MarkovChain::<i32>::new(2).unwrap();
		let second = MarkovChain::<i32>::new(3).unwrap();
		assert!(matches!(
			MarkovChain::merge_uniform(&[first, second]),
			Err(MarkovError::InvalidArgument(_))
		));
	}

	#[test]
	fn snapshot_is_an_independent_copy() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add([1, 2, 3]).unwrap();
		let mut snapshot = chain.snapshot();
		let key = TokenSequence::new(vec![1, 2]);
		snapshot.get_mut(&key).unwrap().add(99, 10);
		assert_eq!(chain.snapshot()[&key].get(&99), None);
	}

	#[test]
	fn seeded_walks_replay_identically() {
		let mut chain = MarkovChain::new(2).unwrap();
		chain.add("the quick brown fox jumps over the lazy dog the end".split(' ')).unwrap();

		let mut first = SeededRandom::new(1337);
		let mut second = SeededRandom::new(1337);
		let left = collect_walk(chain.stream(&mut first).unwrap(), 100);
		let right = collect_walk(chain.stream(&mut second).unwrap(), 100);
		assert_eq!(left, right);
	}
}
