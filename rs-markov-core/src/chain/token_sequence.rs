use serde::{Deserialize, Serialize};

/// Ordered, immutable tuple of tokens used as a transition matrix key.
///
/// A sequence holds exactly `order` tokens when used by the chain (the
/// chain enforces the length, not this type). Equality and hash are
/// structural: two sequences are equal iff all tokens are equal in order.
///
/// # Responsibilities
/// - Carry the window of tokens identifying a matrix row
/// - Advance the generation walk via `shift` (drop-first, append-one)
/// - Hand out independent copies of its tokens
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenSequence<T> {
	tokens: Vec<T>,
}

impl<T> TokenSequence<T> {
	/// Creates a new sequence owning the given tokens.
	pub fn new(tokens: impl Into<Vec<T>>) -> Self {
		Self { tokens: tokens.into() }
	}

	/// Returns the number of tokens in the sequence.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

impl<T: Clone> TokenSequence<T> {
	/// Returns a new sequence with the first token dropped and `next`
	/// appended to the tail.
	///
	/// Pure function: the receiver is never mutated.
	pub fn shift(&self, next: T) -> Self {
		let tokens = self
			.tokens
			.iter()
			.skip(1)
			.cloned()
			.chain(std::iter::once(next))
			.collect();
		Self { tokens }
	}

	/// Returns an independent copy of the ordered tokens.
	///
	/// Changes in the copy will not reflect in the sequence, and vice
	/// versa.
	pub fn tokens(&self) -> Vec<T> {
		self.tokens.clone()
	}
}
