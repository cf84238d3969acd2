use thiserror::Error;

/// Errors reported by the chain, the probability mapping and the random
/// sources.
///
/// All conditions are detected eagerly at the offending call and returned
/// synchronously. They represent contract violations rather than transient
/// faults, so nothing is retried internally.
///
/// Negative weights and absent collection arguments cannot be expressed
/// against this API (unsigned counts, reference parameters), so the
/// corresponding error classes do not exist at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkovError {
	/// A parameter is outside its documented domain: non-positive chain
	/// order or window size, an empty range query, mismatched merge inputs
	/// or a corpus too short to window.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// An operation needs state that is not there: a weighted pick on a
	/// mapping with total weight 0, or a walk whose current key has no
	/// matrix entry.
	#[error("empty state: {0}")]
	EmptyState(String),
}
