//! Order-N Markov chain library over generic token types.
//!
//! This crate builds a frequency-weighted transition matrix from any
//! sequence of equatable, hashable tokens and generates new sequences by
//! a seed-reproducible weighted random walk:
//! - Circular sliding-window ingestion (`chain`)
//! - Weighted chain merging with per-chain emphasis
//! - Deterministic, replayable random sources (`random`)
//!
//! Tokens are opaque to the library: words, symbols or any
//! `Clone + Eq + Hash` value work the same way. Corpus loading and matrix
//! export are left to the caller, which only needs to supply a token
//! iterator and consume the generated stream or the matrix snapshot.

/// Transition matrix, probability mappings, matrix keys and windowing.
pub mod chain;

/// Error kinds shared across the crate.
pub mod error;

/// Random sources driving the weighted walk.
///
/// `SeededRandom` replays bit-exactly for a given seed; `DefaultRandom`
/// draws thread-local entropy for production use.
pub mod random;
