//! Transition model and generation walk.
//!
//! This module holds the statistical engine:
//! - The transition matrix and its random walk (`MarkovChain`, `Walk`)
//! - Weighted next-token distributions (`ProbabilityMapping`)
//! - The fixed-length matrix key (`TokenSequence`)
//! - The sliding-window producer feeding ingestion (`windowed`)

/// Order-N transition matrix built from token streams, with circular
/// wraparound ingestion, weighted chain merging and the infinite
/// generation walk.
pub mod markov_chain;

/// Weighted multiset of following tokens with insertion-ordered,
/// index-based random selection.
pub mod probability_mapping;

/// Immutable ordered token tuple used as matrix key.
///
/// Supports the drop-first/append-one `shift` that advances the walk.
pub mod token_sequence;

/// Lazy stride-1 sliding windows over an arbitrary token source.
pub mod windowed;
