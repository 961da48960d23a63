//! Markov model over a persistent prefix→continuation corpus.
//!
//! This module owns everything past the token stream:
//! - An ordered, postcard-persisted byte store (`store`)
//! - The sliding prefix window (`prefix`)
//! - The chain itself: corpus building and random-walk generation
//!   (`chain`)

/// The Markov chain: create-or-open, corpus building, generation.
pub mod chain;

/// Ordered key-value store holding one corpus, snapshotted to disk.
pub mod store;

/// Build and store error taxonomy.
pub mod error;

/// Sliding window of the last N words.
///
/// Not exposed
mod prefix;

pub use chain::MarkovChain;
pub use error::{ChainError, StoreError};
pub use store::CorpusStore;
