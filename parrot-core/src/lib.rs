//! Chat-transcript Markov text generation library.
//!
//! This crate learns the speaking style of one chat participant and
//! produces plausible-looking lines in that style:
//! - A streaming lexer parses loosely-structured IRC-style logs into a
//!   typed token stream, tolerating malformed input and reporting
//!   precise error locations
//! - A corpus builder consumes that stream into a persistent
//!   prefix→continuation store
//! - A Markov generator performs bounded weighted random walks over the
//!   store to synthesize text
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Transcript lexing: rune buffer, scanner state machine, token stream.
///
/// This module exposes the scanner and its token type while keeping the
/// byte-window internals private.
pub mod lexer;

/// Markov model: corpus store, prefix window, chain building and
/// generation.
pub mod model;
