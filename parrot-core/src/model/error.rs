//! Errors produced when building, opening or walking a corpus.

use std::io;

use thiserror::Error;

use crate::lexer::LexError;

/// Errors produced by the corpus store.
///
/// Every variant names the backing file and the operation that failed,
/// so a failure is attributable without further context.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The backing file could not be read or written.
	#[error("cannot {op} corpus store {path}: {source}")]
	Io {
		op: &'static str,
		path: String,
		#[source]
		source: io::Error,
	},

	/// The backing file exists but does not decode as a store snapshot.
	#[error("cannot decode corpus store {path}: {source}")]
	Corrupt {
		path: String,
		#[source]
		source: postcard::Error,
	},

	/// Refusing to create a store over an existing file.
	#[error("corpus store {0} already exists")]
	AlreadyExists(String),
}

/// Errors produced by a Markov chain.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The corpus store failed.
	#[error(transparent)]
	Store(#[from] StoreError),

	/// The token stream carried an error; the message already includes
	/// the input location.
	#[error("corpus build failed: {0}")]
	Corpus(String),

	/// The token stream hung up without a terminal token.
	#[error("token stream ended without a terminal token")]
	TruncatedStream,

	/// A chain needs at least one word of context.
	#[error("invalid prefix length {0}, must be at least 1")]
	InvalidPrefixLen(usize),

	/// The token-stream supplier could not start lexing.
	#[error(transparent)]
	Lex(#[from] LexError),
}
