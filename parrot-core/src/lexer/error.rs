//! Errors produced when setting up a transcript lexer.
//!
//! Parse-time anomalies are not errors at this level: the lexer converts
//! them into [`Token::Error`](super::Token::Error) values on its output
//! stream. `LexError` covers only what is rejected before any parsing
//! work begins.

use std::io;

use thiserror::Error;

/// Errors produced before lexing starts.
#[derive(Debug, Error)]
pub enum LexError {
	/// The target speaker identifier is unusable.
	#[error("nick is invalid because it {0}")]
	InvalidNick(String),

	/// The transcript file could not be opened.
	#[error("cannot open file {path} for lexing: {source}")]
	Open {
		path: String,
		#[source]
		source: io::Error,
	},
}

/// Rejects speaker identifiers that cannot match any transcript nick.
///
/// Only emptiness and embedded spaces are checked; it is not worth
/// parsing a whole transcript for a nick that can never appear.
pub(crate) fn validate_nick(nick: &str) -> Result<(), LexError> {
	if nick.is_empty() {
		return Err(LexError::InvalidNick("is empty".to_owned()));
	}
	if nick.contains(' ') {
		return Err(LexError::InvalidNick("contains invalid char ' '".to_owned()));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_nick_rejected() {
		let err = validate_nick("").unwrap_err();
		assert_eq!(err.to_string(), "nick is invalid because it is empty");
	}

	#[test]
	fn test_nick_with_space_rejected() {
		let err = validate_nick("al ice").unwrap_err();
		assert_eq!(
			err.to_string(),
			"nick is invalid because it contains invalid char ' '"
		);
	}

	#[test]
	fn test_plain_nick_accepted() {
		assert!(validate_nick("alice").is_ok());
	}
}
