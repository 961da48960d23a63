//! Streaming lexer for line-oriented chat transcripts.
//!
//! This module turns a raw byte stream into a typed token stream:
//! - A self-shifting rune buffer decodes UTF-8 on demand (`buffer`)
//! - A state-machine scanner walks the transcript format and emits the
//!   target speaker's words (`transcript`)
//! - Tokens and setup errors are the only public surface; the buffer
//!   stays internal

/// Token stream values exchanged between the lexer and its consumer.
pub mod token;

/// The transcript scanner: a finite-state machine that skips dates,
/// server notices and other speakers, and emits words, line ends and a
/// single terminal token.
pub mod transcript;

/// Setup-time errors and speaker-identifier validation.
pub mod error;

/// Self-shifting byte window with on-demand rune decoding.
///
/// Not exposed
mod buffer;

pub use error::LexError;
pub use token::Token;
pub use transcript::TranscriptLexer;
