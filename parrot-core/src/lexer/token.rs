/// One unit of the lexer's output stream.
///
/// Tokens are produced in strict order and consumed in that same order;
/// the producer never retains a token after emitting it. A stream always
/// finishes with exactly one terminal token, either `EndOfStream` or
/// `Error`, and nothing follows the terminal.
///
/// # Variants
/// - `Word`: one whitespace-delimited word of the target speaker, as raw
///   bytes (complete UTF-8 runes by construction).
/// - `EndOfLine`: the speaker's line ended; consumers reset any state
///   that must not span transcript lines.
/// - `EndOfStream`: clean end of the transcript.
/// - `Error`: malformed input or an I/O failure, with a human-readable
///   description and `path:line:column` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	Word(Vec<u8>),
	EndOfLine,
	EndOfStream,
	Error(String),
}
