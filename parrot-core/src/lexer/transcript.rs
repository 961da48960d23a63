use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread;

use super::buffer::{BufferFault, IO_SIZE, RUNE_ERROR, RuneBuffer};
use super::error::{LexError, validate_nick};
use super::token::Token;

/// States of the transcript scanner.
///
/// Each state consumes a bounded lookahead and names its successor; the
/// terminal state is implicit (no successor) and is reached on
/// end-of-stream or on the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Start of a line: `HH:MM:SS` then dispatch on what follows.
	Date,
	/// Discard through the next newline.
	IgnoredLine,
	/// `* nick ...` emote line. Not modeled, skipped like any other line.
	Action,
	/// Speaker name between `<` and `>`.
	Nick,
	/// Message body of the target speaker, emitted word by word.
	Message,
}

/// A streaming scanner over an IRC-style transcript that emits the words
/// of one designated speaker as a token stream.
///
/// Lines look like `HH:MM:SS <nick> message body`; server notices
/// (timestamp then two spaces, or a `!`), emote lines (`*`) and other
/// speakers' lines are skipped. Words of the target speaker are emitted
/// individually, each of their lines is closed with
/// [`Token::EndOfLine`], and the stream finishes with exactly one
/// terminal token: [`Token::EndOfStream`] on a clean end, or a single
/// location-tagged [`Token::Error`] after which nothing else is emitted.
///
/// # Notes
/// - Line numbers are 1-based; columns are 0-based byte offsets from the
///   start of the line.
/// - The scanner runs to completion on its own thread, see
///   [`spawn`](Self::spawn).
pub struct TranscriptLexer<R: Read> {
	nick: String,
	/// Shown in error locations; the file path when opened from disk.
	origin: String,
	buf: RuneBuffer<R>,
	line: u64,
	/// Absolute byte offset of the current line's first byte.
	line_start: u64,
}

impl TranscriptLexer<File> {
	/// Opens a transcript file for lexing.
	///
	/// # Errors
	/// Rejects an empty or space-containing nick before touching the
	/// file; fails if the file cannot be opened.
	pub fn open<P: AsRef<Path>>(path: P, nick: &str) -> Result<Self, LexError> {
		validate_nick(nick)?;
		let path = path.as_ref();
		let file = File::open(path).map_err(|source| LexError::Open {
			path: path.display().to_string(),
			source,
		})?;
		Ok(Self::with_reader(file, &path.display().to_string(), nick))
	}
}

impl<R: Read> TranscriptLexer<R> {
	/// Wraps an arbitrary byte source. `origin` is the name used in
	/// error locations.
	///
	/// # Errors
	/// Rejects an empty or space-containing nick.
	pub fn from_reader(rd: R, origin: &str, nick: &str) -> Result<Self, LexError> {
		validate_nick(nick)?;
		Ok(Self::with_reader(rd, origin, nick))
	}

	fn with_reader(rd: R, origin: &str, nick: &str) -> Self {
		Self {
			nick: nick.to_owned(),
			origin: origin.to_owned(),
			buf: RuneBuffer::new(rd, IO_SIZE),
			line: 1,
			line_start: 0,
		}
	}

	/// Runs the scanner to completion, producing tokens on `tx`.
	///
	/// Returns when a terminal token has been sent or when the receiver
	/// hangs up.
	pub fn run(mut self, tx: SyncSender<Token>) {
		let mut state = State::Date;
		loop {
			let next = match state {
				State::Date => self.lex_date(&tx),
				State::IgnoredLine => self.lex_ignored(&tx),
				State::Action => self.lex_action(&tx),
				State::Nick => self.lex_nick(&tx),
				State::Message => self.lex_message(&tx),
			};
			match next {
				Some(s) => state = s,
				None => break,
			}
		}
	}

	/// Starts the scanner on its own thread and returns the receiving
	/// end of a rendezvous channel.
	///
	/// The channel is unbuffered: producing a token blocks until the
	/// consumer takes it, so at most one token is ever in flight and the
	/// scanner advances in lockstep with its consumer. The channel
	/// closes when the scanner finishes.
	pub fn spawn(self) -> Receiver<Token>
	where
		R: Send + 'static,
	{
		let (tx, rx) = sync_channel(0);
		thread::spawn(move || self.run(tx));
		rx
	}

	fn lex_date(&mut self, tx: &SyncSender<Token>) -> Option<State> {
		for i in 0..3 {
			let n = self.buf.accept_while(|r| r.is_ascii_digit());
			if n != 2 {
				let got = self.buf.peek();
				let msg = format!("invalid date format, got {got:?} expected digit");
				if i == 0 && n == 0 {
					// Nothing of this line was consumed yet; a
					// transcript may legitimately end exactly here.
					return self.finish_or_fail(tx, msg);
				}
				return self.fail(tx, msg);
			}
			if i != 2 {
				let r = self.buf.next();
				if r != ':' {
					return self.fail(tx, format!("invalid date format, got {r:?} expected ':'"));
				}
			}
			self.buf.discard_pending();
		}

		let r = self.buf.next();
		if r.is_whitespace() {
			let r2 = self.buf.peek();
			if r2.is_whitespace() {
				return Some(State::IgnoredLine);
			}
			if r2 == '*' {
				return Some(State::Action);
			}
			if r2 == '<' {
				self.buf.next();
				return Some(State::Nick);
			}
			return self.fail(tx, format!("invalid char, got {r2:?} expected '<', '*' or space"));
		}
		match r {
			'<' => Some(State::Nick),
			'!' => Some(State::IgnoredLine),
			_ => self.fail(tx, format!("invalid char, got {r:?} expected '<' or space")),
		}
	}

	fn lex_ignored(&mut self, tx: &SyncSender<Token>) -> Option<State> {
		self.buf.ignore_while(|r| r != '\n');
		let r = self.buf.next();
		if r == RUNE_ERROR && self.buf.failed() {
			// End-of-stream after a skipped line is a clean end.
			return self.finish_or_fail(tx, "invalid rune".to_owned());
		}
		self.buf.discard_pending();
		self.newline();
		Some(State::Date)
	}

	fn lex_action(&mut self, tx: &SyncSender<Token>) -> Option<State> {
		// Emote lines carry no attributable words. TODO: feed
		// third-person emotes into the corpus once the format for
		// attributing them is settled.
		self.lex_ignored(tx)
	}

	fn lex_nick(&mut self, tx: &SyncSender<Token>) -> Option<State> {
		// Drop the '<'.
		self.buf.discard_pending();

		let n = self
			.buf
			.accept_while(|r| r.is_alphanumeric() || matches!(r, '-' | '_' | '`' | '^'));
		if self.buf.failed() {
			return self.fail(tx, "invalid nick".to_owned());
		}
		let nick = self.buf.take_pending();
		if n < 1 {
			return self.fail(tx, "invalid nick, too short".to_owned());
		}

		let r = self.buf.next();
		if r != '>' {
			return self.fail(tx, format!("invalid nick, got {r:?} expected '>'"));
		}
		// Drop the '>'.
		self.buf.discard_pending();

		if nick == self.nick.as_bytes() {
			Some(State::Message)
		} else {
			Some(State::IgnoredLine)
		}
	}

	fn lex_message(&mut self, tx: &SyncSender<Token>) -> Option<State> {
		loop {
			self.buf.ignore_while(|r| r.is_whitespace() && r != '\n');

			let n = self
				.buf
				.accept_while(|r| r != RUNE_ERROR && !r.is_whitespace());
			if n > 0 {
				let word = self.buf.take_pending();
				if !self.emit(tx, Token::Word(word)) {
					return None;
				}
			}

			let r = self.buf.peek();
			if r == '\n' {
				if !self.emit(tx, Token::EndOfLine) {
					return None;
				}
				self.buf.next();
				self.buf.discard_pending();
				self.newline();
				return Some(State::Date);
			}
			if r == RUNE_ERROR {
				// A message read loop may legitimately end with the
				// stream; anything else is reported.
				return self.finish_or_fail(tx, "invalid rune in message".to_owned());
			}
		}
	}

	fn newline(&mut self) {
		self.line += 1;
		self.line_start = self.buf.offset();
	}

	fn column(&self) -> u64 {
		self.buf.offset() - self.line_start
	}

	fn emit(&self, tx: &SyncSender<Token>, token: Token) -> bool {
		tx.send(token).is_ok()
	}

	/// Emits a single location-tagged error token and stops the state
	/// machine. When the buffer has recorded a terminal condition, its
	/// description replaces `msg`.
	fn fail(&self, tx: &SyncSender<Token>, msg: String) -> Option<State> {
		let msg = match self.buf.fault() {
			None => msg,
			Some(fault) => fault.message(),
		};
		let _ = tx.send(Token::Error(self.locate(&msg)));
		None
	}

	/// Like [`fail`](Self::fail), but a drained source is legitimate at
	/// this point and emits a clean [`Token::EndOfStream`] instead.
	fn finish_or_fail(&self, tx: &SyncSender<Token>, msg: String) -> Option<State> {
		match self.buf.fault() {
			Some(BufferFault::Eof) => {
				let _ = tx.send(Token::EndOfStream);
				None
			}
			Some(fault) => {
				let _ = tx.send(Token::Error(self.locate(&fault.message())));
				None
			}
			None => {
				let _ = tx.send(Token::Error(self.locate(&msg)));
				None
			}
		}
	}

	fn locate(&self, msg: &str) -> String {
		format!("{msg} at {}:{}:{}", self.origin, self.line, self.column())
	}
}
