use std::io::{ErrorKind, Read};

/// Rune returned by [`RuneBuffer::next`] when no rune could be decoded.
///
/// The buffer records the reason in its fault slot; callers distinguish
/// end-of-stream from bad input through [`RuneBuffer::fault`].
pub(crate) const RUNE_ERROR: char = '\u{FFFD}';

/// Widest possible UTF-8 encoding of a single rune.
const MAX_RUNE_LEN: usize = 4;

/// Default window size used by the lexer.
pub(crate) const IO_SIZE: usize = 4096;

/// Terminal condition of a [`RuneBuffer`], recorded on the first failed
/// decode and sticky from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BufferFault {
	/// The source is exhausted and the window is fully drained.
	Eof,
	/// The underlying reader returned an error.
	Read(String),
	/// Bytes remaining in the window do not decode as UTF-8.
	Encoding(String),
	/// A single pending token outgrew the window.
	TooLong,
}

impl BufferFault {
	/// Human-readable description, used verbatim in error tokens.
	pub(crate) fn message(&self) -> String {
		match self {
			BufferFault::Eof => "premature end of transcript".to_owned(),
			BufferFault::Read(e) => e.clone(),
			BufferFault::Encoding(e) => e.clone(),
			BufferFault::TooLong => "token is too long".to_owned(),
		}
	}
}

/// A resizable-cursor, self-shifting byte window over a streaming source
/// that decodes UTF-8 runes on demand.
///
/// # Responsibilities
/// - Pull bytes from the reader in fixed-size chunks into a reusable window
/// - Decode one rune per [`next`](Self::next) call, with one-rune
///   [`backup`](Self::backup) and non-consuming [`peek`](Self::peek)
/// - Track a "pending token" span whose bytes can be extracted as an owned
///   copy or discarded without copying
/// - Report absolute stream offsets so callers can derive line/column
///   positions
///
/// # Invariants
/// - `start <= cursor <= end <= buf.len()`
/// - Bytes in `start..cursor` are complete, already-decoded runes
/// - Once a fault is recorded it never changes; every later `next`
///   surfaces the same condition
///
/// Memory use is bounded by the window size regardless of input length:
/// when fewer unread bytes remain than the widest rune encoding, the
/// unread tail is shifted to the window start and the window is refilled,
/// so a decode never spans a refill boundary.
pub(crate) struct RuneBuffer<R: Read> {
	buf: Vec<u8>,
	rd: R,
	/// Start of the pending token.
	start: usize,
	/// One past the last filled byte.
	end: usize,
	/// Next byte to decode.
	cursor: usize,
	/// Byte length of the rune returned by the last `next`, 0 after a
	/// failed `next` or a `backup`.
	last_len: usize,
	/// Absolute stream offset of `start`.
	retired: u64,
	source_done: bool,
	read_error: Option<String>,
	fault: Option<BufferFault>,
	failed: bool,
}

impl<R: Read> RuneBuffer<R> {
	pub(crate) fn new(rd: R, size: usize) -> Self {
		Self {
			buf: vec![0; size.max(MAX_RUNE_LEN)],
			rd,
			start: 0,
			end: 0,
			cursor: 0,
			last_len: 0,
			retired: 0,
			source_done: false,
			read_error: None,
			fault: None,
			failed: false,
		}
	}

	/// Shifts the pending tail to the window start and reads from the
	/// source until at least one full rune worth of bytes is buffered or
	/// the source is exhausted.
	fn fill(&mut self) {
		if self.start > 0 {
			// A decode must see contiguous bytes, so reclaim the space
			// before the pending token.
			self.buf.copy_within(self.start..self.end, 0);
			self.end -= self.start;
			self.cursor -= self.start;
			self.start = 0;
		}

		while !self.source_done
			&& self.read_error.is_none()
			&& self.end < self.buf.len()
			&& self.end - self.cursor < MAX_RUNE_LEN
		{
			match self.rd.read(&mut self.buf[self.end..]) {
				Ok(0) => self.source_done = true,
				Ok(n) => self.end += n,
				Err(e) if e.kind() == ErrorKind::Interrupted => (),
				Err(e) => self.read_error = Some(e.to_string()),
			}
		}
	}

	/// Decodes and consumes the next rune.
	///
	/// On failure returns [`RUNE_ERROR`], records the fault (first one
	/// wins) and consumes nothing; the failure reason stays readable
	/// through [`fault`](Self::fault).
	pub(crate) fn next(&mut self) -> char {
		if self.end - self.cursor < MAX_RUNE_LEN {
			self.fill();
		}

		let tail = &self.buf[self.cursor..self.end];
		if tail.is_empty() {
			self.last_len = 0;
			self.failed = true;
			if self.fault.is_none() {
				self.fault = Some(match self.read_error.take() {
					Some(e) => BufferFault::Read(e),
					None if self.source_done => BufferFault::Eof,
					// The window is full of one pending token and
					// cannot take more bytes.
					None => BufferFault::TooLong,
				});
			}
			return RUNE_ERROR;
		}

		match first_rune(tail) {
			Some((r, len)) => {
				self.last_len = len;
				self.cursor += len;
				r
			}
			None => {
				self.last_len = 0;
				self.failed = true;
				if self.fault.is_none() {
					let shown = &tail[..tail.len().min(MAX_RUNE_LEN)];
					let hex: String = shown.iter().map(|b| format!("{b:02x}")).collect();
					self.fault = Some(BufferFault::Encoding(format!(
						"unable to decode rune '{hex}'"
					)));
				}
				RUNE_ERROR
			}
		}
	}

	/// Rewinds exactly one previously-read rune.
	///
	/// Calling it twice without an intervening successful `next` is a
	/// no-op, as is calling it after a failed `next`.
	pub(crate) fn backup(&mut self) {
		self.cursor -= self.last_len;
		self.last_len = 0;
	}

	/// `next` followed by `backup`; does not consume.
	pub(crate) fn peek(&mut self) -> char {
		let r = self.next();
		self.backup();
		r
	}

	/// Consumes runes while `test` holds and returns how many were
	/// consumed. The first failing rune is backed up, leaving the cursor
	/// just past the accepted run.
	pub(crate) fn accept_while(&mut self, mut test: impl FnMut(char) -> bool) -> usize {
		let mut n = 0;
		loop {
			let r = self.next();
			if (r == RUNE_ERROR && self.failed) || !test(r) {
				break;
			}
			n += 1;
		}
		self.backup();
		n
	}

	/// Like [`accept_while`](Self::accept_while) but discards each
	/// accepted rune immediately, advancing the pending-token start.
	pub(crate) fn ignore_while(&mut self, mut test: impl FnMut(char) -> bool) -> usize {
		let mut n = 0;
		loop {
			let r = self.next();
			if (r == RUNE_ERROR && self.failed) || !test(r) {
				break;
			}
			n += 1;
			self.discard_pending();
		}
		self.backup();
		n
	}

	/// Returns the pending token bytes as an owned copy and resets the
	/// pending start to the current position.
	pub(crate) fn take_pending(&mut self) -> Vec<u8> {
		let token = self.buf[self.start..self.cursor].to_vec();
		self.discard_pending();
		token
	}

	/// Drops the pending token bytes without copying them.
	pub(crate) fn discard_pending(&mut self) {
		self.retired += (self.cursor - self.start) as u64;
		self.start = self.cursor;
	}

	/// Absolute byte offset of the read cursor in the stream.
	pub(crate) fn offset(&self) -> u64 {
		self.retired + (self.cursor - self.start) as u64
	}

	/// True once a `next` has failed.
	pub(crate) fn failed(&self) -> bool {
		self.failed
	}

	/// The terminal condition, if a `next` has failed.
	pub(crate) fn fault(&self) -> Option<&BufferFault> {
		if self.failed { self.fault.as_ref() } else { None }
	}
}

/// Decodes the first rune of `bytes`, returning it with its encoded
/// length, or `None` if the leading bytes are not valid UTF-8.
fn first_rune(bytes: &[u8]) -> Option<(char, usize)> {
	let take = bytes.len().min(MAX_RUNE_LEN);
	let valid = match std::str::from_utf8(&bytes[..take]) {
		Ok(s) => s,
		Err(e) => {
			let n = e.valid_up_to();
			if n == 0 {
				return None;
			}
			// The first n bytes were just validated.
			match std::str::from_utf8(&bytes[..n]) {
				Ok(s) => s,
				Err(_) => return None,
			}
		}
	};
	valid.chars().next().map(|r| (r, r.len_utf8()))
}
