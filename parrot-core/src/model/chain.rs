use std::path::Path;
use std::sync::mpsc::Receiver;

use rand::Rng;

use super::error::ChainError;
use super::prefix::Prefix;
use super::store::CorpusStore;
use crate::lexer::Token;

/// A trained Markov model for one speaker: a fixed prefix length paired
/// with a persistent ordered store mapping each prefix to everything
/// ever observed to follow it.
///
/// # Responsibilities
/// - Build the corpus from a token stream, one upsert per word
/// - Walk the corpus to synthesize text, one lookup per step
/// - Report corpus size
///
/// The continuation list of a prefix keeps duplicates on purpose: a word
/// recorded three times after a prefix is three times as likely to be
/// picked as one recorded once. Models never share a store.
#[derive(Debug)]
pub struct MarkovChain {
	prefix_len: usize,
	store: CorpusStore,
}

impl MarkovChain {
	/// Creates or opens a model.
	///
	/// With `create` set and no store at `path`, a fresh store is
	/// populated from the token stream returned by `supplier` and
	/// flushed to disk; on any failure the new store is discarded so no
	/// half-populated corpus survives. With an existing store (or
	/// `create` unset), the store is simply opened and `supplier` is
	/// never called.
	///
	/// # Errors
	/// - `InvalidPrefixLen` before anything else runs
	/// - whatever `supplier` fails with
	/// - `Corpus` when the token stream carries an error token
	/// - `Store` on any I/O failure, including the final flush
	pub fn create<P, F>(
		prefix_len: usize,
		path: P,
		create: bool,
		supplier: F,
	) -> Result<Self, ChainError>
	where
		P: AsRef<Path>,
		F: FnOnce() -> Result<Receiver<Token>, ChainError>,
	{
		if prefix_len == 0 {
			return Err(ChainError::InvalidPrefixLen(prefix_len));
		}
		let path = path.as_ref();

		if !create || path.exists() {
			let store = CorpusStore::open(path)?;
			return Ok(Self { prefix_len, store });
		}

		let store = CorpusStore::create(path)?;
		let mut chain = Self { prefix_len, store };

		let tokens = match supplier() {
			Ok(tokens) => tokens,
			Err(e) => {
				let _ = chain.store.discard();
				return Err(e);
			}
		};
		if let Err(e) = chain.populate(tokens) {
			let _ = chain.store.discard();
			return Err(e);
		}
		if let Err(e) = chain.store.flush() {
			let _ = chain.store.discard();
			return Err(e.into());
		}
		Ok(chain)
	}

	/// Consumes a token stream and records every word against the
	/// prefix window preceding it.
	///
	/// The window starts all-empty and is reset to all-empty on every
	/// `EndOfLine`, so prefixes never span transcript lines. An `Error`
	/// token aborts the build with its message; `EndOfStream` finishes
	/// it. A stream that hangs up without either is reported as
	/// truncated.
	fn populate(&mut self, tokens: Receiver<Token>) -> Result<(), ChainError> {
		let mut prefix = Prefix::new(self.prefix_len);
		let mut words: u64 = 0;

		loop {
			match tokens.recv() {
				Ok(Token::Word(word)) => {
					self.store
						.upsert(&prefix.key(), |old| append_continuation(old, &word));
					prefix.advance(word);
					words += 1;
				}
				Ok(Token::EndOfLine) => prefix.reset(),
				Ok(Token::Error(msg)) => return Err(ChainError::Corpus(msg)),
				Ok(Token::EndOfStream) => {
					log::info!(
						"corpus populated: {} prefixes from {words} words",
						self.store.len()
					);
					return Ok(());
				}
				Err(_) => return Err(ChainError::TruncatedStream),
			}
		}
	}

	/// Synthesizes up to `max_words` words, drawing from the process
	/// RNG.
	pub fn generate(&self, max_words: usize) -> Result<String, ChainError> {
		self.generate_with_rng(max_words, &mut rand::rng())
	}

	/// Synthesizes up to `max_words` words with a caller-supplied RNG,
	/// so a seeded generator reproduces identical output.
	///
	/// Starts from the all-empty prefix and walks the corpus: look up
	/// the continuation list of the current prefix, pick one entry
	/// uniformly at random, append it and slide the window. The walk
	/// stops early when the current prefix has no recorded
	/// continuation; exhausting the learned material is not an error.
	pub fn generate_with_rng<R>(&self, max_words: usize, rng: &mut R) -> Result<String, ChainError>
	where
		R: Rng + ?Sized,
	{
		let mut prefix = Prefix::new(self.prefix_len);
		let mut words: Vec<Vec<u8>> = Vec::new();

		for _ in 0..max_words {
			let Some(list) = self.store.get(&prefix.key()) else {
				break;
			};
			let choices: Vec<&[u8]> = list.split(|b| *b == b' ').collect();
			let word = choices[rng.random_range(0..choices.len())];
			if word.is_empty() {
				break;
			}
			words.push(word.to_vec());
			prefix.advance(word.to_vec());
		}

		Ok(String::from_utf8_lossy(&words.join(&b' ')).into_owned())
	}

	/// Number of distinct prefixes in the corpus.
	pub fn corpus_len(&self) -> usize {
		self.store.len()
	}

	pub fn prefix_len(&self) -> usize {
		self.prefix_len
	}
}

/// Appends `word` to a continuation list, space-separated. Duplicates
/// accumulate; they are the probability weights.
fn append_continuation(old: Option<&[u8]>, word: &[u8]) -> Vec<u8> {
	match old {
		Some(old) => {
			let mut list = Vec::with_capacity(old.len() + 1 + word.len());
			list.extend_from_slice(old);
			list.push(b' ');
			list.extend_from_slice(word);
			list
		}
		None => word.to_vec(),
	}
}
