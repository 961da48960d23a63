/// Fixed-length sliding window of the most recently seen words, used as
/// the lookup key of the corpus.
///
/// All slots start as zero-length words; advancing drops the oldest slot
/// and appends the newest, so the window length never changes. The store
/// key is the slots joined by a single space, which keeps keys ordered
/// consistently under byte-lexicographic comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prefix {
	words: Vec<Vec<u8>>,
}

impl Prefix {
	/// A window of `len` empty slots. `len` must be at least 1; the
	/// chain validates this before constructing one.
	pub(crate) fn new(len: usize) -> Self {
		Self { words: vec![Vec::new(); len] }
	}

	/// The store key for the current window.
	pub(crate) fn key(&self) -> Vec<u8> {
		self.words.join(&b' ')
	}

	/// Slides the window: drops the oldest word, appends `word`.
	pub(crate) fn advance(&mut self, word: Vec<u8>) {
		self.words.rotate_left(1);
		if let Some(last) = self.words.last_mut() {
			*last = word;
		}
	}

	/// Empties every slot, as at the start of a new transcript line.
	pub(crate) fn reset(&mut self) {
		for w in &mut self.words {
			w.clear();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_window_is_all_empty() {
		let p = Prefix::new(2);
		assert_eq!(p.key(), b" ".to_vec(), "two empty slots joined by one space");
	}

	#[test]
	fn test_advance_slides_the_window() {
		let mut p = Prefix::new(2);
		p.advance(b"hello".to_vec());
		assert_eq!(p.key(), b" hello".to_vec());
		p.advance(b"world".to_vec());
		assert_eq!(p.key(), b"hello world".to_vec());
		p.advance(b"again".to_vec());
		assert_eq!(p.key(), b"world again".to_vec());
	}

	#[test]
	fn test_reset_restores_initial_state() {
		let mut p = Prefix::new(3);
		p.advance(b"a".to_vec());
		p.advance(b"b".to_vec());
		p.reset();
		assert_eq!(p, Prefix::new(3));
	}

	#[test]
	fn test_single_slot_window() {
		let mut p = Prefix::new(1);
		assert_eq!(p.key(), b"".to_vec());
		p.advance(b"only".to_vec());
		assert_eq!(p.key(), b"only".to_vec());
	}
}
