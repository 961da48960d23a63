use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Ordered byte-key → byte-value store backing one corpus.
///
/// Keys compare byte-lexicographically. The map lives in memory and is
/// snapshotted to its backing file with postcard on
/// [`flush`](Self::flush); nothing touches the disk between flushes, so
/// an abandoned build leaves no partial state behind. The store needs
/// only point lookups and a read-modify-write upsert; it has no range
/// scans, multi-key transactions or secondary indices.
///
/// # Invariants
/// - One writer during a build, one reader afterwards; the two phases
///   are sequenced by the caller.
/// - Values only ever grow; entries are never removed.
#[derive(Debug)]
pub struct CorpusStore {
	path: PathBuf,
	entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// On-disk form of a store; the borrowed twin exists so a flush does not
/// have to clone the whole map.
#[derive(Deserialize)]
struct Snapshot {
	entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
	entries: &'a BTreeMap<Vec<u8>, Vec<u8>>,
}

impl CorpusStore {
	/// Creates an empty store that will persist to `path`.
	///
	/// # Errors
	/// Refuses to shadow an existing file; opening and re-training are
	/// distinct operations and clobbering a trained corpus by accident
	/// must not be possible.
	pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
		let path = path.as_ref();
		if path.exists() {
			return Err(StoreError::AlreadyExists(path.display().to_string()));
		}
		log::debug!("creating corpus store {}", path.display());
		Ok(Self { path: path.to_owned(), entries: BTreeMap::new() })
	}

	/// Opens a store from its backing file.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
		let path = path.as_ref();
		let bytes = fs::read(path).map_err(|source| StoreError::Io {
			op: "read",
			path: path.display().to_string(),
			source,
		})?;
		let snapshot: Snapshot =
			postcard::from_bytes(&bytes).map_err(|source| StoreError::Corrupt {
				path: path.display().to_string(),
				source,
			})?;
		log::debug!(
			"opened corpus store {} with {} entries",
			path.display(),
			snapshot.entries.len()
		);
		Ok(Self { path: path.to_owned(), entries: snapshot.entries })
	}

	/// Point lookup. `None` means "never recorded", which is not an
	/// error.
	pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
		self.entries.get(key).map(Vec::as_slice)
	}

	/// Point write, replacing any previous value.
	pub fn put(&mut self, key: &[u8], value: Vec<u8>) {
		self.entries.insert(key.to_vec(), value);
	}

	/// Atomic read-modify-write: `f` receives the current value (or
	/// `None`) and returns the replacement. Expressed as one operation
	/// so a future shared backend cannot lose updates between a get and
	/// a put.
	pub fn upsert<F>(&mut self, key: &[u8], f: F)
	where
		F: FnOnce(Option<&[u8]>) -> Vec<u8>,
	{
		let value = f(self.entries.get(key).map(Vec::as_slice));
		self.entries.insert(key.to_vec(), value);
	}

	/// Number of stored keys.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Writes the snapshot to the backing file.
	pub fn flush(&self) -> Result<(), StoreError> {
		let bytes = postcard::to_stdvec(&SnapshotRef { entries: &self.entries }).map_err(
			|source| StoreError::Corrupt {
				path: self.path.display().to_string(),
				source,
			},
		)?;
		fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
			op: "write",
			path: self.path.display().to_string(),
			source,
		})?;
		log::debug!(
			"flushed corpus store {} with {} entries",
			self.path.display(),
			self.entries.len()
		);
		Ok(())
	}

	/// Deletes the backing file, consuming the store. Used when an
	/// initial build fails so no half-populated corpus survives.
	pub fn discard(self) -> Result<(), StoreError> {
		if self.path.exists() {
			fs::remove_file(&self.path).map_err(|source| StoreError::Io {
				op: "remove",
				path: self.path.display().to_string(),
				source,
			})?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn temp_path(name: &str) -> PathBuf {
		std::env::temp_dir().join(format!("parrot-store-{}-{name}.db", std::process::id()))
	}

	#[test]
	fn test_create_put_flush_open_round_trip() {
		let path = temp_path("round-trip");
		let _ = fs::remove_file(&path);

		let mut store = CorpusStore::create(&path).expect("fresh path");
		store.put(b"key a", b"one two".to_vec());
		store.put(b"key b", b"three".to_vec());
		store.flush().expect("flush succeeds");

		let reopened = CorpusStore::open(&path).expect("snapshot decodes");
		assert_eq!(reopened.len(), 2);
		assert_eq!(reopened.get(b"key a"), Some(&b"one two"[..]));
		assert_eq!(reopened.get(b"key b"), Some(&b"three"[..]));
		assert_eq!(reopened.get(b"missing"), None);

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn test_upsert_reads_then_replaces() {
		let path = temp_path("upsert");
		let _ = fs::remove_file(&path);

		let mut store = CorpusStore::create(&path).expect("fresh path");
		store.upsert(b"k", |old| {
			assert_eq!(old, None);
			b"first".to_vec()
		});
		store.upsert(b"k", |old| {
			let mut v = old.expect("written above").to_vec();
			v.extend_from_slice(b" second");
			v
		});
		assert_eq!(store.get(b"k"), Some(&b"first second"[..]));
	}

	#[test]
	fn test_create_refuses_existing_file() {
		let path = temp_path("existing");
		fs::write(&path, b"taken").expect("seed file");

		let err = CorpusStore::create(&path).expect_err("must refuse");
		assert!(matches!(err, StoreError::AlreadyExists(_)));

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn test_open_missing_file_is_io_error() {
		let err = CorpusStore::open(temp_path("never-written")).expect_err("no file");
		assert!(matches!(err, StoreError::Io { op: "read", .. }));
	}

	#[test]
	fn test_open_garbage_is_corrupt() {
		let path = temp_path("garbage");
		// postcard length-prefixes the map; a huge varint count cannot
		// decode from a short file.
		fs::write(&path, [0xff, 0xff, 0xff, 0xff, 0xff]).expect("seed file");

		let err = CorpusStore::open(&path).expect_err("must not decode");
		assert!(matches!(err, StoreError::Corrupt { .. }));

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn test_discard_removes_backing_file() {
		let path = temp_path("discard");
		let _ = fs::remove_file(&path);

		let store = CorpusStore::create(&path).expect("fresh path");
		store.flush().expect("flush succeeds");
		assert!(path.exists());

		let store = CorpusStore::open(&path).expect("flushed store opens");
		store.discard().expect("discard succeeds");
		assert!(!path.exists());
	}

	#[test]
	fn test_keys_kept_in_byte_order() {
		let path = temp_path("ordered");
		let _ = fs::remove_file(&path);

		let mut store = CorpusStore::create(&path).expect("fresh path");
		store.put(b"b", b"2".to_vec());
		store.put(b"a", b"1".to_vec());
		store.put(b" leading space", b"0".to_vec());
		let keys: Vec<&[u8]> = store.entries.keys().map(Vec::as_slice).collect();
		assert_eq!(keys, vec![&b" leading space"[..], b"a", b"b"]);
	}
}
