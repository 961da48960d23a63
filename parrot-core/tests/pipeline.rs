//! End-to-end pipeline tests: transcript file → lexer thread → corpus
//! store on disk → reopened model → generation.

use std::fs;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use parrot_core::lexer::TranscriptLexer;
use parrot_core::model::{ChainError, MarkovChain};

const TRANSCRIPT: &str = "\
12:00:00  joined the channel
12:00:01 <alice> the quick brown fox
12:00:02 <bob> something entirely different
12:00:05! netsplit over
12:00:07 * alice stretches
12:00:09 <alice> the quick grey wolf
12:00:11 <alice> the slow brown fox
";

fn temp_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("parrot-pipeline-{}-{name}", std::process::id()))
}

fn write_transcript(name: &str, contents: &str) -> PathBuf {
	let path = temp_path(&format!("{name}.log"));
	fs::write(&path, contents).expect("transcript written");
	path
}

fn train_from_file(log: &PathBuf, db: &PathBuf, nick: &'static str) -> Result<MarkovChain, ChainError> {
	let log = log.clone();
	MarkovChain::create(2, db, true, move || {
		let lexer = TranscriptLexer::open(&log, nick)?;
		Ok(lexer.spawn())
	})
}

#[test]
fn test_train_and_generate_from_file() {
	let log = write_transcript("train", TRANSCRIPT);
	let db = temp_path("train.db");
	let _ = fs::remove_file(&db);

	let chain = train_from_file(&log, &db, "alice").expect("build succeeds");
	assert!(chain.corpus_len() > 0, "alice said things, the corpus cannot be empty");
	assert!(db.exists(), "the store must be flushed to disk");

	// Every line opener is "the", so a walk always starts there.
	let mut rng = StdRng::seed_from_u64(3);
	let line = chain.generate_with_rng(200, &mut rng).expect("generation succeeds");
	assert!(line.starts_with("the "), "got {line:?}");
	for word in line.split(' ') {
		assert!(
			["the", "quick", "slow", "brown", "grey", "fox", "wolf"].contains(&word),
			"{word:?} was never said by alice"
		);
	}

	let _ = fs::remove_file(&log);
	let _ = fs::remove_file(&db);
}

#[test]
fn test_reopened_model_generates_identically() {
	let log = write_transcript("reopen", TRANSCRIPT);
	let db = temp_path("reopen.db");
	let _ = fs::remove_file(&db);

	let trained = train_from_file(&log, &db, "alice").expect("build succeeds");
	let mut rng = StdRng::seed_from_u64(99);
	let fresh = trained.generate_with_rng(100, &mut rng).expect("generation succeeds");
	drop(trained);

	let reopened = MarkovChain::create(2, &db, false, || {
		panic!("supplier must not run when opening an existing store")
	})
	.expect("store reopens");
	let mut rng = StdRng::seed_from_u64(99);
	let replayed = reopened.generate_with_rng(100, &mut rng).expect("generation succeeds");

	assert_eq!(fresh, replayed, "same seed over the same corpus must replay the walk");

	let _ = fs::remove_file(&log);
	let _ = fs::remove_file(&db);
}

#[test]
fn test_failed_build_removes_store_file() {
	let log = write_transcript("bad", "12:00:00 <alice> fine\nnot a transcript line\n");
	let db = temp_path("bad.db");
	let _ = fs::remove_file(&db);

	let err = train_from_file(&log, &db, "alice").expect_err("malformed transcript fails");
	let msg = err.to_string();
	assert!(msg.contains("corpus build failed"), "got {msg}");
	assert!(msg.contains(":2:"), "the failure must name the offending line, got {msg}");
	assert!(!db.exists(), "a failed build must not leave a store file behind");

	let _ = fs::remove_file(&log);
}

#[test]
fn test_missing_transcript_fails_before_store_exists() {
	let db = temp_path("no-log.db");
	let _ = fs::remove_file(&db);

	let missing = temp_path("does-not-exist.log");
	let err = train_from_file(&missing, &db, "alice").expect_err("nothing to lex");
	assert!(err.to_string().contains("cannot open file"), "got {err}");
	assert!(!db.exists());
}

#[test]
fn test_invalid_nick_rejected_before_parsing() {
	let log = write_transcript("nick", TRANSCRIPT);
	let db = temp_path("nick.db");
	let _ = fs::remove_file(&db);

	let err = train_from_file(&log, &db, "al ice").expect_err("nick with a space");
	assert!(
		err.to_string().contains("nick is invalid because it contains invalid char ' '"),
		"got {err}"
	);
	assert!(!db.exists());

	let _ = fs::remove_file(&log);
}
