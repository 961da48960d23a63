use std::env;

use parrot_core::lexer::TranscriptLexer;
use parrot_core::model::MarkovChain;

/// Length of a prefix for the markov chain.
const PREFIX_LEN: usize = 2;

/// Max number of words in one generated line.
const MAX_LINE_LEN: usize = 200;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Usage: parrot-exemple <transcript> <nick> [store]
    // The store path defaults to "<nick>.db" next to the working dir.
    let mut args = env::args().skip(1);
    let log_path = args.next().unwrap_or_else(|| "./data/channel.log".to_owned());
    let nick = args.next().unwrap_or_else(|| "alice".to_owned());
    let db_path = args.next().unwrap_or_else(|| format!("./{nick}.db"));

    // Train a model from the transcript, or reopen it if a store
    // already exists at the path. The lexer runs on its own thread and
    // hands tokens over one at a time; a malformed transcript or an
    // unreadable file surfaces here as a single descriptive error and
    // leaves no store file behind.
    let lexer_log = log_path.clone();
    let lexer_nick = nick.clone();
    let chain = MarkovChain::create(PREFIX_LEN, &db_path, true, move || {
        let lexer = TranscriptLexer::open(&lexer_log, &lexer_nick)?;
        Ok(lexer.spawn())
    })?;

    log::info!("model for <{nick}> ready at {db_path}");
    println!("corpus: {} prefixes learned from {log_path}", chain.corpus_len());

    // Generate a few lines in the speaker's style. Each call performs
    // an independent bounded random walk; a sparse corpus simply
    // produces shorter lines.
    for i in 0..10 {
        println!("{}: {}", i + 1, chain.generate(MAX_LINE_LEN)?);
    }

    Ok(())
}
