use std::fs;

use rs_markov_core::chain::markov_chain::MarkovChain;
use rs_markov_core::random::SeededRandom;

/// Number of tokens printed per output line.
const LINE_BREAK: usize = 20;

/// Number of tokens generated before stopping.
const STREAM_LENGTH: usize = 200;

/// Builds an order-2 word chain from the corpus files given on the
/// command line and prints a seeded generated stream.
///
/// Every whitespace-separated word of every file is one token. The walk
/// uses a fixed seed, so running twice on the same corpus prints the
/// same text.
fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	let paths: Vec<String> = std::env::args().skip(1).collect();
	if paths.is_empty() {
		return Err("usage: rs-markov-exemple <corpus.txt> [more.txt ...]".into());
	}

	println!("Reading...");
	let mut words: Vec<String> = Vec::new();
	for path in &paths {
		let contents = fs::read_to_string(path)?;
		words.extend(contents.split_whitespace().map(str::to_owned));
	}

	println!("Building...");
	let mut chain = MarkovChain::new(2)?;
	chain.add(words)?;

	println!("Starting...");
	let mut rng = SeededRandom::new(42);
	for (index, token) in chain.stream(&mut rng)?.take(STREAM_LENGTH).enumerate() {
		print!("{} ", token?);
		if (index + 1) % LINE_BREAK == 0 {
			println!();
		}
	}
	println!();

	Ok(())
}
