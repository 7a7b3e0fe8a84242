use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use scriptfreq_morphy::{Lemmatize, Morphy};
use scriptfreq_types::Pos;

const USAGE: &str =
    "usage: cargo run -p scriptfreq-morphy --example lookup -- <dict-dir> [--demo | <word>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let dict_dir = args.next().map(PathBuf::from).context(USAGE)?;
    let next = args.next();
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let words: Vec<String> = match next.as_deref() {
        Some("--demo") => ["running", "were", "children", "coffees", "happiest"]
            .into_iter()
            .map(String::from)
            .collect(),
        Some(word) => vec![word.to_string()],
        None => bail!(USAGE),
    };

    let morph = Morphy::load(&dict_dir)
        .with_context(|| format!("loading WordNet from {}", dict_dir.display()))?;

    println!("Dictionary: {}", dict_dir.display());

    for word in words {
        println!("\nSurface: {}", word);
        for pos in [Pos::Verb, Pos::Noun, Pos::Adj, Pos::Adv] {
            let candidates = morph.lemmas_for(pos, &word);
            if candidates.is_empty() {
                continue;
            }
            println!("  {:?}:", pos);
            for cand in candidates {
                println!("    {:<10} [{:?}]", cand.lemma, cand.source);
            }
        }
        let chosen = Pos::LEMMA_PRIORITY
            .into_iter()
            .find_map(|pos| morph.lemma(pos, &word))
            .unwrap_or_else(|| word.to_lowercase());
        println!("  => {chosen}");
    }

    Ok(())
}
