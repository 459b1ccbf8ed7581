use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use kal_annot_lib::{Annotator, Lexicon, Mode, Options, ResultCache};

/// Annotate Kalaallisut morphological analysis streams.
///
/// Reads a constraint-grammar stream on stdin and writes the annotated
/// stream to stdout; lines that are not analysis lines pass through
/// unchanged.
#[derive(Parser)]
#[command(name = "kal-annot", version, about)]
struct Cli {
    /// Path to the lexicon snapshot.
    #[arg(long, env = "KAL_ANNOT_LEXICON", value_name = "FILE")]
    lexicon: PathBuf,

    /// Append contributing lexeme ids to every semantic tag.
    #[arg(long)]
    trace: bool,

    /// Annotate only the rightmost matching span of each line.
    #[arg(long)]
    last_match_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Attach semantic class tags to resolved spans.
    Sems,
    /// Insert translations in front of resolved spans.
    Gloss {
        /// Target language code.
        #[arg(long, default_value = "eng")]
        lang: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = match &cli.command {
        Command::Sems => Options {
            mode: Mode::Sems,
            trace: cli.trace,
            last_match_only: cli.last_match_only,
            ..Options::default()
        },
        Command::Gloss { lang } => Options {
            mode: Mode::Gloss,
            language: lang.clone(),
            trace: cli.trace,
            last_match_only: cli.last_match_only,
            ..Options::default()
        },
    };

    let lexicon = Lexicon::from_path(&cli.lexicon)
        .with_context(|| format!("loading lexicon snapshot {}", cli.lexicon.display()))?;
    tracing::info!(path = %cli.lexicon.display(), "lexicon loaded");
    let annotator = Annotator::new(lexicon, options);
    let mut cache = ResultCache::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        for output in annotator.annotate_line(&line, &mut cache) {
            writeln!(out, "{}", output)?;
        }
        out.flush()?;
    }
    Ok(())
}
