use anyhow::Result;
use clap::Parser;
use evaluator::{load_config, run, RunPaths};
use rankeval_core::config::{DuplicateQueryPolicy, MissingRelevantPolicy, TokenizerKind};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Rank candidate documents by cosine similarity and report MRR", long_about = None)]
struct Cli {
    /// Input file or directory (qid=/rel= lines, JSONL or JSON)
    #[arg(long)]
    input: PathBuf,
    /// Text report path
    #[arg(long, default_value = "report.txt")]
    output: PathBuf,
    /// Optional JSON summary path
    #[arg(long)]
    summary: Option<PathBuf>,
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    tokenizer: Option<TokenizerArg>,
    /// Abort the run at the first query that cannot be ranked
    #[arg(long, default_value_t = false)]
    abort_on_missing: bool,
    /// Keep the last of repeated query records instead of failing
    #[arg(long, default_value_t = false)]
    overwrite_duplicates: bool,
    /// Rank queries in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TokenizerArg {
    Whitespace,
    Normalizing,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(t) = cli.tokenizer {
        config.tokenizer = match t {
            TokenizerArg::Whitespace => TokenizerKind::Whitespace,
            TokenizerArg::Normalizing => TokenizerKind::Normalizing,
        };
    }
    if cli.abort_on_missing {
        config.missing_relevant = MissingRelevantPolicy::Abort;
    }
    if cli.overwrite_duplicates {
        config.duplicate_query = DuplicateQueryPolicy::Overwrite;
    }
    config.parallel |= cli.parallel;

    let paths = RunPaths { input: cli.input, report: cli.output, summary: cli.summary };
    let eval = run(&paths, config)?;
    println!("MRR={:.4} ranked={} skipped={}", eval.mrr, eval.ranked, eval.skipped);
    Ok(())
}
