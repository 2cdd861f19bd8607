//! Report output: the tab-separated text report and a JSON summary.

use serde::Serialize;
use std::io::{self, Write};

use crate::config::REPORT_PRECISION;
use crate::pipeline::{Evaluation, OrphanPool, QueryOutcome};

/// Text report. Ranked queries get a relevant-document line and a `best:` line;
/// skipped queries and orphan pools get a `skipped` line; the last line carries the MRR.
pub fn write_report<W: Write>(eval: &Evaluation, mut w: W) -> io::Result<()> {
    let p = REPORT_PRECISION;
    for outcome in &eval.outcomes {
        match outcome {
            QueryOutcome::Ranked(r) => {
                writeln!(
                    w,
                    "cosine={:.p$}\trank={}\tqid={}\trel={}\t{}",
                    r.relevant_score,
                    r.rank,
                    r.query_id,
                    u8::from(r.relevant_flag),
                    r.relevant_text
                )?;
                writeln!(w, "best: {:.p$}\ttext: {}", r.top_score, r.top_text)?;
            }
            QueryOutcome::Skipped { query_id, error } => {
                writeln!(w, "skipped\tqid={query_id}\treason={error}")?;
            }
        }
    }
    for OrphanPool { query_id, candidates } in &eval.orphans {
        writeln!(w, "skipped\tqid={query_id}\treason=no query record for {candidates} candidates")?;
    }
    writeln!(w, "MRR={:.p$}", eval.mrr)?;
    w.flush()
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub created_at: &'a str,
    pub queries: usize,
    pub ranked: usize,
    pub skipped: usize,
    pub mrr: f64,
    pub success_at_1: f64,
    pub outcomes: &'a [QueryOutcome],
    pub orphans: &'a [OrphanPool],
}

impl<'a> Summary<'a> {
    pub fn new(eval: &'a Evaluation, created_at: &'a str) -> Self {
        Self {
            created_at,
            queries: eval.outcomes.len(),
            ranked: eval.ranked,
            skipped: eval.skipped,
            mrr: eval.mrr,
            success_at_1: eval.success_at_1,
            outcomes: &eval.outcomes,
            orphans: &eval.orphans,
        }
    }
}

pub fn write_summary<W: Write>(eval: &Evaluation, created_at: &str, mut w: W) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&Summary::new(eval, created_at))?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    w.flush()
}
