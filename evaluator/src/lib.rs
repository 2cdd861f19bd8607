use anyhow::{anyhow, bail, Context, Result};
use rankeval_core::pipeline::{Evaluation, Pipeline};
use rankeval_core::report::{write_report, write_summary};
use rankeval_core::{DocumentRecord, EvalConfig, QueryId, TermVector};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// One JSON input record. `terms` carries a precomputed term vector and bypasses the tokenizer.
#[derive(Debug, Deserialize)]
struct InputDoc {
    query_id: QueryId,
    relevance: i64,
    text: String,
    #[serde(default)]
    terms: Option<HashMap<String, u32>>,
}

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub report: PathBuf,
    pub summary: Option<PathBuf>,
}

pub fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            EvalConfig::from_json_str(&raw).with_context(|| format!("parsing config {}", p.display()))
        }
        None => Ok(EvalConfig::default()),
    }
}

/// Input files in sorted path order. A file path is taken as-is.
pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {} does not exist", input.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("txt" | "tsv" | "jsonl" | "json")))
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one `qid=<int>\trel=<int>\t<text>` line.
pub fn parse_line(line: &str) -> Result<(QueryId, i64, &str)> {
    let mut parts = line.splitn(3, '\t');
    let qid = parts.next().and_then(|s| s.strip_prefix("qid=")).ok_or_else(|| anyhow!("missing qid= field"))?;
    let rel = parts.next().and_then(|s| s.strip_prefix("rel=")).ok_or_else(|| anyhow!("missing rel= field"))?;
    let text = parts.next().unwrap_or("");
    let qid: QueryId = qid.trim().parse().with_context(|| format!("bad query id {qid:?}"))?;
    let rel: i64 = rel.trim().parse().with_context(|| format!("bad relevance marker {rel:?}"))?;
    Ok((qid, rel, text))
}

fn load_lines(file: &Path, pipeline: &mut Pipeline) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let mut n = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let at = || format!("{}:{}", file.display(), idx + 1);
        let (qid, rel, text) = parse_line(&line).with_context(at)?;
        pipeline.submit(qid, rel, text).with_context(at)?;
        n += 1;
    }
    Ok(n)
}

fn submit_doc(doc: InputDoc, pipeline: &mut Pipeline) -> Result<()> {
    match doc.terms {
        Some(terms) => {
            pipeline.submit_record(DocumentRecord {
                query_id: doc.query_id,
                relevance_marker: doc.relevance,
                text: doc.text,
                vector: TermVector::from(terms),
            })?;
        }
        None => {
            pipeline.submit(doc.query_id, doc.relevance, doc.text)?;
        }
    }
    Ok(())
}

fn load_jsonl(file: &Path, pipeline: &mut Pipeline) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let mut n = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let at = || format!("{}:{}", file.display(), idx + 1);
        let doc: InputDoc = serde_json::from_str(&line).with_context(at)?;
        submit_doc(doc, pipeline).with_context(at)?;
        n += 1;
    }
    Ok(n)
}

fn load_json(file: &Path, pipeline: &mut Pipeline) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs: Vec<InputDoc> = match json {
        serde_json::Value::Array(_) => serde_json::from_value(json)?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => bail!("{}: expected an object or an array of objects", file.display()),
    };
    let n = docs.len();
    for (idx, doc) in docs.into_iter().enumerate() {
        submit_doc(doc, pipeline).with_context(|| format!("{} record {}", file.display(), idx))?;
    }
    Ok(n)
}

/// Feed every input file into the pipeline.
pub fn ingest_path(input: &Path, pipeline: &mut Pipeline) -> Result<usize> {
    let mut total = 0;
    for file in collect_inputs(input)? {
        let n = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => load_jsonl(&file, pipeline)?,
            Some("json") => load_json(&file, pipeline)?,
            _ => load_lines(&file, pipeline)?,
        };
        tracing::info!(file = %file.display(), records = n, "loaded");
        total += n;
    }
    Ok(total)
}

/// `created_at` value for the JSON summary.
pub fn rfc3339_timestamp(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).with_context(|| format!("formatting timestamp {at}"))
}

/// Ingest, evaluate and write the report (and JSON summary if requested).
pub fn run(paths: &RunPaths, config: EvalConfig) -> Result<Evaluation> {
    let mut pipeline = Pipeline::new(config);
    let records = ingest_path(&paths.input, &mut pipeline)?;
    tracing::info!(records, "ingestion complete");

    let eval = pipeline.finish().context("evaluation failed")?;

    if let Some(dir) = paths.report.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    }
    let out = File::create(&paths.report).with_context(|| format!("creating {}", paths.report.display()))?;
    write_report(&eval, BufWriter::new(out))?;

    if let Some(summary) = &paths.summary {
        let created_at = rfc3339_timestamp(OffsetDateTime::now_utc())?;
        let out = File::create(summary).with_context(|| format!("creating {}", summary.display()))?;
        write_summary(&eval, &created_at, BufWriter::new(out))?;
    }

    tracing::info!(report = %paths.report.display(), mrr = eval.mrr, "report written");
    Ok(eval)
}
