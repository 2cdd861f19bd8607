use evaluator::{collect_inputs, load_config, parse_line, rfc3339_timestamp, run, RunPaths};
use rankeval_core::config::{DuplicateQueryPolicy, MissingRelevantPolicy};
use rankeval_core::pipeline::QueryOutcome;
use rankeval_core::EvalConfig;
use std::fs;
use tempfile::tempdir;
use time::macros::datetime;
use time::{Date, Month};

const DOCUMENTS: &str = "qid=1\trel=99\tClassical music may never be the most popular music
qid=1\trel=1\tClassical music is the most popular music
qid=1\trel=0\tPop music is popular
qid=2\trel=99\tThe best mirror is an old friend
qid=2\trel=0\tThe best mirror is an old friend indeed friend
qid=2\trel=1\tAn old friend is the best mirror
";

#[test]
fn parses_legacy_lines() {
    let (qid, rel, text) = parse_line("qid=12\trel=99\tsome text\twith tab").unwrap();
    assert_eq!((qid, rel, text), (12, 99, "some text\twith tab"));
    assert!(parse_line("12\t99\ttext").is_err());
    assert!(parse_line("qid=x\trel=1\ttext").is_err());
}

#[test]
fn writes_text_report() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("documents.txt");
    fs::write(&input, DOCUMENTS).unwrap();
    let paths = RunPaths { input, report: dir.path().join("out/report.txt"), summary: None };

    let eval = run(&paths, EvalConfig::default()).unwrap();
    assert_eq!(eval.ranked, 2);
    let ranks: Vec<usize> = eval.ranks().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2]);

    let report = fs::read_to_string(&paths.report).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("cosine=0.8040\trank=1\tqid=1\trel=1\tClassical music is"));
    assert!(lines[3].starts_with("best: ") && lines[3].ends_with("indeed friend"));
    assert_eq!(lines[4], "MRR=0.7500");
}

#[test]
fn jsonl_with_precomputed_terms_and_summary() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a.jsonl"),
        concat!(
            r#"{"query_id":1,"relevance":99,"text":"q","terms":{"a":1,"b":1}}"#, "\n",
            r#"{"query_id":1,"relevance":0,"text":"only a","terms":{"a":1}}"#, "\n",
            "\n",
            r#"{"query_id":1,"relevance":1,"text":"a b"}"#, "\n",
        ),
    )
    .unwrap();
    fs::write(dir.path().join("b.json"), r#"[{"query_id":2,"relevance":99,"text":"x"},{"query_id":2,"relevance":0,"text":"x"}]"#).unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();

    assert_eq!(collect_inputs(dir.path()).unwrap().len(), 2);

    let paths = RunPaths {
        input: dir.path().to_path_buf(),
        report: dir.path().join("report.txt"),
        summary: Some(dir.path().join("summary.json")),
    };
    let eval = run(&paths, EvalConfig::default()).unwrap();
    assert_eq!(eval.mrr, 1.0);
    assert!(matches!(eval.outcomes[1], QueryOutcome::Skipped { query_id: 2, .. }));

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["ranked"], 1);
    assert_eq!(summary["skipped"], 1);
    assert!(summary["created_at"].as_str().unwrap().len() >= 20);
}

#[test]
fn duplicate_query_fails_with_location() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dup.txt");
    fs::write(&input, "qid=1\trel=99\ta\nqid=1\trel=1\ta\nqid=1\trel=99\tb\n").unwrap();
    let paths = RunPaths { input: input.clone(), report: dir.path().join("r.txt"), summary: None };

    let err = run(&paths, EvalConfig::default()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("dup.txt:3"), "{msg}");
    assert!(msg.contains("query id 1 was ingested more than once"), "{msg}");

    let cfg = EvalConfig { duplicate_query: DuplicateQueryPolicy::Overwrite, ..EvalConfig::default() };
    let eval = run(&paths, cfg).unwrap();
    // the surviving query is "b", which shares nothing with the gold "a"
    assert_eq!(eval.ranks().next().unwrap().relevant_score, 0.0);
}

#[test]
fn abort_policy_from_config_file() {
    let dir = tempdir().unwrap();
    let cfg_path = dir.path().join("eval.json");
    fs::write(&cfg_path, r#"{"missing_relevant":"abort"}"#).unwrap();
    let cfg = load_config(Some(cfg_path.as_path())).unwrap();
    assert_eq!(cfg.missing_relevant, MissingRelevantPolicy::Abort);

    let input = dir.path().join("docs.txt");
    fs::write(&input, "qid=1\trel=99\ta\nqid=1\trel=0\ta\n").unwrap();
    let paths = RunPaths { input, report: dir.path().join("r.txt"), summary: None };
    let err = run(&paths, cfg).unwrap_err();
    assert!(format!("{err:#}").contains("no relevant document"));
    assert!(!paths.report.exists());
}

#[test]
fn report_directory_failure_is_reported() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("docs.txt");
    fs::write(&input, "qid=1\trel=99\ta\nqid=1\trel=1\ta\n").unwrap();
    // a plain file where the report directory should go
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let paths = RunPaths { input, report: blocker.join("report.txt"), summary: None };

    let err = run(&paths, EvalConfig::default()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.starts_with("creating directory "), "{msg}");
    assert!(msg.contains("blocker"), "{msg}");
}

#[test]
fn timestamp_formatting() {
    assert_eq!(rfc3339_timestamp(datetime!(2024-01-01 0:00 UTC)).unwrap(), "2024-01-01T00:00:00Z");

    // RFC 3339 has no room for negative years
    let before_year_zero = Date::from_calendar_date(-1, Month::January, 1).unwrap().midnight().assume_utc();
    assert!(rfc3339_timestamp(before_year_zero).is_err());
}
