use anyhow::{anyhow, bail, Context, Result};
use section_scan::{
    init_logging, ClassificationRun, ClassifierConfig, ConfigStore, PatternCorpus, PatternPriority,
    SectionClassifier,
};
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage:
  segment_document <document.txt> [--corpus <corpus.json>] [--config <dir>]
                   [--threshold <0..1>] [--context-weight <0..1>]
                   [--priority section_first|content_first|balanced] [--pin] [--out <json_path>]

Notes:
  - Without --corpus the corpusPath from the stored config is used.
  - --threshold / --context-weight / --priority set the base strategy; --pin
    skips automatic strategy selection and uses it as-is.";

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

const VALUE_FLAGS: &[&str] = &[
    "--corpus",
    "--config",
    "--threshold",
    "--context-weight",
    "--priority",
    "--out",
];

/// First argument that is neither a flag nor the value of a value-taking flag.
fn document_path(args: &[String]) -> Option<String> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            return Some(arg.clone());
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn parse_unit(args: &[String], key: &str) -> Result<Option<f64>> {
    match parse_arg_value(args, key) {
        Some(raw) => {
            let value: f64 = raw
                .parse()
                .with_context(|| format!("{} expects a number, got {:?}", key, raw))?;
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", key, value);
            }
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn build_config(args: &[String], base: ClassifierConfig) -> Result<ClassifierConfig> {
    let mut config = base;
    if let Some(threshold) = parse_unit(args, "--threshold")? {
        config.confidence_threshold = threshold;
    }
    if let Some(weight) = parse_unit(args, "--context-weight")? {
        config.context_weight = weight;
    }
    if let Some(raw) = parse_arg_value(args, "--priority") {
        config.pattern_priority = PatternPriority::from_str(&raw)
            .ok_or_else(|| anyhow!("unknown priority {:?}", raw))?;
    }
    if has_flag(args, "--pin") {
        config.auto_strategy = false;
    }
    Ok(config)
}

fn print_run(path: &str, corpus: &PatternCorpus, run: &ClassificationRun) {
    let c = &run.classification;
    let s = &run.strategy;
    println!("File: {}", path);
    println!("Corpus: version={} categories={}", corpus.version(), corpus.len());
    println!("Run: {}", run.run_id);
    println!(
        "Document: type={:?} ({:.2}) structure={:?} length={} complexity={:.3}",
        c.doc_type, c.type_confidence, c.structure, c.length, c.complexity
    );
    println!(
        "Strategy: threshold={:.2} priority={:?} contextWeight={:.2} fallback={} pinned={}",
        s.confidence_threshold, s.pattern_priority, s.context_weight, s.fallback_enabled, run.strategy_pinned
    );
    println!(
        "Lines: total={} direct={} contextual={} belowThreshold={} discarded={}",
        run.summary.total_lines,
        run.summary.direct_boundaries,
        run.summary.contextual_boundaries,
        run.summary.below_threshold,
        run.summary.discarded_lines
    );

    if run.sections.is_empty() {
        println!("\nNo sections detected; tag the document manually.");
        return;
    }

    println!("\nSections ({}):", run.sections.len());
    for (i, section) in run.sections.iter().enumerate() {
        println!(
            "[{:02}] line {:>4}  {:<24} conf={:.3} {:?} \"{}\"",
            i,
            section.start_line + 1,
            section.category,
            section.confidence,
            section.match_kind,
            preview(&section.title, 40)
        );
        if !section.content.is_empty() {
            println!("      {}", preview(&section.content, 100));
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    let store = match parse_arg_value(&args, "--config") {
        Some(dir) => Some(ConfigStore::new(PathBuf::from(dir))),
        None => ConfigStore::default_config_dir().map(ConfigStore::new),
    };
    let app_config = match &store {
        Some(store) => store.load().map_err(|e| anyhow!(e))?,
        None => Default::default(),
    };
    init_logging(&app_config.logging);

    let path = document_path(&args).ok_or_else(|| anyhow!("no document given\n\n{}", USAGE))?;
    let corpus_path = parse_arg_value(&args, "--corpus")
        .or_else(|| app_config.corpus_path.clone())
        .ok_or_else(|| anyhow!("no corpus given; pass --corpus or set corpusPath in config"))?;

    let corpus = PatternCorpus::from_path(&PathBuf::from(&corpus_path))
        .with_context(|| format!("loading corpus {}", corpus_path))?;
    let corpus = Arc::new(corpus);

    let config = build_config(&args, app_config.classifier.clone())?;
    let classifier = SectionClassifier::new(corpus.clone(), Some(config));

    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let run = classifier.classify(&text);

    print_run(&path, &corpus, &run);

    if let Some(out_path) = parse_arg_value(&args, "--out") {
        let json = serde_json::to_string_pretty(&run)?;
        std::fs::write(&out_path, json).with_context(|| format!("writing {}", out_path))?;
        println!("\nWrote {}", out_path);
    }

    Ok(())
}
