// ABOUTME: CLI binary for the depthscan DOM depth analyzer.
// ABOUTME: Analyzes HTML files and prints ranked interest blocks as text or JSON.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use depthscan::resource::load_html;
use depthscan::{Algorithm, AnalysisOptions, AnalysisResult, Analyzer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "depthscan")]
#[command(about = "Find the main content blocks of HTML documents by DOM depth analysis")]
struct Args {
    /// JSON file with (partial) analysis options
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long = "json")]
    json_output: bool,

    /// Maximum number of blocks to report
    #[arg(long = "max-blocks")]
    max_blocks: Option<usize>,

    /// Minimum block score
    #[arg(long = "min-score")]
    min_score: Option<f64>,

    /// Minimum block size in words
    #[arg(long = "min-size")]
    min_size: Option<usize>,

    /// Disable a detection algorithm (text_density, depth_stability, clustering, depth_transition)
    #[arg(long = "disable")]
    disable: Vec<Algorithm>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// HTML files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

fn build_options(args: &Args) -> anyhow::Result<AnalysisOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AnalysisOptions::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AnalysisOptions::default(),
    };

    if let Some(max) = args.max_blocks {
        opts.max_blocks = max;
    }
    if let Some(score) = args.min_score {
        opts.min_block_score = score;
    }
    if let Some(size) = args.min_size {
        opts.min_block_size = size;
    }
    for algorithm in &args.disable {
        opts.algorithms.set(*algorithm, false);
    }

    opts.validate().context("invalid options")?;
    Ok(opts)
}

fn analyze_file(analyzer: &Analyzer, path: &Path) -> anyhow::Result<AnalysisResult> {
    let html = load_html(path)?;
    analyzer
        .analyze_str(&html)
        .with_context(|| format!("analyzing {}", path.display()))
}

fn format_output(results: &[(&Path, AnalysisResult)], json_output: bool) -> anyhow::Result<String> {
    if json_output {
        let out = if results.len() == 1 {
            serde_json::to_string_pretty(&results[0].1)?
        } else {
            let entries: Vec<serde_json::Value> = results
                .iter()
                .map(|(path, result)| -> Result<serde_json::Value, serde_json::Error> {
                    Ok(serde_json::json!({
                        "file": path.display().to_string(),
                        "result": serde_json::to_value(result)?,
                    }))
                })
                .collect::<Result<_, _>>()?;
            serde_json::to_string_pretty(&entries)?
        };
        return Ok(out);
    }

    if results.len() == 1 {
        return Ok(results[0].1.format_text());
    }
    Ok(results
        .iter()
        .map(|(path, result)| format!("== {} ==\n{}", path.display(), result.format_text()))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let opts = match build_options(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(2);
        }
    };
    let analyzer = Analyzer::new(opts);

    let start = Instant::now();
    let mut results = Vec::new();
    let mut had_error = false;

    for path in &args.files {
        match analyze_file(&analyzer, path) {
            Ok(result) => results.push((path.as_path(), result)),
            Err(e) => {
                eprintln!("error: {:#}", e);
                had_error = true;
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&results, args.json_output) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("error: formatting output: {:#}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
