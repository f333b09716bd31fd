use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use readalign::annotation::{build_task, AnnotationTask};
use readalign::transcript::{load_reference_text, load_transcript};
use readalign::{
    aggregate_reports, compute_case_report, AlignerConfig, AlignmentInput, CaseFailure,
    CaseReport, HomophoneRegistry, Meta, ReadingAligner, ReadingAlignerBuilder, Report,
    REPORT_SCHEMA_VERSION,
};
use serde::Deserialize;

#[path = "alignment_report/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "alignment_report/label_studio_formatter.rs"]
mod label_studio_formatter;

const MODEL_VERSION: &str = concat!("readalign-", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// One Label Studio task file per case, with sentence regions.
    #[value(name = "label-studio")]
    LabelStudio,
}

#[derive(Debug, Parser)]
#[command(name = "alignment_report")]
#[command(about = "Align read-aloud transcripts with reference texts and label misreadings")]
struct Args {
    #[arg(long, env = "READALIGN_DATASET_ROOT", default_value = "test-data")]
    dataset_root: PathBuf,
    /// JSON array of cases; paths inside are relative to the dataset root.
    #[arg(long, env = "READALIGN_CASES", default_value = "cases.json")]
    cases: PathBuf,
    /// Plain-text list of case ids to keep, one per line.
    #[arg(long, env = "READALIGN_IDS_FILE")]
    ids_file: Option<PathBuf>,
    #[arg(long, env = "READALIGN_CONFIG")]
    config: Option<PathBuf>,
    /// Homophone file (`{lang: {token: [..]}}`) or directory of `<lang>.json`.
    #[arg(long, env = "READALIGN_HOMOPHONES")]
    homophones: Option<PathBuf>,
    #[arg(long, env = "READALIGN_NO_BUILTIN_HOMOPHONES", default_value_t = false)]
    no_builtin_homophones: bool,
    #[arg(long, env = "READALIGN_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "READALIGN_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "READALIGN_OFFSET", default_value_t = 0)]
    offset: usize,
    #[arg(
        long,
        env = "READALIGN_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
    /// Embed segments and mispronunciation entries in each case report.
    #[arg(long, env = "READALIGN_INCLUDE_DETAILS", default_value_t = false)]
    include_details: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    language: String,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    reference_path: Option<PathBuf>,
    transcript_path: PathBuf,
    #[serde(default)]
    audio: Option<String>,
}

fn main() {
    readalign::logging::init();
    if let Err(err) = run() {
        tracing::error!(error = err.as_str(), "alignment_report failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let dataset_root = resolve_path(&repo_root, &args.dataset_root);

    let config = match args.config.as_ref() {
        Some(path) => AlignerConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load config: {err}"))?,
        None => AlignerConfig::default(),
    };
    let homophones = Arc::new(load_homophones(
        &repo_root,
        args.homophones.as_ref(),
        args.no_builtin_homophones,
    )?);

    let mut cases = load_cases(&resolve_path(&dataset_root, &args.cases))?;
    if let Some(ids) = load_case_filter(args.ids_file.as_ref(), &repo_root)? {
        cases.retain(|case| ids.contains(&case.id));
    }
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying filters/offset/limit.".to_string());
    }

    let homophone_languages: Vec<String> = homophones
        .languages()
        .into_iter()
        .map(str::to_string)
        .collect();
    let aligner = ReadingAlignerBuilder::new(config.clone())
        .with_homophones(homophones)
        .build()
        .map_err(|err| format!("Failed to build ReadingAligner: {err}"))?;

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("aligning...");

    let started = Instant::now();
    let outcomes: Vec<CaseOutcome> = cases
        .par_iter()
        .map(|case| {
            let outcome = align_case(
                &aligner,
                case,
                &dataset_root,
                args.output_format,
                args.include_details,
            );
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_with_message("alignment pass complete");
    tracing::info!(
        cases = cases.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "alignment pass complete"
    );

    let mut reports: Vec<CaseReport> = Vec::with_capacity(outcomes.len());
    let mut tasks: Vec<(String, AnnotationTask)> = Vec::new();
    let mut failures: Vec<CaseFailure> = Vec::new();
    for outcome in outcomes {
        match outcome {
            CaseOutcome::Report(report) => reports.push(*report),
            CaseOutcome::Task(id, task) => tasks.push((id, *task)),
            CaseOutcome::Failed(failure) => {
                tracing::warn!(
                    case = failure.id.as_str(),
                    error = failure.message.as_str(),
                    "case failed"
                );
                failures.push(failure);
            }
        }
    }

    match args.output_format {
        OutputFormat::Json => {
            let aggregates = aggregate_reports(&reports, &failures);
            let report = Report {
                schema_version: REPORT_SCHEMA_VERSION,
                meta: Meta {
                    generated_at: Utc::now().to_rfc3339(),
                    lookahead: config.lookahead,
                    min_run_length: config.min_run_length,
                    homophone_languages,
                    case_count: reports.len() + failures.len(),
                },
                cases: reports,
                failures,
                aggregates,
            };
            let out_path = resolve_out_path(&repo_root, args.out.as_ref(), args.output_format);
            json_report_formatter::write_report(&out_path, &report)?;
            println!("{}", out_path.display());
        }
        OutputFormat::LabelStudio => {
            let out_dir = resolve_out_path(&repo_root, args.out.as_ref(), args.output_format);
            let written = label_studio_formatter::write_tasks(&out_dir, &tasks)?;
            println!(
                "Wrote {written} Label Studio task file(s) to {} ({} failed).",
                out_dir.display(),
                failures.len()
            );
        }
    }
    Ok(())
}

enum CaseOutcome {
    Report(Box<CaseReport>),
    Task(String, Box<AnnotationTask>),
    Failed(CaseFailure),
}

fn align_case(
    aligner: &ReadingAligner,
    case: &Case,
    dataset_root: &Path,
    format: OutputFormat,
    include_details: bool,
) -> CaseOutcome {
    let failed = |message: String| {
        CaseOutcome::Failed(CaseFailure {
            id: case.id.clone(),
            message,
        })
    };

    let input = match load_input(case, dataset_root) {
        Ok(input) => input,
        Err(message) => return failed(message),
    };
    let output = match aligner.align(&input) {
        Ok(output) => output,
        Err(err) => return failed(err.to_string()),
    };

    match format {
        OutputFormat::Json => {
            match compute_case_report(&case.id, &case.language, &output, include_details) {
                Ok(report) => CaseOutcome::Report(Box::new(report)),
                Err(err) => failed(err.to_string()),
            }
        }
        OutputFormat::LabelStudio => {
            let audio = case.audio.clone().unwrap_or_default();
            let task = build_task(&audio, &input.reference, &output, MODEL_VERSION);
            CaseOutcome::Task(case.id.clone(), Box::new(task))
        }
    }
}

fn load_input(case: &Case, dataset_root: &Path) -> Result<AlignmentInput, String> {
    let reference = match (&case.reference, &case.reference_path) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            let path = resolve_path(dataset_root, path);
            require_path_exists(&path, "Missing reference file referenced by case.")?;
            load_reference_text(&path).map_err(|err| err.to_string())?
        }
        (None, None) => {
            return Err("case has neither 'reference' nor 'reference_path'".to_string());
        }
    };
    let transcript_path = resolve_path(dataset_root, &case.transcript_path);
    require_path_exists(&transcript_path, "Missing transcript file referenced by case.")?;
    let transcript = load_transcript(&transcript_path).map_err(|err| err.to_string())?;
    Ok(AlignmentInput {
        reference,
        transcript,
        language: case.language.clone(),
    })
}

fn load_homophones(
    repo_root: &Path,
    extra: Option<&PathBuf>,
    no_builtin: bool,
) -> Result<HomophoneRegistry, String> {
    let base = if no_builtin {
        HomophoneRegistry::new()
    } else {
        HomophoneRegistry::builtin()
            .map_err(|err| format!("Failed to load built-in homophone tables: {err}"))?
    };
    let Some(path) = extra else {
        return Ok(base);
    };
    let path = resolve_path(repo_root, path);
    require_path_exists(&path, "Missing --homophones path.")?;
    let loaded = if path.is_dir() {
        HomophoneRegistry::load_dir(&path)
    } else {
        HomophoneRegistry::load_file(&path)
    }
    .map_err(|err| format!("Failed to load homophones '{}': {err}", path.display()))?;
    Ok(base.merge(loaded))
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    require_path_exists(path, "Missing cases file.")?;
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases file '{}': {err}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))
}

fn load_case_filter(
    ids_file: Option<&PathBuf>,
    repo_root: &Path,
) -> Result<Option<HashSet<String>>, String> {
    let Some(path) = ids_file else {
        return Ok(None);
    };
    let file_path = resolve_path(repo_root, path);
    require_path_exists(&file_path, "Missing --ids-file path.")?;

    let contents = fs::read_to_string(&file_path)
        .map_err(|err| format!("Failed to read ids file '{}': {err}", file_path.display()))?;
    let ids: HashSet<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect();

    if ids.is_empty() {
        return Err(format!(
            "No case IDs were parsed from '{}'.",
            file_path.display()
        ));
    }
    Ok(Some(ids))
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>, format: OutputFormat) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    match format {
        OutputFormat::Json => repo_root
            .join("target")
            .join("alignment_reports")
            .join(format!("alignment-report-{run_id}.json")),
        OutputFormat::LabelStudio => repo_root
            .join("target")
            .join("label_studio_tasks")
            .join(run_id.to_string()),
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
