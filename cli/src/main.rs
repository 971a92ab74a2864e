//! Operator CLI for the solescan pipeline.
//!
//! Takes an image file or a directory of images, infers the canonical
//! view of each file from its name, and submits one analysis run per
//! `--times` iteration. `--json-mode` prints only the run summaries to
//! stdout, with logs on stderr, so batch drivers can parse the output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use solescan::config::Config;
use solescan::db::{Database, RecordSink, SqliteRecordStore};
use solescan::pipeline::Pipeline;
use solescan::provider::GeminiClient;
use solescan::storage::{BlobSink, FsBlobStore};
use solescan::views::{View, ViewImage};

/// File extensions considered image inputs.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic"];

/// Longest image side submitted to the model; larger photos are
/// downscaled before upload.
const MAX_DIMENSION: u32 = 1568;

#[derive(Parser)]
#[command(name = "solescan", version, about = "Forensic shoe-wear analysis")]
struct Args {
    /// Path to an image file or a directory of images
    input: PathBuf,

    /// Number of times to run the analysis for consistency checking
    #[arg(long, default_value_t = 1)]
    times: u32,

    /// Output only JSON summaries to stdout, logs to stderr
    #[arg(long, short = 'j')]
    json_mode: bool,

    /// Submit images as-is without downscaling
    #[arg(long)]
    no_resize: bool,
}

#[derive(Serialize)]
struct RunSummary {
    run: u32,
    run_id: String,
    outsole_score: String,
    midsole_life: String,
    km_left: String,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Guesses the view from the file name: the first canonical label that
/// appears in the upper-cased name wins.
fn infer_view_from_filename(name: &str) -> Option<View> {
    let upper = name.to_uppercase();
    View::ALL.into_iter().find(|v| upper.contains(v.label()))
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn gather_image_files(input: &Path) -> Result<Vec<PathBuf>, String> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)
            .map_err(|e| format!("Cannot read directory {}: {}", input.display(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        files.sort();
        return Ok(files);
    }
    Err(format!("Invalid input path: {}", input.display()))
}

/// Downscales the image so the longest side is at most [`MAX_DIMENSION`],
/// re-encoding in the original format. Returns `None` when the image is
/// already small enough.
fn downscale(bytes: &[u8]) -> Result<Option<(Vec<u8>, String)>, image::ImageError> {
    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;

    if img.width().max(img.height()) <= MAX_DIMENSION {
        return Ok(None);
    }

    let resized = img.resize(
        MAX_DIMENSION,
        MAX_DIMENSION,
        image::imageops::FilterType::Lanczos3,
    );
    let mut out = std::io::Cursor::new(Vec::new());
    resized.write_to(&mut out, format)?;
    Ok(Some((out.into_inner(), format.to_mime_type().to_string())))
}

/// Reads one image file, downscaling oversized photos unless disabled.
/// Undecodable files (e.g. HEIC) are submitted unchanged.
fn prepare_image(path: &Path, resize: bool) -> Result<ViewImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if resize {
        match downscale(&bytes) {
            Ok(Some((resized, mime))) => {
                info!("downscaled {} for upload", path.display());
                return Ok(ViewImage::new(resized, mime));
            }
            Ok(None) => {}
            Err(e) => warn!("could not decode {} for resizing: {}", path.display(), e),
        }
    }

    Ok(ViewImage::new(bytes, media_type))
}

/// Maps the input files to canonical views. Files whose view cannot be
/// inferred are skipped; duplicate views keep the first file seen.
fn build_uploads(files: &[PathBuf], resize: bool) -> Result<HashMap<View, ViewImage>, String> {
    let mut uploads = HashMap::new();

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let Some(view) = infer_view_from_filename(name) else {
            warn!("{}: cannot infer view from filename, skipping", name);
            continue;
        };
        if uploads.contains_key(&view) {
            warn!("{}: view {} already supplied, skipping", name, view);
            continue;
        }

        info!("{} -> {}", name, view);
        uploads.insert(view, prepare_image(path, resize)?);
    }

    Ok(uploads)
}

/// Builds the pipeline from process-wide client handles. The record
/// store degrades to "off" when it cannot be opened; the analysis
/// itself does not need it.
fn build_pipeline(config: &Config) -> solescan::Result<Pipeline> {
    let provider = Arc::new(GeminiClient::new(config)?);

    let blob_sink = config
        .uploads_dir
        .as_ref()
        .map(|dir| Arc::new(FsBlobStore::new(dir)) as Arc<dyn BlobSink>);

    let record_sink = match &config.database_path {
        Some(path) => match Database::open(path) {
            Ok(db) => Some(Arc::new(SqliteRecordStore::new(db)) as Arc<dyn RecordSink>),
            Err(e) => {
                warn!("record store unavailable, continuing without it: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(Pipeline::new(provider, blob_sink, record_sink))
}

fn summarize(run: u32, outcome: &solescan::RunOutcome) -> RunSummary {
    match &outcome.report {
        Some(report) => RunSummary {
            run,
            run_id: outcome.run_id.clone(),
            outsole_score: report.component_health.outsole.condition_score.to_string(),
            midsole_life: report
                .component_health
                .midsole
                .life_remaining_percentage
                .to_string(),
            km_left: report.verdict.estimated_km_left.clone(),
        },
        None => RunSummary {
            run,
            run_id: outcome.run_id.clone(),
            outsole_score: "Failed".to_string(),
            midsole_life: "Failed".to_string(),
            km_left: "Failed".to_string(),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let files = match gather_image_files(&args.input) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            eprintln!("Error: No image files found.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("found {} image(s)", files.len());

    let uploads = match build_uploads(&files, !args.no_resize) {
        Ok(uploads) => uploads,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut summaries = Vec::new();
    for run in 1..=args.times.max(1) {
        if !args.json_mode {
            println!("Run {}/{}", run, args.times.max(1));
        }

        let outcome = pipeline.run(uploads.clone()).await;

        if let Some(report) = &outcome.report {
            if !args.json_mode {
                match serde_json::to_string_pretty(report) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(e) => warn!("could not render report: {}", e),
                }
            }
        } else if let Some(message) = outcome.error_message() {
            if args.json_mode {
                info!("run {} failed: {}", run, message);
            } else {
                println!("Analysis failed: {}", message);
            }
        }

        summaries.push(summarize(run, &outcome));
    }

    let any_success = summaries.iter().any(|s| s.outsole_score != "Failed");

    if args.json_mode {
        match serde_json::to_string(&summaries) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Error: could not render summaries: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("\nSummary:");
        for s in &summaries {
            println!(
                "  run {}: id={} outsole={} midsole={} km_left={}",
                s.run, s.run_id, s.outsole_score, s.midsole_life, s.km_left
            );
        }
    }

    if any_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
