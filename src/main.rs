//! leafcheck CLI
//!
//! Diagnoses leaf photographs from the command line, one file or whole
//! directories at a time.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use walkdir::WalkDir;

use leafcheck::analyzer::is_supported_image;
use leafcheck::report::{format_diagnosis, BatchSummary};
use leafcheck::{ClassifierConfig, ClassifierMode, ImageSource, LeafClassifier};

/// Plant leaf health classifier
#[derive(Parser, Debug)]
#[command(name = "leafcheck")]
#[command(version)]
#[command(about = "Diagnose plant leaf photographs", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze images or directories of images
    Analyze {
        /// Image files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print results as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Distinguish specific diseases instead of healthy/diseased only
        #[arg(long, default_value = "false")]
        detailed: bool,

        /// Serialized model for the learned path
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Config file (defaults to the user config dir, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print per-category counts after the results
        #[arg(long, default_value = "false")]
        summary: bool,
    },

    /// List the knowledge base entries
    Knowledge {
        /// Config file (defaults to the user config dir, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            paths,
            json,
            detailed,
            model,
            config,
            summary,
        } => {
            let mut config = load_config(config.as_deref())?;
            if detailed {
                config.mode = ClassifierMode::Detailed;
            }
            if model.is_some() {
                config.model_path = model;
            }
            run_analyze(&config, &paths, json, summary)
        }
        Commands::Knowledge { config } => {
            let config = load_config(config.as_deref())?;
            let knowledge = config
                .knowledge_base()
                .context("Failed to load knowledge base")?;
            for (category, entry) in knowledge.iter() {
                println!("{} ({})", entry.name, category);
                println!("  {}", entry.description);
                println!("  Treatment:  {}", entry.treatment);
                println!("  Prevention: {}", entry.prevention);
                println!();
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => ClassifierConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => ClassifierConfig::load_default().context("Failed to load default config"),
    }
}

/// Expand directories into the supported images they contain, sorted.
fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            images.extend(found);
        } else {
            images.push(path.clone());
        }
    }
    images
}

fn run_analyze(
    config: &ClassifierConfig,
    paths: &[PathBuf],
    as_json: bool,
    show_summary: bool,
) -> Result<()> {
    let classifier = LeafClassifier::new(config).context("Failed to build classifier")?;

    let images = collect_images(paths);
    if images.is_empty() {
        bail!("No supported images found");
    }
    info!("Analyzing {} image(s)", images.len());

    let mut summary = BatchSummary::default();
    let mut results = Vec::with_capacity(images.len());

    for path in &images {
        match classifier.analyze(&ImageSource::from(path.as_path())) {
            Ok(diagnosis) => {
                summary.record(&diagnosis);
                if as_json {
                    results.push(json!({ "path": path, "diagnosis": diagnosis }));
                } else {
                    println!("{}", format_diagnosis(path, &diagnosis));
                }
            }
            Err(e) => {
                summary.record_failure();
                if as_json {
                    results.push(json!({ "path": path, "error": e.to_string() }));
                } else {
                    eprintln!("{}: {}", path.display(), e);
                }
            }
        }
    }

    if as_json {
        let mut output = json!({ "results": results });
        if show_summary {
            output["summary"] = serde_json::to_value(&summary)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if show_summary {
        print!("{}", summary.render());
    }

    if summary.analyzed == 0 {
        bail!("All {} image(s) failed to analyze", summary.failed);
    }
    Ok(())
}
