use crate::{
    config::{Config, OutputFormat},
    extract::{PageSource, SourceDocument},
    naming::NamingPolicy,
    pipeline::{Pipeline, RunOptions},
    record::RecordBuilder,
    report::RunSummary,
    util::{date_or_utc, ensure_dir, hash_file, local_date},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use time::Date;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "cert-splitter")]
#[command(about = "Split a multi-page certificate PDF into named per-page files, a zip, and a manifest")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./cert-splitter.toml if present, else defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split the PDF and write page files, the archive, and the manifest.
    ///
    /// Naming `page-number` produces `{name}_{cert}_{page}_{grade}.pdf` plus a manifest
    /// `{grade}_{YYYYMMDD}_{first}-{last}.txt`. Naming `duplicate-ordinal` produces
    /// `{name}.pdf` / `{name}_{n}.pdf` and no manifest.
    Split {
        #[arg(long)]
        input: PathBuf,
        /// Destination directory; created if missing. Defaults to paths.out_dir, then ~/Downloads.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Grade label, one of the configured presets or "Other".
        #[arg(long)]
        grade: Option<String>,
        /// Custom label used when --grade is "Other".
        #[arg(long)]
        other_grade: Option<String>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long, value_enum)]
        naming: Option<NamingPolicy>,
    },
    /// Print the record each page would produce without writing anything.
    Inspect {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        other_grade: Option<String>,
        #[arg(long, value_enum)]
        naming: Option<NamingPolicy>,
    },
    /// List the configured grade presets.
    Grades {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    // Must run while the process is still single-threaded.
    let local = local_date();
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Split {
            input,
            out_dir,
            grade,
            other_grade,
            format,
            naming,
        } => {
            let grade_label = cfg.grades.resolve(grade.as_deref(), other_grade.as_deref());
            let out_dir = out_dir.clone().unwrap_or_else(|| cfg.paths.resolve_out_dir());
            let format = format.unwrap_or(cfg.output.format);
            let naming = naming.unwrap_or(cfg.naming.policy);
            let date = date_or_utc(local);
            split(&cfg, input, &out_dir, &grade_label, format, naming, date)
        }
        Command::Inspect {
            input,
            grade,
            other_grade,
            naming,
        } => {
            let grade_label = cfg.grades.resolve(grade.as_deref(), other_grade.as_deref());
            inspect(&cfg, input, &grade_label, naming.unwrap_or(cfg.naming.policy))
        }
        Command::Grades {} => {
            let mut grades = cfg.grades.known.clone();
            grades.push(crate::config::Grades::OTHER.to_string());
            println!("{}", serde_json::to_string_pretty(&grades)?);
            Ok(())
        }
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from("cert-splitter.toml");
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the JSON summary, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            ensure_dir(parent)?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("cert-splitter.log"))
}

fn split(
    cfg: &Config,
    input: &Path,
    out_dir: &Path,
    grade_label: &str,
    format: OutputFormat,
    naming: NamingPolicy,
    date: Date,
) -> Result<()> {
    validate_input(cfg, input)?;

    let source = SourceDocument::open(input, &cfg.limits)?;
    let source_sha256 = if cfg.global.hash_source {
        Some(hash_file(input).with_context(|| format!("hashing input: {}", input.display()))?)
    } else {
        None
    };

    let opts = RunOptions {
        destination: out_dir.to_path_buf(),
        grade_label: grade_label.to_string(),
        write_files: format.write_files(),
        write_archive: format.write_archive(),
        naming,
        date,
    };
    let result = Pipeline::new(cfg, source)
        .run(&opts)
        .with_context(|| format!("splitting {}", input.display()))?;

    if opts.write_files {
        info!("PDF files saved in {}", out_dir.display());
    }
    if let Some(zip) = &result.archive_path {
        info!("ZIP created at {}", zip.display());
    }

    if cfg.global.print_summary {
        let summary = RunSummary {
            source: input.to_path_buf(),
            source_sha256,
            destination: out_dir.to_path_buf(),
            grade_label: grade_label.to_string(),
            pages: result.page_count(),
            fallback_pages: result.records.iter().filter(|r| r.fallback).count(),
            page_paths: result.page_paths.clone(),
            archive_path: result.archive_path.clone(),
            manifest_path: result.manifest_path.clone(),
            status: "ok".into(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn inspect(cfg: &Config, input: &Path, grade_label: &str, naming: NamingPolicy) -> Result<()> {
    validate_input(cfg, input)?;

    let source = SourceDocument::open(input, &cfg.limits)?;
    let mut builder = RecordBuilder::new(&cfg.fields, grade_label, naming);
    let mut records = Vec::new();
    for page in source.pages() {
        let page = page?;
        records.push(builder.build(page.page_index, &page.text));
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "grade_label": grade_label,
            "naming": naming,
            "records": records,
        }))?
    );
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if !ext.eq_ignore_ascii_case("pdf") => {
            warn!("input does not have a .pdf extension: {}", input.display());
        }
        Some(_) => {}
        None => warn!("input has no extension; assuming PDF: {}", input.display()),
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
