use crate::{
    config::Config,
    error::{Result, SplitError},
    extract::{PageSource, SourceDocument},
    naming::NamingPolicy,
    package::{self, ArchiveWriter},
    record::RecordBuilder,
    report::RunResult,
    util::today_local,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use time::Date;
use tracing::{debug, info};

/// Per-invocation parameters. Nothing here is read from ambient state.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub destination: PathBuf,
    pub grade_label: String,
    pub write_files: bool,
    pub write_archive: bool,
    pub naming: NamingPolicy,
    /// Date stamped into the manifest name.
    pub date: Date,
}

pub struct Pipeline<S: PageSource> {
    cfg: Config,
    source: S,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(cfg: &Config, source: S) -> Self {
        Self {
            cfg: cfg.clone(),
            source,
        }
    }

    pub fn run(&self, opts: &RunOptions) -> Result<RunResult> {
        let started = Instant::now();
        let dest = opts.destination.as_path();

        std::fs::create_dir_all(dest).map_err(|source| SplitError::DestinationError {
            path: dest.to_path_buf(),
            source,
        })?;

        info!(
            "split pages={} dest={} grade={:?} naming={:?} files={} archive={}",
            self.source.page_count(),
            dest.display(),
            opts.grade_label,
            opts.naming,
            opts.write_files,
            opts.write_archive
        );

        let mut builder = RecordBuilder::new(&self.cfg.fields, &opts.grade_label, opts.naming);
        let mut archive = if opts.write_archive {
            Some(ArchiveWriter::create(dest, &self.cfg.output.archive_filename)?)
        } else {
            None
        };

        let mut result = RunResult::default();

        for page in self.source.pages() {
            let page = page?;
            let record = builder.build(page.page_index, &page.text);
            let file_name = record.file_name();
            debug!(
                "page {} -> {} (ordinal {})",
                record.page_number(),
                file_name,
                record.duplicate_ordinal
            );

            if opts.write_files {
                let path = package::write_page_file(
                    dest,
                    &file_name,
                    record.page_number(),
                    &page.pdf_bytes,
                )?;
                result.page_paths.push(path);
            }
            if let Some(archive) = archive.as_mut() {
                archive.add(&file_name, &page.pdf_bytes)?;
            }

            result.records.push(record);
        }

        if let Some(archive) = archive {
            let entries = archive.entries();
            let path = archive.finish()?;
            info!("archive {} entries={}", path.display(), entries);
            result.archive_path = Some(path);
        }

        result.manifest_path = self.write_manifest(dest, opts, &result)?;

        info!(
            "split done pages={} written={} elapsed_ms={}",
            result.page_count(),
            result.page_paths.len(),
            started.elapsed().as_millis()
        );
        Ok(result)
    }

    fn write_manifest(
        &self,
        dest: &Path,
        opts: &RunOptions,
        result: &RunResult,
    ) -> Result<Option<PathBuf>> {
        let wrote_anything = opts.write_files || opts.write_archive;
        if !self.cfg.output.write_manifest || !opts.naming.writes_manifest() || !wrote_anything {
            return Ok(None);
        }
        let (Some(first), Some(last)) = (result.records.first(), result.records.last()) else {
            return Ok(None);
        };

        let name = package::manifest_file_name(
            &opts.grade_label,
            opts.date,
            &first.identifier,
            &last.identifier,
        );
        let path = package::write_manifest(dest, &name, &result.file_names())?;
        info!("manifest {}", path.display());
        Ok(Some(path))
    }
}

/// Splits `source_path` into `destination_dir` using page-number naming and today's date.
///
/// `grade_label` is used verbatim; substituting a fallback for an empty label is the
/// caller's job.
pub fn run_split(
    source_path: &Path,
    destination_dir: &Path,
    grade_label: &str,
    write_files: bool,
    write_archive: bool,
) -> Result<RunResult> {
    let cfg = Config::default();
    let source = SourceDocument::open(source_path, &cfg.limits)?;
    let opts = RunOptions {
        destination: destination_dir.to_path_buf(),
        grade_label: grade_label.to_string(),
        write_files,
        write_archive,
        naming: NamingPolicy::PageNumber,
        date: today_local(),
    };
    Pipeline::new(&cfg, source).run(&opts)
}
