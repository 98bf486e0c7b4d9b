use crate::error::{Result, SplitError};
use crate::naming::sanitize_file_name;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::Date;
use tracing::debug;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

pub fn write_page_file(
    dest: &Path,
    file_name: &str,
    page_number: u32,
    bytes: &[u8],
) -> Result<PathBuf> {
    let path = dest.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| SplitError::WriteError {
        path: path.clone(),
        page_number,
        source,
    })?;
    debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Zip archive built in a temp file next to its final location.
///
/// The archive only appears under its real name after [`ArchiveWriter::finish`]; if the
/// writer is dropped early the temp file is removed with it.
pub struct ArchiveWriter {
    final_path: PathBuf,
    zip: ZipWriter<NamedTempFile>,
    entries: usize,
}

impl ArchiveWriter {
    pub fn create(dest: &Path, file_name: &str) -> Result<Self> {
        let final_path = dest.join(file_name);
        let tmp = tempfile::Builder::new()
            .prefix(".cert-splitter-")
            .suffix(".zip.part")
            .tempfile_in(dest)
            .map_err(|e| {
                SplitError::archive(&final_path, "create temp file", Some(Box::new(e)))
            })?;
        Ok(Self {
            final_path,
            zip: ZipWriter::new(tmp),
            entries: 0,
        })
    }

    pub fn add(&mut self, entry_name: &str, bytes: &[u8]) -> Result<()> {
        let options =
            FileOptions::<'_, ()>::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(entry_name, options).map_err(|e| {
            SplitError::archive(
                &self.final_path,
                format!("start entry {entry_name}"),
                Some(Box::new(e)),
            )
        })?;
        self.zip.write_all(bytes).map_err(|e| {
            SplitError::archive(
                &self.final_path,
                format!("write entry {entry_name}"),
                Some(Box::new(e)),
            )
        })?;
        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn finish(self) -> Result<PathBuf> {
        let final_path = self.final_path;
        let tmp = self.zip.finish().map_err(|e| {
            SplitError::archive(&final_path, "finalize archive", Some(Box::new(e)))
        })?;
        tmp.persist(&final_path).map_err(|e| {
            SplitError::archive(&final_path, "persist archive", Some(Box::new(e.error)))
        })?;
        debug!("archive {} complete", final_path.display());
        Ok(final_path)
    }
}

pub fn date_stamp(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// `{grade}_{YYYYMMDD}_{first}-{last}.txt`, sanitized.
pub fn manifest_file_name(
    grade_label: &str,
    date: Date,
    first_id: &str,
    last_id: &str,
) -> String {
    let stem = format!("{grade_label}_{}_{first_id}-{last_id}", date_stamp(date));
    format!("{}.txt", sanitize_file_name(&stem))
}

pub fn write_manifest(dest: &Path, manifest_name: &str, file_names: &[String]) -> Result<PathBuf> {
    let path = dest.join(manifest_name);
    let mut body = String::new();
    for name in file_names {
        body.push_str(name);
        body.push('\n');
    }
    std::fs::write(&path, body).map_err(|source| SplitError::ManifestError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
