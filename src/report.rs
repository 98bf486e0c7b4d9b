use crate::record::PageRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one split run. Owned by the caller once returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Page files actually written to disk, in source order. Empty when files were not requested.
    pub page_paths: Vec<PathBuf>,
    pub archive_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub records: Vec<PageRecord>,
}

impl RunResult {
    pub fn page_count(&self) -> usize {
        self.records.len()
    }

    /// Every generated file name, whether or not it was written as a standalone file.
    pub fn file_names(&self) -> Vec<String> {
        self.records.iter().map(PageRecord::file_name).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
    pub destination: PathBuf,
    pub grade_label: String,
    pub pages: usize,
    pub fallback_pages: usize,
    pub page_paths: Vec<PathBuf>,
    pub archive_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub status: String,
}
