use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x1f\x7f]"#).expect("static regex"));

/// How output base names are made unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `{name}_{identifier}_{page}_{grade}`; unique by page number. Writes a manifest.
    #[default]
    PageNumber,
    /// `{name}`, or `{name}_{count}` when the (name, identifier) pair repeats. No manifest.
    DuplicateOrdinal,
}

impl NamingPolicy {
    pub fn writes_manifest(self) -> bool {
        matches!(self, NamingPolicy::PageNumber)
    }
}

/// Replaces characters that are illegal in Windows file names (and ASCII controls) with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    FORBIDDEN.replace_all(name, "_").into_owned()
}

/// Per-run occurrence counter keyed on the (name, identifier) pair.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    counts: HashMap<(String, String), u32>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more sighting and returns the occurrence count including it.
    pub fn observe(&mut self, name: &str, identifier: &str) -> u32 {
        let n = self
            .counts
            .entry((name.to_string(), identifier.to_string()))
            .or_insert(0);
        *n += 1;
        *n
    }
}

/// Builds sanitized base names (without extension) and guarantees they never repeat in a run.
#[derive(Debug)]
pub struct NameBuilder {
    policy: NamingPolicy,
    used: HashSet<String>,
}

impl NameBuilder {
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            used: HashSet::new(),
        }
    }

    pub fn policy(&self) -> NamingPolicy {
        self.policy
    }

    pub fn build(
        &mut self,
        name: &str,
        identifier: &str,
        page_number: u32,
        grade_label: &str,
        occurrence: u32,
    ) -> String {
        let base = match self.policy {
            NamingPolicy::PageNumber => {
                sanitize_file_name(&format!("{name}_{identifier}_{page_number}_{grade_label}"))
            }
            NamingPolicy::DuplicateOrdinal => sanitize_file_name(name),
        };
        let mut n = occurrence.max(1);
        let mut candidate = match self.policy {
            NamingPolicy::DuplicateOrdinal if n > 1 => format!("{base}_{n}"),
            _ => base.clone(),
        };

        // Sanitization or a shared name across different identifiers can still collide;
        // retries count up from the unsuffixed base.
        while self.used.contains(&candidate.to_lowercase()) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }
}
