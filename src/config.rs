use crate::naming::NamingPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub grades: Grades,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub print_summary: bool,
    /// Include a sha256 of the source PDF in the printed summary.
    pub hash_source: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
            hash_source: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paths {
    /// Destination when `--out-dir` is not given. Empty means `~/Downloads`.
    pub out_dir: String,
}

impl Paths {
    pub fn resolve_out_dir(&self) -> PathBuf {
        if !self.out_dir.is_empty() {
            return PathBuf::from(&self.out_dir);
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join("Downloads")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grades {
    pub known: Vec<String>,
    /// Label used when the grade is "Other" and no custom label was given.
    pub fallback: String,
}
impl Default for Grades {
    fn default() -> Self {
        Self {
            known: [
                "MUN MAZHALAI",
                "MAZHALAI",
                "Nilai 1",
                "Nilai 2",
                "Nilai 3",
                "Nilai 4",
                "Nilai 5",
                "Nilai 6",
                "Nilai 7",
                "Nilai 8",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            fallback: "UnknownGrade".into(),
        }
    }
}

impl Grades {
    pub const OTHER: &'static str = "Other";

    /// Turns the picker selection into the label stamped on every file of a run.
    ///
    /// `Other` takes the trimmed custom label; an empty result becomes `fallback`.
    pub fn resolve(&self, selected: Option<&str>, other: Option<&str>) -> String {
        let selected = selected.map(str::trim).unwrap_or_default();
        let label = if selected == Self::OTHER {
            other.map(str::trim).unwrap_or_default()
        } else {
            selected
        };

        if label.is_empty() {
            return self.fallback.clone();
        }
        if selected != Self::OTHER && !self.known.iter().any(|g| g == label) {
            warn!("grade {label:?} is not in the configured list; using it as given");
        }
        label.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Naming {
    pub policy: NamingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fields {
    pub unknown_identifier: String,
    pub unknown_name: String,
    pub normalize_unicode: bool,
}
impl Default for Fields {
    fn default() -> Self {
        Self {
            unknown_identifier: "unknown_cert".into(),
            unknown_name: "unknown_name".into(),
            normalize_unicode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Pdf,
    Zip,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn write_files(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }

    pub fn write_archive(self) -> bool {
        matches!(self, OutputFormat::Zip | OutputFormat::Both)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub format: OutputFormat,
    pub archive_filename: String,
    pub write_manifest: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Both,
            archive_filename: "certificates.zip".into(),
            write_manifest: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 512 * 1024 * 1024,
            max_input_pages: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
