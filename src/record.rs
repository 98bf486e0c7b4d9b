use crate::config::Fields;
use crate::fields::parse_fields;
use crate::naming::{DuplicateTracker, NameBuilder, NamingPolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_index: u32,
    pub raw_text: String,
    pub identifier: String,
    pub name: String,
    pub grade_label: String,
    pub output_base_name: String,
    pub duplicate_ordinal: u32,
    pub fallback: bool,
}

impl PageRecord {
    pub fn page_number(&self) -> u32 {
        self.page_index + 1
    }

    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.output_base_name)
    }
}

/// Turns page text into named records. One builder per run; its counters never outlive it.
pub struct RecordBuilder {
    fields: Fields,
    grade_label: String,
    tracker: DuplicateTracker,
    names: NameBuilder,
}

impl RecordBuilder {
    pub fn new(fields: &Fields, grade_label: &str, policy: NamingPolicy) -> Self {
        Self {
            fields: fields.clone(),
            grade_label: grade_label.to_string(),
            tracker: DuplicateTracker::new(),
            names: NameBuilder::new(policy),
        }
    }

    pub fn policy(&self) -> NamingPolicy {
        self.names.policy()
    }

    pub fn build(&mut self, page_index: u32, raw_text: &str) -> PageRecord {
        let parsed = parse_fields(&self.fields, raw_text);
        if parsed.fallback {
            warn!(
                "page {}: fewer than two text lines, using {}/{}",
                page_index + 1,
                parsed.identifier,
                parsed.name
            );
        }

        let duplicate_ordinal = self.tracker.observe(&parsed.name, &parsed.identifier);
        let output_base_name = self.names.build(
            &parsed.name,
            &parsed.identifier,
            page_index + 1,
            &self.grade_label,
            duplicate_ordinal,
        );

        PageRecord {
            page_index,
            raw_text: raw_text.to_string(),
            identifier: parsed.identifier,
            name: parsed.name,
            grade_label: self.grade_label.clone(),
            output_base_name,
            duplicate_ordinal,
            fallback: parsed.fallback,
        }
    }
}
