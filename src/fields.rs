use crate::config::Fields;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFields {
    pub identifier: String,
    pub name: String,
    /// True when the page did not have two non-empty lines and sentinels were used.
    pub fallback: bool,
}

/// Reads the certificate number and subject name from the first two non-empty lines.
///
/// Field values are taken as-is; only surrounding whitespace is trimmed. Pages with zero
/// or one non-empty line both get the configured sentinels.
pub fn parse_fields(cfg: &Fields, text: &str) -> PageFields {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    match (lines.next(), lines.next()) {
        (Some(identifier), Some(name)) => PageFields {
            identifier: normalize(cfg, identifier),
            name: normalize(cfg, name),
            fallback: false,
        },
        _ => PageFields {
            identifier: cfg.unknown_identifier.clone(),
            name: cfg.unknown_name.clone(),
            fallback: true,
        },
    }
}

fn normalize(cfg: &Fields, s: &str) -> String {
    if cfg.normalize_unicode {
        s.nfc().collect()
    } else {
        s.to_string()
    }
}
