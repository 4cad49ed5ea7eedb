//! Period labels: a specific year-month, or an annual aggregate marker.
//!
//! Periods arrive as human-entered text (`"2026-01"`, `"2026 Yanvar"`,
//! `"2026 Yillik"`). Monthly labels normalize to a canonical `YYYY-MM` key;
//! annual markers have no canonical key and compare by raw label only, so
//! monthly and annual granularities coexist without false matches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Month names in fixed calendar order, compared case-insensitively.
const MONTHS: [&str; 12] = [
    "yanvar", "fevral", "mart", "aprel", "may", "iyun", "iyul", "avgust", "sentyabr", "oktyabr",
    "noyabr", "dekabr",
];

/// A filing period: the raw label plus a derived canonical key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period {
    raw: String,
}

impl Period {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The canonical `YYYY-MM` key, when the label denotes a single month.
    ///
    /// Annual markers and anything unparseable produce `None` — that is a
    /// signal that the period is not month-comparable, not an error.
    pub fn canonical(&self) -> Option<String> {
        let label = self.raw.trim();

        if is_canonical(label) {
            return Some(label.to_string());
        }

        let mut tokens = label.split_whitespace();
        let year = tokens.next()?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let rest = tokens.collect::<Vec<_>>().join(" ").to_lowercase();
        let month = MONTHS.iter().position(|m| *m == rest)?;
        Some(format!("{year}-{:02}", month + 1))
    }

    /// The key ledgers are stored under: canonical when present, else the
    /// raw label. `"2026 Yanvar"` and `"2026-01"` address the same ledger.
    pub fn key(&self) -> String {
        self.canonical().unwrap_or_else(|| self.raw.clone())
    }
}

/// Two periods are equal when both have canonical keys and the keys match,
/// or when neither does and the raw labels match exactly.
impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.raw == other.raw,
            _ => false,
        }
    }
}

impl Eq for Period {}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether the label is already `YYYY-MM` with a zero-padded month 01–12.
fn is_canonical(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit)
        || !bytes[5..].iter().all(u8::is_ascii_digit)
    {
        return false;
    }
    matches!(label[5..7].parse::<u8>(), Ok(1..=12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_label_passes_through() {
        assert_eq!(Period::new("2026-01").canonical().as_deref(), Some("2026-01"));
        assert_eq!(Period::new("2026-12").canonical().as_deref(), Some("2026-12"));
    }

    #[test]
    fn month_name_normalizes() {
        assert_eq!(
            Period::new("2026 Yanvar").canonical().as_deref(),
            Some("2026-01")
        );
        assert_eq!(
            Period::new("2026 DEKABR").canonical().as_deref(),
            Some("2026-12")
        );
    }

    #[test]
    fn annual_marker_has_no_canonical_key() {
        assert_eq!(Period::new("2026 Yillik").canonical(), None);
    }

    #[test]
    fn garbage_has_no_canonical_key() {
        assert_eq!(Period::new("").canonical(), None);
        assert_eq!(Period::new("January 2026").canonical(), None);
        assert_eq!(Period::new("2026-13").canonical(), None);
        assert_eq!(Period::new("2026-1").canonical(), None);
        assert_eq!(Period::new("26 Yanvar").canonical(), None);
    }

    #[test]
    fn monthly_labels_compare_by_canonical_key() {
        assert_eq!(Period::new("2026-01"), Period::new("2026 Yanvar"));
        assert_ne!(Period::new("2026-01"), Period::new("2026 Fevral"));
    }

    #[test]
    fn annual_labels_compare_by_raw_label() {
        assert_eq!(Period::new("2026 Yillik"), Period::new("2026 Yillik"));
        assert_ne!(Period::new("2026 Yillik"), Period::new("2025 Yillik"));
        assert_ne!(Period::new("2026 Yillik"), Period::new("2026-01"));
    }

    #[test]
    fn key_falls_back_to_raw_label() {
        assert_eq!(Period::new("2026 Yanvar").key(), "2026-01");
        assert_eq!(Period::new("2026 Yillik").key(), "2026 Yillik");
    }
}
