//! Company identity resolution for snapshot records.
//!
//! External rosters name companies loosely: quoted, suffixed with legal
//! forms in two languages, inconsistently spaced. A record is resolved
//! through a fixed chain, first hit wins:
//!
//! 1. Non-empty tax-id, compared exactly against each company's tax-id.
//! 2. Normalized name, compared exactly against each company's normalized
//!    name. No partial or substring matching.
//!
//! Name-based resolutions are logged at info level: suffix-stripping across
//! languages is heuristic, and a logged trail is what makes false-positive
//! merges auditable after the fact. A miss is the caller's to count — it is
//! a data-quality signal, never a fatal error.

use log::info;

use crate::model::Company;

/// Legal-entity suffix tokens dropped during name normalization.
/// Uzbek and Russian abbreviations for LLC / private enterprise.
const LEGAL_SUFFIXES: [&str; 6] = ["mchj", "xk", "ooo", "ооо", "чп", "ип"];

/// Characters stripped outright before tokenizing.
const QUOTE_CHARS: [char; 8] = ['"', '\'', '«', '»', '“', '”', '‘', '’'];

/// Normalize a company name for exact comparison: lowercase, strip quotes,
/// drop legal-entity suffix tokens, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let unquoted: String = lowered.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    unquoted
        .split_whitespace()
        .filter(|token| !LEGAL_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve one external record to a company in the directory.
///
/// Returns `None` when neither the tax-id nor the normalized name matches;
/// the caller counts misses and surfaces them as a data-quality metric.
pub fn match_company<'a>(
    companies: &'a [Company],
    tax_id: Option<&str>,
    name: &str,
) -> Option<&'a Company> {
    if let Some(tax_id) = tax_id.map(str::trim).filter(|t| !t.is_empty())
        && let Some(company) = companies.iter().find(|c| c.tax_id() == Some(tax_id))
    {
        return Some(company);
    }

    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }
    let company = companies
        .iter()
        .find(|c| normalize_name(&c.name) == normalized)?;
    info!(
        "matched company {} by name: '{}' ~ '{}'",
        company.id, name, company.name
    );
    Some(company)
}
