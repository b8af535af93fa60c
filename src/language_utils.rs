/*!
 * Language utilities for ISO language code handling
 *
 * This module provides human-readable names for the language codes the
 * voice table understands, and the catalog served to clients.
 */

use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::voices::{self, normalize_code};

/// One supported language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    /// Code as accepted in requests, e.g. `fr` or `en-gb`
    pub code: String,
    /// English name, e.g. `English (GB)`
    pub name: String,
    /// Synthesizer voice used for this language
    pub voice: String,
}

static CATALOG: Lazy<Vec<LanguageInfo>> = Lazy::new(|| {
    voices::supported_codes()
        .into_iter()
        .map(|code| LanguageInfo {
            code: code.to_string(),
            name: get_display_name(code),
            voice: voices::resolve_voice(code).to_string(),
        })
        .collect()
});

/// Every supported language, sorted by code
pub fn language_catalog() -> &'static [LanguageInfo] {
    &CATALOG
}

/// Get the language name from an ISO 639-1 or ISO 639-3 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let lang = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    // isolang qualifies some names, e.g. "Modern Greek (1453-)"
    let name = lang.to_name();
    let short = match name.find(" (") {
        Some(idx) if !name.starts_with("Modern ") => &name[..idx],
        Some(idx) => name[..idx].trim_start_matches("Modern "),
        None => name,
    };
    Ok(short.to_string())
}

/// Name for a possibly regional code such as `en-GB`, falling back to the code itself
pub fn get_display_name(code: &str) -> String {
    let normalized = normalize_code(code);
    let mut parts = normalized.splitn(2, '-');
    let base = parts.next().unwrap_or_default();
    let region = parts.next();

    match (get_language_name(base), region) {
        (Ok(name), Some(region)) if !region.is_empty() => format!("{} ({})", name, region.to_uppercase()),
        (Ok(name), _) => name,
        (Err(_), _) => code.trim().to_string(),
    }
}

/// Whether two codes name the same language variant
pub fn same_language(code1: &str, code2: &str) -> bool {
    normalize_code(code1) == normalize_code(code2)
}
