//! V2Themes splitting and ESG categorization.

use esgsense_core::{CategoryCounts, EsgCategory};

/// Split a `;`-delimited theme string into trimmed, non-empty tokens.
pub fn extract_themes(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count themes per category. Each token lands in at most one category: the
/// first (in declaration order) owning a keyword contained in the token.
pub fn categorize<S: AsRef<str>>(themes: &[S]) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    for theme in themes {
        if let Some(category) = EsgCategory::classify(theme.as_ref()) {
            counts.increment(category);
        }
    }
    counts
}
