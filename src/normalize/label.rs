use once_cell::sync::Lazy;
use regex::Regex;

/// Role headers containing one of these indicate an unfilled position.
static UNFILLED_KEYWORDS: &[&str] = &[
    "open", "unfilled", "vacant", "★", "tbd", "tbc", "hire", "needed", "new",
];

/// Row names that mark a summary/aggregate row rather than a capability.
static SUMMARY_ROW_KEYWORDS: &[&str] = &[
    "average",
    "avg",
    "total",
    "sum",
    "count",
    "mean",
    "median",
    "grand total",
    "subtotal",
    "sub-total",
    "summary",
    "category average",
    "section total",
];

/// Category names that mark a footer/legend/summary section.
static SUMMARY_CATEGORY_KEYWORDS: &[&str] = &[
    "average",
    "avg",
    "total",
    "sum",
    "count",
    "legend",
    "key",
    "summary",
    "appendix",
    "reference",
    "notes",
    "glossary",
    "responsible (r)",
    "accountable (a)",
    "consulted (c)",
    "informed (i)",
    "raci legend",
    "raci key",
    "raci count",
    "count by role",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]*|[a-z]+").unwrap());
static NUMBER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.):\-]\s*").unwrap());
static LETTER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][.)]\s*").unwrap());
static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•●○◦▪▸►→–—]\s*").unwrap());

/// Snake_case identifier derived from a display label.
pub fn make_id(label: &str) -> String {
    let kept: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Derive a short display code from a role label: short labels pass
/// through uppercased, multi-word labels try initials, then leading
/// consonants, then the first four characters.
pub fn make_short_code(label: &str) -> String {
    let label = label.trim();
    if label.chars().count() <= 5 {
        return label.to_uppercase();
    }

    let words: Vec<&str> = WORD_RE.find_iter(label).map(|m| m.as_str()).collect();
    if words.len() >= 2 {
        let initials: String = words
            .iter()
            .filter_map(|w| w.chars().next())
            .filter(|c| c.is_alphabetic())
            .collect();
        let n = initials.chars().count();
        if (2..=5).contains(&n) {
            return initials.to_uppercase();
        }
    }

    let consonants: String = label
        .chars()
        .filter(|c| {
            (c.is_ascii_alphanumeric() || *c == '_')
                && !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
        })
        .collect();
    if consonants.chars().count() >= 3 {
        return consonants.chars().take(4).collect::<String>().to_uppercase();
    }

    label.chars().take(4).collect::<String>().to_uppercase()
}

/// Whether a role header names an unfilled position.
pub fn detect_unfilled(header: &str) -> bool {
    let h = header.to_lowercase();
    UNFILLED_KEYWORDS.iter().any(|kw| h.contains(kw))
}

pub fn is_summary_row(name: &str) -> bool {
    let lower = name.to_lowercase();
    let lower = lower.trim();
    SUMMARY_ROW_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub fn is_summary_category(name: &str) -> bool {
    let lower = name.to_lowercase();
    let lower = lower.trim();
    SUMMARY_CATEGORY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Strip a leading numbering or bullet prefix from a category name:
/// "1. Strategy" → "Strategy", "a) Ops" → "Ops". Falls back to the
/// trimmed input if stripping would leave nothing.
pub fn strip_numbering(name: &str) -> String {
    let trimmed = name.trim();
    let s = NUMBER_PREFIX_RE.replace(trimmed, "");
    let s = LETTER_PREFIX_RE.replace(&s, "");
    let s = BULLET_PREFIX_RE.replace(&s, "");
    let out = s.trim();
    if out.is_empty() {
        trimmed.to_string()
    } else {
        out.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_snake_case() {
        assert_eq!(make_id("Product Manager"), "product_manager");
        assert_eq!(make_id("QA / Test"), "qa_test");
        assert_eq!(make_id("  Dev Ops  "), "dev_ops");
    }

    #[test]
    fn short_codes() {
        // short labels pass through
        assert_eq!(make_short_code("PM"), "PM");
        assert_eq!(make_short_code("dev"), "DEV");
        // initials for multi-word labels
        assert_eq!(make_short_code("Product Manager"), "PM");
        assert_eq!(make_short_code("Quality Assurance Lead"), "QAL");
        // consonants when initials do not fit
        assert_eq!(make_short_code("Engineering"), "NGNR");
    }

    #[test]
    fn unfilled_detection() {
        assert!(detect_unfilled("Architect (TBD)"));
        assert!(detect_unfilled("Open Position"));
        assert!(detect_unfilled("New Hire"));
        assert!(!detect_unfilled("Product Manager"));
    }

    #[test]
    fn summary_rows_and_categories() {
        assert!(is_summary_row("TOTAL"));
        assert!(is_summary_row("Category Average"));
        assert!(!is_summary_row("Design API"));

        assert!(is_summary_category("RACI Legend"));
        assert!(is_summary_category("Appendix"));
        assert!(!is_summary_category("Strategy"));
    }

    #[test]
    fn numbering_prefixes_are_stripped() {
        assert_eq!(strip_numbering("1. Strategy"), "Strategy");
        assert_eq!(strip_numbering("2) Operations"), "Operations");
        assert_eq!(strip_numbering("a) Governance"), "Governance");
        assert_eq!(strip_numbering("• Delivery"), "Delivery");
        assert_eq!(strip_numbering("Plain"), "Plain");
        // stripping everything falls back to the original
        assert_eq!(strip_numbering("1."), "1.");
    }
}
