//! Column classification: each column index gets exactly one semantic
//! tag. Header keywords are checked first; columns that remain get
//! classified from the distribution of their data values.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::model::ColumnTag;
use crate::normalize::{detect_maturity_scale, is_maturity_number, normalize_raci};

static DELTA_KEYWORDS: &[&str] = &[
    "delta", "uplift", "gap", "δ", "diff", "difference", "variance", "change", "improvement",
];
static STATUS_KEYWORDS: &[&str] = &["status", "state", "fill", "progress", "completion"];
static PRIORITY_KEYWORDS: &[&str] = &["priority", "prio", "importance", "urgency", "rank", "weight"];
static ID_KEYWORDS: &[&str] = &["id", "#", "no", "number", "ref", "reference", "code", "key"];
static ID_EXACT: &[&str] = &["#", "id", "no", "no.", "ref", "ref.", "key"];

static DESCRIPTION_KEYWORDS: &[&str] = &[
    "desc",
    "description",
    "details",
    "notes",
    "comment",
    "explanation",
    "definition",
    "summary",
    "scope",
];
static CATEGORY_KEYWORDS: &[&str] = &[
    "category",
    "domain",
    "area",
    "group",
    "pillar",
    "section",
    "phase",
    "stream",
    "workstream",
    "department",
    "team",
    "module",
    "tower",
    "theme",
    "bucket",
    "cluster",
];
static NAME_KEYWORDS: &[&str] = &[
    "capability",
    "name",
    "activity",
    "task",
    "function",
    "process",
    "item",
    "deliverable",
    "work package",
    "work item",
    "responsibility",
    "action",
    "objective",
    "requirement",
    "service",
    "control",
];
static TARGET_KEYWORDS: &[&str] = &[
    "target", "tgt", "future", "goal", "projected", "to-be", "to be", "desired", "planned",
    "expected", "with",
];

static PURELY_NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\d*$").unwrap());

/// Heuristic cutoffs for the data-distribution pass. The defaults are
/// tuned values with no derivation behind them, so they stay adjustable
/// rather than baked in.
#[derive(Debug, Clone)]
pub struct ClassifierThresholds {
    /// Fraction of values that must normalize to RACI.
    pub raci_fraction: f64,
    /// Fraction of values that must be ≤3 characters for a RACI column.
    pub short_value_fraction: f64,
    /// Fraction of values that must be maturity numbers.
    pub maturity_fraction: f64,
    /// Fraction of values that must be purely numeric alongside it.
    pub maturity_numeric_fraction: f64,
    /// Distinct-value ratio above which a text column reads as names.
    pub name_distinct_ratio: f64,
    /// Distinct-value ratio below which repeating labels read as a
    /// category column.
    pub category_distinct_ratio: f64,
    /// Average length and distinct ratio for a description column.
    pub description_avg_len: f64,
    pub description_distinct_ratio: f64,
    /// Numeric fraction above which a leftover column is skipped.
    pub numeric_skip_fraction: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        ClassifierThresholds {
            raci_fraction: 0.3,
            short_value_fraction: 0.3,
            maturity_fraction: 0.4,
            maturity_numeric_fraction: 0.4,
            name_distinct_ratio: 0.5,
            category_distinct_ratio: 0.3,
            description_avg_len: 30.0,
            description_distinct_ratio: 0.7,
            numeric_skip_fraction: 0.8,
        }
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Exact or separator-delimited match for id-tokens, so `no` never fires
/// inside `now`.
fn is_id_header(header: &str) -> bool {
    if ID_EXACT.contains(&header) {
        return true;
    }
    let is_sep = |c: char| c.is_whitespace() || matches!(c, '.' | '_' | '#' | '-');
    for kw in ID_KEYWORDS {
        if header == *kw {
            return true;
        }
        if let Some(rest) = header.strip_prefix(kw) {
            if rest.starts_with(is_sep) {
                return true;
            }
        }
        if let Some(rest) = header.strip_suffix(kw) {
            if !rest.is_empty() && rest.chars().all(is_sep) {
                return true;
            }
        }
    }
    false
}

/// Per-column value statistics for the data-distribution pass.
struct ColumnStats {
    total: usize,
    raci_fraction: f64,
    maturity_fraction: f64,
    distinct_ratio: f64,
    avg_len: f64,
    numeric_fraction: f64,
}

fn column_stats(values: &[&str]) -> ColumnStats {
    let total = values.len();
    if total == 0 {
        return ColumnStats {
            total: 0,
            raci_fraction: 0.0,
            maturity_fraction: 0.0,
            distinct_ratio: 1.0,
            avg_len: 0.0,
            numeric_fraction: 0.0,
        };
    }
    let n = total as f64;
    let raci = values.iter().filter(|v| normalize_raci(v).is_some()).count();
    let maturity = values.iter().filter(|v| is_maturity_number(v, 100)).count();
    let distinct = values
        .iter()
        .map(|v| v.to_lowercase())
        .collect::<HashSet<_>>()
        .len();
    let len_sum: usize = values.iter().map(|v| v.chars().count()).sum();
    let numeric = values.iter().filter(|v| PURELY_NUMERIC_RE.is_match(v)).count();

    ColumnStats {
        total,
        raci_fraction: raci as f64 / n,
        maturity_fraction: maturity as f64 / n,
        distinct_ratio: distinct as f64 / n,
        avg_len: len_sum as f64 / n,
        numeric_fraction: numeric as f64 / n,
    }
}

/// Classify every column of the grid. `headers` is the header row,
/// `data_rows` everything below the sub-headers. Total: each in-range
/// column index comes back with exactly one tag.
pub fn classify_columns(
    headers: &[String],
    data_rows: &[Vec<String>],
    thresholds: &ClassifierThresholds,
) -> BTreeMap<usize, ColumnTag> {
    let num_cols = headers.len();
    let mut tags: BTreeMap<usize, ColumnTag> = BTreeMap::new();

    let header_lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    // Pass 1: header keywords, in precedence order. First hit wins.
    for (ci, hl) in header_lower.iter().enumerate() {
        if hl.is_empty() {
            continue;
        }
        let tag = if contains_any(hl, DELTA_KEYWORDS) {
            Some(ColumnTag::Delta)
        } else if contains_any(hl, STATUS_KEYWORDS) {
            Some(ColumnTag::Status)
        } else if contains_any(hl, PRIORITY_KEYWORDS) {
            Some(ColumnTag::Priority)
        } else if is_id_header(hl) {
            Some(ColumnTag::Id)
        } else {
            None
        };
        if let Some(tag) = tag {
            debug!(col = ci, header = %hl, tag = tag.as_str(), "classified by header keyword");
            tags.insert(ci, tag);
        }
    }

    // Pass 2: data distribution for everything still unresolved.
    let mut name_found = false;
    let mut desc_found = false;

    for ci in 0..num_cols {
        if tags.contains_key(&ci) {
            continue;
        }
        let hl = header_lower[ci].as_str();
        let values: Vec<&str> = data_rows
            .iter()
            .filter_map(|row| row.get(ci))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        let stats = column_stats(&values);

        if stats.total == 0 {
            tags.insert(ci, ColumnTag::Empty);
            continue;
        }

        // RACI columns hold mostly short letter codes; a numeric 1-5
        // column can clear the fraction test without clearing this one.
        if stats.raci_fraction > thresholds.raci_fraction {
            let short = values.iter().filter(|v| v.chars().count() <= 3).count();
            if short as f64 / stats.total as f64 > thresholds.short_value_fraction {
                tags.insert(ci, ColumnTag::Raci);
                continue;
            }
        }

        let tag = if stats.maturity_fraction > thresholds.maturity_fraction
            && stats.numeric_fraction > thresholds.maturity_numeric_fraction
        {
            let (scale, pct) = detect_maturity_scale(values.iter().copied());
            debug!(col = ci, scale, pct, "maturity-like column");
            let is_target = contains_any(hl, TARGET_KEYWORDS);
            let now_taken = tags.values().any(|t| *t == ColumnTag::MaturityNow);
            if is_target || now_taken {
                ColumnTag::MaturityTarget
            } else {
                ColumnTag::MaturityNow
            }
        } else if contains_any(hl, DESCRIPTION_KEYWORDS) {
            desc_found = true;
            ColumnTag::Description
        } else if contains_any(hl, CATEGORY_KEYWORDS) {
            ColumnTag::Category
        } else if contains_any(hl, NAME_KEYWORDS) {
            name_found = true;
            ColumnTag::Name
        } else if !name_found
            && stats.avg_len > 3.0
            && stats.distinct_ratio > thresholds.name_distinct_ratio
            && stats.numeric_fraction < 0.5
        {
            // First diverse text column anchors the capability names,
            // unless its labels repeat enough to look like grouping.
            if stats.distinct_ratio < thresholds.category_distinct_ratio && stats.total > 5 {
                ColumnTag::Category
            } else {
                name_found = true;
                ColumnTag::Name
            }
        } else if !desc_found
            && stats.avg_len > thresholds.description_avg_len
            && stats.distinct_ratio > thresholds.description_distinct_ratio
        {
            desc_found = true;
            ColumnTag::Description
        } else if stats.distinct_ratio < thresholds.category_distinct_ratio && stats.total > 3 {
            ColumnTag::Category
        } else if stats.numeric_fraction > thresholds.numeric_skip_fraction {
            ColumnTag::NumericSkip
        } else {
            ColumnTag::Unknown
        };
        debug!(col = ci, header = %hl, tag = tag.as_str(), "classified by data distribution");
        tags.insert(ci, tag);
    }

    // The extractor anchors on a name column, so guarantee one exists:
    // first unknown column, else column 0.
    if !tags.values().any(|t| *t == ColumnTag::Name) {
        let fallback = (0..num_cols).find(|ci| tags.get(ci) == Some(&ColumnTag::Unknown));
        match fallback {
            Some(ci) => {
                warn!(col = ci, "no name column detected; using first unknown column");
                tags.insert(ci, ColumnTag::Name);
            }
            None if num_cols > 0 => {
                warn!("no name column detected; using column 0");
                tags.insert(0, ColumnTag::Name);
            }
            None => {}
        }
    }

    tags
}
