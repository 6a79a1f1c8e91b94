//! Header-row and sub-header detection. Density and numeric-content
//! heuristics, so merged title banners and metadata rows never win.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::grid::Grid;
use crate::normalize::{is_maturity_number, is_raci};

/// Rows to scan from the top before giving up on header detection.
pub const HEADER_SCAN_LIMIT: usize = 25;

/// At most this many rows below the header are considered sub-headers.
const SUBHEADER_SCAN_LIMIT: usize = 4;

static NUMERIC_LOOKING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d.,%]+$").unwrap());

fn non_empty_cells(grid: &Grid, row: usize) -> Vec<&str> {
    (0..grid.width())
        .map(|c| grid.cell(row, c))
        .filter(|v| !v.is_empty())
        .collect()
}

fn distinct_count(values: &[&str]) -> usize {
    values.iter().copied().collect::<HashSet<_>>().len()
}

/// Find the header row: the first row with at least 4 non-empty cells and
/// 3 distinct values where fewer than 60% of the values look purely
/// numeric. Merged title rows fail the distinctness test and data rows
/// fail the numeric test, which is why the checks are ordered this way.
///
/// Falls back to ≥3 non-empty/≥2 distinct, then the first non-empty row,
/// then row 0.
pub fn find_header_row(grid: &Grid, max_scan: usize) -> usize {
    let limit = grid.height().min(max_scan);

    for i in 0..limit {
        let cells = non_empty_cells(grid, i);
        if cells.len() >= 4 && distinct_count(&cells) >= 3 {
            let numeric = cells
                .iter()
                .filter(|v| NUMERIC_LOOKING_RE.is_match(v))
                .count();
            if (numeric as f64) / (cells.len() as f64) < 0.6 {
                debug!(row = i, "header row found");
                return i;
            }
        }
    }

    for i in 0..limit {
        let cells = non_empty_cells(grid, i);
        if cells.len() >= 3 && distinct_count(&cells) >= 2 {
            debug!(row = i, "header row found (relaxed density)");
            return i;
        }
    }

    for i in 0..limit {
        if !non_empty_cells(grid, i).is_empty() {
            return i;
        }
    }

    0
}

/// Result of scanning the rows directly below the header.
#[derive(Debug, Default)]
pub struct SubHeaderScan {
    /// Number of rows to skip before real data starts.
    pub skipped: usize,
    /// Cell content of the skipped rows, keyed by column index. Later
    /// rows overwrite earlier ones; single-character cells are ignored.
    pub labels: HashMap<usize, String>,
}

/// Inspect up to four rows after the header. A row with 3+ filled cells
/// and no RACI or maturity content is a sub-header (typically spelled-out
/// role names beneath abbreviations). Scanning stops at the first row
/// that looks like data, or at a thin row, which is more likely an inline
/// category header than a sub-header.
pub fn skip_subheader_rows(grid: &Grid, header_idx: usize) -> SubHeaderScan {
    let mut scan = SubHeaderScan::default();
    let end = grid.height().min(header_idx + 1 + SUBHEADER_SCAN_LIMIT);

    for i in (header_idx + 1)..end {
        let filled = non_empty_cells(grid, i).len();
        if filled < 3 {
            break;
        }
        let has_raci = (0..grid.width()).any(|c| is_raci(grid.cell(i, c)));
        let has_maturity = (0..grid.width()).any(|c| is_maturity_number(grid.cell(i, c), 5));
        if has_raci || has_maturity {
            break;
        }

        for c in 0..grid.width() {
            let val = grid.cell(i, c);
            if val.chars().count() > 1 {
                scan.labels.insert(c, val.to_string());
            }
        }
        scan.skipped += 1;
        debug!(row = i, "skipping sub-header row");
    }

    scan
}
