//! Schema-inference engine for RACI spreadsheets.
//!
//! Takes a rectangular grid of string cells — unknown column order,
//! unknown labeling dialect, possibly transposed — and infers a canonical
//! model of roles, categories, capabilities, responsibility assignments
//! and maturity scores, plus a validation report. Each parse is a pure
//! function from grid to model; nothing is shared between calls.

use std::path::Path;

pub mod classify;
pub mod error;
pub mod export;
pub mod extract;
pub mod grid;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod report;

pub use classify::ClassifierThresholds;
pub use error::ParseError;
pub use extract::{parse, parse_with_thresholds};
pub use grid::Grid;
pub use model::ParseOutput;

/// Load a file from disk and parse it, stamping the filename and sheet
/// label into the returned meta.
pub fn parse_path(path: &Path) -> Result<ParseOutput, ParseError> {
    let (grid, sheet) = grid::load(path)?;
    let mut out = extract::parse(&grid, &sheet)?;
    out.meta.filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(out)
}
