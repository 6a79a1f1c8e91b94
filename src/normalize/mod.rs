//! Cell-level normalization: raw strings into RACI letters, bounded
//! maturity numbers, and cleaned labels. No dependency on grid layout.

pub mod label;
pub mod maturity;
pub mod raci;

pub use label::{detect_unfilled, is_summary_category, is_summary_row, make_id, make_short_code, strip_numbering};
pub use maturity::{detect_maturity_scale, is_maturity_number, normalize_maturity};
pub use raci::{is_raci, normalize_raci};

/// Trimmed view of a raw cell. Missing cells are represented upstream as
/// empty strings, so empty in → empty out.
pub fn clean(raw: &str) -> &str {
    raw.trim()
}
