use tracing::debug;

use super::clean;

/// Parse a numeric cell, tolerating a trailing `%`.
fn parse_number(raw: &str) -> Option<f64> {
    let s = clean(raw).trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Whether the value reads as a maturity number between 0 and
/// `max(scale_max, 5)` inclusive.
pub fn is_maturity_number(raw: &str, scale_max: u32) -> bool {
    match parse_number(raw) {
        Some(n) => n >= 0.0 && n <= f64::from(scale_max.max(5)),
        None => false,
    }
}

/// Detect the maturity scale from a sample of numeric strings.
/// Returns `(scale_max, is_percentage)`. The three supported scales are
/// 0-5, 0-10 and 0-100 (percentage).
pub fn detect_maturity_scale<'a, I>(values: I) -> (u32, bool)
where
    I: IntoIterator<Item = &'a str>,
{
    let max = values
        .into_iter()
        .filter_map(parse_number)
        .fold(None::<f64>, |acc, n| Some(acc.map_or(n, |m| m.max(n))));

    let scale = match max {
        None => (5, false),
        Some(m) if m > 10.0 => (100, true),
        Some(m) if m > 5.0 => (10, false),
        Some(_) => (5, false),
    };
    debug!(scale = scale.0, percentage = scale.1, "detected maturity scale");
    scale
}

/// Rescale a maturity value onto 0-5 and round to the nearest integer.
/// Values land in [0,5] whatever the source scale; unparseable cells
/// yield `None`.
pub fn normalize_maturity(raw: &str, scale_max: u32) -> Option<u8> {
    let n = parse_number(raw)?;
    let rescaled = match scale_max {
        100 => n / 20.0,
        10 => n / 2.0,
        _ => n,
    };
    Some(rescaled.round_ties_even().clamp(0.0, 5.0) as u8)
}
