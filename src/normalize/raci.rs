use crate::model::Raci;

use super::clean;

/// Single-letter dialects folded onto the four standard letters.
/// Covers RASCI (S upportive), RACI-VS (V erify), DACI (D river),
/// RAPID (P erform) and the common X / O(wner) / L(ead) marks.
static EXTENDED_LETTERS: &[(&str, Raci)] = &[
    ("R", Raci::R),
    ("A", Raci::A),
    ("C", Raci::C),
    ("I", Raci::I),
    ("S", Raci::C),
    ("V", Raci::C),
    ("D", Raci::R),
    ("P", Raci::R),
    ("X", Raci::R),
    ("O", Raci::R),
    ("L", Raci::R),
];

/// Full-word values, matched case-insensitively. Order matters for the
/// prefix fallback: earlier entries win.
static FULL_WORDS: &[(&str, Raci)] = &[
    ("responsible", Raci::R),
    ("accountable", Raci::A),
    ("consulted", Raci::C),
    ("informed", Raci::I),
    ("supportive", Raci::C),
    ("support", Raci::C),
    ("driver", Raci::R),
    ("approver", Raci::A),
    ("contributor", Raci::C),
    ("perform", Raci::R),
    ("recommend", Raci::C),
    ("input", Raci::C),
    ("decide", Raci::A),
    ("lead", Raci::R),
    ("owner", Raci::R),
    ("participant", Raci::C),
    ("verify", Raci::C),
    ("sign-off", Raci::A),
    ("sign off", Raci::A),
    ("yes", Raci::R),
    ("y", Raci::R),
];

fn extended_lookup(token: &str) -> Option<Raci> {
    EXTENDED_LETTERS
        .iter()
        .find(|(k, _)| *k == token)
        .map(|(_, v)| *v)
}

/// Normalize a cell value to a standard RACI letter.
///
/// Recognizes, in priority order: a single standard letter, a single
/// extended-dialect letter, a full-word value, a multi-value cell
/// ("R/A", "R,A", "R & A" — the highest-weight token wins), and finally
/// a prefix match against the full-word lexicon.
///
/// Returns `None` for anything else; callers treat that as "not a
/// responsibility marker", never as an error.
pub fn normalize_raci(raw: &str) -> Option<Raci> {
    let s = clean(raw);
    if s.is_empty() {
        return None;
    }

    let upper = s.to_uppercase();
    if matches!(upper.as_str(), "R" | "A" | "C" | "I") {
        return extended_lookup(&upper);
    }
    if let Some(v) = extended_lookup(&upper) {
        return Some(v);
    }

    let lower = s.to_lowercase();
    if let Some((_, v)) = FULL_WORDS.iter().find(|(w, _)| *w == lower) {
        return Some(*v);
    }

    // Multi-value: split on / , & and whitespace, keep the most responsible
    let mapped: Vec<Raci> = upper
        .split(|c: char| matches!(c, '/' | ',' | '&') || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(extended_lookup)
        .collect();
    if let Some(best) = mapped.into_iter().max_by_key(|v| v.weight()) {
        return Some(best);
    }

    FULL_WORDS
        .iter()
        .find(|(w, _)| lower.starts_with(w))
        .map(|(_, v)| *v)
}

/// Whether the value can be read as a RACI assignment at all.
pub fn is_raci(raw: &str) -> bool {
    normalize_raci(raw).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_letters_any_case() {
        assert_eq!(normalize_raci("R"), Some(Raci::R));
        assert_eq!(normalize_raci("a"), Some(Raci::A));
        assert_eq!(normalize_raci(" c "), Some(Raci::C));
        assert_eq!(normalize_raci("i"), Some(Raci::I));
    }

    #[test]
    fn extended_dialect_letters() {
        // RASCI / RACI-VS / DACI / RAPID marks
        assert_eq!(normalize_raci("S"), Some(Raci::C));
        assert_eq!(normalize_raci("V"), Some(Raci::C));
        assert_eq!(normalize_raci("D"), Some(Raci::R));
        assert_eq!(normalize_raci("P"), Some(Raci::R));
        assert_eq!(normalize_raci("X"), Some(Raci::R));
        assert_eq!(normalize_raci("O"), Some(Raci::R));
        assert_eq!(normalize_raci("L"), Some(Raci::R));
    }

    #[test]
    fn full_words() {
        assert_eq!(normalize_raci("Responsible"), Some(Raci::R));
        assert_eq!(normalize_raci("ACCOUNTABLE"), Some(Raci::A));
        assert_eq!(normalize_raci("consulted"), Some(Raci::C));
        assert_eq!(normalize_raci("Informed"), Some(Raci::I));
        assert_eq!(normalize_raci("Driver"), Some(Raci::R));
        assert_eq!(normalize_raci("Approver"), Some(Raci::A));
        assert_eq!(normalize_raci("yes"), Some(Raci::R));
        assert_eq!(normalize_raci("Y"), Some(Raci::R));
    }

    #[test]
    fn multi_value_highest_weight_wins() {
        // Order and separator do not matter
        assert_eq!(normalize_raci("C/R"), Some(Raci::R));
        assert_eq!(normalize_raci("R,C"), Some(Raci::R));
        assert_eq!(normalize_raci("R & C"), Some(Raci::R));
        assert_eq!(normalize_raci("A/C"), Some(Raci::A));
        assert_eq!(normalize_raci("I, C"), Some(Raci::C));
    }

    #[test]
    fn prefix_match_on_words() {
        assert_eq!(normalize_raci("Responsible for delivery"), Some(Raci::R));
        assert_eq!(normalize_raci("supports"), Some(Raci::C));
    }

    #[test]
    fn descriptive_text_is_not_raci() {
        assert_eq!(normalize_raci(""), None);
        assert_eq!(normalize_raci("see notes"), None);
        assert_eq!(normalize_raci("3"), None);
        assert_eq!(normalize_raci("80%"), None);
    }

    #[test]
    fn idempotent_on_own_output() {
        for input in ["R", "S", "Driver", "C/R", "responsible"] {
            let once = normalize_raci(input).unwrap();
            assert_eq!(normalize_raci(once.as_str()), Some(once));
        }
    }
}
