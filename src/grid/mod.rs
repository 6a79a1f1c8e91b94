//! Uniform rectangular grid of string cells, plus the delimited-text
//! loader that produces one from a file on disk.

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::error::ParseError;

/// Rectangular, immutable input to the engine. Ragged source rows are
/// padded with empty cells to the widest row.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Grid {
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Grid { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed cell content; out-of-range coordinates read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    pub fn row(&self, row: usize) -> &[String] {
        &self.rows[row]
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Load a spreadsheet file into a grid. This build reads delimited text
/// (`.csv`, `.tsv`, `.txt`); workbook formats are the province of an
/// external loader and are rejected with an actionable error.
pub fn load(path: &Path) -> Result<(Grid, String), ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => load_delimited(path),
        other => Err(ParseError::UnsupportedFormat(format!(".{other}"))),
    }
}

fn load_delimited(path: &Path) -> Result<(Grid, String), ParseError> {
    let bytes = fs::read(path)?;
    let text = decode_bytes(&bytes);
    let sample_end = text
        .char_indices()
        .nth(4096)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let delimiter = sniff_delimiter(&text[..sample_end]);
    debug!(delimiter = %(delimiter as char), "sniffed delimiter");

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    let grid = Grid::from_rows(rows);
    if grid.is_empty() {
        return Err(ParseError::NoData);
    }
    Ok((grid, "CSV".to_string()))
}

/// Decode file bytes: strict UTF-8 first (BOM-aware), then Windows-1252,
/// which also covers Latin-1 input. The fallback never fails, so every
/// file decodes to something scannable.
fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Pick the most frequent candidate delimiter outside quoted sections of
/// the sample. Comma wins ties and is the default when nothing matches.
fn sniff_delimiter(sample: &str) -> u8 {
    let mut counts = [0usize; 4]; // , ; \t |
    let mut in_quotes = false;
    for c in sample.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => counts[0] += 1,
            ';' if !in_quotes => counts[1] += 1,
            '\t' if !in_quotes => counts[2] += 1,
            '|' if !in_quotes => counts[3] += 1,
            _ => {}
        }
    }
    let candidates = [b',', b';', b'\t', b'|'];
    let best = (0..4).max_by_key(|&i| counts[i]).unwrap_or(0);
    if counts[best] == 0 {
        b','
    } else {
        candidates[best]
    }
}
