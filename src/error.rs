use thiserror::Error;

/// Failures a parse can surface to the caller.
///
/// Heuristic misses inside the engine never abort: an unrecognizable cell
/// degrades to "no value" and shows up in diagnostics instead. The variants
/// here are the cases where there is nothing useful to return at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file format `{0}`. Use a .csv, .tsv or .txt delimited file")]
    UnsupportedFormat(String),

    #[error("file is empty or unreadable")]
    NoData,

    #[error(
        "no RACI columns detected. Ensure your spreadsheet has columns \
         where values are R, A, C, or I (or extended variants like RASCI).\n\
         Supported layouts:\n\
         \x20 Capability | Role1 | Role2 | ... (with R/A/C/I values)\n\
         \x20 Task | PM | Dev | QA | Design\n\
         Also supports: full words (Responsible, Accountable, ...),\n\
         \x20 multi-value cells (R/A), and RASCI/DACI/RAPID variants."
    )]
    NoRaciColumns,

    #[error("failed to read input")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited input")]
    Csv(#[from] csv::Error),
}
