use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single responsibility assignment. Extended dialects (RASCI, DACI,
/// RAPID, ...) are folded into these four letters at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Raci {
    R,
    A,
    C,
    I,
}

impl Raci {
    /// Responsibility weight used to resolve multi-value cells: the most
    /// responsible token wins.
    pub fn weight(self) -> u8 {
        match self {
            Raci::R => 4,
            Raci::A => 3,
            Raci::C => 2,
            Raci::I => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Raci::R => "R",
            Raci::A => "A",
            Raci::C => "C",
            Raci::I => "I",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    Filled,
    Unfilled,
}

/// One RACI-bearing column (standard layout) or row (transposed layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub label: String,
    pub short: String,
    pub color: String,
    pub status: RoleStatus,
}

/// A capability with its per-role assignments and optional maturity pair.
/// Assignments are keyed by role id and serialize inline next to the item
/// fields, so an item reads as `{"name": ..., "pm": "A", "dev": "R"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt: Option<u8>,
    #[serde(flatten)]
    pub assignments: BTreeMap<String, Raci>,
}

impl CapabilityItem {
    pub fn has_responsible(&self) -> bool {
        self.assignments.values().any(|v| *v == Raci::R)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
    pub items: Vec<CapabilityItem>,
}

/// Semantic tag assigned to each column index by the classifier.
/// Every in-range column gets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTag {
    Raci,
    Name,
    Category,
    Description,
    MaturityNow,
    MaturityTarget,
    Id,
    Status,
    Priority,
    Delta,
    Empty,
    NumericSkip,
    Unknown,
}

impl ColumnTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnTag::Raci => "raci",
            ColumnTag::Name => "name",
            ColumnTag::Category => "category",
            ColumnTag::Description => "description",
            ColumnTag::MaturityNow => "maturity_now",
            ColumnTag::MaturityTarget => "maturity_target",
            ColumnTag::Id => "id",
            ColumnTag::Status => "status",
            ColumnTag::Priority => "priority",
            ColumnTag::Delta => "delta",
            ColumnTag::Empty => "empty",
            ColumnTag::NumericSkip => "numeric_skip",
            ColumnTag::Unknown => "unknown",
        }
    }

    /// Tags that are internal bookkeeping only and stay out of the
    /// validation report.
    pub fn is_reportable(self) -> bool {
        !matches!(
            self,
            ColumnTag::Empty
                | ColumnTag::Delta
                | ColumnTag::Priority
                | ColumnTag::Id
                | ColumnTag::NumericSkip
                | ColumnTag::Unknown
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Standard,
    Transposed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnReport {
    pub header: String,
    pub classification: ColumnTag,
}

/// Read-only summary computed after assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub role_count: usize,
    pub category_count: usize,
    pub capability_count: usize,
    /// `"Category > Capability"` entries with no role marked R.
    pub orphaned_capabilities: Vec<String>,
    /// Labels of roles with zero R assignments anywhere.
    pub zero_r_roles: Vec<String>,
    pub has_maturity: bool,
    pub maturity_scale: u32,
    pub column_classifications: BTreeMap<usize, ColumnReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseMeta {
    pub filename: String,
    pub sheet: String,
    #[serde(flatten)]
    pub report: ValidationReport,
    pub layout: Layout,
}

/// The canonical structured model one parse produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutput {
    pub roles: Vec<Role>,
    pub categories: Vec<Category>,
    pub meta: ParseMeta,
}

/// Display colors cycled by index. Assignment is deterministic given input
/// order, not content.
pub static ROLE_PALETTE: &[&str] = &[
    "#4ae0b0", "#e0a040", "#6090e0", "#a0b8d0", "#e06080", "#80d0d0", "#d080e0", "#c0c060",
    "#50b890", "#d09060", "#7080d0", "#b0c8e0", "#d070a0", "#60c0b0", "#c090d0", "#b0b070",
];

pub static CATEGORY_PALETTE: &[&str] = &[
    "#8090CC", "#50C890", "#90C850", "#B888CC", "#C8A050", "#A080C0", "#C89850", "#6898B8",
    "#58A8C0", "#7888B8", "#60B880", "#A0B850", "#C898C0", "#B8A060", "#9078B0", "#D0A858",
    "#5890A8",
];
