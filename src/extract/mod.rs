//! Orientation detection and row extraction: walks data rows into
//! capability items, resolves inline category headers, filters summary
//! noise, and assembles the canonical model.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::classify::{classify_columns, ClassifierThresholds};
use crate::error::ParseError;
use crate::grid::Grid;
use crate::layout::{find_header_row, skip_subheader_rows, HEADER_SCAN_LIMIT};
use crate::model::{
    CapabilityItem, Category, ColumnTag, Layout, ParseMeta, ParseOutput, Role, RoleStatus,
    CATEGORY_PALETTE, ROLE_PALETTE,
};
use crate::normalize::{
    detect_maturity_scale, detect_unfilled, is_summary_category, is_summary_row, make_id,
    make_short_code, normalize_maturity, normalize_raci, strip_numbering,
};
use crate::report;

/// Minimum share of RACI-normalizable cells for a grid to read as a
/// transposed matrix.
const TRANSPOSED_RACI_RATIO: f64 = 0.3;

/// A role plus the column it was lifted from. The column index is
/// bookkeeping for the row walk and never leaves this module.
struct RoleColumn {
    role: Role,
    col: usize,
}

/// Parse a grid into the canonical model using default classifier
/// thresholds.
pub fn parse(grid: &Grid, sheet_label: &str) -> Result<ParseOutput, ParseError> {
    parse_with_thresholds(grid, sheet_label, &ClassifierThresholds::default())
}

/// Full entry point: layout scan → column classification → orientation
/// routing → extraction → assembly → diagnostics.
#[instrument(level = "info", skip(grid, thresholds), fields(rows = grid.height(), cols = grid.width()))]
pub fn parse_with_thresholds(
    grid: &Grid,
    sheet_label: &str,
    thresholds: &ClassifierThresholds,
) -> Result<ParseOutput, ParseError> {
    if grid.is_empty() {
        return Err(ParseError::NoData);
    }

    let header_idx = find_header_row(grid, HEADER_SCAN_LIMIT);
    let scan = skip_subheader_rows(grid, header_idx);
    let data_start = (header_idx + 1 + scan.skipped).min(grid.height());

    let headers = grid.row(header_idx);
    let data_rows = &grid.rows()[data_start..];
    let tags = classify_columns(headers, data_rows, thresholds);

    if detect_transposed(grid, header_idx, &tags) {
        debug!("transposed layout detected");
        return parse_transposed(grid, header_idx, sheet_label);
    }

    parse_standard(grid, header_idx, data_start, &scan.labels, tags, sheet_label)
}

/// Decide whether the grid is transposed: roles as rows, capabilities as
/// columns. Two signals, either sufficient:
///
/// - the corner header announces roles ("Role", "Roles", "Role name")
///   and the cell population below is RACI-dense, or
/// - normal classification found almost no RACI columns, the cells are
///   RACI-dense anyway, and the grid is wide relative to tall.
fn detect_transposed(grid: &Grid, header_idx: usize, tags: &BTreeMap<usize, ColumnTag>) -> bool {
    let data_len = grid.height().saturating_sub(header_idx + 1);
    if data_len < 2 {
        return false;
    }

    let mut total = 0usize;
    let mut raci = 0usize;
    for r in (header_idx + 1)..grid.height().min(header_idx + 1 + 20) {
        for c in 1..grid.width() {
            let v = grid.cell(r, c);
            if !v.is_empty() {
                total += 1;
                if normalize_raci(v).is_some() {
                    raci += 1;
                }
            }
        }
    }
    if total == 0 {
        return false;
    }
    let ratio = (raci as f64) / (total as f64);
    if ratio <= TRANSPOSED_RACI_RATIO || data_len >= 20 {
        return false;
    }

    let corner = grid.cell(header_idx, 0).to_lowercase();
    if corner.starts_with("role") {
        return true;
    }

    let raci_cols = tags.values().filter(|t| **t == ColumnTag::Raci).count();
    raci_cols < 2 && grid.width() > data_len * 2
}

/// Insertion-ordered category accumulator: first mention fixes the
/// position, later items append.
#[derive(Default)]
struct CategoryAccumulator {
    order: Vec<String>,
    items: BTreeMap<String, Vec<CapabilityItem>>,
}

impl CategoryAccumulator {
    fn push(&mut self, category: &str, item: CapabilityItem) {
        if !self.items.contains_key(category) {
            self.order.push(category.to_string());
        }
        self.items.entry(category.to_string()).or_default().push(item);
    }
}

fn parse_standard(
    grid: &Grid,
    header_idx: usize,
    data_start: usize,
    subheader_labels: &std::collections::HashMap<usize, String>,
    tags: BTreeMap<usize, ColumnTag>,
    sheet_label: &str,
) -> Result<ParseOutput, ParseError> {
    let raci_cols: Vec<usize> = tags
        .iter()
        .filter(|(_, t)| **t == ColumnTag::Raci)
        .map(|(ci, _)| *ci)
        .collect();
    if raci_cols.is_empty() {
        return Err(ParseError::NoRaciColumns);
    }

    // Roles, one per RACI column. The header cell is usually an
    // abbreviation; a sub-header row below it may carry the full name.
    let mut roles: Vec<RoleColumn> = Vec::with_capacity(raci_cols.len());
    for (i, &ci) in raci_cols.iter().enumerate() {
        let label = grid.cell(header_idx, ci).to_string();
        let full_label = subheader_labels.get(&ci).cloned().unwrap_or_else(|| label.clone());
        let mut short = make_short_code(&label);
        if label.chars().count() <= 6 && label == label.to_uppercase() {
            short = label.clone();
        }
        let unfilled = detect_unfilled(&label) || detect_unfilled(&full_label);
        roles.push(RoleColumn {
            role: Role {
                id: make_id(&full_label),
                label: full_label,
                short,
                color: ROLE_PALETTE[i % ROLE_PALETTE.len()].to_string(),
                status: if unfilled {
                    RoleStatus::Unfilled
                } else {
                    RoleStatus::Filled
                },
            },
            col: ci,
        });
    }

    let first_col = |wanted: ColumnTag| -> Option<usize> {
        tags.iter()
            .find(|(_, t)| **t == wanted)
            .map(|(ci, _)| *ci)
    };
    let name_col = first_col(ColumnTag::Name);
    let cat_col = first_col(ColumnTag::Category);
    let desc_col = first_col(ColumnTag::Description);
    let now_col = first_col(ColumnTag::MaturityNow);
    let tgt_col = first_col(ColumnTag::MaturityTarget);

    // The scale is detected once from the whole column sample, so a lone
    // outlier row cannot flip the interpretation of its neighbours.
    let mut maturity_scale = 5u32;
    if let Some(nc) = now_col {
        let mut samples: Vec<&str> = Vec::new();
        for r in data_start..grid.height() {
            let v = grid.cell(r, nc);
            if !v.is_empty() {
                samples.push(v);
            }
            if let Some(tc) = tgt_col {
                let v = grid.cell(r, tc);
                if !v.is_empty() {
                    samples.push(v);
                }
            }
        }
        let (scale, _) = detect_maturity_scale(samples);
        maturity_scale = scale;
    }

    let mut acc = CategoryAccumulator::default();
    let mut current_category = "General".to_string();

    for r in data_start..grid.height() {
        let empty_row = (0..grid.width()).all(|c| grid.cell(r, c).is_empty());
        if empty_row {
            continue;
        }

        let name_val = name_col.map(|c| grid.cell(r, c)).unwrap_or("");

        // Inline category header: a named row with every RACI cell empty.
        // Checked before the summary filter on purpose, so that summary
        // banners become categories and get dropped wholesale at
        // assembly rather than leaking their member rows.
        let all_raci_empty = roles.iter().all(|rc| grid.cell(r, rc.col).is_empty());
        if !name_val.is_empty() && all_raci_empty && cat_col.is_none() {
            current_category = strip_numbering(name_val);
            debug!(row = r, category = %current_category, "inline category header");
            continue;
        }

        if !name_val.is_empty() && is_summary_row(name_val) {
            debug!(row = r, name = %name_val, "skipping summary row");
            continue;
        }

        if name_val.is_empty() {
            continue;
        }

        if let Some(cc) = cat_col {
            let cat_val = grid.cell(r, cc);
            if !cat_val.is_empty() {
                current_category = strip_numbering(cat_val);
            }
        }

        let mut item = CapabilityItem {
            name: name_val.to_string(),
            ..Default::default()
        };
        if let Some(dc) = desc_col {
            let desc = grid.cell(r, dc);
            if !desc.is_empty() {
                item.desc = Some(desc.to_string());
            }
        }
        for rc in &roles {
            if let Some(v) = normalize_raci(grid.cell(r, rc.col)) {
                item.assignments.insert(rc.role.id.clone(), v);
            }
        }
        if let Some(nc) = now_col {
            item.now = normalize_maturity(grid.cell(r, nc), maturity_scale);
        }
        if let Some(tc) = tgt_col {
            item.tgt = normalize_maturity(grid.cell(r, tc), maturity_scale);
        }

        acc.push(&current_category, item);
    }

    let categories = assemble_categories(acc);
    let roles: Vec<Role> = roles.into_iter().map(|rc| rc.role).collect();

    let column_table = report::column_report(&tags, grid.row(header_idx));
    let validation = report::build_report(
        &roles,
        &categories,
        column_table,
        now_col.is_some(),
        maturity_scale,
    );

    Ok(ParseOutput {
        roles,
        categories,
        meta: ParseMeta {
            filename: String::new(),
            sheet: sheet_label.to_string(),
            report: validation,
            layout: Layout::Standard,
        },
    })
}

/// Keep only categories that carry real data: at least one item, a name
/// that is not a footer/legend marker, and at least one RACI assignment
/// somewhere inside. Colors cycle over the surviving set.
fn assemble_categories(acc: CategoryAccumulator) -> Vec<Category> {
    let mut categories = Vec::new();
    let mut color_idx = 0usize;
    let mut items = acc.items;

    for name in acc.order {
        let Some(cat_items) = items.remove(&name) else {
            continue;
        };
        if cat_items.is_empty() {
            continue;
        }
        if is_summary_category(&name) {
            debug!(category = %name, "dropping summary category");
            continue;
        }
        if !cat_items.iter().any(|item| !item.assignments.is_empty()) {
            debug!(category = %name, "dropping category with no RACI content");
            continue;
        }
        categories.push(Category {
            name,
            color: CATEGORY_PALETTE[color_idx % CATEGORY_PALETTE.len()].to_string(),
            items: cat_items,
        });
        color_idx += 1;
    }

    categories
}

/// Transposed extraction: column 0 of each data row is a role label, the
/// header row carries capability names, and every intersection is a
/// direct RACI value. Description, maturity and category grouping are
/// undefined in this orientation; everything lands in "General".
fn parse_transposed(
    grid: &Grid,
    header_idx: usize,
    sheet_label: &str,
) -> Result<ParseOutput, ParseError> {
    let mut roles: Vec<Role> = Vec::new();
    let mut cap_order: Vec<String> = Vec::new();
    let mut cap_assignments: BTreeMap<String, BTreeMap<String, crate::model::Raci>> =
        BTreeMap::new();

    for (i, r) in ((header_idx + 1)..grid.height()).enumerate() {
        let role_name = grid.cell(r, 0);
        if role_name.is_empty() {
            continue;
        }
        if is_summary_row(role_name) {
            debug!(row = r, name = %role_name, "skipping summary row");
            continue;
        }

        let role_id = make_id(role_name);
        roles.push(Role {
            id: role_id.clone(),
            label: role_name.to_string(),
            short: make_short_code(role_name),
            color: ROLE_PALETTE[i % ROLE_PALETTE.len()].to_string(),
            status: if detect_unfilled(role_name) {
                RoleStatus::Unfilled
            } else {
                RoleStatus::Filled
            },
        });

        for c in 1..grid.width() {
            let cap_name = grid.cell(header_idx, c);
            if cap_name.is_empty() {
                continue;
            }
            if let Some(v) = normalize_raci(grid.cell(r, c)) {
                if !cap_assignments.contains_key(cap_name) {
                    cap_order.push(cap_name.to_string());
                }
                cap_assignments
                    .entry(cap_name.to_string())
                    .or_default()
                    .insert(role_id.clone(), v);
            }
        }
    }

    let items: Vec<CapabilityItem> = cap_order
        .iter()
        .map(|name| CapabilityItem {
            name: name.clone(),
            assignments: cap_assignments.remove(name).unwrap_or_default(),
            ..Default::default()
        })
        .collect();

    if roles.is_empty() && items.is_empty() {
        warn!("transposed grid produced no roles or capabilities");
    }

    let categories = if items.is_empty() {
        Vec::new()
    } else {
        vec![Category {
            name: "General".to_string(),
            color: CATEGORY_PALETTE[0].to_string(),
            items,
        }]
    };

    let validation = report::build_report(&roles, &categories, BTreeMap::new(), false, 5);

    Ok(ParseOutput {
        roles,
        categories,
        meta: ParseMeta {
            filename: String::new(),
            sheet: sheet_label.to_string(),
            report: validation,
            layout: Layout::Transposed,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Raci;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn minimal_matrix_end_to_end() {
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA"],
            &["Design API", "A", "R", "C"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();

        assert_eq!(out.roles.len(), 3);
        assert_eq!(out.categories.len(), 1);
        let cat = &out.categories[0];
        assert_eq!(cat.name, "General");
        assert_eq!(cat.items.len(), 1);
        let item = &cat.items[0];
        assert_eq!(item.name, "Design API");
        assert_eq!(item.assignments["pm"], Raci::A);
        assert_eq!(item.assignments["dev"], Raci::R);
        assert_eq!(item.assignments["qa"], Raci::C);

        assert!(out.meta.report.orphaned_capabilities.is_empty());
        assert_eq!(out.meta.report.zero_r_roles, vec!["PM", "QA"]);
        assert_eq!(out.meta.layout, Layout::Standard);
        assert_eq!(out.meta.sheet, "Sheet1");
    }

    #[test]
    fn inline_category_headers_group_rows() {
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA"],
            &["1. Strategy", "", "", ""],
            &["Define Vision", "R", "C", "I"],
            &["2. Delivery", "", "", ""],
            &["Ship Features", "A", "R", "C"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let names: Vec<&str> = out.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Strategy", "Delivery"]);
        assert_eq!(out.categories[0].items[0].name, "Define Vision");
        assert_eq!(out.categories[1].items[0].name, "Ship Features");
        // deterministic palette by surviving order
        assert_eq!(out.categories[0].color, CATEGORY_PALETTE[0]);
        assert_eq!(out.categories[1].color, CATEGORY_PALETTE[1]);
    }

    #[test]
    fn summary_rows_are_never_emitted() {
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA"],
            &["Design API", "A", "R", "C"],
            &["TOTAL", "", "", ""],
            &["Average", "1", "2", "1"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        assert_eq!(out.categories.len(), 1);
        let names: Vec<&str> = out.categories[0]
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Design API"]);
    }

    #[test]
    fn summary_category_block_is_dropped_wholesale() {
        // "RACI COUNT" opens an inline category of numeric rows: the rows
        // survive the walk but the whole block dies at assembly
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA"],
            &["Design API", "A", "R", "C"],
            &["RACI COUNT", "", "", ""],
            &["Responsible", "1", "1", "0"],
            &["Accountable", "1", "0", "0"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let names: Vec<&str> = out.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["General"]);
        assert_eq!(out.categories[0].items.len(), 1);
    }

    #[test]
    fn explicit_category_column_wins_over_inline_detection() {
        let g = grid(&[
            &["Domain", "Capability", "PM", "Dev"],
            &["Strategy", "Define Vision", "R", "C"],
            &["", "Refresh Vision", "A", "R"],
            &["Delivery", "Ship Features", "C", "R"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let names: Vec<&str> = out.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Strategy", "Delivery"]);
        // the blank category cell inherits the running category
        assert_eq!(out.categories[0].items.len(), 2);
    }

    #[test]
    fn maturity_pair_is_normalized_from_column_scale() {
        let g = grid(&[
            &["Capability", "PM", "Dev", "Current", "Target"],
            &["Design API", "A", "R", "40", "80"],
            &["Write Tests", "R", "C", "20", "60"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let items = &out.categories[0].items;
        assert_eq!(items[0].now, Some(2));
        assert_eq!(items[0].tgt, Some(4));
        assert_eq!(items[1].now, Some(1));
        assert_eq!(items[1].tgt, Some(3));
        assert!(out.meta.report.has_maturity);
        assert_eq!(out.meta.report.maturity_scale, 100);
    }

    #[test]
    fn subheader_full_names_become_role_labels() {
        let g = grid(&[
            &["Capability", "PM", "DEV", "QA"],
            &["", "Product Manager", "Developer", "Quality Analyst"],
            &["Design API", "A", "R", "C"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let labels: Vec<&str> = out.roles.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Product Manager", "Developer", "Quality Analyst"]);
        // the abbreviation from the header survives as the short code
        let shorts: Vec<&str> = out.roles.iter().map(|r| r.short.as_str()).collect();
        assert_eq!(shorts, vec!["PM", "DEV", "QA"]);
        assert_eq!(out.roles[0].id, "product_manager");
    }

    #[test]
    fn unfilled_role_detection_from_header() {
        let g = grid(&[
            &["Capability", "PM", "Architect (TBD)", "QA"],
            &["Design API", "A", "R", "C"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        assert_eq!(out.roles[1].status, RoleStatus::Unfilled);
        assert_eq!(out.roles[0].status, RoleStatus::Filled);
    }

    #[test]
    fn no_raci_columns_is_an_error() {
        let g = grid(&[
            &["Capability", "Owner name", "Notes field", "Budget"],
            &["Design API", "Alice Johnson", "needs review soon", "1200"],
            &["Write Tests", "Bob Smith", "blocked on infra", "3400"],
        ]);
        match parse(&g, "Sheet1") {
            Err(ParseError::NoRaciColumns) => {}
            other => panic!("expected NoRaciColumns, got {other:?}"),
        }
    }

    #[test]
    fn empty_grid_is_no_data() {
        let g = Grid::from_rows(Vec::new());
        assert!(matches!(parse(&g, "Sheet1"), Err(ParseError::NoData)));
    }

    #[test]
    fn transposed_grid_is_detected_and_extracted() {
        let g = grid(&[
            &["Role", "Design API", "Write Tests"],
            &["PM", "A", "I"],
            &["Dev", "R", "R"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        assert_eq!(out.meta.layout, Layout::Transposed);

        let labels: Vec<&str> = out.roles.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["PM", "Dev"]);

        assert_eq!(out.categories.len(), 1);
        assert_eq!(out.categories[0].name, "General");
        let items = &out.categories[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Design API");
        assert_eq!(items[0].assignments["pm"], Raci::A);
        assert_eq!(items[0].assignments["dev"], Raci::R);
        assert_eq!(items[1].name, "Write Tests");
        assert_eq!(items[1].assignments["pm"], Raci::I);
        assert_eq!(items[1].assignments["dev"], Raci::R);
    }

    #[test]
    fn wide_standard_grid_is_not_transposed() {
        // plenty of RACI columns: stays standard even though it is wide
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA", "Ops", "Sec"],
            &["Design API", "A", "R", "C", "I", "I"],
            &["Write Tests", "I", "C", "R", "I", "C"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        assert_eq!(out.meta.layout, Layout::Standard);
    }

    #[test]
    fn duplicate_capability_names_both_survive() {
        let g = grid(&[
            &["Capability", "PM", "Dev", "QA"],
            &["Design API", "A", "R", "C"],
            &["Design API", "R", "C", "I"],
        ]);
        let out = parse(&g, "Sheet1").unwrap();
        let items = &out.categories[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].assignments["pm"], Raci::A);
        assert_eq!(items[1].assignments["pm"], Raci::R);
    }
}
