//! Validation report: derived, read-only diagnostics over an assembled
//! model.

use std::collections::BTreeMap;

use crate::model::{Category, ColumnReport, ColumnTag, Raci, Role, ValidationReport};

/// Column-classification table for the report. Bookkeeping tags (empty,
/// delta, priority, id, numeric_skip, unknown) are filtered out — they
/// steer extraction but carry no meaning for the caller.
pub fn column_report(
    tags: &BTreeMap<usize, ColumnTag>,
    headers: &[String],
) -> BTreeMap<usize, ColumnReport> {
    tags.iter()
        .filter(|(_, t)| t.is_reportable())
        .map(|(ci, t)| {
            (
                *ci,
                ColumnReport {
                    header: headers.get(*ci).map(|h| h.trim().to_string()).unwrap_or_default(),
                    classification: *t,
                },
            )
        })
        .collect()
}

/// Compute the full validation report for an assembled model.
pub fn build_report(
    roles: &[Role],
    categories: &[Category],
    column_classifications: BTreeMap<usize, ColumnReport>,
    has_maturity: bool,
    maturity_scale: u32,
) -> ValidationReport {
    let capability_count = categories.iter().map(|c| c.items.len()).sum();

    let orphaned_capabilities: Vec<String> = categories
        .iter()
        .flat_map(|cat| {
            cat.items
                .iter()
                .filter(|item| !item.has_responsible())
                .map(move |item| format!("{} > {}", cat.name, item.name))
        })
        .collect();

    let zero_r_roles: Vec<String> = roles
        .iter()
        .filter(|role| {
            !categories.iter().any(|cat| {
                cat.items
                    .iter()
                    .any(|item| item.assignments.get(&role.id) == Some(&Raci::R))
            })
        })
        .map(|role| role.label.clone())
        .collect();

    ValidationReport {
        role_count: roles.len(),
        category_count: categories.len(),
        capability_count,
        orphaned_capabilities,
        zero_r_roles,
        has_maturity,
        maturity_scale,
        column_classifications,
    }
}
