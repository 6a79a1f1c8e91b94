//! Export of the canonical model: pretty JSON, and a relational CSV kit
//! (roles / capabilities / assignments) for BI tooling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use tracing::info;

use crate::model::{ParseOutput, RoleStatus};

/// Serialize the full model as pretty-printed JSON.
pub fn to_json(output: &ParseOutput) -> Result<String> {
    serde_json::to_string_pretty(output).context("serializing model to JSON")
}

pub fn write_json(output: &ParseOutput, path: &Path) -> Result<()> {
    fs::write(path, to_json(output)?).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote JSON export");
    Ok(())
}

/// Write the three-table CSV kit into `dir` (created if missing):
///
/// - `roles.csv` — one row per role
/// - `capabilities.csv` — one row per capability with its maturity pair
/// - `assignments.csv` — one row per (capability, role) pair that
///   carries a RACI value
///
/// Returns the paths written. Capability ids are sequential in model
/// order, so the three files join on stable keys.
pub fn export_tables(output: &ParseOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let roles_path = dir.join("roles.csv");
    let mut w = Writer::from_path(&roles_path)?;
    w.write_record(["RoleID", "RoleLabel", "RoleShort", "RoleColor", "Status"])?;
    for role in &output.roles {
        let status = match role.status {
            RoleStatus::Filled => "filled",
            RoleStatus::Unfilled => "unfilled",
        };
        w.write_record([
            role.id.as_str(),
            role.label.as_str(),
            role.short.as_str(),
            role.color.as_str(),
            status,
        ])?;
    }
    w.flush()?;

    let caps_path = dir.join("capabilities.csv");
    let mut w = Writer::from_path(&caps_path)?;
    w.write_record([
        "CapabilityID",
        "Category",
        "CategoryColor",
        "Capability",
        "Description",
        "MaturityNow",
        "MaturityTarget",
        "MaturityDelta",
    ])?;
    let mut cap_id = 0u32;
    for cat in &output.categories {
        for item in &cat.items {
            cap_id += 1;
            let id = cap_id.to_string();
            let now = item.now.map(|n| n.to_string()).unwrap_or_default();
            let tgt = item.tgt.map(|t| t.to_string()).unwrap_or_default();
            let delta = match (item.now, item.tgt) {
                (Some(n), Some(t)) => (i16::from(t) - i16::from(n)).to_string(),
                _ => String::new(),
            };
            w.write_record([
                id.as_str(),
                cat.name.as_str(),
                cat.color.as_str(),
                item.name.as_str(),
                item.desc.as_deref().unwrap_or(""),
                now.as_str(),
                tgt.as_str(),
                delta.as_str(),
            ])?;
        }
    }
    w.flush()?;

    let assignments_path = dir.join("assignments.csv");
    let mut w = Writer::from_path(&assignments_path)?;
    w.write_record([
        "CapabilityID",
        "RoleID",
        "Category",
        "Capability",
        "RoleLabel",
        "RACI",
        "Weight",
        "IsResponsible",
        "IsAccountable",
    ])?;
    let mut cap_id = 0u32;
    for cat in &output.categories {
        for item in &cat.items {
            cap_id += 1;
            let id = cap_id.to_string();
            for role in &output.roles {
                if let Some(value) = item.assignments.get(&role.id) {
                    let weight = value.weight().to_string();
                    w.write_record([
                        id.as_str(),
                        role.id.as_str(),
                        cat.name.as_str(),
                        item.name.as_str(),
                        role.label.as_str(),
                        value.as_str(),
                        weight.as_str(),
                        if *value == crate::model::Raci::R { "1" } else { "0" },
                        if *value == crate::model::Raci::A { "1" } else { "0" },
                    ])?;
                }
            }
        }
    }
    w.flush()?;

    info!(dir = %dir.display(), "wrote CSV table kit");
    Ok(vec![roles_path, caps_path, assignments_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse;
    use crate::grid::Grid;
    use tempfile::tempdir;

    fn sample_output() -> ParseOutput {
        let grid = Grid::from_rows(
            [
                ["Capability", "PM", "Dev", "Now", "Target"],
                ["Design API", "A", "R", "2", "4"],
                ["Write Tests", "R", "C", "1", "3"],
            ]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
        );
        parse(&grid, "Sheet1").unwrap()
    }

    #[test]
    fn json_round_trips() {
        let out = sample_output();
        let json = to_json(&out).unwrap();
        let back: ParseOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.roles.len(), out.roles.len());
        assert_eq!(back.categories[0].items.len(), 2);
        // assignments serialize inline on the item
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["categories"][0]["items"][0]["pm"], "A");
    }

    #[test]
    fn table_kit_shapes() {
        let out = sample_output();
        let tmp = tempdir().unwrap();
        let files = export_tables(&out, tmp.path()).unwrap();
        assert_eq!(files.len(), 3);

        let roles = fs::read_to_string(&files[0]).unwrap();
        let mut lines = roles.lines();
        assert_eq!(
            lines.next().unwrap(),
            "RoleID,RoleLabel,RoleShort,RoleColor,Status"
        );
        assert!(roles.contains("pm,PM,PM,"));

        let caps = fs::read_to_string(&files[1]).unwrap();
        // delta column is tgt - now
        assert!(caps.contains("1,General,"));
        assert!(caps.lines().nth(1).unwrap().ends_with(",2,4,2"));

        let assignments = fs::read_to_string(&files[2]).unwrap();
        // one row per (capability, role) pair with a value
        assert_eq!(assignments.lines().count(), 1 + 4);
        assert!(assignments.contains("1,dev,General,Design API,Dev,R,4,1,0"));
        assert!(assignments.contains("1,pm,General,Design API,PM,A,3,0,1"));
    }
}
