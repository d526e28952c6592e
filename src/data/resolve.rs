use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::Serialize;

use super::coerce::{blank_to_null, coerce_column};
use super::model::{
    CanonicalRow, CanonicalTable, CellValue, ColumnBinding, ColumnKind, RawTable, Role, Severity,
};
use super::schema::{is_metal, lookup_role};

/// Result of resolving a raw table. Never an error: callers check
/// `unresolved` (or [`Resolution::missing`]) against what their feature needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub table: CanonicalTable,
    /// Mandatory geospatial roles no column matched.
    pub unresolved: Vec<Role>,
}

impl Resolution {
    /// Which of `required` the table lacks, in the order given.
    pub fn missing(&self, required: &[Role]) -> Vec<Role> {
        required
            .iter()
            .copied()
            .filter(|role| !self.table.has_role(*role))
            .collect()
    }
}

/// Bind headers to roles, coerce column types and build canonical rows.
pub fn resolve(raw: &RawTable) -> Resolution {
    let columns = bind_columns(&raw.headers);

    let coerced: Vec<Vec<CellValue>> = columns
        .iter()
        .enumerate()
        .map(|(idx, binding)| {
            let values = raw.column(idx);
            match binding.kind {
                ColumnKind::Role(role) if role.is_label() => {
                    values.into_iter().map(blank_to_null).collect()
                }
                _ => {
                    let out = coerce_column(values);
                    if out.lost > 0 {
                        debug!(
                            "column '{}': {} cell(s) not numeric, treated as missing",
                            binding.source, out.lost
                        );
                    }
                    out.values
                }
            }
        })
        .collect();

    let rows = (0..raw.len())
        .map(|row_idx| build_row(&columns, &coerced, row_idx))
        .collect();

    let table = CanonicalTable { rows, columns };
    let unresolved: Vec<Role> = Role::GEO_MANDATORY
        .into_iter()
        .filter(|role| !table.has_role(*role))
        .collect();

    info!(
        "resolved {} row(s), {} column(s), {} metal column(s)",
        table.len(),
        table.columns.len(),
        table.metal_columns().len()
    );
    if !unresolved.is_empty() {
        warn!(
            "unresolved mandatory column(s): {}",
            unresolved
                .iter()
                .map(|r| r.canonical_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Resolution { table, unresolved }
}

/// First header matching a role wins; later matches stay auxiliary.
/// Output names are made unique with a `.n` suffix.
fn bind_columns(headers: &[String]) -> Vec<ColumnBinding> {
    let mut bound: BTreeSet<Role> = BTreeSet::new();
    let mut names: BTreeSet<String> = BTreeSet::new();

    headers
        .iter()
        .map(|source| {
            let kind = match lookup_role(source) {
                Some(role) if bound.insert(role) => ColumnKind::Role(role),
                Some(role) => {
                    debug!("column '{source}' also matches {role}, keeping it as auxiliary");
                    ColumnKind::Auxiliary
                }
                None if is_metal(source) => ColumnKind::Metal,
                None => ColumnKind::Auxiliary,
            };
            let base = match kind {
                ColumnKind::Role(role) => role.canonical_name().to_string(),
                _ => source.clone(),
            };
            let name = unique_name(&mut names, base);
            debug!("column '{source}' -> '{name}' ({kind:?})");
            ColumnBinding {
                source: source.clone(),
                name,
                kind,
            }
        })
        .collect()
}

fn unique_name(taken: &mut BTreeSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn build_row(columns: &[ColumnBinding], coerced: &[Vec<CellValue>], row_idx: usize) -> CanonicalRow {
    let mut row = CanonicalRow::default();

    for (binding, values) in columns.iter().zip(coerced) {
        let cell = &values[row_idx];
        match binding.kind {
            ColumnKind::Role(Role::Id) => row.id = cell.as_label(),
            ColumnKind::Role(Role::Latitude) => row.latitude = cell.as_f64(),
            ColumnKind::Role(Role::Longitude) => row.longitude = cell.as_f64(),
            ColumnKind::Role(Role::PollutionIndex) => row.pollution_index = cell.as_f64(),
            ColumnKind::Role(Role::PollutionLevel) => {
                row.pollution_level = cell.as_label().map(|l| Severity::from_label(&l))
            }
            ColumnKind::Metal => {
                if let Some(v) = cell.as_f64() {
                    row.metals.insert(binding.name.clone(), v);
                }
            }
            ColumnKind::Auxiliary => {
                row.auxiliary.insert(binding.name.clone(), cell.clone());
            }
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn raw(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn synonyms_bind_and_rename() {
        let res = resolve(&raw(
            &["Station Name", " LAT ", "Lng", "HMPI", "Pollution Level"],
            vec![vec![text("S1"), text("12.9"), text("77.5"), text("120"), text("Poor")]],
        ));
        assert!(res.unresolved.is_empty());
        let names: Vec<&str> = res.table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["id", "latitude", "longitude", "pollution_index", "pollution_level"]
        );
        let row = &res.table.rows[0];
        assert_eq!(row.id.as_deref(), Some("S1"));
        assert_eq!(row.latitude, Some(12.9));
        assert_eq!(row.longitude, Some(77.5));
        assert_eq!(row.pollution_index, Some(120.0));
        assert_eq!(row.pollution_level, Some(Severity::Poor));
    }

    #[test]
    fn first_matching_column_wins() {
        let res = resolve(&raw(
            &["lat", "Latitude", "lon", "hmpi"],
            vec![vec![text("1.0"), text("2.0"), text("3.0"), text("4.0")]],
        ));
        let second = &res.table.columns[1];
        assert_eq!(second.kind, ColumnKind::Auxiliary);
        assert_eq!(second.name, "Latitude");
        assert_eq!(res.table.rows[0].latitude, Some(1.0));
        assert_eq!(
            res.table.rows[0].auxiliary.get("Latitude"),
            Some(&CellValue::Float(2.0))
        );
    }

    #[test]
    fn duplicate_canonical_names_get_suffixes() {
        let res = resolve(&raw(&["lat", "latitude"], vec![]));
        assert_eq!(res.table.columns[0].name, "latitude");
        assert_eq!(res.table.columns[1].name, "latitude.1");
    }

    #[test]
    fn metals_are_tagged_and_others_pass_through() {
        let res = resolve(&raw(
            &["lat", "lon", "hmpi", "PB", "cd", "pH", "Remarks"],
            vec![vec![
                text("1"),
                text("2"),
                text("3"),
                text("0.05"),
                text("bdl"),
                text("7.1"),
                text("near drain"),
            ]],
        ));
        assert_eq!(res.table.metal_columns(), vec!["PB", "cd"]);
        let row = &res.table.rows[0];
        assert_eq!(row.metals.get("PB"), Some(&0.05));
        assert!(!row.metals.contains_key("cd"));
        assert_eq!(row.auxiliary.get("pH"), Some(&CellValue::Float(7.1)));
        assert_eq!(row.auxiliary.get("Remarks"), Some(&text("near drain")));
    }

    #[test]
    fn missing_roles_are_reported_not_raised() {
        let res = resolve(&raw(&["lat", "HMPI"], vec![vec![text("1"), text("2")]]));
        assert_eq!(res.unresolved, vec![Role::Longitude]);
        assert!(res.missing(&[Role::PollutionIndex]).is_empty());
        assert_eq!(
            res.missing(&[Role::Id, Role::Longitude]),
            vec![Role::Id, Role::Longitude]
        );
    }

    #[test]
    fn numeric_looking_station_ids_stay_labels() {
        let res = resolve(&raw(
            &["station", "lat"],
            vec![vec![text("101"), text("1")], vec![text("Site B"), text("2")]],
        ));
        assert_eq!(res.table.rows[0].id.as_deref(), Some("101"));
        assert_eq!(res.table.rows[1].id.as_deref(), Some("Site B"));
    }

    #[test]
    fn unparseable_cells_become_missing() {
        let res = resolve(&raw(
            &["lat", "lon", "hmpi"],
            vec![
                vec![text("12.9"), text("77.5"), text("oops")],
                vec![text("?"), text("77.6"), text("45")],
            ],
        ));
        assert_eq!(res.table.rows[0].pollution_index, None);
        assert_eq!(res.table.rows[1].latitude, None);
        assert_eq!(res.table.rows[1].pollution_index, Some(45.0));
    }

    #[test]
    fn canonical_table_resolves_to_itself() {
        let input = raw(
            &[
                "id",
                "latitude",
                "longitude",
                "pollution_index",
                "pollution_level",
                "As",
                "notes",
            ],
            vec![
                vec![
                    text("S1"),
                    CellValue::Float(12.9),
                    CellValue::Float(77.5),
                    CellValue::Float(120.0),
                    text("Poor"),
                    CellValue::Float(0.01),
                    text("ok"),
                ],
                vec![
                    text("S2"),
                    CellValue::Float(13.0),
                    CellValue::Null,
                    CellValue::Float(45.0),
                    text("Good"),
                    CellValue::Null,
                    CellValue::Null,
                ],
            ],
        );
        let first = resolve(&input);
        assert_eq!(first.table.to_raw().headers, input.headers);
        assert_eq!(first.table.to_raw(), input);
        let second = resolve(&first.table.to_raw());
        assert_eq!(second, first);
    }
}
