use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// `Null` is the missing-value marker produced by loading and coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so CellValue can key BTreeMaps --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "N/A"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Text is never parsed here; that is
    /// the resolver's coercion step.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Render the value as a label, `None` for missing or blank cells.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – the uploaded table before resolution
// ---------------------------------------------------------------------------

/// A rectangular table exactly as read from the upload: un-normalised
/// headers and untyped cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table, padding short rows with `Null` and truncating long ones
    /// so every row has one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy out one column.
    pub fn column(&self, idx: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Role / Severity – the semantic vocabulary
// ---------------------------------------------------------------------------

/// Semantic role a column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Id,
    Latitude,
    Longitude,
    PollutionIndex,
    PollutionLevel,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Id,
        Role::Latitude,
        Role::Longitude,
        Role::PollutionIndex,
        Role::PollutionLevel,
    ];

    /// Roles the map cannot be drawn without.
    pub const GEO_MANDATORY: [Role; 3] = [Role::Latitude, Role::Longitude, Role::PollutionIndex];

    /// Column name the role is renamed to.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Role::Id => "id",
            Role::Latitude => "latitude",
            Role::Longitude => "longitude",
            Role::PollutionIndex => "pollution_index",
            Role::PollutionLevel => "pollution_level",
        }
    }

    /// Labels are kept as text even when they look numeric.
    pub fn is_label(self) -> bool {
        matches!(self, Role::Id | Role::PollutionLevel)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Pollution classification assigned by the external scoring step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Perfect,
    Good,
    Moderate,
    Poor,
    VeryPoor,
    ExtremelyPoor,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Perfect,
        Severity::Good,
        Severity::Moderate,
        Severity::Poor,
        Severity::VeryPoor,
        Severity::ExtremelyPoor,
    ];

    /// Parse a classification label. Anything unrecognised lands on
    /// `ExtremelyPoor`.
    pub fn from_label(label: &str) -> Severity {
        let key: String = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .replace(['_', '-'], " ");
        match key.as_str() {
            "perfect" | "excellent" => Severity::Perfect,
            "good" => Severity::Good,
            "moderate" => Severity::Moderate,
            "poor" => Severity::Poor,
            "very poor" => Severity::VeryPoor,
            _ => Severity::ExtremelyPoor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Perfect => "Perfect",
            Severity::Good => "Good",
            Severity::Moderate => "Moderate",
            Severity::Poor => "Poor",
            Severity::VeryPoor => "Very Poor",
            Severity::ExtremelyPoor => "Extremely Poor",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CanonicalRow / CanonicalTable – the resolved dataset
// ---------------------------------------------------------------------------

/// Label shown wherever a row has no identifier.
pub const MISSING_LABEL: &str = "N/A";

/// A single sample with its resolved fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pollution_index: Option<f64>,
    pub pollution_level: Option<Severity>,
    /// Metal column name → concentration (mg/L). Missing cells are absent.
    pub metals: BTreeMap<String, f64>,
    /// Every other column, keyed by its unchanged name.
    pub auxiliary: BTreeMap<String, CellValue>,
}

impl CanonicalRow {
    /// Station label, falling back to [`MISSING_LABEL`].
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(MISSING_LABEL)
    }
}

/// What a source column was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum ColumnKind {
    Role(Role),
    Metal,
    Auxiliary,
}

/// Provenance of one output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnBinding {
    /// Header as it appeared in the upload.
    pub source: String,
    /// Name in the canonical table.
    pub name: String,
    pub kind: ColumnKind,
}

/// Resolved rows plus the header mapping that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalTable {
    pub rows: Vec<CanonicalRow>,
    /// One binding per input column, in input order.
    pub columns: Vec<ColumnBinding>,
}

impl CanonicalTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.columns
            .iter()
            .any(|c| c.kind == ColumnKind::Role(role))
    }

    /// Metal-concentration column names in input order.
    pub fn metal_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Metal)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Render back to a raw table with canonical headers.
    pub fn to_raw(&self) -> RawTable {
        let headers: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|binding| cell_for(row, binding))
                    .collect()
            })
            .collect();
        RawTable::new(headers, rows)
    }
}

fn cell_for(row: &CanonicalRow, binding: &ColumnBinding) -> CellValue {
    let float = |v: Option<f64>| v.map(CellValue::Float).unwrap_or(CellValue::Null);
    match binding.kind {
        ColumnKind::Role(Role::Id) => row
            .id
            .clone()
            .map(CellValue::Text)
            .unwrap_or(CellValue::Null),
        ColumnKind::Role(Role::Latitude) => float(row.latitude),
        ColumnKind::Role(Role::Longitude) => float(row.longitude),
        ColumnKind::Role(Role::PollutionIndex) => float(row.pollution_index),
        ColumnKind::Role(Role::PollutionLevel) => row
            .pollution_level
            .map(|s| CellValue::Text(s.label().to_string()))
            .unwrap_or(CellValue::Null),
        ColumnKind::Metal => float(row.metals.get(&binding.name).copied()),
        ColumnKind::Auxiliary => row
            .auxiliary
            .get(&binding.name)
            .cloned()
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_labels_parse_loosely() {
        assert_eq!(Severity::from_label("Very Poor"), Severity::VeryPoor);
        assert_eq!(Severity::from_label("  very_poor "), Severity::VeryPoor);
        assert_eq!(Severity::from_label("GOOD"), Severity::Good);
        assert_eq!(Severity::from_label("Excellent"), Severity::Perfect);
    }

    #[test]
    fn unknown_severity_falls_back_to_extremely_poor() {
        assert_eq!(Severity::from_label("Hazardous"), Severity::ExtremelyPoor);
        assert_eq!(Severity::from_label(""), Severity::ExtremelyPoor);
        assert_eq!(Severity::from_label("Extremely Poor"), Severity::ExtremelyPoor);
    }

    #[test]
    fn raw_table_pads_short_rows() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1)]],
        );
        assert_eq!(table.rows[0], vec![CellValue::Integer(1), CellValue::Null]);
    }

    #[test]
    fn row_label_defaults_once() {
        let row = CanonicalRow::default();
        assert_eq!(row.label(), MISSING_LABEL);
    }

    #[test]
    fn cell_values_order_nulls_first() {
        let mut values = vec![
            CellValue::Text("b".into()),
            CellValue::Float(1.5),
            CellValue::Null,
            CellValue::Integer(2),
        ];
        values.sort();
        assert_eq!(values[0], CellValue::Null);
        assert_eq!(values[3], CellValue::Text("b".into()));
    }
}
