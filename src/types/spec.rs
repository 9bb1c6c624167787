use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TableStyle;

/// Horizontal text placement inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlignment {
    /// Numeric code the document service uses for this alignment
    pub const fn host_code(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Right => 2,
            Self::Center => 3,
        }
    }

    /// Inverse of [`TextAlignment::host_code`]. Unknown codes read as center.
    pub const fn from_host_code(code: u8) -> Self {
        match code {
            1 => Self::Left,
            2 => Self::Right,
            _ => Self::Center,
        }
    }
}

/// Header labels keyed `"Column 1"`, `"Column 2"`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLabels(pub HashMap<String, String>);

impl ColumnLabels {
    pub fn key(column: usize) -> String {
        format!("Column {}", column + 1)
    }

    /// Label of a 0-based column; empty labels count as missing
    pub fn get(&self, column: usize) -> Option<&str> {
        self.0
            .get(&Self::key(column))
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    pub fn insert(&mut self, column: usize, label: impl Into<String>) {
        self.0.insert(Self::key(column), label.into());
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnLabels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut labels = Self::default();
        for (i, label) in iter.into_iter().enumerate() {
            labels.insert(i, label);
        }
        labels
    }
}

/// Cells of one data row, in column order. `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRow", into = "Vec<Option<String>>")]
pub struct RowCells(pub Vec<Option<String>>);

impl RowCells {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.0.get(column).and_then(|cell| cell.as_deref())
    }
}

impl<S: Into<String>> FromIterator<S> for RowCells {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| Some(s.into()).filter(|s: &String| !s.is_empty()))
                .collect(),
        )
    }
}

impl From<RowCells> for Vec<Option<String>> {
    fn from(row: RowCells) -> Self {
        row.0
    }
}

/// Rows arrive either as arrays or as records whose values are read in
/// insertion order.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRow {
    Cells(Vec<Value>),
    Record(serde_json::Map<String, Value>),
}

impl From<RawRow> for RowCells {
    fn from(raw: RawRow) -> Self {
        let values: Vec<Value> = match raw {
            RawRow::Cells(values) => values,
            RawRow::Record(map) => map.into_iter().map(|(_, v)| v).collect(),
        };
        Self(values.into_iter().map(cell_text).collect())
    }
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Everything needed to draw one table. Built fresh per creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    #[serde(alias = "columns")]
    pub column_count: i32,
    #[serde(alias = "rows")]
    pub row_count: i32,
    /// Space between cells and around the table; `None` uses the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gutter: Option<f64>,
    #[serde(default)]
    pub text_alignment: TextAlignment,
    #[serde(default, alias = "selectedStyle")]
    pub style: TableStyle,
    #[serde(default, alias = "columnValues")]
    pub column_labels: ColumnLabels,
    #[serde(default, alias = "rowData")]
    pub row_cells: Vec<RowCells>,
}

impl TableSpec {
    /// An unlabeled table in the default style
    pub fn new(column_count: i32, row_count: i32) -> Self {
        Self {
            column_count,
            row_count,
            gutter: None,
            text_alignment: TextAlignment::default(),
            style: TableStyle::default(),
            column_labels: ColumnLabels::default(),
            row_cells: Vec::new(),
        }
    }

    /// Size a table to imported records: one column per header, one row per record
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_records<H, R, S>(headers: H, records: R) -> Self
    where
        H: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let column_labels: ColumnLabels = headers.into_iter().collect();
        let row_cells: Vec<RowCells> = records
            .into_iter()
            .map(|record| record.into_iter().collect())
            .collect();
        let widest_row = row_cells.iter().map(|r| r.0.len()).max().unwrap_or(0);
        let columns = column_labels.0.len().max(widest_row).max(1);
        Self {
            column_count: i32::try_from(columns).unwrap_or(i32::MAX),
            row_count: i32::try_from(row_cells.len().max(1)).unwrap_or(i32::MAX),
            column_labels,
            row_cells,
            ..Self::new(1, 1)
        }
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.text_alignment = alignment;
        self
    }

    pub fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = Some(gutter);
        self
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.column_labels = labels.into_iter().collect();
        self
    }

    pub fn with_rows<S: Into<String>>(mut self, rows: impl IntoIterator<Item = Vec<S>>) -> Self {
        self.row_cells = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        self
    }

    /// Supplied header label of a 0-based column
    pub fn column_label(&self, column: usize) -> Option<&str> {
        self.column_labels.get(column)
    }

    /// Supplied text of a 0-based body cell
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.row_cells.get(row).and_then(|r| r.get(column))
    }
}

/// Label used when a column has no header text
pub fn fallback_column_label(column: usize) -> String {
    format!("Column {}", column + 1)
}

/// Label used when a body cell has no text
pub fn fallback_cell_label(row: usize, column: usize) -> String {
    format!("Row {}, Col {}", row + 1, column + 1)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_panel_payload() {
        let json = r##"{
            "columns": 2,
            "rows": 2,
            "gutter": 6,
            "textAlignment": "left",
            "selectedStyle": {
                "id": 3,
                "name": "Basic blue",
                "image": "table_blue.png",
                "isActive": false,
                "border": "#0082CB",
                "colors": {
                    "header": "#0082CB", "row": "#B0C8E2", "stroke": "#FFFFFF",
                    "alt_row": "#E3EDFC", "row_text": "#FFFFFF",
                    "alt_row_text": "#243E84", "header_text": "#FFFFFF"
                }
            },
            "columnValues": {"Column 1": "Name", "Column 2": "Email"},
            "rowData": [
                {"Name": "Ann", "Email": "a@x.com"},
                ["Bo", null]
            ]
        }"##;
        let spec: TableSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.column_count, 2);
        assert_eq!(spec.text_alignment, TextAlignment::Left);
        assert_eq!(spec.style.name, "Basic blue");
        assert_eq!(spec.column_label(1), Some("Email"));
        assert_eq!(spec.cell(0, 1), Some("a@x.com"));
        assert_eq!(spec.cell(1, 0), Some("Bo"));
        assert_eq!(spec.cell(1, 1), None);
        assert_eq!(spec.cell(5, 0), None);
    }

    #[test]
    fn test_record_values_keep_insertion_order() {
        let row: RowCells = serde_json::from_str(r#"{"b": "first", "a": 2}"#).unwrap();
        assert_eq!(row.get(0), Some("first"));
        assert_eq!(row.get(1), Some("2"));
    }

    #[test]
    fn test_empty_strings_are_missing() {
        let spec = TableSpec::new(1, 1)
            .with_labels([""])
            .with_rows([vec![""]]);
        assert_eq!(spec.column_label(0), None);
        assert_eq!(spec.cell(0, 0), None);
    }

    #[test]
    fn test_from_records_sizes_table() {
        let spec = TableSpec::from_records(
            ["Name", "Email"],
            [vec!["Ann", "a@x.com"], vec!["Bo", "b@x.com"], vec!["Cy", "c@x.com"]],
        );
        assert_eq!(spec.column_count, 2);
        assert_eq!(spec.row_count, 3);
        assert_eq!(spec.cell(2, 1), Some("c@x.com"));
    }

    #[test]
    fn test_fallback_labels() {
        assert_eq!(fallback_column_label(0), "Column 1");
        assert_eq!(fallback_cell_label(2, 0), "Row 3, Col 1");
    }

    #[test]
    fn test_alignment_host_codes() {
        for alignment in [TextAlignment::Left, TextAlignment::Center, TextAlignment::Right] {
            assert_eq!(TextAlignment::from_host_code(alignment.host_code()), alignment);
        }
    }
}
