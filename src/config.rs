//! Layout tunables.
//!
//! Defaults reproduce the dimensions the add-on has always drawn with.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Fraction of a cell's available width used as the wrap threshold
pub const DEFAULT_WRAP_WIDTH_FRACTION: f64 = 0.85;

/// Dimension and text-fitting parameters for table layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Narrowest a column may be
    pub min_column_width: f64,
    /// Widest a column may be, however long its header
    pub max_column_width: f64,
    /// Added to the measured header width before clamping
    pub header_padding: f64,
    /// Nominal height shared between all data rows
    pub table_height: f64,
    /// Floor for the per-row share of `table_height`
    pub min_row_height: f64,
    /// Stroke width as a fraction of `min_column_width`
    pub stroke_factor: f64,
    pub max_stroke_width: f64,
    /// Inset of cell text from the cell edge, both axes
    pub cell_padding: f64,
    pub font_size: f64,
    pub wrap_width_fraction: f64,
    /// Smallest chunk when breaking a single long token
    pub min_chunk_chars: usize,
    /// Width measurements remembered per builder; 0 disables
    pub measure_cache_capacity: usize,
    /// Gutter used when the table spec carries none
    pub default_gutter: f64,
    /// Largest column count a spec may ask for
    pub max_columns: usize,
    /// Largest data row count a spec may ask for
    pub max_rows: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_column_width: 150.0,
            max_column_width: 250.0,
            header_padding: 40.0,
            table_height: 200.0,
            min_row_height: 70.0,
            stroke_factor: 0.015,
            max_stroke_width: 5.0,
            cell_padding: 10.0,
            font_size: 15.0,
            wrap_width_fraction: DEFAULT_WRAP_WIDTH_FRACTION,
            min_chunk_chars: 5,
            measure_cache_capacity: 256,
            default_gutter: 6.0,
            max_columns: 100,
            max_rows: 1000,
        }
    }
}

impl LayoutConfig {
    /// Reject configurations that cannot produce a table
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("minColumnWidth", self.min_column_width),
            ("maxColumnWidth", self.max_column_width),
            ("headerPadding", self.header_padding),
            ("tableHeight", self.table_height),
            ("minRowHeight", self.min_row_height),
            ("strokeFactor", self.stroke_factor),
            ("maxStrokeWidth", self.max_stroke_width),
            ("cellPadding", self.cell_padding),
            ("fontSize", self.font_size),
            ("wrapWidthFraction", self.wrap_width_fraction),
            ("defaultGutter", self.default_gutter),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TableError::InvalidConfig(format!("{name} must be finite")));
        }
        if self.min_column_width <= 0.0 {
            return Err(TableError::InvalidConfig(
                "minColumnWidth must be positive".into(),
            ));
        }
        if self.max_column_width < self.min_column_width {
            return Err(TableError::InvalidConfig(format!(
                "maxColumnWidth {} is below minColumnWidth {}",
                self.max_column_width, self.min_column_width
            )));
        }
        if self.min_row_height <= 0.0 || self.table_height < 0.0 {
            return Err(TableError::InvalidConfig(
                "minRowHeight must be positive and tableHeight non-negative".into(),
            ));
        }
        if self.max_columns == 0 || self.max_rows == 0 {
            return Err(TableError::InvalidConfig(
                "maxColumns and maxRows must be at least 1".into(),
            ));
        }
        if self.max_stroke_width < 1.0 {
            return Err(TableError::InvalidConfig(
                "maxStrokeWidth must be at least 1".into(),
            ));
        }
        if !(self.wrap_width_fraction > 0.0 && self.wrap_width_fraction <= 1.0) {
            return Err(TableError::InvalidConfig(
                "wrapWidthFraction must be in (0, 1]".into(),
            ));
        }
        if self.font_size <= 0.0 {
            return Err(TableError::InvalidConfig("fontSize must be positive".into()));
        }
        if self.min_chunk_chars == 0 {
            return Err(TableError::InvalidConfig(
                "minChunkChars must be at least 1".into(),
            ));
        }
        if self.default_gutter < 0.0 || self.cell_padding < 0.0 {
            return Err(TableError::InvalidConfig(
                "gutter and padding cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"wrapWidthFraction": 0.75, "minRowHeight": 40}"#).unwrap();
        assert_eq!(config.wrap_width_fraction, 0.75);
        assert_eq!(config.min_row_height, 40.0);
        assert_eq!(config.max_column_width, 250.0);
    }

    #[test]
    fn test_inverted_width_range_rejected() {
        let config = LayoutConfig {
            max_column_width: 100.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_row_height_must_be_positive() {
        for (table_height, min_row_height) in [(0.0, 0.0), (200.0, 0.0), (-100.0, 10.0)] {
            let config = LayoutConfig {
                table_height,
                min_row_height,
                ..LayoutConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(TableError::InvalidConfig(_))),
                "{table_height}/{min_row_height} accepted"
            );
        }
    }

    #[test]
    fn test_count_limits_read_from_json() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"maxColumns": 4, "maxRows": 0}"#).unwrap();
        assert_eq!(config.max_columns, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wrap_fraction_bounds() {
        for fraction in [0.0, -0.5, 1.5, f64::NAN] {
            let config = LayoutConfig {
                wrap_width_fraction: fraction,
                ..LayoutConfig::default()
            };
            assert!(config.validate().is_err(), "{fraction} accepted");
        }
    }
}
