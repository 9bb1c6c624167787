use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::Result;

/// Hex colors of one table style, keyed the way the panel UI sends them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColors {
    pub header: String,
    pub row: String,
    pub stroke: String,
    pub alt_row: String,
    pub row_text: String,
    pub alt_row_text: String,
    pub header_text: String,
}

/// A named table style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub colors: TableColors,
    /// Preview border color shown by the style gallery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default)]
    pub stroke: StrokePolicy,
}

impl Default for TableStyle {
    fn default() -> Self {
        crate::styles::default_style()
    }
}

/// How cell outlines are sized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StrokePolicy {
    /// Proportional to the minimum column width, clamped to `1..=maxStrokeWidth`
    #[default]
    Auto,
    /// A fixed width in pixels
    Fixed(f64),
}

/// `TableColors` parsed into host colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub header: Rgba,
    pub header_text: Rgba,
    pub row: Rgba,
    pub row_text: Rgba,
    pub alt_row: Rgba,
    pub alt_row_text: Rgba,
    pub stroke: Rgba,
}

impl Palette {
    /// Fill and text color of a data row. Even rows (0-based) use the alternate pair.
    pub fn row_colors(&self, row_index: usize) -> (Rgba, Rgba) {
        if row_index % 2 == 0 {
            (self.alt_row, self.alt_row_text)
        } else {
            (self.row, self.row_text)
        }
    }
}

impl TableColors {
    /// Parse every hex string; the first malformed one fails the whole palette.
    pub fn resolve(&self) -> Result<Palette> {
        Ok(Palette {
            header: Rgba::from_hex(&self.header)?,
            header_text: Rgba::from_hex(&self.header_text)?,
            row: Rgba::from_hex(&self.row)?,
            row_text: Rgba::from_hex(&self.row_text)?,
            alt_row: Rgba::from_hex(&self.alt_row)?,
            alt_row_text: Rgba::from_hex(&self.alt_row_text)?,
            stroke: Rgba::from_hex(&self.stroke)?,
        })
    }
}
