//! Table construction.
//!
//! Columns are sized from their header labels, rows share a base height
//! derived from the nominal table height, and data rows grow to fit wrapped
//! text. The resulting tree is
//!
//! ```text
//! root
//! ├── header row   (child 0)
//! │   └── cell     (group of rectangle + text), one per column
//! ├── data row 0   (child 1)
//! └── data row r   (child r + 1)
//! ```
//!
//! Shapes already appended stay in the document if a later host call fails.

use serde::Serialize;

use super::cell::{create_cell, CellBox, CellRequest};
use super::measure::TextMeasurer;
use crate::config::LayoutConfig;
use crate::error::{Result, TableError};
use crate::host::DocumentHost;
use crate::types::{
    fallback_cell_label, fallback_column_label, NodeId, Palette, Stroke, StrokePolicy,
    TableMetadata, TableSpec, METADATA_KEY,
};

/// One drawn row (header or data)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    pub group: NodeId,
    pub y: f64,
    /// Height shared by every cell of the row
    pub height: f64,
    pub cells: Vec<CellBox>,
}

/// A table created in the document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGroup {
    pub root: NodeId,
    pub header: RowLayout,
    pub rows: Vec<RowLayout>,
    pub column_widths: Vec<f64>,
    /// Sum of the column widths
    pub total_width: f64,
    pub base_row_height: f64,
    pub stroke_width: f64,
    /// Uniform scale applied because the table was wider than the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    pub metadata: TableMetadata,
}

impl TableGroup {
    pub fn row(&self, index: usize) -> Option<&RowLayout> {
        self.rows.get(index)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellBox> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }
}

/// Lays out tables and draws them through a document host
pub struct TableBuilder {
    config: LayoutConfig,
    measurer: TextMeasurer,
}

fn positive_count(count: i32, max: usize, what: &str) -> Result<usize> {
    if count <= 0 {
        return Err(TableError::InvalidDimension(format!(
            "table needs at least one {what}, got {count}"
        )));
    }
    match usize::try_from(count) {
        Ok(count) if count <= max => Ok(count),
        _ => Err(TableError::InvalidDimension(format!(
            "{what} count {count} exceeds the limit of {max}"
        ))),
    }
}

impl TableBuilder {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let measurer = TextMeasurer::new(&config);
        Ok(Self { config, measurer })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    /// Rendered width of `text`, see [`TextMeasurer::measure_width`]
    pub fn measure_width<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<f64> {
        self.measurer.measure_width(host, text)
    }

    /// Rendered width of `text` as the host draws it now
    pub fn measure_width_fresh<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<f64> {
        self.measurer.measure_fresh(host, text)
    }

    /// Wrap without drawing, see [`TextMeasurer::wrap`]
    pub fn wrap<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        available_width: f64,
        measured_full_width: f64,
    ) -> Result<String> {
        self.measurer
            .wrap(host, text, available_width, measured_full_width)
    }

    /// Draw a standalone cell
    pub fn create_cell<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        request: &CellRequest<'_>,
    ) -> Result<CellBox> {
        create_cell(host, &mut self.measurer, &self.config, request)
    }

    /// Width of a column whose header reads `label`
    pub fn column_width<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        label: &str,
    ) -> Result<f64> {
        let text_width = self.measurer.measure_width(host, label)?;
        Ok((text_width + self.config.header_padding)
            .max(self.config.min_column_width)
            .min(self.config.max_column_width))
    }

    /// Height every row starts from before text wrapping
    #[allow(clippy::cast_precision_loss)]
    pub fn base_row_height(&self, rows: usize) -> Result<f64> {
        let height = (self.config.table_height / rows as f64).max(self.config.min_row_height);
        if !(height > 0.0 && height.is_finite()) {
            return Err(TableError::Layout(format!(
                "row height {height} computed for {rows} rows"
            )));
        }
        Ok(height)
    }

    pub fn stroke_width(&self, policy: StrokePolicy) -> f64 {
        match policy {
            StrokePolicy::Auto => (self.config.min_column_width * self.config.stroke_factor)
                .max(1.0)
                .min(self.config.max_stroke_width),
            StrokePolicy::Fixed(width) => width.max(0.0),
        }
    }

    /// Draw `spec` into the host's active container.
    ///
    /// Dimension, color and gutter problems are reported before anything is
    /// created. A host failure part-way leaves what was already appended.
    /// Remembered widths are dropped first so the table follows the host's
    /// current default font.
    pub fn create_table<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        spec: &TableSpec,
    ) -> Result<TableGroup> {
        self.measurer.clear_cache();
        self.build(host, spec).map_err(|e| {
            if e.is_host_failure() {
                tracing::error!(
                    target: "express_tables::layout",
                    error = %e,
                    "table creation failed; document may hold a partial table"
                );
            } else {
                tracing::warn!(target: "express_tables::layout", error = %e, "table rejected");
            }
            e
        })
    }

    fn build<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        spec: &TableSpec,
    ) -> Result<TableGroup> {
        let columns = positive_count(spec.column_count, self.config.max_columns, "column")?;
        let rows = positive_count(spec.row_count, self.config.max_rows, "row")?;
        let palette = spec.style.colors.resolve()?;
        let gutter = spec.gutter.unwrap_or(self.config.default_gutter);
        if !(gutter.is_finite() && gutter >= 0.0) {
            return Err(TableError::InvalidDimension(format!(
                "gutter must be a non-negative number, got {gutter}"
            )));
        }
        let base_height = self.base_row_height(rows)?;
        let stroke = Stroke {
            color: palette.stroke,
            width: self.stroke_width(spec.style.stroke),
        };

        let labels: Vec<String> = (0..columns)
            .map(|c| match spec.column_label(c) {
                Some(label) => label.to_string(),
                None => {
                    let label = fallback_column_label(c);
                    tracing::warn!(
                        target: "express_tables::layout",
                        column = c,
                        %label,
                        "missing header label, using fallback"
                    );
                    label
                }
            })
            .collect();

        let mut column_widths = Vec::with_capacity(columns);
        for label in &labels {
            column_widths.push(self.column_width(host, label)?);
        }
        let total_width: f64 = column_widths.iter().sum();

        let root = host.create_group()?;
        let mut y = gutter;

        let header = self.build_header(
            host,
            spec,
            &palette,
            stroke,
            &labels,
            &column_widths,
            gutter,
            y,
            base_height,
        )?;
        host.append_child(&root, &header.group)?;
        y += header.height + gutter;

        let mut data_rows = Vec::with_capacity(rows);
        for r in 0..rows {
            let row = self.build_row(
                host,
                spec,
                &palette,
                stroke,
                r,
                &column_widths,
                gutter,
                y,
                base_height,
            )?;
            host.append_child(&root, &row.group)?;
            y += row.height + gutter;
            data_rows.push(row);
        }

        let parent = host.insertion_parent()?;
        host.append_child(&parent, &root)?;

        let metadata = TableMetadata::new(
            root.clone(),
            u32::try_from(columns).unwrap_or(u32::MAX),
            u32::try_from(rows).unwrap_or(u32::MAX),
        );
        host.set_metadata(&root, METADATA_KEY, &metadata.to_json()?)?;

        let scale = Self::fit_to_canvas(host, &root)?;

        tracing::info!(
            target: "express_tables::layout",
            table = %root,
            columns,
            rows,
            total_width,
            "table created"
        );

        Ok(TableGroup {
            root,
            header,
            rows: data_rows,
            column_widths,
            total_width,
            base_row_height: base_height,
            stroke_width: stroke.width,
            scale,
            metadata,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_header<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        spec: &TableSpec,
        palette: &Palette,
        stroke: Stroke,
        labels: &[String],
        widths: &[f64],
        gutter: f64,
        y: f64,
        height: f64,
    ) -> Result<RowLayout> {
        let group = host.create_group()?;
        let mut cells = Vec::with_capacity(widths.len());
        let mut x = gutter;
        for (label, &width) in labels.iter().zip(widths) {
            let cell = create_cell(
                host,
                &mut self.measurer,
                &self.config,
                &CellRequest {
                    width,
                    height,
                    fill: palette.header,
                    text_color: palette.header_text,
                    x,
                    y,
                    text: label,
                    alignment: spec.text_alignment,
                    stroke,
                    wrap: false,
                },
            )?;
            host.append_child(&group, &cell.group)?;
            x += width + gutter;
            cells.push(cell);
        }
        Ok(RowLayout {
            group,
            y,
            height,
            cells,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_row<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        spec: &TableSpec,
        palette: &Palette,
        stroke: Stroke,
        row: usize,
        widths: &[f64],
        gutter: f64,
        y: f64,
        base_height: f64,
    ) -> Result<RowLayout> {
        let (fill, text_color) = palette.row_colors(row);
        let group = host.create_group()?;
        let mut cells: Vec<CellBox> = Vec::with_capacity(widths.len());
        let mut row_height = base_height;
        let mut synthesized = 0usize;
        let mut x = gutter;

        for (column, &width) in widths.iter().enumerate() {
            let fallback;
            let text = match spec.cell(row, column) {
                Some(text) => text,
                None => {
                    synthesized += 1;
                    fallback = fallback_cell_label(row, column);
                    fallback.as_str()
                }
            };
            let cell = create_cell(
                host,
                &mut self.measurer,
                &self.config,
                &CellRequest {
                    width,
                    height: base_height,
                    fill,
                    text_color,
                    x,
                    y,
                    text,
                    alignment: spec.text_alignment,
                    stroke,
                    wrap: true,
                },
            )?;
            host.append_child(&group, &cell.group)?;
            row_height = row_height.max(cell.height);
            x += width + gutter;
            cells.push(cell);
        }

        if synthesized > 0 {
            tracing::warn!(
                target: "express_tables::layout",
                row,
                cells = synthesized,
                "missing cell text, using fallback labels"
            );
        }

        for cell in &mut cells {
            if cell.height < row_height {
                cell.set_height(host, &self.config, row_height)?;
            }
        }

        Ok(RowLayout {
            group,
            y,
            height: row_height,
            cells,
        })
    }

    /// Scale the table down uniformly when it is wider than the page
    fn fit_to_canvas<H: DocumentHost + ?Sized>(
        host: &mut H,
        root: &NodeId,
    ) -> Result<Option<f64>> {
        let canvas_width = host.canvas_size()?.width;
        let table_width = host.bounds_local(root)?.width;
        if !(table_width > canvas_width && table_width > 0.0) {
            return Ok(None);
        }
        let factor = canvas_width / table_width;
        let transform = host.transform(root)?.scaled(factor, factor);
        host.set_transform(root, transform)?;
        tracing::warn!(
            target: "express_tables::layout",
            table_width,
            canvas_width,
            factor,
            "table wider than page, scaled down"
        );
        Ok(Some(factor))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;

    fn builder() -> TableBuilder {
        TableBuilder::new(LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_column_width_clamped() {
        let mut doc = MemoryDocument::new();
        let mut b = builder();
        assert_eq!(b.column_width(&mut doc, "").unwrap(), 150.0);
        assert_eq!(b.column_width(&mut doc, "A fairly long header").unwrap(), 190.0);
        assert_eq!(b.column_width(&mut doc, &"x".repeat(200)).unwrap(), 250.0);
    }

    #[test]
    fn test_base_row_height_floor() {
        let b = builder();
        assert_eq!(b.base_row_height(1).unwrap(), 200.0);
        assert_eq!(b.base_row_height(2).unwrap(), 100.0);
        assert_eq!(b.base_row_height(10).unwrap(), 70.0);
    }

    #[test]
    fn test_zero_row_height_rejected_before_drawing() {
        let config = LayoutConfig {
            table_height: 0.0,
            min_row_height: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            TableBuilder::new(config),
            Err(TableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_count_limit() {
        assert_eq!(positive_count(100, 100, "column").unwrap(), 100);
        assert!(matches!(
            positive_count(101, 100, "column"),
            Err(TableError::InvalidDimension(_))
        ));
        assert!(matches!(
            positive_count(i32::MAX, 1000, "row"),
            Err(TableError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_stroke_width_policies() {
        let b = builder();
        assert!((b.stroke_width(StrokePolicy::Auto) - 2.25).abs() < 1e-9);
        assert_eq!(b.stroke_width(StrokePolicy::Fixed(3.0)), 3.0);
        assert_eq!(b.stroke_width(StrokePolicy::Fixed(-1.0)), 0.0);
    }

    #[test]
    fn test_auto_stroke_capped() {
        let config = LayoutConfig {
            min_column_width: 240.0,
            stroke_factor: 0.5,
            ..LayoutConfig::default()
        };
        let b = TableBuilder::new(config).unwrap();
        assert_eq!(b.stroke_width(StrokePolicy::Auto), 5.0);
    }

    #[test]
    fn test_invalid_counts_create_nothing() {
        let mut doc = MemoryDocument::new();
        let mut b = builder();
        for (columns, rows) in [(0, 3), (2, 0), (-1, 1)] {
            let err = b.create_table(&mut doc, &TableSpec::new(columns, rows)).unwrap_err();
            assert!(matches!(err, TableError::InvalidDimension(_)));
        }
        assert_eq!(doc.created_count(), 0);
    }

    #[test]
    fn test_negative_gutter_rejected() {
        let mut doc = MemoryDocument::new();
        let mut b = builder();
        let spec = TableSpec::new(1, 1).with_gutter(-2.0);
        assert!(matches!(
            b.create_table(&mut doc, &spec),
            Err(TableError::InvalidDimension(_))
        ));
    }
}
