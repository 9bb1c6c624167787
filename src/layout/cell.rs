//! A single table cell: background rectangle plus text, grouped.

use serde::Serialize;

use super::measure::TextMeasurer;
use crate::color::Rgba;
use crate::config::LayoutConfig;
use crate::error::{Result, TableError};
use crate::host::DocumentHost;
use crate::types::{CharacterStyle, NodeId, Point, Stroke, TextAlignment};

/// Everything needed to draw one cell
#[derive(Debug, Clone)]
pub struct CellRequest<'a> {
    pub width: f64,
    pub height: f64,
    pub fill: Rgba,
    pub text_color: Rgba,
    pub x: f64,
    pub y: f64,
    pub text: &'a str,
    pub alignment: TextAlignment,
    pub stroke: Stroke,
    /// Break text that is wider than the cell; headers are drawn unwrapped
    pub wrap: bool,
}

/// A drawn cell and the nodes that make it up
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBox {
    pub group: NodeId,
    pub rect: NodeId,
    pub text_node: NodeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// May exceed the requested height when wrapped text needed more room
    pub height: f64,
    pub fill: Rgba,
    pub stroke: Stroke,
    /// Text as rendered, including inserted line breaks
    pub text: String,
    pub alignment: TextAlignment,
    pub wrapped: bool,
}

impl CellBox {
    /// Stretch the rectangle to `height` and keep the text vertically centered
    pub(crate) fn set_height<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        config: &LayoutConfig,
        height: f64,
    ) -> Result<()> {
        host.set_size(&self.rect, self.width, height)?;
        host.set_translation(
            &self.text_node,
            text_anchor(self.x, self.y, self.width, height, self.alignment, config),
        )?;
        self.height = height;
        Ok(())
    }
}

/// Where a text node is anchored inside its cell
pub fn text_anchor(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    alignment: TextAlignment,
    config: &LayoutConfig,
) -> Point {
    let tx = match alignment {
        TextAlignment::Left => x + config.cell_padding,
        TextAlignment::Right => x + width - config.cell_padding,
        TextAlignment::Center => x + width / 2.0,
    };
    Point::new(tx, y + height / 2.0)
}

/// Draw one cell. Nothing is created when the size is not positive.
pub fn create_cell<H: DocumentHost + ?Sized>(
    host: &mut H,
    measurer: &mut TextMeasurer,
    config: &LayoutConfig,
    request: &CellRequest<'_>,
) -> Result<CellBox> {
    if !(request.width > 0.0 && request.height > 0.0) {
        return Err(TableError::InvalidDimension(format!(
            "cell must have positive size, got {}x{}",
            request.width, request.height
        )));
    }

    let rect = host.create_rectangle()?;
    host.set_size(&rect, request.width, request.height)?;
    host.set_translation(&rect, Point::new(request.x, request.y))?;
    host.set_fill(&rect, request.fill)?;
    host.set_stroke(&rect, request.stroke)?;

    let text_node = host.create_text()?;
    host.set_text(&text_node, request.text)?;
    host.apply_character_style(
        &text_node,
        &CharacterStyle {
            font_size: config.font_size,
            color: request.text_color,
        },
    )?;

    let mut height = request.height;
    let mut rendered = request.text.to_string();
    let mut wrapped = false;
    if request.wrap && !request.text.is_empty() {
        let available = request.width - 2.0 * config.cell_padding;
        let measured = host.bounds_local(&text_node)?.width;
        if measured > available {
            rendered = measurer.wrap(host, request.text, available, measured)?;
            wrapped = rendered != request.text;
            host.set_text(&text_node, &rendered)?;

            let needed = host.bounds_local(&text_node)?.height + 2.0 * config.cell_padding;
            if needed > height {
                host.set_size(&rect, request.width, needed)?;
                height = needed;
            }
            tracing::debug!(
                target: "express_tables::layout",
                text = request.text,
                measured,
                available,
                height,
                "cell text wrapped"
            );
        }
    }

    host.set_text_alignment(&text_node, request.alignment)?;
    host.set_translation(
        &text_node,
        text_anchor(
            request.x,
            request.y,
            request.width,
            height,
            request.alignment,
            config,
        ),
    )?;

    let group = host.create_group()?;
    host.append_child(&group, &rect)?;
    host.append_child(&group, &text_node)?;

    Ok(CellBox {
        group,
        rect,
        text_node,
        x: request.x,
        y: request.y,
        width: request.width,
        height,
        fill: request.fill,
        stroke: request.stroke,
        text: rendered,
        alignment: request.alignment,
        wrapped,
    })
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
    use crate::host::{DocumentQuery, MemoryDocument};

    fn request(text: &str) -> CellRequest<'_> {
        CellRequest {
            width: 150.0,
            height: 70.0,
            fill: Rgba::WHITE,
            text_color: Rgba::BLACK,
            x: 6.0,
            y: 6.0,
            text,
            alignment: TextAlignment::Left,
            stroke: Stroke {
                color: Rgba::BLACK,
                width: 2.25,
            },
            wrap: true,
        }
    }

    #[test]
    fn test_short_text_keeps_height() {
        let config = LayoutConfig::default();
        let mut doc = MemoryDocument::new();
        let mut m = TextMeasurer::new(&config);
        let cell = create_cell(&mut doc, &mut m, &config, &request("Ann")).unwrap();
        assert_eq!(cell.height, 70.0);
        assert!(!cell.wrapped);
        assert_eq!(doc.children(&cell.group).unwrap(), vec![cell.rect.clone(), cell.text_node.clone()]);
        let text = doc.node(&cell.text_node).unwrap();
        assert_eq!(text.translation, Point::new(16.0, 41.0));
    }

    #[test]
    fn test_long_text_wraps_and_grows() {
        let config = LayoutConfig::default();
        let mut doc = MemoryDocument::new();
        let mut m = TextMeasurer::new(&config);
        let text = "The quick brown fox jumps over the lazy dog and keeps on running";
        let cell = create_cell(&mut doc, &mut m, &config, &request(text)).unwrap();
        assert!(cell.wrapped);
        assert!(cell.text.contains('\n'));
        assert_eq!(cell.text.replace('\n', " "), text);
        assert!(cell.height > 70.0);
        assert_eq!(doc.node(&cell.rect).unwrap().height, cell.height);
        // Every wrapped line stays inside the effective width
        for line in cell.text.lines() {
            assert!(line.chars().count() as f64 * 7.5 <= 130.0 * 0.85 || !line.contains(' '));
        }
    }

    #[test]
    fn test_header_cells_do_not_wrap() {
        let config = LayoutConfig::default();
        let mut doc = MemoryDocument::new();
        let mut m = TextMeasurer::new(&config);
        let label = "An extremely long header label that overflows";
        let mut req = request(label);
        req.wrap = false;
        let cell = create_cell(&mut doc, &mut m, &config, &req).unwrap();
        assert_eq!(cell.text, label);
        assert_eq!(cell.height, 70.0);
    }

    #[test]
    fn test_alignment_anchors() {
        let config = LayoutConfig::default();
        let right = text_anchor(0.0, 0.0, 200.0, 70.0, TextAlignment::Right, &config);
        let center = text_anchor(0.0, 0.0, 200.0, 70.0, TextAlignment::Center, &config);
        assert_eq!(right, Point::new(190.0, 35.0));
        assert_eq!(center, Point::new(100.0, 35.0));
    }

    #[test]
    fn test_non_positive_size_rejected_before_host_calls() {
        let config = LayoutConfig::default();
        let mut doc = MemoryDocument::new();
        let mut m = TextMeasurer::new(&config);
        let mut req = request("x");
        req.height = 0.0;
        let err = create_cell(&mut doc, &mut m, &config, &req).unwrap_err();
        assert!(matches!(err, TableError::InvalidDimension(_)));
        assert_eq!(doc.created_count(), 0);
    }
}
