//! Built-in table style gallery
//!
//! Color order in each preset: header, row, stroke, alt row, row text,
//! alt row text, header text.

use crate::types::{StrokePolicy, TableColors, TableStyle};

struct Preset {
    id: u32,
    name: &'static str,
    colors: [&'static str; 7],
    border: &'static str,
}

const fn preset(
    id: u32,
    name: &'static str,
    colors: [&'static str; 7],
    border: &'static str,
) -> Preset {
    Preset {
        id,
        name,
        colors,
        border,
    }
}

/// The style the panel starts with
const BASIC_DEEP_BLUE: Preset = preset(8, "Basic deep blue", ["#0019FF", "#D2D8FC", "#FFFFFF", "#B1C0E8", "#5760AC", "#FFFFFF", "#FFFFFF"], "#0019FF");

/// Id of the style the panel starts with ("Basic deep blue")
pub const DEFAULT_STYLE_ID: u32 = BASIC_DEEP_BLUE.id;

const PRESETS: [Preset; 20] = [
    preset(1, "Basic table", ["#FFFFFF", "#FFFFFF", "#000000", "#FFFFFF", "#000000", "#000000", "#000000"], "#000000"),
    preset(2, "Basic grey", ["#000000", "#808080", "#FFFFFF", "#C8C8C8", "#FFFFFF", "#FFFFFF", "#FFFFFF"], "grey"),
    preset(3, "Basic blue", ["#0082CB", "#B0C8E2", "#FFFFFF", "#E3EDFC", "#FFFFFF", "#243E84", "#FFFFFF"], "#0082CB"),
    preset(4, "Basic orange", ["#F95E19", "#F9D298", "#FFFFFF", "#F2E4BB", "#FFFFFF", "#9F6B53", "#FFFFFF"], "#F95E19"),
    preset(5, "Basic green", ["#447A06", "#CADD7C", "#FFFFFF", "#DEF2B3", "#FFFFFF", "#3C5D16", "#FFFFFF"], "#447A06"),
    preset(6, "Basic purple", ["#662B8C", "#A69AB7", "#FFFFFF", "#DBCAE8", "#FFFFFF", "#643E7D", "#FFFFFF"], "#662B8C"),
    preset(7, "Basic brown", ["#661F03", "#D8C29E", "#FFFFFF", "#F0E5D0", "#FFFFFF", "#9A5F48", "#FFFFFF"], "#661F03"),
    BASIC_DEEP_BLUE,
    preset(9, "Basic red", ["#E01414", "#F4BFBD", "#FFFFFF", "#DD8787", "#FFFFFF", "#FFFFFF", "#FFFFFF"], "#E01414"),
    preset(10, "Basic yellow", ["#FFD60B", "#FCECAC", "#FFFFFF", "#E5D298", "#C48A3F", "#FFFFFF", "#FFFFFF"], "#FFD60B"),
    preset(11, "Simple table", ["#FFFFFF", "#CCCCCC", "#666666", "#FFFFFF", "#FFFFFF", "#727272", "#000000"], "#CCCCCC"),
    preset(12, "Simple grey", ["#000000", "#FFFFFF", "#000000", "#FFFFFF", "#000000", "#000000", "#FFFFFF"], "#000000"),
    preset(13, "Simple blue", ["#EEF8FF", "#A2D6F9", "#0082CB", "#FFFFFF", "#FFFFFF", "#0082CB", "#0082CB"], "#0082CB"),
    preset(14, "Simple orange", ["#FFFCF0", "#F7CFA4", "#F95E19", "#FFFFFF", "#FFFFFF", "#683C2E", "#683C2E"], "#F95E19"),
    preset(15, "Simple green", ["#F0FCD0", "#FFFFFF", "#447A06", "#CADD7C", "#39462A", "#FFFFFF", "#39462A"], "#447A06"),
    preset(16, "Simple purple", ["#F7E4F5", "#FFFFFF", "#662B8C", "#DBCAE8", "#705780", "#FFFFFF", "#705780"], "#662B8C"),
    preset(17, "Simple brown", ["#F4ECE4", "#FFFFFF", "#661F03", "#D8C29E", "#674F46", "#FFFFFF", "#671C00"], "#661F03"),
    preset(18, "Simple deep blue", ["#0019FF", "#FFFFFF", "#0019FF", "#B1C0E8", "#505BBC", "#FFFFFF", "#FFFFFF"], "#0019FF"),
    preset(19, "Simple red", ["#FFE9F5", "#FFFFFF", "#E01414", "#F4BFBD", "#754545", "#FFFFFF", "#754545"], "#E01414"),
    preset(20, "Simple yellow", ["#FFFFEB", "#FFFFFF", "#FFD60B", "#FCECAC", "#807540", "#8B7505", "#807540"], "#FFD60B"),
];

impl Preset {
    fn to_style(&self) -> TableStyle {
        let [header, row, stroke, alt_row, row_text, alt_row_text, header_text] = self.colors;
        TableStyle {
            id: self.id,
            name: self.name.to_string(),
            colors: TableColors {
                header: header.to_string(),
                row: row.to_string(),
                stroke: stroke.to_string(),
                alt_row: alt_row.to_string(),
                row_text: row_text.to_string(),
                alt_row_text: alt_row_text.to_string(),
                header_text: header_text.to_string(),
            },
            border: Some(self.border.to_string()),
            stroke: StrokePolicy::Auto,
        }
    }
}

/// Every built-in style, in gallery order
pub fn builtin_styles() -> Vec<TableStyle> {
    PRESETS.iter().map(Preset::to_style).collect()
}

pub fn style_by_id(id: u32) -> Option<TableStyle> {
    PRESETS.iter().find(|p| p.id == id).map(Preset::to_style)
}

/// Case-insensitive lookup by display name
pub fn style_by_name(name: &str) -> Option<TableStyle> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .map(Preset::to_style)
}

pub fn default_style() -> TableStyle {
    BASIC_DEEP_BLUE.to_style()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_has_twenty_unique_ids() {
        let styles = builtin_styles();
        assert_eq!(styles.len(), 20);
        let mut ids: Vec<u32> = styles.iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_every_preset_palette_resolves() {
        for style in builtin_styles() {
            assert!(style.colors.resolve().is_ok(), "{} has a bad color", style.name);
        }
    }

    #[test]
    fn test_default_is_basic_deep_blue() {
        let style = default_style();
        assert_eq!(style.name, "Basic deep blue");
        assert_eq!(style.colors.header, "#0019FF");
        assert_eq!(Some(style), style_by_id(DEFAULT_STYLE_ID));
    }

    #[test]
    fn test_lookup_by_name_ignores_case() {
        let style = style_by_name("simple GREEN").unwrap();
        assert_eq!(style.id, 15);
        assert!(style_by_id(21).is_none());
    }
}
