//! Text measurement and word wrapping on top of the host's single
//! measurement primitive.
//!
//! The host can only report the rendered bounds of a text node, so each
//! measurement creates a throwaway node, reads it, and removes it again.
//! Widths reflect the host's default font; callers treat them as estimates.

use super::cache::WidthCache;
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::host::DocumentHost;

/// Measures and wraps text through a document host
pub struct TextMeasurer {
    cache: WidthCache,
    wrap_width_fraction: f64,
    min_chunk_chars: usize,
    host_measurements: u64,
}

impl TextMeasurer {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            cache: WidthCache::new(config.measure_cache_capacity),
            wrap_width_fraction: config.wrap_width_fraction,
            min_chunk_chars: config.min_chunk_chars.max(1),
            host_measurements: 0,
        }
    }

    /// Number of throwaway nodes created so far
    pub fn host_measurements(&self) -> u64 {
        self.host_measurements
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache.hits()
    }

    /// Rendered width of `text` in the host's default font
    pub fn measure_width<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<f64> {
        if let Some(width) = self.cache.get(text) {
            return Ok(width);
        }
        let width = self.measure_uncached(host, text)?;
        self.cache.insert(text, width);
        Ok(width)
    }

    /// Measure through the host even when a width is remembered.
    ///
    /// The fresh width replaces any remembered one.
    pub fn measure_fresh<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<f64> {
        let width = self.measure_uncached(host, text)?;
        self.cache.remove(text);
        self.cache.insert(text, width);
        Ok(width)
    }

    /// Forget remembered widths, e.g. after the host's default font changed
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn measure_uncached<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<f64> {
        let scratch = host.create_text()?;
        self.host_measurements += 1;
        let measured = host
            .set_text(&scratch, text)
            .and_then(|()| host.bounds_local(&scratch));
        let cleanup = host.remove_node(&scratch);

        let width = measured?.width;
        if let Err(e) = cleanup {
            tracing::error!(
                target: "express_tables::measure",
                node = %scratch,
                error = %e,
                "failed to remove measurement node"
            );
            return Err(e);
        }
        tracing::debug!(target: "express_tables::measure", text, width, "measured");
        Ok(width)
    }

    /// Wrap threshold for a given available width
    pub fn effective_width(&self, available_width: f64) -> f64 {
        available_width * self.wrap_width_fraction
    }

    /// Characters per line when breaking a space-free token.
    ///
    /// Average character width is estimated from the full measured width.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn chunk_length(&self, token: &str, available_width: f64, measured_full_width: f64) -> usize {
        let chars = token.chars().count().max(1);
        let average = measured_full_width / chars as f64;
        let fit = self.effective_width(available_width) / average;
        let fit = if fit.is_finite() && fit > 0.0 {
            fit.floor() as usize
        } else {
            0
        };
        fit.max(self.min_chunk_chars)
    }

    /// Insert line breaks so `text` fits `available_width`.
    ///
    /// Text that already fits comes back unchanged. Otherwise lines are
    /// filled greedily up to the effective width, measuring one candidate
    /// line per word; a single token with no spaces is cut into fixed-size
    /// character chunks instead.
    pub fn wrap<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        available_width: f64,
        measured_full_width: f64,
    ) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        if measured_full_width <= available_width {
            return Ok(text.to_string());
        }

        let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
        if let [token] = words.as_slice() {
            let chunk = self.chunk_length(token, available_width, measured_full_width);
            tracing::debug!(
                target: "express_tables::measure",
                token,
                chunk,
                "breaking long token"
            );
            return Ok(chunk_token(token, chunk));
        }

        let effective = self.effective_width(available_width);
        let mut lines: Vec<String> = Vec::new();
        let mut line = String::new();
        for word in words {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            let width = self.measure_width(host, &candidate)?;
            if width > effective && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }

        tracing::debug!(
            target: "express_tables::measure",
            lines = lines.len(),
            effective,
            "wrapped"
        );
        Ok(lines.join("\n").trim().to_string())
    }
}

/// Split a token into `chunk`-character pieces joined by line breaks.
///
/// Removing the breaks gives back the original token.
pub fn chunk_token(token: &str, chunk: usize) -> String {
    let chunk = chunk.max(1);
    let chars: Vec<char> = token.chars().collect();
    chars
        .chunks(chunk)
        .map(|piece| piece.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
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
    use crate::host::{HostOp, MemoryDocument};

    fn measurer() -> TextMeasurer {
        TextMeasurer::new(&LayoutConfig::default())
    }

    #[test]
    fn test_measure_removes_scratch_node() {
        let mut doc = MemoryDocument::new();
        let mut m = measurer();
        let width = m.measure_width(&mut doc, "Email").unwrap();
        assert_eq!(width, 37.5);
        assert_eq!(doc.orphan_count(), 0);
        assert_eq!(doc.removed_count(), 1);
    }

    #[test]
    fn test_measure_is_cached() {
        let mut doc = MemoryDocument::new();
        let mut m = measurer();
        m.measure_width(&mut doc, "Name").unwrap();
        m.measure_width(&mut doc, "Name").unwrap();
        assert_eq!(m.host_measurements(), 1);
        assert_eq!(m.cache_hits(), 1);
    }

    #[test]
    fn test_scratch_removed_when_bounds_fail() {
        let mut doc = MemoryDocument::new();
        doc.fail(HostOp::BoundsLocal);
        let mut m = measurer();
        assert!(m.measure_width(&mut doc, "Name").is_err());
        assert_eq!(doc.orphan_count(), 0);
    }

    #[test]
    fn test_chunk_token_preserves_characters() {
        let chunked = chunk_token("abcdefghij", 3);
        assert_eq!(chunked, "abc\ndef\nghi\nj");
        assert_eq!(chunked.replace('\n', ""), "abcdefghij");
    }

    #[test]
    fn test_chunk_token_multibyte() {
        let chunked = chunk_token("ééééé", 2);
        assert_eq!(chunked, "éé\néé\né");
    }

    #[test]
    fn test_chunk_length_has_floor() {
        let m = measurer();
        // 20 chars over 200px = 10px each; effective 0.85 * 20 = 17px fits one char
        assert_eq!(m.chunk_length("abcdefghijklmnopqrst", 20.0, 200.0), 5);
        // effective 0.85 * 100 = 85px fits eight chars
        assert_eq!(m.chunk_length("abcdefghijklmnopqrst", 100.0, 200.0), 8);
    }

    #[test]
    fn test_wrap_empty_and_fitting() {
        let mut doc = MemoryDocument::new();
        let mut m = measurer();
        assert_eq!(m.wrap(&mut doc, "", 10.0, 0.0).unwrap(), "");
        assert_eq!(m.wrap(&mut doc, "fits fine", 100.0, 67.5).unwrap(), "fits fine");
        assert_eq!(m.host_measurements(), 0);
    }
}
