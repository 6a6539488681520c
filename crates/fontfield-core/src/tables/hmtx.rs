use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};
use serde::Serialize;

/// Advance and left side bearing of one glyph, in font design units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HorizontalMetrics {
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// Horizontal metrics for every glyph id.
#[derive(Clone, Debug)]
pub struct HmtxTable {
    metrics: Vec<HorizontalMetrics>,
}

impl HmtxTable {
    /// `number_of_h_metrics` comes from `hhea`, `num_glyphs` from `maxp`.
    pub fn parse(data: &[u8], number_of_h_metrics: u16, num_glyphs: u16) -> Result<Self> {
        if number_of_h_metrics == 0 && num_glyphs > 0 {
            return Err(FontError::invalid(Tag::HHEA, "numberOfHMetrics", 0));
        }
        if number_of_h_metrics > num_glyphs {
            return Err(FontError::invalid(
                Tag::HHEA,
                "numberOfHMetrics",
                number_of_h_metrics,
            ));
        }

        let mut r = TableReader::new(Tag::HMTX, data);
        let mut metrics = Vec::with_capacity(num_glyphs as usize);
        for _ in 0..number_of_h_metrics {
            metrics.push(HorizontalMetrics {
                advance_width: r.u16()?,
                left_side_bearing: r.i16()?,
            });
        }

        // Trailing glyphs repeat the last advance and only store a bearing.
        let last_advance = metrics.last().map(|m| m.advance_width).unwrap_or(0);
        for _ in number_of_h_metrics..num_glyphs {
            metrics.push(HorizontalMetrics {
                advance_width: last_advance,
                left_side_bearing: r.i16()?,
            });
        }

        Ok(Self { metrics })
    }

    pub fn get(&self, glyph: u16) -> Option<HorizontalMetrics> {
        self.metrics.get(glyph as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
