use super::head::LocaFormat;
use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};
use std::ops::Range;

/// Index to location: byte offsets of each glyph inside `glyf`.
#[derive(Clone, Debug)]
pub struct LocaTable {
    offsets: Vec<u32>,
}

impl LocaTable {
    pub fn parse(data: &[u8], format: LocaFormat, num_glyphs: u16) -> Result<Self> {
        let mut r = TableReader::new(Tag::LOCA, data);
        let count = num_glyphs as usize + 1;
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(match format {
                LocaFormat::Short => u32::from(r.u16()?) * 2,
                LocaFormat::Long => r.u32()?,
            });
        }
        Ok(Self { offsets })
    }

    /// Byte range of `glyph` within a `glyf` table of `glyf_len` bytes.
    ///
    /// An empty range is a glyph without outline data.
    pub fn glyph_range(&self, glyph: u16, glyf_len: usize) -> Result<Range<usize>> {
        let num_glyphs = (self.offsets.len() - 1) as u16;
        if glyph >= num_glyphs {
            return Err(FontError::GlyphOutOfRange { glyph, num_glyphs });
        }

        let start = self.offsets[glyph as usize] as usize;
        let end = self.offsets[glyph as usize + 1] as usize;
        if start > end || end > glyf_len {
            return Err(FontError::InvalidGlyphOffset {
                glyph,
                start,
                end,
                glyf_len,
            });
        }
        Ok(start..end)
    }

    pub fn num_glyphs(&self) -> u16 {
        (self.offsets.len() - 1) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_offsets_are_doubled() {
        let data = [0u8, 0, 0, 10, 0, 10, 0, 30];
        let loca = LocaTable::parse(&data, LocaFormat::Short, 3).unwrap();
        assert_eq!(loca.glyph_range(0, 60).unwrap(), 0..20);
        assert_eq!(loca.glyph_range(1, 60).unwrap(), 20..20);
        assert_eq!(loca.glyph_range(2, 60).unwrap(), 20..60);
    }

    #[test]
    fn long_offsets() {
        let mut data = Vec::new();
        for v in [0u32, 12, 40] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let loca = LocaTable::parse(&data, LocaFormat::Long, 2).unwrap();
        assert_eq!(loca.num_glyphs(), 2);
        assert_eq!(loca.glyph_range(1, 40).unwrap(), 12..40);
    }

    #[test]
    fn offsets_outside_glyf_are_rejected() {
        let data = [0u8, 0, 0, 0, 0, 0, 0, 50];
        let loca = LocaTable::parse(&data, LocaFormat::Long, 1).unwrap();
        assert!(matches!(
            loca.glyph_range(0, 20),
            Err(FontError::InvalidGlyphOffset { glyph: 0, end: 50, .. })
        ));
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        let data = [0u8, 8, 0, 4];
        let loca = LocaTable::parse(&data, LocaFormat::Short, 1).unwrap();
        assert!(loca.glyph_range(0, 100).is_err());
    }

    #[test]
    fn glyph_id_past_the_end() {
        let data = [0u8, 0, 0, 4];
        let loca = LocaTable::parse(&data, LocaFormat::Short, 1).unwrap();
        assert!(matches!(
            loca.glyph_range(1, 100),
            Err(FontError::GlyphOutOfRange { glyph: 1, num_glyphs: 1 })
        ));
    }

    #[test]
    fn truncated_loca() {
        assert!(LocaTable::parse(&[0u8, 0], LocaFormat::Short, 1).is_err());
    }
}
