//! Character to glyph mapping.
//!
//! Only Windows records (platform 3, encoding 0 or 1) are resolved, and only
//! the byte encoding (format 0) and segment mapping (format 4) subtables.

use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

pub const PLATFORM_WINDOWS: u16 = 3;
pub const ENCODING_WINDOWS_SYMBOL: u16 = 0;
pub const ENCODING_WINDOWS_UNICODE_BMP: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub offset: u32,
}

impl EncodingRecord {
    pub fn is_windows(&self) -> bool {
        self.platform_id == PLATFORM_WINDOWS && self.encoding_id <= ENCODING_WINDOWS_UNICODE_BMP
    }
}

/// The subtable formats this parser knows how to read.
#[derive(Clone, Debug)]
pub enum CmapSubtable {
    /// Format 0: one glyph id byte per code 0..=255.
    ByteEncoding { glyph_ids: Box<[u8; 256]> },
    /// Format 4: segments of contiguous codes.
    SegmentMapping(SegmentMapping),
}

#[derive(Clone, Debug, Default)]
pub struct SegmentMapping {
    pub end_codes: Vec<u16>,
    pub start_codes: Vec<u16>,
    pub id_deltas: Vec<i16>,
    pub id_range_offsets: Vec<u16>,
    pub glyph_ids: Vec<u16>,
}

impl SegmentMapping {
    fn lookup(&self, code: u16) -> Option<u16> {
        let seg_count = self.end_codes.len();
        // end codes are sorted ascending
        let i = self.end_codes.partition_point(|&end| end < code);
        if i >= seg_count || self.start_codes[i] > code {
            return None;
        }

        let delta = self.id_deltas[i] as u16;
        let range_offset = self.id_range_offsets[i];
        if range_offset == 0 {
            return Some(code.wrapping_add(delta));
        }

        // idRangeOffset is relative to its own slot in the idRangeOffset array
        let index = (range_offset / 2) as usize + (code - self.start_codes[i]) as usize;
        let index = index.checked_sub(seg_count - i)?;
        match self.glyph_ids.get(index).copied()? {
            0 => None,
            glyph => Some(glyph.wrapping_add(delta)),
        }
    }
}

impl CmapSubtable {
    fn parse(r: &mut TableReader<'_>) -> Result<Self> {
        let format = r.u16()?;
        match format {
            0 => {
                let _length = r.u16()?;
                let _language = r.u16()?;
                let mut glyph_ids = Box::new([0u8; 256]);
                glyph_ids.copy_from_slice(r.bytes(256)?);
                Ok(Self::ByteEncoding { glyph_ids })
            }
            4 => {
                let length = r.u16()? as usize;
                let _language = r.u16()?;
                let seg_count_x2 = r.u16()?;
                if seg_count_x2 % 2 != 0 {
                    return Err(FontError::invalid(Tag::CMAP, "segCountX2", seg_count_x2));
                }
                let seg_count = (seg_count_x2 / 2) as usize;
                // searchRange, entrySelector, rangeShift
                r.skip(6)?;

                let mut map = SegmentMapping::default();
                for _ in 0..seg_count {
                    map.end_codes.push(r.u16()?);
                }
                let _reserved_pad = r.u16()?;
                for _ in 0..seg_count {
                    map.start_codes.push(r.u16()?);
                }
                for _ in 0..seg_count {
                    map.id_deltas.push(r.i16()?);
                }
                for _ in 0..seg_count {
                    map.id_range_offsets.push(r.u16()?);
                }

                let header_len = 16 + seg_count * 8;
                let array_words = length.saturating_sub(header_len) / 2;
                for _ in 0..array_words.min(r.remaining() / 2) {
                    map.glyph_ids.push(r.u16()?);
                }
                Ok(Self::SegmentMapping(map))
            }
            _ => Err(FontError::FormatNotImplemented {
                table: Tag::CMAP,
                format,
            }),
        }
    }

    pub fn lookup(&self, code: u32) -> Option<u16> {
        let code = u16::try_from(code).ok()?;
        match self {
            Self::ByteEncoding { glyph_ids } => match glyph_ids.get(code as usize) {
                Some(&g) if g != 0 => Some(u16::from(g)),
                _ => None,
            },
            Self::SegmentMapping(map) => map.lookup(code).filter(|&g| g != 0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CmapTable {
    pub version: u16,
    pub records: Vec<EncodingRecord>,
    /// Resolved Windows subtables, in record order.
    pub subtables: Vec<(EncodingRecord, CmapSubtable)>,
}

impl CmapTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::CMAP, data);

        let version = r.u16()?;
        if version != 0 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::CMAP,
                version: u32::from(version),
            });
        }

        let num_tables = r.u16()?;
        let mut records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            records.push(EncodingRecord {
                platform_id: r.u16()?,
                encoding_id: r.u16()?,
                offset: r.u32()?,
            });
        }

        let mut subtables = Vec::new();
        for record in records.iter().filter(|rec| rec.is_windows()) {
            let mut sub = r.at(record.offset as usize)?;
            subtables.push((*record, CmapSubtable::parse(&mut sub)?));
        }

        log::debug!(
            "cmap: {} encoding record(s), {} windows subtable(s)",
            records.len(),
            subtables.len()
        );
        Ok(Self {
            version,
            records,
            subtables,
        })
    }

    /// Glyph id for `ch`, `0` (`.notdef`) when unmapped.
    pub fn glyph_index(&self, ch: char) -> u16 {
        self.lookup(ch).unwrap_or(0)
    }

    /// Glyph id for `ch`, preferring Unicode BMP subtables over symbol ones.
    pub fn lookup(&self, ch: char) -> Option<u16> {
        let code = ch as u32;
        let by_encoding = |encoding: u16| {
            self.subtables
                .iter()
                .filter(move |(rec, _)| rec.encoding_id == encoding)
                .map(|(_, sub)| sub)
        };

        by_encoding(ENCODING_WINDOWS_UNICODE_BMP)
            .find_map(|sub| sub.lookup(code))
            .or_else(|| {
                // Symbol fonts conventionally map their 8-bit codes at U+F000.
                by_encoding(ENCODING_WINDOWS_SYMBOL).find_map(|sub| {
                    sub.lookup(code)
                        .or_else(|| (code < 0x100).then(|| sub.lookup(0xF000 | code)).flatten())
                })
            })
    }
}
