//! The sfnt table directory and the individual table parsers.

pub mod cmap;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod kern;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

pub use cmap::CmapTable;
pub use head::HeadTable;
pub use hhea::HheaTable;
pub use hmtx::{HmtxTable, HorizontalMetrics};
pub use kern::KernTable;
pub use loca::LocaTable;
pub use maxp::MaxpTable;
pub use name::NameTable;
pub use os2::Os2Table;
pub use post::PostTable;

use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

/// TrueType outlines.
pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// CFF outlines ('OTTO').
pub const SFNT_VERSION_OTTO: u32 = 0x4F54_544F;

/// Tables every font must carry before any parsing starts.
pub const REQUIRED_TABLES: [Tag; 8] = [
    Tag::CMAP,
    Tag::HEAD,
    Tag::HHEA,
    Tag::HMTX,
    Tag::MAXP,
    Tag::NAME,
    Tag::OS2,
    Tag::POST,
];

/// Location of one top-level table in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

#[derive(Clone, Debug)]
pub struct TableDirectory {
    pub version: u32,
    pub records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Read the directory and check every record's range and checksum.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::DIRECTORY, data);

        let version = r.u32()?;
        if version != SFNT_VERSION_TRUETYPE && version != SFNT_VERSION_OTTO {
            return Err(FontError::UnsupportedSfntVersion(version));
        }

        let num_tables = r.u16()?;
        // searchRange, entrySelector, rangeShift
        r.skip(6)?;

        let mut records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            records.push(TableRecord {
                tag: r.tag()?,
                checksum: r.u32()?,
                offset: r.u32()?,
                length: r.u32()?,
            });
        }

        let directory = Self { version, records };
        for record in &directory.records {
            let bytes = directory.record_bytes(data, record)?;
            // head carries checkSumAdjustment, which the file-wide sum rewrites
            if record.tag == Tag::HEAD {
                continue;
            }
            let actual = table_checksum(bytes);
            if actual != record.checksum {
                return Err(FontError::ChecksumMismatch {
                    tag: record.tag,
                    expected: record.checksum,
                    actual,
                });
            }
        }

        log::debug!(
            "table directory: version 0x{version:08X}, {} table(s)",
            directory.records.len()
        );
        Ok(directory)
    }

    pub fn find(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.find(tag).is_some()
    }

    /// Fail on the first of [`REQUIRED_TABLES`] that is absent.
    pub fn ensure_required(&self) -> Result<()> {
        match REQUIRED_TABLES.iter().find(|tag| !self.contains(**tag)) {
            Some(tag) => Err(FontError::MissingTable(*tag)),
            None => Ok(()),
        }
    }

    /// The bytes of table `tag`, or `MissingTable`.
    pub fn table<'a>(&self, data: &'a [u8], tag: Tag) -> Result<&'a [u8]> {
        let record = self.find(tag).ok_or(FontError::MissingTable(tag))?;
        self.record_bytes(data, record)
    }

    fn record_bytes<'a>(&self, data: &'a [u8], record: &TableRecord) -> Result<&'a [u8]> {
        let start = record.offset as usize;
        start
            .checked_add(record.length as usize)
            .and_then(|end| data.get(start..end))
            .ok_or(FontError::TableOutOfBounds {
                tag: record.tag,
                offset: record.offset,
                length: record.length,
                file_len: data.len(),
            })
    }
}

/// Sum of big-endian u32 words, the final word zero padded.
pub fn table_checksum(bytes: &[u8]) -> u32 {
    let mut chunks = bytes.chunks_exact(4);
    let mut sum = chunks.by_ref().fold(0u32, |acc, w| {
        acc.wrapping_add(u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
    });
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut word = [0u8; 4];
        word[..tail.len()].copy_from_slice(tail);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}
