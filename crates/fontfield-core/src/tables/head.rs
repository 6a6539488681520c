use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag, Timestamp};

pub const HEAD_MAGIC: u32 = 0x5F0F_3CF5;

/// Width of `loca` entries, from `head.indexToLocFormat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaFormat {
    /// 16-bit entries holding offset / 2.
    Short,
    /// 32-bit entries holding the offset.
    Long,
}

/// Font header.
#[derive(Clone, Debug)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: f64,
    pub checksum_adjustment: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: Timestamp,
    pub modified: Timestamp,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: LocaFormat,
    pub glyph_data_format: i16,
}

impl HeadTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::HEAD, data);

        let major_version = r.u16()?;
        let minor_version = r.u16()?;
        if major_version != 1 || minor_version != 0 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::HEAD,
                version: (u32::from(major_version) << 16) | u32::from(minor_version),
            });
        }

        let font_revision = r.fixed()?;
        let checksum_adjustment = r.u32()?;
        let magic = r.u32()?;
        if magic != HEAD_MAGIC {
            return Err(FontError::BadMagic(magic));
        }

        let flags = r.u16()?;
        let units_per_em = r.u16()?;
        if !(16..=16384).contains(&units_per_em) {
            return Err(FontError::invalid(Tag::HEAD, "unitsPerEm", units_per_em));
        }

        let created = r.long_date_time()?;
        let modified = r.long_date_time()?;
        let x_min = r.i16()?;
        let y_min = r.i16()?;
        let x_max = r.i16()?;
        let y_max = r.i16()?;
        let mac_style = r.u16()?;
        let lowest_rec_ppem = r.u16()?;
        let font_direction_hint = r.i16()?;
        let index_to_loc_format = match r.i16()? {
            0 => LocaFormat::Short,
            1 => LocaFormat::Long,
            other => {
                return Err(FontError::invalid(Tag::HEAD, "indexToLocFormat", other));
            }
        };
        let glyph_data_format = r.i16()?;

        Ok(Self {
            major_version,
            minor_version,
            font_revision,
            checksum_adjustment,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        })
    }
}
