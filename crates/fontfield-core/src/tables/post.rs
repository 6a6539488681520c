use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

pub const POST_VERSION_1: u32 = 0x0001_0000;
pub const POST_VERSION_2: u32 = 0x0002_0000;
pub const POST_VERSION_2_5: u32 = 0x0002_5000;
pub const POST_VERSION_3: u32 = 0x0003_0000;

/// Number of names in the standard Macintosh glyph ordering.
const STANDARD_NAME_COUNT: u16 = 258;

/// PostScript information.
#[derive(Clone, Debug)]
pub struct PostTable {
    pub version: u32,
    pub italic_angle: f64,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: bool,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
    pub glyph_names: GlyphNames,
}

#[derive(Clone, Debug, Default)]
pub enum GlyphNames {
    /// Versions 1 and 3: standard ordering or no names at all.
    #[default]
    None,
    /// Version 2: an index per glyph, indices >= 258 select `custom`.
    Indexed {
        indices: Vec<u16>,
        custom: Vec<String>,
    },
    /// Version 2.5: per-glyph offsets into the standard ordering.
    Offsets(Vec<i8>),
}

impl PostTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::POST, data);

        let version = r.u32()?;
        if !matches!(
            version,
            POST_VERSION_1 | POST_VERSION_2 | POST_VERSION_2_5 | POST_VERSION_3
        ) {
            return Err(FontError::UnsupportedVersion {
                table: Tag::POST,
                version,
            });
        }

        let italic_angle = r.fixed()?;
        let underline_position = r.i16()?;
        let underline_thickness = r.i16()?;
        let is_fixed_pitch = r.u32()? != 0;
        let min_mem_type42 = r.u32()?;
        let max_mem_type42 = r.u32()?;
        let min_mem_type1 = r.u32()?;
        let max_mem_type1 = r.u32()?;

        let glyph_names = match version {
            POST_VERSION_2 => {
                let num_glyphs = r.u16()?;
                let mut indices = Vec::with_capacity(num_glyphs as usize);
                for _ in 0..num_glyphs {
                    indices.push(r.u16()?);
                }
                let custom_count = indices
                    .iter()
                    .filter(|&&i| i >= STANDARD_NAME_COUNT)
                    .map(|&i| i - STANDARD_NAME_COUNT + 1)
                    .max()
                    .unwrap_or(0);
                let mut custom = Vec::with_capacity(custom_count as usize);
                for _ in 0..custom_count {
                    let len = r.u8()? as usize;
                    custom.push(String::from_utf8_lossy(r.bytes(len)?).into_owned());
                }
                GlyphNames::Indexed { indices, custom }
            }
            POST_VERSION_2_5 => {
                let num_glyphs = r.u16()?;
                let mut offsets = Vec::with_capacity(num_glyphs as usize);
                for _ in 0..num_glyphs {
                    offsets.push(r.i8()?);
                }
                GlyphNames::Offsets(offsets)
            }
            _ => GlyphNames::None,
        };

        Ok(Self {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            min_mem_type42,
            max_mem_type42,
            min_mem_type1,
            max_mem_type1,
            glyph_names,
        })
    }

    /// Version as the conventional decimal string ("2.5").
    pub fn version_string(&self) -> &'static str {
        match self.version {
            POST_VERSION_1 => "1.0",
            POST_VERSION_2 => "2.0",
            POST_VERSION_2_5 => "2.5",
            _ => "3.0",
        }
    }

    /// Custom (non-standard) name of a glyph from a version 2 table.
    pub fn custom_glyph_name(&self, glyph: u16) -> Option<&str> {
        let GlyphNames::Indexed { indices, custom } = &self.glyph_names else {
            return None;
        };
        let index = *indices.get(glyph as usize)?;
        let slot = index.checked_sub(STANDARD_NAME_COUNT)?;
        custom.get(slot as usize).map(String::as_str)
    }
}
