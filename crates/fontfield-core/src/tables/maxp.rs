use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

pub const MAXP_VERSION_0_5: u32 = 0x0000_5000;
pub const MAXP_VERSION_1_0: u32 = 0x0001_0000;

/// Maximum profile. Version 0.5 (CFF fonts) only carries `num_glyphs`.
#[derive(Clone, Debug)]
pub struct MaxpTable {
    pub version: u32,
    pub num_glyphs: u16,
    pub truetype: Option<MaxpTrueType>,
}

/// Fields present from version 1.0.
#[derive(Clone, Debug, Default)]
pub struct MaxpTrueType {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl MaxpTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::MAXP, data);

        let version = r.u32()?;
        let num_glyphs = r.u16()?;

        let truetype = match version {
            MAXP_VERSION_0_5 => None,
            MAXP_VERSION_1_0 => Some(MaxpTrueType {
                max_points: r.u16()?,
                max_contours: r.u16()?,
                max_composite_points: r.u16()?,
                max_composite_contours: r.u16()?,
                max_zones: r.u16()?,
                max_twilight_points: r.u16()?,
                max_storage: r.u16()?,
                max_function_defs: r.u16()?,
                max_instruction_defs: r.u16()?,
                max_stack_elements: r.u16()?,
                max_size_of_instructions: r.u16()?,
                max_component_elements: r.u16()?,
                max_component_depth: r.u16()?,
            }),
            _ => {
                return Err(FontError::UnsupportedVersion {
                    table: Tag::MAXP,
                    version,
                });
            }
        };

        Ok(Self {
            version,
            num_glyphs,
            truetype,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maxp(version: u32, num_glyphs: u16) -> Vec<u8> {
        let mut out = version.to_be_bytes().to_vec();
        out.extend_from_slice(&num_glyphs.to_be_bytes());
        out
    }

    #[test]
    fn version_half_has_only_glyph_count() {
        let t = MaxpTable::parse(&maxp(MAXP_VERSION_0_5, 7)).unwrap();
        assert_eq!(t.num_glyphs, 7);
        assert!(t.truetype.is_none());
    }

    #[test]
    fn version_one_reads_profile() {
        let mut bytes = maxp(MAXP_VERSION_1_0, 3);
        for v in 1..=13u16 {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let t = MaxpTable::parse(&bytes).unwrap();
        let tt = t.truetype.unwrap();
        assert_eq!(tt.max_points, 1);
        assert_eq!(tt.max_component_depth, 13);
    }

    #[test]
    fn version_one_truncated() {
        assert!(MaxpTable::parse(&maxp(MAXP_VERSION_1_0, 3)).is_err());
    }

    #[test]
    fn unknown_version() {
        assert!(matches!(
            MaxpTable::parse(&maxp(0x0002_0000, 1)),
            Err(FontError::UnsupportedVersion {
                table: Tag::MAXP,
                version: 0x0002_0000
            })
        ));
    }
}
