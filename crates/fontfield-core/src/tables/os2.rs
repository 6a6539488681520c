use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

/// OS/2 and Windows metrics.
#[derive(Clone, Debug)]
pub struct Os2Table {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range: [u32; 4],
    pub ach_vend_id: Tag,
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// Version 1 and later.
    pub ul_code_page_range: Option<[u32; 2]>,
    /// Version 2 and later.
    pub v2: Option<Os2V2>,
    /// Version 5.
    pub optical_point_size: Option<OpticalPointSize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Os2V2 {
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

/// Lower and upper point sizes in TWIPs (1/20 point).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpticalPointSize {
    pub lower: u16,
    pub upper: u16,
}

impl Os2Table {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::OS2, data);

        let version = r.u16()?;
        if version > 5 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::OS2,
                version: u32::from(version),
            });
        }

        let x_avg_char_width = r.i16()?;
        let us_weight_class = r.u16()?;
        let us_width_class = r.u16()?;
        let fs_type = r.u16()?;
        let y_subscript_x_size = r.i16()?;
        let y_subscript_y_size = r.i16()?;
        let y_subscript_x_offset = r.i16()?;
        let y_subscript_y_offset = r.i16()?;
        let y_superscript_x_size = r.i16()?;
        let y_superscript_y_size = r.i16()?;
        let y_superscript_x_offset = r.i16()?;
        let y_superscript_y_offset = r.i16()?;
        let y_strikeout_size = r.i16()?;
        let y_strikeout_position = r.i16()?;
        let s_family_class = r.i16()?;
        let mut panose = [0u8; 10];
        panose.copy_from_slice(r.bytes(10)?);
        let ul_unicode_range = [r.u32()?, r.u32()?, r.u32()?, r.u32()?];
        let ach_vend_id = r.tag()?;
        let fs_selection = r.u16()?;
        let us_first_char_index = r.u16()?;
        let us_last_char_index = r.u16()?;
        let s_typo_ascender = r.i16()?;
        let s_typo_descender = r.i16()?;
        let s_typo_line_gap = r.i16()?;
        let us_win_ascent = r.u16()?;
        let us_win_descent = r.u16()?;

        let ul_code_page_range = if version >= 1 {
            Some([r.u32()?, r.u32()?])
        } else {
            None
        };

        let v2 = if version >= 2 {
            Some(Os2V2 {
                sx_height: r.i16()?,
                s_cap_height: r.i16()?,
                us_default_char: r.u16()?,
                us_break_char: r.u16()?,
                us_max_context: r.u16()?,
            })
        } else {
            None
        };

        let optical_point_size = if version >= 5 {
            Some(OpticalPointSize {
                lower: r.u16()?,
                upper: r.u16()?,
            })
        } else {
            None
        };

        Ok(Self {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_subscript_x_offset,
            y_subscript_y_offset,
            y_superscript_x_size,
            y_superscript_y_size,
            y_superscript_x_offset,
            y_superscript_y_offset,
            y_strikeout_size,
            y_strikeout_position,
            s_family_class,
            panose,
            ul_unicode_range,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            ul_code_page_range,
            v2,
            optical_point_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::os2_table;

    #[test]
    fn version_four_has_v2_fields() {
        let os2 = Os2Table::parse(&os2_table(4)).unwrap();
        assert_eq!(os2.version, 4);
        assert_eq!(os2.s_typo_ascender, 780);
        assert_eq!(os2.ach_vend_id, Tag::new(b"FFLD"));
        assert!(os2.ul_code_page_range.is_some());
        assert_eq!(os2.v2.map(|v| v.sx_height), Some(500));
        assert!(os2.optical_point_size.is_none());
    }

    #[test]
    fn version_zero_stops_after_win_descent() {
        let os2 = Os2Table::parse(&os2_table(0)).unwrap();
        assert!(os2.ul_code_page_range.is_none());
        assert!(os2.v2.is_none());
    }

    #[test]
    fn version_five_reads_optical_sizes() {
        let os2 = Os2Table::parse(&os2_table(5)).unwrap();
        assert_eq!(
            os2.optical_point_size,
            Some(OpticalPointSize {
                lower: 0,
                upper: 0xFFFF
            })
        );
    }

    #[test]
    fn version_gated_fields_must_be_present() {
        let mut bytes = os2_table(4);
        bytes.truncate(90);
        assert!(Os2Table::parse(&bytes).is_err());
    }

    #[test]
    fn version_six_is_rejected() {
        let mut bytes = os2_table(5);
        bytes[0..2].copy_from_slice(&6u16.to_be_bytes());
        assert!(matches!(
            Os2Table::parse(&bytes),
            Err(FontError::UnsupportedVersion { table: Tag::OS2, version: 6 })
        ));
    }
}
