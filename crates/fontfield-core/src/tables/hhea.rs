use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

/// Horizontal header.
#[derive(Clone, Debug)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub number_of_h_metrics: u16,
}

impl HheaTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::HHEA, data);

        let major = r.u16()?;
        let minor = r.u16()?;
        if major != 1 || minor != 0 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::HHEA,
                version: (u32::from(major) << 16) | u32::from(minor),
            });
        }

        let ascender = r.i16()?;
        let descender = r.i16()?;
        let line_gap = r.i16()?;
        let advance_width_max = r.u16()?;
        let min_left_side_bearing = r.i16()?;
        let min_right_side_bearing = r.i16()?;
        let x_max_extent = r.i16()?;
        let caret_slope_rise = r.i16()?;
        let caret_slope_run = r.i16()?;
        let caret_offset = r.i16()?;
        r.skip(8)?; // reserved
        let metric_data_format = r.i16()?;
        if metric_data_format != 0 {
            return Err(FontError::invalid(
                Tag::HHEA,
                "metricDataFormat",
                metric_data_format,
            ));
        }
        let number_of_h_metrics = r.u16()?;

        Ok(Self {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            number_of_h_metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FontBuilder;

    #[test]
    fn parses_fixture_hhea() {
        let hhea = HheaTable::parse(&FontBuilder::sample().hhea_bytes()).unwrap();
        assert_eq!(hhea.ascender, 800);
        assert_eq!(hhea.descender, -200);
        assert_eq!(hhea.line_gap, 90);
        assert_eq!(hhea.number_of_h_metrics, 2);
    }

    #[test]
    fn rejects_unknown_metric_data_format() {
        let mut bytes = FontBuilder::sample().hhea_bytes();
        bytes[32..34].copy_from_slice(&1i16.to_be_bytes());
        assert!(matches!(
            HheaTable::parse(&bytes),
            Err(FontError::InvalidValue {
                field: "metricDataFormat",
                ..
            })
        ));
    }
}
