//! A parsed font file.

use crate::colouring::colour_glyph;
use crate::contour::build_contours;
use crate::error::{FontError, Result};
use crate::glyph::{Glyph, GlyphReader};
use crate::reader::Tag;
use crate::tables::{
    CmapTable, HeadTable, HheaTable, HmtxTable, HorizontalMetrics, KernTable, LocaTable,
    MaxpTable, NameTable, Os2Table, PostTable, TableDirectory,
};
use std::ops::Range;
use std::path::Path;

/// Every table this crate reads, parsed up front.
///
/// Loading is all-or-nothing: any malformed table fails the whole load.
#[derive(Clone, Debug)]
pub struct Font {
    data: Vec<u8>,
    glyf: Range<usize>,
    pub directory: TableDirectory,
    pub cmap: CmapTable,
    pub head: HeadTable,
    pub hhea: HheaTable,
    pub maxp: MaxpTable,
    pub hmtx: HmtxTable,
    pub name: NameTable,
    pub os2: Os2Table,
    pub post: PostTable,
    pub kern: Option<KernTable>,
    pub loca: LocaTable,
}

impl Font {
    /// Read the whole file, then parse it. The file is closed before parsing
    /// starts.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs_err::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let directory = TableDirectory::parse(&data)?;
        directory.ensure_required()?;

        let table = |tag: Tag| directory.table(&data, tag);

        let cmap = CmapTable::parse(table(Tag::CMAP)?)?;
        let head = HeadTable::parse(table(Tag::HEAD)?)?;
        let hhea = HheaTable::parse(table(Tag::HHEA)?)?;
        let maxp = MaxpTable::parse(table(Tag::MAXP)?)?;
        let hmtx = HmtxTable::parse(
            table(Tag::HMTX)?,
            hhea.number_of_h_metrics,
            maxp.num_glyphs,
        )?;
        let name = NameTable::parse(table(Tag::NAME)?)?;
        let os2 = Os2Table::parse(table(Tag::OS2)?)?;
        let post = PostTable::parse(table(Tag::POST)?)?;
        log::debug!(
            "parsed required tables: upem {}, {} glyph(s), post {}",
            head.units_per_em,
            maxp.num_glyphs,
            post.version_string()
        );

        let kern = if directory.contains(Tag::KERN) {
            Some(KernTable::parse(table(Tag::KERN)?)?)
        } else {
            None
        };

        let loca = LocaTable::parse(
            table(Tag::LOCA)?,
            head.index_to_loc_format,
            maxp.num_glyphs,
        )?;
        let glyf_record = directory
            .find(Tag::GLYF)
            .ok_or(FontError::MissingTable(Tag::GLYF))?;
        let glyf_start = glyf_record.offset as usize;
        let glyf = glyf_start..glyf_start + glyf_record.length as usize;

        log::debug!(
            "loaded '{}' with {} table(s)",
            name.full_name().unwrap_or("<unnamed>"),
            directory.records.len()
        );

        Ok(Self {
            data,
            glyf,
            directory,
            cmap,
            head,
            hhea,
            maxp,
            hmtx,
            name,
            os2,
            post,
            kern,
            loca,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    pub fn glyph_index(&self, ch: char) -> Option<u16> {
        self.cmap.lookup(ch)
    }

    pub fn horizontal_metrics(&self, glyph: u16) -> HorizontalMetrics {
        self.hmtx.get(glyph).unwrap_or_default()
    }

    /// Pair adjustment in design units, zero without a `kern` table.
    pub fn kerning(&self, left: u16, right: u16) -> i32 {
        self.kern.as_ref().map_or(0, |k| k.kerning(left, right))
    }

    pub fn glyph_reader(&self) -> GlyphReader<'_> {
        // the range was validated by the directory
        GlyphReader::new(&self.data[self.glyf.clone()], &self.loca)
    }

    /// Outline of `glyph` with contours built, not yet coloured.
    pub fn outline(&self, glyph: u16) -> Result<Glyph> {
        let mut outline = self.glyph_reader().read(glyph)?;
        build_contours(&mut outline);
        Ok(outline)
    }

    /// Outline of `glyph` with contours built and edges coloured.
    pub fn coloured_outline(&self, glyph: u16, angle_threshold: f64) -> Result<Glyph> {
        let mut outline = self.outline(glyph)?;
        colour_glyph(&mut outline, angle_threshold);
        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FontBuilder, SAMPLE_A, SAMPLE_SPACE};

    #[test]
    fn loads_sample_font() {
        let font = Font::from_bytes(FontBuilder::sample().build()).unwrap();
        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.hhea.number_of_h_metrics, 2);
        assert_eq!(font.num_glyphs(), 3);
        assert_eq!(font.name.family(), Some("Fixture Sans"));
        assert_eq!(font.glyph_index('A'), Some(SAMPLE_A));
        assert_eq!(font.glyph_index('Z'), None);
        assert!(font.kern.is_none());
        assert_eq!(font.horizontal_metrics(SAMPLE_SPACE).advance_width, 600);
    }

    #[test]
    fn outlines_are_closed() {
        let font = Font::from_bytes(FontBuilder::sample().build()).unwrap();
        for id in 0..font.num_glyphs() {
            let glyph = font.coloured_outline(id, 3.0).unwrap();
            if glyph.number_of_contours >= 0 {
                assert_eq!(glyph.contours.len(), glyph.number_of_contours as usize);
            }
            assert!(glyph.contours.iter().all(|c| c.is_closed()));
        }
        assert!(font.outline(SAMPLE_SPACE).unwrap().is_whitespace());
        assert!(!font.outline(SAMPLE_A).unwrap().is_whitespace());
    }

    #[test]
    fn optional_kern_table() {
        let data = FontBuilder::sample()
            .with_kerning(&[(SAMPLE_A, SAMPLE_SPACE, -30)])
            .build();
        let font = Font::from_bytes(data).unwrap();
        assert_eq!(font.kerning(SAMPLE_A, SAMPLE_SPACE), -30);
        assert_eq!(font.kerning(SAMPLE_SPACE, SAMPLE_A), 0);
    }

    #[test]
    fn missing_table_fails_the_load() {
        let data = FontBuilder::sample().without_table(Tag::OS2).build();
        assert!(matches!(
            Font::from_bytes(data),
            Err(FontError::MissingTable(Tag::OS2))
        ));
        let data = FontBuilder::sample().without_table(Tag::GLYF).build();
        assert!(matches!(
            Font::from_bytes(data),
            Err(FontError::MissingTable(Tag::GLYF))
        ));
    }

    #[test]
    fn corrupt_table_fails_the_load() {
        let builder = FontBuilder::sample();
        let mut data = builder.build();
        let dir = TableDirectory::parse(&data).unwrap();
        let maxp = dir.find(Tag::MAXP).unwrap();
        data[maxp.offset as usize + 5] ^= 1;
        assert!(matches!(
            Font::from_bytes(data),
            Err(FontError::ChecksumMismatch { tag: Tag::MAXP, .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Font::from_path("definitely/not/here.ttf"),
            Err(FontError::Io(_))
        ));
    }
}
