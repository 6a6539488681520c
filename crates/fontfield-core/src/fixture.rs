//! In-memory TrueType files for tests.
//!
//! [`FontBuilder::sample`] produces a complete, checksummed font with three
//! glyphs: `.notdef`, `A` and space. The free functions encode individual
//! tables so parser tests can poke at single fields.

use crate::reader::Tag;
use crate::tables::table_checksum;
use std::collections::BTreeMap;

pub const COMPONENT_ARG_WORDS: u16 = 0x0001;
pub const COMPONENT_ARGS_ARE_XY: u16 = 0x0002;
pub const COMPONENT_SCALE: u16 = 0x0008;
pub const COMPONENT_MORE: u16 = 0x0020;
pub const COMPONENT_XY_SCALE: u16 = 0x0040;
pub const COMPONENT_TWO_BY_TWO: u16 = 0x0080;

/// 2021-03-04T05:06:07Z in OpenType seconds.
pub const SAMPLE_TIMESTAMP: i64 = 1_614_834_367 + 2_082_844_800;

pub const SAMPLE_UNITS_PER_EM: u16 = 1000;

/// Glyph ids in the sample font.
pub const SAMPLE_NOTDEF: u16 = 0;
pub const SAMPLE_A: u16 = 1;
pub const SAMPLE_SPACE: u16 = 2;

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// searchRange, entrySelector and rangeShift for `count` records of `unit`
/// bytes each.
fn binary_search_header(count: u16, unit: u16) -> [u16; 3] {
    let mut power = 1u16;
    let mut selector = 0u16;
    while power * 2 <= count.max(1) {
        power *= 2;
        selector += 1;
    }
    let range = power * unit;
    [range, selector, (count * unit).saturating_sub(range)]
}

/// Outline description used by [`encode_glyph_table`].
#[derive(Clone, Debug)]
pub enum GlyphSpec {
    Empty,
    Simple {
        contours: Vec<Vec<(i16, i16, bool)>>,
    },
    Composite(Vec<ComponentSpec>),
}

pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> GlyphSpec {
    GlyphSpec::Simple {
        contours: contours.iter().map(|c| c.to_vec()).collect(),
    }
}

#[derive(Clone, Debug)]
pub struct ComponentSpec {
    pub glyph: u16,
    /// Composite flags. Word-sized arguments and `MORE_COMPONENTS` are added
    /// by the encoder as needed.
    pub flags: u16,
    pub arg1: i32,
    pub arg2: i32,
    /// Raw 2.14 values, matching whichever scale flag is set.
    pub scale: Vec<i16>,
}

impl ComponentSpec {
    pub fn offset(glyph: u16, dx: i32, dy: i32) -> Self {
        Self {
            glyph,
            flags: COMPONENT_ARGS_ARE_XY,
            arg1: dx,
            arg2: dy,
            scale: Vec::new(),
        }
    }
}

const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

/// Flag bits and data bytes for one coordinate delta.
fn encode_delta(delta: i32, short: u8, same_or_positive: u8, out: &mut Vec<u8>) -> u8 {
    if delta == 0 {
        same_or_positive
    } else if delta.unsigned_abs() <= 255 {
        out.push(delta.unsigned_abs() as u8);
        short | if delta > 0 { same_or_positive } else { 0 }
    } else {
        out.extend_from_slice(&(delta as i16).to_be_bytes());
        0
    }
}

fn encode_simple(contours: &[Vec<(i16, i16, bool)>]) -> Vec<u8> {
    let points: Vec<(i16, i16, bool)> = contours.iter().flatten().copied().collect();
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);

    let mut out = Vec::new();
    push_i16(&mut out, contours.len() as i16);
    for v in [x_min, y_min, x_max, y_max] {
        push_i16(&mut out, v);
    }
    let mut end = 0usize;
    for contour in contours {
        end += contour.len();
        push_u16(&mut out, (end - 1) as u16);
    }
    push_u16(&mut out, 0); // instructionLength

    let mut flags = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut px, mut py) = (0i32, 0i32);
    for &(x, y, on) in &points {
        let (x, y) = (i32::from(x), i32::from(y));
        let mut flag = if on { ON_CURVE } else { 0 };
        flag |= encode_delta(x - px, X_SHORT, X_SAME_OR_POSITIVE, &mut xs);
        flag |= encode_delta(y - py, Y_SHORT, Y_SAME_OR_POSITIVE, &mut ys);
        flags.push(flag);
        (px, py) = (x, y);
    }
    out.extend_from_slice(&flags);
    out.extend_from_slice(&xs);
    out.extend_from_slice(&ys);
    out
}

fn encode_composite(components: &[ComponentSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    push_i16(&mut out, -1);
    for _ in 0..4 {
        push_i16(&mut out, 0);
    }
    for (i, c) in components.iter().enumerate() {
        let xy = c.flags & COMPONENT_ARGS_ARE_XY != 0;
        let fits_byte = |v: i32| {
            if xy {
                i8::try_from(v).is_ok()
            } else {
                u8::try_from(v).is_ok()
            }
        };
        let words = !(fits_byte(c.arg1) && fits_byte(c.arg2));

        let mut flags = c.flags & !(COMPONENT_ARG_WORDS | COMPONENT_MORE);
        if words {
            flags |= COMPONENT_ARG_WORDS;
        }
        if i + 1 < components.len() {
            flags |= COMPONENT_MORE;
        }
        push_u16(&mut out, flags);
        push_u16(&mut out, c.glyph);
        for arg in [c.arg1, c.arg2] {
            if words {
                out.extend_from_slice(&(arg as i16).to_be_bytes());
            } else {
                out.push(arg as u8);
            }
        }
        for &s in &c.scale {
            push_i16(&mut out, s);
        }
    }
    out
}

/// `glyf` bytes and matching long-format `loca` bytes.
pub fn encode_glyph_table(glyphs: &[GlyphSpec]) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    for glyph in glyphs {
        push_u32(&mut loca, glyf.len() as u32);
        let record = match glyph {
            GlyphSpec::Empty => Vec::new(),
            GlyphSpec::Simple { contours } => encode_simple(contours),
            GlyphSpec::Composite(components) => encode_composite(components),
        };
        glyf.extend_from_slice(&record);
        if glyf.len() % 2 == 1 {
            glyf.push(0);
        }
    }
    push_u32(&mut loca, glyf.len() as u32);
    (glyf, loca)
}

/// A format 4 subtable with one delta segment per mapping.
pub fn cmap_format4(mappings: &[(char, u16)]) -> Vec<u8> {
    let mut segments: Vec<(u16, u16)> = mappings
        .iter()
        .map(|&(ch, glyph)| (ch as u32 as u16, glyph))
        .collect();
    segments.sort_by_key(|&(code, _)| code);
    let seg_count = segments.len() as u16 + 1;

    let mut out = Vec::new();
    push_u16(&mut out, 4);
    push_u16(&mut out, 16 + 8 * seg_count);
    push_u16(&mut out, 0); // language
    push_u16(&mut out, seg_count * 2);
    for v in binary_search_header(seg_count, 2) {
        push_u16(&mut out, v);
    }
    for &(code, _) in &segments {
        push_u16(&mut out, code);
    }
    push_u16(&mut out, 0xFFFF);
    push_u16(&mut out, 0); // reservedPad
    for &(code, _) in &segments {
        push_u16(&mut out, code);
    }
    push_u16(&mut out, 0xFFFF);
    for &(code, glyph) in &segments {
        push_u16(&mut out, glyph.wrapping_sub(code));
    }
    push_u16(&mut out, 1);
    for _ in 0..seg_count {
        push_u16(&mut out, 0);
    }
    out
}

/// A complete `cmap` with a single Windows Unicode BMP record.
pub fn cmap_table(mappings: &[(char, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u16(&mut out, 1);
    push_u16(&mut out, 3);
    push_u16(&mut out, 1);
    push_u32(&mut out, 12);
    out.extend_from_slice(&cmap_format4(mappings));
    out
}

/// A format 0 `name` table. Windows and Unicode strings are UTF-16BE, Mac
/// strings Latin-1. Strings are stored in record order, so the last one ends
/// the table.
pub fn name_table(records: &[(u16, u16, u16, &str)]) -> Vec<u8> {
    let mut storage = Vec::new();
    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u16(&mut out, records.len() as u16);
    push_u16(&mut out, 6 + 12 * records.len() as u16);
    for &(platform, encoding, name_id, value) in records {
        let bytes: Vec<u8> = if platform == 1 {
            value.chars().map(|c| c as u32 as u8).collect()
        } else {
            value.encode_utf16().flat_map(u16::to_be_bytes).collect()
        };
        let language = if platform == 3 { 0x0409 } else { 0 };
        for v in [
            platform,
            encoding,
            language,
            name_id,
            bytes.len() as u16,
            storage.len() as u16,
        ] {
            push_u16(&mut out, v);
        }
        storage.extend_from_slice(&bytes);
    }
    out.extend_from_slice(&storage);
    out
}

/// An `OS/2` table of `version`, sized exactly for that version's fields.
pub fn os2_table(version: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, version);
    push_i16(&mut out, 480); // xAvgCharWidth
    push_u16(&mut out, 400); // usWeightClass
    push_u16(&mut out, 5); // usWidthClass
    push_u16(&mut out, 0); // fsType
    for v in [650i16, 600, 0, 75, 650, 600, 0, 350, 50, 300, 0] {
        push_i16(&mut out, v);
    }
    out.extend_from_slice(&[2, 11, 5, 2, 2, 2, 2, 2, 2, 4]); // panose
    for v in [1u32, 0, 0, 0] {
        push_u32(&mut out, v);
    }
    out.extend_from_slice(b"FFLD");
    push_u16(&mut out, 0x0040); // fsSelection: regular
    push_u16(&mut out, 0x20);
    push_u16(&mut out, 0x41);
    push_i16(&mut out, 780); // sTypoAscender
    push_i16(&mut out, -220);
    push_i16(&mut out, 90);
    push_u16(&mut out, 800); // usWinAscent
    push_u16(&mut out, 200);
    if version >= 1 {
        push_u32(&mut out, 1);
        push_u32(&mut out, 0);
    }
    if version >= 2 {
        push_i16(&mut out, 500); // sxHeight
        push_i16(&mut out, 700); // sCapHeight
        push_u16(&mut out, 0);
        push_u16(&mut out, 0x20);
        push_u16(&mut out, 2);
    }
    if version >= 5 {
        push_u16(&mut out, 0);
        push_u16(&mut out, 0xFFFF);
    }
    out
}

/// The fixed 32-byte `post` header with no glyph name data.
pub fn post_header(version: u32) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, version);
    push_u32(&mut out, (-12.5f64 * 65_536.0) as i32 as u32); // italicAngle
    push_i16(&mut out, -100); // underlinePosition
    push_i16(&mut out, 50); // underlineThickness
    for _ in 0..5 {
        push_u32(&mut out, 0);
    }
    out
}

/// A version 0 `kern` table with one horizontal format 0 subtable.
pub fn kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u16(&mut out, 1);
    push_u16(&mut out, 0); // subtable version
    push_u16(&mut out, 14 + 6 * pairs.len() as u16);
    push_u16(&mut out, 0x0001); // horizontal, format 0
    push_u16(&mut out, pairs.len() as u16);
    for v in binary_search_header(pairs.len() as u16, 6) {
        push_u16(&mut out, v);
    }
    for &(left, right, value) in pairs {
        push_u16(&mut out, left);
        push_u16(&mut out, right);
        push_i16(&mut out, value);
    }
    out
}

fn head_table(bbox: [i16; 4]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 1);
    push_u16(&mut out, 0);
    push_u32(&mut out, 0x0001_0000); // fontRevision 1.0
    push_u32(&mut out, 0); // checkSumAdjustment, filled in by build()
    push_u32(&mut out, 0x5F0F_3CF5);
    push_u16(&mut out, 0x000B);
    push_u16(&mut out, SAMPLE_UNITS_PER_EM);
    out.extend_from_slice(&SAMPLE_TIMESTAMP.to_be_bytes());
    out.extend_from_slice(&SAMPLE_TIMESTAMP.to_be_bytes());
    for v in bbox {
        push_i16(&mut out, v);
    }
    push_u16(&mut out, 0); // macStyle
    push_u16(&mut out, 8); // lowestRecPPEM
    push_i16(&mut out, 2); // fontDirectionHint
    push_i16(&mut out, 1); // indexToLocFormat: long
    push_i16(&mut out, 0);
    out
}

fn hhea_table(number_of_h_metrics: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 1);
    push_u16(&mut out, 0);
    for v in [800i16, -200, 90] {
        push_i16(&mut out, v);
    }
    push_u16(&mut out, 600); // advanceWidthMax
    for v in [0i16, 0, 600, 1, 0, 0, 0, 0, 0, 0, 0] {
        push_i16(&mut out, v);
    }
    push_u16(&mut out, number_of_h_metrics);
    out
}

fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_u16(&mut out, num_glyphs);
    // maxPoints, maxContours, maxCompositePoints, maxCompositeContours
    for v in [8u16, 2, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0] {
        push_u16(&mut out, v);
    }
    out
}

/// Assembles an sfnt from individual tables.
#[derive(Clone, Debug, Default)]
pub struct FontBuilder {
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl FontBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `.notdef` (a hollow box), `A` (a triangle with a counter) and space.
    pub fn sample() -> Self {
        let notdef = simple_glyph(&[
            &[(50, 0, true), (50, 700, true), (450, 700, true), (450, 0, true)],
            &[(100, 50, true), (400, 50, true), (400, 650, true), (100, 650, true)],
        ]);
        let a = simple_glyph(&[
            &[(0, 0, true), (300, 700, true), (600, 0, true)],
            &[(200, 200, true), (400, 200, true), (300, 450, true)],
        ]);
        let (glyf, loca) = encode_glyph_table(&[notdef, a, GlyphSpec::Empty]);

        let mut hmtx = Vec::new();
        for (advance, lsb) in [(500u16, 50i16), (600, 0)] {
            push_u16(&mut hmtx, advance);
            push_i16(&mut hmtx, lsb);
        }
        push_i16(&mut hmtx, 0); // space inherits the last advance

        Self::new()
            .table(Tag::CMAP, cmap_table(&[('A', SAMPLE_A), (' ', SAMPLE_SPACE)]))
            .table(Tag::GLYF, glyf)
            .table(Tag::HEAD, head_table([0, 0, 600, 700]))
            .table(Tag::HHEA, hhea_table(2))
            .table(Tag::HMTX, hmtx)
            .table(Tag::LOCA, loca)
            .table(Tag::MAXP, maxp_table(3))
            .table(
                Tag::NAME,
                name_table(&[
                    (3, 1, 1, "Fixture Sans"),
                    (3, 1, 2, "Regular"),
                    (3, 1, 4, "Fixture Sans Regular"),
                    (3, 1, 5, "Version 1.000"),
                    (3, 1, 6, "FixtureSans-Regular"),
                ]),
            )
            .table(Tag::OS2, os2_table(4))
            .table(Tag::POST, post_header(0x0003_0000))
    }

    pub fn table(mut self, tag: Tag, bytes: Vec<u8>) -> Self {
        self.tables.insert(tag, bytes);
        self
    }

    pub fn without_table(mut self, tag: Tag) -> Self {
        self.tables.remove(&tag);
        self
    }

    /// Add a `kern` table holding `pairs`.
    pub fn with_kerning(self, pairs: &[(u16, u16, i16)]) -> Self {
        self.table(Tag::KERN, kern_table(pairs))
    }

    pub fn table_bytes(&self, tag: Tag) -> Vec<u8> {
        self.tables.get(&tag).cloned().unwrap_or_default()
    }

    pub fn head_bytes(&self) -> Vec<u8> {
        self.table_bytes(Tag::HEAD)
    }

    pub fn hhea_bytes(&self) -> Vec<u8> {
        self.table_bytes(Tag::HHEA)
    }

    /// The whole file: directory sorted by tag, tables 4-byte aligned, every
    /// checksum filled in and `head.checkSumAdjustment` set.
    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let mut out = Vec::new();
        push_u32(&mut out, 0x0001_0000);
        push_u16(&mut out, num_tables);
        for v in binary_search_header(num_tables, 16) {
            push_u16(&mut out, v);
        }

        let mut offset = 12 + 16 * self.tables.len();
        let mut head_offset = None;
        for (tag, bytes) in &self.tables {
            if *tag == Tag::HEAD {
                head_offset = Some(offset);
            }
            out.extend_from_slice(tag.as_bytes());
            push_u32(&mut out, table_checksum(bytes));
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, bytes.len() as u32);
            offset += bytes.len().next_multiple_of(4);
        }
        for bytes in self.tables.values() {
            out.extend_from_slice(bytes);
            out.resize(out.len().next_multiple_of(4), 0);
        }

        if let Some(head) = head_offset {
            let adjustment = 0xB1B0_AFBAu32.wrapping_sub(table_checksum(&out));
            out[head + 8..head + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        out
    }
}
