//! Error types for font loading and atlas generation.

use crate::reader::Tag;
use thiserror::Error;

pub type Result<T, E = FontError> = std::result::Result<T, E>;

/// Everything that can make a font unusable.
///
/// There is no partial recovery: any of these means the font cannot be
/// loaded or turned into an atlas.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    /// A read ran past the end of a table or of the file.
    #[error("unexpected end of data in '{table}' at offset {offset} (wanted {wanted} byte(s))")]
    UnexpectedEof {
        table: Tag,
        offset: usize,
        wanted: usize,
    },

    /// The directory version is neither TrueType (0x00010000) nor 'OTTO'.
    #[error("unsupported sfnt version 0x{0:08X}")]
    UnsupportedSfntVersion(u32),

    /// The `head` table magic number is wrong.
    #[error("bad magic number 0x{0:08X} in 'head'")]
    BadMagic(u32),

    /// A table the loader depends on is absent from the directory.
    #[error("missing required table '{0}'")]
    MissingTable(Tag),

    /// A table record points outside the file.
    #[error("table '{tag}' range {offset}+{length} exceeds file length {file_len}")]
    TableOutOfBounds {
        tag: Tag,
        offset: u32,
        length: u32,
        file_len: usize,
    },

    /// A table's content does not match the checksum in its record.
    #[error("checksum mismatch in '{tag}': expected 0x{expected:08X}, computed 0x{actual:08X}")]
    ChecksumMismatch { tag: Tag, expected: u32, actual: u32 },

    /// A table's version field holds a value this parser does not know.
    #[error("table '{table}' has unsupported version 0x{version:08X}")]
    UnsupportedVersion { table: Tag, version: u32 },

    /// A subtable format that exists in the format but is not implemented here.
    #[error("'{table}' subtable format {format} not implemented")]
    FormatNotImplemented { table: Tag, format: u16 },

    /// A field holds a value outside its legal range.
    #[error("invalid value {value} for field '{field}' in '{table}'")]
    InvalidValue {
        table: Tag,
        field: &'static str,
        value: i64,
    },

    /// A `loca` entry is not monotonic or points outside `glyf`.
    #[error("invalid offset for glyph {glyph}: {start}..{end} (glyf length {glyf_len})")]
    InvalidGlyphOffset {
        glyph: u16,
        start: usize,
        end: usize,
        glyf_len: usize,
    },

    /// A glyph id at or beyond `maxp.numGlyphs`.
    #[error("glyph id {glyph} out of range (font has {num_glyphs} glyphs)")]
    GlyphOutOfRange { glyph: u16, num_glyphs: u16 },

    /// Contour end indices or point data are inconsistent.
    #[error("invalid contour data in glyph {glyph}: {reason}")]
    InvalidContourData { glyph: u16, reason: String },

    /// Composite glyph nesting exceeded the recursion cap, usually a cycle.
    #[error("composite glyph {glyph} nests deeper than {max_depth} levels")]
    CompositeDepthExceeded { glyph: u16, max_depth: usize },

    /// A single glyph's padded box is larger than the biggest allowed atlas.
    #[error("glyph {glyph} needs {width}x{height} pixels, larger than the {max_size}px atlas limit")]
    GlyphTooLarge {
        glyph: u16,
        width: u32,
        height: u32,
        max_size: u32,
    },

    /// Packing did not converge before reaching the maximum atlas size.
    #[error("{glyphs} glyph(s) do not fit in a {max_size}x{max_size} atlas")]
    AtlasOverflow { glyphs: usize, max_size: u32 },

    /// An atlas setting that cannot produce a usable field.
    #[error("invalid atlas option '{option}': {value}")]
    InvalidOption { option: &'static str, value: String },

    /// A glyph cell reaches past the pixel buffer it is rasterized into.
    #[error("cell {width}x{height} at ({x}, {y}) does not fit a {atlas_width}px wide atlas of {pixels} pixel(s)")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        atlas_width: u32,
        pixels: usize,
    },
}

impl FontError {
    pub(crate) fn invalid(table: Tag, field: &'static str, value: impl Into<i64>) -> Self {
        Self::InvalidValue {
            table,
            field,
            value: value.into(),
        }
    }

    pub(crate) fn option(option: &'static str, value: impl ToString) -> Self {
        Self::InvalidOption {
            option,
            value: value.to_string(),
        }
    }

    pub(crate) fn contour(glyph: u16, reason: impl Into<String>) -> Self {
        Self::InvalidContourData {
            glyph,
            reason: reason.into(),
        }
    }
}
