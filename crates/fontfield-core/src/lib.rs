//! TrueType parsing and multi-channel true signed distance field atlases.
//!
//! Load a [`Font`], then call [`generate_atlas`] to get a [`FontAtlas`]: a
//! square RGBA float field plus per-glyph placement data.

pub mod atlas;
pub mod colouring;
pub mod contour;
pub mod edge;
pub mod error;
pub mod font;
pub mod glyph;
pub mod packer;
pub mod reader;
pub mod sdf;
pub mod tables;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use atlas::{
    AtlasOptions, FontAtlas, FontMetrics, GlyphData, KerningPair, PlaneBounds, generate_atlas,
    generate_atlas_with_progress,
};
pub use error::{FontError, Result};
pub use font::Font;
