//! Font to MTSDF atlas: outline, colour, pack, rasterize.

use crate::colouring::DEFAULT_ANGLE_THRESHOLD;
use crate::error::{FontError, Result};
use crate::font::Font;
use crate::glyph::Glyph;
use crate::packer::{GuillotinePacker, PackItem, Rectangle};
use crate::sdf::{CellTransform, rasterize_glyph};
use serde::Serialize;
use std::collections::HashMap;

/// Every printable ASCII character, space included.
pub fn printable_ascii() -> Vec<char> {
    (' '..='~').collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct AtlasOptions {
    /// Pixels per em of the generated field.
    pub px_per_em: f64,
    /// Distance range in pixels. Also the padding around every glyph cell.
    pub px_range: u32,
    /// Corner detection threshold in radians.
    pub angle_threshold: f64,
    pub charset: Vec<char>,
    /// Edge length added to the atlas each time packing fails.
    pub growth_step: u32,
    pub max_atlas_size: u32,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            px_per_em: 32.0,
            px_range: 4,
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            charset: printable_ascii(),
            growth_step: 16,
            max_atlas_size: 8192,
        }
    }
}

impl AtlasOptions {
    /// Reject settings that would divide by zero or produce an empty field.
    pub fn validate(&self) -> Result<()> {
        if !(self.px_per_em.is_finite() && self.px_per_em > 0.0) {
            return Err(FontError::option("px_per_em", self.px_per_em));
        }
        if self.px_range == 0 {
            return Err(FontError::option("px_range", self.px_range));
        }
        if !(self.angle_threshold.is_finite() && self.angle_threshold >= 0.0) {
            return Err(FontError::option("angle_threshold", self.angle_threshold));
        }
        if self.growth_step == 0 {
            return Err(FontError::option("growth_step", self.growth_step));
        }
        if self.max_atlas_size == 0 {
            return Err(FontError::option("max_atlas_size", self.max_atlas_size));
        }
        Ok(())
    }
}

/// Quad placement in em units relative to the pen position on the baseline.
/// Covers the whole atlas cell, padding included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlaneBounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GlyphData {
    pub character: char,
    pub glyph_id: u16,
    /// `None` for glyphs without outlines, such as space.
    pub atlas_rect: Option<Rectangle>,
    /// Design units.
    pub advance_width: u16,
    /// Design units.
    pub left_side_bearing: i16,
    pub plane_bounds: Option<PlaneBounds>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KerningPair {
    pub left: char,
    pub right: char,
    /// Design units to add to `left`'s advance.
    pub value: i32,
}

/// Line metrics, copied from `hhea` and `OS/2` in design units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
}

impl FontMetrics {
    pub fn from_font(font: &Font) -> Self {
        let v2 = font.os2.v2;
        Self {
            units_per_em: font.head.units_per_em,
            ascender: font.hhea.ascender,
            descender: font.hhea.descender,
            line_gap: font.hhea.line_gap,
            typo_ascender: font.os2.s_typo_ascender,
            typo_descender: font.os2.s_typo_descender,
            typo_line_gap: font.os2.s_typo_line_gap,
            x_height: v2.map(|v| v.sx_height),
            cap_height: v2.map(|v| v.s_cap_height),
        }
    }
}

/// A square field texture plus what a text renderer needs to use it.
#[derive(Clone, Debug, Serialize)]
pub struct FontAtlas {
    /// Edge length in pixels.
    pub size: u32,
    pub px_range: u32,
    pub px_per_em: f64,
    /// Row-major, top row first. Each channel is `distance / range + 0.5`.
    #[serde(skip)]
    pub pixels: Vec<[f32; 4]>,
    pub glyphs: Vec<GlyphData>,
    pub kerning: Vec<KerningPair>,
    pub metrics: FontMetrics,
}

impl FontAtlas {
    pub fn glyph(&self, ch: char) -> Option<&GlyphData> {
        self.glyphs.iter().find(|g| g.character == ch)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.pixels
            .get(y as usize * self.size as usize + x as usize)
            .copied()
    }
}

/// [`generate_atlas_with_progress`] without progress reporting.
pub fn generate_atlas(font: &Font, options: &AtlasOptions) -> Result<FontAtlas> {
    generate_atlas_with_progress(font, options, |_, _| {})
}

/// Build the atlas for `options.charset`. `progress(done, total)` is called
/// after each glyph is rasterized.
pub fn generate_atlas_with_progress(
    font: &Font,
    options: &AtlasOptions,
    mut progress: impl FnMut(usize, usize),
) -> Result<FontAtlas> {
    options.validate()?;
    let units_per_em = f64::from(font.units_per_em());
    let scale = options.px_per_em / units_per_em;
    let padding = options.px_range;

    let mut mapped: Vec<(char, u16)> = Vec::with_capacity(options.charset.len());
    for &ch in &options.charset {
        if mapped.iter().any(|&(c, _)| c == ch) {
            continue;
        }
        match font.glyph_index(ch) {
            Some(glyph) => mapped.push((ch, glyph)),
            None => log::warn!("no glyph for {ch:?}, skipping"),
        }
    }

    // Characters sharing a glyph share its outline and atlas cell.
    let mut outlines: Vec<Glyph> = Vec::new();
    for &(_, id) in &mapped {
        if !outlines.iter().any(|g| g.id == id) {
            outlines.push(font.coloured_outline(id, options.angle_threshold)?);
        }
    }

    let drawable: Vec<&Glyph> = outlines.iter().filter(|g| !g.is_whitespace()).collect();
    let items = drawable
        .iter()
        .map(|g| pack_item(g, scale, padding, options.max_atlas_size))
        .collect::<Result<Vec<_>>>()?;

    let packing = GuillotinePacker::new(options.growth_step, options.max_atlas_size).pack(&items)?;
    let size = packing.size;

    let mut pixels = vec![[0.0f32; 4]; size as usize * size as usize];
    let mut rects: HashMap<u16, Rectangle> = HashMap::with_capacity(drawable.len());
    for (done, (glyph, &rect)) in drawable.iter().zip(&packing.placements).enumerate() {
        let transform = CellTransform::for_glyph(glyph, scale, options.px_range);
        rasterize_glyph(glyph, rect, &transform, &mut pixels, size)?;
        rects.insert(glyph.id, rect);
        progress(done + 1, drawable.len());
    }

    let outline_of = |id: u16| outlines.iter().find(|g| g.id == id);
    let glyphs: Vec<GlyphData> = mapped
        .iter()
        .map(|&(character, glyph_id)| {
            let metrics = font.horizontal_metrics(glyph_id);
            let atlas_rect = rects.get(&glyph_id).copied();
            let plane_bounds = atlas_rect
                .zip(outline_of(glyph_id))
                .map(|(rect, glyph)| plane_bounds(glyph, rect, scale, padding, units_per_em));
            GlyphData {
                character,
                glyph_id,
                atlas_rect,
                advance_width: metrics.advance_width,
                left_side_bearing: metrics.left_side_bearing,
                plane_bounds,
            }
        })
        .collect();

    let mut kerning = Vec::new();
    if font.kern.is_some() {
        for &(left, left_id) in &mapped {
            for &(right, right_id) in &mapped {
                let value = font.kerning(left_id, right_id);
                if value != 0 {
                    kerning.push(KerningPair { left, right, value });
                }
            }
        }
    }

    log::info!(
        "atlas {size}x{size}: {} character(s), {} rasterized, {} kerning pair(s)",
        glyphs.len(),
        drawable.len(),
        kerning.len()
    );

    Ok(FontAtlas {
        size,
        px_range: options.px_range,
        px_per_em: options.px_per_em,
        pixels,
        glyphs,
        kerning,
        metrics: FontMetrics::from_font(font),
    })
}

/// Padded cell size of `glyph`, sized in floating point so that no scale or
/// padding can wrap around.
fn pack_item(glyph: &Glyph, scale: f64, padding: u32, max_size: u32) -> Result<PackItem> {
    let pad = 2.0 * f64::from(padding);
    let width = (f64::from(glyph.width()) * scale).ceil() + pad;
    let height = (f64::from(glyph.height()) * scale).ceil() + pad;
    if width > f64::from(max_size) || height > f64::from(max_size) {
        return Err(FontError::GlyphTooLarge {
            glyph: glyph.id,
            width: width.min(f64::from(u32::MAX)) as u32,
            height: height.min(f64::from(u32::MAX)) as u32,
            max_size,
        });
    }
    Ok(PackItem {
        glyph: glyph.id,
        width: width as u32,
        height: height as u32,
    })
}

fn plane_bounds(glyph: &Glyph, rect: Rectangle, scale: f64, padding: u32, upem: f64) -> PlaneBounds {
    let pad = f64::from(padding) / scale;
    let left = f64::from(glyph.x_min) - pad;
    let top = f64::from(glyph.y_max) + pad;
    PlaneBounds {
        left: left / upem,
        bottom: (top - f64::from(rect.height) / scale) / upem,
        right: (left + f64::from(rect.width) / scale) / upem,
        top: top / upem,
    }
}
