use anyhow::Result;
use fontfield_core::FontAtlas;
use image::{Rgba, RgbaImage};

/// Map a biased field value onto 0..=255. Values outside 0..1 saturate.
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn atlas_image(atlas: &FontAtlas) -> RgbaImage {
    RgbaImage::from_fn(atlas.size, atlas.size, |x, y| {
        let [r, g, b, a] = atlas.pixel(x, y).unwrap_or([0.0; 4]);
        Rgba([quantize(r), quantize(g), quantize(b), quantize(a)])
    })
}

pub fn render_luau_module(atlas: &FontAtlas, generator: &str) -> Result<String> {
    Ok(format!(
        "-- This file is automatically @generated by {generator}.\n\
         -- DO NOT EDIT MANUALLY.\n\n\
         local font = {}\n\
         return {{\n\
         \tfont = font\n\
         }}\n",
        serialize_atlas_luau(atlas)?
    ))
}

fn serialize_atlas_luau(atlas: &FontAtlas) -> Result<String> {
    let t = "\t";
    let m = &atlas.metrics;

    let mut parts = vec!["{".to_string()];
    parts.push(format!("{t}size = {},", atlas.size));
    parts.push(format!("{t}pxRange = {},", atlas.px_range));
    parts.push(format!("{t}pxPerEm = {},", float_luau(atlas.px_per_em)));

    parts.push(format!("{t}metrics = {{"));
    parts.push(format!("{t}\tunitsPerEm = {},", m.units_per_em));
    parts.push(format!("{t}\tascender = {},", m.ascender));
    parts.push(format!("{t}\tdescender = {},", m.descender));
    parts.push(format!("{t}\tlineGap = {},", m.line_gap));
    if let Some(x_height) = m.x_height {
        parts.push(format!("{t}\txHeight = {x_height},"));
    }
    if let Some(cap_height) = m.cap_height {
        parts.push(format!("{t}\tcapHeight = {cap_height},"));
    }
    parts.push(format!("{t}}},"));

    // Keyed by character so renderers can index directly
    parts.push(format!("{t}glyphs = {{"));
    for g in &atlas.glyphs {
        let key = serde_json::to_string(&g.character.to_string())?;
        parts.push(format!("{t}\t[{key}] = {{"));
        parts.push(format!("{t}\t\tglyphId = {},", g.glyph_id));
        parts.push(format!("{t}\t\tadvance = {},", g.advance_width));
        parts.push(format!("{t}\t\tbearing = {},", g.left_side_bearing));
        if let Some(rect) = g.atlas_rect {
            parts.push(format!(
                "{t}\t\trect = {{ x = {}, y = {}, w = {}, h = {} }},",
                rect.x, rect.y, rect.width, rect.height
            ));
        }
        if let Some(pb) = g.plane_bounds {
            parts.push(format!(
                "{t}\t\tplane = {{ left = {}, bottom = {}, right = {}, top = {} }},",
                float_luau(pb.left),
                float_luau(pb.bottom),
                float_luau(pb.right),
                float_luau(pb.top)
            ));
        }
        parts.push(format!("{t}\t}},"));
    }
    parts.push(format!("{t}}},"));

    parts.push(format!("{t}kerning = {{"));
    for k in &atlas.kerning {
        let left = serde_json::to_string(&k.left.to_string())?;
        let right = serde_json::to_string(&k.right.to_string())?;
        parts.push(format!(
            "{t}\t{{ left = {left}, right = {right}, kern = {} }},",
            k.value
        ));
    }
    parts.push(format!("{t}}},"));

    parts.push("}".to_string());
    Ok(parts.join("\n"))
}

fn float_luau(v: f64) -> String {
    if v.is_finite() {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontfield_core::fixture::{FontBuilder, SAMPLE_A, SAMPLE_SPACE};
    use fontfield_core::{AtlasOptions, Font, generate_atlas};

    fn sample_atlas() -> FontAtlas {
        let font = Font::from_bytes(
            FontBuilder::sample()
                .with_kerning(&[(SAMPLE_A, SAMPLE_SPACE, -40)])
                .build(),
        )
        .unwrap();
        let options = AtlasOptions {
            charset: vec!['A', ' '],
            ..AtlasOptions::default()
        };
        generate_atlas(&font, &options).unwrap()
    }

    #[test]
    fn quantize_saturates() {
        assert_eq!(quantize(-0.3), 0);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 128);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(7.0), 255);
    }

    #[test]
    fn image_matches_atlas_size() {
        let atlas = sample_atlas();
        let image = atlas_image(&atlas);
        assert_eq!(image.dimensions(), (atlas.size, atlas.size));

        let rect = atlas.glyph('A').unwrap().atlas_rect.unwrap();
        let cx = rect.x + rect.width / 2;
        let cy = rect.y + rect.height * 3 / 4;
        let pixel = image.get_pixel(cx, cy);
        let expected = atlas.pixel(cx, cy).unwrap();
        assert_eq!(pixel.0[3], quantize(expected[3]));
    }

    #[test]
    fn float_luau_trims() {
        assert_eq!(float_luau(1.5), "1.5");
        assert_eq!(float_luau(32.0), "32");
        assert_eq!(float_luau(f64::NAN), "0");
        assert_eq!(float_luau(-0.125), "-0.125");
    }

    #[test]
    fn luau_module_lists_glyphs_and_kerning() {
        let atlas = sample_atlas();
        let luau = render_luau_module(&atlas, "fontfield").unwrap();
        assert!(luau.starts_with("-- This file is automatically @generated by fontfield."));
        assert!(luau.contains("[\"A\"] = {"));
        assert!(luau.contains("[\" \"] = {"));
        assert!(luau.contains("{ left = \"A\", right = \" \", kern = -40 },"));
        assert!(luau.contains("unitsPerEm = 1000,"));
        assert!(luau.trim_end().ends_with('}'));
    }
}
