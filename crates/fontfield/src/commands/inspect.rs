use anyhow::{Context, Result};
use clap::Parser;
use fontfield_core::Font;
use fontfield_core::tables::cmap::CmapSubtable;
use fontfield_core::tables::head::LocaFormat;
use fontfield_core::tables::kern::KernFormat;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Print the table directory and metrics of a font")]
pub struct InspectArgs {
    /// Input .ttf font file
    #[arg(value_name = "INPUT_TTF")]
    pub input_ttf: PathBuf,
}

pub fn run(args: InspectArgs) -> bool {
    match run_impl(args) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[inspect] ERROR: {e:#}");
            false
        }
    }
}

fn run_impl(args: InspectArgs) -> Result<()> {
    let font = Font::from_path(&args.input_ttf)
        .with_context(|| format!("Failed to load font {}", args.input_ttf.display()))?;
    print!("{}", describe(&font)?);
    Ok(())
}

fn describe(font: &Font) -> Result<String> {
    let mut out = String::new();

    let name = &font.name;
    writeln!(out, "family:      {}", name.family().unwrap_or("-"))?;
    writeln!(out, "subfamily:   {}", name.subfamily().unwrap_or("-"))?;
    writeln!(out, "full name:   {}", name.full_name().unwrap_or("-"))?;
    writeln!(out, "version:     {}", name.version().unwrap_or("-"))?;
    writeln!(out, "postscript:  {}", name.postscript_name().unwrap_or("-"))?;
    writeln!(out)?;

    writeln!(out, "tables ({}):", font.directory.records.len())?;
    for record in &font.directory.records {
        writeln!(
            out,
            "  '{}'  offset {:>8}  length {:>8}  checksum {:08X}",
            record.tag, record.offset, record.length, record.checksum
        )?;
    }
    writeln!(out)?;

    let head = &font.head;
    writeln!(
        out,
        "head:  v{}.{}  revision {:.3}  unitsPerEm {}  bbox ({}, {}) - ({}, {})",
        head.major_version,
        head.minor_version,
        head.font_revision,
        head.units_per_em,
        head.x_min,
        head.y_min,
        head.x_max,
        head.y_max
    )?;
    writeln!(out, "       created {}  modified {}", head.created, head.modified)?;
    let loca = match head.index_to_loc_format {
        LocaFormat::Short => "short",
        LocaFormat::Long => "long",
    };
    writeln!(out, "       loca {loca}")?;

    let hhea = &font.hhea;
    writeln!(
        out,
        "hhea:  ascender {}  descender {}  lineGap {}  hMetrics {}",
        hhea.ascender, hhea.descender, hhea.line_gap, hhea.number_of_h_metrics
    )?;
    writeln!(
        out,
        "maxp:  v{}  glyphs {}",
        if font.maxp.truetype.is_some() { "1.0" } else { "0.5" },
        font.maxp.num_glyphs
    )?;

    let os2 = &font.os2;
    write!(
        out,
        "OS/2:  v{}  weight {}  width {}  typo {}/{}/{}",
        os2.version,
        os2.us_weight_class,
        os2.us_width_class,
        os2.s_typo_ascender,
        os2.s_typo_descender,
        os2.s_typo_line_gap
    )?;
    if let Some(v2) = &os2.v2 {
        write!(out, "  xHeight {}  capHeight {}", v2.sx_height, v2.s_cap_height)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "post:  v{}  italicAngle {}  fixedPitch {}",
        font.post.version_string(),
        font.post.italic_angle,
        font.post.is_fixed_pitch
    )?;

    for (record, subtable) in &font.cmap.subtables {
        let format = match subtable {
            CmapSubtable::ByteEncoding { .. } => 0,
            CmapSubtable::SegmentMapping(_) => 4,
        };
        writeln!(
            out,
            "cmap:  platform {} encoding {} format {format}",
            record.platform_id, record.encoding_id
        )?;
    }

    match &font.kern {
        Some(kern) => {
            let pairs: usize = kern
                .subtables
                .iter()
                .map(|sub| match &sub.format {
                    KernFormat::OrderedPairs(pairs) => pairs.len(),
                })
                .sum();
            writeln!(out, "kern:  {} subtable(s), {pairs} pair(s)", kern.subtables.len())?;
        }
        None => writeln!(out, "kern:  none")?,
    }

    Ok(out)
}
