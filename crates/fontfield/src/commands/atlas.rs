use crate::output::{atlas_image, render_luau_module};
use anyhow::{Context, Result, bail};
use clap::Parser;
use fontfield_config::FontfieldConfig;
use fontfield_core::{AtlasOptions, Font, FontAtlas, generate_atlas_with_progress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(about = "Generate an MTSDF atlas from a .ttf font")]
pub struct AtlasArgs {
    /// Input .ttf/.otf font, or a directory of fonts
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output PNG atlas path. When INPUT is a directory, the directory to write atlases into.
    #[arg(value_name = "OUTPUT_PNG")]
    pub output: PathBuf,

    /// Descend into subdirectories when INPUT is a directory
    #[arg(short, long)]
    pub recursive: bool,

    /// Field resolution in pixels per em
    #[arg(long)]
    pub px_per_em: Option<f64>,

    /// Distance range in pixels (also the padding around each glyph)
    #[arg(long)]
    pub px_range: Option<u32>,

    /// Corner detection threshold in radians
    #[arg(long)]
    pub angle_threshold: Option<f64>,

    /// Characters to include in the atlas
    #[arg(long)]
    pub charset: Option<String>,

    /// Pixels added to the atlas edge each time packing fails
    #[arg(long)]
    pub growth_step: Option<u32>,

    /// Largest atlas edge length before giving up
    #[arg(long)]
    pub max_atlas_size: Option<u32>,

    /// Also write a Luau metadata module next to the PNG
    #[arg(long)]
    pub luau: bool,

    /// Skip the JSON metadata file
    #[arg(long)]
    pub no_json: bool,
}

/// Resolved settings for one invocation.
struct Job {
    options: AtlasOptions,
    json: bool,
    luau: bool,
}

impl Job {
    fn new(args: &AtlasArgs, config: &FontfieldConfig) -> Result<Self> {
        let mut options = config.atlas_options();
        if let Some(px_per_em) = args.px_per_em {
            options.px_per_em = px_per_em;
        }
        if let Some(px_range) = args.px_range {
            options.px_range = px_range;
        }
        if let Some(angle_threshold) = args.angle_threshold {
            options.angle_threshold = angle_threshold;
        }
        if let Some(charset) = &args.charset {
            options.charset = charset.chars().collect();
        }
        if let Some(growth_step) = args.growth_step {
            options.growth_step = growth_step;
        }
        if let Some(max_atlas_size) = args.max_atlas_size {
            options.max_atlas_size = max_atlas_size;
        }

        options.validate()?;
        if options.charset.is_empty() {
            bail!("--charset must not be empty");
        }

        Ok(Self {
            options,
            json: config.output.json && !args.no_json,
            luau: config.output.luau || args.luau,
        })
    }
}

pub fn run(args: AtlasArgs, config_path: Option<&Path>, multi_progress: &MultiProgress) -> bool {
    match run_impl(args, config_path, multi_progress) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[atlas] ERROR: {e:#}");
            false
        }
    }
}

fn run_impl(
    args: AtlasArgs,
    config_path: Option<&Path>,
    multi_progress: &MultiProgress,
) -> Result<()> {
    let config = FontfieldConfig::load(config_path)?;
    let job = Job::new(&args, &config)?;

    if !args.input.exists() {
        bail!("Input path does not exist: {}", args.input.display());
    }

    if args.input.is_file() {
        return build_one(&args.input, &args.output, &job, multi_progress);
    }

    let fonts = collect_font_files(&args.input, args.recursive)?;
    if fonts.is_empty() {
        bail!("No .ttf/.otf files found in {}", args.input.display());
    }
    fs_err::create_dir_all(&args.output)?;

    let mut failed = 0usize;
    for font_path in &fonts {
        let stem = font_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());
        let png_path = args.output.join(format!("{stem}.png"));
        if let Err(e) = build_one(font_path, &png_path, &job, multi_progress) {
            eprintln!("[atlas] ERROR: {}: {e:#}", font_path.display());
            failed += 1;
        }
    }

    println!(
        "[atlas] Processed {} font(s), {} failed",
        fonts.len(),
        failed
    );
    if failed > 0 {
        bail!("{failed} of {} font(s) failed", fonts.len());
    }
    Ok(())
}

fn build_one(
    font_path: &Path,
    png_path: &Path,
    job: &Job,
    multi_progress: &MultiProgress,
) -> Result<()> {
    let font = Font::from_path(font_path)
        .with_context(|| format!("Failed to load font {}", font_path.display()))?;

    let progress = multi_progress.add(ProgressBar::new(0));
    progress.set_style(
        ProgressStyle::with_template("{msg} [{bar:32}] {pos}/{len} glyphs")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message(display_name(font_path));

    let atlas = generate_atlas_with_progress(&font, &job.options, |done, total| {
        progress.set_length(total as u64);
        progress.set_position(done as u64);
    });
    progress.finish_and_clear();
    multi_progress.remove(&progress);

    let atlas =
        atlas.with_context(|| format!("Failed to build atlas for {}", font_path.display()))?;
    write_outputs(&atlas, png_path, job)
}

fn write_outputs(atlas: &FontAtlas, png_path: &Path, job: &Job) -> Result<()> {
    if let Some(parent) = png_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    atlas_image(atlas)
        .save(png_path)
        .with_context(|| format!("Failed to write {}", png_path.display()))?;

    if job.json {
        let json_path = png_path.with_extension("json");
        let json = serde_json::to_string_pretty(atlas)?;
        fs_err::write(&json_path, json)
            .with_context(|| format!("Failed to write JSON metadata {}", json_path.display()))?;
        println!("[atlas] Wrote metadata: {}", json_path.display());
    }

    if job.luau {
        let luau_path = png_path.with_extension("luau");
        fs_err::write(&luau_path, render_luau_module(atlas, "fontfield")?)
            .with_context(|| format!("Failed to write Luau metadata {}", luau_path.display()))?;
        println!("[atlas] Wrote metadata: {}", luau_path.display());
    }

    let packed = atlas.glyphs.iter().filter(|g| g.atlas_rect.is_some()).count();
    println!(
        "[atlas] ✅ Wrote {} ({}x{}, range {}, glyphs {}, packed {})",
        png_path.display(),
        atlas.size,
        atlas.size,
        atlas.px_range,
        atlas.glyphs.len(),
        packed
    );
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

fn collect_font_files(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = if recursive {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| is_font_file(p))
            .collect()
    } else {
        fs_err::read_dir(path)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| is_font_file(p))
            .collect()
    };
    files.sort();
    Ok(files)
}
