mod commands;
mod output;

use clap::{Parser, Subcommand, builder::styling};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fontfield")]
#[command(about = "Fontfield")]
#[command(version = env!("FONTFIELD_VERSION"))]
#[command(long_version = env!("FONTFIELD_VERSION"))]
#[command(
    styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to fontfield.toml. Defaults to the one in the current directory, if any.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an MTSDF atlas from a .ttf font
    Atlas(commands::atlas::AtlasArgs),
    /// Print the table directory and metrics of a font
    Inspect(commands::inspect::InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    let multi_progress = MultiProgress::new();
    let logger = env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .build();
    let level = logger.filter();
    if LogWrapper::new(multi_progress.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    let result = match cli.command {
        Commands::Atlas(args) => {
            commands::atlas::run(args, cli.config.as_deref(), &multi_progress)
        }
        Commands::Inspect(args) => commands::inspect::run(args),
    };

    std::process::exit(if result { 0 } else { 1 });
}
