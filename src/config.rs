//! Configuration for the `gcode-plot` command.
//!
//! Handles:
//! - Command-line argument parsing
//! - Locating and loading the machine settings file
//! - Command-line overrides of individual settings

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::settings::MachineSettings;

/// Environment variable naming a machine settings file
pub const SETTINGS_ENV: &str = "GCODE_PLOT_SETTINGS";

/// Command-line arguments for `gcode-plot`
#[derive(Debug, Parser)]
#[command(name = "gcode-plot")]
#[command(about = "Estimate drawing time and preview toolpaths of pen plotter G-code")]
#[command(version)]
pub struct Args {
    /// G-code program to load
    pub file: PathBuf,

    /// Machine settings file
    #[arg(long, help = "Machine settings TOML file")]
    pub settings: Option<PathBuf>,

    #[arg(long, help = "Mirror the program for drawing on the back of glass")]
    pub mirror: bool,

    #[arg(long, help = "Include moves made with the pen lifted")]
    pub show_pen_up: bool,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    #[arg(long, help = "List compiled toolpath nodes")]
    pub nodes: bool,

    /// Rewind to the last pen lift before this line and report from there
    #[arg(long, value_name = "LINE")]
    pub resume_from: Option<usize>,

    #[arg(long, help = "Reload and report again whenever the file changes")]
    pub watch: bool,

    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub program: PathBuf,
    pub settings: MachineSettings,
    /// Where the settings came from, `None` for built-in defaults
    pub settings_path: Option<PathBuf>,
    pub json: bool,
    pub show_nodes: bool,
    pub resume_from: Option<usize>,
    pub watch: bool,
    pub log_level: String,
}

impl Config {
    /// Create configuration from parsed arguments
    ///
    /// Settings file priority: `--settings` > `$GCODE_PLOT_SETTINGS` >
    /// `<config dir>/gcode-plot/machine.toml` > built-in defaults.
    pub fn from_args(args: Args) -> Result<Self> {
        let settings_path = args
            .settings
            .or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from))
            .or_else(Self::default_settings_path);

        let mut settings = match &settings_path {
            Some(path) => MachineSettings::load(path)
                .with_context(|| format!("Failed to load machine settings: {}", path.display()))?,
            None => MachineSettings::default(),
        };

        if args.mirror {
            settings.reverse_for_glass = true;
        }
        if args.show_pen_up {
            settings.show_pen_up = true;
        }

        Ok(Config {
            program: args.file,
            settings,
            settings_path,
            json: args.json,
            show_nodes: args.nodes,
            resume_from: args.resume_from,
            watch: args.watch,
            log_level: args.log_level,
        })
    }

    /// User settings file, if one exists
    pub fn default_settings_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gcode-plot").join("machine.toml"))
            .filter(|path| path.exists())
    }
}
