use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{AppConfig, EdgeMode, MAX_WINDOW_MS, Output, RunMode};
use crate::error::AppError;

#[derive(Debug, Parser)]
#[command(
    name = "buttonpipe",
    version,
    about = "Watch GPIO buttons and report debounced edges through a named pipe",
    disable_version_flag = true
)]
pub struct Cli {
    /// GPIO pin numbers to watch
    #[arg(value_name = "PIN")]
    pub pins: Vec<u32>,

    /// Bounce time, in milliseconds
    #[arg(
        short = 'b',
        long = "bounce",
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(..=MAX_WINDOW_MS)
    )]
    pub bounce_ms: Option<u64>,

    /// Debug mode: write events to the console, not the pipe
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Export pins and exit
    #[arg(short = 'e', long, conflicts_with = "unexport_only")]
    pub export_only: bool,

    /// Unexport pins and exit
    #[arg(short = 'u', long)]
    pub unexport_only: bool,

    /// Leave export/unexport to some other process
    #[arg(short = 'n', long)]
    pub no_export: bool,

    /// Report rising edges only
    #[arg(short = 'r', long, conflicts_with = "falling")]
    pub rising: bool,

    /// Report falling edges only
    #[arg(short = 'f', long)]
    pub falling: bool,

    /// Named pipe to write events to
    #[arg(short = 'o', long = "pipe", value_name = "PATH")]
    pub pipe_path: Option<PathBuf>,

    /// JSON configuration file; command-line options take precedence
    #[arg(short = 'c', long, value_name = "FILE", env = "BUTTONPIPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Delay between an interrupt and the level read, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Root of the sysfs GPIO control files
    #[arg(long, value_name = "DIR")]
    pub sysfs_root: Option<PathBuf>,

    /// GPIO character device; pins are then line offsets on this chip
    #[arg(long, value_name = "DEV")]
    pub chip: Option<PathBuf>,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

impl Cli {
    /// Resolves the effective configuration: defaults, then the config
    /// file, then command-line options.
    pub fn into_config(self) -> Result<(AppConfig, RunMode, Output), AppError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::default(),
        };

        if !self.pins.is_empty() {
            config.pins = self.pins;
        }
        if let Some(bounce_ms) = self.bounce_ms {
            config.bounce_ms = bounce_ms;
        }
        if self.rising {
            config.edge = EdgeMode::Rising;
        } else if self.falling {
            config.edge = EdgeMode::Falling;
        }
        if self.no_export {
            config.no_export = true;
        }
        if let Some(path) = self.pipe_path {
            config.pipe_path = path;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.settle_ms = settle_ms;
        }
        if let Some(root) = self.sysfs_root {
            config.sysfs_root = root;
        }
        if self.chip.is_some() {
            config.chip = self.chip;
        }
        config.validate()?;

        let mode = if self.unexport_only {
            RunMode::UnexportOnly
        } else if self.export_only {
            RunMode::ExportOnly
        } else {
            RunMode::Monitor
        };
        let output = if self.debug {
            Output::Console
        } else {
            Output::Pipe(config.pipe_path.clone())
        };

        Ok((config, mode, output))
    }
}
