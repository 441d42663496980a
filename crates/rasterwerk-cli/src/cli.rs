// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments for the `rasterwerk` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::Result;
use rasterwerk_core::types::{ColorSpace, Region};

#[derive(Debug, Parser)]
#[command(bin_name = "rasterwerk")]
#[command(about = "Separation rendering, spot-ink merging, and streaming sub-image extraction")]
#[command(version)]
#[command(arg_required_else_help(true))]
pub struct CliArg {
    #[command(subcommand)]
    pub command: CliCommand,

    #[command(flatten)]
    pub global_options: GlobalOption,
}

#[derive(Debug, Args)]
pub struct GlobalOption {
    #[arg(global = true, long, short = 'c', help = "Engine configuration file (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(global = true, long, short = 'r', help = "Render or decode resolution in dpi")]
    pub resolution: Option<f64>,
}

impl GlobalOption {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    #[clap(about = "Render one grayscale plane per ink of a page")]
    Separate(SeparateArgs),

    #[clap(about = "Merge spot inks onto the process inks and write a preview")]
    Merge(MergeArgs),

    #[clap(about = "Copy a rectangle out of an image without decoding it twice")]
    Extract(ExtractArgs),
}

/// Ink choice shared by `separate` and `merge`.
#[derive(Debug, Args)]
pub struct InkArgs {
    #[arg(help = "Page description (JSON)")]
    pub page: PathBuf,

    #[arg(long, value_enum, default_value_t = ProcessSpace::Cmyk, help = "Process colour space")]
    pub process: ProcessSpace,

    #[arg(long, value_delimiter = ',', help = "Ignore these spot inks entirely")]
    pub ignore: Vec<String>,

    #[arg(long, help = "Bits per sample of the rendered planes (8 or 16)")]
    pub depth: Option<u8>,
}

impl InkArgs {
    /// Apply the depth override to `config`.
    pub fn configure(&self, mut config: EngineConfig) -> Result<EngineConfig> {
        if let Some(depth) = self.depth {
            config.render_depth = depth;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct SeparateArgs {
    #[command(flatten)]
    pub inks: InkArgs,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Keep only these spot inks as planes; others convert to process (default: keep all)"
    )]
    pub retain: Vec<String>,

    #[arg(long, short = 'o', help = "Write one PNG per ink into this directory")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, value_enum, help = "Also render into a shared frame buffer and compare fingerprints")]
    pub frame_buffers: Option<BufferLayout>,

    #[arg(long, help = "List the spot inks used by the page and exit")]
    pub list_inks: bool,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub inks: InkArgs,

    #[arg(long, short = 'o', help = "Preview image to write (format from extension)")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = PreviewSpace::Rgb, help = "Colour space of the preview")]
    pub preview: PreviewSpace,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[arg(help = "Source image")]
    pub input: PathBuf,

    #[arg(help = "Output image (format from extension)")]
    pub output: PathBuf,

    #[arg(long, short = 'x', default_value_t = 0)]
    pub x: u32,

    #[arg(long, short = 'y', default_value_t = 0)]
    pub y: u32,

    #[arg(long, short = 'W')]
    pub width: u32,

    #[arg(long, short = 'H')]
    pub height: u32,

    #[arg(long, help = "Write an inverted grayscale mask of the region instead")]
    pub mask: bool,
}

impl ExtractArgs {
    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProcessSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl From<ProcessSpace> for ColorSpace {
    fn from(space: ProcessSpace) -> Self {
        match space {
            ProcessSpace::Gray => ColorSpace::DeviceGray,
            ProcessSpace::Rgb => ColorSpace::DeviceRgb,
            ProcessSpace::Cmyk => ColorSpace::DeviceCmyk,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PreviewSpace {
    Gray,
    Rgb,
}

impl From<PreviewSpace> for ColorSpace {
    fn from(space: PreviewSpace) -> Self {
        match space {
            PreviewSpace::Gray => ColorSpace::DeviceGray,
            PreviewSpace::Rgb => ColorSpace::DeviceRgb,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BufferLayout {
    #[clap(help = "Whole planes back to back")]
    Planar,
    #[clap(help = "Inks of each pixel side by side")]
    Interleaved,
}
