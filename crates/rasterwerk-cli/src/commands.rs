// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Each returns the process exit status on
// success; errors are reported by `main`.

use std::fs;
use std::path::{Path, PathBuf};

use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::Result;
use rasterwerk_core::frame::ImageFrame;
use rasterwerk_core::human_errors::bounds_violation;
use rasterwerk_core::types::{ColorSpace, SampleDepth};
use rasterwerk_scanline::{ColorConverter, ImageTransform, Inverter, TransformChain, extract_sub_image};
use rasterwerk_separation::{
    FlatPage, FlatRasterizer, FrameBufferInfo, InkSelection, SeparationRenderer, merge_spots,
    preview_chain, stream_interleaved,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::cli::{BufferLayout, ExtractArgs, MergeArgs, SeparateArgs};
use crate::codec;
use crate::fingerprint;

/// Summary printed by `separate`.
#[derive(Debug, Serialize)]
pub struct SeparationReport {
    pub width: u32,
    pub height: u32,
    pub resolution: f64,
    pub depth: u8,
    pub inks: Vec<InkReport>,
    /// Whether the frame-buffer rendering matched the plane rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_buffers_match: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct InkReport {
    pub name: String,
    pub spot: bool,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Load a page description.
pub fn load_page(path: &Path) -> Result<FlatPage> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[instrument(skip_all, fields(page = %args.inks.page.display()))]
pub fn separate(config: EngineConfig, args: &SeparateArgs) -> Result<i32> {
    let config = args.inks.configure(config)?;
    let page = load_page(&args.inks.page)?;
    let process_space = ColorSpace::from(args.inks.process);
    let renderer = SeparationRenderer::new(FlatRasterizer, config);

    if args.list_inks {
        let inks = renderer.find_inks(&page, &process_space)?;
        println!("{}", serde_json::to_string_pretty(&inks)?);
        return Ok(0);
    }

    let selection = InkSelection::new(args.retain.clone(), args.inks.ignore.clone());
    let output = renderer.render_separations(&page, &process_space, &selection, page.bounds())?;
    let (width, height) = (output.planes[0].width(), output.planes[0].height());
    let depth = output.planes[0].depth();
    let resolution = renderer.config().resolution;

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
    }
    let mut inks = Vec::with_capacity(output.set.len());
    for (index, (ink, plane)) in output.set.inks().iter().zip(&output.planes).enumerate() {
        let file = match &args.out_dir {
            Some(dir) => {
                let path = dir.join(plane_file_name(index, ink.name()));
                codec::save_plane(&path, plane, resolution)?;
                Some(path)
            }
            None => None,
        };
        inks.push(InkReport {
            name: ink.name().to_owned(),
            spot: index >= output.set.process_count(),
            sha256: fingerprint::plane_fingerprint(plane),
            file,
        });
    }

    let frame_buffers_match = match args.frame_buffers {
        Some(layout) => {
            let fingerprints = render_frame_buffers(
                &renderer,
                &page,
                &process_space,
                &selection,
                layout,
                output.set.len(),
                (width, height, depth),
            )?;
            let matched = fingerprints.iter().zip(&inks).all(|(fb, ink)| *fb == ink.sha256);
            if !matched {
                warn!("Frame-buffer output differs from plane output");
            }
            Some(matched)
        }
        None => None,
    };

    let report = SeparationReport {
        width,
        height,
        resolution,
        depth: depth.bits(),
        inks,
        frame_buffers_match,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

fn render_frame_buffers(
    renderer: &SeparationRenderer<FlatRasterizer>,
    page: &FlatPage,
    process_space: &ColorSpace,
    selection: &InkSelection,
    layout: BufferLayout,
    channels: usize,
    (width, height, depth): (u32, u32, SampleDepth),
) -> Result<Vec<String>> {
    let layouts: Vec<FrameBufferInfo> = (0..channels)
        .map(|index| match layout {
            BufferLayout::Planar => FrameBufferInfo::planar(index, width, height, depth),
            BufferLayout::Interleaved => FrameBufferInfo::interleaved(index, channels, width, depth),
        })
        .collect();
    let mut buffer = vec![0u8; width as usize * height as usize * channels * depth.bytes()];
    renderer.render_to_frame_buffers(page, process_space, selection, page.bounds(), &mut buffer, &layouts)?;
    Ok(layouts
        .iter()
        .map(|layout| fingerprint::frame_buffer_fingerprint(&buffer, layout, width, height, depth))
        .collect())
}

#[instrument(skip_all, fields(page = %args.inks.page.display()))]
pub fn merge(config: EngineConfig, args: &MergeArgs) -> Result<i32> {
    let config = args.inks.configure(config)?;
    let page = load_page(&args.inks.page)?;
    let process_space = ColorSpace::from(args.inks.process);
    let renderer = SeparationRenderer::new(FlatRasterizer, config);

    let selection = InkSelection::new(Vec::new(), args.inks.ignore.clone());
    let output = renderer.render_separations(&page, &process_space, &selection, page.bounds())?;
    let spots = output.set.spot_inks().len();
    let merged = merge_spots(output)?;

    let resolution = renderer.config().resolution;
    let raster = stream_interleaved(renderer.config(), &merged, process_space.clone(), resolution, resolution)?;
    let preview = preview_chain(&process_space, ColorSpace::from(args.preview))
        .apply(Box::new(raster.into_frame()))?;
    let info = preview.info().clone();
    let data = codec::read_all(preview)?;
    codec::save_raw(&args.output, &info, data)?;
    info!(spots, output = %args.output.display(), "Preview written");
    Ok(0)
}

#[instrument(skip_all, fields(input = %args.input.display(), region = %args.region()))]
pub fn extract(config: EngineConfig, args: &ExtractArgs) -> Result<i32> {
    let source = codec::open_frame(&args.input, config.resolution)?;
    let (width, height) = (source.info().width, source.info().height);
    let region = args.region();

    let Some(image) = extract_sub_image(&config, source, region)? else {
        let report = bounds_violation(&region, width, height);
        eprintln!("{report}");
        return Ok(report.exit_code);
    };

    if args.mask {
        let chain = TransformChain::new()
            .then(ColorConverter::new(ColorSpace::DeviceGray))
            .then(Inverter);
        let mask = chain.apply(Box::new(image.into_frame()))?;
        let info = mask.info().clone();
        codec::save_raw(&args.output, &info, codec::read_all(mask)?)?;
    } else {
        let info = image.info().clone();
        codec::save_raw(&args.output, &info, image.into_bytes()?)?;
    }
    info!(output = %args.output.display(), "Region written");
    Ok(0)
}

fn plane_file_name(index: usize, ink: &str) -> String {
    let stem: String = ink
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{index:02}-{stem}.png")
}
