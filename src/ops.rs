//! One entry point per supported conversion: wires frame sources and the
//! encoder sink through [`assemble`], returning the output path.

use std::path::{Path, PathBuf};

use crate::{
    assemble::{APPEND_FLANK_SECS, Layout, Position, assemble},
    encode_ffmpeg::{CodecTag, FfmpegSink},
    error::ChartcastResult,
    figure::Figure,
    source::{FigureSource, StaticImageSource, VideoFrameSource},
};

pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Options for single-image / single-figure renders.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    pub fps: u32,
    pub duration_secs: u32,
    pub codec: CodecTag,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FRAME_RATE,
            duration_secs: DEFAULT_DURATION_SECS,
            codec: CodecTag::default(),
        }
    }
}

/// Turn a raster image into a fixed-duration video.
pub fn image_to_video(image: &Path, out: &Path, opts: &RenderOpts) -> ChartcastResult<PathBuf> {
    let mut source = StaticImageSource::open(image, opts.fps, opts.duration_secs)?;
    let mut sink = FfmpegSink::new(out, opts.codec.clone(), true);
    assemble(&mut source, None, &Layout::Static, &mut sink)?;
    tracing::debug!(out = %out.display(), "image rendered to video");
    Ok(out.to_path_buf())
}

/// Turn a plot figure into a fixed-duration video, re-rendering it per frame.
pub fn figure_to_video<F: Figure>(
    figure: F,
    out: &Path,
    opts: &RenderOpts,
) -> ChartcastResult<PathBuf> {
    let mut source = FigureSource::new(figure, opts.fps, opts.duration_secs)?;
    let mut sink = FfmpegSink::new(out, opts.codec.clone(), true);
    assemble(&mut source, None, &Layout::Static, &mut sink)?;
    tracing::debug!(out = %out.display(), "figure rendered to video");
    Ok(out.to_path_buf())
}

/// Append a raster image to an existing video as a 3-second flank at the
/// video's own frame rate, at the start or end.
pub fn append_image_to_video(
    video: &Path,
    image: &Path,
    out: &Path,
    position: Position,
) -> ChartcastResult<PathBuf> {
    let mut primary = VideoFrameSource::open(video)?;
    let mut flank = StaticImageSource::open(image, primary.info().fps(), APPEND_FLANK_SECS)?;
    let mut sink = FfmpegSink::new(out, CodecTag::default(), true);
    assemble(
        &mut primary,
        Some(&mut flank),
        &Layout::Append { position },
        &mut sink,
    )?;
    Ok(out.to_path_buf())
}

/// Append a plot figure to an existing video as a 3-second flank.
pub fn append_figure_to_video<F: Figure>(
    video: &Path,
    figure: F,
    out: &Path,
    position: Position,
) -> ChartcastResult<PathBuf> {
    let mut primary = VideoFrameSource::open(video)?;
    let mut flank = FigureSource::new(figure, primary.info().fps(), APPEND_FLANK_SECS)?;
    let mut sink = FfmpegSink::new(out, CodecTag::default(), true);
    assemble(
        &mut primary,
        Some(&mut flank),
        &Layout::Append { position },
        &mut sink,
    )?;
    Ok(out.to_path_buf())
}

/// Concatenate two videos, scaling the second to the main video's dimensions.
pub fn concat_videos(
    main_video: &Path,
    second_video: &Path,
    out: &Path,
    position: Position,
) -> ChartcastResult<PathBuf> {
    let mut primary = VideoFrameSource::open(main_video)?;
    let mut secondary = VideoFrameSource::open(second_video)?;
    let mut sink = FfmpegSink::new(out, CodecTag::default(), true);
    assemble(
        &mut primary,
        Some(&mut secondary),
        &Layout::Append { position },
        &mut sink,
    )?;
    Ok(out.to_path_buf())
}

/// Overlay a raster image on a window of an existing video, alpha-blended.
pub fn insert_image_into_video(
    video: &Path,
    image: &Path,
    out: &Path,
    start_second: f64,
    duration_seconds: f64,
) -> ChartcastResult<PathBuf> {
    let mut primary = VideoFrameSource::open(video)?;
    let mut overlay = StaticImageSource::open(image, primary.info().fps(), 1)?;
    let mut sink = FfmpegSink::new(out, CodecTag::default(), true);
    assemble(
        &mut primary,
        Some(&mut overlay),
        &Layout::InsertAt {
            start_second,
            duration_seconds,
        },
        &mut sink,
    )?;
    Ok(out.to_path_buf())
}

/// Overlay a plot figure on a window of an existing video, alpha-blended.
pub fn insert_figure_into_video<F: Figure>(
    video: &Path,
    figure: F,
    out: &Path,
    start_second: f64,
    duration_seconds: f64,
) -> ChartcastResult<PathBuf> {
    let mut primary = VideoFrameSource::open(video)?;
    let mut overlay = FigureSource::new(figure, primary.info().fps(), 1)?;
    let mut sink = FfmpegSink::new(out, CodecTag::default(), true);
    assemble(
        &mut primary,
        Some(&mut overlay),
        &Layout::InsertAt {
            start_second,
            duration_seconds,
        },
        &mut sink,
    )?;
    Ok(out.to_path_buf())
}
