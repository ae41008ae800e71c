use crate::{
    composite::{OVERLAY_ALPHA, blend},
    error::{ChartcastError, ChartcastResult},
    sink::{FrameSink, SinkConfig},
    source::FrameSource,
};

/// Seconds of flank footage a non-video secondary contributes when appended to
/// a whole video.
pub const APPEND_FLANK_SECS: u32 = 3;

/// Where an appended sequence lands relative to the primary video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Position {
    Start,
    End,
}

/// How the assembler merges its frame sources.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Layout {
    /// Drain a single source, writing every frame verbatim.
    Static,
    /// Write the secondary's full sequence before or after the primary's.
    Append { position: Position },
    /// Stream the primary unchanged except for an alpha-blended overlay on
    /// frames `[start_second * fps, start_second * fps + duration_seconds * fps)`.
    InsertAt {
        start_second: f64,
        duration_seconds: f64,
    },
}

/// Merge `primary` (and, for `Append`/`InsertAt`, `secondary`) into `sink`
/// according to `layout`.
///
/// The sink is configured from the primary source's dimensions and frame rate,
/// frames are written in strict arrival order, and the sink is finished exactly
/// once on every exit path. Secondary frames are resized to the primary's
/// dimensions; the primary's own frames pass through verbatim, so a primary
/// that changes size mid-sequence fails with `DimensionMismatch` at the sink.
pub fn assemble(
    primary: &mut dyn FrameSource,
    secondary: Option<&mut dyn FrameSource>,
    layout: &Layout,
    sink: &mut dyn FrameSink,
) -> ChartcastResult<()> {
    let (width, height) = primary.dimensions();
    let fps = primary.fps();
    sink.begin(SinkConfig { width, height, fps })?;

    let outcome = run_layout(primary, secondary, layout, sink, width, height, fps);
    match outcome {
        Ok(()) => sink.finish(),
        Err(err) => {
            // Still flush/reap the sink; the partial output file is the
            // caller's to clean up.
            let _ = sink.finish();
            Err(err)
        }
    }
}

fn run_layout(
    primary: &mut dyn FrameSource,
    secondary: Option<&mut dyn FrameSource>,
    layout: &Layout,
    sink: &mut dyn FrameSink,
    width: u32,
    height: u32,
    fps: u32,
) -> ChartcastResult<()> {
    match layout {
        Layout::Static => drain(primary, sink),

        Layout::Append { position } => {
            let secondary = secondary.ok_or_else(|| {
                ChartcastError::validation("append layout requires a secondary source")
            })?;
            match position {
                Position::Start => {
                    drain_resized(secondary, sink, width, height)?;
                    drain(primary, sink)
                }
                Position::End => {
                    drain(primary, sink)?;
                    drain_resized(secondary, sink, width, height)
                }
            }
        }

        Layout::InsertAt {
            start_second,
            duration_seconds,
        } => {
            let secondary = secondary.ok_or_else(|| {
                ChartcastError::validation("insert layout requires an overlay source")
            })?;
            if !start_second.is_finite() || !duration_seconds.is_finite() {
                return Err(ChartcastError::validation(
                    "insert start/duration must be finite",
                ));
            }
            let overlay = secondary
                .next_frame()?
                .ok_or_else(|| ChartcastError::decode("overlay source produced no frames"))?;
            // One up-front resize to the primary's exact dimensions; the blend
            // precondition then holds for the whole window.
            let overlay = overlay.resize(width, height);
            // Truncating casts saturate: negative values clamp to frame 0 and
            // oversized windows to the end of the primary.
            let fps = f64::from(fps);
            let start = (start_second * fps) as u64;
            let end = start.saturating_add((duration_seconds * fps) as u64);

            let mut idx: u64 = 0;
            while let Some(frame) = primary.next_frame()? {
                let out = if idx >= start && idx < end {
                    blend(&frame, &overlay, OVERLAY_ALPHA)?
                } else {
                    frame
                };
                sink.write_frame(&out)?;
                idx += 1;
            }
            Ok(())
        }
    }
}

fn drain(src: &mut dyn FrameSource, sink: &mut dyn FrameSink) -> ChartcastResult<()> {
    while let Some(frame) = src.next_frame()? {
        sink.write_frame(&frame)?;
    }
    Ok(())
}

fn drain_resized(
    src: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    width: u32,
    height: u32,
) -> ChartcastResult<()> {
    while let Some(frame) = src.next_frame()? {
        sink.write_frame(&frame.resize(width, height))?;
    }
    Ok(())
}
