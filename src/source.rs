use std::{
    io::Read,
    path::Path,
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::{
    error::{ChartcastError, ChartcastResult},
    figure::Figure,
    frame::Frame,
    media::{VideoSourceInfo, probe_video},
};

/// Producer of one ordered, finite frame sequence.
///
/// All frames share the source's `dimensions()`, fixed at construction, and
/// `fps()` is the rate the sequence is meant to play at. `next_frame` yields
/// frames in order until `None`.
pub trait FrameSource {
    fn dimensions(&self) -> (u32, u32);
    fn fps(&self) -> u32;
    fn next_frame(&mut self) -> ChartcastResult<Option<Frame>>;
}

/// Repeats one decoded raster image for `fps * duration_secs` frames.
pub struct StaticImageSource {
    frame: Frame,
    fps: u32,
    remaining: u64,
}

impl StaticImageSource {
    pub fn open(path: &Path, fps: u32, duration_secs: u32) -> ChartcastResult<Self> {
        Self::from_frame(Frame::open(path)?, fps, duration_secs)
    }

    pub fn from_frame(frame: Frame, fps: u32, duration_secs: u32) -> ChartcastResult<Self> {
        if fps == 0 || duration_secs == 0 {
            return Err(ChartcastError::validation(
                "static source fps and duration must be positive",
            ));
        }
        Ok(Self {
            frame,
            fps,
            remaining: u64::from(fps) * u64::from(duration_secs),
        })
    }
}

impl FrameSource for StaticImageSource {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn next_frame(&mut self) -> ChartcastResult<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(self.frame.clone()))
    }
}

/// Re-renders a [`Figure`] on every pull, for `fps * duration_secs` frames.
///
/// Mutating figures therefore animate; static figures repeat one frame.
/// Dimensions come from the figure's canvas, not the caller.
pub struct FigureSource<F: Figure> {
    figure: F,
    width: u32,
    height: u32,
    fps: u32,
    remaining: u64,
}

impl<F: Figure> FigureSource<F> {
    pub fn new(figure: F, fps: u32, duration_secs: u32) -> ChartcastResult<Self> {
        if fps == 0 || duration_secs == 0 {
            return Err(ChartcastError::validation(
                "figure source fps and duration must be positive",
            ));
        }
        let (width, height) = figure.canvas_size();
        if width == 0 || height == 0 {
            return Err(ChartcastError::validation(
                "figure canvas must have non-zero dimensions",
            ));
        }
        Ok(Self {
            figure,
            width,
            height,
            fps,
            remaining: u64::from(fps) * u64::from(duration_secs),
        })
    }
}

impl<F: Figure> FrameSource for FigureSource<F> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn next_frame(&mut self) -> ChartcastResult<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let rgba = self.figure.render_rgba()?;
        // Resolved pixel-extraction contract: RGBA buffer, drop alpha, reorder.
        Ok(Some(Frame::from_rgba8(self.width, self.height, &rgba)?))
    }
}

/// Streams the stored frames of an existing encoded video in file order.
///
/// Decoding rides a long-lived `ffmpeg` child emitting rawvideo bgr24 on
/// stdout; the child is reaped at end-of-stream or killed on drop.
pub struct VideoFrameSource {
    info: VideoSourceInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    frame_len: usize,
}

impl VideoFrameSource {
    pub fn open(path: &Path) -> ChartcastResult<Self> {
        let info = probe_video(path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "bgr24", "-an", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| {
            ChartcastError::open(format!(
                "failed to spawn ffmpeg for video decode (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChartcastError::open("failed to open ffmpeg stdout (unexpected)"))?;

        tracing::debug!(path = %path.display(), width = info.width, height = info.height, fps = info.fps(), "video decode stream opened");

        Ok(Self {
            frame_len: info.width as usize * info.height as usize * 3,
            info,
            child: Some(child),
            stdout: Some(stdout),
        })
    }

    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    fn reap_child(&mut self) -> ChartcastResult<()> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            ChartcastError::decode(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        if !status.success() {
            return Err(ChartcastError::decode(format!(
                "ffmpeg decode of '{}' exited with status {status}",
                self.info.source_path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSource for VideoFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn fps(&self) -> u32 {
        self.info.fps()
    }

    fn next_frame(&mut self) -> ChartcastResult<Option<Frame>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let filled = read_full(stdout, &mut buf).map_err(|e| {
            ChartcastError::decode(format!("failed to read decoded video frame: {e}"))
        })?;

        if filled == 0 {
            // Clean end of stream.
            self.reap_child()?;
            return Ok(None);
        }
        if filled < self.frame_len {
            self.stdout = None;
            return Err(ChartcastError::decode(format!(
                "truncated video frame from '{}' ({filled} of {} bytes)",
                self.info.source_path.display(),
                self.frame_len
            )));
        }

        Ok(Some(Frame::new(self.info.width, self.info.height, buf)?))
    }
}

impl Drop for VideoFrameSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
