use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    error::{ChartcastError, ChartcastResult},
    frame::Frame,
    sink::{FrameSink, SinkConfig},
};

/// Four-character codec tag selecting the video encoder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CodecTag(String);

impl CodecTag {
    pub fn new(tag: impl Into<String>) -> ChartcastResult<Self> {
        let tag = tag.into();
        if tag.len() != 4 || !tag.is_ascii() {
            return Err(ChartcastError::validation(format!(
                "codec tag must be 4 ascii characters, got '{tag}'"
            )));
        }
        Ok(Self(tag.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map the tag to an ffmpeg encoder name. Unknown tags are an `Open`
    /// error, surfaced before any process is spawned.
    fn encoder(&self) -> ChartcastResult<&'static str> {
        match self.0.as_str() {
            "mp4v" => Ok("mpeg4"),
            "avc1" | "h264" => Ok("libx264"),
            other => Err(ChartcastError::open(format!(
                "unsupported codec tag '{other}'"
            ))),
        }
    }
}

impl Default for CodecTag {
    fn default() -> Self {
        Self("mp4v".to_string())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ChartcastResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encoder-backed [`FrameSink`]: an `ffmpeg` child consuming rawvideo bgr24 on
/// stdin and writing an MP4 at `out_path`.
///
/// `finish` flushes and reaps the child exactly once; dropping an unfinished
/// sink kills the child, leaving a partial file for the caller to remove.
pub struct FfmpegSink {
    out_path: PathBuf,
    codec: CodecTag,
    overwrite: bool,
    cfg: Option<SinkConfig>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    pub fn new(out_path: impl Into<PathBuf>, codec: CodecTag, overwrite: bool) -> Self {
        Self {
            out_path: out_path.into(),
            codec,
            overwrite,
            cfg: None,
            child: None,
            stdin: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    fn validate(&self, cfg: SinkConfig) -> ChartcastResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ChartcastError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if cfg.fps == 0 {
            return Err(ChartcastError::validation("encode fps must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            // yuv420p output subsamples chroma 2x2.
            return Err(ChartcastError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ChartcastResult<()> {
        if self.cfg.is_some() {
            return Err(ChartcastError::validation("encoder sink already begun"));
        }
        self.validate(cfg)?;
        let encoder = self.codec.encoder()?;
        ensure_parent_dir(&self.out_path)?;

        if !self.overwrite && self.out_path.exists() {
            return Err(ChartcastError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ChartcastError::open(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        // System ffmpeg binary rather than linked FFmpeg libraries, so no
        // native dev header/lib requirements.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgr24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            encoder,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&self.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ChartcastError::open(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChartcastError::open("failed to open ffmpeg stdin (unexpected)"))?;

        tracing::debug!(out = %self.out_path.display(), codec = self.codec.as_str(), fps = cfg.fps, "encoder sink opened");

        self.cfg = Some(cfg);
        self.child = Some(child);
        self.stdin = Some(stdin);
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> ChartcastResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(ChartcastError::validation("encoder sink used before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ChartcastError::dimension_mismatch(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ChartcastError::validation(
                "encoder sink is already finalized",
            ));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            ChartcastError::open(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn finish(&mut self) -> ChartcastResult<()> {
        if self.cfg.is_none() {
            return Err(ChartcastError::validation(
                "encoder sink finished before begin",
            ));
        }
        let Some(child) = self.child.take() else {
            return Err(ChartcastError::validation(
                "encoder sink is already finalized",
            ));
        };
        drop(self.stdin.take());

        let output = child.wait_with_output().map_err(|e| {
            ChartcastError::open(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChartcastError::open(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(out = %self.out_path.display(), "encoder sink finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            drop(self.stdin.take());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_tags_map_to_encoders() {
        assert_eq!(CodecTag::default().as_str(), "mp4v");
        assert_eq!(CodecTag::new("mp4v").unwrap().encoder().unwrap(), "mpeg4");
        assert_eq!(CodecTag::new("AVC1").unwrap().encoder().unwrap(), "libx264");
        assert_eq!(CodecTag::new("h264").unwrap().encoder().unwrap(), "libx264");
        assert!(CodecTag::new("zzzz").unwrap().encoder().is_err());
        assert!(CodecTag::new("toolong").is_err());
        assert!(CodecTag::new("ab").is_err());
    }

    #[test]
    fn begin_validates_config_before_spawning() {
        let mut sink = FfmpegSink::new("out.mp4", CodecTag::default(), true);
        assert!(
            sink.begin(SinkConfig {
                width: 0,
                height: 10,
                fps: 30,
            })
            .is_err()
        );
        assert!(
            sink.begin(SinkConfig {
                width: 11,
                height: 10,
                fps: 30,
            })
            .is_err()
        );
        assert!(
            sink.begin(SinkConfig {
                width: 10,
                height: 10,
                fps: 0,
            })
            .is_err()
        );
    }

    #[test]
    fn unknown_codec_fails_in_begin() {
        let mut sink = FfmpegSink::new("out.mp4", CodecTag::new("zzzz").unwrap(), true);
        let err = sink
            .begin(SinkConfig {
                width: 10,
                height: 10,
                fps: 30,
            })
            .unwrap_err();
        assert!(matches!(err, ChartcastError::Open(_)));
    }
}
