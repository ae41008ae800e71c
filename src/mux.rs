use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ChartcastError, ChartcastResult};

/// Combine a silent video stream and an audio file into one container.
///
/// Thin wrapper over the documented external-encoder contract
/// `ffmpeg -i <video> -i <audio> -c:v copy -c:a aac <out> -y`; a nonzero exit
/// status is a `Mux` error.
pub fn mux_audio_video(video: &Path, audio: &Path, out: &Path) -> ChartcastResult<PathBuf> {
    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c:v", "copy", "-c:a", "aac"])
        .arg(out)
        .arg("-y")
        .output()
        .map_err(|e| ChartcastError::mux(format!("failed to run ffmpeg for mux: {e}")))?;

    if !output.status.success() {
        return Err(ChartcastError::mux(format!(
            "ffmpeg mux exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(out.to_path_buf())
}
