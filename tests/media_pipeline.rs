//! End-to-end pipeline tests against real `ffmpeg`/`ffprobe` binaries.
//!
//! Every test is a no-op when the tools are missing from PATH.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use chartcast::{
    FrameSource, Position, RenderOpts, VideoFrameSource, ops, probe_video,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ffmpeg_tools_available() -> bool {
    let ffmpeg_ok = Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    let ffprobe_ok = Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    ffmpeg_ok && ffprobe_ok
}

fn scratch_dir(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "chartcast_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&root).unwrap();
    root
}

/// One second of 64x64 test footage at 30 fps.
fn synth_clip(root: &Path) -> PathBuf {
    let video_path = root.join("clip.mp4");
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=64x64:rate=30",
            "-t",
            "1",
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
        ])
        .arg(&video_path)
        .status()
        .unwrap();
    assert!(status.success(), "ffmpeg failed creating clip.mp4");
    video_path
}

fn synth_tone(root: &Path) -> PathBuf {
    let wav_path = root.join("tone.wav");
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:sample_rate=48000",
            "-t",
            "1",
            "-c:a",
            "pcm_s16le",
        ])
        .arg(&wav_path)
        .status()
        .unwrap();
    assert!(status.success(), "ffmpeg failed creating tone.wav");
    wav_path
}

fn write_chart_png(root: &Path) -> PathBuf {
    let path = root.join("chart.png");
    let img = image::RgbImage::from_pixel(64, 64, image::Rgb([240, 240, 240]));
    img.save(&path).unwrap();
    path
}

fn count_frames(path: &Path) -> u64 {
    let mut src = VideoFrameSource::open(path).unwrap();
    let mut n = 0;
    while src.next_frame().unwrap().is_some() {
        n += 1;
    }
    n
}

#[test]
fn image_to_video_produces_the_expected_clip() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("img2vid");
    let image = write_chart_png(&root);
    let out = root.join("out.mp4");

    let opts = RenderOpts {
        fps: 30,
        duration_secs: 2,
        ..RenderOpts::default()
    };
    ops::image_to_video(&image, &out, &opts).unwrap();

    let info = probe_video(&out).unwrap();
    assert_eq!((info.width, info.height), (64, 64));
    assert_eq!(info.fps(), 30);
    assert_eq!(count_frames(&out), 60);
}

#[test]
fn video_source_streams_every_stored_frame_in_order() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("decode");
    let clip = synth_clip(&root);

    let mut src = VideoFrameSource::open(&clip).unwrap();
    assert_eq!(src.dimensions(), (64, 64));
    assert_eq!(src.fps(), 30);

    let mut n = 0;
    while let Some(frame) = src.next_frame().unwrap() {
        assert_eq!(frame.dimensions(), (64, 64));
        n += 1;
    }
    assert_eq!(n, 30);
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn append_adds_a_three_second_flank_at_either_end() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("append");
    let clip = synth_clip(&root);
    let image = write_chart_png(&root);

    let out_end = root.join("append_end.mp4");
    ops::append_image_to_video(&clip, &image, &out_end, Position::End).unwrap();
    assert_eq!(count_frames(&out_end), 30 + 90);

    let out_start = root.join("append_start.mp4");
    ops::append_image_to_video(&clip, &image, &out_start, Position::Start).unwrap();
    assert_eq!(count_frames(&out_start), 30 + 90);
}

#[test]
fn concat_preserves_the_total_frame_count() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("concat");
    let clip = synth_clip(&root);
    let out = root.join("concat.mp4");

    ops::concat_videos(&clip, &clip, &out, Position::End).unwrap();
    assert_eq!(count_frames(&out), 60);
}

#[test]
fn insert_keeps_the_primary_frame_count_and_order() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("insert");
    let clip = synth_clip(&root);
    let image = write_chart_png(&root);
    let out = root.join("insert.mp4");

    ops::insert_image_into_video(&clip, &image, &out, 0.25, 0.5).unwrap();
    let info = probe_video(&out).unwrap();
    assert_eq!((info.width, info.height), (64, 64));
    assert_eq!(count_frames(&out), 30);
}

#[test]
fn mux_combines_video_and_audio() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("mux");
    let clip = synth_clip(&root);
    let tone = synth_tone(&root);
    let out = root.join("final.mp4");

    chartcast::mux_audio_video(&clip, &tone, &out).unwrap();
    assert!(out.exists());
    probe_video(&out).unwrap();

    let err = chartcast::mux_audio_video(&clip, Path::new("/nonexistent/a.wav"), &out).unwrap_err();
    assert!(matches!(err, chartcast::ChartcastError::Mux(_)));
}

#[test]
fn open_error_on_unopenable_container() {
    init_tracing();
    if !ffmpeg_tools_available() {
        return;
    }
    let root = scratch_dir("open_err");
    let bogus = root.join("bogus.mp4");
    std::fs::write(&bogus, b"definitely not an mp4").unwrap();
    assert!(matches!(
        VideoFrameSource::open(&bogus),
        Err(chartcast::ChartcastError::Open(_))
    ));
}
