#![forbid(unsafe_code)]

pub mod assemble;
pub mod classify;
pub mod composite;
pub mod encode_ffmpeg;
pub mod error;
pub mod figure;
pub mod frame;
pub mod media;
pub mod mux;
pub mod ops;
pub mod sink;
pub mod source;

pub use assemble::{APPEND_FLANK_SECS, Layout, Position, assemble};
pub use classify::{ChartLabel, classify, classify_image, narration_text};
pub use composite::{OVERLAY_ALPHA, blend};
pub use encode_ffmpeg::{CodecTag, FfmpegSink, is_ffmpeg_on_path};
pub use error::{ChartcastError, ChartcastResult};
pub use figure::Figure;
pub use frame::Frame;
pub use media::{VideoSourceInfo, is_ffprobe_on_path, probe_video};
pub use mux::mux_audio_video;
pub use ops::{DEFAULT_DURATION_SECS, DEFAULT_FRAME_RATE, RenderOpts};
pub use sink::{FrameSink, MemorySink, SinkConfig};
pub use source::{FigureSource, FrameSource, StaticImageSource, VideoFrameSource};
