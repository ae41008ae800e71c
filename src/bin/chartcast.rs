use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "chartcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Guess the chart type of an image and print the label.
    Classify(ClassifyArgs),
    /// Render a static image into an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Append an image to an existing video as a 3-second flank.
    Append(AppendArgs),
    /// Alpha-blend an image over a time window of an existing video.
    Insert(InsertArgs),
    /// Concatenate two videos.
    Concat(ConcatArgs),
    /// Mux a video with an audio track.
    Mux(MuxArgs),
}

#[derive(Parser, Debug)]
struct ClassifyArgs {
    /// Input chart image.
    #[arg(long)]
    image: PathBuf,

    /// Print the narration line instead of the bare label.
    #[arg(long)]
    narration: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input chart image.
    #[arg(long)]
    image: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = chartcast::DEFAULT_FRAME_RATE)]
    fps: u32,

    /// Clip duration in seconds.
    #[arg(long, default_value_t = chartcast::DEFAULT_DURATION_SECS)]
    duration: u32,

    /// Four-character codec tag (mp4v, avc1, h264).
    #[arg(long, default_value = "mp4v")]
    codec: String,
}

#[derive(Parser, Debug)]
struct AppendArgs {
    /// Existing video.
    #[arg(long)]
    video: PathBuf,

    /// Image to append.
    #[arg(long)]
    image: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Where the image flank lands.
    #[arg(long, value_enum, default_value_t = PositionChoice::End)]
    position: PositionChoice,
}

#[derive(Parser, Debug)]
struct InsertArgs {
    /// Existing video.
    #[arg(long)]
    video: PathBuf,

    /// Overlay image.
    #[arg(long)]
    image: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overlay window start, in seconds.
    #[arg(long, default_value_t = 0.0)]
    start_second: f64,

    /// Overlay window length, in seconds.
    #[arg(long, default_value_t = 5.0)]
    duration_seconds: f64,
}

#[derive(Parser, Debug)]
struct ConcatArgs {
    /// Main video.
    #[arg(long)]
    video: PathBuf,

    /// Second video (scaled to the main video's dimensions).
    #[arg(long)]
    second: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Where the second video lands.
    #[arg(long, value_enum, default_value_t = PositionChoice::End)]
    position: PositionChoice,
}

#[derive(Parser, Debug)]
struct MuxArgs {
    /// Video file.
    #[arg(long)]
    video: PathBuf,

    /// Audio file.
    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PositionChoice {
    Start,
    End,
}

impl From<PositionChoice> for chartcast::Position {
    fn from(choice: PositionChoice) -> Self {
        match choice {
            PositionChoice::Start => chartcast::Position::Start,
            PositionChoice::End => chartcast::Position::End,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Classify(args) => {
            let label = chartcast::classify(&args.image);
            if args.narration {
                println!("{}", chartcast::narration_text(label));
            } else {
                println!("{label}");
            }
            Ok(())
        }
        Command::Render(args) => {
            let opts = chartcast::RenderOpts {
                fps: args.fps,
                duration_secs: args.duration,
                codec: chartcast::CodecTag::new(args.codec)?,
            };
            let out = chartcast::ops::image_to_video(&args.image, &args.out, &opts)?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
        Command::Append(args) => {
            let out = chartcast::ops::append_image_to_video(
                &args.video,
                &args.image,
                &args.out,
                args.position.into(),
            )?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
        Command::Insert(args) => {
            let out = chartcast::ops::insert_image_into_video(
                &args.video,
                &args.image,
                &args.out,
                args.start_second,
                args.duration_seconds,
            )?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
        Command::Concat(args) => {
            let out = chartcast::ops::concat_videos(
                &args.video,
                &args.second,
                &args.out,
                args.position.into(),
            )?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
        Command::Mux(args) => {
            let out = chartcast::mux_audio_video(&args.video, &args.audio, &args.out)?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
    }
}
