use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use flapgen::anim::flap::{BoardParams, FlapBoard};
use flapgen::audio::track::{TrackBuilder, TrackParams};
use flapgen::audio::wav;
use flapgen::render::frame::{BoardRenderer, RenderStyle};
use flapgen::render::sink::PngDirSink;

#[derive(Parser, Debug)]
#[command(name = "flapgen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the promo beat track and write it as 16-bit PCM WAV.
    Audio(AudioArgs),
    /// Render the split-flap flutter animation as a PNG frame sequence.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct AudioArgs {
    /// Output WAV path.
    #[arg(long, default_value = "out/flap_beat.wav")]
    out: PathBuf,

    /// Optional track parameter overrides (JSON).
    #[arg(long)]
    params: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Output directory for numbered frames.
    #[arg(long = "out-dir", default_value = "out/frames/flutter")]
    out_dir: PathBuf,

    /// Frame file prefix.
    #[arg(long, default_value = "flutter")]
    prefix: String,

    /// Optional animation parameter overrides (JSON).
    #[arg(long)]
    params: Option<PathBuf>,
}

/// JSON shape accepted by `frames --params`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FrameParams {
    board: BoardParams,
    style: RenderStyle,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Audio(args) => cmd_audio(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn load_json<T: serde::de::DeserializeOwned + Default>(path: Option<&PathBuf>) -> anyhow::Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read params '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse params '{}'", path.display()))
}

fn cmd_audio(args: AudioArgs) -> anyhow::Result<()> {
    let params: TrackParams = load_json(args.params.as_ref())?;
    let sample_rate = params.sample_rate;
    let duration = params.duration_secs;
    let bpm = params.bpm;

    let track = TrackBuilder::build(params)?;
    wav::write_wav_pcm16(&args.out, &track, sample_rate)?;

    eprintln!(
        "wrote {} ({duration}s at {sample_rate} Hz, {bpm} BPM)",
        args.out.display()
    );
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let params: FrameParams = load_json(args.params.as_ref())?;
    let total = params.board.total_frames();
    let fps = params.board.fps;

    let board = FlapBoard::new(params.board)?;
    let mut renderer = BoardRenderer::new(board, params.style)?;
    let mut sink = PngDirSink::new(&args.out_dir, &args.prefix);
    renderer.render_all(&mut sink)?;

    eprintln!(
        "wrote {total} frames at {}fps to {}",
        fps.as_f64(),
        args.out_dir.display()
    );
    Ok(())
}
