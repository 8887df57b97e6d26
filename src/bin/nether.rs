use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use nether::NetherError;

#[derive(Parser, Debug)]
#[command(name = "nether", version, about = "Render the nether animation to frames and MP4")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame, then encode them to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG or PPM still.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Directory for the PPM frame sequence.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long = "out")]
    out_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Worker threads (defaults to one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames scheduled per parallel batch.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Render strictly one frame at a time, in index order.
    #[arg(long)]
    sequential: bool,

    /// Stop after writing the frames.
    #[arg(long)]
    skip_encode: bool,

    /// Encoder executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: OsString,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output image; `.ppm` writes the native format, anything else goes through `image`.
    #[arg(long = "image")]
    image_path: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = catch_panic(move || match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turn a panic (including one re-raised from a rayon worker) into an error, so it exits through
/// the catch-all status instead of the runtime's 101.
fn catch_panic(f: impl FnOnce() -> anyhow::Result<()>) -> anyhow::Result<()> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Err(anyhow::anyhow!("panicked: {msg}"))
    })
}

fn report(err: &anyhow::Error) -> ExitCode {
    let Some(nether_err) = err.downcast_ref::<NetherError>() else {
        eprintln!("[FATAL] unexpected unrecoverable error: {err}");
        eprintln!("{err:?}");
        return ExitCode::from(1);
    };

    match nether_err {
        NetherError::Configuration(_) => eprintln!("[CONFIG ERROR] {nether_err}"),
        NetherError::Io { .. } => eprintln!("[IO ERROR] {nether_err}"),
        NetherError::Interrupted { .. } => eprintln!("[INTERRUPTED] {nether_err}"),
        NetherError::Encoder { .. } => eprintln!("[ENCODER ERROR] {nether_err}"),
        NetherError::InvalidOperation(_) | NetherError::Other(_) => {
            eprintln!("[FATAL] unexpected unrecoverable error: {nether_err}");
            eprintln!("{err:?}");
        }
    }
    ExitCode::from(u8::try_from(nether_err.exit_code()).unwrap_or(1))
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<nether::PipelineConfig> {
    let mut cfg = match &args.config {
        Some(path) => nether::PipelineConfig::from_json_path(path)?,
        None => nether::PipelineConfig::default(),
    };
    if let Some(v) = args.width {
        cfg.width = v;
    }
    if let Some(v) = args.height {
        cfg.height = v;
    }
    if let Some(v) = args.fps {
        cfg.fps = v;
    }
    if let Some(v) = args.duration {
        cfg.duration_secs = v;
    }
    if let Some(v) = &args.out_dir {
        cfg.out_dir = v.clone();
    }
    if let Some(v) = &args.out_file {
        cfg.out_file = v.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;

    let cancel = nether::CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received; finishing in-flight frames");
        handler_token.cancel();
    })
    .context("install Ctrl-C handler")?;

    let opts = nether::PipelineOpts {
        threading: nether::RenderThreading {
            parallel: !args.sequential,
            chunk_size: args.chunk_size,
            threads: args.threads,
        },
        encode: !args.skip_encode,
        encoder_program: args.ffmpeg,
    };

    let report = nether::run(
        &cfg,
        &opts,
        &cancel,
        &nether::LogProgress,
        &mut nether::print_encoder_line,
    )?;

    match report.video {
        Some(video) => eprintln!(
            "[OK] rendered {} frames and created {}",
            report.frames.len(),
            video.display()
        ),
        None => eprintln!(
            "[OK] rendered {} frames into {}",
            report.frames.len(),
            cfg.out_dir.display()
        ),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let idx = nether::FrameIndex(args.index);
    let frame = nether::render_frame(&cfg, cfg.frame_time(idx))?;

    nether::ensure_parent_dir(&args.image_path)?;
    if is_ppm(&args.image_path) {
        nether::write_ppm(&args.image_path, &frame)?;
    } else {
        image::save_buffer(
            &args.image_path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgb8,
        )
        .with_context(|| format!("write image '{}'", args.image_path.display()))?;
    }

    eprintln!("wrote {}", args.image_path.display());
    Ok(())
}

fn is_ppm(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"))
}

#[cfg(test)]
#[path = "../../tests/unit/bin/nether.rs"]
mod tests;
