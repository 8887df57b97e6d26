use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::{default_mp4_config, encode_frames, is_encoder_available};
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{NetherError, NetherResult};
use crate::render::sequence::{CancelToken, RenderObserver, RenderThreading, render_all_with};

/// Options for [`run`].
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Frame scheduling.
    pub threading: RenderThreading,
    /// Invoke the encoder after rendering; `false` stops at the frame files.
    pub encode: bool,
    /// Encoder executable.
    pub encoder_program: OsString,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            threading: RenderThreading::default(),
            encode: true,
            encoder_program: OsString::from("ffmpeg"),
        }
    }
}

/// What a successful [`run`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Frame files in index order.
    pub frames: Vec<PathBuf>,
    /// Encoded video, when encoding ran.
    pub video: Option<PathBuf>,
}

/// Make sure `dir` exists, is a directory and is writable; returns its absolute path.
pub fn prepare_output_dir(dir: &Path) -> NetherResult<PathBuf> {
    if dir.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(NetherError::configuration(
            "output directory name must not be empty",
        ));
    }

    let abs = std::path::absolute(dir)
        .map_err(|e| NetherError::io(format!("resolve '{}'", dir.display()), e))?;

    if dir.exists() {
        if !dir.is_dir() {
            return Err(NetherError::io(
                format!("output path exists and is not a directory: '{}'", abs.display()),
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
    } else {
        std::fs::create_dir_all(dir).map_err(|e| {
            NetherError::io(
                format!("failed to create output directory '{}'", abs.display()),
                e,
            )
        })?;
    }

    let meta = std::fs::metadata(dir)
        .map_err(|e| NetherError::io(format!("stat '{}'", abs.display()), e))?;
    if meta.permissions().readonly() {
        return Err(NetherError::io(
            format!("output directory is not writable: '{}'", abs.display()),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ));
    }

    tracing::info!("using output directory {}", abs.display());
    Ok(abs)
}

/// Prepare the output directory, render every frame, then (behind a barrier) encode them.
///
/// The encoder only starts once every frame has been written successfully.
pub fn run(
    cfg: &PipelineConfig,
    opts: &PipelineOpts,
    cancel: &CancelToken,
    observer: &dyn RenderObserver,
    on_line: &mut dyn FnMut(&str),
) -> NetherResult<PipelineReport> {
    cfg.validate()?;
    if opts.encode && cfg.total_frames() == 0 {
        return Err(NetherError::configuration(format!(
            "nothing to encode: {} fps x {} s rounds to zero frames",
            cfg.fps, cfg.duration_secs
        )));
    }

    // Fail before spending time on frames that could never be encoded.
    let enc = default_mp4_config(cfg).with_program(opts.encoder_program.clone());
    if opts.encode {
        enc.validate()?;
    }
    if opts.encode && !is_encoder_available(&opts.encoder_program) {
        return Err(NetherError::encoder(
            None,
            format!(
                "'{}' is required for MP4 encoding, but was not found on PATH",
                opts.encoder_program.to_string_lossy()
            ),
        ));
    }

    prepare_output_dir(&cfg.out_dir)?;
    let frames = render_all_with(cfg, &opts.threading, cancel, observer)?;

    if !opts.encode {
        return Ok(PipelineReport {
            frames,
            video: None,
        });
    }

    if cancel.is_cancelled() {
        return Err(NetherError::Interrupted {
            next_index: cfg.total_frames(),
        });
    }

    encode_frames(&enc, on_line)?;
    Ok(PipelineReport {
        frames,
        video: Some(cfg.out_file.clone()),
    })
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
