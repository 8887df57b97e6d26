use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{NetherError, NetherResult};

/// `ffmpeg` input pattern matching [`crate::FrameIndex::file_name`].
pub const FRAME_PATTERN: &str = "frame_%04d.ppm";

/// Invocation parameters for the external encoder.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    /// Encoder executable, looked up on `PATH` when not absolute.
    pub program: OsString,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Directory holding the `frame_NNNN.ppm` sequence.
    pub frames_dir: PathBuf,
    /// Input frame rate.
    pub fps: u32,
    /// Output video path.
    pub out_path: PathBuf,
    /// Overwrite `out_path` if it exists (`-y`), otherwise refuse (`-n`).
    pub overwrite: bool,
}

impl EncodeConfig {
    /// Reject parameters the encoder cannot use.
    pub fn validate(&self) -> NetherResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NetherError::configuration(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(NetherError::configuration("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // libx264 with yuv420p subsamples chroma 2x2.
            return Err(NetherError::configuration(format!(
                "encode width/height must be even for yuv420p mp4 output, got {}x{}",
                self.width, self.height
            )));
        }
        if self.program.is_empty() {
            return Err(NetherError::configuration(
                "encoder program must not be empty",
            ));
        }
        Ok(())
    }

    /// Replace the encoder executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Full argument list, excluding the program name.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(12);
        args.push(if self.overwrite { "-y" } else { "-n" }.into());
        args.push("-framerate".into());
        args.push(self.fps.to_string().into());
        args.push("-i".into());
        args.push(self.frames_dir.join(FRAME_PATTERN).into_os_string());
        // h264 + yuv420p for broad player compatibility.
        for a in ["-c:v", "libx264", "-pix_fmt", "yuv420p"] {
            args.push(a.into());
        }
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

/// Encoder settings for the frame sequence and output file of `cfg`.
pub fn default_mp4_config(cfg: &PipelineConfig) -> EncodeConfig {
    EncodeConfig {
        program: OsString::from("ffmpeg"),
        width: cfg.width,
        height: cfg.height,
        frames_dir: cfg.out_dir.clone(),
        fps: cfg.fps,
        out_path: cfg.out_file.clone(),
        overwrite: true,
    }
}

/// Whether `program -version` runs and exits successfully.
pub fn is_encoder_available(program: &OsStr) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> NetherResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            NetherError::io(
                format!("failed to create output directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Default line sink: the encoder's output on our stdout, prefixed `[ffmpeg]`.
pub fn print_encoder_line(line: &str) {
    tracing::debug!(target: "nether::ffmpeg", "{line}");
    println!("[ffmpeg] {line}");
}

/// Encode the finished frame sequence described by `cfg`.
///
/// Must only be called once every frame is on disk.
#[tracing::instrument(skip(cfg, on_line), fields(out = %cfg.out_path.display()))]
pub fn encode_frames(cfg: &EncodeConfig, on_line: &mut dyn FnMut(&str)) -> NetherResult<()> {
    cfg.validate()?;
    ensure_parent_dir(&cfg.out_path)?;
    tracing::info!("starting encoder for {}", cfg.out_path.display());
    run_encoder(&cfg.program, &cfg.args(), on_line)?;
    tracing::info!("encoder finished");
    Ok(())
}

/// Run `program args...`, forwarding its combined stdout/stderr to `on_line` one line at a time.
///
/// Both pipes are drained on dedicated threads so a chatty child can never block on a full pipe
/// while we wait for it. Fails with [`NetherError::Encoder`] when the process cannot be started
/// (`code: None`) or exits unsuccessfully.
pub fn run_encoder(
    program: &OsStr,
    args: &[OsString],
    on_line: &mut dyn FnMut(&str),
) -> NetherResult<()> {
    let name = program.to_string_lossy().into_owned();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            NetherError::encoder(
                None,
                format!("failed to start '{name}' (is it installed and on PATH?): {e}"),
            )
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| NetherError::encoder(None, format!("failed to open '{name}' stdout")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| NetherError::encoder(None, format!("failed to open '{name}' stderr")))?;

    let (tx, rx) = mpsc::channel::<String>();
    let drains = [spawn_drain(stdout, tx.clone()), spawn_drain(stderr, tx)];

    // Ends once both drains hit EOF and drop their senders.
    for line in rx {
        on_line(&line);
    }

    let mut drained = Ok(());
    for drain in drains {
        let res = match drain.join() {
            Ok(res) => res.map_err(|e| NetherError::io(format!("read '{name}' output"), e)),
            Err(_) => Err(NetherError::Other(anyhow::anyhow!(
                "'{name}' output drain panicked"
            ))),
        };
        drained = drained.and(res);
    }

    let status = reap_child(&mut child, drained, &name)?;
    if !status.success() {
        return Err(NetherError::encoder(
            status.code(),
            format!("'{name}' exited with {status}; see its output above"),
        ));
    }
    Ok(())
}

/// Wait for `child` on every path. A failed drain kills the child first, then reports the drain
/// error.
fn reap_child(
    child: &mut Child,
    drained: NetherResult<()>,
    name: &str,
) -> NetherResult<ExitStatus> {
    if let Err(e) = drained {
        if let Err(kill_err) = child.kill() {
            tracing::debug!("kill '{name}' after drain failure: {kill_err}");
        }
        if let Err(wait_err) = child.wait() {
            tracing::warn!("reap '{name}' after drain failure: {wait_err}");
        }
        return Err(e);
    }
    child
        .wait()
        .map_err(|e| NetherError::io(format!("wait for '{name}' to finish"), e))
}

fn spawn_drain<R: Read + Send + 'static>(
    pipe: R,
    tx: mpsc::Sender<String>,
) -> std::thread::JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            // Receiver gone means the caller stopped listening; keep draining regardless.
            let _ = tx.send(line.to_string());
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
