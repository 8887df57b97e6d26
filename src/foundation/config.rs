use std::path::{Path, PathBuf};

use crate::foundation::core::{FrameIndex, rgb8_len};
use crate::foundation::error::{NetherError, NetherResult};

/// Immutable description of one render run.
///
/// Constructed once before rendering and threaded explicitly through the sequencer and renderer.
/// Fields omitted from a JSON config file take their [`Default`] values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
    /// Animation length in seconds.
    pub duration_secs: f64,
    /// Directory receiving the `frame_NNNN.ppm` files.
    pub out_dir: PathBuf,
    /// Encoded video path.
    pub out_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 160,
            fps: 60,
            duration_secs: 4.0,
            out_dir: PathBuf::from("frames"),
            out_file: PathBuf::from("nether.mp4"),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file.
    pub fn from_json_path(path: &Path) -> NetherResult<Self> {
        let f = std::fs::File::open(path)
            .map_err(|e| NetherError::io(format!("open config '{}'", path.display()), e))?;
        let cfg: Self = serde_json::from_reader(std::io::BufReader::new(f)).map_err(|e| {
            NetherError::configuration(format!("parse config '{}': {e}", path.display()))
        })?;
        Ok(cfg)
    }

    /// Reject configurations that cannot produce a render.
    pub fn validate(&self) -> NetherResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NetherError::configuration(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(NetherError::configuration("fps must be non-zero"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(NetherError::configuration(format!(
                "duration must be a finite, non-negative number of seconds, got {}",
                self.duration_secs
            )));
        }
        if is_blank(&self.out_dir) {
            return Err(NetherError::configuration(
                "output directory name must not be empty",
            ));
        }
        if is_blank(&self.out_file) {
            return Err(NetherError::configuration(
                "output file name must not be empty",
            ));
        }
        Ok(())
    }

    /// `round(fps * duration_secs)`.
    pub fn total_frames(&self) -> u64 {
        (f64::from(self.fps) * self.duration_secs).round().max(0.0) as u64
    }

    /// Timestamp in seconds of frame `idx`.
    pub fn frame_time(&self, idx: FrameIndex) -> f64 {
        idx.time_secs(self.fps)
    }

    /// Path of frame `idx` inside [`PipelineConfig::out_dir`].
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.out_dir.join(idx.file_name())
    }

    /// Number of bytes in one packed RGB8 frame, `None` on overflow.
    pub fn frame_len_bytes(&self) -> Option<usize> {
        rgb8_len(self.width, self.height)
    }
}

fn is_blank(p: &Path) -> bool {
    p.as_os_str().to_string_lossy().trim().is_empty()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
