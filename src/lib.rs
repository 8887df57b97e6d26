//! Nether renders a procedural, raymarch-style animation to a numbered PPM frame sequence and
//! hands the finished sequence to the system `ffmpeg` binary for MP4 encoding.
//!
//! # Pipeline overview
//!
//! 1. **Shade**: `(u, v, time) -> Vec4` via [`shade_signed`], a pure per-pixel function
//! 2. **Render**: `PipelineConfig + time -> FrameRgb8` via [`render_frame`], then [`write_ppm`]
//! 3. **Sequence**: [`render_all_with`] fans frames `0..round(fps * duration)` out over a worker
//!    pool, each frame writing its own `frame_NNNN.ppm`
//! 4. **Encode**: after every frame is on disk, [`encode_frames`] runs `ffmpeg` over the sequence
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: shading and file naming depend only on the frame index and config.
//! - **No shared mutable state between frames**: distinct output paths are the only coordination.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod encode;
mod foundation;
mod pipeline;
mod render;
mod shade;

pub use encode::ffmpeg::{
    EncodeConfig, FRAME_PATTERN, default_mp4_config, encode_frames, ensure_parent_dir,
    is_encoder_available, print_encoder_line, run_encoder,
};
pub use foundation::config::PipelineConfig;
pub use foundation::core::{FrameIndex, Rgb8, to_byte};
pub use foundation::error::{NetherError, NetherResult};
pub use foundation::math::{Vec3, Vec4};
pub use pipeline::{PipelineOpts, PipelineReport, prepare_output_dir, run};
pub use render::frame::{FrameRgb8, render_frame, render_frame_with};
pub use render::ppm::{
    PPM_MAXVAL, PpmHeader, encode_ppm, ppm_header, read_ppm, read_ppm_header, write_ppm,
};
pub use render::sequence::{
    CancelToken, LogProgress, RenderObserver, RenderThreading, is_progress_frame, render_all,
    render_all_with, write_frame,
};
pub use shade::Shader;
pub use shade::nether::{FOLD_STEPS, MARCH_STEPS, NetherShader, shade, shade_signed};
