use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::foundation::config::PipelineConfig;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{NetherError, NetherResult};
use crate::render::frame::render_frame;
use crate::render::ppm::write_ppm;

/// Cooperative cancellation flag shared between the caller and the render loop.
///
/// Polled before each frame starts, never mid-frame. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Frames already in flight still complete.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`CancelToken::cancel`] has been called on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives a notification after each frame file is durably written.
///
/// Called from render workers in parallel mode, so completion order is not index order.
pub trait RenderObserver: Sync {
    /// Frame `idx` of `total` was written to `path`.
    fn on_frame_written(&self, idx: FrameIndex, total: u64, path: &Path);
}

/// Logs progress on every 10th frame and on the final frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl RenderObserver for LogProgress {
    fn on_frame_written(&self, idx: FrameIndex, total: u64, _path: &Path) {
        if is_progress_frame(idx, total) {
            tracing::info!("rendered frame {}/{}", idx.0, total.saturating_sub(1));
        }
    }
}

/// Progress cadence: every 10th frame and the last one.
pub fn is_progress_frame(idx: FrameIndex, total: u64) -> bool {
    idx.0 % 10 == 0 || idx.0 + 1 == total
}

#[derive(Clone, Debug)]
/// Threading and chunking controls for the frame sequence.
pub struct RenderThreading {
    /// Render frames on a worker pool when `true`, strictly in index order otherwise.
    pub parallel: bool,
    /// Frames per scheduling chunk; every chunk is a barrier. `0` is treated as `1`.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
        }
    }
}

impl RenderThreading {
    /// Strict index-order rendering on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Render every frame of `cfg` with default threading, no cancellation and log progress.
///
/// Returns the frame paths in index order.
pub fn render_all(cfg: &PipelineConfig) -> NetherResult<Vec<PathBuf>> {
    render_all_with(
        cfg,
        &RenderThreading::default(),
        &CancelToken::new(),
        &LogProgress,
    )
}

/// Render frames `0..cfg.total_frames()` into `cfg.out_dir`, which must already exist.
///
/// - Cancellation yields [`NetherError::Interrupted`] naming the lowest unrendered index; frames
///   already on disk are left in place.
/// - The first failing frame aborts the sequence; its error carries the frame index and path.
pub fn render_all_with(
    cfg: &PipelineConfig,
    threading: &RenderThreading,
    cancel: &CancelToken,
    observer: &dyn RenderObserver,
) -> NetherResult<Vec<PathBuf>> {
    cfg.validate()?;
    let total = cfg.total_frames();
    tracing::info!(
        "rendering {total} frames at {}x{} @ {} fps",
        cfg.width,
        cfg.height,
        cfg.fps
    );

    let mut out = Vec::with_capacity(total.min(4096) as usize);
    if !threading.parallel {
        for f in 0..total {
            let idx = FrameIndex(f);
            if cancel.is_cancelled() {
                return Err(NetherError::Interrupted { next_index: f });
            }
            let path = write_frame(cfg, idx)?;
            observer.on_frame_written(idx, total, &path);
            out.push(path);
        }
        return Ok(out);
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);

    let mut chunk_start = 0;
    while chunk_start < total {
        if cancel.is_cancelled() {
            return Err(NetherError::Interrupted {
                next_index: chunk_start,
            });
        }
        let chunk_end = (chunk_start + chunk_size).min(total);
        let mut paths = render_chunk_parallel(
            cfg,
            chunk_start..chunk_end,
            total,
            cancel,
            observer,
            &pool,
        )?;
        out.append(&mut paths);
        chunk_start = chunk_end;
    }

    Ok(out)
}

/// Render frame `idx` and write it to `cfg.frame_path(idx)`.
#[tracing::instrument(level = "debug", skip(cfg))]
pub fn write_frame(cfg: &PipelineConfig, idx: FrameIndex) -> NetherResult<PathBuf> {
    let path = cfg.frame_path(idx);
    let frame = render_frame(cfg, cfg.frame_time(idx))?;
    write_ppm(&path, &frame).map_err(|e| with_frame_context(e, idx, &path))?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}

enum FrameOutcome {
    Written(PathBuf),
    Skipped,
}

fn render_chunk_parallel(
    cfg: &PipelineConfig,
    range: std::ops::Range<u64>,
    total: u64,
    cancel: &CancelToken,
    observer: &dyn RenderObserver,
    pool: &rayon::ThreadPool,
) -> NetherResult<Vec<PathBuf>> {
    let indices = range.collect::<Vec<u64>>();
    let abort = AtomicBool::new(false);

    let outcomes = pool.install(|| {
        indices
            .par_iter()
            .map(|&f| -> NetherResult<FrameOutcome> {
                if cancel.is_cancelled() || abort.load(Ordering::SeqCst) {
                    return Ok(FrameOutcome::Skipped);
                }
                let idx = FrameIndex(f);
                match write_frame(cfg, idx) {
                    Ok(path) => {
                        observer.on_frame_written(idx, total, &path);
                        Ok(FrameOutcome::Written(path))
                    }
                    Err(e) => {
                        abort.store(true, Ordering::SeqCst);
                        Err(e)
                    }
                }
            })
            .collect::<Vec<_>>()
    });

    // Failures win over cancellation; among either, the lowest index is reported.
    let mut paths = Vec::with_capacity(outcomes.len());
    let mut first_skipped = None;
    for (&f, outcome) in indices.iter().zip(outcomes) {
        match outcome? {
            FrameOutcome::Written(path) => paths.push(path),
            FrameOutcome::Skipped => {
                first_skipped.get_or_insert(f);
            }
        }
    }

    match first_skipped {
        Some(next_index) => Err(NetherError::Interrupted { next_index }),
        None => Ok(paths),
    }
}

fn with_frame_context(err: NetherError, idx: FrameIndex, path: &Path) -> NetherError {
    match err {
        NetherError::Io { source, .. } => NetherError::io(
            format!("failed to write frame {idx} to '{}'", path.display()),
            source,
        ),
        other => other,
    }
}

fn build_thread_pool(threads: Option<usize>) -> NetherResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(NetherError::configuration(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        NetherError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sequence.rs"]
mod tests;
