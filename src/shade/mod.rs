use crate::foundation::error::NetherResult;
use crate::foundation::math::Vec4;

pub(crate) mod nether;

/// Pure per-pixel coloring function.
///
/// `u` and `v` are pixel-center coordinates normalized to `[0, 1)`; `time` is in seconds. The
/// returned vector's first three components are channels in `[-1, 1]`, remapped to bytes by
/// [`crate::Rgb8::from_signed`]. Implementations must be deterministic and free of shared mutable
/// state so frames can be rendered on any worker.
pub trait Shader: Sync {
    /// Color of one pixel.
    fn shade(&self, u: f64, v: f64, time: f64) -> NetherResult<Vec4>;
}
