use crate::foundation::core::Rgb8;
use crate::foundation::error::NetherResult;
use crate::foundation::math::{Vec3, Vec4};
use crate::shade::Shader;

/// Outer raymarch steps per pixel.
pub const MARCH_STEPS: u32 = 60;
/// Inner fold steps per march step.
pub const FOLD_STEPS: u32 = 9;

const GRID: f64 = 0.1;
const FOLD_GAIN: f64 = 0.2;
const SLAB_HALF_HEIGHT: f64 = 3.0;
const DIST_SCALE: f64 = 20.0;
const GLOW_RED: f64 = 19.0;
const EXPOSURE: f64 = 700_000.0;

/// The hard-coded "nether" scene: a quantized, cosine-folded tunnel that scrolls along `-z` as
/// time advances.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetherShader;

impl Shader for NetherShader {
    fn shade(&self, u: f64, v: f64, time: f64) -> NetherResult<Vec4> {
        shade_signed(u, v, time)
    }
}

/// Evaluate the scene at normalized pixel center `(u, v)` and `time` seconds.
///
/// Returns the tone-mapped accumulator; `x`, `y`, `z` are the color channels in `(-1, 1)`.
/// Bit-identical for identical inputs.
///
/// The glow term divides by the squared distance estimate without a guard. A distance of exactly
/// zero propagates `inf` (or `NaN` in the `z`-weighted channel) into the accumulator; `tanh` and
/// [`crate::to_byte`] keep the final color in range.
pub fn shade_signed(u: f64, v: f64, time: f64) -> NetherResult<Vec4> {
    let frag = Vec3::new(u, v, 0.0);
    let resolution = Vec3::splat(1.0);
    let dir = (frag * 2.0 - resolution.xyy()).normalize();

    let mut o = Vec4::ZERO;
    let mut z = 0.0;

    for _ in 0..MARCH_STEPS {
        let p = dir * z;
        let p = Vec3::new(p.x, p.y, p.z - time);
        let mut p = p.div(GRID)?.round() * GRID;

        for i in 1..=FOLD_STEPS {
            let fold = (p * f64::from(i) + Vec3::splat(z)).cos().zzx();
            p = p + fold * FOLD_GAIN;
        }

        let d = (p.y.abs() - SLAB_HALF_HEIGHT).abs() / DIST_SCALE;
        z += d;

        // Red glow is constant; green grows with distance travelled.
        o = o + Vec4::new(GLOW_RED, z, 1.0, 1.0) * (1.0 / (d * d));
    }

    Ok(o.div(EXPOSURE)?.tanh())
}

/// [`shade_signed`] followed by the byte remap.
pub fn shade(u: f64, v: f64, time: f64) -> NetherResult<Rgb8> {
    shade_signed(u, v, time).map(Rgb8::from_signed)
}

#[cfg(test)]
#[path = "../../tests/unit/shade/nether.rs"]
mod tests;
