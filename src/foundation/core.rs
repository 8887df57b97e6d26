use crate::foundation::math::Vec4;

/// Zero-based index of a frame in the rendered sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Timestamp in seconds of this frame at `fps` frames per second.
    pub fn time_secs(self, fps: u32) -> f64 {
        self.0 as f64 / f64::from(fps)
    }

    /// Frame file name, `frame_{index:04}.ppm`.
    pub fn file_name(self) -> String {
        format!("frame_{:04}.ppm", self.0)
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Map the first three components of a tone-mapped shader output (nominally in `(-1, 1)`)
    /// to bytes with [`to_byte`].
    pub fn from_signed(c: Vec4) -> Self {
        Self::new(to_byte(c.x), to_byte(c.y), to_byte(c.z))
    }

    /// Channels as `[r, g, b]`.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Byte length of a packed RGB8 raster, or `None` when it does not fit in `usize`.
pub fn rgb8_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(3)
}

/// Remap a signed channel value to a byte: `round(clamp((c + 1) / 2, 0, 1) * 255)`.
///
/// Total over all `f64` inputs: `+inf -> 255`, `-inf -> 0`, `NaN -> 0`.
pub fn to_byte(c: f64) -> u8 {
    let unit = (c + 1.0) * 0.5;
    if unit.is_nan() {
        return 0;
    }
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
