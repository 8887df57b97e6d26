use crate::foundation::config::PipelineConfig;
use crate::foundation::core::{Rgb8, rgb8_len};
use crate::foundation::error::{NetherError, NetherResult};
use crate::shade::{Shader, nether::NetherShader};

/// Packed RGB8 raster, row-major top-to-bottom, left-to-right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb8 {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl FrameRgb8 {
    /// Wrap raw pixel bytes, checking the length against the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> NetherResult<Self> {
        let want = rgb8_len(width, height).ok_or_else(|| {
            NetherError::invalid_operation(format!("frame size {width}x{height} overflows usize"))
        })?;
        if data.len() != want {
            return Err(NetherError::invalid_operation(format!(
                "frame data is {} bytes, expected {want} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Color at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }
}

/// Render the nether scene at `time` seconds with the dimensions in `cfg`.
pub fn render_frame(cfg: &PipelineConfig, time: f64) -> NetherResult<FrameRgb8> {
    render_frame_with(&NetherShader, cfg.width, cfg.height, time)
}

/// Sample `shader` at every pixel center, `u = (x + 0.5) / width`, `v = (y + 0.5) / height`.
pub fn render_frame_with(
    shader: &dyn Shader,
    width: u32,
    height: u32,
    time: f64,
) -> NetherResult<FrameRgb8> {
    if width == 0 || height == 0 {
        return Err(NetherError::configuration(format!(
            "frame dimensions must be positive, got {width}x{height}"
        )));
    }

    let w = f64::from(width);
    let h = f64::from(height);
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        let v = (f64::from(y) + 0.5) / h;
        for x in 0..width {
            let u = (f64::from(x) + 0.5) / w;
            let c = Rgb8::from_signed(shader.shade(u, v, time)?);
            data.extend_from_slice(&c.to_array());
        }
    }

    Ok(FrameRgb8 {
        width,
        height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
