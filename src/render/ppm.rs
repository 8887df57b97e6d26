//! Binary PPM (`P6`) frame files.
//!
//! Layout: ASCII header `P6\n{width} {height}\n255\n`, then `width * height * 3` raw bytes,
//! row-major, one `R, G, B` triple per pixel.

use std::io::{BufRead, BufWriter, Read, Write};
use std::path::Path;

use crate::foundation::core::rgb8_len;
use crate::foundation::error::{NetherError, NetherResult};
use crate::render::frame::FrameRgb8;

/// Maximum channel value written by this crate.
pub const PPM_MAXVAL: u32 = 255;

/// Parsed `P6` header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpmHeader {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Maximum channel value.
    pub maxval: u32,
}

/// Header bytes for a `width` x `height` frame.
pub fn ppm_header(width: u32, height: u32) -> String {
    format!("P6\n{width} {height}\n{PPM_MAXVAL}\n")
}

/// Serialize `frame` to `w`.
pub fn encode_ppm<W: Write>(w: &mut W, frame: &FrameRgb8) -> std::io::Result<()> {
    w.write_all(ppm_header(frame.width, frame.height).as_bytes())?;
    w.write_all(&frame.data)
}

/// Create (or truncate) `path` and write `frame` to it.
pub fn write_ppm(path: &Path, frame: &FrameRgb8) -> NetherResult<()> {
    let f = std::fs::File::create(path)
        .map_err(|e| NetherError::io(format!("create '{}'", path.display()), e))?;
    let mut w = BufWriter::new(f);
    encode_ppm(&mut w, frame)
        .and_then(|()| w.flush())
        .map_err(|e| NetherError::io(format!("write '{}'", path.display()), e))
}

/// Parse a `P6` header, leaving `r` positioned at the first pixel byte.
///
/// Accepts arbitrary whitespace between fields and `#` comments, as other PPM writers emit them.
pub fn read_ppm_header<R: BufRead>(r: &mut R) -> NetherResult<PpmHeader> {
    let magic = next_token(r)?;
    if magic != "P6" {
        return Err(invalid(format!("expected magic 'P6', found '{magic}'")));
    }
    let width = parse_field(r, "width")?;
    let height = parse_field(r, "height")?;
    let maxval = parse_field(r, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(invalid(format!("unsupported maxval {maxval}")));
    }
    Ok(PpmHeader {
        width,
        height,
        maxval,
    })
}

/// Read a whole `P6` file written by [`write_ppm`].
pub fn read_ppm(path: &Path) -> NetherResult<FrameRgb8> {
    let ctx = || format!("read '{}'", path.display());
    let f = std::fs::File::open(path).map_err(|e| NetherError::io(ctx(), e))?;
    let mut r = std::io::BufReader::new(f);
    let header = read_ppm_header(&mut r)?;
    let len = rgb8_len(header.width, header.height).ok_or_else(|| {
        invalid(format!(
            "{}x{} pixel payload overflows usize",
            header.width, header.height
        ))
    })?;

    // The buffer grows with the bytes actually present, not with the header's claim.
    let mut data = Vec::new();
    (&mut r)
        .take(len as u64)
        .read_to_end(&mut data)
        .map_err(|e| NetherError::io(ctx(), e))?;
    if data.len() != len {
        return Err(invalid(format!(
            "{}x{} needs {len} pixel bytes, file has {}",
            header.width,
            header.height,
            data.len()
        )));
    }
    FrameRgb8::from_raw(header.width, header.height, data)
}

fn parse_field<R: BufRead>(r: &mut R, name: &str) -> NetherResult<u32> {
    let tok = next_token(r)?;
    tok.parse::<u32>()
        .map_err(|_| invalid(format!("bad {name} '{tok}'")))
}

// Reads one whitespace-delimited token and consumes the single whitespace byte after it.
fn next_token<R: BufRead>(r: &mut R) -> NetherResult<String> {
    let mut tok = String::new();
    let mut in_comment = false;
    loop {
        let mut byte = [0u8; 1];
        let n = r
            .read(&mut byte)
            .map_err(|e| NetherError::io("read ppm header", e))?;
        if n == 0 {
            if tok.is_empty() {
                return Err(invalid("unexpected end of header".to_string()));
            }
            return Ok(tok);
        }
        let b = byte[0];
        if in_comment {
            in_comment = b != b'\n';
            continue;
        }
        match b {
            b'#' if tok.is_empty() => in_comment = true,
            b if b.is_ascii_whitespace() => {
                if !tok.is_empty() {
                    return Ok(tok);
                }
            }
            b => {
                if tok.len() >= 16 {
                    return Err(invalid("header token too long".to_string()));
                }
                tok.push(char::from(b));
            }
        }
    }
}

fn invalid(msg: String) -> NetherError {
    NetherError::io(
        "parse ppm header",
        std::io::Error::new(std::io::ErrorKind::InvalidData, msg),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/ppm.rs"]
mod tests;
