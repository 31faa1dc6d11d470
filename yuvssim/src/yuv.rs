//! BT.601 studio-range RGB to YUV conversion.
//!
//! Every output plane has the full image resolution (4:4:4): chroma is not
//! subsampled the way video YUV formats usually are.

use imgref::ImgRef;
use rgb::RGB8;

use crate::consts::{RGB_SCALE, U_FROM_RGB, U_OFFSET, V_FROM_RGB, V_OFFSET, Y_FROM_RGB, Y_OFFSET};
use crate::image::{Plane, PlaneTriple};
use crate::SsimError;

/// Pixel layout of a decoded image handed over at the byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 8-bit grayscale.
    Gray8,
    /// 8-bit grayscale with alpha.
    GrayAlpha8,
    /// 8-bit RGB. The only layout the converter accepts.
    Rgb8,
    /// 8-bit RGB with alpha.
    Rgba8,
    /// 16-bit grayscale.
    Gray16,
    /// 16-bit grayscale with alpha.
    GrayAlpha16,
    /// 16-bit RGB.
    Rgb16,
    /// 16-bit RGB with alpha.
    Rgba16,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 | Self::Gray16 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 | Self::GrayAlpha16 => 4,
            Self::Rgb16 => 6,
            Self::Rgba16 => 8,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gray8 => "8-bit gray",
            Self::GrayAlpha8 => "8-bit gray+alpha",
            Self::Rgb8 => "8-bit RGB",
            Self::Rgba8 => "8-bit RGBA",
            Self::Gray16 => "16-bit gray",
            Self::GrayAlpha16 => "16-bit gray+alpha",
            Self::Rgb16 => "16-bit RGB",
            Self::Rgba16 => "16-bit RGBA",
        };
        f.write_str(name)
    }
}

/// A decoded image as delivered by an external decoder.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    /// Layout of each pixel.
    pub format: PixelFormat,
    /// Pixel bytes, row-major.
    pub data: &'a [u8],
}

impl<'a> RawImage<'a> {
    /// Describes a tightly packed buffer (`stride = width * bytes_per_pixel`).
    ///
    /// A width too large to address saturates the stride, which
    /// [`convert_raw`] then rejects.
    #[must_use]
    pub fn packed(width: usize, height: usize, format: PixelFormat, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            stride: width.saturating_mul(format.bytes_per_pixel()),
            format,
            data,
        }
    }
}

#[inline]
fn clamp_round(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn apply_row(offset: f64, row: &[f64; 3], r: f64, g: f64, b: f64) -> u8 {
    clamp_round(offset + row[0] * r / RGB_SCALE + row[1] * g / RGB_SCALE + row[2] * b / RGB_SCALE)
}

/// Converts one pixel to `[y, u, v]`.
#[inline]
#[must_use]
pub fn rgb_to_yuv(px: RGB8) -> [u8; 3] {
    let (r, g, b) = (f64::from(px.r), f64::from(px.g), f64::from(px.b));
    [
        apply_row(Y_OFFSET, &Y_FROM_RGB, r, g, b),
        apply_row(U_OFFSET, &U_FROM_RGB, r, g, b),
        apply_row(V_OFFSET, &V_FROM_RGB, r, g, b),
    ]
}

/// Accumulates converted rows into three packed planes.
struct PlaneBuilder {
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
    width: usize,
    height: usize,
}

impl PlaneBuilder {
    fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            y: Vec::with_capacity(len),
            u: Vec::with_capacity(len),
            v: Vec::with_capacity(len),
            width,
            height,
        }
    }

    fn push_row(&mut self, row: impl IntoIterator<Item = RGB8>) {
        for px in row {
            let [y, u, v] = rgb_to_yuv(px);
            self.y.push(y);
            self.u.push(u);
            self.v.push(v);
        }
    }

    fn finish(self) -> Result<PlaneTriple, SsimError> {
        let (w, h) = (self.width, self.height);
        PlaneTriple::from_planes(
            Plane::from_vec(self.y, w, h)?,
            Plane::from_vec(self.u, w, h)?,
            Plane::from_vec(self.v, w, h)?,
        )
    }
}

fn check_not_empty(width: usize, height: usize) -> Result<(), SsimError> {
    if width == 0 || height == 0 {
        return Err(SsimError::EmptyInput { width, height });
    }
    Ok(())
}

/// Converts a (possibly strided) RGB image to Y, U and V planes.
///
/// # Errors
/// Returns [`SsimError::EmptyInput`] for a zero width or height.
pub fn convert(img: ImgRef<'_, RGB8>) -> Result<PlaneTriple, SsimError> {
    let (width, height) = (img.width(), img.height());
    check_not_empty(width, height)?;

    let mut builder = PlaneBuilder::new(width, height);
    for row in img.rows() {
        builder.push_row(row.iter().copied());
    }
    builder.finish()
}

/// Converts a sequence of pixel rows to Y, U and V planes.
///
/// # Errors
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::DimensionMismatch`] if there are not exactly `height`
///   rows of exactly `width` pixels
pub fn convert_rows<R: AsRef<[RGB8]>>(
    rows: &[R],
    width: usize,
    height: usize,
) -> Result<PlaneTriple, SsimError> {
    check_not_empty(width, height)?;

    if rows.len() != height {
        return Err(SsimError::DimensionMismatch {
            w1: width,
            h1: height,
            w2: width,
            h2: rows.len(),
        });
    }
    if let Some(row) = rows.iter().map(AsRef::<[RGB8]>::as_ref).find(|r| r.len() != width) {
        return Err(SsimError::DimensionMismatch {
            w1: width,
            h1: height,
            w2: row.len(),
            h2: height,
        });
    }

    let mut builder = PlaneBuilder::new(width, height);
    for row in rows {
        builder.push_row(row.as_ref().iter().copied());
    }
    builder.finish()
}

/// Converts a raw decoder buffer to Y, U and V planes.
///
/// # Errors
/// - [`SsimError::UnsupportedFormat`] unless the format is [`PixelFormat::Rgb8`]
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::InvalidStride`] if a row of `stride` bytes cannot hold `width` pixels
/// - [`SsimError::InvalidBufferSize`] if `data` is shorter than the image
pub fn convert_raw(raw: &RawImage<'_>) -> Result<PlaneTriple, SsimError> {
    if raw.format != PixelFormat::Rgb8 {
        return Err(SsimError::UnsupportedFormat { format: raw.format });
    }
    check_not_empty(raw.width, raw.height)?;

    let row_bytes = raw
        .width
        .checked_mul(PixelFormat::Rgb8.bytes_per_pixel())
        .ok_or(SsimError::InvalidStride {
            width: usize::MAX,
            stride: raw.stride,
        })?;
    if raw.stride < row_bytes {
        return Err(SsimError::InvalidStride {
            width: row_bytes,
            stride: raw.stride,
        });
    }
    // Saturates on overflow; no buffer can be that long.
    let expected = (raw.height - 1)
        .checked_mul(raw.stride)
        .and_then(|n| n.checked_add(row_bytes))
        .unwrap_or(usize::MAX);
    if raw.data.len() < expected {
        return Err(SsimError::InvalidBufferSize {
            expected,
            actual: raw.data.len(),
        });
    }

    let mut builder = PlaneBuilder::new(raw.width, raw.height);
    for y in 0..raw.height {
        let start = y * raw.stride;
        let row = &raw.data[start..start + row_bytes];
        builder.push_row(row.chunks_exact(3).map(|c| RGB8::new(c[0], c[1], c[2])));
    }
    builder.finish()
}
