//! # yuvssim
//!
//! Structural similarity (SSIM) between two equally sized RGB images,
//! measured on BT.601 studio-range Y, U and V planes.
//!
//! The metric works in two steps:
//! - Conversion: each image becomes full-resolution (4:4:4) Y, U, V planes
//! - Comparison: planes are tiled with non-overlapping 8×8 windows (clipped
//!   at the edges) and each window pair gets a classic single-scale SSIM
//!
//! Two scores come out of a comparison:
//! - `ssimg`: per-plane mean SSIM plus `(4·y + u + v) / 6`
//! - `global`: luma-masked weighted mean SSIM of the Y plane, with the total
//!   weight so results of several image pairs can be merged
//!
//! ## Interpretation
//!
//! - 1.0: Identical planes
//! - Above 0.98: Nearly indistinguishable
//! - Below 0.90: Noticeable artifacts
//!
//! SSIM is bounded by (-1, 1]. Tools often display `1 / (1 - ssim)` instead,
//! which grows without bound as images converge.
//!
//! ## Example
//!
//! ```rust
//! use yuvssim::{compare, Img, SsimParams, RGB8};
//!
//! let width = 16;
//! let height = 16;
//! let pixels: Vec<RGB8> = (0..width * height)
//!     .map(|i| RGB8::new((i % 256) as u8, ((i * 2) % 256) as u8, ((i * 3) % 256) as u8))
//!     .collect();
//!
//! let img1 = Img::new(pixels.clone(), width, height);
//! let img2 = Img::new(pixels, width, height); // Identical images
//!
//! let result = compare(img1.as_ref(), img2.as_ref(), &SsimParams::default()).unwrap();
//!
//! // Identical images score exactly 1
//! assert_eq!(result.ssimg.total, 1.0);
//! assert_eq!(result.global.ssim, 1.0);
//! ```
//!
//! ## Features
//!
//! - **`rayon`** (default): Score window rows in parallel. Results are
//!   bit-identical with the feature disabled.
//! - **`internals`**: Expose internal modules for testing/benchmarking (unstable API)

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_panics_doc)]

#[cfg(feature = "internals")]
pub mod consts;
#[cfg(not(feature = "internals"))]
pub(crate) mod consts;

pub mod image;

#[cfg(feature = "internals")]
pub mod mask;
#[cfg(not(feature = "internals"))]
pub(crate) mod mask;

pub mod precompute;
pub mod ssim;
pub mod yuv;

pub use image::{Channel, Plane, PlaneTriple};
pub use precompute::SsimReference;
pub use ssim::{calc_ssim, calc_ssimg, plane_ssim, GlobalSsim, SsimgResult};
pub use yuv::{convert, convert_raw, convert_rows, rgb_to_yuv, PixelFormat, RawImage};

// Re-export imgref and rgb types for convenience
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGB8;

/// Error type for yuvssim operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SsimError {
    /// Input is not 8-bit RGB without alpha.
    UnsupportedFormat {
        /// Layout that was provided.
        format: PixelFormat,
    },
    /// Image or plane dimensions don't match.
    DimensionMismatch {
        /// First image width.
        w1: usize,
        /// First image height.
        h1: usize,
        /// Second image width.
        w2: usize,
        /// Second image height.
        h2: usize,
    },
    /// Width or height is zero.
    EmptyInput {
        /// Width provided.
        width: usize,
        /// Height provided.
        height: usize,
    },
    /// Buffer is too short for the declared dimensions.
    InvalidBufferSize {
        /// Minimum buffer size.
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },
    /// Row stride is smaller than a row.
    InvalidStride {
        /// Row length.
        width: usize,
        /// Stride provided.
        stride: usize,
    },
}

impl std::fmt::Display for SsimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat { format } => {
                write!(f, "unsupported pixel format: {format} (expected 8-bit RGB)")
            }
            Self::DimensionMismatch { w1, h1, w2, h2 } => {
                write!(f, "image dimensions don't match: {w1}x{h1} vs {w2}x{h2}")
            }
            Self::EmptyInput { width, height } => {
                write!(f, "empty input: {width}x{height}")
            }
            Self::InvalidBufferSize { expected, actual } => {
                write!(f, "buffer size {actual} is smaller than required size {expected}")
            }
            Self::InvalidStride { width, stride } => {
                write!(f, "stride {stride} is smaller than row length {width}")
            }
        }
    }
}

impl std::error::Error for SsimError {}

/// SSIM comparison parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use yuvssim::SsimParams;
///
/// let params = SsimParams::new()
///     .with_lumamask(false)        // Plain mean for the global score
///     .with_compute_ssim_map(true); // Keep per-window Y scores
/// ```
#[derive(Debug, Clone)]
pub struct SsimParams {
    lumamask: bool,
    compute_ssim_map: bool,
}

impl Default for SsimParams {
    fn default() -> Self {
        Self {
            lumamask: true,
            compute_ssim_map: false,
        }
    }
}

impl SsimParams {
    /// Creates a new `SsimParams` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the global score weights windows by local luma contrast.
    #[must_use]
    pub fn with_lumamask(mut self, lumamask: bool) -> Self {
        self.lumamask = lumamask;
        self
    }

    /// Sets whether to keep the per-window SSIM map of the Y plane.
    ///
    /// When `true`, the result includes an `ImgVec<f64>` with one sample per
    /// 8×8 window. When `false` (default), the map field is `None`.
    #[must_use]
    pub fn with_compute_ssim_map(mut self, compute_ssim_map: bool) -> Self {
        self.compute_ssim_map = compute_ssim_map;
        self
    }

    /// Returns whether luma masking is enabled.
    #[must_use]
    pub fn lumamask(&self) -> bool {
        self.lumamask
    }

    /// Returns whether the per-window SSIM map is computed.
    #[must_use]
    pub fn compute_ssim_map(&self) -> bool {
        self.compute_ssim_map
    }
}

/// Result of comparing two images.
#[derive(Debug, Clone)]
pub struct SsimResult {
    /// Per-plane and combined SSIM.
    pub ssimg: SsimgResult,
    /// Luma-masked global SSIM of the Y plane.
    pub global: GlobalSsim,
    /// Y-plane SSIM per window (only present if `compute_ssim_map` was true).
    pub ssim_map: Option<ImgVec<f64>>,
}

/// Compares two sets of planes with the given parameters.
///
/// # Errors
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::DimensionMismatch`] if the images differ in size
pub fn compare_planes(
    src: &PlaneTriple,
    dest: &PlaneTriple,
    params: &SsimParams,
) -> Result<SsimResult, SsimError> {
    let scores = ssim::score_triples(src, dest)?;
    let ssimg = ssim::ssimg_from_scores(&scores);
    let global = scores[0].weighted(params.lumamask);

    log::debug!(
        "compared {}x{} planes over {} windows: ssimg={:.6} global={:.6} (weight {:.2})",
        src.width(),
        src.height(),
        scores[0].len(),
        ssimg.total,
        global.ssim,
        global.weight
    );

    Ok(SsimResult {
        ssimg,
        global,
        ssim_map: params.compute_ssim_map.then(|| scores[0].to_map()),
    })
}

/// Computes SSIM between two RGB images.
///
/// Both images are converted to BT.601 Y, U, V planes, then scored with
/// [`calc_ssimg`] and [`calc_ssim`].
///
/// # Errors
/// Returns an error if:
/// - Either image has a zero width or height
/// - Image dimensions don't match
///
/// # Example
/// ```rust
/// use yuvssim::{compare, Img, SsimParams, RGB8};
///
/// let width = 16;
/// let height = 16;
/// let pixels: Vec<RGB8> = vec![RGB8::new(128, 128, 128); width * height];
/// let img = Img::new(pixels, width, height);
///
/// let result = compare(img.as_ref(), img.as_ref(), &SsimParams::default())?;
/// println!("SSIM: {}", result.ssimg.total);
/// # Ok::<(), yuvssim::SsimError>(())
/// ```
pub fn compare(
    img1: ImgRef<'_, RGB8>,
    img2: ImgRef<'_, RGB8>,
    params: &SsimParams,
) -> Result<SsimResult, SsimError> {
    let (w1, h1) = (img1.width(), img1.height());
    let (w2, h2) = (img2.width(), img2.height());

    if w1 != w2 || h1 != h2 {
        return Err(SsimError::DimensionMismatch { w1, h1, w2, h2 });
    }

    let src = convert(img1)?;
    let dest = convert(img2)?;
    compare_planes(&src, &dest, params)
}

/// Computes SSIM between two raw decoder buffers.
///
/// # Errors
/// As [`convert_raw`] and [`compare_planes`]; format errors are reported
/// before dimension errors.
pub fn compare_raw(
    img1: &RawImage<'_>,
    img2: &RawImage<'_>,
    params: &SsimParams,
) -> Result<SsimResult, SsimError> {
    let src = convert_raw(img1)?;
    let dest = convert_raw(img2)?;
    compare_planes(&src, &dest, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize, shift: u8) -> ImgVec<RGB8> {
        let pixels = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                RGB8::new(
                    ((x * 7 + y) % 256) as u8,
                    ((y * 5) % 256) as u8,
                    ((x * y) % 256) as u8 / 2 + shift,
                )
            })
            .collect();
        Img::new(pixels, width, height)
    }

    #[test]
    fn test_identical_images() {
        let img = gradient(16, 16, 0);
        let result = compare(img.as_ref(), img.as_ref(), &SsimParams::default())
            .expect("valid input");

        assert_eq!(result.ssimg.total, 1.0);
        assert_eq!(result.ssimg.y, 1.0);
        assert_eq!(result.ssimg.u, 1.0);
        assert_eq!(result.ssimg.v, 1.0);
        assert_eq!(result.global.ssim, 1.0);
    }

    #[test]
    fn test_different_images() {
        let black = Img::new(vec![RGB8::new(0, 0, 0); 16 * 16], 16, 16);
        let white = Img::new(vec![RGB8::new(255, 255, 255); 16 * 16], 16, 16);

        let result = compare(black.as_ref(), white.as_ref(), &SsimParams::default())
            .expect("valid input");

        assert!(result.ssimg.y < 0.2, "got {}", result.ssimg.y);
        // Neutral chroma is identical for black and white.
        assert_eq!(result.ssimg.u, 1.0);
        assert_eq!(result.ssimg.v, 1.0);
        assert!(result.ssimg.total < 0.5);
    }

    #[test]
    fn test_dimension_mismatch() {
        let img1 = Img::new(vec![RGB8::new(0, 0, 0); 16 * 16], 16, 16);
        let img2 = Img::new(vec![RGB8::new(0, 0, 0); 8 * 8], 8, 8);

        let result = compare(img1.as_ref(), img2.as_ref(), &SsimParams::default());
        assert!(matches!(result, Err(SsimError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_empty_images() {
        let img: ImgVec<RGB8> = Img::new(Vec::new(), 4, 0);
        let result = compare(img.as_ref(), img.as_ref(), &SsimParams::default());
        assert!(matches!(result, Err(SsimError::EmptyInput { .. })));
    }

    #[test]
    fn test_compute_ssim_map_flag() {
        let img = gradient(20, 12, 0);

        let result = compare(img.as_ref(), img.as_ref(), &SsimParams::default()).unwrap();
        assert!(result.ssim_map.is_none());

        let params = SsimParams::default().with_compute_ssim_map(true);
        let result = compare(img.as_ref(), img.as_ref(), &params).unwrap();
        let map = result.ssim_map.unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn test_lumamask_off_matches_luma_mean() {
        let img1 = gradient(24, 24, 0);
        let img2 = gradient(24, 24, 20);
        let params = SsimParams::default().with_lumamask(false);

        let result = compare(img1.as_ref(), img2.as_ref(), &params).unwrap();
        assert_eq!(result.global.ssim, result.ssimg.y);
        assert_eq!(result.global.weight, 9.0);
    }

    #[test]
    fn test_compare_matches_individual_metrics() {
        let img1 = gradient(21, 13, 0);
        let img2 = gradient(21, 13, 9);
        let src = convert(img1.as_ref()).unwrap();
        let dest = convert(img2.as_ref()).unwrap();

        let result = compare(img1.as_ref(), img2.as_ref(), &SsimParams::default()).unwrap();
        assert_eq!(result.ssimg, calc_ssimg(&src, &dest).unwrap());
        assert_eq!(result.global, calc_ssim(&src, &dest, true).unwrap());
    }

    #[test]
    fn test_compare_raw_rejects_rgba() {
        let rgba = vec![0u8; 8 * 8 * 4];
        let rgb = vec![0u8; 8 * 8 * 3];
        let a = RawImage::packed(8, 8, PixelFormat::Rgba8, &rgba);
        let b = RawImage::packed(8, 8, PixelFormat::Rgb8, &rgb);
        let result = compare_raw(&a, &b, &SsimParams::default());
        assert!(matches!(result, Err(SsimError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_error_display() {
        let err = SsimError::DimensionMismatch {
            w1: 10,
            h1: 10,
            w2: 10,
            h2: 12,
        };
        assert_eq!(err.to_string(), "image dimensions don't match: 10x10 vs 10x12");
        let err = SsimError::UnsupportedFormat {
            format: PixelFormat::Rgba8,
        };
        assert!(err.to_string().contains("8-bit RGBA"));
    }
}
