//! Precomputed reference planes for repeated SSIM comparisons.
//!
//! When scoring many distorted candidates against one original (encoder
//! tuning loops, quality sweeps), convert the original to Y, U, V once and
//! reuse the planes.
//!
//! # Example
//!
//! ```
//! use yuvssim::{Img, SsimParams, SsimReference, RGB8};
//!
//! let width = 64;
//! let height = 64;
//! let original = Img::new(vec![RGB8::new(128, 128, 128); width * height], width, height);
//!
//! // Convert the reference once
//! let reference = SsimReference::new(original.as_ref(), SsimParams::default())
//!     .expect("valid image");
//!
//! // Compare against multiple distorted images
//! for level in [120u8, 110, 100] {
//!     let distorted = Img::new(vec![RGB8::new(level, level, level); width * height], width, height);
//!     let result = reference.compare(distorted.as_ref()).expect("valid distorted image");
//!     println!("level {level}: ssim = {:.4}", result.ssimg.total);
//! }
//! ```

use imgref::ImgRef;
use rgb::RGB8;

use crate::image::PlaneTriple;
use crate::yuv::{convert, convert_raw, RawImage};
use crate::{compare_planes, SsimError, SsimParams, SsimResult};

/// Converted reference image for fast repeated comparisons.
#[derive(Debug, Clone)]
pub struct SsimReference {
    planes: PlaneTriple,
    params: SsimParams,
}

impl SsimReference {
    /// Converts the reference image to Y, U, V planes.
    ///
    /// # Errors
    /// Returns [`SsimError::EmptyInput`] for a zero width or height.
    pub fn new(img: ImgRef<'_, RGB8>, params: SsimParams) -> Result<Self, SsimError> {
        Ok(Self::from_planes(convert(img)?, params))
    }

    /// Converts a raw decoder buffer as the reference.
    ///
    /// # Errors
    /// As [`convert_raw`].
    pub fn from_raw(raw: &RawImage<'_>, params: SsimParams) -> Result<Self, SsimError> {
        Ok(Self::from_planes(convert_raw(raw)?, params))
    }

    /// Uses already converted planes as the reference.
    #[must_use]
    pub fn from_planes(planes: PlaneTriple, params: SsimParams) -> Self {
        log::debug!(
            "precomputed {}x{} reference planes",
            planes.width(),
            planes.height()
        );
        Self { planes, params }
    }

    /// Compares a distorted image against the reference.
    ///
    /// # Errors
    /// - [`SsimError::EmptyInput`] for a zero width or height
    /// - [`SsimError::DimensionMismatch`] if sizes differ
    pub fn compare(&self, img: ImgRef<'_, RGB8>) -> Result<SsimResult, SsimError> {
        self.check_size(img.width(), img.height())?;
        self.compare_planes(&convert(img)?)
    }

    /// Compares a raw decoder buffer against the reference.
    ///
    /// # Errors
    /// As [`convert_raw`], then [`SsimError::DimensionMismatch`] if sizes differ.
    pub fn compare_raw(&self, raw: &RawImage<'_>) -> Result<SsimResult, SsimError> {
        self.compare_planes(&convert_raw(raw)?)
    }

    /// Compares already converted planes against the reference.
    ///
    /// # Errors
    /// - [`SsimError::EmptyInput`] for a zero width or height
    /// - [`SsimError::DimensionMismatch`] if sizes differ
    pub fn compare_planes(&self, planes: &PlaneTriple) -> Result<SsimResult, SsimError> {
        compare_planes(&self.planes, planes, &self.params)
    }

    /// Reference width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.planes.width()
    }

    /// Reference height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.planes.height()
    }

    /// Reference planes.
    #[must_use]
    pub fn planes(&self) -> &PlaneTriple {
        &self.planes
    }

    /// Parameters applied to every comparison.
    #[must_use]
    pub fn params(&self) -> &SsimParams {
        &self.params
    }

    fn check_size(&self, width: usize, height: usize) -> Result<(), SsimError> {
        if width != self.width() || height != self.height() {
            return Err(SsimError::DimensionMismatch {
                w1: self.width(),
                h1: self.height(),
                w2: width,
                h2: height,
            });
        }
        Ok(())
    }
}
