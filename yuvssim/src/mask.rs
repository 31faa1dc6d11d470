//! Luma masking weights for the global SSIM score.
//!
//! Each window's SSIM enters the global average with a weight that grows
//! with local luma contrast and saturates at [`LUMA_MASK_SIGMA_SATURATION`].
//! Flat windows keep a small positive weight so that an image without any
//! texture still produces a defined average.

use crate::consts::{LUMA_MASK_MIN_WEIGHT, LUMA_MASK_SIGMA_SATURATION};
use crate::ssim::Moments;

/// Weight of one window in the luma-masked average.
///
/// Uses the mean of the source and reference variances so the weight, like
/// the SSIM itself, does not depend on argument order. Always in
/// `[LUMA_MASK_MIN_WEIGHT, 1.0]`.
#[inline]
#[must_use]
pub fn luma_mask_weight(moments: &Moments) -> f64 {
    let sigma = (0.5 * (moments.var_s + moments.var_r)).max(0.0).sqrt();
    let contrast = (sigma / LUMA_MASK_SIGMA_SATURATION).min(1.0);
    LUMA_MASK_MIN_WEIGHT + (1.0 - LUMA_MASK_MIN_WEIGHT) * contrast
}
