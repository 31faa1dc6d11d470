//! Constants for the BT.601 conversion and the SSIM engine.

// ============================================================================
// BT.601 studio-range RGB -> YUV
// ============================================================================

/// Divisor applied to every RGB coefficient product.
pub const RGB_SCALE: f64 = 256.0;

/// Luma offset added after the weighted sum.
pub const Y_OFFSET: f64 = 16.0;
/// Luma multipliers for r, g and b.
pub const Y_FROM_RGB: [f64; 3] = [65.738, 129.057, 25.064];

/// Blue-difference chroma midpoint.
pub const U_OFFSET: f64 = 128.0;
/// Blue-difference multipliers for r, g and b.
pub const U_FROM_RGB: [f64; 3] = [-37.945, -74.494, 112.439];

/// Red-difference chroma midpoint.
pub const V_OFFSET: f64 = 128.0;
/// Red-difference multipliers for r, g and b.
pub const V_FROM_RGB: [f64; 3] = [112.439, -94.154, -18.285];

// ============================================================================
// SSIM
// ============================================================================

/// Side length of the non-overlapping statistics window.
pub const WINDOW_SIZE: usize = 8;

/// Luminance stabilizer, `(0.01 * 255)^2`.
pub const C1: f64 = 6.5025;

/// Contrast/structure stabilizer, `(0.03 * 255)^2`.
pub const C2: f64 = 58.5225;

/// Weights of the Y, U and V plane scores in the combined `ssimg` value.
pub const SSIMG_PLANE_WEIGHTS: [f64; 3] = [4.0, 1.0, 1.0];

// ============================================================================
// Luma masking
// ============================================================================

/// Weight given to a perfectly flat window.
pub const LUMA_MASK_MIN_WEIGHT: f64 = 0.1;

/// Local standard deviation (in 8-bit code values) at which the weight
/// saturates at 1.0.
pub const LUMA_MASK_SIGMA_SATURATION: f64 = 16.0;
