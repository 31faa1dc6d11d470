//! Windowed SSIM engine.
//!
//! Planes are tiled with non-overlapping [`WINDOW_SIZE`]² windows in raster
//! order. Windows at the right and bottom edges are clipped to the plane, so
//! a 10×10 plane yields windows of 8×8, 2×8, 8×2 and 2×2 samples.
//!
//! Window rows may be scored in parallel (feature `rayon`), but the scores
//! are always reduced sequentially in raster order. Results are therefore
//! bit-identical across thread counts and with the feature disabled.

use imgref::{Img, ImgVec};

use crate::consts::{C1, C2, SSIMG_PLANE_WEIGHTS, WINDOW_SIZE};
use crate::image::{Channel, Plane, PlaneTriple};
use crate::mask::luma_mask_weight;
use crate::SsimError;

/// Position and size of one statistics window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// Number of samples covered.
    #[inline]
    #[must_use]
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Number of window columns and rows covering a `width`×`height` plane.
#[must_use]
pub fn window_grid(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(WINDOW_SIZE), height.div_ceil(WINDOW_SIZE))
}

fn windows_in_row(width: usize, height: usize, row: usize) -> impl Iterator<Item = Window> {
    let y = row * WINDOW_SIZE;
    let h = WINDOW_SIZE.min(height - y);
    (0..width).step_by(WINDOW_SIZE).map(move |x| Window {
        x,
        y,
        width: WINDOW_SIZE.min(width - x),
        height: h,
    })
}

/// All windows of a `width`×`height` plane in raster order.
pub fn windows(width: usize, height: usize) -> impl Iterator<Item = Window> {
    let (_, rows) = window_grid(width, height);
    (0..rows).flat_map(move |row| windows_in_row(width, height, row))
}

/// Sufficient statistics of one window pair.
///
/// Kept as exact integer sums; 8-bit samples are widened before squaring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    pub sum_s: u64,
    pub sum_r: u64,
    pub sum_sq_s: u64,
    pub sum_sq_r: u64,
    pub sum_sr: u64,
    pub count: u64,
}

impl WindowStats {
    /// Accumulates the samples of `window` in both planes.
    ///
    /// Only samples inside the window (and therefore inside the plane) are
    /// read; row padding never contributes.
    ///
    /// # Panics
    /// Panics if the window extends past either plane.
    #[must_use]
    pub fn collect(src: &Plane, reference: &Plane, window: &Window) -> Self {
        let mut stats = Self::default();
        let cols = window.x..window.x + window.width;
        for y in window.y..window.y + window.height {
            let row_s = &src.row(y)[cols.clone()];
            let row_r = &reference.row(y)[cols.clone()];
            for (&s, &r) in row_s.iter().zip(row_r) {
                let (s, r) = (u64::from(s), u64::from(r));
                stats.sum_s += s;
                stats.sum_r += r;
                stats.sum_sq_s += s * s;
                stats.sum_sq_r += r * r;
                stats.sum_sr += s * r;
            }
        }
        stats.count = window.area() as u64;
        stats
    }

    /// Means, variances and covariance of the window.
    ///
    /// `var = sumsq/N - mean²` is evaluated as `(N·sumsq - sum²) / N²` so the
    /// subtraction happens on exact integers.
    #[must_use]
    pub fn moments(&self) -> Moments {
        let n = self.count as f64;
        let n2 = n * n;
        let var_s = self.count * self.sum_sq_s - self.sum_s * self.sum_s;
        let var_r = self.count * self.sum_sq_r - self.sum_r * self.sum_r;
        let cov = (self.count * self.sum_sr) as i64 - (self.sum_s * self.sum_r) as i64;
        Moments {
            mean_s: self.sum_s as f64 / n,
            mean_r: self.sum_r as f64 / n,
            var_s: var_s as f64 / n2,
            var_r: var_r as f64 / n2,
            cov: cov as f64 / n2,
        }
    }

    /// SSIM of the window pair.
    #[inline]
    #[must_use]
    pub fn ssim(&self) -> f64 {
        self.moments().ssim()
    }
}

/// First and second moments of a window pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean_s: f64,
    pub mean_r: f64,
    pub var_s: f64,
    pub var_r: f64,
    pub cov: f64,
}

impl Moments {
    /// `((2μsμr + C1)(2σsr + C2)) / ((μs² + μr² + C1)(σs² + σr² + C2))`
    #[inline]
    #[must_use]
    pub fn ssim(&self) -> f64 {
        let (ms, mr) = (self.mean_s, self.mean_r);
        let num = (2.0 * ms * mr + C1) * (2.0 * self.cov + C2);
        let den = (ms * ms + mr * mr + C1) * (self.var_s + self.var_r + C2);
        num / den
    }
}

/// SSIM and luma-mask weight of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScore {
    pub ssim: f64,
    pub weight: f64,
}

/// Scores of every window of one plane pair, in raster order.
#[derive(Debug, Clone)]
pub struct PlaneScores {
    scores: Vec<WindowScore>,
    cols: usize,
    rows: usize,
}

impl PlaneScores {
    /// Scores all windows of `src` against `reference`.
    ///
    /// # Errors
    /// - [`SsimError::EmptyInput`] if `src` has a zero dimension
    /// - [`SsimError::DimensionMismatch`] if the planes differ in size
    pub fn compute(src: &Plane, reference: &Plane) -> Result<Self, SsimError> {
        check_planes(src, reference)?;

        let (width, height) = (src.width(), src.height());
        let (cols, rows) = window_grid(width, height);
        log::trace!("scoring {width}x{height} plane pair ({cols}x{rows} windows)");

        let per_row = map_window_rows(rows, |row| {
            windows_in_row(width, height, row)
                .map(|window| {
                    let moments = WindowStats::collect(src, reference, &window).moments();
                    WindowScore {
                        ssim: moments.ssim(),
                        weight: luma_mask_weight(&moments),
                    }
                })
                .collect::<Vec<_>>()
        });

        Ok(Self {
            scores: per_row.into_iter().flatten().collect(),
            cols,
            rows,
        })
    }

    /// Number of windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Always `false`: empty planes are rejected by [`PlaneScores::compute`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Per-window scores in raster order.
    #[must_use]
    pub fn scores(&self) -> &[WindowScore] {
        &self.scores
    }

    /// Arithmetic mean of the window SSIMs.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.weighted(false).ssim
    }

    /// Weighted mean of the window SSIMs.
    ///
    /// With `lumamask` off every window weighs 1.0, so the result equals
    /// [`PlaneScores::mean`] and the weight equals the window count.
    #[must_use]
    pub fn weighted(&self, lumamask: bool) -> GlobalSsim {
        let (sum, weight) = self.scores.iter().fold((0.0, 0.0), |(sum, total), s| {
            let w = if lumamask { s.weight } else { 1.0 };
            (sum + w * s.ssim, total + w)
        });
        GlobalSsim {
            ssim: sum / weight,
            weight,
        }
    }

    /// Window SSIMs laid out as an image, one sample per window.
    #[must_use]
    pub fn to_map(&self) -> ImgVec<f64> {
        Img::new(
            self.scores.iter().map(|s| s.ssim).collect(),
            self.cols,
            self.rows,
        )
    }
}

#[cfg(feature = "rayon")]
fn map_window_rows<T, F>(rows: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;
    (0..rows).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
fn map_window_rows<T, F>(rows: usize, f: F) -> Vec<T>
where
    F: Fn(usize) -> T,
{
    (0..rows).map(f).collect()
}

fn check_planes(src: &Plane, reference: &Plane) -> Result<(), SsimError> {
    let (w1, h1) = (src.width(), src.height());
    let (w2, h2) = (reference.width(), reference.height());

    if src.is_empty() {
        return Err(SsimError::EmptyInput {
            width: w1,
            height: h1,
        });
    }

    if w1 != w2 || h1 != h2 {
        return Err(SsimError::DimensionMismatch { w1, h1, w2, h2 });
    }
    Ok(())
}

fn check_triples(src: &PlaneTriple, dest: &PlaneTriple) -> Result<(), SsimError> {
    check_planes(src.y(), dest.y())
}

/// Mean window SSIM of one plane pair.
///
/// # Errors
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::DimensionMismatch`] if the planes differ in size
pub fn plane_ssim(src: &Plane, reference: &Plane) -> Result<f64, SsimError> {
    Ok(PlaneScores::compute(src, reference)?.mean())
}

/// Per-plane SSIM scores and their luma-weighted combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsimgResult {
    /// `(4·y + u + v) / 6`.
    pub total: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl SsimgResult {
    fn from_planes(y: f64, u: f64, v: f64) -> Self {
        let [wy, wu, wv] = SSIMG_PLANE_WEIGHTS;
        Self {
            total: (wy * y + wu * u + wv * v) / (wy + wu + wv),
            y,
            u,
            v,
        }
    }

    /// Score of one plane.
    #[must_use]
    pub fn plane(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Y => self.y,
            Channel::U => self.u,
            Channel::V => self.v,
        }
    }
}

/// Luma-masked global SSIM with the total weight behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSsim {
    pub ssim: f64,
    /// Sum of the window weights. Equals the window count when the luma
    /// mask is disabled.
    pub weight: f64,
}

impl GlobalSsim {
    /// Combines the scores of two image pairs in proportion to their weights.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let weight = self.weight + other.weight;
        if weight <= 0.0 {
            return self;
        }
        Self {
            ssim: (self.ssim * self.weight + other.ssim * other.weight) / weight,
            weight,
        }
    }
}

/// Scores the Y, U and V planes independently.
///
/// # Errors
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::DimensionMismatch`] if the images differ in size
pub fn calc_ssimg(src: &PlaneTriple, dest: &PlaneTriple) -> Result<SsimgResult, SsimError> {
    check_triples(src, dest)?;
    let [y, u, v] =
        Channel::ALL.map(|c| PlaneScores::compute(src.plane(c), dest.plane(c)).map(|s| s.mean()));
    Ok(SsimgResult::from_planes(y?, u?, v?))
}

/// Luma-masked global SSIM of the Y planes.
///
/// # Errors
/// - [`SsimError::EmptyInput`] for a zero width or height
/// - [`SsimError::DimensionMismatch`] if the images differ in size
pub fn calc_ssim(
    src: &PlaneTriple,
    dest: &PlaneTriple,
    lumamask: bool,
) -> Result<GlobalSsim, SsimError> {
    check_triples(src, dest)?;
    Ok(PlaneScores::compute(src.y(), dest.y())?.weighted(lumamask))
}

/// Scores the planes of two images, reusing the Y window scores for both
/// metrics.
pub(crate) fn score_triples(
    src: &PlaneTriple,
    dest: &PlaneTriple,
) -> Result<[PlaneScores; 3], SsimError> {
    check_triples(src, dest)?;
    let [y, u, v] = Channel::ALL.map(|c| PlaneScores::compute(src.plane(c), dest.plane(c)));
    Ok([y?, u?, v?])
}

pub(crate) fn ssimg_from_scores(scores: &[PlaneScores; 3]) -> SsimgResult {
    SsimgResult::from_planes(scores[0].mean(), scores[1].mean(), scores[2].mean())
}
