//! Deterministic image generators and distortions for yuvssim tests.
//!
//! Images are packed RGB bytes (`width * height * 3`) built from an LCG PRNG,
//! so every platform sees identical inputs.

use yuvssim::{Img, ImgVec, RGB8};

/// Wraps packed RGB bytes as an image.
pub fn to_img(rgb: &[u8], width: usize, height: usize) -> ImgVec<RGB8> {
    let pixels = rgb
        .chunks_exact(3)
        .map(|c| RGB8::new(c[0], c[1], c[2]))
        .collect();
    Img::new(pixels, width, height)
}

// ============================================================================
// LCG PRNG
// ============================================================================

/// LCG pseudo-random number generator (deterministic)
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u8(&mut self) -> u8 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) & 0xFF) as u8
    }

    /// Index in `0..n`.
    pub fn next_index(&mut self, n: usize) -> usize {
        self.next_u8() as usize * n / 256
    }
}

// ============================================================================
// Image Generation Functions
// ============================================================================

fn gen_gray(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let val = f(x, y);
            data.extend_from_slice(&[val, val, val]);
        }
    }
    data
}

/// Uniform color image
pub fn gen_uniform(width: usize, height: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    [r, g, b].repeat(width * height)
}

/// Horizontal gradient (grayscale)
pub fn gen_gradient_h(width: usize, height: usize) -> Vec<u8> {
    gen_gray(width, height, |x, _| {
        if width > 1 {
            (x * 255 / (width - 1)) as u8
        } else {
            128
        }
    })
}

/// RGB color gradient
pub fn gen_color_gradient(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let r = if width > 1 { (x * 255 / (width - 1)) as u8 } else { 128 };
            let g = if height > 1 { (y * 255 / (height - 1)) as u8 } else { 128 };
            data.extend_from_slice(&[r, g, 128]);
        }
    }
    data
}

/// Checkerboard with `block_size` squares, starting with `hi` at the origin
pub fn gen_checkerboard(width: usize, height: usize, block_size: usize, lo: u8, hi: u8) -> Vec<u8> {
    gen_gray(width, height, |x, y| {
        if ((x / block_size) + (y / block_size)) % 2 == 0 {
            hi
        } else {
            lo
        }
    })
}

/// Seeded random image
pub fn gen_random(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    (0..width * height * 3).map(|_| rng.next_u8()).collect()
}

// ============================================================================
// Distortion Functions
// ============================================================================

/// Uniform brightness shift
pub fn distort_brightness(img: &[u8], delta: i16) -> Vec<u8> {
    img.iter()
        .map(|&v| (v as i16 + delta).clamp(0, 255) as u8)
        .collect()
}

/// Per-sample noise with fixed seed
pub fn distort_noise(img: &[u8], seed: u64, amplitude: u8) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    img.iter()
        .map(|&v| {
            let noise = rng.next_u8() as i16 - 128;
            let scaled = noise * amplitude as i16 / 128;
            (v as i16 + scaled).clamp(0, 255) as u8
        })
        .collect()
}

/// Overwrites `count` random pixels with random colors.
pub fn distort_pixels(img: &[u8], seed: u64, count: usize) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    let pixels = img.len() / 3;
    let mut out = img.to_vec();
    for _ in 0..count {
        let i = rng.next_index(pixels) * 3;
        for c in 0..3 {
            out[i + c] = rng.next_u8();
        }
    }
    out
}

/// Quantize to fewer levels
pub fn distort_quantize(img: &[u8], levels: u8) -> Vec<u8> {
    let step = 256 / levels as u16;
    img.iter()
        .map(|&v| {
            let bucket = v as u16 / step;
            (bucket * step + step / 2).min(255) as u8
        })
        .collect()
}
