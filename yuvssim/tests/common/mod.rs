//! Common test utilities for yuvssim tests.

#![allow(dead_code)]

pub mod generators;

use yuvssim::{compare, ImgRef, SsimParams, SsimResult, RGB8};

/// Compares with default parameters, panicking on error.
#[track_caller]
pub fn compare_default(img1: ImgRef<'_, RGB8>, img2: ImgRef<'_, RGB8>) -> SsimResult {
    compare(img1, img2, &SsimParams::default()).expect("comparison should succeed")
}

/// Asserts `a` and `b` are within `tol`.
#[track_caller]
pub fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{a} and {b} differ by more than {tol}");
}
