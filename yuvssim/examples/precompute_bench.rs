//! Benchmark comparing a precomputed reference against full comparisons.
//!
//! Run with: cargo run --release --example precompute_bench

use std::time::Instant;

use yuvssim::{compare, Img, ImgVec, SsimParams, SsimReference, RGB8};

fn main() {
    let width = 1024;
    let height = 768;

    let reference_pixels: Vec<RGB8> = (0..width * height)
        .map(|i| {
            let x = i % width;
            let y = i / width;
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = ((x ^ y) & 0xFF) as u8;
            RGB8::new(r, g, b)
        })
        .collect();
    let reference_img = Img::new(reference_pixels.clone(), width, height);

    let num_distortions = 20;
    let distortions: Vec<ImgVec<RGB8>> = (1..=num_distortions)
        .map(|offset| {
            let pixels = reference_pixels
                .iter()
                .enumerate()
                .map(|(i, px)| {
                    // Offset every other pixel so structure changes, not just brightness
                    let d = if i % 2 == 0 { offset as u8 } else { 0 };
                    RGB8::new(px.r.saturating_add(d), px.g, px.b.saturating_sub(d))
                })
                .collect();
            Img::new(pixels, width, height)
        })
        .collect();

    let params = SsimParams::default();

    // Warm up
    let _ = compare(reference_img.as_ref(), distortions[0].as_ref(), &params);

    let start = Instant::now();
    let full_scores: Vec<f64> = distortions
        .iter()
        .map(|d| {
            compare(reference_img.as_ref(), d.as_ref(), &params)
                .expect("valid input")
                .ssimg
                .total
        })
        .collect();
    let full_time = start.elapsed();

    let precompute_start = Instant::now();
    let reference =
        SsimReference::new(reference_img.as_ref(), params.clone()).expect("valid reference");
    let precompute_time = precompute_start.elapsed();

    let compare_start = Instant::now();
    let precomputed_scores: Vec<f64> = distortions
        .iter()
        .map(|d| reference.compare(d.as_ref()).expect("valid input").ssimg.total)
        .collect();
    let compare_time = compare_start.elapsed();

    assert_eq!(full_scores, precomputed_scores, "scores must be identical");

    println!("Image size: {width}x{height}, {num_distortions} comparisons");
    println!("Full comparisons:     {full_time:?}");
    println!("Precompute reference: {precompute_time:?}");
    println!("Precomputed compares: {compare_time:?}");
    println!(
        "Speedup: {:.2}x",
        full_time.as_secs_f64() / (precompute_time + compare_time).as_secs_f64()
    );
    for (offset, score) in full_scores.iter().enumerate().step_by(5) {
        println!("  offset {:2}: ssim = {score:.6}", offset + 1);
    }
}
