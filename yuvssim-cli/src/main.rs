//! yuvssim CLI - SSIM on BT.601 Y/U/V planes
//!
//! Compare two images and print per-plane and luma-masked SSIM scores.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use colored::Colorize;
use image::{ColorType, DynamicImage};
use serde::Serialize;
use yuvssim::{compare_raw, ImgVec, PixelFormat, RawImage, SsimParams, SsimResult};

/// SSIM image quality metric on Y, U and V planes
///
/// Converts both images to BT.601 studio-range Y, U and V planes and
/// computes SSIM over 8x8 windows. A score of 1 means identical planes.
///
/// Text output shows each score as 1/(1-ssim), which grows without bound as
/// the images converge (identical images print `inf`). Use --raw for plain
/// SSIM values.
#[derive(Parser, Debug)]
#[command(name = "yuvssim")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXIT CODES:
    0 - Success (SSIM within threshold if --min-ssim specified)
    1 - SSIM below threshold (--min-ssim)
    2 - Error (unreadable file, unsupported pixel format, size mismatch)")]
struct Cli {
    /// Reference image (original/source)
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Distorted image (compressed/modified)
    #[arg(value_name = "DISTORTED")]
    distorted: PathBuf,

    /// Print plain SSIM values instead of 1/(1-ssim)
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Print all metrics as JSON
    #[arg(long)]
    json: bool,

    /// Give every window the same weight in the global luma score
    #[arg(long)]
    no_lumamask: bool,

    /// Minimum acceptable combined SSIM (exit code 1 if below)
    #[arg(long, value_name = "SSIM")]
    min_ssim: Option<f64>,

    /// Write the per-window Y SSIM as a grayscale PNG (white = identical)
    #[arg(short = 'm', long, value_name = "FILE")]
    ssim_map: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Report<'a> {
    reference: &'a Path,
    distorted: &'a Path,
    width: u32,
    height: u32,
    lumamask: bool,
    ssim: f64,
    y: f64,
    u: f64,
    v: f64,
    global_ssim: f64,
    global_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    below_threshold: Option<bool>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(result) if below_threshold(&cli, &result) => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            ExitCode::from(2)
        }
    }
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn below_threshold(cli: &Cli, result: &SsimResult) -> bool {
    cli.min_ssim.is_some_and(|min| result.ssimg.total < min)
}

fn run(cli: &Cli) -> Result<SsimResult, String> {
    let reference = load_image(&cli.reference)?;
    let distorted = load_image(&cli.distorted)?;

    let params = SsimParams::default()
        .with_lumamask(!cli.no_lumamask)
        .with_compute_ssim_map(cli.ssim_map.is_some());
    let result = compare_raw(
        &raw_image(&reference, &cli.reference)?,
        &raw_image(&distorted, &cli.distorted)?,
        &params,
    )
    .map_err(|e| e.to_string())?;

    if let (Some(path), Some(map)) = (&cli.ssim_map, &result.ssim_map) {
        save_ssim_map(map, path)?;
        log::info!("wrote SSIM map to {}", path.display());
    }

    if cli.json {
        let report = Report {
            reference: &cli.reference,
            distorted: &cli.distorted,
            width: reference.width(),
            height: reference.height(),
            lumamask: !cli.no_lumamask,
            ssim: result.ssimg.total,
            y: result.ssimg.y,
            u: result.ssimg.u,
            v: result.ssimg.v,
            global_ssim: result.global.ssim,
            global_weight: result.global.weight,
            below_threshold: cli.min_ssim.map(|_| below_threshold(cli, &result)),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize JSON: {e}"))?;
        println!("{json}");
    } else {
        print_scores(&result, cli.raw);
        if let Some(min) = cli.min_ssim.filter(|_| below_threshold(cli, &result)) {
            eprintln!(
                "{}",
                format!("ssimg {:.6} is below {min}", result.ssimg.total).red()
            );
        }
    }

    Ok(result)
}

fn load_image(path: &Path) -> Result<DynamicImage, String> {
    let img = image::open(path).map_err(|e| format!("failed to load '{}': {e}", path.display()))?;
    log::debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

/// Maps a decoded color type onto the library's input formats.
fn pixel_format(color: ColorType) -> Option<PixelFormat> {
    Some(match color {
        ColorType::L8 => PixelFormat::Gray8,
        ColorType::La8 => PixelFormat::GrayAlpha8,
        ColorType::Rgb8 => PixelFormat::Rgb8,
        ColorType::Rgba8 => PixelFormat::Rgba8,
        ColorType::L16 => PixelFormat::Gray16,
        ColorType::La16 => PixelFormat::GrayAlpha16,
        ColorType::Rgb16 => PixelFormat::Rgb16,
        ColorType::Rgba16 => PixelFormat::Rgba16,
        _ => return None,
    })
}

/// Hands the decoded bytes to the library untouched, so only 8-bit RGB passes.
fn raw_image<'a>(img: &'a DynamicImage, path: &Path) -> Result<RawImage<'a>, String> {
    let format = pixel_format(img.color()).ok_or_else(|| {
        format!(
            "'{}': unsupported color type {:?}",
            path.display(),
            img.color()
        )
    })?;
    Ok(RawImage::packed(
        img.width() as usize,
        img.height() as usize,
        format,
        img.as_bytes(),
    ))
}

fn print_scores(result: &SsimResult, raw: bool) {
    let show = |ssim: f64| if raw { ssim } else { 1.0 / (1.0 - ssim) };
    let s = &result.ssimg;
    println!("ssimg: {:.6}", show(s.total));
    println!("\ty: {:.6}", show(s.y));
    println!("\tu: {:.6}", show(s.u));
    println!("\tv: {:.6}", show(s.v));
    println!("ssim: {:.6}", show(result.global.ssim));
}

/// Negative window scores are drawn black.
fn save_ssim_map(map: &ImgVec<f64>, path: &Path) -> Result<(), String> {
    let gray: Vec<u8> = map
        .pixels()
        .map(|ssim| (ssim.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    let width = u32::try_from(map.width()).map_err(|e| format!("SSIM map too wide: {e}"))?;
    let height = u32::try_from(map.height()).map_err(|e| format!("SSIM map too tall: {e}"))?;
    image::save_buffer(path, &gray, width, height, ColorType::L8)
        .map_err(|e| format!("failed to save SSIM map to '{}': {e}", path.display()))
}
