//! Derivative Renderer (§4.B) — a pure function from source bytes + spec to encoded bytes.

mod error;
mod orientation;
mod spec;

pub use error::RenderError;
pub use spec::{FitMode, RenderOutput, RenderSpec};

use crate::domain::ImageFormat;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::io::Cursor;

/// `Render(sourceBytes, spec) -> {bytes, width, height}` (§4.B). Deterministic: same input and
/// spec always produce the same output, modulo encoder noise.
pub fn render(source_bytes: &[u8], spec: &RenderSpec) -> Result<RenderOutput, RenderError> {
    let decoded = image::load_from_memory(source_bytes)
        .map_err(|e| RenderError::DecodeFailed(e.to_string()))?;

    let orientation = orientation::read_orientation(source_bytes);
    let upright = orientation::apply_orientation(decoded, orientation);

    let fitted = fit(upright, spec.target_width, spec.target_height, spec.fit_mode);
    let (width, height) = fitted.dimensions();

    let bytes = encode(&fitted, spec.format, spec.quality)?;
    Ok(RenderOutput {
        bytes,
        width,
        height,
    })
}

fn fit(image: DynamicImage, target_w: u32, target_h: u32, mode: FitMode) -> DynamicImage {
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 || target_w == 0 || target_h == 0 {
        return image;
    }

    match mode {
        FitMode::Fill => image.resize_exact(target_w, target_h, FilterType::Lanczos3),
        FitMode::Contain => letterbox(
            image.resize(target_w, target_h, FilterType::Lanczos3),
            target_w,
            target_h,
        ),
        FitMode::Cover => image.resize_to_fill(target_w, target_h, FilterType::Lanczos3),
        FitMode::Inside => {
            if src_w <= target_w && src_h <= target_h {
                image
            } else {
                image.resize(target_w, target_h, FilterType::Lanczos3)
            }
        }
        FitMode::Outside => {
            if src_w >= target_w && src_h >= target_h {
                image
            } else {
                image.resize_to_fill(target_w, target_h, FilterType::Lanczos3)
            }
        }
    }
}

/// Pads a resized image to the exact target box with a transparent/black border, centering it.
fn letterbox(resized: DynamicImage, target_w: u32, target_h: u32) -> DynamicImage {
    let (w, h) = resized.dimensions();
    if w == target_w && h == target_h {
        return resized;
    }

    let mut canvas = DynamicImage::new_rgba8(target_w, target_h);
    let x_offset = (target_w.saturating_sub(w)) / 2;
    let y_offset = (target_h.saturating_sub(h)) / 2;
    image::imageops::overlay(&mut canvas, &resized, x_offset as i64, y_offset as i64);
    canvas
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, RenderError> {
    match format {
        ImageFormat::Jpeg => {
            let mut bytes = Vec::new();
            let rgb = image.to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            encoder
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| RenderError::EncodeFailed(e.to_string()))?;
            Ok(bytes)
        }
        ImageFormat::Png => {
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .map_err(|e| RenderError::EncodeFailed(e.to_string()))?;
            Ok(bytes)
        }
        ImageFormat::Webp => {
            let rgba = image.to_rgba8();
            let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
            let memory = encoder.encode(quality.clamp(1, 100) as f32);
            Ok(memory.to_vec())
        }
    }
}

/// Peak signal-to-noise ratio between two equally-sized RGB8 images, used by determinism tests
/// to tolerate encoder noise rather than requiring byte-identical output (§4.B).
pub fn psnr_rgb8(a: &image::RgbImage, b: &image::RgbImage) -> f64 {
    assert_eq!(a.dimensions(), b.dimensions(), "psnr requires equal dimensions");

    let mut sum_squared_error = 0f64;
    let sample_count = (a.width() as f64) * (a.height() as f64) * 3.0;

    for (pa, pb) in a.pixels().zip(b.pixels()) {
        for channel in 0..3 {
            let diff = pa[channel] as f64 - pb[channel] as f64;
            sum_squared_error += diff * diff;
        }
    }

    if sum_squared_error == 0.0 {
        return f64::INFINITY;
    }

    let mse = sum_squared_error / sample_count;
    20.0 * 255f64.log10() - 10.0 * mse.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let dynamic = DynamicImage::ImageRgb8(image);
        let mut bytes = Vec::new();
        dynamic
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn fill_stretches_to_exact_target_dimensions() {
        let source = encode_solid_png(40, 20, [200, 10, 10]);
        let spec = RenderSpec {
            target_width: 10,
            target_height: 10,
            format: ImageFormat::Png,
            quality: 90,
            fit_mode: FitMode::Fill,
        };
        let output = render(&source, &spec).unwrap();
        assert_eq!((output.width, output.height), (10, 10));
    }

    #[test]
    fn contain_pads_to_exact_target_dimensions() {
        let source = encode_solid_png(40, 20, [10, 200, 10]);
        let spec = RenderSpec {
            target_width: 10,
            target_height: 10,
            format: ImageFormat::Png,
            quality: 90,
            fit_mode: FitMode::Contain,
        };
        let output = render(&source, &spec).unwrap();
        assert_eq!((output.width, output.height), (10, 10));
    }

    #[test]
    fn inside_never_upscales_a_smaller_source() {
        let source = encode_solid_png(5, 5, [10, 10, 200]);
        let spec = RenderSpec {
            target_width: 100,
            target_height: 100,
            format: ImageFormat::Png,
            quality: 90,
            fit_mode: FitMode::Inside,
        };
        let output = render(&source, &spec).unwrap();
        assert_eq!((output.width, output.height), (5, 5));
    }

    #[test]
    fn decode_failure_is_reported_as_decode_failed() {
        let spec = RenderSpec {
            target_width: 10,
            target_height: 10,
            format: ImageFormat::Png,
            quality: 90,
            fit_mode: FitMode::Contain,
        };
        let err = render(b"not an image", &spec).unwrap_err();
        assert_eq!(err.kind(), "decode-failed");
    }

    #[test]
    fn psnr_of_identical_images_is_infinite() {
        let image = image::RgbImage::from_pixel(8, 8, image::Rgb([50, 60, 70]));
        assert_eq!(psnr_rgb8(&image, &image), f64::INFINITY);
    }
}
