//! Shared test utilities for the fotomat test suite.
//!
//! Builds small synthetic images on disk so backend and dispatcher tests run
//! real decoders and encoders without checked-in image fixtures. The one
//! checked-in fixture is the watermark font under `tests/fonts/`.
//!
//! `tests/process.rs` includes this file with `#[path]`, so library and
//! integration tests share the same writers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let upload = tmp.path().join("upload");
//! write_jpeg(&upload, 800, 600);
//! assert_eq!(decoded_dimensions(&upload), (800, 600));
//! ```

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageEncoder, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Fixture writers
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a baseline JPEG with a gradient fill.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a JPEG carrying an EXIF orientation tag (e.g. 6 = rotate 90° clockwise).
///
/// The APP1 segment is spliced in right after SOI.
pub fn write_jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    let img = gradient(width, height);
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();

    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    // Big-endian TIFF header, first IFD at offset 8
    app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    // One entry: Orientation (0x0112), SHORT, count 1
    app1.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    app1.extend_from_slice(&orientation.to_be_bytes());
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// Write an RGBA PNG with a gradient fill.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Write an animated GIF with `frames` solid-colour frames of the same size.
pub fn write_gif(path: &Path, width: u32, height: u32, frames: usize) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GifEncoder::new(std::io::BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite).unwrap();
    let frames = (0..frames).map(|i| {
        let shade = (i * 60 % 256) as u8;
        let buffer = RgbaImage::from_pixel(width, height, Rgba([shade, 0, 255 - shade, 255]));
        Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1))
    });
    encoder.encode_frames(frames).unwrap();
}

// =========================================================================
// Inspection
// =========================================================================

/// Decode any image on disk and return its dimensions.
pub fn decoded_dimensions(path: &Path) -> (u32, u32) {
    image::ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .into_dimensions()
        .unwrap()
}

/// Decode a GIF and return every frame's dimensions.
pub fn gif_frame_dimensions(path: &Path) -> Vec<(u32, u32)> {
    use image::AnimationDecoder;
    let file = std::io::BufReader::new(std::fs::File::open(path).unwrap());
    image::codecs::gif::GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .iter()
        .map(|f| f.buffer().dimensions())
        .collect()
}

/// Guess the on-disk format from magic bytes.
pub fn sniff_format(path: &Path) -> ImageFormat {
    image::ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .format()
        .unwrap()
}

/// TrueType font bundled with the tests (DejaVu Sans Mono Bold, Bitstream Vera license).
pub fn test_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSansMono-Bold.ttf")
}
