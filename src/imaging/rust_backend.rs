//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary; no ImageMagick.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with format sniffing |
//! | Decode (GIF, all frames) | `image::codecs::gif::GifDecoder` + `AnimationDecoder` |
//! | Auto-orient | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Crop / resize | `DynamicImage::crop_imm` / `resize_exact` |
//! | Encode → JPEG / PNG | `JpegEncoder::new_with_quality` / `ImageFormat::Png` |
//! | Encode → animated GIF | `image::codecs::gif::GifEncoder` (loops forever) |
//! | Text | `ab_glyph` font loading + `imageproc::drawing::draw_text_mut` |

use super::backend::{BackendError, Dimensions, ImageBackend, ImageHandle};
use super::calculations::text_line_origins;
use super::params::{Annotation, CropRegion, EncodeFormat, Filter};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{
    AnimationDecoder, Delay, DynamicImage, Frame, ImageDecoder, ImageFormat, ImageReader, Rgba,
    RgbaImage,
};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// One decoded frame and how long it is shown.
struct RasterFrame {
    image: DynamicImage,
    delay: Delay,
}

/// A decoded image held in memory until dropped.
pub struct RustHandle {
    path: PathBuf,
    format: ImageFormat,
    orientation: Orientation,
    frames: Vec<RasterFrame>,
}

fn decode_error(path: &Path) -> impl Fn(image::ImageError) -> BackendError + '_ {
    move |e| BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
}

fn filter_type(filter: Filter) -> FilterType {
    match filter {
        Filter::Triangle => FilterType::Triangle,
        Filter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Decode every frame of a GIF. GIFs carry no orientation.
fn decode_gif(path: &Path) -> Result<Vec<RasterFrame>, BackendError> {
    let file = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(file).map_err(decode_error(path))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(decode_error(path))?;
    Ok(frames
        .into_iter()
        .map(|frame| RasterFrame {
            delay: frame.delay(),
            image: DynamicImage::ImageRgba8(frame.into_buffer()),
        })
        .collect())
}

/// Decode a still image, returning it with its recorded orientation.
fn decode_still(
    reader: ImageReader<BufReader<File>>,
    path: &Path,
) -> Result<(DynamicImage, Orientation), BackendError> {
    let mut decoder = reader.into_decoder().map_err(decode_error(path))?;
    // A missing or unreadable EXIF block is not an error; the image is upright
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);
    let image = DynamicImage::from_decoder(decoder).map_err(decode_error(path))?;
    Ok((image, orientation))
}

impl ImageBackend for RustBackend {
    type Handle = RustHandle;

    fn open(&self, path: &Path) -> Result<RustHandle, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Unrecognised image format: {}", path.display()))
        })?;

        let (frames, orientation) = if format == ImageFormat::Gif {
            (decode_gif(path)?, Orientation::NoTransforms)
        } else {
            let (image, orientation) = decode_still(reader, path)?;
            let frame = RasterFrame {
                image,
                delay: Delay::from_numer_denom_ms(0, 1),
            };
            (vec![frame], orientation)
        };

        if frames.is_empty() {
            return Err(BackendError::ProcessingFailed(format!(
                "No frames in {}",
                path.display()
            )));
        }

        tracing::trace!(path = %path.display(), ?format, frames = frames.len(), "opened image");
        Ok(RustHandle {
            path: path.to_path_buf(),
            format,
            orientation,
            frames,
        })
    }
}

impl RustHandle {
    fn first(&self) -> &DynamicImage {
        // `open` never builds a handle without frames
        &self.frames[0].image
    }
}

impl Drop for RustHandle {
    fn drop(&mut self) {
        tracing::trace!(path = %self.path.display(), "released image");
    }
}

impl ImageHandle for RustHandle {
    fn describe(&self) -> Result<String, BackendError> {
        let dims = self.dimensions();
        Ok(format!(
            "Image: {}\n  Format: {:?}\n  Mime type: {}\n  Geometry: {}x{}+0+0\n  Scenes: {}\n",
            self.path.display(),
            self.format,
            self.format.to_mime_type(),
            dims.width,
            dims.height,
            self.frames.len()
        ))
    }

    fn auto_orient(&mut self) -> Result<(), BackendError> {
        if self.orientation != Orientation::NoTransforms {
            for frame in &mut self.frames {
                frame.image.apply_orientation(self.orientation);
            }
            self.orientation = Orientation::NoTransforms;
        }
        Ok(())
    }

    fn dimensions(&self) -> Dimensions {
        let image = self.first();
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_dimensions(&self, index: usize) -> Option<Dimensions> {
        self.frames.get(index).map(|frame| Dimensions {
            width: frame.image.width(),
            height: frame.image.height(),
        })
    }

    fn crop(&mut self, region: CropRegion) -> Result<(), BackendError> {
        for frame in &mut self.frames {
            let (w, h) = (frame.image.width(), frame.image.height());
            if region.x + region.width > w || region.y + region.height > h {
                return Err(BackendError::ProcessingFailed(format!(
                    "Crop {}x{}+{}+{} outside {}x{}",
                    region.width, region.height, region.x, region.y, w, h
                )));
            }
            frame.image = frame
                .image
                .crop_imm(region.x, region.y, region.width, region.height);
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, filter: Filter) -> Result<(), BackendError> {
        for index in 0..self.frames.len() {
            self.resize_frame(index, width, height, filter)?;
        }
        Ok(())
    }

    fn resize_frame(
        &mut self,
        index: usize,
        width: u32,
        height: u32,
        filter: Filter,
    ) -> Result<(), BackendError> {
        let frame = self
            .frames
            .get_mut(index)
            .ok_or_else(|| BackendError::ProcessingFailed(format!("No frame {index}")))?;
        frame.image = frame.image.resize_exact(width, height, filter_type(filter));
        Ok(())
    }

    fn encode(&self, format: EncodeFormat) -> Result<Vec<u8>, BackendError> {
        let image = self.first();
        let mut blob = Vec::new();

        let encoded = match format {
            EncodeFormat::Jpeg(quality) => {
                // JPEG has no alpha channel
                let rgb = image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut blob, quality.value());
                rgb.write_with_encoder(encoder)
            }
            EncodeFormat::Png => image.write_to(&mut Cursor::new(&mut blob), ImageFormat::Png),
        };
        encoded.map_err(|e| BackendError::Extraction(e.to_string()))?;

        if blob.is_empty() {
            return Err(BackendError::Extraction(format!(
                "empty {} blob for {}",
                format.mime_type(),
                self.path.display()
            )));
        }
        Ok(blob)
    }

    fn write_frames(&self, path: &Path) -> Result<(), BackendError> {
        if self.format != ImageFormat::Gif {
            return Err(BackendError::ProcessingFailed(format!(
                "{} is not an animated GIF",
                self.path.display()
            )));
        }

        let file = File::create(path)?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| BackendError::Extraction(e.to_string()))?;
        let frames = self
            .frames
            .iter()
            .map(|frame| Frame::from_parts(frame.image.to_rgba8(), 0, 0, frame.delay));
        encoder
            .encode_frames(frames)
            .map_err(|e| BackendError::Extraction(e.to_string()))
    }

    fn draw_text(&mut self, annotation: &Annotation) -> Result<(), BackendError> {
        let font_error = |reason: String| BackendError::FontLoad {
            path: annotation.font.clone(),
            reason,
        };
        let data = std::fs::read(&annotation.font).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(data).map_err(|e| font_error(e.to_string()))?;

        let scale = PxScale::from(annotation.size);
        let scaled = font.as_scaled(scale);
        let line_height = (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32;
        let lines: Vec<&str> = annotation.text.split('\n').collect();
        let widths: Vec<u32> = lines
            .iter()
            .map(|line| text_size(scale, &font, line).0)
            .collect();
        let alpha = (annotation.opacity.clamp(0.0, 1.0) * 255.0).round() as u16;

        for frame in &mut self.frames {
            let mut canvas = frame.image.to_rgba8();
            let (width, height) = canvas.dimensions();

            // White glyphs on a transparent layer; coverage lands in alpha
            let mut layer = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
            let origins = text_line_origins((width, height), &widths, line_height, annotation.gravity);
            for (line, (x, y)) in lines.iter().zip(origins) {
                draw_text_mut(&mut layer, Rgba([255, 255, 255, 255]), x, y, scale, &font, line);
            }
            for pixel in layer.pixels_mut() {
                pixel[3] = (pixel[3] as u16 * alpha / 255) as u8;
            }

            imageops::overlay(&mut canvas, &layer, 0, 0);
            frame.image = DynamicImage::ImageRgba8(canvas);
        }
        Ok(())
    }
}
