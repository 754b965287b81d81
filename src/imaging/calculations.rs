//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Dimensions are `(width, height)` tuples in pixels.

use super::params::{CropRegion, Gravity};

/// Width (inclusive) up to which watermarks use the fixed small style.
pub const WATERMARK_SMALL_MAX_WIDTH: u32 = 512;

/// Pixel budget for a single resize.
///
/// Resampling works through an intermediate buffer as wide as the wider of
/// source and target and as tall as the target, so both are bounded.
pub const MAX_RESIZE_PIXELS: u64 = 40_000_000;

/// Calculate the largest centred square inside an image.
///
/// The square's side is the short edge. The offset runs along the long axis
/// and is truncated by integer division, so odd remainders favour the
/// top/left edge.
///
/// # Examples
/// ```
/// # use fotomat::imaging::calculations::square_crop_region;
/// let region = square_crop_region((800, 600));
/// assert_eq!((region.width, region.height, region.x, region.y), (600, 600, 100, 0));
/// ```
pub fn square_crop_region(source: (u32, u32)) -> CropRegion {
    let (width, height) = source;
    let size = width.min(height);

    let (x, y) = if height > width {
        // Portrait: keep full width, trim top and bottom
        (0, (height - size) / 2)
    } else {
        // Landscape or square: keep full height, trim the sides
        ((width - size) / 2, 0)
    };

    CropRegion {
        width: size,
        height: size,
        x,
        y,
    }
}

/// Calculate thumbnail dimensions for a target height, preserving aspect ratio.
///
/// Width is `round(target_height / source_height * source_width)` using
/// [`f64::round`] (half away from zero), never less than one pixel.
///
/// # Examples
/// ```
/// # use fotomat::imaging::calculations::thumbnail_dimensions;
/// assert_eq!(thumbnail_dimensions((1000, 500), 100), (200, 100));
/// ```
pub fn thumbnail_dimensions(source: (u32, u32), target_height: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let aspect = target_height as f64 / src_h as f64;
    let width = (aspect * src_w as f64).round() as u32;
    (width.max(1), target_height)
}

/// Whether resizing `source` to `target` stays inside [`MAX_RESIZE_PIXELS`].
///
/// # Examples
/// ```
/// # use fotomat::imaging::calculations::resize_within_budget;
/// assert!(resize_within_budget((4000, 3000), (400, 300)));
/// assert!(!resize_within_budget((4, 2), (400_000, 200_000)));
/// ```
pub fn resize_within_budget(source: (u32, u32), target: (u32, u32)) -> bool {
    let widest = source.0.max(target.0) as u64;
    widest * target.1 as u64 <= MAX_RESIZE_PIXELS
}

/// Font size and fill opacity for a watermark, chosen by image width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkStyle {
    pub font_size: f32,
    pub opacity: f32,
}

/// Pick the watermark style for an image of the given width.
///
/// Up to [`WATERMARK_SMALL_MAX_WIDTH`] the text is a fixed 36px at 40% opacity;
/// wider images scale the font with the width (`round(width / 15)`) at 50%.
pub fn watermark_style(image_width: u32) -> WatermarkStyle {
    if image_width <= WATERMARK_SMALL_MAX_WIDTH {
        WatermarkStyle {
            font_size: 36.0,
            opacity: 0.40,
        }
    } else {
        WatermarkStyle {
            font_size: (image_width as f64 / 15.0).round() as f32,
            opacity: 0.50,
        }
    }
}

/// Map a request's gravity label to an anchor.
///
/// Only `Center`, `BottomLeft` and `Bottom` are recognised (case-sensitive);
/// anything else, including no label, anchors bottom-right.
pub fn gravity_for_label(label: Option<&str>) -> Gravity {
    match label {
        Some("Center") => Gravity::Center,
        Some("BottomLeft") => Gravity::SouthWest,
        Some("Bottom") => Gravity::South,
        _ => Gravity::SouthEast,
    }
}

/// Calculate the top-left origin of each line in a text block.
///
/// The block is as wide as its widest line and `line_height * lines` tall.
/// It is anchored inside the canvas per `gravity` with no offset, and each
/// line is aligned within the block the same way (left for south-west,
/// centred for center/south, right for south-east). Origins may be negative
/// when the text is larger than the canvas.
///
/// # Arguments
/// * `canvas` - Image dimensions (width, height)
/// * `line_widths` - Rendered width of each line, top to bottom
/// * `line_height` - Vertical advance between lines
/// * `gravity` - Anchor for the block
pub fn text_line_origins(
    canvas: (u32, u32),
    line_widths: &[u32],
    line_height: u32,
    gravity: Gravity,
) -> Vec<(i32, i32)> {
    let (canvas_w, canvas_h) = (canvas.0 as i64, canvas.1 as i64);
    let block_w = line_widths.iter().copied().max().unwrap_or(0) as i64;
    let block_h = line_height as i64 * line_widths.len() as i64;

    let (block_x, block_y) = match gravity {
        Gravity::Center => ((canvas_w - block_w) / 2, (canvas_h - block_h) / 2),
        Gravity::SouthWest => (0, canvas_h - block_h),
        Gravity::South => ((canvas_w - block_w) / 2, canvas_h - block_h),
        Gravity::SouthEast => (canvas_w - block_w, canvas_h - block_h),
    };

    line_widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let w = w as i64;
            let x = match gravity {
                Gravity::SouthWest => block_x,
                Gravity::Center | Gravity::South => block_x + (block_w - w) / 2,
                Gravity::SouthEast => block_x + block_w - w,
            };
            let y = block_y + i as i64 * line_height as i64;
            (x as i32, y as i32)
        })
        .collect()
}
