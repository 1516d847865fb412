//! Image → half-block cell rows.
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as its background.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba};
use ratatui::style::Color;

use super::cells::{StyledCell, StyledRow, LOWER_HALF, UPPER_HALF};
use super::palette::{is_transparent, quantise, ColorDepth};
use crate::tui::theme::ERROR_COLOR;

/// Text shown in place of an image that could not be rendered.
pub const ERROR_TEXT: &str = "Failed to display image";

/// Narrowest layout the rasteriser accepts.
pub const MIN_WIDTH: usize = 2;

/// Render `image` into rows of at most `target_width` cells.
///
/// Returns an empty vector when `target_width` is below [`MIN_WIDTH`] and a
/// single error row when the image has no pixels.
pub fn rasterise(image: &DynamicImage, target_width: usize, depth: ColorDepth) -> Vec<StyledRow> {
    if target_width < MIN_WIDTH {
        return Vec::new();
    }

    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        tracing::debug!("Refusing to rasterise an empty image");
        return vec![error_row(target_width)];
    }

    let cols = effective_width(src_w, target_width);
    let pixels = if cols == src_w {
        image.to_rgba8()
    } else {
        let filter = match depth {
            ColorDepth::Mono => FilterType::Nearest,
            _ => FilterType::Triangle,
        };
        image
            .resize_exact(cols, scaled_height(src_w, src_h, cols), filter)
            .to_rgba8()
    };
    let px_h = pixels.height();

    (0..px_h)
        .step_by(2)
        .map(|y| {
            let cells = (0..cols)
                .map(|x| {
                    let top = *pixels.get_pixel(x, y);
                    let bottom = if y + 1 < px_h {
                        Some(*pixels.get_pixel(x, y + 1))
                    } else if px_h == 1 {
                        // A one-pixel-high image fills its whole cell.
                        Some(top)
                    } else {
                        None
                    };
                    half_block(top, bottom, depth)
                })
                .collect();
            StyledRow::new(cells)
        })
        .collect()
}

/// Number of cell columns an image of `source_width` pixels gets.
///
/// Very wide sources are shrunk to a third of the column so they do not
/// dominate the chat; narrow ones are never upscaled.
pub fn effective_width(source_width: u32, target_width: usize) -> u32 {
    let target = u32::try_from(target_width).unwrap_or(u32::MAX);
    if source_width > target.saturating_mul(3) {
        (target / 3).max(1)
    } else {
        source_width.min(target)
    }
}

/// Pixel height after scaling to `cols` columns, rounded up to an even number
/// so every cell gets two real pixels.
///
/// Unscaled images keep their own height; an odd one leaves the last bottom
/// half empty.
fn scaled_height(src_w: u32, src_h: u32, cols: u32) -> u32 {
    let scaled = (u64::from(src_h) * u64::from(cols) + u64::from(src_w) / 2) / u64::from(src_w);
    let scaled = u32::try_from(scaled.max(1)).unwrap_or(u32::MAX);
    scaled + scaled % 2
}

fn half_block(top: Rgba<u8>, bottom: Option<Rgba<u8>>, depth: ColorDepth) -> StyledCell {
    let top_clear = is_transparent(top);
    let bottom_clear = bottom.map_or(true, is_transparent);
    match (top_clear, bottom_clear, bottom) {
        (true, true, _) => StyledCell::new(" ", Color::Reset, Color::Reset),
        // Only the lower pixel is visible; swap glyphs so the default
        // background shows on top instead of the default foreground.
        (true, false, Some(bottom)) => {
            StyledCell::new(LOWER_HALF, quantise(bottom, depth), Color::Reset)
        }
        _ => StyledCell::new(
            UPPER_HALF,
            quantise(top, depth),
            bottom.map_or(Color::Reset, |p| quantise(p, depth)),
        ),
    }
}

/// The row shown when an image cannot be displayed, clipped to `width`.
pub fn error_row(width: usize) -> StyledRow {
    StyledRow::from_text(ERROR_TEXT, ERROR_COLOR, Color::Reset, width)
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, RgbaImage};

    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn solid(w: u32, h: u32, px: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(w, h, px))
    }

    #[test]
    fn test_two_by_two_red_truecolor() {
        let rows = rasterise(&solid(2, 2, RED), 40, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), 2);
        for cell in &rows[0].cells {
            assert_eq!(cell.symbol, UPPER_HALF);
            assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
            assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
        }
    }

    #[test]
    fn test_single_pixel_fills_both_halves() {
        let rows = rasterise(&solid(1, 1, RED), 2, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), 1);
        assert_eq!(rows[0].cells[0].fg, rows[0].cells[0].bg);
        assert_eq!(rows[0].cells[0].fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_width_below_minimum_is_empty() {
        assert!(rasterise(&solid(4, 4, RED), 1, ColorDepth::TrueColor).is_empty());
        assert!(rasterise(&solid(4, 4, RED), 0, ColorDepth::TrueColor).is_empty());
    }

    #[test]
    fn test_zero_dimensions_yield_error_row() {
        let rows = rasterise(&DynamicImage::new_rgba8(0, 0), 40, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), ERROR_TEXT);
        assert!(rows[0].cells.iter().all(|c| c.fg == ERROR_COLOR));
    }

    #[test]
    fn test_wide_source_is_clamped_to_a_third() {
        let rows = rasterise(&solid(300, 300, RED), 30, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.cells.len() == 10));
    }

    #[test]
    fn test_narrow_source_is_not_upscaled() {
        let rows = rasterise(&solid(5, 4, RED), 40, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.cells.len() == 5));
    }

    #[test]
    fn test_medium_source_fills_target() {
        // 60 px is wider than the 40 column target but under 3x.
        let rows = rasterise(&solid(60, 30, RED), 40, ColorDepth::TrueColor);
        assert!(rows.iter().all(|r| r.cells.len() == 40));
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn test_odd_height_pads_last_row() {
        let rows = rasterise(&solid(3, 3, RED), 40, ColorDepth::TrueColor);
        assert_eq!(rows.len(), 2);
        for cell in &rows[1].cells {
            assert_eq!(cell.symbol, UPPER_HALF);
            assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
            assert_eq!(cell.bg, Color::Reset);
        }
    }

    #[test]
    fn test_transparent_cells_become_spaces() {
        let rows = rasterise(&solid(2, 2, CLEAR), 40, ColorDepth::TrueColor);
        assert!(rows[0]
            .cells
            .iter()
            .all(|c| c.symbol == " " && c.bg == Color::Reset));
    }

    #[test]
    fn test_transparent_top_uses_lower_half() {
        let mut img = RgbaImage::from_pixel(1, 2, CLEAR);
        img.put_pixel(0, 1, RED);
        let rows = rasterise(&DynamicImage::ImageRgba8(img), 40, ColorDepth::TrueColor);
        let cell = &rows[0].cells[0];
        assert_eq!(cell.symbol, LOWER_HALF);
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Reset);
    }

    #[test]
    fn test_rows_never_exceed_target_width() {
        for (w, h) in [(1, 1), (7, 3), (45, 45), (121, 10), (1000, 2)] {
            for target in [2, 3, 17, 40] {
                let rows = rasterise(&solid(w, h, RED), target, ColorDepth::Ansi256);
                assert!(
                    rows.iter().all(|r| r.width() <= target),
                    "{w}x{h} at {target} overflowed"
                );
            }
        }
    }

    #[test]
    fn test_mono_uses_two_colours() {
        let img = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        });
        let rows = rasterise(&DynamicImage::ImageRgba8(img), 40, ColorDepth::Mono);
        for cell in rows.iter().flat_map(|r| &r.cells) {
            assert!(matches!(cell.fg, Color::White | Color::Black));
            assert!(matches!(cell.bg, Color::White | Color::Black));
        }
    }

    #[test]
    fn test_error_row_clips_to_width() {
        assert_eq!(error_row(6).text(), "Failed");
        assert_eq!(error_row(80).text(), ERROR_TEXT);
    }

    #[test]
    fn test_effective_width() {
        assert_eq!(effective_width(300, 30), 10);
        assert_eq!(effective_width(90, 30), 30);
        assert_eq!(effective_width(10, 30), 10);
        assert_eq!(effective_width(100, 2), 1);
    }
}
