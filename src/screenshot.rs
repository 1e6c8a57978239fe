//! Page screenshots
//!
//! Each page image is cut into three full-width overlapping bands (top half,
//! middle half, bottom half). Every band is PNG-encoded and base64-encoded on
//! its own.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use thiserror::Error;

/// Bands produced per page
pub const BAND_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("Failed to encode screenshot for page {page}: {message}")]
    Encode { page: usize, message: String },

    #[error("Task join error: {0}")]
    Join(String),
}

/// Encoded bands for one page (1-indexed)
#[derive(Debug, Clone, Serialize)]
pub struct PageScreenshots {
    pub page: usize,
    pub screenshots: Vec<String>,
}

/// Crop vertical spans `[0, h/2)`, `[h/4, 3h/4)` and `[h/2, h)`
pub fn crop_bands(image: &DynamicImage) -> [DynamicImage; BAND_COUNT] {
    let (width, height) = image.dimensions();
    let half = height / 2;
    let quarter = height / 4;
    let three_quarters = 3 * height / 4;

    [
        image.crop_imm(0, 0, width, half),
        image.crop_imm(0, quarter, width, three_quarters - quarter),
        image.crop_imm(0, half, width, height - half),
    ]
}

/// PNG-encode an image and return it as standard base64
pub fn encode_png_base64(image: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(BASE64.encode(&buffer))
}

/// Crop and encode a single page
pub fn screenshot_page(page: usize, image: &DynamicImage) -> Result<PageScreenshots, ScreenshotError> {
    let screenshots = crop_bands(image)
        .iter()
        .map(encode_png_base64)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ScreenshotError::Encode {
            page,
            message: e.to_string(),
        })?;

    Ok(PageScreenshots { page, screenshots })
}

/// Crop and encode every page, numbering from 1
pub async fn screenshot_pages(
    images: Vec<DynamicImage>,
) -> Result<Vec<PageScreenshots>, ScreenshotError> {
    tokio::task::spawn_blocking(move || {
        images
            .iter()
            .enumerate()
            .map(|(index, image)| screenshot_page(index + 1, image))
            .collect()
    })
    .await
    .map_err(|e| ScreenshotError::Join(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Image whose pixel rows encode their own y coordinate
    fn striped(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, y| {
            Rgb([(y % 256) as u8, (y / 256) as u8, 0])
        }))
    }

    fn row_of(image: &DynamicImage, y: u32) -> u32 {
        let pixel = image.to_rgb8().get_pixel(0, y).0;
        pixel[0] as u32 + pixel[1] as u32 * 256
    }

    #[test]
    fn test_crop_band_dimensions() {
        let image = striped(120, 400);
        let bands = crop_bands(&image);

        assert_eq!(bands.len(), 3);
        for band in &bands {
            assert_eq!(band.width(), 120);
            assert_eq!(band.height(), 200);
        }
    }

    #[test]
    fn test_crop_band_offsets_overlap() {
        let image = striped(10, 400);
        let [top, middle, bottom] = crop_bands(&image);

        assert_eq!(row_of(&top, 0), 0);
        assert_eq!(row_of(&middle, 0), 100);
        assert_eq!(row_of(&bottom, 0), 200);

        // Top and bottom meet without overlapping; middle straddles both
        assert_eq!(row_of(&top, top.height() - 1) + 1, row_of(&bottom, 0));
        assert!(row_of(&middle, 0) < row_of(&top, top.height() - 1));
        assert!(row_of(&middle, middle.height() - 1) > row_of(&bottom, 0));
    }

    #[test]
    fn test_odd_height_covers_whole_page() {
        let image = striped(8, 101);
        let [top, _, bottom] = crop_bands(&image);

        assert_eq!(top.height() + bottom.height(), 101);
    }

    #[test]
    fn test_encoded_band_decodes_to_matching_png() {
        let image = striped(64, 48);
        let page = screenshot_page(1, &image).unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.screenshots.len(), BAND_COUNT);

        let bytes = BASE64.decode(&page.screenshots[1]).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (64, 24));
        assert_eq!(row_of(&decoded, 0), 12);
    }

    #[tokio::test]
    async fn test_screenshot_pages_numbering() {
        let pages = screenshot_pages(vec![striped(8, 8), striped(8, 8)]).await.unwrap();

        assert_eq!(pages.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2]);
        assert!(pages.iter().all(|p| p.screenshots.len() == BAND_COUNT));
    }
}
