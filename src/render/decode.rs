//! Raster image decoding.

use image::DynamicImage;

use crate::error::{CellchatError, Result};

/// Turns encoded image bytes into pixels.
///
/// Attachments hold one of these so the decoder can be swapped out, e.g. to
/// count invocations in tests.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;
}

/// Decoder backed by the `image` crate, with the format guessed from the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(CellchatError::Decode("no image data".to_string()));
        }
        Ok(image::load_from_memory(bytes)?)
    }
}
