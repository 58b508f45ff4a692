use image::ImageFormat;

use crate::error::SentimentError;

/// Downloaded post image that has been verified to decode.
#[derive(Debug, Clone)]
pub struct PostImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl PostImage {
    /// Decodes `bytes`, keeping the original encoding for upload to the
    /// classifier.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ImageDecode`] if the format is not
    /// recognised or the pixel data does not decode.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, SentimentError> {
        let format = image::guess_format(&bytes)
            .map_err(|e| SentimentError::ImageDecode(format!("unrecognised format: {e}")))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| SentimentError::ImageDecode(e.to_string()))?;

        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            format,
            bytes,
        })
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Encodes a small solid PNG. Shared by tests across the crate.
#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 30, 30]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}
