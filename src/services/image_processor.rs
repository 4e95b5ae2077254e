// src/services/image_processor.rs
use crate::errors::SafeclickError;
use crate::models::ImageAttachment;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat};
use log::debug;

const MAX_SOURCE_DIMENSION: u32 = 4096;
// Inline parts travel base64-encoded inside a ~20MB request; keep the raw
// bytes well under that after the ~33% encoding overhead.
pub const MAX_INLINE_BYTES: usize = 12_000_000;

pub struct ImageProcessor {
    max_dimension: u32,
    inline_limit: usize,
}

impl ImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            inline_limit: MAX_INLINE_BYTES,
        }
    }

    /// Overrides the raw-byte ceiling for a single inline image part.
    pub fn with_inline_limit(mut self, inline_limit: usize) -> Self {
        self.inline_limit = inline_limit;
        self
    }

    /// Splits a `data:<mime>;base64,<payload>` URL into bytes and declared type.
    pub fn decode_data_url(&self, data_url: &str) -> Result<(Vec<u8>, Option<String>), SafeclickError> {
        let trimmed = data_url.trim();
        let (header, payload) = match trimmed.split_once(',') {
            Some((header, payload)) if header.starts_with("data:") => (Some(header), payload),
            Some(_) => {
                return Err(SafeclickError::ImageProcessing(
                    "Image must be a data URL or raw base64".to_string(),
                ));
            }
            None => (None, trimmed),
        };

        let declared_type = match header {
            Some(header) => {
                let meta = header
                    .trim_start_matches("data:")
                    .strip_suffix(";base64")
                    .ok_or_else(|| {
                        SafeclickError::ImageProcessing(
                            "Only base64 data URLs are supported".to_string(),
                        )
                    })?;
                meta.split(';')
                    .next()
                    .map(str::trim)
                    .filter(|mime| !mime.is_empty())
                    .map(str::to_string)
            }
            None => None,
        };

        let data = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| SafeclickError::ImageProcessing(format!("Failed to decode image: {}", e)))?;
        Ok((data, declared_type))
    }

    /// Validates the image and shapes it into something the remote model accepts.
    /// The attachment's media type is taken from the bytes, not the declaration.
    pub fn prepare(&self, data: &[u8], declared_type: Option<&str>) -> Result<ImageAttachment, SafeclickError> {
        if data.is_empty() {
            return Err(SafeclickError::ImageProcessing("Image is empty".to_string()));
        }

        let format = image::guess_format(data)
            .map_err(|e| SafeclickError::ImageProcessing(format!("Unrecognized image format: {}", e)))?;
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| SafeclickError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();
        if width > MAX_SOURCE_DIMENSION || height > MAX_SOURCE_DIMENSION {
            return Err(SafeclickError::ImageProcessing(format!(
                "Image dimensions exceed {}x{}",
                MAX_SOURCE_DIMENSION, MAX_SOURCE_DIMENSION
            )));
        }

        if let Some(declared) = declared_type {
            if passthrough_mime(format) != Some(declared) {
                debug!("Declared image type {} differs from sniffed {:?}", declared, format);
            }
        }

        let needs_resize = width > self.max_dimension || height > self.max_dimension;
        let attachment = match passthrough_mime(format) {
            Some(mime) if !needs_resize => ImageAttachment {
                data: data.to_vec(),
                media_type: mime.to_string(),
            },
            _ => {
                let img = if needs_resize {
                    shrink_to(&img, self.max_dimension)
                } else {
                    img
                };
                let target = if format == ImgFormat::Jpeg {
                    ImgFormat::Jpeg
                } else {
                    ImgFormat::Png
                };
                encode(&img, target)?
            }
        };

        self.fit_inline_budget(attachment)
    }

    fn fit_inline_budget(&self, attachment: ImageAttachment) -> Result<ImageAttachment, SafeclickError> {
        if attachment.data.len() <= self.inline_limit {
            return Ok(attachment);
        }

        let img = image::load_from_memory(&attachment.data)
            .map_err(|e| SafeclickError::ImageProcessing(format!("Failed to load image: {}", e)))?;
        let (width, height) = img.dimensions();

        let scale = ((self.inline_limit as f64 / attachment.data.len() as f64).sqrt() * 0.9) as f32;
        let longest = ((width.max(height) as f32 * scale) as u32).max(256);
        let shrunk = shrink_to(&img, longest);

        let reencoded = encode(&shrunk, ImgFormat::Jpeg)?;
        if reencoded.data.len() > self.inline_limit {
            return Err(SafeclickError::ImageProcessing(
                "Image is too large to attach".to_string(),
            ));
        }
        Ok(reencoded)
    }
}

fn passthrough_mime(format: ImgFormat) -> Option<&'static str> {
    match format {
        ImgFormat::Png => Some("image/png"),
        ImgFormat::Jpeg => Some("image/jpeg"),
        ImgFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

fn shrink_to(img: &DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let ratio = (max_side as f32 / width.max(height) as f32).min(1.0);
    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);
    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn encode(img: &DynamicImage, format: ImgFormat) -> Result<ImageAttachment, SafeclickError> {
    let mut output = Vec::new();
    let result = match format {
        ImgFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Jpeg),
        other => img.write_to(&mut std::io::Cursor::new(&mut output), other),
    };
    result.map_err(|e| SafeclickError::ImageProcessing(format!("Failed to encode image: {}", e)))?;

    let media_type = passthrough_mime(format).unwrap_or("image/png").to_string();
    Ok(ImageAttachment {
        data: output,
        media_type,
    })
}
