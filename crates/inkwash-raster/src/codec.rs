//! PNG and data-URL codecs for raster snapshots.
//!
//! Snapshots travel as PNG blobs: compact enough to persist, and directly
//! usable by hosts as `data:image/png;base64,` URLs. Decoding accepts any
//! raster format the `image` crate is built with, so saved JPEG imports
//! load the same way.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use inkwash_engine::paint::RasterImage;
use thiserror::Error;

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Image decoding failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Not an image data URL")]
    NotADataUrl,
    #[error("Decoded buffer does not match its dimensions")]
    Malformed,
}

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode a snapshot as a PNG blob.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, CodecError> {
    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.pixels())?;
    }
    Ok(data)
}

/// Decode an image blob (PNG, JPEG) back into a snapshot.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, CodecError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::from_pixels(width, height, rgba.into_vec()).ok_or(CodecError::Malformed)
}

/// Encode a snapshot as a `data:image/png;base64,` URL.
pub fn to_data_url(image: &RasterImage) -> Result<String, CodecError> {
    let png = encode_png(image)?;
    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Decode an image data URL back into a snapshot.
pub fn from_data_url(url: &str) -> Result<RasterImage, CodecError> {
    let Some((header, payload)) = url.split_once(";base64,") else {
        return Err(CodecError::NotADataUrl);
    };
    if !header.starts_with("data:image/") {
        return Err(CodecError::NotADataUrl);
    }
    let bytes = STANDARD.decode(payload)?;
    decode_image(&bytes)
}
