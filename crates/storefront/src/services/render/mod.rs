//! Server-side rendering of designs and product previews to PNG.
//!
//! # Modules
//!
//! - [`plan`] - Top-down 2D plan of a design at canvas resolution
//! - [`perspective`] - Z-buffered, Lambert-shaded rasterizer for 3D scenes

pub mod perspective;
pub mod plan;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

pub use perspective::render_scene;
pub use plan::render_plan;

/// Width of rendered 3D frames.
pub const FRAME_WIDTH: u32 = 800;
/// Height of rendered 3D frames.
pub const FRAME_HEIGHT: u32 = 600;

/// Largest accepted background image, in encoded bytes.
pub const MAX_BACKGROUND_BYTES: usize = 5 * 1024 * 1024;

/// Errors produced while rendering or encoding an image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("frame has zero size")]
    Dimensions,
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Encode an RGBA raster as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] if the encoder rejects the buffer.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::Dimensions);
    }

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(out)
}

/// Decode an uploaded image (PNG or JPEG) into RGBA.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] for unsupported or corrupt data.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    let image =
        image::load_from_memory(bytes).map_err(|err| RenderError::Decode(err.to_string()))?;
    Ok(image.to_rgba8())
}

/// Build a `data:` URL for an uploaded image after checking it decodes.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the bytes are not a supported image.
pub fn image_data_url(bytes: &[u8]) -> Result<String, RenderError> {
    let format =
        image::guess_format(bytes).map_err(|err| RenderError::Decode(err.to_string()))?;
    decode_image(bytes)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Split a `data:<mime>;base64,<payload>` URL produced by [`image_data_url`]
/// into its MIME type and decoded bytes.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the URL is malformed.
pub fn split_data_url(url: &str) -> Result<(String, Vec<u8>), RenderError> {
    let (mime, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .ok_or_else(|| RenderError::Decode("not a base64 data URL".to_string()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| RenderError::Decode(err.to_string()))?;
    Ok((mime.to_string(), bytes))
}

/// Decode the image in a `data:` URL produced by [`image_data_url`].
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the URL is malformed or the payload is
/// not a supported image.
pub fn decode_data_url(url: &str) -> Result<RgbaImage, RenderError> {
    let (_, bytes) = split_data_url(url)?;
    decode_image(&bytes)
}
