//! # Signature Images
//!
//! Reads signature image sources and turns the bytes into something the PDF
//! writer can embed. JPEG data is decoded once to prove the scan data is
//! intact, then embedded as-is under DCTDecode. PNG and WebP are decoded to
//! RGB with a separate alpha plane that becomes the image's soft mask.
//!
//! Decoding happens before the signature row is laid out: a signer whose
//! bytes don't decode never gets a slot.

use std::io::Cursor;

use base64::Engine as _;
use thiserror::Error;

/// Why a signature source couldn't be read or decoded.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("malformed data URI (no ',' separator)")]
    MalformedDataUri,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("image has no pixels")]
    Empty,
    #[error("{0}")]
    Decode(#[from] image::ImageError),
}

/// A signature ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Untouched JPEG stream.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// 8-bit RGB samples, plus an alpha plane unless every pixel is opaque.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Jpeg,
    Png,
    WebP,
}

impl Format {
    fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0xFF, 0xD8, ..] => Some(Format::Jpeg),
            [0x89, b'P', b'N', b'G', ..] => Some(Format::Png),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Format::WebP),
            _ => None,
        }
    }
}

/// Resolve a `signatureSrc` value to raw bytes.
///
/// Accepts a `data:` URI, a file path starting with `/`, `./` or `../`, or
/// bare base64. Anything else is read as base64, since base64 text may
/// itself contain `/`.
pub fn read_source_bytes(src: &str) -> Result<Vec<u8>, ImageError> {
    if let Some(uri) = src.strip_prefix("data:") {
        let (_, payload) = uri.split_once(',').ok_or(ImageError::MalformedDataUri)?;
        return decode_base64(payload);
    }
    if ["/", "./", "../"].iter().any(|p| src.starts_with(p)) {
        return std::fs::read(src).map_err(|source| ImageError::Io {
            path: src.to_string(),
            source,
        });
    }
    decode_base64(src)
}

fn decode_base64(text: &str) -> Result<Vec<u8>, ImageError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(text.trim())?)
}

/// Decode signature bytes, detecting the format from the leading bytes.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, ImageError> {
    match Format::sniff(data).ok_or(ImageError::UnknownFormat)? {
        Format::Jpeg => load_jpeg(data),
        Format::Png | Format::WebP => load_raster(data),
    }
}

/// The decoded pixels are thrown away; only the original stream is kept.
fn load_jpeg(data: &[u8]) -> Result<LoadedImage, ImageError> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?;
    let (width_px, height_px) = (decoded.width(), decoded.height());
    if width_px == 0 || height_px == 0 {
        return Err(ImageError::Empty);
    }
    let color_space = match jpeg_components(data) {
        Some(1) => JpegColorSpace::DeviceGray,
        _ => JpegColorSpace::DeviceRGB,
    };
    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space,
        },
        width_px,
        height_px,
    })
}

/// Component count from the first start-of-frame segment.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while let [0xFF, marker, len_hi, len_lo, ..] = *data.get(pos..)? {
        // SOF0..SOF15 minus DHT (C4), JPG (C8) and DAC (CC).
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return data.get(pos + 9).copied();
        }
        pos += 2 + u16::from_be_bytes([len_hi, len_lo]) as usize;
    }
    None
}

fn load_raster(data: &[u8]) -> Result<LoadedImage, ImageError> {
    let rgba = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.into()))?
        .decode()?
        .into_rgba8();
    let (width_px, height_px) = rgba.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(ImageError::Empty);
    }

    let pixels = rgba.as_raw();
    let rgb: Vec<u8> = pixels.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
    let alpha: Vec<u8> = pixels.chunks_exact(4).map(|p| p[3]).collect();
    let alpha = alpha.iter().any(|&a| a < u8::MAX).then_some(alpha);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px,
        height_px,
    })
}
