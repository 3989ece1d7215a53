//! Image format sniffing: format and pixel dimensions from header bytes only.
//!
//! Detectors are tried in order; a detector returns `None` when the signature
//! does not match and `Some(..)` once it has claimed the bytes, even if the
//! header turns out to be broken. Header parsing is delegated to `imagesize`,
//! so no pixel data is ever decoded.

mod cursor;
mod header;
mod isobmff;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Gif,
    #[serde(rename = "jpg")]
    Jpeg,
    WebP,
    Bmp,
    Ico,
    Cur,
    Tiff,
    Psd,
    Avif,
    Heif,
    Jxl,
    Tga,
    Dds,
    Ktx2,
    Pnm,
    Qoi,
    Exr,
    Hdr,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Ico => "ico",
            ImageFormat::Cur => "cur",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Psd => "psd",
            ImageFormat::Avif => "avif",
            ImageFormat::Heif => "heif",
            ImageFormat::Jxl => "jxl",
            ImageFormat::Tga => "tga",
            ImageFormat::Dds => "dds",
            ImageFormat::Ktx2 => "ktx2",
            ImageFormat::Pnm => "pnm",
            ImageFormat::Qoi => "qoi",
            ImageFormat::Exr => "exr",
            ImageFormat::Hdr => "hdr",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniffed image properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Why no metadata could be derived. Never fatal to the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SniffError {
    #[error("image data is empty")]
    Empty,
    #[error("unsupported image format")]
    Unsupported,
    #[error("truncated {format} data")]
    Truncated { format: ImageFormat },
    #[error("malformed {format} data: {reason}")]
    Malformed {
        format: ImageFormat,
        reason: &'static str,
    },
}

pub(crate) type Detection = Option<Result<ImageMetadata, SniffError>>;

type Detector = fn(&[u8]) -> Detection;

/// Tried in order. CUR goes before `header::detect`, whose TGA test would
/// otherwise claim its `00 00 02 00` signature.
const DETECTORS: &[Detector] = &[isobmff::detect, cursor::detect, header::detect];

/// Identify the image format of `bytes` and read its dimensions.
pub fn sniff(bytes: &[u8]) -> Result<ImageMetadata, SniffError> {
    if bytes.is_empty() {
        return Err(SniffError::Empty);
    }
    for detect in DETECTORS {
        if let Some(result) = detect(bytes) {
            return result;
        }
    }
    tracing::debug!(
        "no image signature matched, first bytes: {:02X?}",
        &bytes[..8.min(bytes.len())]
    );
    Err(SniffError::Unsupported)
}

/// Runs `imagesize` on bytes already attributed to `format`.
pub(crate) fn measure(bytes: &[u8], format: ImageFormat) -> Result<ImageMetadata, SniffError> {
    let size = imagesize::blob_size(bytes).map_err(|e| sniff_error(format, e))?;
    match (u32::try_from(size.width), u32::try_from(size.height)) {
        (Ok(width), Ok(height)) => dimensions(format, width, height),
        _ => Err(SniffError::Malformed {
            format,
            reason: "dimensions out of range",
        }),
    }
}

fn sniff_error(format: ImageFormat, e: imagesize::ImageError) -> SniffError {
    match e {
        imagesize::ImageError::NotSupported => SniffError::Unsupported,
        imagesize::ImageError::IoError(_) => SniffError::Truncated { format },
        _ => SniffError::Malformed {
            format,
            reason: "corrupted header",
        },
    }
}

/// Builds metadata, rejecting zero-sized images.
pub(crate) fn dimensions(
    format: ImageFormat,
    width: u32,
    height: u32,
) -> Result<ImageMetadata, SniffError> {
    if width == 0 || height == 0 {
        return Err(SniffError::Malformed {
            format,
            reason: "zero width or height",
        });
    }
    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}
