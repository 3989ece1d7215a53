//! AVIF and HEIF: ISO base media files told apart by their `ftyp` brands.
//!
//! Sizes come from the `ispe` property via `imagesize`.

use super::{measure, Detection, ImageFormat};

const AVIF_BRANDS: &[&[u8; 4]] = &[b"avif", b"avis"];
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Major brand first, then compatible brands. Any AVIF brand wins, since
/// AVIF files usually also list `mif1`.
fn brand_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.get(4..8)? != b"ftyp" {
        return None;
    }
    let box_len = u32::from_be_bytes(bytes.get(0..4)?.try_into().ok()?) as usize;
    let end = box_len.min(bytes.len());
    let major = bytes.get(8..12)?;
    let compatible = bytes.get(16..end).unwrap_or(&[]).chunks_exact(4);
    let brands: Vec<&[u8]> = std::iter::once(major).chain(compatible).collect();

    if brands.iter().any(|b| AVIF_BRANDS.iter().any(|a| a[..] == **b)) {
        Some(ImageFormat::Avif)
    } else if brands.iter().any(|b| HEIF_BRANDS.iter().any(|h| h[..] == **b)) {
        Some(ImageFormat::Heif)
    } else {
        None
    }
}

pub(crate) fn detect(bytes: &[u8]) -> Detection {
    let format = brand_format(bytes)?;
    Some(measure(bytes, format))
}
