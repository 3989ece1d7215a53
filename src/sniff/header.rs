//! Formats identified and measured entirely by `imagesize`.

use super::{measure, Detection, ImageFormat};
use imagesize::ImageType;

/// The reported format for an `imagesize` type, or `None` for types this
/// handler does not report.
fn format_of(ty: ImageType) -> Option<ImageFormat> {
    let format = match ty {
        ImageType::Png => ImageFormat::Png,
        ImageType::Gif => ImageFormat::Gif,
        ImageType::Jpeg => ImageFormat::Jpeg,
        ImageType::Webp => ImageFormat::WebP,
        ImageType::Bmp => ImageFormat::Bmp,
        ImageType::Ico => ImageFormat::Ico,
        ImageType::Tiff => ImageFormat::Tiff,
        ImageType::Psd => ImageFormat::Psd,
        ImageType::Jxl => ImageFormat::Jxl,
        ImageType::Tga => ImageFormat::Tga,
        ImageType::Dds => ImageFormat::Dds,
        ImageType::Ktx2 => ImageFormat::Ktx2,
        ImageType::Pnm => ImageFormat::Pnm,
        ImageType::Qoi => ImageFormat::Qoi,
        ImageType::Exr => ImageFormat::Exr,
        ImageType::Hdr => ImageFormat::Hdr,
        _ => return None,
    };
    Some(format)
}

pub(crate) fn detect(bytes: &[u8]) -> Detection {
    let format = imagesize::image_type(bytes).ok().and_then(format_of)?;
    Some(measure(bytes, format))
}
