//! Image encoding: raw bytes or `DynamicImage` → base64 `ImageData`.
//!
//! Vision APIs accept images as base64 payloads embedded in the JSON
//! request body. Rendered PDF pages are always encoded as PNG — lossless
//! compression preserves text crispness, and JPEG artefacts on rendered
//! text measurably degrade what the model can read. Native images keep
//! their original bytes and declared MIME type; re-encoding them would
//! only lose quality.

use crate::pipeline::classify::ImageKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered PDF page as a base64 PNG ready for the vision API.
///
/// `detail: "high"` instructs GPT-4-class models to use the full image
/// tile budget; without it fine print and small tables are lost.
pub fn encode_rendered_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded rendered page → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

/// Wrap a native image file's bytes for the vision API, untouched.
pub fn encode_native_image(bytes: &[u8], kind: ImageKind) -> ImageData {
    let b64 = STANDARD.encode(bytes);
    debug!(
        "Encoded native {} image → {} bytes base64",
        kind.mime(),
        b64.len()
    );
    ImageData::new(b64, kind.mime()).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_rendered_page() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_rendered_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        assert!(!data.data.is_empty());
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn encode_native_preserves_bytes_and_mime() {
        let bytes = b"fake-gif-bytes";
        let data = encode_native_image(bytes, ImageKind::Gif);
        assert_eq!(data.mime_type, "image/gif");
        let decoded = STANDARD.decode(&data.data).unwrap();
        assert_eq!(decoded, bytes);
    }
}
