use base64::Engine as _;
use std::path::Path;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}

/// Encode raw image bytes as a `data:<mime>;base64,` URI.
pub fn image_to_data_uri(bytes: &[u8]) -> String {
    let mime = detect_image_mime(bytes);
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}

/// Read an image file and encode it as a data URI.
pub fn load_image_data_uri(path: &Path) -> crate::Result<String> {
    let bytes = std::fs::read(path)?;
    tracing::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(image_to_data_uri(&bytes))
}

/// Prefix bare base64 with a JPEG data-URI scheme; data URIs pass through.
pub fn ensure_data_uri(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("{}{}", JPEG_DATA_URI_PREFIX, image)
    }
}
