use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::StorageError;

/// Image formats accepted for recipe pictures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn from_mime_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Whether `bytes` begin with this format's file signature.
    fn matches_signature(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF8"),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }
}

/// A decoded image ready to be stored.
#[derive(Debug)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<fmt>;base64,<payload>` URI.
///
/// The decoded payload must carry the signature of the declared format and stay
/// within `max_size` bytes.
pub fn decode_data_uri(input: &str, max_size: u64) -> Result<DecodedImage, StorageError> {
    let rest = input
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| StorageError::InvalidImage("expected a data:image/... URI".into()))?;

    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| StorageError::InvalidImage("image must be base64 encoded".into()))?;

    let format = ImageFormat::from_mime_subtype(subtype).ok_or_else(|| {
        StorageError::InvalidImage(format!("unsupported image type '{subtype}'"))
    })?;

    // base64 inflates by 4/3; reject oversized payloads before decoding them.
    let estimated = (payload.len() as u64 / 4) * 3;
    if estimated > max_size + 3 {
        return Err(StorageError::SizeLimitExceeded {
            actual: estimated,
            limit: max_size,
        });
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| StorageError::InvalidImage(format!("invalid base64: {e}")))?;

    if bytes.len() as u64 > max_size {
        return Err(StorageError::SizeLimitExceeded {
            actual: bytes.len() as u64,
            limit: max_size,
        });
    }
    if !format.matches_signature(&bytes) {
        return Err(StorageError::InvalidImage(format!(
            "content is not a valid {} image",
            format.extension()
        )));
    }

    Ok(DecodedImage { format, bytes })
}
