//! Frame-count inspection for fetched image bytes.

use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::AnimationDecoder;
use std::io::Cursor;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Formats that can carry animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatableFormat {
    /// GIF87a / GIF89a.
    Gif,
    /// RIFF WebP container.
    WebP,
    /// PNG, possibly APNG.
    Png,
}

impl AnimatableFormat {
    /// Detects the format from magic bytes.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.starts_with(&PNG_SIGNATURE) {
            return Some(Self::Png);
        }
        None
    }
}

/// Image inspection failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not a GIF, WebP, or PNG.
    #[error("unrecognised image format")]
    UnknownFormat,

    /// The decoder rejected the payload.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// A PNG chunk header ran past the end of the payload.
    #[error("truncated PNG chunk")]
    TruncatedPng,
}

/// Returns true if `data` decodes to more than one frame.
///
/// Only the first two GIF frames are decoded.
///
/// # Errors
///
/// Returns a [`DecodeError`] for unknown or corrupt payloads.
pub fn is_animated(data: &[u8]) -> Result<bool, DecodeError> {
    match AnimatableFormat::sniff(data).ok_or(DecodeError::UnknownFormat)? {
        AnimatableFormat::Gif => {
            let decoder = GifDecoder::new(Cursor::new(data))?;
            let mut frames = 0;
            for frame in decoder.into_frames().take(2) {
                frame?;
                frames += 1;
            }
            Ok(frames > 1)
        }
        AnimatableFormat::WebP => Ok(WebPDecoder::new(Cursor::new(data))?.has_animation()),
        AnimatableFormat::Png => apng_frame_count(data).map(|n| n > 1),
    }
}

/// Reads `num_frames` from the `acTL` chunk, which must precede `IDAT`.
fn apng_frame_count(data: &[u8]) -> Result<u32, DecodeError> {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        let kind = &data[pos + 4..pos + 8];
        let body = pos + 8;
        match kind {
            b"acTL" => {
                let bytes = data.get(body..body + 4).ok_or(DecodeError::TruncatedPng)?;
                return Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
            }
            b"IDAT" | b"IEND" => return Ok(1),
            _ => {}
        }
        let len = usize::try_from(len).map_err(|_| DecodeError::TruncatedPng)?;
        pos = body
            .checked_add(len)
            .and_then(|p| p.checked_add(4))
            .ok_or(DecodeError::TruncatedPng)?;
    }
    Err(DecodeError::TruncatedPng)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, RgbaImage};

    pub(crate) fn gif_with_frames(count: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buf);
            let frames = (0..count).map(|i| {
                let shade = u8::try_from(i * 40 % 256).unwrap();
                Frame::new(RgbaImage::from_pixel(2, 2, image::Rgba([shade, 0, 0, 255])))
            });
            encoder.encode_frames(frames).unwrap();
        }
        buf
    }

    fn png_chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = u32::try_from(body.len()).unwrap().to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(AnimatableFormat::sniff(b"GIF89a...."), Some(AnimatableFormat::Gif));
        assert_eq!(AnimatableFormat::sniff(b"RIFF\0\0\0\0WEBPVP8X"), Some(AnimatableFormat::WebP));
        assert_eq!(AnimatableFormat::sniff(&PNG_SIGNATURE), Some(AnimatableFormat::Png));
        assert_eq!(AnimatableFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), None);
    }

    #[test]
    fn multi_frame_gif_is_animated() {
        assert!(is_animated(&gif_with_frames(3)).unwrap());
    }

    #[test]
    fn single_frame_gif_is_static() {
        assert!(!is_animated(&gif_with_frames(1)).unwrap());
    }

    #[test]
    fn apng_frame_count_from_actl() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(png_chunk(b"IHDR", &[0; 13]));
        png.extend(png_chunk(b"acTL", &[0, 0, 0, 4, 0, 0, 0, 0]));
        png.extend(png_chunk(b"IDAT", &[]));
        assert!(is_animated(&png).unwrap());

        let mut still = PNG_SIGNATURE.to_vec();
        still.extend(png_chunk(b"IHDR", &[0; 13]));
        still.extend(png_chunk(b"IDAT", &[]));
        assert!(!is_animated(&still).unwrap());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(is_animated(b"hello"), Err(DecodeError::UnknownFormat)));
        assert!(is_animated(b"GIF89a\x01").is_err());
    }
}
