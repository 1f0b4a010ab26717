//! Hand-built `multipart/form-data` bodies for media upload.
//!
//! The WeChat material endpoints expect RFC 2388 multipart bodies. Bodies
//! are assembled as raw byte buffers: textual preamble and headers are
//! encoded as UTF-8 and concatenated with the payload bytes untouched, so
//! arbitrary binary content survives exactly.

use std::fmt::Display;
use std::str::FromStr;

use rand::RngExt;

use crate::error::WechatError;

/// Extension to MIME type, for the formats the platform accepts.
const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mp3", "audio/mpeg"),
    ("wma", "audio/x-ms-wma"),
    ("wav", "audio/wav"),
    ("amr", "audio/amr"),
];

/// Look up the MIME type for a file extension.
#[must_use]
pub fn mime_for_extension(ext: &str) -> &'static str {
    let ext = ext.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map_or("application/octet-stream", |(_, mime)| mime)
}

/// Kind of permanent material the platform accepts.
///
/// Anything else is rejected before a single body byte is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// In-article image, uploaded as PNG.
    Image,
    /// Video material, uploaded as MP4 with a JSON description part.
    Video,
    /// Voice material, uploaded as WebM.
    Voice,
    /// Cover thumbnail, uploaded as JPG.
    Thumb,
}

impl UploadKind {
    /// Query-string value for the upload endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Video => "video",
            UploadKind::Voice => "voice",
            UploadKind::Thumb => "thumb",
        }
    }

    /// File extension the platform requires for this kind.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            UploadKind::Image => "png",
            UploadKind::Video => "mp4",
            UploadKind::Voice => "webm",
            UploadKind::Thumb => "jpg",
        }
    }
}

impl FromStr for UploadKind {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(UploadKind::Image),
            "video" => Ok(UploadKind::Video),
            "voice" => Ok(UploadKind::Voice),
            "thumb" => Ok(UploadKind::Thumb),
            other => Err(WechatError::UnsupportedKind(other.to_owned())),
        }
    }
}

impl Display for UploadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `multipart/form-data` body under construction.
///
/// Parts are emitted in insertion order. The boundary is chosen once per
/// body with enough random bits that a collision with part content is not a
/// practical concern, and is never reused across bodies.
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartBody {
    /// Create a body with a freshly generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(format!(
            "----WepressFormBoundary{:016x}",
            rand::rng().random::<u64>()
        ))
    }

    /// Create a body with a caller-chosen boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
        }
    }

    /// The boundary token in use.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a plain text field.
    pub fn text_part(&mut self, name: &str, value: &str) {
        self.open_part();
        self.buf.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Append a file field with its payload bytes verbatim.
    pub fn file_part(&mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) {
        self.open_part();
        self.buf.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        self.buf
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Close the body and return the wire bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buf
    }

    fn open_part(&mut self) {
        self.buf
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the upload body for a piece of material.
///
/// The file is named `{name}.{ext}` with the extension fixed by the kind.
/// Video uploads carry a leading `description` part with a JSON
/// `{title, introduction}` blob, as the platform requires.
#[must_use]
pub fn material_body(kind: UploadKind, name: &str, payload: &[u8]) -> MultipartBody {
    let mut body = MultipartBody::new();
    append_material(&mut body, kind, name, payload);
    body
}

/// Append the material parts to an existing body (testable with a fixed
/// boundary).
pub fn append_material(body: &mut MultipartBody, kind: UploadKind, name: &str, payload: &[u8]) {
    if kind == UploadKind::Video {
        let description =
            serde_json::json!({ "title": name, "introduction": "uploaded by wepress" });
        body.text_part("description", &description.to_string());
    }
    let ext = kind.extension();
    let filename = format!("{name}.{ext}");
    body.file_part("media", &filename, mime_for_extension(ext), payload);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_file_body_is_byte_exact() {
        let mut body = MultipartBody::with_boundary("B1");
        body.file_part("media", "cover.png", "image/png", &[0x89, 0x50, 0x4e, 0x47]);
        let bytes = body.finish();

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--B1\r\nContent-Disposition: form-data; name=\"media\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n",
        );
        expected.extend_from_slice(&[0x89, 0x50, 0x4e, 0x47]);
        expected.extend_from_slice(b"\r\n--B1--\r\n");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_binary_payload_not_reencoded() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let mut body = MultipartBody::with_boundary("B2");
        body.file_part("media", "blob.png", "image/png", &payload);
        let bytes = body.finish();

        let start = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("header end")
            + 4;
        assert_eq!(&bytes[start..start + 256], &payload[..]);
    }

    #[test]
    fn test_video_body_has_leading_description_part() {
        let mut body = MultipartBody::with_boundary("B3");
        append_material(&mut body, UploadKind::Video, "talk", b"\x00\x01");
        let bytes = body.finish();
        let text = String::from_utf8_lossy(&bytes);

        let description = text.find("name=\"description\"").expect("description part");
        let media = text.find("name=\"media\"").expect("media part");
        assert!(description < media);
        assert!(text.contains(r#""title":"talk""#));
        assert!(text.contains("filename=\"talk.mp4\""));
        assert!(text.contains("Content-Type: video/mp4"));
    }

    #[test]
    fn test_kind_extensions() {
        assert_eq!(UploadKind::Image.extension(), "png");
        assert_eq!(UploadKind::Video.extension(), "mp4");
        assert_eq!(UploadKind::Voice.extension(), "webm");
        assert_eq!(UploadKind::Thumb.extension(), "jpg");
    }

    #[test]
    fn test_unsupported_kind_rejected() {
        let err = "sticker".parse::<UploadKind>().unwrap_err();
        assert!(matches!(err, WechatError::UnsupportedKind(k) if k == "sticker"));
    }

    #[test]
    fn test_text_part_wire_format() {
        let mut body = MultipartBody::with_boundary("B4");
        body.text_part("comment", "hello");
        assert_eq!(
            body.finish(),
            b"--B4\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nhello\r\n--B4--\r\n"
        );
    }

    #[test]
    fn test_generated_boundaries_differ() {
        let a = MultipartBody::new();
        let b = MultipartBody::new();
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.boundary().starts_with("----WepressFormBoundary"));
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for_extension("png"), "image/png");
        assert_eq!(mime_for_extension("JPG"), "image/jpeg");
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
    }
}
