use serde::{Deserialize, Serialize};

/// Media types the pipeline accepts.
///
/// Uploads are classified by declared media type, not by content; the
/// magic-byte sniff exists only for path-based construction when the
/// extension gives no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Pdf,
    Jpeg,
    Png,
}

impl MediaType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Parse a declared MIME string. Tolerates the common `image/jpg`
    /// misspelling; anything else is unsupported.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Detect a supported format from magic bytes.
    /// Magic bytes don't lie — extensions can be wrong.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            // PDF: starts with %PDF
            [0x25, 0x50, 0x44, 0x46, ..] => Some(Self::Pdf),
            // JPEG: starts with FF D8 FF
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            // PNG: starts with 89 50 4E 47
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            _ => None,
        }
    }
}

/// One uploaded health-report document.
///
/// Transient: exists only for the duration of a single pipeline run.
/// Validation against the supported-type and size rules happens in
/// `pipeline::intake`, before any network call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub filename: String,
}

impl UploadedDocument {
    pub fn new(bytes: Vec<u8>, media_type: MediaType, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type,
            filename: filename.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A document rendered as a data URL, ready to embed in a request body.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    pub data_url: String,
    pub media_type: MediaType,
    pub filename: String,
}
