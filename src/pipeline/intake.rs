//! Upload validation and data-URL encoding.
//!
//! Everything here runs before the first network request: a document that
//! fails validation never costs an API call.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use super::PipelineError;
use crate::models::{EncodedDocument, MediaType, UploadedDocument};

/// Upload ceiling. Hosted vision endpoints reject larger payloads anyway
/// once base64 expansion is added on top.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Build a validated document from caller-supplied bytes.
///
/// The declared MIME type is authoritative: a concrete unsupported type
/// like `image/gif` is rejected as declared, whatever the bytes say.
/// Magic bytes only rescue vague declarations (some browsers send
/// `application/octet-stream` for everything).
pub fn accept(
    bytes: Vec<u8>,
    declared_mime: &str,
    filename: &str,
) -> Result<UploadedDocument, PipelineError> {
    let media_type = resolve_media_type(declared_mime, &bytes)
        .ok_or_else(|| PipelineError::UnsupportedType(declared_mime.to_string()))?;

    check_size(bytes.len() as u64)?;
    Ok(UploadedDocument::new(bytes, media_type, filename))
}

/// Read and validate a document from disk. The extension names the type;
/// magic bytes break ties for missing or unknown extensions.
pub async fn read_from_path(path: &Path) -> Result<UploadedDocument, PipelineError> {
    let bytes = tokio::fs::read(path).await?;

    let guessed = mime_guess::from_path(path).first_raw().unwrap_or("");
    let media_type = resolve_media_type(guessed, &bytes)
        .ok_or_else(|| PipelineError::UnsupportedType(guessed.to_string()))?;

    check_size(bytes.len() as u64)?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    Ok(UploadedDocument::new(bytes, media_type, filename))
}

/// Declared type first; sniffing only when the declaration says nothing.
fn resolve_media_type(declared: &str, bytes: &[u8]) -> Option<MediaType> {
    if let Some(media_type) = MediaType::from_mime(declared) {
        return Some(media_type);
    }
    if declared.trim().is_empty() || declared.trim() == "application/octet-stream" {
        return MediaType::sniff(bytes);
    }
    None
}

/// Re-check an already constructed document against the size rule.
/// The processor runs this so a hand-built document cannot skip the gate.
pub fn validate(doc: &UploadedDocument) -> Result<(), PipelineError> {
    check_size(doc.size())
}

fn check_size(size: u64) -> Result<(), PipelineError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(PipelineError::FileTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Encode a validated document as a `data:` URL for multimodal messages.
pub fn encode(doc: &UploadedDocument) -> EncodedDocument {
    let payload = STANDARD.encode(&doc.bytes);
    debug!(
        filename = %doc.filename,
        media_type = doc.media_type.as_mime(),
        bytes = doc.bytes.len(),
        "encoded document"
    );
    EncodedDocument {
        data_url: format!("data:{};base64,{}", doc.media_type.as_mime(), payload),
        media_type: doc.media_type,
        filename: doc.filename.clone(),
    }
}

/// Turn an uploaded filename into report-title material: drop the
/// extension, treat `_`/`-` as spaces, collapse runs of whitespace.
pub fn sanitize_filename(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    };
    stem.chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn accepts_declared_pdf() {
        let doc = accept(b"%PDF-1.4".to_vec(), "application/pdf", "report.pdf").unwrap();
        assert_eq!(doc.media_type, MediaType::Pdf);
        assert_eq!(doc.filename, "report.pdf");
    }

    #[test]
    fn falls_back_to_magic_bytes_for_octet_stream() {
        let doc = accept(PNG_MAGIC.to_vec(), "application/octet-stream", "scan.png").unwrap();
        assert_eq!(doc.media_type, MediaType::Png);
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = accept(b"GIF89a".to_vec(), "image/gif", "anim.gif").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedType(t) if t == "image/gif"));
    }

    #[test]
    fn concrete_unsupported_declaration_is_not_sniffed() {
        // PNG bytes under an unsupported declared type stay rejected
        let err = accept(PNG_MAGIC.to_vec(), "image/gif", "anim.gif").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedType(t) if t == "image/gif"));
    }

    #[test]
    fn rejects_oversized_file() {
        let bytes = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        let err = accept(bytes, "application/pdf", "big.pdf").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FileTooLarge { size, limit }
                if size == MAX_UPLOAD_BYTES + 1 && limit == MAX_UPLOAD_BYTES
        ));
    }

    #[test]
    fn accepts_file_exactly_at_limit() {
        let mut bytes = vec![0u8; MAX_UPLOAD_BYTES as usize];
        bytes[..4].copy_from_slice(b"%PDF");
        assert!(accept(bytes, "application/pdf", "edge.pdf").is_ok());
    }

    #[test]
    fn validate_rechecks_size() {
        let doc = UploadedDocument::new(
            vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize],
            MediaType::Pdf,
            "big.pdf",
        );
        assert!(matches!(
            validate(&doc),
            Err(PipelineError::FileTooLarge { .. })
        ));
        assert!(validate(&UploadedDocument::new(b"%PDF".to_vec(), MediaType::Pdf, "ok.pdf")).is_ok());
    }

    #[test]
    fn encodes_known_data_url() {
        let doc = UploadedDocument::new(b"%PDF-1.4".to_vec(), MediaType::Pdf, "r.pdf");
        let encoded = encode(&doc);
        assert_eq!(encoded.data_url, "data:application/pdf;base64,JVBERi0xLjQ=");
        assert_eq!(encoded.filename, "r.pdf");
    }

    #[tokio::test]
    async fn reads_from_disk_with_extension_guess() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blood_panel.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let doc = read_from_path(&path).await.unwrap();
        assert_eq!(doc.media_type, MediaType::Pdf);
        assert_eq!(doc.filename, "blood_panel.pdf");
    }

    #[tokio::test]
    async fn sniffs_when_extension_lies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.dat");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        let doc = read_from_path(&path).await.unwrap();
        assert_eq!(doc.media_type, MediaType::Jpeg);
    }

    #[tokio::test]
    async fn missing_file_is_an_encoding_error() {
        let err = read_from_path(Path::new("/nonexistent/nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(_)));
    }

    #[test]
    fn sanitize_strips_extension_and_separators() {
        assert_eq!(sanitize_filename("Blood_Test_Report.pdf"), "Blood Test Report");
        assert_eq!(sanitize_filename("lab-results-2024.png"), "lab results 2024");
        assert_eq!(sanitize_filename("scan"), "scan");
        assert_eq!(sanitize_filename(".hidden"), ".hidden");
    }
}
