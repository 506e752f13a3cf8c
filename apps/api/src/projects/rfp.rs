//! RFP document intake: raw file to S3, best-effort text extraction.
//!
//! PDFs go through `pdf-extract`, plain text is read
//! as UTF-8, anything else (DOCX, HWP, images) is stored but yields no text.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

/// Kind of document, decided from content type first and file extension second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfpFormat {
    Pdf,
    PlainText,
    Other,
}

pub fn detect_format(file_name: &str, content_type: Option<&str>) -> RfpFormat {
    match content_type.map(|c| c.to_ascii_lowercase()) {
        Some(c) if c == "application/pdf" => return RfpFormat::Pdf,
        Some(c) if c.starts_with("text/") => return RfpFormat::PlainText,
        _ => {}
    }
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        RfpFormat::Pdf
    } else if lower.ends_with(".txt") || lower.ends_with(".md") {
        RfpFormat::PlainText
    } else {
        RfpFormat::Other
    }
}

/// Returns extracted text, or `None` when nothing usable came out.
pub async fn extract_rfp_text(format: RfpFormat, data: Bytes) -> Option<String> {
    let text = match format {
        RfpFormat::PlainText => Some(String::from_utf8_lossy(&data).into_owned()),
        RfpFormat::Pdf => {
            // pdf-extract is CPU-bound and can panic on malformed input; a panic
            // surfaces here as a JoinError.
            match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                .await
            {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    warn!("PDF text extraction failed: {e}");
                    None
                }
                Err(e) => {
                    warn!("PDF text extraction aborted: {e}");
                    None
                }
            }
        }
        RfpFormat::Other => None,
    };

    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Keeps the key readable: letters and digits (Hangul included), '.', '-', '_'.
/// Path separators, whitespace and punctuation become '_'.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "rfp".to_string()
    } else {
        cleaned
    }
}

/// Every upload gets its own prefix, so two documents never share a key.
pub fn rfp_s3_key(project_id: Uuid, upload_id: Uuid, file_name: &str) -> String {
    format!(
        "rfps/{}/{}/{}",
        project_id,
        upload_id.simple(),
        sanitize_file_name(file_name)
    )
}

/// Uploads the raw document and returns its key.
pub async fn store_rfp_document(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    project_id: Uuid,
    file_name: &str,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String> {
    let key = rfp_s3_key(project_id, Uuid::new_v4(), file_name);
    let size = data.len();

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(data))
        .content_type(content_type.unwrap_or("application/octet-stream"))
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded RFP ({size} bytes) to s3://{bucket}/{key}");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_prefers_content_type() {
        assert_eq!(detect_format("rfp.bin", Some("application/pdf")), RfpFormat::Pdf);
        assert_eq!(detect_format("rfp.pdf", Some("text/plain")), RfpFormat::PlainText);
    }

    #[test]
    fn test_detect_format_falls_back_to_extension() {
        assert_eq!(detect_format("RFP.PDF", None), RfpFormat::Pdf);
        assert_eq!(detect_format("notes.txt", Some("application/octet-stream")), RfpFormat::PlainText);
        assert_eq!(detect_format("제안요청서.hwp", None), RfpFormat::Other);
        assert_eq!(detect_format("proposal.docx", None), RfpFormat::Other);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("RFP v2 (final).pdf"), "RFP_v2__final_.pdf");
        assert_eq!(sanitize_file_name("제안요청서.pdf"), "제안요청서.pdf");
        assert_eq!(sanitize_file_name("과업 지시서/v1.pdf"), "과업_지시서_v1.pdf");
        assert_eq!(sanitize_file_name("../.."), "_");
        assert_eq!(sanitize_file_name(""), "rfp");
    }

    #[test]
    fn test_rfp_s3_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            rfp_s3_key(id, Uuid::nil(), "a b.txt"),
            "rfps/00000000-0000-0000-0000-000000000000/00000000000000000000000000000000/a_b.txt"
        );
    }

    #[test]
    fn test_hangul_file_names_do_not_collide() {
        let project = Uuid::nil();
        let upload = Uuid::nil();
        assert_ne!(
            rfp_s3_key(project, upload, "제안요청서.pdf"),
            rfp_s3_key(project, upload, "과업지시서.pdf")
        );
        assert_ne!(
            rfp_s3_key(project, Uuid::new_v4(), "제안요청서.pdf"),
            rfp_s3_key(project, Uuid::new_v4(), "제안요청서.pdf")
        );
    }

    #[tokio::test]
    async fn test_plain_text_extraction_trims() {
        let text = extract_rfp_text(
            RfpFormat::PlainText,
            Bytes::from_static("  디지털 전환 사업 \n".as_bytes()),
        )
        .await;
        assert_eq!(text.as_deref(), Some("디지털 전환 사업"));
    }

    #[tokio::test]
    async fn test_blank_or_unsupported_yields_none() {
        assert!(extract_rfp_text(RfpFormat::PlainText, Bytes::from_static(b"   ")).await.is_none());
        assert!(extract_rfp_text(RfpFormat::Other, Bytes::from_static(b"PK\x03\x04")).await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_pdf_degrades_to_none() {
        let text = extract_rfp_text(RfpFormat::Pdf, Bytes::from_static(b"not a pdf at all")).await;
        assert!(text.is_none());
    }
}
