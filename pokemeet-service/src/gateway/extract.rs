//! Resume text extraction. Uploaded bytes are staged to a scoped temp file
//! (removed on every exit path, including extraction panics) and parsed as
//! PDF; any failure degrades to a placeholder string so card generation can
//! still proceed.

use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

pub const EXTRACTION_PLACEHOLDER: &str = "Unable to extract text from resume";

pub async fn extract_document_text(document_bytes: &[u8]) -> String {
    extract_document_text_in(std::env::temp_dir(), document_bytes).await
}

pub(crate) async fn extract_document_text_in(
    staging_dir: PathBuf,
    document_bytes: &[u8],
) -> String {
    let bytes = document_bytes.to_vec();
    let extracted = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let mut staged = tempfile::NamedTempFile::new_in(staging_dir)?;
        staged.write_all(&bytes)?;
        staged.flush()?;
        let text = pdf_extract::extract_text(staged.path())
            .map_err(|e| anyhow::anyhow!("pdf parse: {e}"))?;
        Ok(text)
    })
    .await;

    match extracted {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => {
            warn!("no text found in uploaded resume");
            EXTRACTION_PLACEHOLDER.to_string()
        }
        Ok(Err(error)) => {
            warn!(error = %error, "resume text extraction failed");
            EXTRACTION_PLACEHOLDER.to_string()
        }
        Err(error) => {
            warn!(error = %error, "resume extraction task aborted");
            EXTRACTION_PLACEHOLDER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_bytes_degrade_to_placeholder_and_leave_no_temp_file() {
        let staging = tempfile::tempdir().unwrap();
        let text =
            extract_document_text_in(staging.path().to_path_buf(), b"definitely not a pdf").await;
        assert_eq!(text, EXTRACTION_PLACEHOLDER);

        let leftovers: Vec<_> = std::fs::read_dir(staging.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "staged file was not cleaned up");
    }

    #[tokio::test]
    async fn empty_document_degrades_to_placeholder() {
        let staging = tempfile::tempdir().unwrap();
        let text = extract_document_text_in(staging.path().to_path_buf(), b"").await;
        assert_eq!(text, EXTRACTION_PLACEHOLDER);
    }
}
