use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to load document: {0}")]
    Load(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReadResult<T> = Result<T, ReadError>;

/// Concatenated per-page text of one document, in page order.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub text: String,
    pub page_count: u32,
    pub pages_skipped: u32,
}

impl PageText {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Capability boundary for turning raw document bytes into text. Extraction
/// is best-effort per page: a page that fails to decode contributes no text
/// and is skipped rather than failing the document.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn extract_text(&self, data: &[u8]) -> ReadResult<PageText>;

    /// Convenience for documents on disk; reads the bytes and defers to
    /// [`TextSource::extract_text`].
    async fn extract_file(&self, path: &std::path::Path) -> ReadResult<PageText> {
        let data = tokio::fs::read(path).await?;
        self.extract_text(&data).await
    }
}

/// Text source backed by lopdf. Only a document that fails to load at all
/// is an error; undecodable pages are counted and skipped.
pub struct PdfTextSource;

impl PdfTextSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSource for PdfTextSource {
    async fn extract_text(&self, data: &[u8]) -> ReadResult<PageText> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| ReadError::Load(e.to_string()))?;

        let mut out = PageText::default();
        for (page_number, _object_id) in doc.get_pages() {
            out.page_count += 1;

            match doc.extract_text(&[page_number]) {
                Ok(content) => {
                    if !out.text.is_empty() {
                        out.text.push('\n');
                    }
                    out.text.push_str(&content);
                }
                Err(e) => {
                    out.pages_skipped += 1;
                    debug!(page = page_number, error = %e, "skipping undecodable page");
                }
            }
        }

        Ok(out)
    }
}

/// Treats the uploaded bytes as UTF-8 text directly. Used for plain-text
/// grade cards and as a test double for the PDF path.
pub struct PlainTextSource;

#[async_trait]
impl TextSource for PlainTextSource {
    async fn extract_text(&self, data: &[u8]) -> ReadResult<PageText> {
        let text = String::from_utf8_lossy(data).into_owned();
        Ok(PageText {
            page_count: u32::from(!text.is_empty()),
            pages_skipped: 0,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_source_passes_bytes_through() {
        let source = PlainTextSource;
        let out = source.extract_text(b"SGPA 8.5").await.unwrap();

        assert_eq!(out.text, "SGPA 8.5");
        assert_eq!(out.page_count, 1);
        assert_eq!(out.pages_skipped, 0);
    }

    #[tokio::test]
    async fn test_plain_text_source_lossy_on_invalid_utf8() {
        let source = PlainTextSource;
        let out = source.extract_text(&[0x53, 0xff, 0x33]).await.unwrap();

        assert!(out.text.contains('S'));
    }

    #[tokio::test]
    async fn test_pdf_source_rejects_garbage_bytes() {
        let source = PdfTextSource::new();
        let result = source.extract_text(b"not a pdf at all").await;

        assert!(matches!(result, Err(ReadError::Load(_))));
    }
}
