use lopdf::Document;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfTextError {
    #[error("Failed to load PDF: {0}")]
    Load(#[from] lopdf::Error),

    /// Scanned/image-only PDFs land here; there is no OCR fallback.
    #[error("No text found in PDF")]
    Empty,
}

/// Extract the plain text of a PDF, page by page in document order.
pub fn extract_text(data: &[u8]) -> Result<String, PdfTextError> {
    let doc = Document::load_from(Cursor::new(data))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(content) = doc.extract_text(&[page_num]) {
            text.push_str(&content);
            text.push('\n');
        }
    }

    if text.trim().is_empty() {
        return Err(PdfTextError::Empty);
    }

    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_a_real_page() {
        let data = test_support::pdf_with_text("Invoice INV-42 from Acme Corp");
        let text = extract_text(&data).unwrap();
        assert!(text.contains("INV-42"));
        assert!(text.contains("Acme Corp"));
    }

    #[test]
    fn empty_page_yields_empty_error() {
        let data = test_support::pdf_with_text("");
        assert!(matches!(extract_text(&data), Err(PdfTextError::Empty)));
    }

    #[test]
    fn garbage_bytes_yield_load_error() {
        assert!(matches!(
            extract_text(b"definitely not a pdf"),
            Err(PdfTextError::Load(_))
        ));
    }
}
