//! PDF text extraction.

use lopdf::Document;
use puzzler_core::ExtractError;
use tracing::{debug, warn};

/// Extract the text of every page, in page order, joined with newlines.
///
/// Pages that yield no text (scanned images, blank pages, unreadable
/// content streams) are skipped.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = document.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
            Ok(_) => debug!("Page {page_number} has no text"),
            Err(e) => warn!("Skipping page {page_number}: {e}"),
        }
    }

    Ok(texts.join("\n"))
}
