//! PDF text extraction and chunking

use std::path::Path;

use tokio::fs as tokio_fs;
use tokio::task;
use tracing::{debug, instrument, warn};

use crate::analysis::split_sentences;
use crate::error::{Result, TelehealthError};

/// Leading bytes of every PDF file
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extract the text layer of a PDF
///
/// The file must start with the `%PDF-` signature. Parsing runs on the
/// blocking pool; parser errors and parser panics are both reported as
/// [`TelehealthError::PdfExtraction`] so one malformed file cannot take the
/// batch down.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub async fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let bytes = tokio_fs::read(path)
        .await
        .map_err(|e| TelehealthError::IoError {
            message: format!("Failed to read {}: {}", display, e),
        })?;

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(TelehealthError::InvalidPdf { path: display });
    }

    let size = bytes.len();
    let text = task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|join_err| {
            warn!(error = %join_err, "PDF parser aborted");
            TelehealthError::PdfExtraction {
                path: display.clone(),
                message: if join_err.is_panic() {
                    "parser panicked".to_string()
                } else {
                    join_err.to_string()
                },
            }
        })?
        .map_err(|e| TelehealthError::PdfExtraction {
            path: display.clone(),
            message: e.to_string(),
        })?;

    debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");

    if text.trim().is_empty() {
        return Err(TelehealthError::PdfExtraction {
            path: display,
            message: "no text layer".to_string(),
        });
    }

    Ok(text)
}

/// Split text into chunks of at most `chunk_size` characters
///
/// Whitespace is normalized and whole sentences are packed greedily. A
/// sentence longer than the limit is cut at character boundaries.
///
/// ```
/// use telehealth_client::pdf::chunk_text;
///
/// let chunks = chunk_text("One visit. Two visits. Three visits.", 24)?;
/// assert_eq!(chunks, vec!["One visit. Two visits.", "Three visits."]);
/// # Ok::<(), telehealth_client::TelehealthError>(())
/// ```
///
/// # Errors
///
/// A zero `chunk_size` is a [`TelehealthError::Config`] error.
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(TelehealthError::Config(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        if sentence_len > chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = sentence.chars().collect();
            chunks.extend(chars.chunks(chunk_size).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let separator = usize::from(!current.is_empty());
        if current_len + separator + sentence_len > chunk_size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}
