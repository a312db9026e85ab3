//! Content reading: text decode, PDF extraction, line and byte slicing.

use std::path::Path;
use std::sync::Arc;

use soko_store::BlobStore;

use crate::error::{WorkspaceError, WorkspaceResult, map_read_err};
use crate::path::blob_key;

/// Returned in place of file text when the blob is not valid UTF-8.
pub const BINARY_PLACEHOLDER: &str = "<binary content>";

/// Reads blob content as text (UTF-8 or extracted from PDF) or raw bytes.
pub struct ContentReader {
    store: Arc<dyn BlobStore>,
}

impl ContentReader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    async fn fetch(&self, path: &str) -> WorkspaceResult<Vec<u8>> {
        self.store.get(blob_key(path)).await.map_err(map_read_err)
    }

    /// Read a file as text.
    ///
    /// PDF payloads are detected by extension or magic and have their text
    /// extracted; `page` (0-based) selects a single page, with out-of-range
    /// pages yielding empty text. Other payloads are decoded as UTF-8, with
    /// non-UTF-8 content replaced by [`BINARY_PLACEHOLDER`].
    ///
    /// `start_line`/`end_line` slice the result by 1-based line numbers;
    /// bounds beyond the content clamp rather than erroring.
    pub async fn read(
        &self,
        path: &str,
        start_line: Option<i64>,
        end_line: Option<i64>,
        page: Option<u32>,
    ) -> WorkspaceResult<String> {
        let bytes = self.fetch(path).await?;

        let text = if is_pdf(path, &bytes) {
            extract_pdf_text(&bytes, page)?
        } else {
            match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(_) => return Ok(BINARY_PLACEHOLDER.to_string()),
            }
        };

        if start_line.is_none() && end_line.is_none() {
            return Ok(text);
        }
        Ok(slice_lines(&text, start_line, end_line))
    }

    /// Read raw bytes with Python-slice range semantics: out-of-range
    /// bounds clamp, negative bounds count from the end, and a crossed
    /// range is empty.
    pub async fn read_bytes(
        &self,
        path: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> WorkspaceResult<Vec<u8>> {
        let bytes = self.fetch(path).await?;
        let (s, e) = slice_bounds(bytes.len(), start, end);
        Ok(bytes[s..e].to_vec())
    }
}

/// PDF detection: a pure function of the file extension and leading magic.
fn is_pdf(path: &str, bytes: &[u8]) -> bool {
    let by_extension = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    by_extension || bytes.starts_with(b"%PDF-")
}

fn extract_pdf_text(bytes: &[u8], page: Option<u32>) -> WorkspaceResult<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| WorkspaceError::PdfExtraction(e.to_string()))?;

    Ok(match page {
        Some(p) => pages.get(p as usize).cloned().unwrap_or_default(),
        None => pages.join("\n"),
    })
}

/// Slice text by 1-based line numbers.
///
/// `start_line` ≤ 0 or absent means the first line; `end_line` absent means
/// the last. Both clamp to the content length.
fn slice_lines(text: &str, start_line: Option<i64>, end_line: Option<i64>) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let start = start_line
        .map_or(0, |s| s.saturating_sub(1).max(0) as usize)
        .min(lines.len());
    let end = end_line
        .map_or(lines.len(), |e| e.max(0) as usize)
        .min(lines.len());

    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n")
}

/// Resolve `[start:end]` bounds the way Python slicing does.
fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let resolve = |bound: Option<i64>, default: usize| match bound {
        None => default,
        Some(i) if i < 0 => len.saturating_sub(i.unsigned_abs() as usize),
        Some(i) => (i as usize).min(len),
    };
    let s = resolve(start, 0);
    let e = resolve(end, len);
    (s, e.max(s))
}
