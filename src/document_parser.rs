// Copyright 2026 notes_rag_engine contributors
// SPDX-License-Identifier: MIT
//
// Document-to-Text (DTT) module for PDF and DOCX text extraction

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::TextExtractor;
use crate::error::RagError;

/// Hard cap on accepted document size.
const MAX_FILE_SIZE: usize = 50 * 1024 * 1024; // 50MB

static HYPHEN_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-\s*$").unwrap());
static WORD_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\w+)").unwrap());
// Only joins word- + newline + lowercase continuation, which preserves
// real compound words like "user-facing" or "data-binding".
static INLINE_HYPHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-\s*[\r\n]+\s*([a-z]\w*)").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove a page number from the end of a page text (if present).
/// Only removes if the last non-empty line is purely numeric.
fn remove_trailing_page_number(page_text: &str) -> String {
    let lines: Vec<&str> = page_text.lines().collect();
    if lines.is_empty() {
        return page_text.to_string();
    }

    let mut last_content_idx = lines.len() - 1;
    while last_content_idx > 0 && lines[last_content_idx].trim().is_empty() {
        last_content_idx -= 1;
    }

    let last_line = lines[last_content_idx].trim();

    if !last_line.is_empty() && last_line.chars().all(|c| c.is_ascii_digit()) {
        let mut kept: Vec<&str> = lines[..last_content_idx].to_vec();
        kept.extend_from_slice(&lines[last_content_idx + 1..]);
        kept.join("\n")
    } else {
        page_text.to_string()
    }
}

/// Join page texts into one document string.
///
/// A page ending in "word-" followed by a page starting with a word
/// continuation is joined as "wordcontinuation"; otherwise pages are
/// separated by a single space. Trailing page numbers are stripped first
/// and whitespace is normalized at the end.
fn join_pages(pages: Vec<String>) -> String {
    if pages.is_empty() {
        return String::new();
    }

    let cleaned: Vec<String> = pages.iter().map(|p| remove_trailing_page_number(p)).collect();

    let mut text = String::new();
    for (i, page) in cleaned.iter().enumerate() {
        if i == 0 {
            text = page.clone();
            continue;
        }

        let trimmed_len = text.trim_end().len();
        let hyphen_caps = HYPHEN_END_RE.captures(&text[..trimmed_len]).map(|caps| {
            (caps.get(1).unwrap().as_str().to_string(), caps.get(0).unwrap().as_str().len())
        });

        if let Some((word_head, match_len)) = hyphen_caps {
            let page_trimmed = page.trim_start();
            if let Some(next_caps) = WORD_START_RE.captures(page_trimmed) {
                let word_tail = next_caps.get(1).unwrap().as_str();

                text.truncate(trimmed_len - match_len);
                text.push_str(&word_head);
                text.push_str(word_tail);
                text.push_str(&page_trimmed[next_caps.get(1).unwrap().end()..]);
                continue;
            }
        }

        text.push(' ');
        text.push_str(page);
    }

    let dehyphenated = INLINE_HYPHEN_RE.replace_all(&text, "$1$2");
    WHITESPACE_RE.replace_all(&dehyphenated, " ").trim().to_string()
}

/// Extract text content from a PDF file (bytes).
/// Uses page-by-page extraction for safe page number removal and
/// hyphenation handling.
pub fn extract_text_from_pdf(file_bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(file_bytes)
        .map_err(|e| anyhow!("PDF extraction failed: {:?}", e))?;
    Ok(join_pages(pages))
}

/// Extract text content from a DOCX file (bytes).
pub fn extract_text_from_docx(file_bytes: &[u8]) -> Result<String> {
    docx_lite::extract_text_from_bytes(file_bytes)
        .map_err(|e| anyhow!("DOCX extraction failed: {}", e))
}

/// Auto-detect document type and extract text.
/// Uses magic bytes to determine file format.
pub fn extract_text_from_document(file_bytes: &[u8]) -> Result<String> {
    if file_bytes.len() > MAX_FILE_SIZE {
        return Err(anyhow!(
            "File too large ({} bytes). Maximum supported size is 50MB.",
            file_bytes.len()
        ));
    }

    if file_bytes.len() < 4 {
        return Err(anyhow!("File too small to determine format"));
    }

    // PDF magic bytes: %PDF
    if file_bytes.starts_with(b"%PDF") {
        return extract_text_from_pdf(file_bytes);
    }

    // DOCX magic bytes: PK (ZIP archive)
    if file_bytes.starts_with(b"PK") {
        return extract_text_from_docx(file_bytes);
    }

    Err(anyhow!("Unsupported document format. Expected PDF or DOCX."))
}

/// Default extractor collaborator, backed by the parsers in this module.
pub struct DocumentParser;

impl TextExtractor for DocumentParser {
    fn extract(&self, bytes: &[u8]) -> Result<String, RagError> {
        extract_text_from_document(bytes).map_err(|e| RagError::Extraction(e.to_string()))
    }
}
