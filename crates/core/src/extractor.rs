use crate::error::ExtractError;
use crate::models::{Page, SectionMap};
use lopdf::Document;
use regex::Regex;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF";

pub trait PdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, ExtractError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, ExtractError> {
        let document =
            Document::load_mem(bytes).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        // get_pages is keyed by page number, so iteration follows document order.
        for (index, (page_no, _page_id)) in document.get_pages().into_iter().enumerate() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractError::PdfParse(error.to_string()))?;

            pages.push(Page {
                page_number: (index + 1) as u32,
                text,
            });
        }

        debug!(page_count = pages.len(), "decoded pdf text layer");
        Ok(pages)
    }
}

pub fn extract_by_page<E: PdfExtractor + ?Sized>(
    extractor: &E,
    bytes: &[u8],
) -> Result<Vec<Page>, ExtractError> {
    extractor.extract_pages(bytes)
}

pub fn extract_full_text<E: PdfExtractor + ?Sized>(
    extractor: &E,
    bytes: &[u8],
) -> Result<String, ExtractError> {
    let pages = extractor.extract_pages(bytes)?;
    Ok(concat_pages(&pages))
}

pub fn extract_sections<E: PdfExtractor + ?Sized>(
    extractor: &E,
    bytes: &[u8],
    heading_regex: &str,
) -> Result<SectionMap, ExtractError> {
    let text = extract_full_text(extractor, bytes)?;
    split_sections(&text, heading_regex)
}

pub fn concat_pages(pages: &[Page]) -> String {
    pages.iter().map(|page| page.text.as_str()).collect()
}

/// Splits text on heading lines; whatever precedes the first heading is dropped.
pub fn split_sections(text: &str, heading_regex: &str) -> Result<SectionMap, ExtractError> {
    let heading_re = Regex::new(heading_regex)?;
    let mut sections = SectionMap::new();

    let headings = heading_re
        .captures_iter(text)
        .filter_map(|capture| {
            let whole = capture.get(0)?;
            let title = capture.get(1).unwrap_or(whole);
            Some((whole.start(), whole.end(), title.as_str().trim().to_string()))
        })
        .collect::<Vec<_>>();

    for (position, (_, body_start, title)) in headings.iter().enumerate() {
        let body_end = headings
            .get(position + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(text.len());

        let content = text[*body_start..body_end].trim();
        if !sections.insert(title.clone(), content) {
            debug!(title = %title, "dropping section with duplicate title");
        }
    }

    Ok(sections)
}

pub fn load_pdf_bytes(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let bytes = std::fs::read(path)?;

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }

    Ok(bytes)
}
