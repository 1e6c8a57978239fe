//! DOCX text extraction
//!
//! Reads `word/document.xml` out of the ZIP container and walks it paragraph
//! by paragraph. Pseudo-pages end after [`PARAGRAPHS_PER_PAGE`] non-empty
//! paragraphs or at an explicit `<w:br w:type="page"/>`.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::ExtractionError;

/// Non-empty paragraphs grouped into one pseudo-page
pub const PARAGRAPHS_PER_PAGE: usize = 50;

/// Extract pseudo-pages of text from DOCX bytes
pub fn extract_docx_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    Ok(paginate_document_xml(&xml)?)
}

fn paginate_document_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut pages = PageBuilder::default();
    let mut in_text = false;
    // <w:tabs> inside paragraph properties declares tab stops, not tabs
    let mut in_tab_stops = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tabs" => in_tab_stops = true,
                b"w:br" if is_page_break(&e) => pages.page_break(),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if !in_tab_stops => pages.push_text("\t"),
                b"w:br" if is_page_break(&e) => pages.page_break(),
                b"w:br" | b"w:cr" => pages.push_text("\n"),
                _ => {}
            },
            Event::Text(text) if in_text => pages.push_text(&text.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => pages.end_paragraph(),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages.finish())
}

fn is_page_break(element: &BytesStart) -> bool {
    element
        .try_get_attribute("w:type")
        .ok()
        .flatten()
        .is_some_and(|attr| attr.value.as_ref() == b"page")
}

#[derive(Default)]
struct PageBuilder {
    pages: Vec<String>,
    paragraphs: Vec<String>,
    current: String,
}

impl PageBuilder {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.current);
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            return;
        }

        self.paragraphs.push(paragraph.to_string());
        if self.paragraphs.len() >= PARAGRAPHS_PER_PAGE {
            self.flush_page();
        }
    }

    fn page_break(&mut self) {
        self.end_paragraph();
        self.flush_page();
    }

    fn flush_page(&mut self) {
        if !self.paragraphs.is_empty() {
            self.pages.push(self.paragraphs.join("\n"));
            self.paragraphs.clear();
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.end_paragraph();
        self.flush_page();
        self.pages
    }
}

#[cfg(test)]
pub(crate) fn build_docx(body: &str) -> Vec<u8> {
    use std::io::Write;

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
