use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lopdf::Document;

use crate::error::PdfError;

/// Opens PDFs for page-by-page text-layer reads.
pub trait TextLayer: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageTexts>, PdfError>;
}

/// An open document. Pages are numbered from 1. Page text carries no
/// trailing line break, and a page without text objects reads as `""`.
pub trait PageTexts {
    fn page_count(&self) -> u32;
    fn page_text(&mut self, page: u32) -> Result<String, PdfError>;
}

/// Text layer backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextLayer;

struct LopdfPages {
    doc: Document,
    /// Page numbers as lopdf reports them, in document order.
    numbers: Vec<u32>,
}

impl TextLayer for LopdfTextLayer {
    fn open(&self, path: &Path) -> Result<Box<dyn PageTexts>, PdfError> {
        let doc = Document::load(path)?;
        let numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        tracing::debug!(path = %path.display(), pages = numbers.len(), "opened pdf");
        Ok(Box::new(LopdfPages { doc, numbers }))
    }
}

impl PageTexts for LopdfPages {
    fn page_count(&self) -> u32 {
        self.numbers.len() as u32
    }

    fn page_text(&mut self, page: u32) -> Result<String, PdfError> {
        let number = *self
            .numbers
            .get(page.wrapping_sub(1) as usize)
            .ok_or(PdfError::NoSuchPage(page))?;
        let mut text = self
            .doc
            .extract_text(&[number])
            .map_err(|source| PdfError::Page { page, source })?;
        // lopdf ends every text block with a newline; callers add their own separator.
        let kept = text.trim_end_matches(['\n', '\r']).len();
        text.truncate(kept);
        Ok(text)
    }
}

// ── Mock (used for tests) ─────────────────────────────────────────────────────

/// Serves fixed page texts regardless of path. `reads` counts `page_text`
/// calls across every document opened from this layer.
#[derive(Debug, Clone, Default)]
pub struct MockTextLayer {
    pub pages: Vec<String>,
    reads: Arc<AtomicUsize>,
}

impl MockTextLayer {
    pub fn new<S: Into<String>>(pages: impl IntoIterator<Item = S>) -> Self {
        Self { pages: pages.into_iter().map(Into::into).collect(), reads: Arc::default() }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

struct MockPages {
    pages: Vec<String>,
    reads: Arc<AtomicUsize>,
}

impl TextLayer for MockTextLayer {
    fn open(&self, _path: &Path) -> Result<Box<dyn PageTexts>, PdfError> {
        Ok(Box::new(MockPages { pages: self.pages.clone(), reads: Arc::clone(&self.reads) }))
    }
}

impl PageTexts for MockPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&mut self, page: u32) -> Result<String, PdfError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(page.wrapping_sub(1) as usize)
            .cloned()
            .ok_or(PdfError::NoSuchPage(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One page per entry; `None` produces a page with an empty content stream.
    fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn lopdf_reads_each_page_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.pdf");
        write_pdf(&path, &[Some("First page"), Some("Second page")]);

        let mut doc = LopdfTextLayer.open(&path).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(1).unwrap(), "First page");
        assert_eq!(doc.page_text(2).unwrap(), "Second page");
        assert!(matches!(doc.page_text(3), Err(PdfError::NoSuchPage(3))));
        assert!(matches!(doc.page_text(0), Err(PdfError::NoSuchPage(0))));
    }

    #[test]
    fn lopdf_blank_page_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        write_pdf(&path, &[None]);

        let mut doc = LopdfTextLayer.open(&path).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "");
    }

    #[test]
    fn lopdf_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(LopdfTextLayer.open(&path).is_err());
    }

    #[test]
    fn mock_counts_reads_across_documents() {
        let layer = MockTextLayer::new(["a", "", "c"]);
        let mut doc = layer.open(Path::new("any.pdf")).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_text(1).unwrap(), "a");
        assert_eq!(doc.page_text(2).unwrap(), "");
        let mut again = layer.open(Path::new("other.pdf")).unwrap();
        again.page_text(3).unwrap();
        assert_eq!(layer.read_count(), 3);
    }
}
