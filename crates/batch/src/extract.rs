use std::path::Path;

use lector_core::{Capabilities, ExtractError, FileKind, Settings, SupportedFile};
use lector_ocr::{OcrBackend, TesseractCli};
use lector_pdf::{LopdfTextLayer, PageRenderer, Pdftoppm, TextLayer};

/// Turns one supported file into text: OCR for images, the text layer for PDFs,
/// and OCR of rendered pages when a PDF page has no text layer.
pub struct Extractor {
    ocr: Box<dyn OcrBackend>,
    text_layer: Box<dyn TextLayer>,
    renderer: Box<dyn PageRenderer>,
}

impl Extractor {
    pub fn new(
        ocr: impl OcrBackend + 'static,
        text_layer: impl TextLayer + 'static,
        renderer: impl PageRenderer + 'static,
    ) -> Self {
        Self { ocr: Box::new(ocr), text_layer: Box::new(text_layer), renderer: Box::new(renderer) }
    }

    /// Production wiring. Fails with `DependencyUnavailable` before anything
    /// is read if a required tool was not found.
    pub fn from_capabilities(caps: &Capabilities, settings: &Settings) -> Result<Self, ExtractError> {
        caps.require()?;
        let tesseract = caps.tesseract.path().unwrap_or(&settings.ocr.tesseract);
        let pdftoppm = caps.pdftoppm.path().unwrap_or(&settings.render.pdftoppm);
        Ok(Self::new(
            TesseractCli::new(tesseract, settings.ocr.language.clone()),
            LopdfTextLayer,
            Pdftoppm::new(pdftoppm, settings.render.dpi),
        ))
    }

    pub fn extract_path(&self, path: &Path) -> Result<String, ExtractError> {
        self.extract(&SupportedFile::new(path)?)
    }

    pub fn extract(&self, file: &SupportedFile) -> Result<String, ExtractError> {
        match file.kind() {
            FileKind::Image => self.extract_image(file.path()),
            FileKind::Pdf => self.extract_pdf(file.path()),
        }
    }

    fn extract_image(&self, path: &Path) -> Result<String, ExtractError> {
        let fail = |e: lector_ocr::OcrError| ExtractError::extraction(path, e);
        let png = lector_ocr::load_for_ocr(path).map_err(fail)?;
        self.ocr.recognize(&png).map_err(fail)
    }

    fn extract_pdf(&self, path: &Path) -> Result<String, ExtractError> {
        let mut doc = self.text_layer.open(path).map_err(|e| ExtractError::extraction(path, e))?;
        let mut text = String::new();

        for page in 1..=doc.page_count() {
            let page_text = doc.page_text(page).map_err(|e| ExtractError::extraction(path, e))?;
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push('\n');
                continue;
            }

            // First page without a text layer: OCR the whole document, including
            // pages already read above, and stop walking the text layer.
            tracing::info!(
                page,
                "page {page} of {} has no text layer, running OCR on every page",
                path.display()
            );
            let images = self.renderer.render_pages(path).map_err(|e| ExtractError::extraction(path, e))?;
            for image in &images {
                let ocr_text = self.ocr.recognize(image).map_err(|e| ExtractError::extraction(path, e))?;
                text.push_str(&ocr_text);
                text.push('\n');
            }
            break;
        }

        Ok(text)
    }
}
