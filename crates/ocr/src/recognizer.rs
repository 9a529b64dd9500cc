use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over an OCR backend.
/// Implementations accept encoded image bytes (PNG, JPEG, ...) and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<F> OcrBackend for F
where
    F: Fn(&[u8]) -> Result<String, OcrError> + Send + Sync,
{
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        self(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string and counts calls, so tests can assert whether
/// OCR ran at all without Tesseract installed.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    pub text: String,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("INVOICE 42\nTotal due");
        assert_eq!(r.recognize(b"fake image data").unwrap(), "INVOICE 42\nTotal due");
    }

    #[test]
    fn mock_counts_calls() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.call_count(), 0);
        r.recognize(b"anything").unwrap();
        r.recognize(b"").unwrap();
        assert_eq!(r.call_count(), 2);
    }

    #[test]
    fn closures_are_backends() {
        let echo = |bytes: &[u8]| -> Result<String, OcrError> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        };
        assert_eq!(echo.recognize(b"page-3").unwrap(), "page-3");

        let boxed: Box<dyn OcrBackend> = Box::new(MockRecognizer::new("x"));
        assert_eq!(boxed.recognize(b"").unwrap(), "x");
    }
}
