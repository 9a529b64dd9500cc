pub mod decode;
pub mod recognizer;
pub mod tesseract;

pub use decode::{decode_for_ocr, load_for_ocr};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use tesseract::TesseractCli;
