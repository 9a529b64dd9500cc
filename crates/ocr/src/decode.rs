use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

use crate::recognizer::OcrError;

/// Read an image file and return PNG bytes for the OCR backend.
///
/// Decoding up front turns a corrupt or truncated file into a clean
/// [`OcrError::ImageDecode`] instead of an opaque engine failure. Multi-frame
/// TIFFs contribute their first frame only.
pub fn load_for_ocr(path: &Path) -> Result<Vec<u8>, OcrError> {
    let data = std::fs::read(path)?;
    decode_for_ocr(&data)
}

pub fn decode_for_ocr(data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(data).map_err(|e| OcrError::ImageDecode(e.to_string()))?;
    encode_as_png(&img)
}

fn encode_as_png(img: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrError::ImageDecode(format!("PNG re-encode failed: {e}")))?;
    Ok(buf)
}
