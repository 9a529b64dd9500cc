pub mod error;
pub mod render;
pub mod text_layer;

pub use error::PdfError;
pub use render::{MockRenderer, PageRenderer, Pdftoppm};
pub use text_layer::{LopdfTextLayer, MockTextLayer, PageTexts, TextLayer};
