use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("Failed to read text layer of page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    #[error("Page {0} does not exist")]
    NoSuchPage(u32),
    #[error("Page rendering failed: {0}")]
    Render(String),
    #[error("Renderer not available: {0}")]
    NotAvailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
