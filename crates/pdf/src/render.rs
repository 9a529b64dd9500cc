use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::PdfError;

/// Rasterizes every page of a PDF, returning encoded images in page order.
pub trait PageRenderer: Send + Sync {
    fn render_pages(&self, path: &Path) -> Result<Vec<Vec<u8>>, PdfError>;
}

/// Renders through poppler's `pdftoppm` into a scratch directory.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
    dpi: u32,
}

impl Pdftoppm {
    pub fn new(program: impl Into<PathBuf>, dpi: u32) -> Self {
        Self { program: program.into(), dpi }
    }
}

impl PageRenderer for Pdftoppm {
    fn render_pages(&self, path: &Path) -> Result<Vec<Vec<u8>>, PdfError> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    PdfError::NotAvailable(format!("{}: {e}", self.program.display()))
                }
                _ => PdfError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Render(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let images = collect_pages(scratch.path())?;
        tracing::debug!(path = %path.display(), pages = images.len(), dpi = self.dpi, "rendered pdf");
        images.iter().map(|p| std::fs::read(p).map_err(PdfError::from)).collect()
    }
}

/// `pdftoppm` names its output `page-1.png` or `page-01.png` depending on the
/// page count, so order by the parsed number rather than the file name.
fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit_once('-')?.1.parse().ok()
}

// ── Mock (used for tests) ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    pub pages: Vec<Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl MockRenderer {
    pub fn new(pages: Vec<Vec<u8>>) -> Self {
        Self { pages, calls: Arc::default() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageRenderer for MockRenderer {
    fn render_pages(&self, _path: &Path) -> Result<Vec<Vec<u8>>, PdfError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}
