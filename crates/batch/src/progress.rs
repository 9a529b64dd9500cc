use std::io::Write;

use lector_core::SupportedFile;

/// Per-file progress callbacks from the batch driver. `index` is 1-based.
pub trait Progress {
    fn started(&mut self, _index: usize, _total: usize, _file: &SupportedFile) {}
    fn finished(&mut self, _index: usize, _total: usize, _file: &SupportedFile, _ok: bool) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

const BAR_WIDTH: usize = 24;

/// Redraws a single status line, e.g. `[#########...] 3/8 invoice.pdf`.
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self { out: std::io::stderr() }
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, done: usize, total: usize, label: &str) {
        let filled = if total == 0 { BAR_WIDTH } else { done * BAR_WIDTH / total };
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
        // Progress output is best-effort; a closed stderr must not fail the batch.
        let _ = write!(self.out, "\r\x1b[2K[{bar}] {done}/{total} {label}");
        if done == total {
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn started(&mut self, index: usize, total: usize, file: &SupportedFile) {
        self.draw(index - 1, total, &file.file_name());
    }

    fn finished(&mut self, index: usize, total: usize, file: &SupportedFile, ok: bool) {
        let label = if ok { file.file_name() } else { format!("{} (failed)", file.file_name()) };
        self.draw(index, total, &label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_bar_and_ends_line_on_completion() {
        let a = SupportedFile::new("a.png").unwrap();
        let b = SupportedFile::new("b.pdf").unwrap();
        let mut progress = ConsoleProgress::new(Vec::new());

        progress.started(1, 2, &a);
        progress.finished(1, 2, &a, true);
        progress.started(2, 2, &b);
        progress.finished(2, 2, &b, false);

        let out = String::from_utf8(progress.into_inner()).unwrap();
        assert!(out.contains(&format!("[{}] 0/2 a.png", ".".repeat(BAR_WIDTH))));
        assert!(out.contains(&format!("[{}{}] 1/2 a.png", "#".repeat(12), ".".repeat(12))));
        assert!(out.ends_with(&format!("[{}] 2/2 b.pdf (failed)\n", "#".repeat(BAR_WIDTH))));
    }
}
