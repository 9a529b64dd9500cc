use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::recognizer::{OcrBackend, OcrError};

/// Drives the `tesseract` executable: image bytes in on stdin, UTF-8 text out on stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self { program: program.into(), language: language.into() }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl OcrBackend for TesseractCli {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut child = self.command().spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                OcrError::NotAvailable(format!("{}: {e}", self.program.display()))
            }
            _ => OcrError::Io(e),
        })?;

        // Tesseract reads all of stdin before writing anything, so a plain
        // write-then-wait cannot deadlock on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image_bytes)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::trace!(bytes = output.stdout.len(), "tesseract output");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn passes_language_and_returns_stdout_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the arguments back, then swallow stdin.
        let exe = script(dir.path(), "cat >/dev/null\nprintf '%s|' \"$@\"");
        let ocr = TesseractCli::new(exe, "deu");
        assert_eq!(ocr.recognize(b"png bytes").unwrap(), "stdin|stdout|-l|deu|");
    }

    #[test]
    fn non_zero_exit_is_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "cat >/dev/null\necho 'Error in pixReadMem' >&2\nexit 1");
        let err = TesseractCli::new(exe, "eng").recognize(b"x").unwrap_err();
        match err {
            OcrError::Engine(msg) => assert!(msg.contains("pixReadMem")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let err = TesseractCli::new(dir.path().join("absent"), "eng").recognize(b"x").unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)));
    }
}
