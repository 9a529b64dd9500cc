//! One-shot detection of the external programs a run depends on.
//!
//! Front ends call [`Capabilities::probe`] once at startup and branch on the
//! typed result; nothing downstream re-checks.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ExtractError;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// OCR engine.
    Tesseract,
    /// Rasterizes PDF pages for the scanned-page fallback (poppler-utils).
    Pdftoppm,
}

impl Tool {
    pub fn install_hint(self) -> &'static str {
        match self {
            Tool::Tesseract => {
                "install Tesseract OCR (apt-get install tesseract-ocr, dnf install tesseract, \
                 brew install tesseract, or https://github.com/tesseract-ocr/tesseract)"
            }
            Tool::Pdftoppm => {
                "install poppler (apt-get install poppler-utils, dnf install poppler-utils, \
                 brew install poppler)"
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Tesseract => write!(f, "tesseract"),
            Tool::Pdftoppm => write!(f, "pdftoppm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Found(PathBuf),
    Missing,
}

impl Availability {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Availability::Found(p) => Some(p),
            Availability::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub tool: Tool,
    /// What was looked for: a bare program name or a configured path.
    pub requested: String,
}

impl MissingTool {
    pub fn new(tool: Tool, requested: impl Into<String>) -> Self {
        Self { tool, requested: requested.into() }
    }
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found (looked for `{}`); {}", self.tool, self.requested, self.tool.install_hint())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub tesseract: Availability,
    pub pdftoppm: Availability,
    requested: [(Tool, PathBuf); 2],
}

impl Capabilities {
    /// Probe against the process `PATH`.
    pub fn probe(settings: &Settings) -> Self {
        Self::probe_with_path(settings, std::env::var_os("PATH"))
    }

    pub fn probe_with_path(settings: &Settings, path_var: Option<OsString>) -> Self {
        let path_var = path_var.as_deref();
        let find = |program: &Path| match locate(program, path_var) {
            Some(p) => Availability::Found(p),
            None => Availability::Missing,
        };
        let caps = Self {
            tesseract: find(&settings.ocr.tesseract),
            pdftoppm: find(&settings.render.pdftoppm),
            requested: [
                (Tool::Tesseract, settings.ocr.tesseract.clone()),
                (Tool::Pdftoppm, settings.render.pdftoppm.clone()),
            ],
        };
        tracing::debug!(?caps.tesseract, ?caps.pdftoppm, "capability probe");
        caps
    }

    pub fn availability(&self, tool: Tool) -> &Availability {
        match tool {
            Tool::Tesseract => &self.tesseract,
            Tool::Pdftoppm => &self.pdftoppm,
        }
    }

    pub fn missing(&self) -> Vec<MissingTool> {
        self.requested
            .iter()
            .filter(|(tool, _)| *self.availability(*tool) == Availability::Missing)
            .map(|(tool, requested)| MissingTool::new(*tool, requested.display().to_string()))
            .collect()
    }

    /// Every tool must be present; otherwise the run stops before touching any file.
    pub fn require(&self) -> Result<(), ExtractError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExtractError::DependencyUnavailable(missing))
        }
    }
}

/// Resolve `program` the way a shell would. A value with a directory component
/// is checked as-is; a bare name is searched through `path_var`.
pub fn locate(program: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if cfg!(windows) && program.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// First line of `<program> --version`. Tesseract prints to stdout on recent
/// releases and stderr on older ones, so both are checked.
pub fn tool_version(program: &Path) -> Option<String> {
    let output = Command::new(program).arg("--version").output().ok()?;
    let line = [&output.stdout, &output.stderr]
        .into_iter()
        .filter_map(|bytes| String::from_utf8_lossy(bytes).lines().next().map(str::to_owned))
        .find(|line| !line.trim().is_empty());
    line
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_program(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\necho fake 1.0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn locate_searches_path_entries_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fake_program(second.path(), "tesseract", 0o755);
        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = locate(Path::new("tesseract"), Some(&path_var)).unwrap();
        assert_eq!(found, second.path().join("tesseract"));
    }

    #[test]
    fn locate_skips_non_executable_files() {
        let dir = tempfile::tempdir().unwrap();
        fake_program(dir.path(), "tesseract", 0o644);
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(locate(Path::new("tesseract"), Some(&path_var)), None);
    }

    #[test]
    fn locate_accepts_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let exe = fake_program(dir.path(), "my-tess", 0o755);
        assert_eq!(locate(&exe, None), Some(exe.clone()));
        assert_eq!(locate(&dir.path().join("absent"), None), None);
    }

    #[test]
    fn require_reports_every_missing_tool() {
        let empty = tempfile::tempdir().unwrap();
        let path_var = std::env::join_paths([empty.path()]).unwrap();
        let caps = Capabilities::probe_with_path(&Settings::default(), Some(path_var));

        assert_eq!(caps.tesseract, Availability::Missing);
        match caps.require() {
            Err(ExtractError::DependencyUnavailable(missing)) => {
                let tools: Vec<Tool> = missing.iter().map(|m| m.tool).collect();
                assert_eq!(tools, vec![Tool::Tesseract, Tool::Pdftoppm]);
            }
            other => panic!("expected DependencyUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn require_passes_when_all_present() {
        let dir = tempfile::tempdir().unwrap();
        fake_program(dir.path(), "tesseract", 0o755);
        fake_program(dir.path(), "pdftoppm", 0o755);
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        let caps = Capabilities::probe_with_path(&Settings::default(), Some(path_var));

        assert!(caps.require().is_ok());
        assert_eq!(caps.tesseract.path(), Some(dir.path().join("tesseract").as_path()));
    }

    #[test]
    fn missing_path_var_means_nothing_found() {
        let caps = Capabilities::probe_with_path(&Settings::default(), None);
        assert_eq!(caps.missing().len(), 2);
    }

    #[test]
    fn tool_version_reads_first_output_line() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_program(dir.path(), "tesseract", 0o755);
        assert_eq!(tool_version(&program).as_deref(), Some("fake 1.0"));
        assert_eq!(tool_version(&dir.path().join("absent")), None);
    }
}
