//! Content protocol providers.
//!
//! A provider turns a request path under the content scheme into a byte
//! stream. The native runtime registers exactly one provider at startup.

use crate::error::{Result, ShellError};
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// A readable response body plus its MIME type.
pub struct ContentStream {
    pub mime: String,
    pub body: Box<dyn Read + Send>,
}

impl ContentStream {
    /// Drain the stream into memory.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream").field("mime", &self.mime).finish_non_exhaustive()
    }
}

pub trait ContentProvider: Send + Sync {
    fn open(&self, path: &str) -> Result<ContentStream>;
}

/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
    index: String,
}

impl DirectoryProvider {
    pub fn new(root: impl AsRef<Path>, index: impl Into<String>) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|err| {
            ShellError::Content(format!("content root {} is unusable: {err}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(ShellError::Content(format!(
                "content root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root,
            index: index.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let relative = path.trim_start_matches('/');
        let relative = if relative.is_empty() { self.index.as_str() } else { relative };

        let mut resolved = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(ShellError::Content(format!("path escapes content root: {path}")));
                }
            }
        }
        if resolved.is_dir() {
            resolved.push(&self.index);
        }
        Ok(resolved)
    }
}

impl ContentProvider for DirectoryProvider {
    fn open(&self, path: &str) -> Result<ContentStream> {
        let file_path = self.resolve(path)?;
        let file = File::open(&file_path).map_err(|err| {
            ShellError::Content(format!("{}: {err}", file_path.display()))
        })?;
        Ok(ContentStream {
            mime: mime_guess::from_path(&file_path)
                .first_or_octet_stream()
                .to_string(),
            body: Box::new(file),
        })
    }
}

/// Stand-in when the real provider could not be set up: every request fails
/// and the window stays blank.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ContentProvider for UnavailableProvider {
    fn open(&self, path: &str) -> Result<ContentStream> {
        Err(ShellError::Content(format!("{path}: {}", self.reason)))
    }
}
