//! Best-effort source text lookup, used only for display.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// `(file, line) -> text`. Lines are 1-based; failures yield `None`.
pub trait SourceProvider {
    fn line_text(&self, file: &str, line: u32) -> Option<String>;
}

/// Provider that never has text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSource;

impl SourceProvider for NoSource {
    fn line_text(&self, _file: &str, _line: u32) -> Option<String> {
        None
    }
}

/// Fixed in-memory sources keyed by file name.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    files: HashMap<String, Vec<String>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, text: &str) -> Self {
        self.files.insert(name.into(), text.lines().map(str::to_string).collect());
        self
    }
}

impl SourceProvider for InMemorySource {
    fn line_text(&self, file: &str, line: u32) -> Option<String> {
        let index = (line as usize).checked_sub(1)?;
        self.files.get(file)?.get(index).cloned()
    }
}

/// Reads source files from disk, once each. Relative paths resolve against
/// `root` when one is set.
#[derive(Debug, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
    cache: RefCell<HashMap<PathBuf, Option<Vec<String>>>>,
}

impl FileSource {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root, cache: RefCell::new(HashMap::new()) }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceProvider for FileSource {
    fn line_text(&self, file: &str, line: u32) -> Option<String> {
        let index = (line as usize).checked_sub(1)?;
        let path = self.resolve(file);
        let mut cache = self.cache.borrow_mut();
        let lines = cache.entry(path).or_insert_with_key(|path| match std::fs::read_to_string(path) {
            Ok(text) => Some(text.lines().map(str::to_string).collect()),
            Err(err) => {
                warn!(path = %path.display(), "source unavailable, no inline code: {err}");
                None
            }
        });
        lines.as_ref()?.get(index).cloned()
    }
}

/// Right-hand side of the assignment on a source line.
///
/// Splits on the first plain `=` (not part of `==`, `!=`, `<=`, `>=`);
/// compound assignments keep the text after their `=`. A trailing `;` is
/// dropped. Text without an assignment comes back trimmed.
pub fn assignment_rhs(text: &str) -> String {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        let prev = if i > 0 { bytes[i - 1] } else { 0 };
        let next = bytes.get(i + 1).copied().unwrap_or(0);
        if next == b'=' || matches!(prev, b'=' | b'!' | b'<' | b'>') {
            continue;
        }
        return strip_statement_end(&text[i + 1..]);
    }
    strip_statement_end(text)
}

fn strip_statement_end(text: &str) -> String {
    let trimmed = text.trim();
    trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end().to_string()
}
