//! Verified byte-span edits.
//!
//! Rewrites produce whole new documents; before anything touches disk the
//! change is reduced to the smallest differing span and written as an
//! [`Edit`] that re-checks the text it replaces.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Byte-span replacement in one file, guarded by the text expected there.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    pub new_text: String,
    pub expected_before: EditVerification,
}

/// How the replaced text is checked before an edit is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text, used for large spans
    Hash(u64),
}

/// Spans longer than this are verified by hash.
const HASH_THRESHOLD: usize = 1024;

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    pub fn from_text(text: &str) -> Self {
        if text.len() > HASH_THRESHOLD {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file}:{byte_start}: text changed since the edit was computed")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("cannot edit file outside workspace: {0}")]
    OutsideWorkspace(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("edit does not fall on character boundaries")]
    NotCharBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The file already holds the new text
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before),
        }
    }

    /// The single edit turning `before` into `after`: everything between
    /// their common prefix and common suffix. `None` when the texts are
    /// equal.
    pub fn between(file: impl Into<PathBuf>, before: &str, after: &str) -> Option<Self> {
        if before == after {
            return None;
        }
        let mut prefix = before
            .bytes()
            .zip(after.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        while !before.is_char_boundary(prefix) || !after.is_char_boundary(prefix) {
            prefix -= 1;
        }
        let limit = before.len().min(after.len()) - prefix;
        let mut suffix = before
            .bytes()
            .rev()
            .zip(after.bytes().rev())
            .take(limit)
            .take_while(|(a, b)| a == b)
            .count();
        while !before.is_char_boundary(before.len() - suffix)
            || !after.is_char_boundary(after.len() - suffix)
        {
            suffix -= 1;
        }
        let byte_end = before.len() - suffix;
        Some(Self::new(
            file,
            prefix,
            byte_end,
            &after[prefix..after.len() - suffix],
            &before[prefix..byte_end],
        ))
    }

    /// Check the edit against `content` and return the text it replaces.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }
        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::NotCharBoundary)?;
        if current != self.new_text && !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }
        Ok(current)
    }

    /// Apply to an in-memory copy of the file.
    pub fn apply_to_str(&self, content: &str) -> Result<String, EditError> {
        let current = self.validate(content)?;
        if current == self.new_text {
            return Ok(content.to_string());
        }
        let mut out = String::with_capacity(
            content.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        out.push_str(&content[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&content[self.byte_end..]);
        Ok(out)
    }

    /// Apply to the file on disk with an atomic write.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let original = fs::read_to_string(&self.file)?;
        if self.validate(&original)? == self.new_text {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }
        let updated = self.apply_to_str(&original)?;
        atomic_write(&self.file, updated.as_bytes())?;
        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_text.len(),
        })
    }
}

/// Write through a temp file in the same directory, fsync, then rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
