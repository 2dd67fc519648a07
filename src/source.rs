//! Source inputs, locations and ranges.

use std::sync::Arc;

/// Opaque handle to a [`SourceInput`], stable for the life of a [`crate::Compiler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

/// A single point in a source file. Both `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub file: SourceId,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(file: SourceId, line: u32, column: u32) -> Self {
        SourceLoc { file, line, column }
    }
}

/// A span of source: `start` and `end` bound it, `focus` is where a
/// diagnostic arrow should point (usually equal to `start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub start: SourceLoc,
    pub focus: SourceLoc,
    pub end: SourceLoc,
}

impl SourceRange {
    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        SourceRange {
            start,
            focus: start,
            end,
        }
    }

    pub fn point(loc: SourceLoc) -> Self {
        SourceRange {
            start: loc,
            focus: loc,
            end: loc,
        }
    }

    pub fn with_focus(mut self, focus: SourceLoc) -> Self {
        self.focus = focus;
        self
    }
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A compilation input: a display name (usually a file path, but `"<repl>"`
/// or similar is fine too) plus its raw bytes.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub id: SourceId,
    pub display_name: String,
    pub bytes: Arc<[u8]>,
}

impl SourceInput {
    pub fn new(id: SourceId, display_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        SourceInput {
            id,
            display_name: display_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_str(id: SourceId, display_name: impl Into<String>, text: &str) -> Self {
        Self::new(id, display_name, text.as_bytes().to_vec())
    }
}
