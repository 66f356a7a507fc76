//! Source text with a line index, and the position/range convention used everywhere.
//!
//! Lines and columns are 1-based. Columns count characters (Unicode scalar values)
//! from the start of the line, so a range can be compared directly against the
//! `sc`/`ec` attributes written in fixture comments. Ranges are half-open:
//! `start` is the first character, `end` is one past the last.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open `[start, end)` range of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range on a single line covering columns `[start_column, end_column)`.
    pub fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(line, start_column),
            end: Position::new(line, end_column),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_position(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// True when the two ranges share at least one character.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn line_span(&self) -> u32 {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Immutable fixture text plus the byte offset of every line start.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Byte offset of the first character of `line`.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let idx = (line as usize).checked_sub(1)?;
        self.line_starts.get(idx).copied()
    }

    /// Text of `line` without its terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Converts a byte offset to a position. Offsets past the end clamp to the end;
    /// offsets inside a multi-byte character round down to its start.
    pub fn position_of(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line_idx];
        let column = self.text[line_start..offset].chars().count() as u32 + 1;
        Position::new(line_idx as u32 + 1, column)
    }

    /// Converts a position back to a byte offset, if it lies inside the text.
    pub fn offset_of(&self, pos: Position) -> Option<usize> {
        let line_start = self.line_start(pos.line)?;
        let line = self.line_text(pos.line)?;
        let wanted = (pos.column as usize).checked_sub(1)?;
        if wanted == line.chars().count() {
            return Some(line_start + line.len());
        }
        line.char_indices()
            .nth(wanted)
            .map(|(byte, _)| line_start + byte)
    }

    /// Range for the byte span `[start, end)`.
    pub fn range_of(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.position_of(start), self.position_of(end))
    }

    /// Text covered by a byte span, clamped to the source.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text.get(start..end).unwrap_or("")
    }
}

/// Line starts for `\n`, `\r\n`, and lone `\r` terminators.
fn compute_line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => starts.push(i + 1),
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}
