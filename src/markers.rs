//! Per-line classification of a message body
//!
//! Each physical line is tagged with a [`Marker`]; the grammar pass in
//! [`crate::grammar`] then works on the marker sequence alone.

use std::fmt;

use crate::patterns::{
    self, QUOT_PATTERN, RE_FWD, RE_HEADER, SPLITTER_MAX_LINES, splitter_patterns,
};

/// Classification of a single body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Blank or whitespace-only line.
    Empty,
    /// Line starting with one or more `>` quote markers.
    Quoted,
    /// Forwarded-message banner.
    Forward,
    /// Line belonging to a reply splitter (`On ... wrote:`, header block).
    Splitter,
    /// Anything else; presumed author text.
    Text,
}

impl Marker {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => 'e',
            Self::Quoted => 'm',
            Self::Forward => 'f',
            Self::Splitter => 's',
            Self::Text => 't',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'e' => Some(Self::Empty),
            'm' => Some(Self::Quoted),
            'f' => Some(Self::Forward),
            's' => Some(Self::Splitter),
            't' => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Classifies every line of a message body.
///
/// Splitters are detected over a sliding window of up to
/// [`SPLITTER_MAX_LINES`] lines, so a wrapped `On ... wrote:` banner is
/// marked as a whole.
#[must_use]
pub fn mark_message_lines(lines: &[&str]) -> Vec<Marker> {
    let mut markers = vec![Marker::Empty; lines.len()];
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            markers[i] = Marker::Empty;
        } else if QUOT_PATTERN.is_match(line) {
            markers[i] = Marker::Quoted;
        } else if RE_FWD.is_match(line) {
            markers[i] = Marker::Forward;
        } else {
            let window_end = lines.len().min(i + SPLITTER_MAX_LINES);
            let window = lines[i..window_end].join("\n");
            if let Some(m) = patterns::is_splitter(&window) {
                // Mark every line the splitter spans and resume after it.
                let splitter_lines = m.as_str().lines().count().max(1);
                let end = lines.len().min(i + splitter_lines);
                for marker in &mut markers[i..end] {
                    *marker = Marker::Splitter;
                }
                i = end;
                continue;
            }
            markers[i] = Marker::Text;
        }
        i += 1;
    }
    markers
}

/// Like [`mark_message_lines`], but with leading whitespace stripped from
/// each line first, so space-indented headers are still recognized.
#[must_use]
pub fn mark_message_lines_unindented(lines: &[&str]) -> Vec<Marker> {
    let unindented: Vec<&str> = lines.iter().map(|line| line.trim_start()).collect();
    mark_message_lines(&unindented)
}

/// Classifies the lines of a whole conversation thread.
///
/// On top of [`mark_message_lines_unindented`] this recognizes splitters
/// buried under `>` indentation and demotes splitter marks that merely
/// continue a header block. Marking stops at the default line ceiling.
#[must_use]
pub fn mark_thread_lines(msg_body: &str) -> Vec<Marker> {
    let msg_body = crate::text::preprocess_thread(msg_body);
    let max_lines = crate::config::ExtractConfig::default().max_lines;
    let lines: Vec<&str> = msg_body.lines().take(max_lines).collect();
    let mut markers = mark_message_lines_unindented(&lines);

    // A quoted line that carries a splitter starts a deeper reply.
    for (i, line) in lines.iter().enumerate() {
        if markers[i] == Marker::Quoted
            && splitter_patterns().iter().any(|re| re.is_match(line))
        {
            markers[i] = Marker::Splitter;
        }
    }

    correct_splitters_in_headers(&lines, &mut markers);
    markers
}

/// Demotes splitter markers that continue a `label: value` header block.
///
/// The first header-shaped splitter line opens the block; further splitter
/// lines inside it are header continuations, not new reply boundaries.
fn correct_splitters_in_headers(lines: &[&str], markers: &mut [Marker]) {
    let mut in_header_block = false;
    for (i, line) in lines.iter().enumerate() {
        if markers[i] == Marker::Splitter {
            if in_header_block {
                markers[i] = if QUOT_PATTERN.is_match(line) {
                    Marker::Quoted
                } else {
                    Marker::Text
                };
            } else if RE_HEADER.is_match(line) {
                in_header_block = true;
            }
        }
        if !RE_HEADER.is_match(line) {
            in_header_block = false;
        }
    }
}
