//! Marker-sequence analysis
//!
//! Decides, from the [`Marker`] sequence alone, which line span belongs to
//! the quoted thread and which lines are the author's own message.

use std::ops::Range;

use crate::markers::Marker;
use crate::patterns::{self, RE_PARENTHESIS_LINK};

/// Outcome of a [`process_marked_lines`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedLines<'a> {
    /// Lines of the last message, in original order.
    pub lines: Vec<&'a str>,
    /// Index range of the stripped span, when anything was stripped.
    pub deleted: Option<Range<usize>>,
}

impl<'a> ProcessedLines<'a> {
    fn untouched(lines: &[&'a str]) -> Self {
        Self {
            lines: lines.to_vec(),
            deleted: None,
        }
    }
}

/// Strips the quoted part of a message given its classified lines.
///
/// Returns the surviving lines together with the deleted index range.
/// When nothing can be stripped safely the lines come back unchanged.
#[must_use]
pub fn process_marked_lines<'a>(lines: &[&'a str], markers: &[Marker]) -> ProcessedLines<'a> {
    debug_assert_eq!(lines.len(), markers.len());
    let mut markers = markers.to_vec();

    // Without a splitter or a solid run of quoted lines, `>` prefixes are
    // literal text rather than a quotation.
    if !markers.contains(&Marker::Splitter) && !has_quoted_run(&markers, 3) {
        for marker in &mut markers {
            if *marker == Marker::Quoted {
                *marker = Marker::Text;
            }
        }
    }

    // A forwarded message is sent on verbatim.
    if starts_with_forward(&markers) {
        return ProcessedLines::untouched(lines);
    }

    // Text wedged between quoted runs means the author replied inline;
    // nothing can be stripped then. A wrapped long link is the exception,
    // it breaks a quoted run without being a reply.
    for p in inline_reply_positions(&markers) {
        let next_line = lines.get(p + 1).map_or("", |line| line.trim());
        let is_link = RE_PARENTHESIS_LINK.is_match(lines[p])
            || patterns::match_at_start(&RE_PARENTHESIS_LINK, next_line).is_some();
        if !is_link {
            return ProcessedLines::untouched(lines);
        }
    }

    // A splitter followed by plain text with no quote markers below it:
    // everything from the splitter down belongs to the previous message.
    let mut i = 0;
    while i < markers.len() {
        if markers[i] == Marker::Splitter {
            let mut j = i;
            while j < markers.len() && matches!(markers[j], Marker::Splitter | Marker::Empty) {
                j += 1;
            }
            if j < markers.len() && matches!(markers[j], Marker::Text | Marker::Forward) {
                return ProcessedLines {
                    lines: lines[..i].to_vec(),
                    deleted: Some(i..lines.len()),
                };
            }
            i = j;
        } else {
            i += 1;
        }
    }

    if let Some(span) = quotation_span(&markers).or_else(|| empty_quotation_span(&markers)) {
        let mut kept = lines[..span.start].to_vec();
        kept.extend_from_slice(&lines[span.end..]);
        return ProcessedLines {
            lines: kept,
            deleted: Some(span),
        };
    }

    ProcessedLines::untouched(lines)
}

/// True when some run of quoted lines, blank lines allowed in between,
/// contains at least `min_quoted` quote markers.
fn has_quoted_run(markers: &[Marker], min_quoted: usize) -> bool {
    let mut run = 0;
    for marker in markers {
        match marker {
            Marker::Quoted => {
                run += 1;
                if run >= min_quoted {
                    return true;
                }
            }
            Marker::Empty => {}
            _ => run = 0,
        }
    }
    false
}

/// True when the first non-text, non-blank marker is a forward banner.
fn starts_with_forward(markers: &[Marker]) -> bool {
    markers
        .iter()
        .find(|marker| !matches!(marker, Marker::Text | Marker::Empty))
        .is_some_and(|marker| *marker == Marker::Forward)
}

/// Positions of quoted lines directly followed, modulo blank lines, by text
/// that runs into another quoted line.
fn inline_reply_positions(markers: &[Marker]) -> Vec<usize> {
    let mut positions = Vec::new();
    for (p, &marker) in markers.iter().enumerate() {
        if marker != Marker::Quoted {
            continue;
        }
        let Some(offset) = markers[p + 1..]
            .iter()
            .position(|m| *m != Marker::Empty)
        else {
            continue;
        };
        let q = p + 1 + offset;
        if markers[q] != Marker::Text {
            continue;
        }
        let Some(offset) = markers[q + 1..]
            .iter()
            .position(|m| !matches!(m, Marker::Text | Marker::Empty))
        else {
            continue;
        };
        if markers[q + 1 + offset] == Marker::Quoted {
            positions.push(p);
        }
    }
    positions
}

/// Span of a quotation that ends with a quoted line.
///
/// The border is either a splitter or two quoted lines in a row; the span
/// runs through the last quoted line plus any blank lines after it, and
/// only text or blank lines may remain below.
fn quotation_span(markers: &[Marker]) -> Option<Range<usize>> {
    let last_quoted = markers.iter().rposition(|m| *m == Marker::Quoted)?;
    if markers[last_quoted + 1..]
        .iter()
        .any(|m| !matches!(m, Marker::Text | Marker::Empty))
    {
        return None;
    }
    let start = (0..last_quoted).find(|&i| match markers[i] {
        Marker::Splitter => true,
        Marker::Quoted => markers[i + 1..]
            .iter()
            .position(|m| *m != Marker::Empty)
            .is_some_and(|offset| {
                let a = i + 1 + offset;
                markers[a] == Marker::Quoted && last_quoted > a
            }),
        _ => false,
    })?;
    let mut end = last_quoted + 1;
    while end < markers.len() && markers[end] == Marker::Empty {
        end += 1;
    }
    Some(start..end)
}

/// Span of a quotation with no text after its border: a run of splitter
/// lines, or a run of at least two quoted lines, blanks included.
fn empty_quotation_span(markers: &[Marker]) -> Option<Range<usize>> {
    let mut i = 0;
    while i < markers.len() {
        match markers[i] {
            Marker::Splitter => {
                let mut j = i;
                while j < markers.len() && matches!(markers[j], Marker::Splitter | Marker::Empty) {
                    j += 1;
                }
                return Some(i..j);
            }
            Marker::Quoted => {
                let mut j = i;
                let mut quoted = 0;
                while j < markers.len() && matches!(markers[j], Marker::Quoted | Marker::Empty) {
                    if markers[j] == Marker::Quoted {
                        quoted += 1;
                    }
                    j += 1;
                }
                if quoted >= 2 {
                    return Some(i..j);
                }
                i = j;
            }
            _ => i += 1,
        }
    }
    None
}
