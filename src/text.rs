//! Plain-text extraction pipeline
//!
//! Preprocesses the body so links and joined splitter lines cannot confuse
//! line classification, strips the quoted span, then undoes the
//! preprocessing on the surviving text.

use crate::config::ExtractConfig;
use crate::grammar;
use crate::markers;
use crate::patterns::{self, RE_LINK, RE_NORMALIZED_LINK, RE_ON_DATE_SMB_WROTE};

/// Strips quotations, forwards included, from a plain-text body.
pub(crate) fn extract_from_plain(msg_body: &str, config: &ExtractConfig) -> String {
    let delimiter = patterns::get_delimiter(msg_body);
    let msg_body = preprocess(msg_body, delimiter, config.max_line_length);

    let all_lines: Vec<&str> = msg_body.lines().collect();
    // Lines past the ceiling are never stripped, only carried through.
    let cap = all_lines.len().min(config.max_lines);
    let (head, tail) = all_lines.split_at(cap);

    let line_markers = markers::mark_message_lines(head);
    let processed = grammar::process_marked_lines(head, &line_markers);

    let mut kept = processed.lines;
    kept.extend_from_slice(tail);
    postprocess(&kept.join(delimiter))
}

/// Normalizes link brackets and unwraps splitters glued to reply text.
pub(crate) fn preprocess(msg_body: &str, delimiter: &str, max_line_length: usize) -> String {
    let msg_body = replace_link_brackets(msg_body);
    wrap_splitter_with_newline(&msg_body, delimiter, max_line_length)
}

/// Link normalization alone, for thread marking where no splitter can be
/// glued to reply text.
pub(crate) fn preprocess_thread(msg_body: &str) -> String {
    replace_link_brackets(msg_body)
}

/// Restores link brackets and trims surrounding whitespace.
pub(crate) fn postprocess(msg_body: &str) -> String {
    RE_NORMALIZED_LINK
        .replace_all(msg_body, "<$1>")
        .trim()
        .to_owned()
}

/// Rewrites `<http://...>` links as `@@http://...@@` so the closing `>`
/// cannot be taken for a quote marker. Links on already-quoted lines keep
/// their original syntax.
fn replace_link_brackets(msg_body: &str) -> String {
    let mut out = String::with_capacity(msg_body.len());
    let mut last = 0;
    for caps in RE_LINK.captures_iter(msg_body) {
        let (Some(whole), Some(url)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&msg_body[last..whole.start()]);
        let line_start = msg_body[..whole.start()].rfind('\n').map_or(0, |i| i + 1);
        if msg_body[line_start..].starts_with('>') {
            out.push_str(whole.as_str());
        } else {
            out.push_str("@@");
            out.push_str(url.as_str());
            out.push_str("@@");
        }
        last = whole.end();
    }
    out.push_str(&msg_body[last..]);
    out
}

/// Moves an `On <date> <person> wrote:` splitter onto its own line when it
/// shares one with preceding reply text.
///
/// Skipped entirely when any line exceeds `max_line_length`; pathological
/// single-line bodies are not worth rewrapping.
pub(crate) fn wrap_splitter_with_newline(
    msg_body: &str,
    delimiter: &str,
    max_line_length: usize,
) -> String {
    if msg_body.lines().any(|line| line.len() > max_line_length) {
        return msg_body.to_owned();
    }
    let mut out = String::with_capacity(msg_body.len());
    let mut last = 0;
    for m in RE_ON_DATE_SMB_WROTE.find_iter(msg_body) {
        out.push_str(&msg_body[last..m.start()]);
        if m.start() > 0 && !msg_body[..m.start()].ends_with('\n') {
            out.push_str(delimiter);
        }
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&msg_body[last..]);
    out
}
