//! Signature detection at the bottom of a message
//!
//! The candidate selector narrows the search to the last few short lines,
//! then a sign-off pattern (or a pluggable classifier) decides where the
//! signature actually starts.

use std::sync::LazyLock;

use regex::Regex;

use crate::patterns;

/// A signature never spans more than this many non-empty lines.
const SIGNATURE_MAX_LINES: usize = 11;
/// Lines longer than this are body text, not signature.
const TOO_LONG_SIGNATURE_LINE: usize = 60;
/// Window scanned by the block-signature fallback.
const MAX_BLOCK_SIGNATURE_LINES: usize = 6;

/// Common sign-off openers; the trailing `.*` swallows the rest of the
/// candidate once one matches.
static RE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?ims)(?:",
        r"^\s*--*\s*[a-z \.]*$",
        r"|^\s*—+\s*$",
        r"|^thanks[\s,!]*$",
        r"|^regards[\s,!]*$",
        r"|^kind\sregards[\s,!]*$",
        r"|^take\scare[\s,!]*$",
        r"|^cheers[\s,!]*$",
        r"|^sincerely[\s,!]*$",
        r"|^best[ a-z]*[\s,!]*$",
        r").*",
    ))
    .unwrap()
});

/// Signatures appended by phone email clients.
static RE_PHONE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?ims)(?:",
        r"^sent from my[\s,!\w]*$",
        r"|^sent from Mailbox for iPhone.*$",
        r"|^sent (?:\S* )?from my BlackBerry.*$",
        r"|^Enviado desde mi (?:\S+ ){0,2}BlackBerry.*$",
        r").*",
    ))
    .unwrap()
});

static RE_PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\d{3}[-\.\s]??\d{3}[-\.\s]??\d{4}|\(\d{3}\)\s*\d{3}[-\.\s]??\d{4}|\d{3}[-\.\s]??\d{4})",
    )
    .unwrap()
});

static RE_EMAIL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^@]+@[^@]+\.[^@]+").unwrap());

/// Seam for a learned per-line signature model.
pub trait LineClassifier {
    /// Whether `line` belongs to the sender's signature.
    fn is_signature_line(&self, line: &str, sender: Option<&str>) -> bool;
}

/// Per-line classification used when a [`LineClassifier`] drives the
/// extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigMarker {
    Empty,
    Text,
    Signature,
}

/// Splits a message into body and signature.
///
/// ```
/// use reply_extract::extract_signature;
///
/// let (body, signature) = extract_signature("Hey man! How r u?\n\n--\nRegards,\nRoman");
/// assert_eq!(body, "Hey man! How r u?");
/// assert_eq!(signature.as_deref(), Some("--\nRegards,\nRoman"));
/// ```
#[must_use]
pub fn extract_signature(msg_body: &str) -> (String, Option<String>) {
    SignatureExtractor::default().extract(msg_body)
}

/// Returns the trailing lines that could hold a signature.
///
/// The lines are among the last eleven non-empty ones, exclude the first
/// line of the message, are short, and contain at most one dash-opened
/// line.
#[must_use]
pub fn get_signature_candidate<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    candidate_lines(lines, SIGNATURE_MAX_LINES, TOO_LONG_SIGNATURE_LINE)
}

/// Signature extractor with adjustable limits and sign-off patterns.
#[derive(Debug, Clone)]
pub struct SignatureExtractor {
    pub max_lines: usize,
    pub max_line_length: usize,
    signoff: Regex,
}

impl Default for SignatureExtractor {
    fn default() -> Self {
        Self {
            max_lines: SIGNATURE_MAX_LINES,
            max_line_length: TOO_LONG_SIGNATURE_LINE,
            signoff: RE_SIGNATURE.clone(),
        }
    }
}

impl SignatureExtractor {
    /// Builds an extractor around custom sign-off openers, for locales the
    /// default set does not cover. Each pattern is anchored to a whole
    /// line with its final character class repeated, so `r"thanks[\s,!]"`
    /// becomes `^thanks[\s,!]*$`.
    pub fn with_signoff_patterns(greetings: &[&str]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = greetings
            .iter()
            .map(|greeting| format!("^{greeting}*$"))
            .collect();
        let signoff = Regex::new(&format!("(?ims)(?:{}).*", alternatives.join("|")))?;
        Ok(Self {
            signoff,
            ..Self::default()
        })
    }

    /// Splits `msg_body` into body and signature.
    ///
    /// A phone-client signature is stripped first and reattached to
    /// whatever signature is found below it. When the sign-off patterns
    /// find nothing, a block of short bottom lines anchored by a phone
    /// number or email address is accepted instead.
    #[must_use]
    pub fn extract(&self, msg_body: &str) -> (String, Option<String>) {
        let delimiter = patterns::get_delimiter(msg_body);
        let mut stripped_body = msg_body.trim().to_owned();

        let mut phone_signature = None;
        if let Some(m) = RE_PHONE_SIGNATURE.find(&stripped_body) {
            let start = m.start();
            phone_signature = Some(m.as_str().to_owned());
            stripped_body.truncate(start);
        }

        let lines: Vec<&str> = stripped_body.lines().collect();
        let candidate =
            candidate_lines(&lines, self.max_lines, self.max_line_length).join(delimiter);

        let signature = self
            .signoff
            .find(&candidate)
            .map(|m| m.as_str().to_owned())
            .or_else(|| self.block_signature(&stripped_body, delimiter));

        let Some(signature) = signature else {
            return (stripped_body.trim().to_owned(), phone_signature);
        };

        // Rejoining can drop a trailing newline that splitlines consumed,
        // so the suffix is stripped from the rejoined text.
        let rejoined = lines.join(delimiter);
        let body = rejoined
            .strip_suffix(signature.as_str())
            .unwrap_or(&rejoined)
            .to_owned();
        let signature = match phone_signature {
            Some(phone) => format!("{signature}{delimiter}{phone}"),
            None => signature,
        };
        (body.trim().to_owned(), Some(signature.trim().to_owned()))
    }

    /// Like [`Self::extract`] but with a classifier deciding which lines
    /// are signature, instead of the sign-off patterns.
    #[must_use]
    pub fn extract_with_classifier(
        &self,
        msg_body: &str,
        sender: Option<&str>,
        classifier: &dyn LineClassifier,
    ) -> (String, Option<String>) {
        let delimiter = patterns::get_delimiter(msg_body);
        let body = msg_body.trim();
        let lines: Vec<&str> = body.lines().collect();

        let candidate = candidate_lines(&lines, self.max_lines, self.max_line_length);
        let offset = lines.len() - candidate.len();
        let mut markers = vec![SigMarker::Text; lines.len()];
        for (i, line) in candidate.iter().enumerate() {
            markers[offset + i] = if line.trim().is_empty() {
                SigMarker::Empty
            } else if classifier.is_signature_line(line, sender) {
                SigMarker::Signature
            } else {
                SigMarker::Text
            };
        }

        let extent = reverse_signature_extent(&markers);
        if extent == 0 {
            return (body.to_owned(), None);
        }
        let split = lines.len() - extent;
        let text = lines[..split].join(delimiter);
        if text.trim().is_empty() {
            return (body.to_owned(), None);
        }
        (text, Some(lines[split..].join(delimiter)))
    }

    /// Accepts a couple of short lines at the very bottom that contain a
    /// phone number or an email address, quoted-colleague style blocks.
    fn block_signature(&self, msg_body: &str, delimiter: &str) -> Option<String> {
        let lines: Vec<&str> = msg_body.lines().collect();
        let line_count = lines.len();
        let stop = line_count.saturating_sub(MAX_BLOCK_SIGNATURE_LINES + 2);

        let mut found_content = false;
        let mut found_phone = false;
        let mut found_email = false;

        for i in (stop + 1..line_count).rev() {
            if lines[i].chars().count() > self.max_line_length {
                return None;
            }
            if lines[i].trim().is_empty() {
                if !found_content {
                    continue;
                }
                if found_phone || found_email {
                    return Some(lines[i + 1..].join(delimiter));
                }
                return None;
            }
            found_content = true;
            if patterns::match_at_start(&RE_PHONE_NUMBER, lines[i]).is_some() {
                found_phone = true;
            }
            if patterns::match_at_start(&RE_EMAIL_ADDRESS, lines[i]).is_some() {
                found_email = true;
            }
        }
        None
    }
}

/// The candidate selection shared by every extraction flavor.
fn candidate_lines<'a>(
    lines: &'a [&'a str],
    max_lines: usize,
    max_line_length: usize,
) -> &'a [&'a str] {
    let non_empty: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    // An empty or single-line message carries no signature, and the first
    // line never starts one.
    if non_empty.len() <= 1 {
        return &[];
    }
    let candidate = &non_empty[1..];
    let candidate = &candidate[candidate.len().saturating_sub(max_lines)..];

    let markers = mark_candidate_indexes(lines, candidate, max_line_length);
    let take = signature_candidate_length(&markers);
    if take == 0 {
        return &[];
    }
    &lines[candidate[candidate.len() - take]..]
}

/// Marks each candidate line: `l` long, `d` dash-opened, `c` otherwise.
///
/// A line of dashes alone is an ordinary candidate; `d` is reserved for
/// dash-plus-content lines, which may equally be list items.
fn mark_candidate_indexes(lines: &[&str], candidate: &[usize], max_line_length: usize) -> Vec<u8> {
    candidate
        .iter()
        .map(|&idx| {
            let line = lines[idx].trim();
            if line.chars().count() > max_line_length {
                b'l'
            } else if line.starts_with('-') && !line.trim_matches('-').is_empty() {
                b'd'
            } else {
                b'c'
            }
        })
        .collect()
}

/// Number of trailing candidate lines that form the signature: the run of
/// ordinary lines from the bottom, optionally opened by a single dash
/// line. A long line or doubled dash lines break the run.
fn signature_candidate_length(markers: &[u8]) -> usize {
    let reversed: Vec<u8> = markers.iter().rev().copied().collect();
    let plain = reversed.iter().take_while(|&&m| m == b'c').count();
    let next = reversed.get(plain).copied();
    let after_next = reversed.get(plain + 1).copied();

    let dash_opener = next == Some(b'd') && after_next != Some(b'd');
    if plain > 0 {
        if dash_opener { plain + 1 } else { plain }
    } else if dash_opener {
        1
    } else {
        0
    }
}

/// Trailing line count matched by blocks of `empty* (text empty*){0,2}
/// signature`, scanned over the reversed markers.
fn reverse_signature_extent(markers: &[SigMarker]) -> usize {
    let reversed: Vec<SigMarker> = markers.iter().rev().copied().collect();
    let mut pos = 0;
    loop {
        let start = pos;
        while reversed.get(pos) == Some(&SigMarker::Empty) {
            pos += 1;
        }
        let mut text_blocks = 0;
        while text_blocks < 2 && reversed.get(pos) == Some(&SigMarker::Text) {
            pos += 1;
            while reversed.get(pos) == Some(&SigMarker::Empty) {
                pos += 1;
            }
            text_blocks += 1;
        }
        if reversed.get(pos) == Some(&SigMarker::Signature) {
            pos += 1;
        } else {
            pos = start;
            break;
        }
    }
    pos
}
