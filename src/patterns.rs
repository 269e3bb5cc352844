//! Compiled pattern tables for splitter and marker detection
//!
//! Everything here is built once on first use and shared read-only across
//! threads for the lifetime of the process.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of physical lines a single splitter may span.
pub(crate) const SPLITTER_MAX_LINES: usize = 6;

/// One or more leading `>` quote markers, optionally followed by a space.
pub(crate) static QUOT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>+ ?").unwrap());

/// `---------- Forwarded message ----------` banner.
pub(crate) static RE_FWD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^-+[ ]*Forwarded message[ ]*-+\s*$").unwrap());

/// `On <date>, <person> wrote:` and its locale variants.
///
/// The date/name section may wrap onto up to two extra lines when long
/// display names or addresses are involved.
pub(crate) static RE_ON_DATE_SMB_WROTE: LazyLock<Regex> = LazyLock::new(|| {
    // Line openers: English, French, Polish, Dutch, German, Portuguese,
    // Norwegian, Swedish/Danish, Vietnamese.
    let on = "On|Le|W dniu|Op|Am|Em|På|Den|Vào";
    // Date and sender separator; Polish spells it out.
    let separator = ",|użytkownik";
    let wrote = "wrote|sent|a écrit|napisał|schreef|verzond|geschreven|schrieb\
                 |escreveu|skrev|đã viết";
    Regex::new(&format!(
        r"-*>? ?(?:{on}) .*(?:{separator})(?:.*\n){{0,2}}.*(?:{wrote}):?-*"
    ))
    .unwrap()
});

/// `Op <date> schreef <person>:` — locales that put the verb before the name.
pub(crate) static RE_ON_DATE_WROTE_SMB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-*>? ?(?:Op|Am) .*(?:.*\n){0,2}.*(?:schreef|verzond|geschreven|schrieb) *.*:")
        .unwrap()
});

/// `-----Original Message-----` / `---- Reply Message ----` banners
/// in English, German and Danish.
pub(crate) static RE_ORIGINAL_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\s*-+[ ]*(?:Original Message|Reply Message",
        r"|Ursprüngliche Nachricht|Antwort Nachricht",
        r"|Oprindelig meddelelse)[ ]*-+",
    ))
    .unwrap()
});

/// `From:`/`Date:`/`Subject:`/`To:` header blocks in several locales.
///
/// At least two consecutive header-like lines are required so that a stray
/// `From: ...` mention in running text is not taken for a splitter. Header
/// values may wrap onto one extra line, and the final header line may sit at
/// the very end of the window without a trailing newline.
pub(crate) static RE_FROM_COLON_OR_DATE_COLON: LazyLock<Regex> = LazyLock::new(|| {
    let labels = "From|Van|De|Von|Fra|Från\
                  |Date|Sent|Datum|Envoyé|Skickat|Sendt|Gesendet\
                  |Subject|Betreff|Objet|Emne|Ämne\
                  |To|An|Til|À|Till";
    Regex::new(&format!(
        r"(?i)(?:(?:_+\r?\n)?[ \t]*:?\*?(?:{labels})\s?:(?:[^\n]+(?:\n|$)){{1,2}}){{2,}}"
    ))
    .unwrap()
});

/// `02.04.2012 14:20 <person> <bob@example.com> ...:` style date + address.
pub(crate) static RE_DATE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(?:\d+/\d+/\d+|\d+\.\d+\.\d+).*\s\S+@\S+").unwrap());

/// `2014-10-17 11:28 GMT+03:00 Bob <bob@example.com>:` style date + address.
pub(crate) static RE_DATE_GMT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}\s+GMT.*\s\S+@\S+").unwrap()
});

/// `Thu, 26 Jun 2014 14:00:51 +0400 Bob <bob@example.com>:` RFC-2822-ish.
pub(crate) static RE_RFC_DATE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S{3,10}, \d\d? \S{3,10} 20\d\d,? \d\d?:\d\d(?::\d\d)?(?: \S+){3,6}@\S+:")
        .unwrap()
});

/// `Sent from Samsung MobileName <address@example.com> wrote:`.
pub(crate) static RE_SAMSUNG_WROTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sent from Samsung.* \S+@\S+> wrote").unwrap());

/// `---- John Smith wrote ----` Android reply banner.
pub(crate) static RE_ANDROID_WROTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-+.*wrote[ ]*-+").unwrap());

/// Polymail reply banner spanning a `mailto:` display block.
pub(crate) static RE_POLYMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)On.*\s{2}<\smailto:.*\s> wrote:").unwrap());

/// Angle-bracket link whose closing `>` could be mistaken for a quote marker.
pub(crate) static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(http://[^>]*)>").unwrap());

/// Neutralized form of [`RE_LINK`], restored during postprocessing.
pub(crate) static RE_NORMALIZED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@(http://[^>@]*)@@").unwrap());

/// Opening parenthesis link, which can legitimately break a quoted run.
pub(crate) static RE_PARENTHESIS_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(https?://").unwrap());

/// `label: value` shape used to recognize header lines in thread marking.
pub(crate) static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(": ").unwrap());

/// Line delimiter probe; the first hit decides `\r\n` vs `\n`.
pub(crate) static RE_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").unwrap());

/// Splitter patterns in priority order; the first match per window wins.
pub(crate) fn splitter_patterns() -> [&'static Regex; 10] {
    [
        &RE_ORIGINAL_MESSAGE,
        &RE_ON_DATE_SMB_WROTE,
        &RE_ON_DATE_WROTE_SMB,
        &RE_FROM_COLON_OR_DATE_COLON,
        &RE_DATE_EMAIL,
        &RE_DATE_GMT_EMAIL,
        &RE_RFC_DATE_EMAIL,
        &RE_SAMSUNG_WROTE,
        &RE_ANDROID_WROTE,
        &RE_POLYMAIL,
    ]
}

/// Emulates an anchored match: succeeds only when the pattern matches at
/// the very start of `text`.
pub(crate) fn match_at_start<'t>(re: &Regex, text: &'t str) -> Option<regex::Match<'t>> {
    re.find(text).filter(|m| m.start() == 0)
}

/// Returns the splitter match when `window` begins with a splitter.
pub(crate) fn is_splitter(window: &str) -> Option<regex::Match<'_>> {
    splitter_patterns()
        .iter()
        .find_map(|re| match_at_start(re, window))
}

/// Detect the line delimiter used by a message body.
pub(crate) fn get_delimiter(msg_body: &str) -> &'static str {
    match RE_DELIMITER.find(msg_body) {
        Some(m) if m.as_str() == "\r\n" => "\r\n",
        _ => "\n",
    }
}
