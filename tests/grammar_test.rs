//! Line classification and marker-sequence tests

use reply_extract::{Marker, mark_message_lines, mark_thread_lines, process_marked_lines};

fn markers_of(lines: &[&str]) -> String {
    mark_message_lines(lines)
        .iter()
        .map(|m| m.as_char())
        .collect()
}

fn markers_from(codes: &str) -> Vec<Marker> {
    codes
        .chars()
        .map(|c| Marker::from_char(c).expect("valid marker code"))
        .collect()
}

#[test]
fn classifies_text_empty_quoted_and_forward_lines() {
    let lines = [
        "Hello",
        "",
        "> Hi",
        "---------- Forwarded message ----------",
    ];
    assert_eq!(markers_of(&lines), "temf");
}

#[test]
fn marks_every_line_of_a_multiline_splitter() {
    let lines = [
        "Hello",
        "From: bob@example.com",
        "Sent: Monday, April 2",
        "",
        "body",
    ];
    assert_eq!(markers_of(&lines), "tsset");
}

#[test]
fn single_header_line_is_not_a_splitter() {
    // One header-shaped line alone reads as ordinary text.
    let lines = ["Hello", "From: bob@example.com", "", "more text"];
    assert_eq!(markers_of(&lines), "ttet");
}

#[test]
fn wrote_banner_is_a_splitter() {
    let lines = [
        "Test reply",
        "",
        "On 11-Apr-2011, at 6:54 PM, Bob <bob@example.com> wrote:",
        "",
        "> quoted",
    ];
    assert_eq!(markers_of(&lines), "tesem");
}

#[test]
fn marker_codes_round_trip() {
    for marker in [
        Marker::Empty,
        Marker::Quoted,
        Marker::Forward,
        Marker::Splitter,
        Marker::Text,
    ] {
        assert_eq!(Marker::from_char(marker.as_char()), Some(marker));
    }
    assert_eq!(Marker::from_char('x'), None);
}

#[test]
fn quotation_after_splitter_is_deleted() {
    let lines = ["reply", "On date, Bob wrote:", "> one", "> two"];
    let processed = process_marked_lines(&lines, &markers_from("tsmm"));
    assert_eq!(processed.lines, vec!["reply"]);
    assert_eq!(processed.deleted, Some(1..4));
}

#[test]
fn reply_below_quotation_survives() {
    let lines = ["Hi", "On date, Bob wrote:", "> one", "> two", "reply"];
    let processed = process_marked_lines(&lines, &markers_from("tsmmt"));
    assert_eq!(processed.lines, vec!["Hi", "reply"]);
    assert_eq!(processed.deleted, Some(1..4));
}

#[test]
fn text_after_splitter_without_quotes_is_deleted_to_the_end() {
    let lines = ["my answer", "-----Original Message-----", "old body"];
    let processed = process_marked_lines(&lines, &markers_from("tst"));
    assert_eq!(processed.lines, vec!["my answer"]);
    assert_eq!(processed.deleted, Some(1..3));
}

#[test]
fn lone_quote_markers_without_border_are_text() {
    let lines = [">500 users", "", "> 200 events", "see the numbers"];
    let processed = process_marked_lines(&lines, &markers_from("memt"));
    assert_eq!(processed.lines, lines.to_vec());
    assert_eq!(processed.deleted, None);
}

#[test]
fn forward_banner_preserves_everything_below() {
    let lines = [
        "FYI",
        "",
        "---------- Forwarded message ----------",
        "From: Bob <bob@example.com>",
        "forwarded body",
    ];
    let processed = process_marked_lines(&lines, &markers_from("tefst"));
    assert_eq!(processed.lines, lines.to_vec());
    assert_eq!(processed.deleted, None);
}

#[test]
fn inline_reply_is_never_stripped() {
    let lines = [
        "On date, Bob wrote:",
        "> first point",
        "my answer to the first point",
        "> second point",
        "my answer to the second point",
    ];
    let processed = process_marked_lines(&lines, &markers_from("smtmt"));
    assert_eq!(processed.lines, lines.to_vec());
    assert_eq!(processed.deleted, None);
}

#[test]
fn wrapped_link_does_not_count_as_inline_reply() {
    let lines = [
        "On date, Bob wrote:",
        "> see the report (http://example.com/a/very",
        "/long/path)",
        "> and tell me what you think",
    ];
    let processed = process_marked_lines(&lines, &markers_from("smtm"));
    assert_eq!(processed.lines, Vec::<&str>::new());
    assert_eq!(processed.deleted, Some(0..4));
}

#[test]
fn empty_quotation_after_splitter_is_deleted() {
    let lines = ["Test reply", "", "On date, Bob wrote:"];
    let processed = process_marked_lines(&lines, &markers_from("tes"));
    assert_eq!(processed.lines, vec!["Test reply", ""]);
    assert_eq!(processed.deleted, Some(2..3));
}

#[test]
fn thread_marking_recognizes_quoted_splitters() {
    let body = "Hello\n\
                > On 11-Apr-2011, at 6:54 PM, Bob <bob@example.com> wrote:\n\
                > Hi";
    let markers = mark_thread_lines(body);
    assert_eq!(
        markers,
        vec![Marker::Text, Marker::Splitter, Marker::Quoted]
    );
}

#[test]
fn thread_marking_demotes_splitters_inside_header_blocks() {
    let body = "From: bob@example.com\n\
                Subject: On Mon, 16 Aug 2021, 14:28 David King <dking@example.com> wrote:\n\
                To: carol@example.com";
    let markers = mark_thread_lines(body);
    assert_ne!(markers[1], Marker::Splitter);
}
