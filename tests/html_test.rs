//! HTML reply extraction and flattening tests

use reply_extract::{ExtractError, Extractor, extract_from_html, html_to_text};

#[test]
fn gmail_quote_div_is_cut() {
    let body = r#"<html><body><div>Hello!</div><div class="gmail_quote">On Tue, Nov 8, 2022 at 9:12 AM, John <john@example.com> wrote:<blockquote><div>Original</div></blockquote></div></body></html>"#;
    let reply = extract_from_html(body);
    assert!(reply.contains("Hello!"));
    assert!(!reply.contains("gmail_quote"));
    assert!(!reply.contains("Original"));
}

#[test]
fn wholly_quoted_document_is_returned_unchanged() {
    // Stripping the only blockquote would leave nothing readable.
    let body = "<html><body><blockquote>Hi there</blockquote></body></html>";
    assert_eq!(extract_from_html(body), body);
}

#[test]
fn oversized_markup_is_returned_unchanged() {
    let body = "<div>".repeat(500);
    assert_eq!(extract_from_html(&body), body);
}

#[test]
fn blank_markup_is_returned_unchanged() {
    assert_eq!(extract_from_html(""), "");
    assert_eq!(extract_from_html("  "), "  ");
}

#[test]
fn trailing_blockquote_is_cut() {
    let body = "<html><body><p>My reply</p><blockquote><p>quoted</p></blockquote></body></html>";
    let reply = extract_from_html(body);
    assert_eq!(html_to_text(&reply).as_deref(), Some("My reply"));
}

#[test]
fn zimbra_divider_is_cut() {
    let body = r#"<html><body><div>Reply text</div><hr data-marker="__DIVIDER__"><div>Old</div></body></html>"#;
    let reply = extract_from_html(body);
    assert!(reply.contains("Reply text"));
    assert!(!reply.contains("__DIVIDER__"));
}

#[test]
fn outlook_splitter_block_is_cut() {
    let body = r#"<html><body><div>Reply</div><div style="border:none;border-top:solid #B5C4DF 1.0pt;padding:3.0pt 0cm 0cm 0cm"><p>From: Bob</p></div><div>Past thread</div></body></html>"#;
    let reply = extract_from_html(body);
    assert!(reply.contains("Reply"));
    assert!(!reply.contains("Past thread"));
}

#[test]
fn olk_src_body_section_is_cut() {
    let body = r#"<html><body><div>Reply</div><div id="OLK_SRC_BODY_SECTION"><div>old thread</div></div></body></html>"#;
    let reply = extract_from_html(body);
    assert!(reply.contains("Reply"));
    assert!(!reply.contains("old thread"));
}

#[test]
fn from_header_block_is_cut() {
    let body = "<html><body><div>Reply</div><div><div>From: bob@example.com<br>Date: Mon</div><div>old text</div></div></body></html>";
    let reply = extract_from_html(body);
    assert!(reply.contains("Reply"));
    assert!(!reply.contains("From:"));
    assert!(!reply.contains("old text"));
}

#[test]
fn wrote_banner_quotation_is_cut_via_checkpoints() {
    let body = "<html><body><div>Reply</div>\
                <div>On 11-Apr-2011, at 6:54 PM, Bob &lt;bob@example.com&gt; wrote:</div>\
                <div>&gt; Original<br>&gt; text</div></body></html>";
    let reply = extract_from_html(body);
    assert!(reply.contains("Reply"));
    assert!(!reply.contains("Original"));
    assert!(!reply.contains("wrote:"));
}

#[test]
fn namespaced_tags_are_renamed_in_the_output() {
    let body = "<html><body><o:p>Hi</o:p><div>Reply</div><blockquote>old</blockquote></body></html>";
    let reply = extract_from_html(body);
    assert!(reply.contains("<p>Hi</p>"));
    assert!(!reply.contains("o:p"));
}

#[test]
fn try_variant_reports_why_nothing_was_cut() {
    let body = "<html><body><p>just text, no quotation</p></body></html>";
    let err = Extractor::default()
        .try_extract_from_html(body)
        .expect_err("nothing to strip");
    assert!(matches!(err, ExtractError::NothingToStrip));
}

#[test]
fn flattening_renders_blocks_lists_and_links() {
    let markup = "<html><body><p>Hello</p><ul><li>one</li><li>two</li></ul>\
                  <a href=\"http://example.com\">link</a></body></html>";
    assert_eq!(
        html_to_text(markup).as_deref(),
        Some("Hello \n  * one \n  * two link (http://example.com)")
    );
}

#[test]
fn flattening_breaks_lines_at_hard_breaks() {
    assert_eq!(
        html_to_text("one<br>two<br>three").as_deref(),
        Some("one two \nthree")
    );
    assert_eq!(html_to_text("   "), None);
}
