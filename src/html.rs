//! HTML extraction pipeline
//!
//! Known quotation blocks (Gmail, Outlook, Zimbra and friends) are cut
//! straight out of the tree. Whatever splitter survives is found by the
//! plain-text machinery: every text slot in the tree gets a sentinel
//! checkpoint token, the tree is flattened to text, the text algorithm
//! decides which lines are quotation, and the tags owning the checkpoints
//! on those lines are deleted from an untouched copy of the tree.

use std::sync::LazyLock;

use html5ever::{LocalName, QualName, ns};
use kuchikikiki::traits::TendrilSink;
use kuchikikiki::{Attribute, ExpandedName, NodeData, NodeRef, parse_html};
use regex::Regex;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::grammar;
use crate::markers;
use crate::patterns::{self, RE_FWD};
use crate::text;

/// Sentinel token injected into every text slot of the working tree.
static RE_CHECKPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#!%!(\d+)!%!#").unwrap());

/// XML declaration and doctype, cut out before parsing.
static RE_XML_PROLOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\?xml.+\?>|<!DOCTYPE.+]>").unwrap());

/// Runs of blank lines produced by stacked block elements.
static RE_EXCESSIVE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,10}").unwrap());

/// Elements whose id marks a quoted section.
const QUOTE_IDS: [&str; 1] = ["OLK_SRC_BODY_SECTION"];

/// Outlook and Windows Mail splitter styles, matched verbatim.
const MICROSOFT_SPLITTER_STYLES: [&str; 3] = [
    "border:none;border-top:solid #B5C4DF 1.0pt;padding:3.0pt 0cm 0cm 0cm",
    "border:none;border-top:solid #B5C4DF 1.0pt;padding:3.0pt 0in 0in 0in",
    "padding-top: 5px; border-top-color: rgb(229, 229, 229); \
     border-top-width: 1px; border-top-style: solid;",
];

fn checkpoint_token(counter: usize) -> String {
    format!("#!%!{counter}!%!#")
}

/// Strips quotations from an HTML body, returning it unchanged when no cut
/// can be made safely.
pub(crate) fn extract_from_html(msg_body: &str, config: &ExtractConfig) -> String {
    match reduce_html(msg_body, config) {
        Ok(reduced) => reduced,
        Err(err) => {
            debug!(error = %err, "returning html body unchanged");
            msg_body.to_owned()
        }
    }
}

/// The fallible core of [`extract_from_html`].
pub(crate) fn reduce_html(msg_body: &str, config: &ExtractConfig) -> Result<String> {
    if msg_body.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    let body = msg_body.replace("\r\n", "\n");
    let body = RE_XML_PROLOG.replace_all(&body, "").into_owned();

    let tag_count = body.matches('<').count();
    if tag_count > config.max_tags {
        return Err(ExtractError::TooManyTags(tag_count));
    }

    let document = parse_html().one(body);
    let root = document
        .select_first("html")
        .map_err(|()| ExtractError::NoRootElement)?
        .as_node()
        .clone();

    // Only the first cut that fires is applied.
    let cut = cut_gmail_quote(&root)
        || cut_zimbra_quote(&root)
        || cut_blockquote(&root)
        || cut_microsoft_quote(&root)
        || cut_by_id(&root)
        || cut_from_block(&root);

    // Pristine copy taken before checkpoints pollute the text slots.
    let copy = deep_clone(&root).ok_or(ExtractError::NoRootElement)?;

    let checkpoint_total = add_checkpoint(&root, 0);
    let mut quotation_checkpoints = vec![false; checkpoint_total];

    // Link-bracket normalization is moot after flattening, but a splitter
    // glued to reply text still needs its own line before classification.
    let plain_text = html_tree_to_text(&root);
    let plain_text = text::wrap_splitter_with_newline(&plain_text, "\n", config.max_line_length);
    let lines: Vec<&str> = plain_text.lines().collect();
    if lines.len() > config.max_lines {
        return Err(ExtractError::TooManyLines(lines.len()));
    }

    // Collect checkpoint ids per line, then hide the tokens from the
    // classifier.
    let line_checkpoints: Vec<Vec<usize>> = lines
        .iter()
        .map(|line| {
            RE_CHECKPOINT
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .filter_map(|id| id.as_str().parse().ok())
                .collect()
        })
        .collect();
    let stripped: Vec<String> = lines
        .iter()
        .map(|line| RE_CHECKPOINT.replace_all(line, "").into_owned())
        .collect();
    let stripped_refs: Vec<&str> = stripped.iter().map(String::as_str).collect();

    let line_markers = markers::mark_message_lines(&stripped_refs);
    let processed = grammar::process_marked_lines(&stripped_refs, &line_markers);

    if processed.deleted.is_none() && !cut {
        return Err(ExtractError::NothingToStrip);
    }

    if let Some(deleted) = processed.deleted {
        for line in &line_checkpoints[deleted] {
            for &checkpoint in line {
                if let Some(flag) = quotation_checkpoints.get_mut(checkpoint) {
                    *flag = true;
                }
            }
        }
        delete_quotation_tags(&copy, 0, &quotation_checkpoints);
    }

    if html_tree_to_text(&copy).trim().is_empty() {
        return Err(ExtractError::EmptyResult);
    }

    remove_namespaces(&copy);
    serialize_tree(&copy)
}

/// Renders an HTML fragment to readable plain text.
///
/// Block elements force line breaks, list items get a bullet prefix and
/// link targets are appended in parentheses. Returns `None` when the
/// markup is blank or too big to parse.
#[must_use]
pub fn html_to_text(markup: &str) -> Option<String> {
    if markup.trim().is_empty() {
        return None;
    }
    let compact = markup.replace('\n', "");
    if compact.matches('<').count() > ExtractConfig::default().max_tags {
        return None;
    }
    let document = parse_html().one(compact);
    let root = document.select_first("html").ok()?;
    Some(html_tree_to_text(root.as_node()))
}

/// Flattens a tree to plain text, dropping styles and comments as it goes.
pub(crate) fn html_tree_to_text(root: &NodeRef) -> String {
    let styles: Vec<NodeRef> = root
        .select("style")
        .map(|iter| iter.map(|style| style.as_node().clone()).collect())
        .unwrap_or_default();
    for style in styles {
        style.detach();
    }
    let comments: Vec<NodeRef> = root
        .inclusive_descendants()
        .filter(|node| matches!(node.data(), NodeData::Comment(_)))
        .collect();
    for comment in comments {
        comment.detach();
    }

    let mut text = String::new();
    for el in elements(root) {
        let Some(data) = el.as_element() else { continue };
        let name: &str = &data.name.local;
        let el_text = format!("{}{}", leading_text(&el), tail_text(&el));
        if el_text.chars().count() > 1 {
            if matches!(name, "div" | "p" | "ul" | "li" | "h1" | "h2" | "h3") {
                text.push('\n');
            }
            if name == "li" {
                text.push_str("  * ");
            }
            text.push_str(el_text.trim());
            text.push(' ');
            if let Some(href) = data.attributes.borrow().get("href") {
                text.push('(');
                text.push_str(href);
                text.push_str(") ");
            }
        }
        if matches!(name, "br" | "hr" | "tr") && !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    }

    RE_EXCESSIVE_NEWLINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_owned()
}

/// Appends a checkpoint token to the text and tail slot of every element,
/// pre-order, and returns the number of checkpoints handed out.
fn add_checkpoint(el: &NodeRef, mut counter: usize) -> usize {
    append_to_leading_text(el, &checkpoint_token(counter));
    counter += 1;

    let children: Vec<NodeRef> = element_children(el);
    for child in children {
        counter = add_checkpoint(&child, counter);
    }

    append_to_tail_text(el, &checkpoint_token(counter));
    counter += 1;
    counter
}

/// Clears the text slots whose checkpoints landed on quotation lines and
/// detaches children that turned out to be entirely quotation.
///
/// Returns the running counter and whether `el` itself is all quotation,
/// in which case its parent takes care of the removal.
fn delete_quotation_tags(el: &NodeRef, mut counter: usize, checkpoints: &[bool]) -> (usize, bool) {
    let mut in_quotation = true;

    if checkpoints.get(counter).copied().unwrap_or(false) {
        clear_leading_text(el);
    } else {
        in_quotation = false;
    }
    counter += 1;

    let mut quotation_children = Vec::new();
    for child in element_children(el) {
        let (next, child_in_quotation) = delete_quotation_tags(&child, counter, checkpoints);
        counter = next;
        if child_in_quotation {
            quotation_children.push(child);
        }
    }

    if checkpoints.get(counter).copied().unwrap_or(false) {
        clear_tail_text(el);
    } else {
        in_quotation = false;
    }
    counter += 1;

    if !in_quotation {
        for child in quotation_children {
            detach_with_tail(&child);
        }
    }
    (counter, in_quotation)
}

/// Cuts the first `div.gmail_quote`, unless it opens with a forward banner.
fn cut_gmail_quote(root: &NodeRef) -> bool {
    let Ok(quote) = root.select_first("div.gmail_quote") else {
        return false;
    };
    let node = quote.as_node().clone();
    let leading = leading_text(&node);
    if patterns::match_at_start(&RE_FWD, &leading).is_some() {
        return false;
    }
    detach_with_tail(&node);
    true
}

/// Cuts the Zimbra reply divider.
fn cut_zimbra_quote(root: &NodeRef) -> bool {
    let Ok(divider) = root.select_first(r#"hr[data-marker="__DIVIDER__"]"#) else {
        return false;
    };
    detach_with_tail(&divider.as_node().clone());
    true
}

/// Cuts the last non-nested blockquote, Gmail quotes excluded.
fn cut_blockquote(root: &NodeRef) -> bool {
    let quote = elements(root).into_iter().rev().find(|el| {
        element_name_is(el, "blockquote")
            && attr(el, "class").as_deref() != Some("gmail_quote")
            && !el
                .ancestors()
                .any(|ancestor| element_name_is(&ancestor, "blockquote"))
    });
    let Some(quote) = quote else { return false };
    detach_with_tail(&quote);
    true
}

/// Cuts an Outlook or Windows Mail splitter block and everything below it.
fn cut_microsoft_quote(root: &NodeRef) -> bool {
    let mut splitter = elements(root).into_iter().find(|el| {
        element_name_is(el, "div")
            && attr(el, "style")
                .is_some_and(|style| MICROSOFT_SPLITTER_STYLES.contains(&style.as_str()))
    });

    if let Some(found) = &splitter {
        // Outlook 2010 wraps the splitter styling in an inner div.
        if let Some(parent) = parent_element(found) {
            let first_child = parent
                .children()
                .find(|child| child.as_element().is_some());
            if first_child.as_ref() == Some(found) {
                splitter = Some(parent);
            }
        }
    } else {
        splitter = outlook_2003_splitter(root);
    }

    let Some(splitter) = splitter else { return false };
    while let Some(next) = splitter.next_sibling() {
        next.detach();
    }
    splitter.detach();
    true
}

/// The Outlook 2003 splitter: a deeply nested `<hr>` with fixed attributes.
fn outlook_2003_splitter(root: &NodeRef) -> Option<NodeRef> {
    elements(root).into_iter().find_map(|el| {
        if !element_name_is(&el, "hr")
            || attr(&el, "size").as_deref() != Some("3")
            || attr(&el, "width").as_deref() != Some("100%")
            || attr(&el, "align").as_deref() != Some("center")
            || attr(&el, "tabindex").as_deref() != Some("-1")
        {
            return None;
        }
        let span = parent_element(&el).filter(|p| element_name_is(p, "span"))?;
        let font = parent_element(&span).filter(|p| element_name_is(p, "font"))?;
        let inner_div = parent_element(&font).filter(|p| {
            element_name_is(p, "div")
                && attr(p, "class").as_deref() == Some("MsoNormal")
                && attr(p, "align").as_deref() == Some("center")
                && attr(p, "style").as_deref() == Some("text-align:center")
        })?;
        parent_element(&inner_div).filter(|p| element_name_is(p, "div"))
    })
}

/// Cuts elements carrying a known quote id.
fn cut_by_id(root: &NodeRef) -> bool {
    let mut found = false;
    for quote_id in QUOTE_IDS {
        if let Ok(quote) = root.select_first(&format!("#{quote_id}")) {
            detach_with_tail(&quote.as_node().clone());
            found = true;
        }
    }
    found
}

/// Cuts the div wrapping a `From:`/`Date:` header block, or the block
/// trailing a bare `<hr>`.
fn cut_from_block(root: &NodeRef) -> bool {
    // Header block enclosed in some tag.
    let block = elements(root).into_iter().rev().find(|el| {
        let content = el.text_contents();
        let content = content.trim_start();
        content.starts_with("From:") || content.starts_with("Date:")
    });

    if let Some(block) = block {
        let mut parent_div = None;
        let mut cursor = Some(block);
        while let Some(node) = cursor {
            if parent_element(&node).is_none() {
                break;
            }
            if element_name_is(&node, "div") {
                parent_div = Some(node);
                break;
            }
            cursor = parent_element(&node);
        }

        let Some(parent_div) = parent_div else {
            return false;
        };
        // When this div is the whole body, the quote is presumed to be
        // unenclosed; fall through to the tail-based search.
        let div_is_all_content = parent_element(&parent_div).is_some_and(|body| {
            element_name_is(&body, "body")
                && body
                    .children()
                    .filter(|child| child.as_element().is_some())
                    .count()
                    == 1
        });
        if !div_is_all_content {
            while let Some(next) = parent_div.next_sibling() {
                next.detach();
            }
            parent_div.detach();
            return true;
        }
    }

    // Header block starting in an element's tail, e.g. right after an <hr>.
    let block = elements(root).into_iter().find(|el| {
        let tail = tail_text(el);
        tail.starts_with("From:") || tail.starts_with("Date:")
    });
    let Some(block) = block else { return false };

    if let Some(parent) = parent_element(&block) {
        if patterns::match_at_start(&RE_FWD, &leading_text(&parent)).is_some() {
            return false;
        }
    }
    while let Some(next) = block.next_sibling() {
        next.detach();
    }
    block.detach();
    true
}

/// Renames namespaced elements (`<o:p>` becomes `<p>`) and drops
/// namespaced attributes; HTML parsers treat the colon as part of the
/// name, which renders the tags unrecognizable downstream.
fn remove_namespaces(root: &NodeRef) {
    for el in elements(root) {
        let Some(data) = el.as_element() else { continue };

        let prefixed: Vec<ExpandedName> = data
            .attributes
            .borrow()
            .map
            .keys()
            .filter(|key| key.local.contains(':'))
            .cloned()
            .collect();
        for key in prefixed {
            data.attributes.borrow_mut().map.remove(&key);
        }

        let local = data.name.local.to_string();
        if let Some(idx) = local.rfind(':') {
            let bare = &local[idx + 1..];
            if bare.is_empty() {
                continue;
            }
            let attributes: Vec<(ExpandedName, Attribute)> = data
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let replacement = NodeRef::new_element(
                QualName::new(None, ns!(html), LocalName::from(bare)),
                attributes,
            );
            while let Some(child) = el.first_child() {
                replacement.append(child);
            }
            el.insert_before(replacement);
            el.detach();
        }
    }
}

fn serialize_tree(root: &NodeRef) -> Result<String> {
    let mut buf = Vec::new();
    root.serialize(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Deep copy of an element subtree. Nodes that cannot exist inside an
/// element, document roots for one, are skipped.
fn deep_clone(node: &NodeRef) -> Option<NodeRef> {
    let copy = match node.data() {
        NodeData::Element(data) => {
            let attributes: Vec<(ExpandedName, Attribute)> = data
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            NodeRef::new_element(data.name.clone(), attributes)
        }
        NodeData::Text(text) => NodeRef::new_text(text.borrow().clone()),
        NodeData::Comment(comment) => NodeRef::new_comment(comment.borrow().clone()),
        _ => return None,
    };
    for child in node.children() {
        if let Some(child_copy) = deep_clone(&child) {
            copy.append(child_copy);
        }
    }
    Some(copy)
}

/// All elements under `root` in document order, `root` included.
fn elements(root: &NodeRef) -> Vec<NodeRef> {
    root.inclusive_descendants()
        .filter(|node| node.as_element().is_some())
        .collect()
}

fn element_children(el: &NodeRef) -> Vec<NodeRef> {
    el.children()
        .filter(|child| child.as_element().is_some())
        .collect()
}

fn element_name_is(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|data| &*data.name.local == name)
}

fn parent_element(node: &NodeRef) -> Option<NodeRef> {
    node.parent().filter(|parent| parent.as_element().is_some())
}

fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|data| data.attributes.borrow().get(name).map(ToOwned::to_owned))
}

/// Text before the first non-text child; the element's own text slot.
fn leading_text(el: &NodeRef) -> String {
    let mut out = String::new();
    let mut cursor = el.first_child();
    while let Some(node) = cursor {
        match node.as_text() {
            Some(text) => out.push_str(&text.borrow()),
            None => break,
        }
        cursor = node.next_sibling();
    }
    out
}

/// Text between this element and its next non-text sibling; its tail slot.
fn tail_text(el: &NodeRef) -> String {
    let mut out = String::new();
    let mut cursor = el.next_sibling();
    while let Some(node) = cursor {
        match node.as_text() {
            Some(text) => out.push_str(&text.borrow()),
            None => break,
        }
        cursor = node.next_sibling();
    }
    out
}

fn append_to_leading_text(el: &NodeRef, token: &str) {
    let mut last_text = None;
    let mut cursor = el.first_child();
    while let Some(node) = cursor {
        if node.as_text().is_none() {
            break;
        }
        cursor = node.next_sibling();
        last_text = Some(node);
    }
    match last_text {
        Some(node) => node.insert_after(NodeRef::new_text(token)),
        None => el.prepend(NodeRef::new_text(token)),
    }
}

fn append_to_tail_text(el: &NodeRef, token: &str) {
    let mut last = el.clone();
    while let Some(node) = last.next_sibling() {
        if node.as_text().is_none() {
            break;
        }
        last = node;
    }
    last.insert_after(NodeRef::new_text(token));
}

fn clear_leading_text(el: &NodeRef) {
    while let Some(node) = el.first_child() {
        if node.as_text().is_none() {
            break;
        }
        node.detach();
    }
}

fn clear_tail_text(el: &NodeRef) {
    while let Some(node) = el.next_sibling() {
        if node.as_text().is_none() {
            break;
        }
        node.detach();
    }
}

/// Detaches an element together with its tail text.
fn detach_with_tail(el: &NodeRef) {
    clear_tail_text(el);
    el.detach();
}
