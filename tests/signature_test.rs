//! Signature detection tests

use reply_extract::{LineClassifier, SignatureExtractor, extract_signature, get_signature_candidate};

#[test]
fn dash_signature_is_split_off() {
    let (body, signature) = extract_signature("Hey man! How r u?\n\n--\nRegards,\nRoman");
    assert_eq!(body, "Hey man! How r u?");
    assert_eq!(signature.as_deref(), Some("--\nRegards,\nRoman"));
}

#[test]
fn message_without_signature_is_untouched() {
    let (body, signature) = extract_signature("Hey man!");
    assert_eq!(body, "Hey man!");
    assert_eq!(signature, None);
}

#[test]
fn signoff_word_starts_the_signature() {
    let (body, signature) = extract_signature("Please proceed\n\nThanks,\nBob");
    assert_eq!(body, "Please proceed");
    assert_eq!(signature.as_deref(), Some("Thanks,\nBob"));
}

#[test]
fn phone_client_signature_is_stripped() {
    let (body, signature) = extract_signature("Great, talk soon\n\nSent from my iPhone");
    assert_eq!(body, "Great, talk soon");
    assert_eq!(signature.as_deref(), Some("Sent from my iPhone"));
}

#[test]
fn phone_client_signature_is_reattached_below_the_signoff() {
    let (body, signature) =
        extract_signature("Almost done\n\nThanks,\nBob\n\nSent from my iPhone");
    assert_eq!(body, "Almost done");
    assert_eq!(signature.as_deref(), Some("Thanks,\nBob\n\nSent from my iPhone"));
}

#[test]
fn contact_block_counts_as_signature() {
    let (body, signature) =
        extract_signature("Hi there\n\nJohn Smith\n555-555-5555\njohn@example.com");
    assert_eq!(body, "Hi there");
    assert_eq!(
        signature.as_deref(),
        Some("John Smith\n555-555-5555\njohn@example.com")
    );
}

#[test]
fn candidate_opens_at_a_lone_dash_line() {
    let lines = ["Hello", "", "-", "Bob"];
    assert_eq!(get_signature_candidate(&lines), &["-", "Bob"]);
}

#[test]
fn dashed_list_items_do_not_open_a_candidate() {
    let lines = ["Body", "- item one", "- item two", "Bob"];
    assert_eq!(get_signature_candidate(&lines), &["Bob"]);
}

#[test]
fn long_lines_cut_the_candidate_short() {
    let long_line = "x".repeat(70);
    let lines = ["Hi", long_line.as_str(), "Bob"];
    assert_eq!(get_signature_candidate(&lines), &["Bob"]);
}

#[test]
fn first_line_never_enters_the_candidate() {
    let lines = ["Bob"];
    assert_eq!(get_signature_candidate(&lines), &[] as &[&str]);
}

#[test]
fn custom_signoff_patterns() {
    let extractor = SignatureExtractor::with_signoff_patterns(&[r"gracias[\s,!]"])
        .expect("valid pattern");
    let (body, signature) = extractor.extract("Hola amigo\n\nGracias,\nJuan");
    assert_eq!(body, "Hola amigo");
    assert_eq!(signature.as_deref(), Some("Gracias,\nJuan"));
}

struct SenderNameClassifier;

impl LineClassifier for SenderNameClassifier {
    fn is_signature_line(&self, line: &str, sender: Option<&str>) -> bool {
        sender.is_some_and(|name| line.trim() == name)
    }
}

#[test]
fn classifier_driven_extraction() {
    let extractor = SignatureExtractor::default();
    let (body, signature) =
        extractor.extract_with_classifier("Some text\n\nBob", Some("Bob"), &SenderNameClassifier);
    assert_eq!(body.trim(), "Some text");
    assert_eq!(signature.as_deref(), Some("Bob"));
}

#[test]
fn classifier_never_swallows_the_whole_message() {
    let extractor = SignatureExtractor::default();
    let (body, signature) =
        extractor.extract_with_classifier("Bob", Some("Bob"), &SenderNameClassifier);
    assert_eq!(body, "Bob");
    assert_eq!(signature, None);
}
