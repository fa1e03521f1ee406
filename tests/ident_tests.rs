use inkstand::error::Error;
use inkstand::ident::{self, Slugged};
use inkstand::models::Article;

#[test]
fn slugify_lowercases_and_collapses_separators() {
    assert_eq!(ident::slugify("Hello World"), "hello-world");
    assert_eq!(ident::slugify("  Rust -- & --  Go  "), "rust-go");
    assert_eq!(ident::slugify("Already-Slugged"), "already-slugged");
    assert_eq!(ident::slugify("C3PO"), "c3po");
}

#[test]
fn slugify_drops_leading_and_trailing_separators() {
    assert_eq!(ident::slugify("---abc---"), "abc");
    assert_eq!(ident::slugify("!?!"), "");
}

#[test]
fn encode_appends_id_after_slug() {
    assert_eq!(ident::encode("Hello World", 42), "hello-world-42");
}

#[test]
fn decode_splits_at_last_hyphen() {
    let (slug, id) = ident::decode("my-long-title-17").unwrap();
    assert_eq!(slug, "my-long-title");
    assert_eq!(id, 17);
}

#[test]
fn decode_rejects_segments_without_numeric_tail() {
    assert!(matches!(
        ident::decode("no-trailing-id-"),
        Err(Error::MalformedIdentifier)
    ));
    assert!(matches!(
        ident::decode("justtext"),
        Err(Error::MalformedIdentifier)
    ));
    assert!(matches!(
        ident::decode("title-abc"),
        Err(Error::MalformedIdentifier)
    ));
}

#[test]
fn roundtrip_survives_hyphenated_titles() {
    let raw = ident::encode("state-of-the-art tricks", 9);
    let (slug, id) = ident::decode(&raw).unwrap();
    assert_eq!(slug, "state-of-the-art-tricks");
    assert_eq!(id, 9);
}

#[test]
fn matches_detects_renamed_entities() {
    let article = Article {
        id: 5,
        title: "Fresh Title".to_string(),
        ..Article::default()
    };

    assert!(article.matches("fresh-title"));
    // A link minted before the title changed.
    assert!(!article.matches("old-title"));
    assert_eq!(article.url(), "fresh-title-5");
}
