//! Compound identifier codec.
//!
//! Articles and profiles are addressed by a URL segment combining a
//! human-readable slug with a numeric id, e.g. `my-title-42`. The id is
//! authoritative; the slug exists for readability and is re-validated against
//! the entity's current title on every resolution so cached URLs go stale
//! when the title changes.

use crate::error::Error;
use crate::models::{Article, User};

/// Derives the canonical URL slug from a name or title: ASCII lowercase,
/// runs of non-alphanumeric characters collapsed to a single hyphen,
/// no leading or trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Encodes a name and id into the compound form `<slug>-<id>`.
pub fn encode(name: &str, id: i64) -> String {
    format!("{}-{}", slugify(name), id)
}

/// Splits a compound identifier at the *last* hyphen; title slugs may
/// themselves contain hyphens. Fails with `MalformedIdentifier` when no
/// hyphen is present or the trailing segment is not a non-negative integer.
pub fn decode(raw: &str) -> Result<(String, i64), Error> {
    let split = raw.rfind('-').ok_or(Error::MalformedIdentifier)?;

    let slug = &raw[..split];
    let id = raw[split + 1..]
        .parse::<i64>()
        .map_err(|_| Error::MalformedIdentifier)?;
    // The tail sits after the final hyphen, so a sign character can never
    // parse; ids are always non-negative here.

    Ok((slug.to_string(), id))
}

/// Slugged
///
/// Implemented by entities addressed through compound identifiers. `matches`
/// re-derives the canonical slug from the entity's *current* name and
/// compares it with the slug decoded from the URL, which is the staleness check.
pub trait Slugged {
    fn slug_source(&self) -> &str;

    fn matches(&self, slug: &str) -> bool {
        slug == slugify(self.slug_source())
    }

    /// The canonical compound identifier for the entity's current name.
    fn url_for(&self, id: i64) -> String {
        encode(self.slug_source(), id)
    }
}

impl Slugged for Article {
    fn slug_source(&self) -> &str {
        &self.title
    }
}

impl Slugged for User {
    fn slug_source(&self) -> &str {
        &self.name
    }
}
