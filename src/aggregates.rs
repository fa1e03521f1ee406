//! Batch aggregation over collections of entities.
//!
//! Reading surfaces enrich articles and comments with like facts, comment
//! counts and author records. These helpers fetch each fact once per
//! distinct id rather than once per row, and they are the only place the
//! viewer-scoped `viewer_has_liked` flag is computed.

use std::collections::HashMap;

use crate::error::Error;
use crate::models::{Article, Comment, LikeFacts, Membership, Publication, User};
use crate::repository::RepositoryState;

/// Like facts for a batch of articles, keyed by article id. Duplicate ids in
/// the input are deduplicated; anonymous viewers get `viewer_has_liked:
/// false` without touching the like table for the viewer side.
pub async fn article_like_facts(
    repo: &RepositoryState,
    articles: &[Article],
    viewer: Option<&User>,
) -> Result<HashMap<i64, LikeFacts>, Error> {
    let mut facts = HashMap::with_capacity(articles.len());

    for article in articles {
        if facts.contains_key(&article.id) {
            continue;
        }
        let count = repo.article_like_count(article.id).await?;
        let viewer_has_liked = match viewer {
            Some(user) => repo.user_has_liked_article(user.id, article.id).await?,
            None => false,
        };
        facts.insert(
            article.id,
            LikeFacts {
                count,
                viewer_has_liked,
            },
        );
    }

    Ok(facts)
}

/// Like facts for a batch of comments, keyed by comment id.
pub async fn comment_like_facts(
    repo: &RepositoryState,
    comments: &[Comment],
    viewer: Option<&User>,
) -> Result<HashMap<i64, LikeFacts>, Error> {
    let mut facts = HashMap::with_capacity(comments.len());

    for comment in comments {
        if facts.contains_key(&comment.id) {
            continue;
        }
        let count = repo.comment_like_count(comment.id).await?;
        let viewer_has_liked = match viewer {
            Some(user) => repo.user_has_liked_comment(user.id, comment.id).await?,
            None => false,
        };
        facts.insert(
            comment.id,
            LikeFacts {
                count,
                viewer_has_liked,
            },
        );
    }

    Ok(facts)
}

/// Comment counts for a batch of articles, keyed by article id.
pub async fn comment_counts(
    repo: &RepositoryState,
    articles: &[Article],
) -> Result<HashMap<i64, i64>, Error> {
    let mut counts = HashMap::with_capacity(articles.len());

    for article in articles {
        if counts.contains_key(&article.id) {
            continue;
        }
        counts.insert(article.id, repo.comment_count(article.id).await?);
    }

    Ok(counts)
}

/// Writer records for a batch of articles, keyed by *user* id so articles
/// sharing a writer resolve it once. A writer whose account has since been
/// removed simply has no entry.
pub async fn article_writers(
    repo: &RepositoryState,
    articles: &[Article],
) -> Result<HashMap<i64, User>, Error> {
    let mut writers = HashMap::new();

    for article in articles {
        if writers.contains_key(&article.writer_id) {
            continue;
        }
        match repo.get_user(article.writer_id).await {
            Ok(user) => {
                writers.insert(article.writer_id, user);
            }
            Err(Error::NotFound) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(writers)
}

/// Commenter records for a batch of comments, keyed by user id.
pub async fn commenters(
    repo: &RepositoryState,
    comments: &[Comment],
) -> Result<HashMap<i64, User>, Error> {
    let mut users = HashMap::new();

    for comment in comments {
        if users.contains_key(&comment.commenter_id) {
            continue;
        }
        match repo.get_user(comment.commenter_id).await {
            Ok(user) => {
                users.insert(comment.commenter_id, user);
            }
            Err(Error::NotFound) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(users)
}

/// Resolves the viewer's membership state for a publication. Owners report
/// `Writer`; ownership subsumes writing rights everywhere else in the
/// system, so the page reflects that. Anonymous viewers are always `None`.
pub async fn membership(
    repo: &RepositoryState,
    publication: &Publication,
    viewer: Option<&User>,
) -> Result<Membership, Error> {
    let Some(user) = viewer else {
        return Ok(Membership::None);
    };

    if publication.owner_id == user.id || repo.is_writer(publication.id, user.id).await? {
        return Ok(Membership::Writer);
    }
    if repo.has_invitation(publication.id, user.id).await? {
        return Ok(Membership::Pending);
    }

    Ok(Membership::None)
}
