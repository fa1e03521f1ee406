//! Request-scoped entity resolution.
//!
//! Every handler that addresses entities through the URL runs the same
//! resolution chain before any business logic: the viewer from the session,
//! the publication from its slug, the article and profile from their
//! compound identifiers, the comment from its numeric id. Resolution is
//! fail-fast (the first missing or stale segment aborts the chain) and the
//! resolved bundle is what the authorization gates inspect.

use tracing::debug;

use crate::error::Error;
use crate::ident::{self, Slugged};
use crate::models::{Article, Comment, Publication, User};
use crate::repository::RepositoryState;

/// The identifier segments a route extracted from its path. Only the
/// segments a route actually carries are set; the rest stay `None` and the
/// chain skips them.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathSegments<'a> {
    pub publication: Option<&'a str>,
    pub article: Option<&'a str>,
    pub profile: Option<&'a str>,
    pub comment: Option<&'a str>,
}

/// The entities a request resolved before its handler ran.
#[derive(Debug, Default, Clone)]
pub struct ResolvedContext {
    viewer: Option<User>,
    publication: Option<Publication>,
    /// Writer set of the resolved publication, fetched alongside it so the
    /// authorization predicates need no further queries.
    writers: Vec<User>,
    pending: Vec<User>,
    article: Option<Article>,
    profile: Option<User>,
    comment: Option<Comment>,
}

impl ResolvedContext {
    pub fn for_viewer(viewer: Option<User>) -> Self {
        Self {
            viewer,
            ..Self::default()
        }
    }

    /// Resolves a publication by slug and loads its writer and pending
    /// invitee sets in the same pass.
    pub async fn with_publication(
        mut self,
        repo: &RepositoryState,
        slug: &str,
    ) -> Result<Self, Error> {
        let publication = repo.get_publication_by_slug(slug).await?;
        self.writers = repo.writers_of(publication.id).await?;
        self.pending = repo.pending_invitees_of(publication.id).await?;
        self.publication = Some(publication);
        Ok(self)
    }

    /// Resolves an article from its compound identifier. The numeric id is
    /// authoritative; a slug that no longer matches the article's current
    /// title is treated as a dead link, indistinguishable from absence to
    /// the caller.
    pub async fn with_article(mut self, repo: &RepositoryState, raw: &str) -> Result<Self, Error> {
        let (slug, id) = ident::decode(raw)?;
        let article = repo.get_article(id).await?;
        if !article.matches(&slug) {
            debug!(article_id = id, slug, "stale article identifier");
            return Err(Error::StaleIdentifier);
        }
        self.article = Some(article);
        Ok(self)
    }

    /// Resolves a profile from its compound identifier, with the same
    /// staleness rule as articles: renames invalidate old profile URLs.
    pub async fn with_profile(mut self, repo: &RepositoryState, raw: &str) -> Result<Self, Error> {
        let (slug, id) = ident::decode(raw)?;
        let user = repo.get_user(id).await?;
        if !user.matches(&slug) {
            debug!(user_id = id, slug, "stale profile identifier");
            return Err(Error::StaleIdentifier);
        }
        self.profile = Some(user);
        Ok(self)
    }

    /// Resolves a comment from its plain numeric id.
    pub async fn with_comment(mut self, repo: &RepositoryState, raw: &str) -> Result<Self, Error> {
        let id = raw.parse::<i64>().map_err(|_| Error::NotFound)?;
        let comment = repo.get_comment(id).await?;
        self.comment = Some(comment);
        Ok(self)
    }

    pub fn viewer_opt(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    /// The authenticated viewer. Absence here means an anonymous request
    /// reached an operation that requires identity.
    pub fn viewer(&self) -> Result<&User, Error> {
        self.viewer.as_ref().ok_or(Error::NotPermitted)
    }

    pub fn publication(&self) -> Result<&Publication, Error> {
        self.publication.as_ref().ok_or(Error::NotFound)
    }

    pub fn writers(&self) -> &[User] {
        &self.writers
    }

    pub fn pending(&self) -> &[User] {
        &self.pending
    }

    pub fn article(&self) -> Result<&Article, Error> {
        self.article.as_ref().ok_or(Error::NotFound)
    }

    pub fn profile(&self) -> Result<&User, Error> {
        self.profile.as_ref().ok_or(Error::NotFound)
    }

    pub fn comment(&self) -> Result<&Comment, Error> {
        self.comment.as_ref().ok_or(Error::NotFound)
    }
}

/// Runs the full resolution chain for the segments a route carries, in the
/// fixed order publication, article, profile, comment.
pub async fn resolve(
    repo: &RepositoryState,
    viewer: Option<User>,
    segments: &PathSegments<'_>,
) -> Result<ResolvedContext, Error> {
    let mut ctx = ResolvedContext::for_viewer(viewer);

    if let Some(slug) = segments.publication {
        ctx = ctx.with_publication(repo, slug).await?;
    }
    if let Some(raw) = segments.article {
        ctx = ctx.with_article(repo, raw).await?;
    }
    if let Some(raw) = segments.profile {
        ctx = ctx.with_profile(repo, raw).await?;
    }
    if let Some(raw) = segments.comment {
        ctx = ctx.with_comment(repo, raw).await?;
    }

    Ok(ctx)
}

/// Resolves a session's user id into a live user record. A session naming a
/// user that no longer exists degrades to anonymous instead of failing the
/// request.
pub async fn resolve_identity(repo: &RepositoryState, user_id: Option<i64>) -> Option<User> {
    match user_id {
        Some(id) => match repo.get_user(id).await {
            Ok(user) => Some(user),
            Err(_) => {
                debug!(user_id = id, "session names an unknown user");
                None
            }
        },
        None => None,
    }
}
