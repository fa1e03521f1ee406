//! Mutation use-cases.
//!
//! Each function runs one business operation against a resolved context:
//! gate, validate, execute. Handlers stay thin: they resolve, call one of
//! these, and shape the response. Read-side composition lives in the
//! handlers themselves via the aggregators.

use crate::authz::{self, Capability};
use crate::context::ResolvedContext;
use crate::error::Error;
use crate::ident;
use crate::models::{
    Article, ChangeAvatarRequest, ChangeNameRequest, ChangePasswordRequest, Comment,
    CreateCommentRequest, CreatePublicationRequest, InviteWriterRequest, LoginRequest,
    Publication, PublishArticleRequest, SignupRequest, User,
};
use crate::repository::RepositoryState;

const BCRYPT_COST: u32 = 12;
const PASSWORD_MIN: usize = 10;
// bcrypt truncates input beyond 72 bytes, so longer passwords are rejected
// instead of silently shortened.
const PASSWORD_MAX: usize = 72;
const PUBLICATION_NAME_MIN: usize = 4;
const PUBLICATION_NAME_MAX: usize = 24;

fn validate_password(password: &str) -> Result<(), Error> {
    if password.len() < PASSWORD_MIN || password.len() > PASSWORD_MAX {
        return Err(Error::Validation(format!(
            "password must be between {PASSWORD_MIN} and {PASSWORD_MAX} bytes"
        )));
    }
    Ok(())
}

// --- Accounts ---

pub async fn signup(repo: &RepositoryState, req: &SignupRequest) -> Result<User, Error> {
    if req.name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".to_string()));
    }
    if !req.email.contains('@') {
        return Err(Error::Validation(
            "email must be a valid address".to_string(),
        ));
    }
    validate_password(&req.password)?;

    let hash = bcrypt::hash(&req.password, BCRYPT_COST)?;
    let id = repo.create_user(req.name.trim(), &req.email, &hash).await?;
    repo.get_user(id).await
}

/// Verifies credentials and returns the user. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn login(repo: &RepositoryState, req: &LoginRequest) -> Result<User, Error> {
    let (user_id, hash) = match repo.credentials(&req.email).await {
        Ok(found) => found,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(e) => return Err(e),
    };

    if !bcrypt::verify(&req.password, &hash)? {
        return Err(Error::InvalidCredentials);
    }

    repo.get_user(user_id).await
}

pub async fn change_name(
    repo: &RepositoryState,
    viewer: &User,
    req: &ChangeNameRequest,
) -> Result<(), Error> {
    if req.name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".to_string()));
    }
    repo.change_name(viewer.id, viewer.version, req.name.trim())
        .await
}

/// Re-verifies the current password against the hash read at the viewer's
/// version, then writes the new hash under the same version guard. A
/// concurrent profile mutation between read and write surfaces as an edit
/// conflict on either side.
pub async fn change_password(
    repo: &RepositoryState,
    viewer: &User,
    req: &ChangePasswordRequest,
) -> Result<(), Error> {
    validate_password(&req.new_password)?;

    let current_hash = repo.password_hash(viewer.id, viewer.version).await?;
    if !bcrypt::verify(&req.current_password, &current_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let new_hash = bcrypt::hash(&req.new_password, BCRYPT_COST)?;
    repo.change_password_hash(viewer.id, viewer.version, &new_hash)
        .await
}

pub async fn change_avatar(
    repo: &RepositoryState,
    viewer: &User,
    req: &ChangeAvatarRequest,
) -> Result<(), Error> {
    repo.change_avatar(viewer.id, viewer.version, req.image_id)
        .await
}

// --- Publications ---

pub async fn create_publication(
    repo: &RepositoryState,
    viewer: &User,
    req: &CreatePublicationRequest,
) -> Result<Publication, Error> {
    let name = req.name.trim();
    if name.len() < PUBLICATION_NAME_MIN || name.len() > PUBLICATION_NAME_MAX {
        return Err(Error::Validation(format!(
            "publication name must be between {PUBLICATION_NAME_MIN} and {PUBLICATION_NAME_MAX} characters"
        )));
    }

    let slug = ident::slugify(name);
    if slug.is_empty() {
        return Err(Error::Validation(
            "publication name must contain at least one alphanumeric character".to_string(),
        ));
    }
    // `user` is the profile namespace prefix; a publication there would
    // shadow profile routes.
    if slug == "user" {
        return Err(Error::Validation(
            "this publication name is reserved".to_string(),
        ));
    }

    repo.create_publication(viewer.id, name, &slug, req.description.trim())
        .await
}

pub async fn delete_publication(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    authz::require(ctx, Capability::Owner)?;
    let publication = ctx.publication()?;
    repo.delete_publication(publication.owner_id, publication.id)
        .await
}

pub async fn subscribe(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;
    // Writers and the owner already see everything; a subscription edge for
    // them would double-count the feeds.
    if authz::is_writer(ctx) {
        return Err(Error::Validation(
            "writers cannot subscribe to their own publication".to_string(),
        ));
    }
    if repo.is_subscribed(publication.id, viewer.id).await? {
        return Err(Error::DuplicateRecord);
    }
    repo.subscribe(viewer.id, publication.id).await
}

pub async fn unsubscribe(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;
    repo.unsubscribe(viewer.id, publication.id).await
}

// --- Writer management ---

/// Invites a user, addressed by email, to write for the resolved
/// publication. Only the owner may invite; users already writing (the owner
/// included) or already invited are duplicates.
pub async fn invite_writer(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
    req: &InviteWriterRequest,
) -> Result<(), Error> {
    authz::require(ctx, Capability::Owner)?;
    let publication = ctx.publication()?;

    let invitee = repo.get_user_by_email(&req.email).await?;
    if invitee.id == publication.owner_id || repo.is_writer(publication.id, invitee.id).await? {
        return Err(Error::DuplicateRecord);
    }

    repo.invite(publication.id, invitee.id).await
}

pub async fn withdraw_invitation(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
    invitee_id: i64,
) -> Result<(), Error> {
    authz::require(ctx, Capability::Owner)?;
    let publication = ctx.publication()?;
    repo.withdraw_invitation(publication.id, invitee_id).await
}

/// Removes a writer from the resolved publication. The owner cannot be
/// kicked, not even by themselves.
pub async fn kick_writer(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
    writer_id: i64,
) -> Result<(), Error> {
    authz::require(ctx, Capability::Owner)?;
    let publication = ctx.publication()?;
    if writer_id == publication.owner_id {
        return Err(Error::NotPermitted);
    }
    repo.remove_writer(publication.id, writer_id).await
}

pub async fn accept_invitation(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;
    repo.accept_invitation(viewer.id, publication.id).await
}

pub async fn decline_invitation(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;
    repo.decline_invitation(viewer.id, publication.id).await
}

/// A writer giving up their own writer edge. Owners cannot leave their own
/// publication; deletion is the exit for them.
pub async fn leave_publication(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;
    if viewer.id == publication.owner_id {
        return Err(Error::Validation(
            "owners cannot leave their own publication".to_string(),
        ));
    }
    repo.remove_writer(publication.id, viewer.id).await
}

// --- Articles & comments ---

pub async fn publish_article(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
    req: &PublishArticleRequest,
) -> Result<Article, Error> {
    authz::require(ctx, Capability::Writer)?;
    let viewer = ctx.viewer()?;
    let publication = ctx.publication()?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(Error::Validation("title must not be empty".to_string()));
    }
    if ident::slugify(title).is_empty() {
        return Err(Error::Validation(
            "title must contain at least one alphanumeric character".to_string(),
        ));
    }
    if req.content.trim().is_empty() {
        return Err(Error::Validation("content must not be empty".to_string()));
    }

    repo.publish_article(publication.id, viewer.id, title, &req.content)
        .await
}

pub async fn add_comment(
    repo: &RepositoryState,
    ctx: &ResolvedContext,
    req: &CreateCommentRequest,
) -> Result<Comment, Error> {
    let viewer = ctx.viewer()?;
    let article = ctx.article()?;

    if req.content.trim().is_empty() {
        return Err(Error::Validation("comment must not be empty".to_string()));
    }

    repo.add_comment(article.id, viewer.id, req.content.trim())
        .await
}

// --- Likes ---
//
// Likes are set semantics end to end: liking twice is a duplicate, removing
// an absent like is not found. The current state is read first so a no-op
// request is rejected as a client error; the unique edge constraint remains
// the backstop under concurrent double-likes.

pub async fn like_article(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let article = ctx.article()?;
    if repo.user_has_liked_article(viewer.id, article.id).await? {
        return Err(Error::DuplicateRecord);
    }
    repo.like_article(viewer.id, article.id).await
}

pub async fn unlike_article(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let article = ctx.article()?;
    if !repo.user_has_liked_article(viewer.id, article.id).await? {
        return Err(Error::NotFound);
    }
    repo.unlike_article(viewer.id, article.id).await
}

pub async fn like_comment(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let comment = ctx.comment()?;
    if repo.user_has_liked_comment(viewer.id, comment.id).await? {
        return Err(Error::DuplicateRecord);
    }
    repo.like_comment(viewer.id, comment.id).await
}

pub async fn unlike_comment(repo: &RepositoryState, ctx: &ResolvedContext) -> Result<(), Error> {
    let viewer = ctx.viewer()?;
    let comment = ctx.comment()?;
    if !repo.user_has_liked_comment(viewer.id, comment.id).await? {
        return Err(Error::NotFound);
    }
    repo.unlike_comment(viewer.id, comment.id).await
}
