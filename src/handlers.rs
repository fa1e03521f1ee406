use crate::{
    AppState, aggregates,
    auth::{AuthUser, OptionalUser},
    context::{self, PathSegments},
    error::Error,
    models::{
        ArticlePage, ArticleView, ChangeAvatarRequest, ChangeNameRequest, ChangePasswordRequest,
        CommentView, CreateCommentRequest, CreatePublicationRequest, FeedPage, Filters,
        InviteWriterRequest, LoginRequest, LoginResponse, ProfilePage, Publication,
        PublicationPage, PublishArticleRequest, SignupRequest, User, UserPublications,
    },
    repository::RepositoryState,
    usecases,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Filter Structs ---

/// PageFilter
///
/// Accepted query parameters for paginated feed endpoints. Both parameters
/// are optional; out-of-range values are clamped, not rejected.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageFilter {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Rows per page, clamped to 1..=100.
    pub page_size: Option<i64>,
}

impl PageFilter {
    fn filters(&self) -> Filters {
        let defaults = Filters::default();
        Filters::new(
            self.page.unwrap_or(defaults.page),
            self.page_size.unwrap_or(defaults.page_size),
        )
    }
}

// --- View Composition ---

/// Enriches a batch of articles into viewer-scoped views using the batch
/// aggregators, preserving the input order.
async fn compose_article_views(
    repo: &RepositoryState,
    articles: Vec<crate::models::Article>,
    viewer: Option<&User>,
) -> Result<Vec<ArticleView>, Error> {
    let likes = aggregates::article_like_facts(repo, &articles, viewer).await?;
    let counts = aggregates::comment_counts(repo, &articles).await?;
    let writers = aggregates::article_writers(repo, &articles).await?;

    Ok(articles
        .into_iter()
        .map(|article| {
            let facts = likes.get(&article.id).copied().unwrap_or_default();
            let count = counts.get(&article.id).copied().unwrap_or_default();
            let writer = writers.get(&article.writer_id).cloned();
            ArticleView::new(article, writer, facts, count)
        })
        .collect())
}

async fn compose_comment_views(
    repo: &RepositoryState,
    comments: Vec<crate::models::Comment>,
    viewer: Option<&User>,
) -> Result<Vec<CommentView>, Error> {
    let likes = aggregates::comment_like_facts(repo, &comments, viewer).await?;
    let commenters = aggregates::commenters(repo, &comments).await?;

    Ok(comments
        .into_iter()
        .map(|comment| {
            let facts = likes.get(&comment.id).copied().unwrap_or_default();
            let commenter = commenters.get(&comment.commenter_id).cloned();
            CommentView::new(comment, commenter, facts)
        })
        .collect())
}

// --- Account Handlers ---

/// register_user
///
/// [Public Route] Creates a new account. The password is hashed before it
/// ever reaches the store; duplicate emails are a 409.
#[utoipa::path(
    post,
    path = "/register",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), Error> {
    let user = usecases::signup(&state.repo, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// login_user
///
/// [Public Route] Verifies credentials and issues a session token. Unknown
/// email and wrong password both answer 401 with the same body.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let user = usecases::login(&state.repo, &payload).await?;
    let token = crate::auth::issue_token(&state.config, user.id)?;
    Ok(Json(LoginResponse { token, user }))
}

/// get_me
///
/// [Authenticated Route] The requesting user's own record, as resolved by
/// the `AuthUser` extractor.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// get_my_publications
///
/// [Authenticated Route] The requesting user's three publication buckets:
/// owned, writing for, subscribed to.
#[utoipa::path(
    get,
    path = "/me/publications",
    responses((status = 200, description = "My publications", body = UserPublications))
)]
pub async fn get_my_publications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserPublications>, Error> {
    let publications = state.repo.publications_of_user(user.id).await?;
    Ok(Json(publications))
}

/// get_my_invitations
///
/// [Authenticated Route] Publications with a pending invitation addressed
/// to the requesting user.
#[utoipa::path(
    get,
    path = "/me/invitations",
    responses((status = 200, description = "Pending invitations", body = [Publication]))
)]
pub async fn get_my_invitations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Publication>>, Error> {
    let publications = state.repo.invitations_of_user(user.id).await?;
    Ok(Json(publications))
}

/// change_name
///
/// [Authenticated Route] Renames the requesting user. Renaming invalidates
/// previously shared profile URLs, which is intended: the compound profile
/// identifier embeds the name.
#[utoipa::path(
    post,
    path = "/me/name",
    request_body = ChangeNameRequest,
    responses(
        (status = 204, description = "Renamed"),
        (status = 409, description = "Edit conflict")
    )
)]
pub async fn change_name(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangeNameRequest>,
) -> Result<StatusCode, Error> {
    usecases::change_name(&state.repo, &user, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// change_password
///
/// [Authenticated Route] Replaces the password after re-verifying the
/// current one.
#[utoipa::path(
    post,
    path = "/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password incorrect"),
        (status = 409, description = "Edit conflict")
    )
)]
pub async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, Error> {
    usecases::change_password(&state.repo, &user, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// change_avatar
///
/// [Authenticated Route] Points the profile at a different avatar image.
#[utoipa::path(
    post,
    path = "/me/avatar",
    request_body = ChangeAvatarRequest,
    responses((status = 204, description = "Avatar changed"))
)]
pub async fn change_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangeAvatarRequest>,
) -> Result<StatusCode, Error> {
    usecases::change_avatar(&state.repo, &user, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Feed Handlers ---

/// get_feed
///
/// [Public Route] The home feed: articles from the last week ranked by like
/// count, paginated. Anonymous viewers see `viewer_has_liked: false`
/// throughout.
#[utoipa::path(
    get,
    path = "/feed",
    params(PageFilter),
    responses((status = 200, description = "Home feed", body = FeedPage))
)]
pub async fn get_feed(
    OptionalUser(viewer): OptionalUser,
    State(state): State<AppState>,
    Query(filter): Query<PageFilter>,
) -> Result<Json<FeedPage>, Error> {
    let (articles, metadata) = state.repo.recent_articles(filter.filters()).await?;
    let articles = compose_article_views(&state.repo, articles, viewer.as_ref()).await?;
    Ok(Json(FeedPage { articles, metadata }))
}

/// get_my_feed
///
/// [Authenticated Route] Articles from the publications the requesting user
/// subscribes to, ranked by like count. Unlike the home feed there is no
/// recency window.
#[utoipa::path(
    get,
    path = "/me/feed",
    params(PageFilter),
    responses((status = 200, description = "Subscribed feed", body = FeedPage))
)]
pub async fn get_my_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PageFilter>,
) -> Result<Json<FeedPage>, Error> {
    let (articles, metadata) = state
        .repo
        .subscribed_articles(user.id, filter.filters())
        .await?;
    let articles = compose_article_views(&state.repo, articles, Some(&user)).await?;
    Ok(Json(FeedPage { articles, metadata }))
}

// --- Reading Surface Handlers ---

/// get_publication_page
///
/// [Public Route] A publication's landing page: the publication, its
/// articles, its writers and the viewer's relationship to it.
#[utoipa::path(
    get,
    path = "/publications/{slug}",
    responses(
        (status = 200, description = "Publication page", body = PublicationPage),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_publication_page(
    OptionalUser(viewer): OptionalUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicationPage>, Error> {
    let ctx = context::resolve(
        &state.repo,
        viewer,
        &PathSegments {
            publication: Some(&slug),
            ..PathSegments::default()
        },
    )
    .await?;

    let publication = ctx.publication()?.clone();
    let raw_articles = state.repo.articles_of_publication(publication.id).await?;
    let articles = compose_article_views(&state.repo, raw_articles, ctx.viewer_opt()).await?;

    let viewer_is_subscribed = match ctx.viewer_opt() {
        Some(user) => state.repo.is_subscribed(publication.id, user.id).await?,
        None => false,
    };
    let viewer_membership =
        aggregates::membership(&state.repo, &publication, ctx.viewer_opt()).await?;

    Ok(Json(PublicationPage {
        publication,
        articles,
        writers: ctx.writers().to_vec(),
        viewer_is_subscribed,
        viewer_membership,
    }))
}

/// get_article_page
///
/// [Public Route] A single article with its comments. The article segment
/// is a compound identifier; a stale or malformed one is a plain 404.
#[utoipa::path(
    get,
    path = "/publications/{slug}/articles/{article}",
    responses(
        (status = 200, description = "Article page", body = ArticlePage),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_article_page(
    OptionalUser(viewer): OptionalUser,
    State(state): State<AppState>,
    Path((slug, article)): Path<(String, String)>,
) -> Result<Json<ArticlePage>, Error> {
    let ctx = context::resolve(
        &state.repo,
        viewer,
        &PathSegments {
            publication: Some(&slug),
            article: Some(&article),
            ..PathSegments::default()
        },
    )
    .await?;

    let article = ctx.article()?.clone();
    let raw_comments = state.repo.comments_of_article(article.id).await?;
    let comments = compose_comment_views(&state.repo, raw_comments, ctx.viewer_opt()).await?;

    let views = compose_article_views(&state.repo, vec![article], ctx.viewer_opt()).await?;
    let article = views.into_iter().next().ok_or(Error::NotFound)?;

    Ok(Json(ArticlePage { article, comments }))
}

/// get_profile
///
/// [Public Route] A user's profile page, addressed by the compound
/// identifier `<name-slug>-<id>`. Renamed users 404 under their old URL.
#[utoipa::path(
    get,
    path = "/user/{profile}",
    responses(
        (status = 200, description = "Profile page", body = ProfilePage),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> Result<Json<ProfilePage>, Error> {
    let ctx = context::resolve(
        &state.repo,
        None,
        &PathSegments {
            profile: Some(&profile),
            ..PathSegments::default()
        },
    )
    .await?;

    let user = ctx.profile()?.clone();
    let publications = state.repo.publications_of_user(user.id).await?;

    Ok(Json(ProfilePage {
        url: user.url(),
        user,
        publications,
    }))
}

// --- Publication Handlers ---

/// create_publication
///
/// [Authenticated Route] Creates a publication owned by the requesting
/// user. The slug is derived from the name; a name slugging to an existing
/// slug is a 409.
#[utoipa::path(
    post,
    path = "/publications",
    request_body = CreatePublicationRequest,
    responses(
        (status = 201, description = "Publication created", body = Publication),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_publication(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePublicationRequest>,
) -> Result<(StatusCode, Json<Publication>), Error> {
    let publication = usecases::create_publication(&state.repo, &user, &payload).await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

/// Resolves the publication segment for an authenticated mutation.
async fn publication_ctx(
    state: &AppState,
    viewer: User,
    slug: &str,
) -> Result<crate::context::ResolvedContext, Error> {
    context::resolve(
        &state.repo,
        Some(viewer),
        &PathSegments {
            publication: Some(slug),
            ..PathSegments::default()
        },
    )
    .await
}

/// delete_publication
///
/// [Authenticated Route] Owner-only. Deletes the publication and all of its
/// membership edges.
#[utoipa::path(
    post,
    path = "/publications/{slug}/delete",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_publication(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::delete_publication(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// subscribe
///
/// [Authenticated Route] Subscribes the requesting user to a publication.
/// Writers and the owner cannot subscribe to their own publication.
#[utoipa::path(
    post,
    path = "/publications/{slug}/subscribe",
    responses(
        (status = 204, description = "Subscribed"),
        (status = 409, description = "Already subscribed"),
        (status = 422, description = "Writers cannot subscribe")
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::subscribe(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// unsubscribe
///
/// [Authenticated Route] Removes the requesting user's subscription.
#[utoipa::path(
    post,
    path = "/publications/{slug}/unsubscribe",
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 404, description = "Not subscribed")
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::unsubscribe(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Writer Management Handlers ---

/// invite_writer
///
/// [Authenticated Route] Owner-only. Invites a user, addressed by email, to
/// write for the publication.
#[utoipa::path(
    post,
    path = "/publications/{slug}/invitations",
    request_body = InviteWriterRequest,
    responses(
        (status = 204, description = "Invited"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Already a writer or already invited")
    )
)]
pub async fn invite_writer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<InviteWriterRequest>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::invite_writer(&state.repo, &ctx, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// withdraw_invitation
///
/// [Authenticated Route] Owner-only. Retracts a pending invitation.
#[utoipa::path(
    post,
    path = "/publications/{slug}/invitations/{user_id}/withdraw",
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No pending invitation")
    )
)]
pub async fn withdraw_invitation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, invitee_id)): Path<(String, i64)>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::withdraw_invitation(&state.repo, &ctx, invitee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// accept_invitation
///
/// [Authenticated Route] Accepts a pending invitation addressed to the
/// requesting user, atomically turning it into a writer edge.
#[utoipa::path(
    post,
    path = "/publications/{slug}/invitations/accept",
    responses(
        (status = 204, description = "Accepted"),
        (status = 404, description = "No pending invitation")
    )
)]
pub async fn accept_invitation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::accept_invitation(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// decline_invitation
///
/// [Authenticated Route] Declines a pending invitation addressed to the
/// requesting user.
#[utoipa::path(
    post,
    path = "/publications/{slug}/invitations/decline",
    responses(
        (status = 204, description = "Declined"),
        (status = 404, description = "No pending invitation")
    )
)]
pub async fn decline_invitation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::decline_invitation(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// kick_writer
///
/// [Authenticated Route] Owner-only. Removes a writer from the publication.
/// The owner cannot be removed.
#[utoipa::path(
    post,
    path = "/publications/{slug}/writers/{user_id}/kick",
    responses(
        (status = 204, description = "Removed"),
        (status = 403, description = "Not the owner, or target is the owner"),
        (status = 404, description = "Not a writer")
    )
)]
pub async fn kick_writer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, writer_id)): Path<(String, i64)>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::kick_writer(&state.repo, &ctx, writer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// leave_publication
///
/// [Authenticated Route] The requesting user gives up their own writer
/// seat. Owners cannot leave.
#[utoipa::path(
    post,
    path = "/publications/{slug}/leave",
    responses(
        (status = 204, description = "Left"),
        (status = 404, description = "Not a writer"),
        (status = 422, description = "Owners cannot leave")
    )
)]
pub async fn leave_publication(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, Error> {
    let ctx = publication_ctx(&state, user, &slug).await?;
    usecases::leave_publication(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Article & Comment Handlers ---

/// publish_article
///
/// [Authenticated Route] Writer-only. Publishes an article under the
/// publication. The response carries the canonical article URL.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles",
    request_body = PublishArticleRequest,
    responses(
        (status = 201, description = "Published", body = ArticleView),
        (status = 403, description = "Not a writer"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn publish_article(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<PublishArticleRequest>,
) -> Result<(StatusCode, Json<ArticleView>), Error> {
    let ctx = publication_ctx(&state, user.clone(), &slug).await?;
    let article = usecases::publish_article(&state.repo, &ctx, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ArticleView::fresh(article, Some(user))),
    ))
}

/// Resolves publication and article segments for an authenticated mutation.
async fn article_ctx(
    state: &AppState,
    viewer: User,
    slug: &str,
    article: &str,
) -> Result<crate::context::ResolvedContext, Error> {
    context::resolve(
        &state.repo,
        Some(viewer),
        &PathSegments {
            publication: Some(slug),
            article: Some(article),
            ..PathSegments::default()
        },
    )
    .await
}

/// add_comment
///
/// [Authenticated Route] Posts a comment on an article.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles/{article}/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentView),
        (status = 404, description = "Not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, article)): Path<(String, String)>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), Error> {
    let ctx = article_ctx(&state, user.clone(), &slug, &article).await?;
    let comment = usecases::add_comment(&state.repo, &ctx, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentView::new(comment, Some(user), Default::default())),
    ))
}

/// like_article
///
/// [Authenticated Route] Likes an article. Liking twice is a 409, never a
/// double count.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles/{article}/like",
    responses(
        (status = 204, description = "Liked"),
        (status = 409, description = "Already liked")
    )
)]
pub async fn like_article(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, article)): Path<(String, String)>,
) -> Result<StatusCode, Error> {
    let ctx = article_ctx(&state, user, &slug, &article).await?;
    usecases::like_article(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// unlike_article
///
/// [Authenticated Route] Removes the requesting user's like.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles/{article}/unlike",
    responses(
        (status = 204, description = "Unliked"),
        (status = 404, description = "Not liked")
    )
)]
pub async fn unlike_article(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, article)): Path<(String, String)>,
) -> Result<StatusCode, Error> {
    let ctx = article_ctx(&state, user, &slug, &article).await?;
    usecases::unlike_article(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolves publication, article and comment segments for an authenticated
/// mutation.
async fn comment_ctx(
    state: &AppState,
    viewer: User,
    slug: &str,
    article: &str,
    comment: &str,
) -> Result<crate::context::ResolvedContext, Error> {
    context::resolve(
        &state.repo,
        Some(viewer),
        &PathSegments {
            publication: Some(slug),
            article: Some(article),
            comment: Some(comment),
            ..PathSegments::default()
        },
    )
    .await
}

/// like_comment
///
/// [Authenticated Route] Likes a comment, with the same set semantics as
/// article likes.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles/{article}/comments/{comment}/like",
    responses(
        (status = 204, description = "Liked"),
        (status = 409, description = "Already liked")
    )
)]
pub async fn like_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, article, comment)): Path<(String, String, String)>,
) -> Result<StatusCode, Error> {
    let ctx = comment_ctx(&state, user, &slug, &article, &comment).await?;
    usecases::like_comment(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// unlike_comment
///
/// [Authenticated Route] Removes the requesting user's like from a comment.
#[utoipa::path(
    post,
    path = "/publications/{slug}/articles/{article}/comments/{comment}/unlike",
    responses(
        (status = 204, description = "Unliked"),
        (status = 404, description = "Not liked")
    )
)]
pub async fn unlike_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((slug, article, comment)): Path<(String, String, String)>,
) -> Result<StatusCode, Error> {
    let ctx = comment_ctx(&state, user, &slug, &article, &comment).await?;
    usecases::unlike_comment(&state.repo, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}
