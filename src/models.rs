use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::ident;

// --- Core Entities (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. The password hash is
/// deliberately not part of this struct; it only travels through the
/// repository's credential lookups and never serializes outward.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Optional avatar image reference. The image pipeline itself lives
    /// outside this service; only the reference is tracked here.
    pub image_id: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency counter, incremented by every mutation.
    pub version: i32,
}

impl User {
    /// The profile URL segment, e.g. `jane-doe-17`.
    pub fn url(&self) -> String {
        ident::encode(&self.name, self.id)
    }
}

/// Publication
///
/// A blog owned by a single user. The slug is derived from the name at
/// creation time and is unique across the system.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Publication {
    pub id: i64,
    pub name: String,
    /// Unique URL slug derived from `name` at creation.
    pub slug: String,
    pub description: String,
    pub owner_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// Article
///
/// Immutable once published, except for the like/comment aggregates hanging
/// off it. Addressed by the compound identifier `<title-slug>-<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Markdown source. Rendering happens outside this service.
    pub content: String,
    pub publication_id: i64,
    pub writer_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

impl Article {
    /// The article URL segment, e.g. `hello-world-7`.
    pub fn url(&self) -> String {
        ident::encode(&self.title, self.id)
    }
}

/// Comment
///
/// A reader comment attached to an article.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub commenter_id: i64,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

// --- Derived Facts & Membership ---

/// LikeFacts
///
/// Batch-computed like aggregate for one entity: the total count plus
/// whether the requesting viewer has liked it. `viewer_has_liked` is always
/// `false` for anonymous viewers, never an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct LikeFacts {
    pub count: i64,
    pub viewer_has_liked: bool,
}

/// Membership
///
/// The invitation state machine: a (user, publication) pair is in exactly
/// one of these states at any time. `Pending` and `Writer` are mutually
/// exclusive by construction: accepting an invitation atomically swaps the
/// pending edge for the writer edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq, Default)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    #[default]
    None,
    Pending,
    Writer,
}

/// UserPublications
///
/// The three relationship buckets shown on a profile page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserPublications {
    pub writes_on: Vec<Publication>,
    pub subscribes_to: Vec<Publication>,
    pub owns: Vec<Publication>,
}

// --- Pagination ---

/// Filters
///
/// Pagination inputs for list queries. Pages are 1-based; out-of-range
/// values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl Filters {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, 100),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Metadata
///
/// Pagination facts computed from the total-row count returned in the same
/// query pass as the rows themselves, so the total cannot drift from the
/// page contents under concurrent writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        // The fields of `Filters` are public, so a zero page size can reach
        // this far; treat it as one row per page rather than divide by zero.
        let page_size = page_size.max(1);
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// Input payload for signup (POST /register).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input payload for login (POST /login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Output schema for a successful login: the bearer token plus the resolved
/// user record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Input payload for creating a publication (POST /publications).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePublicationRequest {
    pub name: String,
    pub description: String,
}

/// Input payload for publishing an article.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublishArticleRequest {
    pub title: String,
    pub content: String,
}

/// Input payload for posting a comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Input payload for inviting a writer by email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct InviteWriterRequest {
    pub email: String,
}

/// Input payload for renaming the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangeNameRequest {
    pub name: String,
}

/// Input payload for a password change. The current password is re-verified
/// before the new hash is written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Input payload for pointing the profile at a different avatar image.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangeAvatarRequest {
    pub image_id: i64,
}

// --- Composite Views (Output Schemas) ---

/// ArticleView
///
/// An article enriched with the facts the reading surface needs: the
/// canonical URL, the writer, like facts for the viewer and the comment
/// count. Produced from the batch aggregators, never per-row queries.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleView {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub publication_id: i64,
    pub writer_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub writer: Option<User>,
    pub likes: LikeFacts,
    pub comment_count: i64,
}

impl ArticleView {
    pub fn new(
        article: Article,
        writer: Option<User>,
        likes: LikeFacts,
        comment_count: i64,
    ) -> Self {
        Self {
            url: article.url(),
            id: article.id,
            title: article.title,
            content: article.content,
            publication_id: article.publication_id,
            writer_id: article.writer_id,
            created_at: article.created_at,
            writer,
            likes,
            comment_count,
        }
    }

    /// View of a just-published article: no likes, no comments yet.
    pub fn fresh(article: Article, writer: Option<User>) -> Self {
        Self::new(article, writer, LikeFacts::default(), 0)
    }
}

/// CommentView
///
/// A comment enriched with its author and like facts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentView {
    pub id: i64,
    pub article_id: i64,
    pub commenter_id: i64,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub commenter: Option<User>,
    pub likes: LikeFacts,
}

impl CommentView {
    pub fn new(comment: Comment, commenter: Option<User>, likes: LikeFacts) -> Self {
        Self {
            id: comment.id,
            article_id: comment.article_id,
            commenter_id: comment.commenter_id,
            content: comment.content,
            created_at: comment.created_at,
            commenter,
            likes,
        }
    }
}

/// Output schema for paginated article feeds (home feed, subscribed feed).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FeedPage {
    pub articles: Vec<ArticleView>,
    pub metadata: Metadata,
}

/// Output schema for a publication's landing page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicationPage {
    pub publication: Publication,
    pub articles: Vec<ArticleView>,
    pub writers: Vec<User>,
    /// Whether the requesting viewer subscribes to this publication.
    /// Always `false` for anonymous viewers.
    pub viewer_is_subscribed: bool,
    pub viewer_membership: Membership,
}

/// Output schema for a single article page: the article plus its comments,
/// both carrying viewer-scoped like facts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticlePage {
    pub article: ArticleView,
    pub comments: Vec<CommentView>,
}

/// Output schema for a profile page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfilePage {
    pub user: User,
    pub url: String,
    pub publications: UserPublications,
}
