use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::time::timeout;

use crate::error::Error;
use crate::models::{Article, Comment, Filters, Metadata, Publication, User, UserPublications};

/// Repository Trait
///
/// The abstract contract for all persistence operations. Resolvers,
/// aggregators and use-cases depend on this trait alone, so the concrete
/// store (Postgres in production, the in-memory store in tests) is
/// swappable behind `Arc<dyn Repository>`.
///
/// Contracts shared by every implementation:
/// - point lookups return `NotFound` on zero rows
/// - inserts hitting a unique constraint return `DuplicateRecord`
/// - version-guarded updates return `EditConflict` when zero rows match
/// - edge deletions return `NotFound` when no edge existed
/// - list queries with `Filters` compute the total row count in the same
///   pass as the rows
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, name: &str, email: &str, password_hash: &str)
    -> Result<i64, Error>;
    async fn get_user(&self, id: i64) -> Result<User, Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, Error>;
    /// User id and stored password hash for an email, for authentication.
    async fn credentials(&self, email: &str) -> Result<(i64, String), Error>;
    /// Stored password hash, version-guarded: zero rows means the row moved
    /// on since it was read.
    async fn password_hash(&self, user_id: i64, version: i32) -> Result<String, Error>;
    async fn change_name(&self, user_id: i64, version: i32, name: &str) -> Result<(), Error>;
    async fn change_password_hash(
        &self,
        user_id: i64,
        version: i32,
        password_hash: &str,
    ) -> Result<(), Error>;
    async fn change_avatar(&self, user_id: i64, version: i32, image_id: i64)
    -> Result<(), Error>;

    // --- Publications ---
    async fn create_publication(
        &self,
        owner_id: i64,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<Publication, Error>;
    async fn get_publication_by_slug(&self, slug: &str) -> Result<Publication, Error>;
    /// Owner-scoped deletion: affects zero rows unless `owner_id` matches.
    async fn delete_publication(&self, owner_id: i64, publication_id: i64) -> Result<(), Error>;
    async fn publications_of_user(&self, user_id: i64) -> Result<UserPublications, Error>;
    async fn writers_of(&self, publication_id: i64) -> Result<Vec<User>, Error>;
    async fn pending_invitees_of(&self, publication_id: i64) -> Result<Vec<User>, Error>;
    async fn invitations_of_user(&self, user_id: i64) -> Result<Vec<Publication>, Error>;

    // --- Membership edges ---
    async fn is_writer(&self, publication_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn is_subscribed(&self, publication_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn has_invitation(&self, publication_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn invite(&self, publication_id: i64, user_id: i64) -> Result<(), Error>;
    async fn withdraw_invitation(&self, publication_id: i64, user_id: i64) -> Result<(), Error>;
    /// Pending → Writer as one atomic unit: the invitation edge is removed
    /// and the writer edge inserted inside a single transaction, so the pair
    /// can never be observed in both (or neither) states.
    async fn accept_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error>;
    async fn decline_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error>;
    async fn remove_writer(&self, publication_id: i64, user_id: i64) -> Result<(), Error>;
    async fn subscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error>;
    async fn unsubscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error>;

    // --- Articles ---
    async fn publish_article(
        &self,
        publication_id: i64,
        writer_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Article, Error>;
    async fn get_article(&self, id: i64) -> Result<Article, Error>;
    async fn articles_of_publication(&self, publication_id: i64) -> Result<Vec<Article>, Error>;
    /// Home feed: articles from the last week, scored by like count,
    /// tie-broken by id descending.
    async fn recent_articles(&self, filters: Filters) -> Result<(Vec<Article>, Metadata), Error>;
    /// Same scoring, restricted to publications the user subscribes to.
    async fn subscribed_articles(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<(Vec<Article>, Metadata), Error>;
    async fn like_article(&self, user_id: i64, article_id: i64) -> Result<(), Error>;
    async fn unlike_article(&self, user_id: i64, article_id: i64) -> Result<(), Error>;
    async fn article_like_count(&self, article_id: i64) -> Result<i64, Error>;
    async fn user_has_liked_article(&self, user_id: i64, article_id: i64) -> Result<bool, Error>;

    // --- Comments ---
    async fn add_comment(
        &self,
        article_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, Error>;
    async fn get_comment(&self, id: i64) -> Result<Comment, Error>;
    /// Comments ordered by like score, tie-broken by id descending.
    async fn comments_of_article(&self, article_id: i64) -> Result<Vec<Comment>, Error>;
    async fn comment_count(&self, article_id: i64) -> Result<i64, Error>;
    async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error>;
    async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error>;
    async fn comment_like_count(&self, comment_id: i64) -> Result<i64, Error>;
    async fn user_has_liked_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Deadline for point lookups and single-row writes.
const POINT_DEADLINE: Duration = Duration::from_secs(3);
/// Deadline for multi-query or aggregate passes.
const AGGREGATE_DEADLINE: Duration = Duration::from_secs(6);

const USER_COLUMNS: &str = "id, name, email, image_id, created_at, version";
const PUBLICATION_COLUMNS: &str = "id, name, slug, description, owner_id, created_at, version";
const ARTICLE_COLUMNS: &str =
    "id, title, content, publication_id, writer_id, created_at, version";
const COMMENT_COLUMNS: &str = "id, article_id, commenter_id, content, created_at, version";

/// Row shape for the scored feed queries: the windowed total count and the
/// like score come back in the same pass as the article columns.
#[derive(FromRow)]
struct ScoredArticleRow {
    total: i64,
    id: i64,
    title: String,
    content: String,
    publication_id: i64,
    writer_id: i64,
    created_at: DateTime<Utc>,
    version: i32,
    #[allow(dead_code)]
    likes: i64,
}

impl ScoredArticleRow {
    fn into_parts(rows: Vec<Self>, filters: Filters) -> (Vec<Article>, Metadata) {
        let total = rows.first().map(|r| r.total).unwrap_or(0);
        let articles = rows
            .into_iter()
            .map(|r| Article {
                id: r.id,
                title: r.title,
                content: r.content,
                publication_id: r.publication_id,
                writer_id: r.writer_id,
                created_at: r.created_at,
                version: r.version,
            })
            .collect();
        (
            articles,
            Metadata::calculate(total, filters.page, filters.page_size),
        )
    }
}

/// PostgresRepository
///
/// The production implementation, backed by a sqlx connection pool. Every
/// query is wrapped in an explicit deadline and fails closed on timeout;
/// no silent retries; retry policy belongs to the caller. Connections are
/// acquired per operation by sqlx and released on every exit path.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bounds a query future by a deadline. Elapsed deadlines surface as
    /// `StoreTimeout`; sqlx errors are classified by `From<sqlx::Error>`.
    async fn bounded<T>(
        &self,
        deadline: Duration,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, Error> {
        match timeout(deadline, fut).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::StoreTimeout),
        }
    }

    /// Runs a statement that must affect at least one row, mapping a zero
    /// row count to the given error (missing edge vs. lost update).
    async fn execute_required(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        missing: Error,
    ) -> Result<(), Error> {
        let result = self.bounded(POINT_DEADLINE, query.execute(&self.pool)).await?;
        if result.rows_affected() == 0 {
            return Err(missing);
        }
        Ok(())
    }

    async fn exists(&self, sql: &str, a: i64, b: i64) -> Result<bool, Error> {
        // `SELECT 1` comes back as INT4.
        let row = self
            .bounded(
                POINT_DEADLINE,
                sqlx::query_scalar::<_, i32>(sql)
                    .bind(a)
                    .bind(b)
                    .fetch_optional(&self.pool),
            )
            .await?;
        Ok(row.is_some())
    }

    async fn count(&self, sql: &str, id: i64) -> Result<i64, Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(&self.pool),
        )
        .await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, Error> {
        // Duplicate email trips the unique constraint and classifies as
        // DuplicateRecord via From<sqlx::Error>.
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_scalar::<_, i64>(
                "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_user(&self, id: i64) -> Result<User, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn credentials(&self, email: &str) -> Result<(i64, String), Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, (i64, String)>(
                "SELECT id, password_hash FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn password_hash(&self, user_id: i64, version: i32) -> Result<String, Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_scalar::<_, String>(
                "SELECT password_hash FROM users WHERE id = $1 AND version = $2",
            )
            .bind(user_id)
            .bind(version)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::EditConflict)
    }

    async fn change_name(&self, user_id: i64, version: i32, name: &str) -> Result<(), Error> {
        self.execute_required(
            sqlx::query(
                "UPDATE users SET name = $1, version = version + 1 \
                 WHERE id = $2 AND version = $3",
            )
            .bind(name)
            .bind(user_id)
            .bind(version),
            Error::EditConflict,
        )
        .await
    }

    async fn change_password_hash(
        &self,
        user_id: i64,
        version: i32,
        password_hash: &str,
    ) -> Result<(), Error> {
        self.execute_required(
            sqlx::query(
                "UPDATE users SET password_hash = $1, version = version + 1 \
                 WHERE id = $2 AND version = $3",
            )
            .bind(password_hash)
            .bind(user_id)
            .bind(version),
            Error::EditConflict,
        )
        .await
    }

    async fn change_avatar(
        &self,
        user_id: i64,
        version: i32,
        image_id: i64,
    ) -> Result<(), Error> {
        self.execute_required(
            sqlx::query(
                "UPDATE users SET image_id = $1, version = version + 1 \
                 WHERE id = $2 AND version = $3",
            )
            .bind(image_id)
            .bind(user_id)
            .bind(version),
            Error::EditConflict,
        )
        .await
    }

    // --- Publications ---

    async fn create_publication(
        &self,
        owner_id: i64,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<Publication, Error> {
        let sql = format!(
            "INSERT INTO publication (name, slug, description, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING {PUBLICATION_COLUMNS}"
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Publication>(&sql)
                .bind(name)
                .bind(slug)
                .bind(description)
                .bind(owner_id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_publication_by_slug(&self, slug: &str) -> Result<Publication, Error> {
        let sql = format!("SELECT {PUBLICATION_COLUMNS} FROM publication WHERE slug = $1");
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Publication>(&sql).bind(slug).fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn delete_publication(&self, owner_id: i64, publication_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM publication WHERE owner_id = $1 AND id = $2")
                .bind(owner_id)
                .bind(publication_id),
            Error::NotFound,
        )
        .await
    }

    async fn publications_of_user(&self, user_id: i64) -> Result<UserPublications, Error> {
        let writes_sql = format!(
            "SELECT {} FROM writes_on wo \
             JOIN publication p ON wo.publication_id = p.id WHERE wo.user_id = $1",
            prefixed(PUBLICATION_COLUMNS, "p")
        );
        // Three cheap reads under one aggregate deadline; no transaction, so
        // a torn snapshot across buckets is the accepted trade-off.
        let fut = async {
            let writes_on = sqlx::query_as::<_, Publication>(&writes_sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            let subscribes_sql = format!(
                "SELECT {} FROM subscribes_to st \
                 JOIN publication p ON st.publication_id = p.id WHERE st.user_id = $1",
                prefixed(PUBLICATION_COLUMNS, "p")
            );
            let subscribes_to = sqlx::query_as::<_, Publication>(&subscribes_sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            let owns_sql =
                format!("SELECT {PUBLICATION_COLUMNS} FROM publication WHERE owner_id = $1");
            let owns = sqlx::query_as::<_, Publication>(&owns_sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(UserPublications {
                writes_on,
                subscribes_to,
                owns,
            })
        };
        self.bounded(AGGREGATE_DEADLINE, fut).await
    }

    async fn writers_of(&self, publication_id: i64) -> Result<Vec<User>, Error> {
        let sql = format!(
            "SELECT {} FROM writes_on wo JOIN users u ON wo.user_id = u.id \
             WHERE wo.publication_id = $1 ORDER BY u.id",
            prefixed(USER_COLUMNS, "u")
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, User>(&sql).bind(publication_id).fetch_all(&self.pool),
        )
        .await
    }

    async fn pending_invitees_of(&self, publication_id: i64) -> Result<Vec<User>, Error> {
        let sql = format!(
            "SELECT {} FROM invitation i JOIN users u ON i.user_id = u.id \
             WHERE i.publication_id = $1 ORDER BY u.id",
            prefixed(USER_COLUMNS, "u")
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, User>(&sql).bind(publication_id).fetch_all(&self.pool),
        )
        .await
    }

    async fn invitations_of_user(&self, user_id: i64) -> Result<Vec<Publication>, Error> {
        let sql = format!(
            "SELECT {} FROM invitation i JOIN publication p ON i.publication_id = p.id \
             WHERE i.user_id = $1 ORDER BY p.id",
            prefixed(PUBLICATION_COLUMNS, "p")
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Publication>(&sql).bind(user_id).fetch_all(&self.pool),
        )
        .await
    }

    // --- Membership edges ---

    async fn is_writer(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        self.exists(
            "SELECT 1 FROM writes_on WHERE publication_id = $1 AND user_id = $2 LIMIT 1",
            publication_id,
            user_id,
        )
        .await
    }

    async fn is_subscribed(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        self.exists(
            "SELECT 1 FROM subscribes_to WHERE publication_id = $1 AND user_id = $2 LIMIT 1",
            publication_id,
            user_id,
        )
        .await
    }

    async fn has_invitation(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        self.exists(
            "SELECT 1 FROM invitation WHERE publication_id = $1 AND user_id = $2 LIMIT 1",
            publication_id,
            user_id,
        )
        .await
    }

    async fn invite(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query("INSERT INTO invitation (user_id, publication_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(publication_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn withdraw_invitation(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM invitation WHERE user_id = $1 AND publication_id = $2")
                .bind(user_id)
                .bind(publication_id),
            Error::NotFound,
        )
        .await
    }

    async fn accept_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        // Single transaction: removing the pending edge and inserting the
        // writer edge either both happen or neither does. A concurrent
        // accept loses on the delete (zero rows) and gets NotFound; a user
        // who somehow already writes here trips the writes_on primary key
        // and gets DuplicateRecord.
        let fut = async {
            let mut tx = self.pool.begin().await?;
            let deleted =
                sqlx::query("DELETE FROM invitation WHERE user_id = $1 AND publication_id = $2")
                    .bind(user_id)
                    .bind(publication_id)
                    .execute(&mut *tx)
                    .await?;
            if deleted.rows_affected() == 0 {
                return Ok(false);
            }
            sqlx::query("INSERT INTO writes_on (user_id, publication_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(publication_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(true)
        };
        match self.bounded(POINT_DEADLINE, fut).await? {
            true => Ok(()),
            false => Err(Error::NotFound),
        }
    }

    async fn decline_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM invitation WHERE user_id = $1 AND publication_id = $2")
                .bind(user_id)
                .bind(publication_id),
            Error::NotFound,
        )
        .await
    }

    async fn remove_writer(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM writes_on WHERE user_id = $1 AND publication_id = $2")
                .bind(user_id)
                .bind(publication_id),
            Error::NotFound,
        )
        .await
    }

    async fn subscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query("INSERT INTO subscribes_to (user_id, publication_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(publication_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn unsubscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM subscribes_to WHERE user_id = $1 AND publication_id = $2")
                .bind(user_id)
                .bind(publication_id),
            Error::NotFound,
        )
        .await
    }

    // --- Articles ---

    async fn publish_article(
        &self,
        publication_id: i64,
        writer_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Article, Error> {
        let sql = format!(
            "INSERT INTO article (title, content, publication_id, writer_id) \
             VALUES ($1, $2, $3, $4) RETURNING {ARTICLE_COLUMNS}"
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Article>(&sql)
                .bind(title)
                .bind(content)
                .bind(publication_id)
                .bind(writer_id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_article(&self, id: i64) -> Result<Article, Error> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM article WHERE id = $1");
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Article>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn articles_of_publication(&self, publication_id: i64) -> Result<Vec<Article>, Error> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM article \
             WHERE publication_id = $1 ORDER BY created_at DESC, id DESC"
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Article>(&sql).bind(publication_id).fetch_all(&self.pool),
        )
        .await
    }

    async fn recent_articles(&self, filters: Filters) -> Result<(Vec<Article>, Metadata), Error> {
        let sql = format!(
            "SELECT count(*) OVER() AS total, {}, count(al.article_id) AS likes \
             FROM article a \
             LEFT JOIN article_like al ON a.id = al.article_id \
             WHERE a.created_at > now() - INTERVAL '1 week' \
             GROUP BY a.id \
             ORDER BY likes DESC, a.id DESC \
             LIMIT $1 OFFSET $2",
            prefixed(ARTICLE_COLUMNS, "a")
        );
        let rows = self
            .bounded(
                AGGREGATE_DEADLINE,
                sqlx::query_as::<_, ScoredArticleRow>(&sql)
                    .bind(filters.limit())
                    .bind(filters.offset())
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(ScoredArticleRow::into_parts(rows, filters))
    }

    async fn subscribed_articles(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<(Vec<Article>, Metadata), Error> {
        let sql = format!(
            "SELECT count(*) OVER() AS total, {}, count(al.article_id) AS likes \
             FROM subscribes_to st \
             INNER JOIN article a ON st.publication_id = a.publication_id \
             LEFT JOIN article_like al ON a.id = al.article_id \
             WHERE st.user_id = $1 \
             GROUP BY a.id \
             ORDER BY likes DESC, a.id DESC \
             LIMIT $2 OFFSET $3",
            prefixed(ARTICLE_COLUMNS, "a")
        );
        let rows = self
            .bounded(
                AGGREGATE_DEADLINE,
                sqlx::query_as::<_, ScoredArticleRow>(&sql)
                    .bind(user_id)
                    .bind(filters.limit())
                    .bind(filters.offset())
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(ScoredArticleRow::into_parts(rows, filters))
    }

    async fn like_article(&self, user_id: i64, article_id: i64) -> Result<(), Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query("INSERT INTO article_like (user_id, article_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(article_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn unlike_article(&self, user_id: i64, article_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM article_like WHERE user_id = $1 AND article_id = $2")
                .bind(user_id)
                .bind(article_id),
            Error::NotFound,
        )
        .await
    }

    async fn article_like_count(&self, article_id: i64) -> Result<i64, Error> {
        self.count(
            "SELECT COUNT(*) FROM article_like WHERE article_id = $1",
            article_id,
        )
        .await
    }

    async fn user_has_liked_article(&self, user_id: i64, article_id: i64) -> Result<bool, Error> {
        self.exists(
            "SELECT 1 FROM article_like WHERE user_id = $1 AND article_id = $2 LIMIT 1",
            user_id,
            article_id,
        )
        .await
    }

    // --- Comments ---

    async fn add_comment(
        &self,
        article_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, Error> {
        let sql = format!(
            "INSERT INTO comment (article_id, commenter_id, content) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        );
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Comment>(&sql)
                .bind(article_id)
                .bind(commenter_id)
                .bind(content)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_comment(&self, id: i64) -> Result<Comment, Error> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comment WHERE id = $1");
        self.bounded(
            POINT_DEADLINE,
            sqlx::query_as::<_, Comment>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn comments_of_article(&self, article_id: i64) -> Result<Vec<Comment>, Error> {
        let sql = format!(
            "SELECT {}, count(cl.comment_id) AS likes \
             FROM comment c \
             LEFT JOIN comment_like cl ON c.id = cl.comment_id \
             WHERE c.article_id = $1 \
             GROUP BY c.id \
             ORDER BY likes DESC, c.id DESC",
            prefixed(COMMENT_COLUMNS, "c")
        );
        self.bounded(
            AGGREGATE_DEADLINE,
            sqlx::query_as::<_, Comment>(&sql).bind(article_id).fetch_all(&self.pool),
        )
        .await
    }

    async fn comment_count(&self, article_id: i64) -> Result<i64, Error> {
        self.count(
            "SELECT COUNT(*) FROM comment WHERE article_id = $1",
            article_id,
        )
        .await
    }

    async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error> {
        self.bounded(
            POINT_DEADLINE,
            sqlx::query("INSERT INTO comment_like (user_id, comment_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(comment_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error> {
        self.execute_required(
            sqlx::query("DELETE FROM comment_like WHERE user_id = $1 AND comment_id = $2")
                .bind(user_id)
                .bind(comment_id),
            Error::NotFound,
        )
        .await
    }

    async fn comment_like_count(&self, comment_id: i64) -> Result<i64, Error> {
        self.count(
            "SELECT COUNT(*) FROM comment_like WHERE comment_id = $1",
            comment_id,
        )
        .await
    }

    async fn user_has_liked_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, Error> {
        self.exists(
            "SELECT 1 FROM comment_like WHERE user_id = $1 AND comment_id = $2 LIMIT 1",
            user_id,
            comment_id,
        )
        .await
    }
}

/// Prefixes every column in a comma-separated column list with a table
/// alias, for joined queries.
fn prefixed(columns: &str, alias: &str) -> String {
    columns
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
