use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error
///
/// The single error taxonomy shared by the repository, the context-resolution
/// chain and the mutation use-cases. Business-rule violations are translated
/// into the named variants at the layer that detects them; raw store errors
/// never cross the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A point lookup matched zero rows.
    #[error("record not found")]
    NotFound,

    /// A unique constraint was violated on insert (duplicate email,
    /// publication slug, invitation or like edge).
    #[error("duplicate record")]
    DuplicateRecord,

    /// Optimistic-version mismatch: the row changed since it was read.
    #[error("edit conflict")]
    EditConflict,

    /// Unknown email or password hash mismatch.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A compound identifier could not be split into slug and numeric id.
    #[error("malformed identifier")]
    MalformedIdentifier,

    /// The decoded slug no longer matches the entity's current title/name.
    /// Distinguishable from `NotFound` internally, but presented identically
    /// to callers so stale URLs cannot be used as a slug oracle.
    #[error("stale identifier")]
    StaleIdentifier,

    /// An authorization gate rejected the operation.
    #[error("not permitted")]
    NotPermitted,

    /// Request payload failed a business validation rule.
    #[error("{0}")]
    Validation(String),

    /// A repository query exceeded its deadline. Fails closed; retrying is
    /// the caller's decision.
    #[error("query deadline exceeded")]
    StoreTimeout,

    /// Unclassified infrastructure failure from the data store.
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Classifies raw sqlx failures into the taxonomy. Unique-constraint
/// violations become `DuplicateRecord`; zero-row point lookups become
/// `NotFound`; everything else propagates unclassified.
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Error::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateRecord,
            _ => Error::Store(err),
        }
    }
}

impl IntoResponse for Error {
    /// Maps the taxonomy onto HTTP response classes:
    /// - absent, stale and unparseable identifiers all collapse to 404
    /// - duplicate inserts and lost updates are 409 with a retry hint
    /// - credential failures are 401, gate failures 403
    /// - infrastructure failures are logged in full and returned as a
    ///   generic 500
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound | Error::MalformedIdentifier | Error::StaleIdentifier => {
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            Error::DuplicateRecord => (
                StatusCode::CONFLICT,
                "Already exists, please refresh and retry".to_string(),
            ),
            Error::EditConflict => (
                StatusCode::CONFLICT,
                "Edit conflict, please refresh and retry".to_string(),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Email or password is incorrect".to_string(),
            ),
            Error::NotPermitted => (StatusCode::FORBIDDEN, "Not permitted".to_string()),
            Error::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Error::StoreTimeout | Error::Store(_) | Error::Hash(_) | Error::Token(_) => {
                tracing::error!(error = ?self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
