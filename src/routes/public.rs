use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged-in: the identity
/// gateway (register/login) and the reading surfaces. Reading handlers
/// resolve the viewer via `OptionalUser`, so a valid session enriches the
/// response with viewer-scoped facts while its absence never rejects.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // New account creation. Duplicate emails are rejected with 409.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Credential verification; issues the session token.
        .route("/login", post(handlers::login_user))
        // GET /feed?page=...&page_size=...
        // The home feed: last week's articles ranked by like count.
        .route("/feed", get(handlers::get_feed))
        // GET /publications/{slug}
        // A publication's landing page with articles, writers and the
        // viewer's membership state.
        .route("/publications/{slug}", get(handlers::get_publication_page))
        // GET /publications/{slug}/articles/{article}
        // A single article with its comments. The article segment is a
        // compound identifier; stale links 404.
        .route(
            "/publications/{slug}/articles/{article}",
            get(handlers::get_article_page),
        )
        // GET /user/{profile}
        // A profile page, addressed by compound identifier. Renames
        // invalidate old profile URLs.
        .route("/user/{profile}", get(handlers::get_profile))
}
