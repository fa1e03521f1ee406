use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Account-scoped routes for the logged-in user: profile data, the
/// subscribed feed, pending invitations and profile mutations. Every
/// handler here relies on the `AuthUser` extractor middleware applied to
/// this router in `create_router`, so anonymous requests are rejected with
/// 401 before any handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The authenticated user's own record.
        .route("/me", get(handlers::get_me))
        // GET /me/publications
        // The user's three publication buckets: owned, writing, subscribed.
        .route("/me/publications", get(handlers::get_my_publications))
        // GET /me/feed?page=...&page_size=...
        // Articles from subscribed publications, ranked by like count.
        .route("/me/feed", get(handlers::get_my_feed))
        // GET /me/invitations
        // Publications with a pending invitation for this user.
        .route("/me/invitations", get(handlers::get_my_invitations))
        // POST /me/name | /me/password | /me/avatar
        // Profile mutations, all guarded by the optimistic version counter:
        // a concurrent change surfaces as 409 rather than a lost update.
        .route("/me/name", post(handlers::change_name))
        .route("/me/password", post(handlers::change_password))
        .route("/me/avatar", post(handlers::change_avatar))
        // POST /publications
        // Creates a publication owned by the authenticated user.
        .route("/publications", post(handlers::create_publication))
}
