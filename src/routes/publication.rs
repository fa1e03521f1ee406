use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Publication Router Module
///
/// Mutations scoped to a resolved publication: publishing, membership
/// management, subscriptions, likes and comments. The auth layer above
/// guarantees an authenticated viewer; the writer/owner gates run inside
/// the use-cases once the request context is resolved, so a missing
/// publication is a 404 before any permission check happens.
pub fn publication_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /publications/{slug}/delete
        // Owner-only. Removes the publication and its membership edges.
        .route(
            "/publications/{slug}/delete",
            post(handlers::delete_publication),
        )
        // POST /publications/{slug}/subscribe | /unsubscribe
        // Subscription edges have set semantics: duplicate subscribe is a
        // 409, unsubscribing without a subscription is a 404.
        .route("/publications/{slug}/subscribe", post(handlers::subscribe))
        .route(
            "/publications/{slug}/unsubscribe",
            post(handlers::unsubscribe),
        )
        // --- Writer management ---
        // POST /publications/{slug}/invitations
        // Owner-only. Invites a user by email.
        .route(
            "/publications/{slug}/invitations",
            post(handlers::invite_writer),
        )
        // POST /publications/{slug}/invitations/{user_id}/withdraw
        // Owner-only. Retracts a pending invitation.
        .route(
            "/publications/{slug}/invitations/{user_id}/withdraw",
            post(handlers::withdraw_invitation),
        )
        // POST /publications/{slug}/invitations/accept | /decline
        // The invitee resolving their own pending invitation. Accepting
        // atomically swaps the invitation for a writer seat.
        .route(
            "/publications/{slug}/invitations/accept",
            post(handlers::accept_invitation),
        )
        .route(
            "/publications/{slug}/invitations/decline",
            post(handlers::decline_invitation),
        )
        // POST /publications/{slug}/writers/{user_id}/kick
        // Owner-only. The owner themselves cannot be kicked.
        .route(
            "/publications/{slug}/writers/{user_id}/kick",
            post(handlers::kick_writer),
        )
        // POST /publications/{slug}/leave
        // A writer giving up their own seat. Owners cannot leave.
        .route("/publications/{slug}/leave", post(handlers::leave_publication))
        // --- Articles ---
        // POST /publications/{slug}/articles
        // Writer-only. Publishes an article.
        .route(
            "/publications/{slug}/articles",
            post(handlers::publish_article),
        )
        // POST .../articles/{article}/like | /unlike
        // Article likes, set semantics.
        .route(
            "/publications/{slug}/articles/{article}/like",
            post(handlers::like_article),
        )
        .route(
            "/publications/{slug}/articles/{article}/unlike",
            post(handlers::unlike_article),
        )
        // --- Comments ---
        // POST .../articles/{article}/comments
        // Posts a comment on the resolved article.
        .route(
            "/publications/{slug}/articles/{article}/comments",
            post(handlers::add_comment),
        )
        // POST .../comments/{comment}/like | /unlike
        // Comment likes, same set semantics as article likes.
        .route(
            "/publications/{slug}/articles/{article}/comments/{comment}/like",
            post(handlers::like_comment),
        )
        .route(
            "/publications/{slug}/articles/{article}/comments/{comment}/unlike",
            post(handlers::unlike_comment),
        )
}
