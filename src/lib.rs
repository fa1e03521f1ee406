use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod aggregates;
pub mod auth;
pub mod authz;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod ident;
pub mod memory;
pub mod models;
pub mod repository;
pub mod usecases;

// Module for routing segregation (Public, Authenticated, Publication-scoped).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public, publication};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry
// point (main.rs) and the test suite.
pub use config::AppConfig;
pub use error::Error;
pub use memory::MemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application by aggregating every `#[utoipa::path]` handler and every
/// `ToSchema` model. The resulting JSON is served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login_user, handlers::get_me,
        handlers::get_my_publications, handlers::get_my_invitations,
        handlers::change_name, handlers::change_password, handlers::change_avatar,
        handlers::get_feed, handlers::get_my_feed,
        handlers::get_publication_page, handlers::get_article_page, handlers::get_profile,
        handlers::create_publication, handlers::delete_publication,
        handlers::subscribe, handlers::unsubscribe,
        handlers::invite_writer, handlers::withdraw_invitation,
        handlers::accept_invitation, handlers::decline_invitation,
        handlers::kick_writer, handlers::leave_publication,
        handlers::publish_article, handlers::add_comment,
        handlers::like_article, handlers::unlike_article,
        handlers::like_comment, handlers::unlike_comment,
    ),
    components(
        schemas(
            models::User, models::Publication, models::Article, models::Comment,
            models::LikeFacts, models::Membership, models::UserPublications,
            models::Metadata, models::SignupRequest, models::LoginRequest,
            models::LoginResponse, models::CreatePublicationRequest,
            models::PublishArticleRequest, models::CreateCommentRequest,
            models::InviteWriterRequest, models::ChangeNameRequest,
            models::ChangePasswordRequest, models::ChangeAvatarRequest,
            models::ArticleView, models::CommentView, models::FeedPage,
            models::PublicationPage, models::ArticlePage, models::ProfilePage,
        )
    ),
    tags(
        (name = "inkstand", description = "Collaborative publishing API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding the application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts data access behind the `Repository`
    /// trait (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors to selectively pull components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected route modules. It attempts to
/// extract `AuthUser` from the request; since `AuthUser` implements
/// `FromRequestParts`, any failure (missing/expired token, deleted user)
/// rejects with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware; handlers resolve the viewer
        // optionally.
        .merge(public::public_routes())
        // Protected routes: both the account-scoped and publication-scoped
        // modules sit behind the auth layer. Finer gates (writer, owner)
        // run inside the use-cases after context resolution.
        .merge(
            authenticated::authenticated_routes()
                .merge(publication::publication_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every incoming
                // request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in
                // a span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation: returns the x-request-id header
                // to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span: extracts the `x-request-id` header and
/// includes it alongside the HTTP method and URI, so every log line for a
/// single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
