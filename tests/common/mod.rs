use inkstand::{
    AppConfig, AppState, MemoryRepository, create_router,
    models::User,
    repository::RepositoryState,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub repo: RepositoryState,
}

/// Boots the full router on a random port against the in-memory store, so
/// the suite exercises the real HTTP surface without Postgres. The default
/// config runs in Local mode, which enables the x-user-id header bypass for
/// authenticating test requests without a token round-trip.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

impl TestApp {
    /// Seeds a user directly through the repository and returns the record.
    pub async fn seed_user(&self, name: &str, email: &str) -> User {
        let id = self
            .repo
            .create_user(name, email, "$2b$12$test-hash-not-a-real-one")
            .await
            .unwrap();
        self.repo.get_user(id).await.unwrap()
    }
}
