mod common;

use common::spawn_app;
use inkstand::models::{
    ArticlePage, ArticleView, FeedPage, LoginResponse, Membership, Publication, PublicationPage,
    ProfilePage, User,
};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn register_login_and_fetch_me() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", app.address))
        .json(&serde_json::json!({
            "name": "Jane Doe", "email": "jane@example.com", "password": "correct horse battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let user: User = response.json().await.unwrap();
    assert_eq!(user.email, "jane@example.com");

    // Duplicate email answers 409.
    let response = client
        .post(format!("{}/register", app.address))
        .json(&serde_json::json!({
            "name": "Other", "email": "jane@example.com", "password": "correct horse battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({
            "email": "jane@example.com", "password": "correct horse battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let login: LoginResponse = response.json().await.unwrap();
    assert_eq!(login.user.id, user.id);

    // The issued token authenticates /me.
    let response = client
        .get(format!("{}/me", app.address))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let me: User = response.json().await.unwrap();
    assert_eq!(me.id, user.id);
}

#[tokio::test]
async fn anonymous_requests_cannot_mutate() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/publications", app.address))
        .json(&serde_json::json!({ "name": "Daily Ink", "description": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Reads stay open.
    let response = client
        .get(format!("{}/feed", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn publication_and_article_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = app.seed_user("Owner", "o@example.com").await;

    // Create, via the Local-mode x-user-id bypass.
    let response = client
        .post(format!("{}/publications", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "name": "Daily Ink", "description": "news" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let publication: Publication = response.json().await.unwrap();
    assert_eq!(publication.slug, "daily-ink");

    // Publish an article as the owner (ownership subsumes writing).
    let response = client
        .post(format!("{}/publications/daily-ink/articles", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "title": "Hello World", "content": "first post" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let article: ArticleView = response.json().await.unwrap();
    assert_eq!(article.url, format!("hello-world-{}", article.id));

    // The publication page lists it and reports the owner as a writer.
    let response = client
        .get(format!("{}/publications/daily-ink", app.address))
        .header("x-user-id", owner.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let page: PublicationPage = response.json().await.unwrap();
    assert_eq!(page.articles.len(), 1);
    assert_eq!(page.viewer_membership, Membership::Writer);
    assert!(!page.viewer_is_subscribed);

    // The article resolves under its canonical URL.
    let response = client
        .get(format!(
            "{}/publications/daily-ink/articles/{}",
            app.address, article.url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let page: ArticlePage = response.json().await.unwrap();
    assert_eq!(page.article.id, article.id);

    // A stale slug pointing at the same id is a plain 404.
    let response = client
        .get(format!(
            "{}/publications/daily-ink/articles/wrong-slug-{}",
            app.address, article.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Non-writers cannot publish.
    let reader = app.seed_user("Reader", "r@example.com").await;
    let response = client
        .post(format!("{}/publications/daily-ink/articles", app.address))
        .header("x-user-id", reader.id.to_string())
        .json(&serde_json::json!({ "title": "Sneaky", "content": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn likes_and_comments_over_http() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = app.seed_user("Owner", "o@example.com").await;
    let reader = app.seed_user("Reader", "r@example.com").await;

    client
        .post(format!("{}/publications", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "name": "Daily Ink", "description": "" }))
        .send()
        .await
        .unwrap();
    let article: ArticleView = client
        .post(format!("{}/publications/daily-ink/articles", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "title": "Hello World", "content": "post" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let like_url = format!(
        "{}/publications/daily-ink/articles/{}/like",
        app.address, article.url
    );
    let response = client
        .post(&like_url)
        .header("x-user-id", reader.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // Liking twice is a conflict, not a double count.
    let response = client
        .post(&like_url)
        .header("x-user-id", reader.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!(
            "{}/publications/daily-ink/articles/{}/comments",
            app.address, article.url
        ))
        .header("x-user-id", reader.id.to_string())
        .json(&serde_json::json!({ "content": "great read" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    // The article page reflects the viewer-scoped facts.
    let page: ArticlePage = client
        .get(format!(
            "{}/publications/daily-ink/articles/{}",
            app.address, article.url
        ))
        .header("x-user-id", reader.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.article.likes.count, 1);
    assert!(page.article.likes.viewer_has_liked);
    assert_eq!(page.article.comment_count, 1);
    assert_eq!(page.comments.len(), 1);

    // Anonymous viewers see the count but never a personal flag.
    let page: ArticlePage = client
        .get(format!(
            "{}/publications/daily-ink/articles/{}",
            app.address, article.url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.article.likes.count, 1);
    assert!(!page.article.likes.viewer_has_liked);
}

#[tokio::test]
async fn invitation_flow_over_http() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = app.seed_user("Owner", "o@example.com").await;
    let invitee = app.seed_user("Invitee", "i@example.com").await;

    client
        .post(format!("{}/publications", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "name": "Daily Ink", "description": "" }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/publications/daily-ink/invitations", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "email": "i@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // The invitee sees the publication in their pending list.
    let invitations: Vec<Publication> = client
        .get(format!("{}/me/invitations", app.address))
        .header("x-user-id", invitee.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].slug, "daily-ink");

    // A non-owner cannot invite.
    let response = client
        .post(format!("{}/publications/daily-ink/invitations", app.address))
        .header("x-user-id", invitee.id.to_string())
        .json(&serde_json::json!({ "email": "o@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!(
            "{}/publications/daily-ink/invitations/accept",
            app.address
        ))
        .header("x-user-id", invitee.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // Now a writer: publishing succeeds and the pending list is empty.
    let response = client
        .post(format!("{}/publications/daily-ink/articles", app.address))
        .header("x-user-id", invitee.id.to_string())
        .json(&serde_json::json!({ "title": "By The New Writer", "content": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let invitations: Vec<Publication> = client
        .get(format!("{}/me/invitations", app.address))
        .header("x-user-id", invitee.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(invitations.is_empty());
}

#[tokio::test]
async fn profile_urls_go_stale_after_rename() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = app.seed_user("Jane Doe", "j@example.com").await;
    let old_url = user.url();

    let response = client
        .get(format!("{}/user/{}", app.address, old_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let page: ProfilePage = response.json().await.unwrap();
    assert_eq!(page.user.id, user.id);

    let response = client
        .post(format!("{}/me/name", app.address))
        .header("x-user-id", user.id.to_string())
        .json(&serde_json::json!({ "name": "Jane Smith" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // The old compound URL is dead; the new one resolves.
    let response = client
        .get(format!("{}/user/{}", app.address, old_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .get(format!(
            "{}/user/{}",
            app.address,
            format!("jane-smith-{}", user.id)
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn feeds_rank_and_paginate() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = app.seed_user("Owner", "o@example.com").await;
    let fan = app.seed_user("Fan", "f@example.com").await;

    client
        .post(format!("{}/publications", app.address))
        .header("x-user-id", owner.id.to_string())
        .json(&serde_json::json!({ "name": "Daily Ink", "description": "" }))
        .send()
        .await
        .unwrap();

    let mut urls = Vec::new();
    for title in ["Quiet One", "Popular One"] {
        let article: ArticleView = client
            .post(format!("{}/publications/daily-ink/articles", app.address))
            .header("x-user-id", owner.id.to_string())
            .json(&serde_json::json!({ "title": title, "content": "body" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        urls.push(article.url);
    }

    client
        .post(format!(
            "{}/publications/daily-ink/articles/{}/like",
            app.address, urls[1]
        ))
        .header("x-user-id", fan.id.to_string())
        .send()
        .await
        .unwrap();

    let feed: FeedPage = client
        .get(format!("{}/feed?page=1&page_size=10", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed.metadata.total_records, 2);
    assert_eq!(feed.articles[0].title, "Popular One");
    assert_eq!(feed.articles[0].likes.count, 1);

    // The subscribed feed is empty until the fan subscribes.
    let feed: FeedPage = client
        .get(format!("{}/me/feed", app.address))
        .header("x-user-id", fan.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(feed.articles.is_empty());

    client
        .post(format!("{}/publications/daily-ink/subscribe", app.address))
        .header("x-user-id", fan.id.to_string())
        .send()
        .await
        .unwrap();

    let feed: FeedPage = client
        .get(format!("{}/me/feed", app.address))
        .header("x-user-id", fan.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed.articles.len(), 2);
}
