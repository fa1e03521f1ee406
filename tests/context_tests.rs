use std::sync::Arc;

use inkstand::authz::{self, Capability};
use inkstand::context::{self, PathSegments};
use inkstand::error::Error;
use inkstand::memory::MemoryRepository;
use inkstand::models::{Article, Publication, User};
use inkstand::repository::RepositoryState;

fn repo() -> RepositoryState {
    Arc::new(MemoryRepository::new()) as RepositoryState
}

async fn seed_user(repo: &RepositoryState, name: &str, email: &str) -> User {
    let id = repo.create_user(name, email, "hash").await.unwrap();
    repo.get_user(id).await.unwrap()
}

async fn seed_publication(repo: &RepositoryState, owner: &User, name: &str) -> Publication {
    repo.create_publication(owner.id, name, &inkstand::ident::slugify(name), "about")
        .await
        .unwrap()
}

async fn seed_article(repo: &RepositoryState, publication: &Publication, writer: &User) -> Article {
    repo.publish_article(publication.id, writer.id, "Hello World", "body")
        .await
        .unwrap()
}

#[tokio::test]
async fn resolves_full_chain() {
    let repo = repo();
    let owner = seed_user(&repo, "Owner", "o@example.com").await;
    let publication = seed_publication(&repo, &owner, "Daily Ink").await;
    let article = seed_article(&repo, &publication, &owner).await;
    let comment = repo.add_comment(article.id, owner.id, "nice").await.unwrap();

    let article_seg = article.url();
    let comment_seg = comment.id.to_string();
    let ctx = context::resolve(
        &repo,
        Some(owner.clone()),
        &PathSegments {
            publication: Some(&publication.slug),
            article: Some(&article_seg),
            comment: Some(&comment_seg),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(ctx.viewer().unwrap().id, owner.id);
    assert_eq!(ctx.publication().unwrap().id, publication.id);
    assert_eq!(ctx.article().unwrap().id, article.id);
    assert_eq!(ctx.comment().unwrap().id, comment.id);
}

#[tokio::test]
async fn missing_publication_short_circuits() {
    let repo = repo();
    let err = context::resolve(
        &repo,
        None,
        &PathSegments {
            publication: Some("nope"),
            article: Some("anything-1"),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn stale_article_slug_is_rejected() {
    let repo = repo();
    let owner = seed_user(&repo, "Owner", "o@example.com").await;
    let publication = seed_publication(&repo, &owner, "Daily Ink").await;
    let article = seed_article(&repo, &publication, &owner).await;

    // A URL minted under a different title but pointing at a real id.
    let stale = format!("old-title-{}", article.id);
    let err = context::resolve(
        &repo,
        None,
        &PathSegments {
            publication: Some(&publication.slug),
            article: Some(&stale),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::StaleIdentifier));
}

#[tokio::test]
async fn malformed_article_segment_is_rejected() {
    let repo = repo();
    let owner = seed_user(&repo, "Owner", "o@example.com").await;
    let publication = seed_publication(&repo, &owner, "Daily Ink").await;

    let err = context::resolve(
        &repo,
        None,
        &PathSegments {
            publication: Some(&publication.slug),
            article: Some("no-id-here"),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MalformedIdentifier));
}

#[tokio::test]
async fn profile_resolution_checks_current_name() {
    let repo = repo();
    let user = seed_user(&repo, "Jane Doe", "j@example.com").await;

    let segment = user.url();
    let ctx = context::resolve(
        &repo,
        None,
        &PathSegments {
            profile: Some(&segment),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(ctx.profile().unwrap().id, user.id);

    // After a rename the old profile URL goes dead.
    repo.change_name(user.id, user.version, "Jane Smith")
        .await
        .unwrap();
    let err = context::resolve(
        &repo,
        None,
        &PathSegments {
            profile: Some(&segment),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::StaleIdentifier));
}

#[tokio::test]
async fn identity_resolution_degrades_to_anonymous() {
    let repo = repo();
    let user = seed_user(&repo, "Jane", "j@example.com").await;

    assert_eq!(
        context::resolve_identity(&repo, Some(user.id))
            .await
            .map(|u| u.id),
        Some(user.id)
    );
    assert!(context::resolve_identity(&repo, Some(9999)).await.is_none());
    assert!(context::resolve_identity(&repo, None).await.is_none());
}

#[tokio::test]
async fn authorization_predicates_follow_membership() {
    let repo = repo();
    let owner = seed_user(&repo, "Owner", "o@example.com").await;
    let writer = seed_user(&repo, "Writer", "w@example.com").await;
    let reader = seed_user(&repo, "Reader", "r@example.com").await;
    let publication = seed_publication(&repo, &owner, "Daily Ink").await;

    repo.invite(publication.id, writer.id).await.unwrap();
    repo.accept_invitation(writer.id, publication.id)
        .await
        .unwrap();

    let segments = PathSegments {
        publication: Some(&publication.slug),
        ..PathSegments::default()
    };

    let owner_ctx = context::resolve(&repo, Some(owner), &segments).await.unwrap();
    assert!(authz::authorize(&owner_ctx, Capability::Owner));
    // Ownership subsumes writing rights.
    assert!(authz::authorize(&owner_ctx, Capability::Writer));

    let writer_ctx = context::resolve(&repo, Some(writer), &segments).await.unwrap();
    assert!(!authz::authorize(&writer_ctx, Capability::Owner));
    assert!(authz::authorize(&writer_ctx, Capability::Writer));

    let reader_ctx = context::resolve(&repo, Some(reader), &segments).await.unwrap();
    assert!(authz::authorize(&reader_ctx, Capability::Authenticated));
    assert!(!authz::authorize(&reader_ctx, Capability::Writer));
    assert!(matches!(
        authz::require(&reader_ctx, Capability::Writer),
        Err(Error::NotPermitted)
    ));

    let anon_ctx = context::resolve(&repo, None, &segments).await.unwrap();
    assert!(!authz::authorize(&anon_ctx, Capability::Authenticated));
}
