use std::sync::Arc;

use inkstand::context::{self, PathSegments};
use inkstand::error::Error;
use inkstand::memory::MemoryRepository;
use inkstand::models::{
    ChangePasswordRequest, CreatePublicationRequest, Filters, InviteWriterRequest, LoginRequest,
    Membership, Metadata, SignupRequest, User,
};
use inkstand::repository::RepositoryState;
use inkstand::{aggregates, usecases};

fn repo() -> RepositoryState {
    Arc::new(MemoryRepository::new()) as RepositoryState
}

async fn signup(repo: &RepositoryState, name: &str, email: &str) -> User {
    usecases::signup(
        repo,
        &SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn create_publication(repo: &RepositoryState, owner: &User, name: &str) -> String {
    usecases::create_publication(
        repo,
        owner,
        &CreatePublicationRequest {
            name: name.to_string(),
            description: "about".to_string(),
        },
    )
    .await
    .unwrap()
    .slug
}

async fn ctx_for(
    repo: &RepositoryState,
    viewer: &User,
    slug: &str,
) -> inkstand::context::ResolvedContext {
    context::resolve(
        repo,
        Some(viewer.clone()),
        &PathSegments {
            publication: Some(slug),
            ..PathSegments::default()
        },
    )
    .await
    .unwrap()
}

// --- Accounts ---

#[tokio::test]
async fn signup_rejects_weak_and_duplicate_credentials() {
    let repo = repo();

    let short = usecases::signup(
        &repo,
        &SignupRequest {
            name: "Jane".to_string(),
            email: "j@example.com".to_string(),
            password: "short".to_string(),
        },
    )
    .await;
    assert!(matches!(short, Err(Error::Validation(_))));

    signup(&repo, "Jane", "j@example.com").await;
    let dup = usecases::signup(
        &repo,
        &SignupRequest {
            name: "Other Jane".to_string(),
            email: "j@example.com".to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await;
    assert!(matches!(dup, Err(Error::DuplicateRecord)));
}

#[tokio::test]
async fn login_hides_whether_email_exists() {
    let repo = repo();
    signup(&repo, "Jane", "j@example.com").await;

    let unknown = usecases::login(
        &repo,
        &LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(Error::InvalidCredentials)));

    let wrong = usecases::login(
        &repo,
        &LoginRequest {
            email: "j@example.com".to_string(),
            password: "wrong password entirely".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(Error::InvalidCredentials)));

    let ok = usecases::login(
        &repo,
        &LoginRequest {
            email: "j@example.com".to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(ok.email, "j@example.com");
}

#[tokio::test]
async fn concurrent_profile_edits_conflict() {
    let repo = repo();
    let user = signup(&repo, "Jane", "j@example.com").await;

    // Both edits start from the same version; the second one loses.
    repo.change_name(user.id, user.version, "Jane A")
        .await
        .unwrap();
    let stale = repo.change_name(user.id, user.version, "Jane B").await;
    assert!(matches!(stale, Err(Error::EditConflict)));

    let current = repo.get_user(user.id).await.unwrap();
    assert_eq!(current.name, "Jane A");
    assert_eq!(current.version, user.version + 1);
}

#[tokio::test]
async fn password_changes_require_the_current_password() {
    let repo = repo();
    let user = signup(&repo, "Jane", "j@example.com").await;

    let wrong = usecases::change_password(
        &repo,
        &user,
        &ChangePasswordRequest {
            current_password: "not the password".to_string(),
            new_password: "an even longer secret".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(Error::InvalidCredentials)));

    usecases::change_password(
        &repo,
        &user,
        &ChangePasswordRequest {
            current_password: "correct horse battery".to_string(),
            new_password: "an even longer secret".to_string(),
        },
    )
    .await
    .unwrap();

    // The old credentials stop working; the new ones log in.
    let old = usecases::login(
        &repo,
        &LoginRequest {
            email: "j@example.com".to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await;
    assert!(matches!(old, Err(Error::InvalidCredentials)));

    usecases::login(
        &repo,
        &LoginRequest {
            email: "j@example.com".to_string(),
            password: "an even longer secret".to_string(),
        },
    )
    .await
    .unwrap();
}

// --- Publications ---

#[tokio::test]
async fn publication_names_are_validated_and_unique() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;

    let too_short = usecases::create_publication(
        &repo,
        &owner,
        &CreatePublicationRequest {
            name: "abc".to_string(),
            description: String::new(),
        },
    )
    .await;
    assert!(matches!(too_short, Err(Error::Validation(_))));

    let reserved = usecases::create_publication(
        &repo,
        &owner,
        &CreatePublicationRequest {
            name: "USER".to_string(),
            description: String::new(),
        },
    )
    .await;
    assert!(matches!(reserved, Err(Error::Validation(_))));

    create_publication(&repo, &owner, "Daily Ink").await;
    // A different display name slugging to the same value collides.
    let dup = usecases::create_publication(
        &repo,
        &owner,
        &CreatePublicationRequest {
            name: "Daily  INK".to_string(),
            description: String::new(),
        },
    )
    .await;
    assert!(matches!(dup, Err(Error::DuplicateRecord)));
}

// --- Invitation state machine ---

#[tokio::test]
async fn invitation_accept_moves_pending_to_writer() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let invitee = signup(&repo, "Invitee", "i@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    usecases::invite_writer(
        &repo,
        &owner_ctx,
        &InviteWriterRequest {
            email: "i@example.com".to_string(),
        },
    )
    .await
    .unwrap();

    let publication = owner_ctx.publication().unwrap();
    assert_eq!(
        aggregates::membership(&repo, publication, Some(&invitee))
            .await
            .unwrap(),
        Membership::Pending
    );

    let invitee_ctx = ctx_for(&repo, &invitee, &slug).await;
    usecases::accept_invitation(&repo, &invitee_ctx).await.unwrap();

    assert_eq!(
        aggregates::membership(&repo, publication, Some(&invitee))
            .await
            .unwrap(),
        Membership::Writer
    );
    // The pending edge is gone; accepting again finds nothing.
    let again = usecases::accept_invitation(&repo, &invitee_ctx).await;
    assert!(matches!(again, Err(Error::NotFound)));

    // A stray invitation to someone already writing trips the writer edge
    // instead, and the failed accept leaves the invitation in place.
    repo.invite(publication.id, invitee.id).await.unwrap();
    assert!(matches!(
        usecases::accept_invitation(&repo, &invitee_ctx).await,
        Err(Error::DuplicateRecord)
    ));
    assert!(repo
        .has_invitation(publication.id, invitee.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn inviting_an_existing_writer_or_invitee_is_a_duplicate() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    signup(&repo, "Invitee", "i@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let payload = InviteWriterRequest {
        email: "i@example.com".to_string(),
    };
    let ctx = ctx_for(&repo, &owner, &slug).await;
    usecases::invite_writer(&repo, &ctx, &payload).await.unwrap();

    let twice = usecases::invite_writer(&repo, &ctx, &payload).await;
    assert!(matches!(twice, Err(Error::DuplicateRecord)));

    // Inviting the owner is a duplicate too: owners already write.
    let self_invite = usecases::invite_writer(
        &repo,
        &ctx,
        &InviteWriterRequest {
            email: "o@example.com".to_string(),
        },
    )
    .await;
    assert!(matches!(self_invite, Err(Error::DuplicateRecord)));
}

#[tokio::test]
async fn decline_and_withdraw_clear_the_pending_edge() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let invitee = signup(&repo, "Invitee", "i@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    let payload = InviteWriterRequest {
        email: "i@example.com".to_string(),
    };

    usecases::invite_writer(&repo, &owner_ctx, &payload).await.unwrap();
    let invitee_ctx = ctx_for(&repo, &invitee, &slug).await;
    usecases::decline_invitation(&repo, &invitee_ctx).await.unwrap();
    // Declined, so there is nothing left to accept.
    assert!(matches!(
        usecases::accept_invitation(&repo, &invitee_ctx).await,
        Err(Error::NotFound)
    ));

    usecases::invite_writer(&repo, &owner_ctx, &payload).await.unwrap();
    usecases::withdraw_invitation(&repo, &owner_ctx, invitee.id)
        .await
        .unwrap();
    assert!(matches!(
        usecases::withdraw_invitation(&repo, &owner_ctx, invitee.id).await,
        Err(Error::NotFound)
    ));
}

#[tokio::test]
async fn only_the_owner_manages_writers() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let writer = signup(&repo, "Writer", "w@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    usecases::invite_writer(
        &repo,
        &owner_ctx,
        &InviteWriterRequest {
            email: "w@example.com".to_string(),
        },
    )
    .await
    .unwrap();
    let writer_ctx = ctx_for(&repo, &writer, &slug).await;
    usecases::accept_invitation(&repo, &writer_ctx).await.unwrap();

    // A mere writer cannot invite or kick.
    let writer_ctx = ctx_for(&repo, &writer, &slug).await;
    assert!(matches!(
        usecases::invite_writer(
            &repo,
            &writer_ctx,
            &InviteWriterRequest {
                email: "o@example.com".to_string()
            }
        )
        .await,
        Err(Error::NotPermitted)
    ));
    assert!(matches!(
        usecases::kick_writer(&repo, &writer_ctx, owner.id).await,
        Err(Error::NotPermitted)
    ));

    // The owner cannot be kicked, not even by themselves.
    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    assert!(matches!(
        usecases::kick_writer(&repo, &owner_ctx, owner.id).await,
        Err(Error::NotPermitted)
    ));

    usecases::kick_writer(&repo, &owner_ctx, writer.id)
        .await
        .unwrap();
    assert!(!repo
        .is_writer(owner_ctx.publication().unwrap().id, writer.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn writers_can_leave_but_owners_cannot() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let writer = signup(&repo, "Writer", "w@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    usecases::invite_writer(
        &repo,
        &owner_ctx,
        &InviteWriterRequest {
            email: "w@example.com".to_string(),
        },
    )
    .await
    .unwrap();
    let writer_ctx = ctx_for(&repo, &writer, &slug).await;
    usecases::accept_invitation(&repo, &writer_ctx).await.unwrap();

    let writer_ctx = ctx_for(&repo, &writer, &slug).await;
    usecases::leave_publication(&repo, &writer_ctx).await.unwrap();
    // Already gone.
    assert!(matches!(
        usecases::leave_publication(&repo, &writer_ctx).await,
        Err(Error::NotFound)
    ));

    assert!(matches!(
        usecases::leave_publication(&repo, &owner_ctx).await,
        Err(Error::Validation(_))
    ));
}

// --- Subscriptions ---

#[tokio::test]
async fn subscription_edges_have_set_semantics() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let reader = signup(&repo, "Reader", "r@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;

    let reader_ctx = ctx_for(&repo, &reader, &slug).await;
    usecases::subscribe(&repo, &reader_ctx).await.unwrap();
    assert!(matches!(
        usecases::subscribe(&repo, &reader_ctx).await,
        Err(Error::DuplicateRecord)
    ));

    usecases::unsubscribe(&repo, &reader_ctx).await.unwrap();
    assert!(matches!(
        usecases::unsubscribe(&repo, &reader_ctx).await,
        Err(Error::NotFound)
    ));

    // The owner writes for the publication and cannot also subscribe.
    let owner_ctx = ctx_for(&repo, &owner, &slug).await;
    assert!(matches!(
        usecases::subscribe(&repo, &owner_ctx).await,
        Err(Error::Validation(_))
    ));
}

// --- Likes & feeds ---

#[tokio::test]
async fn likes_never_double_count() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let reader = signup(&repo, "Reader", "r@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;
    let publication = repo.get_publication_by_slug(&slug).await.unwrap();
    let article = repo
        .publish_article(publication.id, owner.id, "Hello", "body")
        .await
        .unwrap();

    repo.like_article(reader.id, article.id).await.unwrap();
    assert!(matches!(
        repo.like_article(reader.id, article.id).await,
        Err(Error::DuplicateRecord)
    ));
    assert_eq!(repo.article_like_count(article.id).await.unwrap(), 1);

    repo.unlike_article(reader.id, article.id).await.unwrap();
    assert!(matches!(
        repo.unlike_article(reader.id, article.id).await,
        Err(Error::NotFound)
    ));
    assert_eq!(repo.article_like_count(article.id).await.unwrap(), 0);
}

#[tokio::test]
async fn feed_ranks_by_like_count_with_id_tiebreak() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let fan_a = signup(&repo, "Fan A", "a@example.com").await;
    let fan_b = signup(&repo, "Fan B", "b@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;
    let publication = repo.get_publication_by_slug(&slug).await.unwrap();

    let first = repo
        .publish_article(publication.id, owner.id, "First", "body")
        .await
        .unwrap();
    let second = repo
        .publish_article(publication.id, owner.id, "Second", "body")
        .await
        .unwrap();
    let third = repo
        .publish_article(publication.id, owner.id, "Third", "body")
        .await
        .unwrap();

    repo.like_article(fan_a.id, first.id).await.unwrap();
    repo.like_article(fan_b.id, first.id).await.unwrap();
    repo.like_article(fan_a.id, third.id).await.unwrap();

    let (articles, metadata) = repo.recent_articles(Filters::new(1, 20)).await.unwrap();
    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    // Two likes first, then one, then the newer of the unliked... second has
    // zero likes and loses to third's one like.
    assert_eq!(ids, vec![first.id, third.id, second.id]);
    assert_eq!(metadata.total_records, 3);
}

#[tokio::test]
async fn subscribed_feed_only_shows_subscribed_publications() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let reader = signup(&repo, "Reader", "r@example.com").await;
    let ink_slug = create_publication(&repo, &owner, "Daily Ink").await;
    create_publication(&repo, &owner, "Other Zine").await;
    let ink = repo.get_publication_by_slug(&ink_slug).await.unwrap();
    let other = repo.get_publication_by_slug("other-zine").await.unwrap();

    repo.publish_article(ink.id, owner.id, "In Feed", "body")
        .await
        .unwrap();
    repo.publish_article(other.id, owner.id, "Not In Feed", "body")
        .await
        .unwrap();
    repo.subscribe(reader.id, ink.id).await.unwrap();

    let (articles, metadata) = repo
        .subscribed_articles(reader.id, Filters::new(1, 20))
        .await
        .unwrap();
    assert_eq!(metadata.total_records, 1);
    assert_eq!(articles[0].title, "In Feed");
}

#[tokio::test]
async fn feed_pages_past_the_first_return_the_remainder() {
    let repo = repo();
    let owner = signup(&repo, "Owner", "o@example.com").await;
    let slug = create_publication(&repo, &owner, "Daily Ink").await;
    let publication = repo.get_publication_by_slug(&slug).await.unwrap();

    for title in ["One", "Two", "Three", "Four", "Five"] {
        repo.publish_article(publication.id, owner.id, title, "body")
            .await
            .unwrap();
    }

    let (page_one, _) = repo.recent_articles(Filters::new(1, 3)).await.unwrap();
    assert_eq!(page_one.len(), 3);

    // Five rows at three per page leaves two on the second page.
    let (page_two, metadata) = repo.recent_articles(Filters::new(2, 3)).await.unwrap();
    assert_eq!(page_two.len(), 2);
    assert_eq!(metadata.current_page, 2);
    assert_eq!(metadata.last_page, 2);
    assert_eq!(metadata.total_records, 5);

    let first_ids: Vec<i64> = page_one.iter().map(|a| a.id).collect();
    assert!(page_two.iter().all(|a| !first_ids.contains(&a.id)));
}

// --- Pagination ---

#[test]
fn pagination_metadata_rounds_up_last_page() {
    let metadata = Metadata::calculate(45, 2, 20);
    assert_eq!(metadata.current_page, 2);
    assert_eq!(metadata.first_page, 1);
    assert_eq!(metadata.last_page, 3);
    assert_eq!(metadata.total_records, 45);

    assert_eq!(Metadata::calculate(0, 1, 20), Metadata::default());

    // A zero page size built by hand falls back to one row per page.
    assert_eq!(Metadata::calculate(5, 1, 0).last_page, 5);
}

#[test]
fn filters_clamp_out_of_range_values() {
    let filters = Filters::new(0, 1000);
    assert_eq!(filters.page, 1);
    assert_eq!(filters.page_size, 100);
    assert_eq!(filters.offset(), 0);

    let filters = Filters::new(3, 10);
    assert_eq!(filters.offset(), 20);
    assert_eq!(filters.limit(), 10);
}
