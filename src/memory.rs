//! In-memory `Repository` implementation.
//!
//! Backs the test suite and local demos without a Postgres instance.
//! Implements every repository contract faithfully: unique constraints,
//! version-guarded updates, transactional invitation acceptance and the
//! scored feed ordering, so tests written against this store describe the
//! production semantics.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Error;
use crate::models::{Article, Comment, Filters, Metadata, Publication, User, UserPublications};
use crate::repository::Repository;

#[derive(Default)]
struct Store {
    users: HashMap<i64, User>,
    password_hashes: HashMap<i64, String>,
    publications: HashMap<i64, Publication>,
    articles: HashMap<i64, Article>,
    comments: HashMap<i64, Comment>,
    // Relationship edges, each keyed (user_id, entity_id). Existence is the
    // entire payload.
    writes_on: HashSet<(i64, i64)>,
    subscribes_to: HashSet<(i64, i64)>,
    invitations: HashSet<(i64, i64)>,
    article_likes: HashSet<(i64, i64)>,
    comment_likes: HashSet<(i64, i64)>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    store: Mutex<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts articles by like score descending, tie-broken by id descending,
/// and applies pagination with the total computed over the full set, the
/// in-memory analogue of `count(*) OVER()`.
fn paginate_scored(
    mut scored: Vec<(i64, Article)>,
    filters: Filters,
) -> (Vec<Article>, Metadata) {
    scored.sort_by(|(likes_a, a), (likes_b, b)| likes_b.cmp(likes_a).then(b.id.cmp(&a.id)));

    let total = scored.len() as i64;
    let articles = scored
        .into_iter()
        .skip(filters.offset().max(0) as usize)
        .take(filters.limit() as usize)
        .map(|(_, a)| a)
        .collect();

    (
        articles,
        Metadata::calculate(total, filters.page, filters.page_size),
    )
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- Users ---

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if store.users.values().any(|u| u.email == email) {
            return Err(Error::DuplicateRecord);
        }
        let id = store.next_id();
        store.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                image_id: None,
                created_at: Utc::now(),
                version: 1,
            },
        );
        store.password_hashes.insert(id, password_hash.to_string());
        Ok(id)
    }

    async fn get_user(&self, id: i64) -> Result<User, Error> {
        let store = self.store.lock().expect("store poisoned");
        store.users.get(&id).cloned().ok_or(Error::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, Error> {
        let store = self.store.lock().expect("store poisoned");
        store
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn credentials(&self, email: &str) -> Result<(i64, String), Error> {
        let store = self.store.lock().expect("store poisoned");
        let user = store
            .users
            .values()
            .find(|u| u.email == email)
            .ok_or(Error::NotFound)?;
        let hash = store
            .password_hashes
            .get(&user.id)
            .cloned()
            .ok_or(Error::NotFound)?;
        Ok((user.id, hash))
    }

    async fn password_hash(&self, user_id: i64, version: i32) -> Result<String, Error> {
        let store = self.store.lock().expect("store poisoned");
        let user = store.users.get(&user_id).ok_or(Error::EditConflict)?;
        if user.version != version {
            return Err(Error::EditConflict);
        }
        store
            .password_hashes
            .get(&user_id)
            .cloned()
            .ok_or(Error::EditConflict)
    }

    async fn change_name(&self, user_id: i64, version: i32, name: &str) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let user = store.users.get_mut(&user_id).ok_or(Error::EditConflict)?;
        if user.version != version {
            return Err(Error::EditConflict);
        }
        user.name = name.to_string();
        user.version += 1;
        Ok(())
    }

    async fn change_password_hash(
        &self,
        user_id: i64,
        version: i32,
        password_hash: &str,
    ) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let user = store.users.get_mut(&user_id).ok_or(Error::EditConflict)?;
        if user.version != version {
            return Err(Error::EditConflict);
        }
        user.version += 1;
        store
            .password_hashes
            .insert(user_id, password_hash.to_string());
        Ok(())
    }

    async fn change_avatar(
        &self,
        user_id: i64,
        version: i32,
        image_id: i64,
    ) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let user = store.users.get_mut(&user_id).ok_or(Error::EditConflict)?;
        if user.version != version {
            return Err(Error::EditConflict);
        }
        user.image_id = Some(image_id);
        user.version += 1;
        Ok(())
    }

    // --- Publications ---

    async fn create_publication(
        &self,
        owner_id: i64,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<Publication, Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if store.publications.values().any(|p| p.slug == slug) {
            return Err(Error::DuplicateRecord);
        }
        let id = store.next_id();
        let publication = Publication {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            owner_id,
            created_at: Utc::now(),
            version: 1,
        };
        store.publications.insert(id, publication.clone());
        Ok(publication)
    }

    async fn get_publication_by_slug(&self, slug: &str) -> Result<Publication, Error> {
        let store = self.store.lock().expect("store poisoned");
        store
            .publications
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn delete_publication(&self, owner_id: i64, publication_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let owned = store
            .publications
            .get(&publication_id)
            .is_some_and(|p| p.owner_id == owner_id);
        if !owned {
            return Err(Error::NotFound);
        }
        store.publications.remove(&publication_id);
        store.writes_on.retain(|(_, p)| *p != publication_id);
        store.subscribes_to.retain(|(_, p)| *p != publication_id);
        store.invitations.retain(|(_, p)| *p != publication_id);
        Ok(())
    }

    async fn publications_of_user(&self, user_id: i64) -> Result<UserPublications, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut bucket = |pairs: &HashSet<(i64, i64)>| -> Vec<Publication> {
            let mut pubs: Vec<Publication> = pairs
                .iter()
                .filter(|(u, _)| *u == user_id)
                .filter_map(|(_, p)| store.publications.get(p).cloned())
                .collect();
            pubs.sort_by_key(|p| p.id);
            pubs
        };
        let writes_on = bucket(&store.writes_on);
        let subscribes_to = bucket(&store.subscribes_to);
        let mut owns: Vec<Publication> = store
            .publications
            .values()
            .filter(|p| p.owner_id == user_id)
            .cloned()
            .collect();
        owns.sort_by_key(|p| p.id);
        Ok(UserPublications {
            writes_on,
            subscribes_to,
            owns,
        })
    }

    async fn writers_of(&self, publication_id: i64) -> Result<Vec<User>, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut writers: Vec<User> = store
            .writes_on
            .iter()
            .filter(|(_, p)| *p == publication_id)
            .filter_map(|(u, _)| store.users.get(u).cloned())
            .collect();
        writers.sort_by_key(|u| u.id);
        Ok(writers)
    }

    async fn pending_invitees_of(&self, publication_id: i64) -> Result<Vec<User>, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut invitees: Vec<User> = store
            .invitations
            .iter()
            .filter(|(_, p)| *p == publication_id)
            .filter_map(|(u, _)| store.users.get(u).cloned())
            .collect();
        invitees.sort_by_key(|u| u.id);
        Ok(invitees)
    }

    async fn invitations_of_user(&self, user_id: i64) -> Result<Vec<Publication>, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut pubs: Vec<Publication> = store
            .invitations
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, p)| store.publications.get(p).cloned())
            .collect();
        pubs.sort_by_key(|p| p.id);
        Ok(pubs)
    }

    // --- Membership edges ---

    async fn is_writer(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store.writes_on.contains(&(user_id, publication_id)))
    }

    async fn is_subscribed(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store.subscribes_to.contains(&(user_id, publication_id)))
    }

    async fn has_invitation(&self, publication_id: i64, user_id: i64) -> Result<bool, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store.invitations.contains(&(user_id, publication_id)))
    }

    async fn invite(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.invitations.insert((user_id, publication_id)) {
            return Err(Error::DuplicateRecord);
        }
        Ok(())
    }

    async fn withdraw_invitation(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.invitations.remove(&(user_id, publication_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn accept_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        // One lock scope stands in for the transaction: both edges move or
        // neither does. The pending edge goes first, so a repeat accept is
        // NotFound; the writer edge acts as the uniqueness backstop, and
        // tripping it puts the invitation back the way a rollback would.
        let mut store = self.store.lock().expect("store poisoned");
        if !store.invitations.remove(&(user_id, publication_id)) {
            return Err(Error::NotFound);
        }
        if !store.writes_on.insert((user_id, publication_id)) {
            store.invitations.insert((user_id, publication_id));
            return Err(Error::DuplicateRecord);
        }
        Ok(())
    }

    async fn decline_invitation(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.invitations.remove(&(user_id, publication_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn remove_writer(&self, publication_id: i64, user_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.writes_on.remove(&(user_id, publication_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn subscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.subscribes_to.insert((user_id, publication_id)) {
            return Err(Error::DuplicateRecord);
        }
        Ok(())
    }

    async fn unsubscribe(&self, user_id: i64, publication_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.subscribes_to.remove(&(user_id, publication_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // --- Articles ---

    async fn publish_article(
        &self,
        publication_id: i64,
        writer_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Article, Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let id = store.next_id();
        let article = Article {
            id,
            title: title.to_string(),
            content: content.to_string(),
            publication_id,
            writer_id,
            created_at: Utc::now(),
            version: 1,
        };
        store.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn get_article(&self, id: i64) -> Result<Article, Error> {
        let store = self.store.lock().expect("store poisoned");
        store.articles.get(&id).cloned().ok_or(Error::NotFound)
    }

    async fn articles_of_publication(&self, publication_id: i64) -> Result<Vec<Article>, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut articles: Vec<Article> = store
            .articles
            .values()
            .filter(|a| a.publication_id == publication_id)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(articles)
    }

    async fn recent_articles(&self, filters: Filters) -> Result<(Vec<Article>, Metadata), Error> {
        let store = self.store.lock().expect("store poisoned");
        let cutoff = Utc::now() - chrono::Duration::weeks(1);
        let scored: Vec<(i64, Article)> = store
            .articles
            .values()
            .filter(|a| a.created_at > cutoff)
            .map(|a| {
                let likes = store
                    .article_likes
                    .iter()
                    .filter(|(_, art)| *art == a.id)
                    .count() as i64;
                (likes, a.clone())
            })
            .collect();
        Ok(paginate_scored(scored, filters))
    }

    async fn subscribed_articles(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<(Vec<Article>, Metadata), Error> {
        let store = self.store.lock().expect("store poisoned");
        let subscribed: HashSet<i64> = store
            .subscribes_to
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, p)| *p)
            .collect();
        let scored: Vec<(i64, Article)> = store
            .articles
            .values()
            .filter(|a| subscribed.contains(&a.publication_id))
            .map(|a| {
                let likes = store
                    .article_likes
                    .iter()
                    .filter(|(_, art)| *art == a.id)
                    .count() as i64;
                (likes, a.clone())
            })
            .collect();
        Ok(paginate_scored(scored, filters))
    }

    async fn like_article(&self, user_id: i64, article_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.article_likes.insert((user_id, article_id)) {
            return Err(Error::DuplicateRecord);
        }
        Ok(())
    }

    async fn unlike_article(&self, user_id: i64, article_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.article_likes.remove(&(user_id, article_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn article_like_count(&self, article_id: i64) -> Result<i64, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store
            .article_likes
            .iter()
            .filter(|(_, a)| *a == article_id)
            .count() as i64)
    }

    async fn user_has_liked_article(&self, user_id: i64, article_id: i64) -> Result<bool, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store.article_likes.contains(&(user_id, article_id)))
    }

    // --- Comments ---

    async fn add_comment(
        &self,
        article_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, Error> {
        let mut store = self.store.lock().expect("store poisoned");
        let id = store.next_id();
        let comment = Comment {
            id,
            article_id,
            commenter_id,
            content: content.to_string(),
            created_at: Utc::now(),
            version: 1,
        };
        store.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Comment, Error> {
        let store = self.store.lock().expect("store poisoned");
        store.comments.get(&id).cloned().ok_or(Error::NotFound)
    }

    async fn comments_of_article(&self, article_id: i64) -> Result<Vec<Comment>, Error> {
        let store = self.store.lock().expect("store poisoned");
        let mut scored: Vec<(i64, Comment)> = store
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .map(|c| {
                let likes = store
                    .comment_likes
                    .iter()
                    .filter(|(_, cid)| *cid == c.id)
                    .count() as i64;
                (likes, c.clone())
            })
            .collect();
        scored.sort_by(|(la, a), (lb, b)| lb.cmp(la).then(b.id.cmp(&a.id)));
        Ok(scored.into_iter().map(|(_, c)| c).collect())
    }

    async fn comment_count(&self, article_id: i64) -> Result<i64, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .count() as i64)
    }

    async fn like_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.comment_likes.insert((user_id, comment_id)) {
            return Err(Error::DuplicateRecord);
        }
        Ok(())
    }

    async fn unlike_comment(&self, user_id: i64, comment_id: i64) -> Result<(), Error> {
        let mut store = self.store.lock().expect("store poisoned");
        if !store.comment_likes.remove(&(user_id, comment_id)) {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn comment_like_count(&self, comment_id: i64) -> Result<i64, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store
            .comment_likes
            .iter()
            .filter(|(_, c)| *c == comment_id)
            .count() as i64)
    }

    async fn user_has_liked_comment(&self, user_id: i64, comment_id: i64) -> Result<bool, Error> {
        let store = self.store.lock().expect("store poisoned");
        Ok(store.comment_likes.contains(&(user_id, comment_id)))
    }
}
