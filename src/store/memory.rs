use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

use super::{
    ForumStore, PostStore, ServiceStore, StoreResult, ThreadStore, UserStore, Violation,
};
use crate::models::{
    CreateForumRequest, CreatePostRequest, CreateThreadRequest, Forum, Post, Status, Thread,
    ThreadUpdate, User, UserProfile, Vote,
};
use crate::paging::{PostPage, ThreadPage, UserPage};
use crate::tree;

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    forums: HashMap<String, Forum>,
    threads: BTreeMap<i32, Thread>,
    posts: BTreeMap<i64, Post>,
    /// (nickname, thread id) -> voice
    votes: HashMap<(String, i32), i32>,
    forum_users: HashMap<String, BTreeSet<String>>,
    last_thread_id: i32,
    last_post_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.nickname.as_str()) != except)
    }

    fn thread_slug_taken(&self, slug: &str) -> bool {
        self.threads
            .values()
            .any(|t| t.slug.as_deref() == Some(slug))
    }

    fn add_forum_user(&mut self, forum: &str, nickname: &str) {
        self.forum_users
            .entry(forum.to_string())
            .or_default()
            .insert(nickname.to_string());
    }
}

/// In-process store with the same constraint semantics as the Postgres schema.
/// Ids keep increasing across [`ServiceStore::clear`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.nickname) || tables.email_taken(&user.email, None) {
            return Err(Violation::UniqueConflict.into());
        }
        tables.users.insert(user.nickname.clone(), user.clone());
        Ok(user.clone())
    }

    async fn user_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(nickname).cloned())
    }

    async fn users_by_nickname_or_email(
        &self,
        nickname: &str,
        email: &str,
    ) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.nickname == nickname || u.email == email)
            .cloned()
            .collect())
    }

    async fn update_user(
        &self,
        nickname: &str,
        profile: &UserProfile,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(nickname) {
            return Ok(None);
        }
        if !profile.email.is_empty() && tables.email_taken(&profile.email, Some(nickname)) {
            return Err(Violation::UniqueConflict.into());
        }

        let Some(user) = tables.users.get_mut(nickname) else {
            return Ok(None);
        };
        if !profile.fullname.is_empty() {
            user.fullname = profile.fullname.clone();
        }
        if !profile.about.is_empty() {
            user.about = profile.about.clone();
        }
        if !profile.email.is_empty() {
            user.email = profile.email.clone();
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn insert_forum(&self, forum: &CreateForumRequest) -> StoreResult<Forum> {
        let mut tables = self.tables.write().await;
        // Unique keys are checked before references, as in Postgres
        if tables.forums.contains_key(&forum.slug) {
            return Err(Violation::UniqueConflict.into());
        }
        let Some(owner) = tables.users.get(&forum.user) else {
            return Err(Violation::MissingReference.into());
        };

        let created = Forum {
            title: forum.title.clone(),
            user: owner.nickname.clone(),
            slug: forum.slug.clone(),
            posts: 0,
            threads: 0,
        };
        tables.forums.insert(created.slug.clone(), created.clone());
        Ok(created)
    }

    async fn forum_by_slug(&self, slug: &str) -> StoreResult<Option<Forum>> {
        Ok(self.tables.read().await.forums.get(slug).cloned())
    }

    async fn forum_users(&self, slug: &str, page: &UserPage) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let Some(members) = tables.forum_users.get(slug) else {
            return Ok(Vec::new());
        };

        let limit = usize::try_from(page.limit).unwrap_or(0);
        let beyond = |nickname: &String| match &page.since {
            Some(since) => page.direction.apply(nickname.as_str().cmp(since.as_str())) == Ordering::Greater,
            None => true,
        };
        let nicknames: Vec<&String> = if page.direction.is_desc() {
            members.iter().rev().filter(|n| beyond(*n)).take(limit).collect()
        } else {
            members.iter().filter(|n| beyond(*n)).take(limit).collect()
        };

        Ok(nicknames
            .into_iter()
            .filter_map(|n| tables.users.get(n).cloned())
            .collect())
    }

    async fn forum_threads(&self, slug: &str, page: &ThreadPage) -> StoreResult<Vec<Thread>> {
        let tables = self.tables.read().await;
        let mut threads: Vec<Thread> = tables
            .threads
            .values()
            .filter(|t| t.forum == slug)
            .filter(|t| match page.since {
                Some(since) => page.direction.apply(t.created.cmp(&since)) != Ordering::Less,
                None => true,
            })
            .cloned()
            .collect();
        threads.sort_by(|a, b| {
            page.direction
                .apply(a.created.cmp(&b.created).then(a.id.cmp(&b.id)))
        });
        threads.truncate(usize::try_from(page.limit).unwrap_or(0));
        Ok(threads)
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn insert_thread(
        &self,
        forum: &Forum,
        thread: &CreateThreadRequest,
    ) -> StoreResult<Thread> {
        let mut tables = self.tables.write().await;
        if let Some(slug) = thread.slug() {
            if tables.thread_slug_taken(slug) {
                return Err(Violation::UniqueConflict.into());
            }
        }
        if !tables.users.contains_key(&thread.author) || !tables.forums.contains_key(&forum.slug) {
            return Err(Violation::MissingReference.into());
        }

        tables.last_thread_id += 1;
        let created = Thread {
            id: tables.last_thread_id,
            title: thread.title.clone(),
            author: thread.author.clone(),
            forum: forum.slug.clone(),
            message: thread.message.clone(),
            votes: 0,
            slug: thread.slug().map(str::to_string),
            created: thread.created.unwrap_or_else(Utc::now),
        };
        tables.threads.insert(created.id, created.clone());
        if let Some(f) = tables.forums.get_mut(&forum.slug) {
            f.threads += 1;
        }
        tables.add_forum_user(&forum.slug, &thread.author);
        Ok(created)
    }

    async fn thread_by_id(&self, id: i32) -> StoreResult<Option<Thread>> {
        Ok(self.tables.read().await.threads.get(&id).cloned())
    }

    async fn thread_by_slug(&self, slug: &str) -> StoreResult<Option<Thread>> {
        let tables = self.tables.read().await;
        Ok(tables
            .threads
            .values()
            .find(|t| t.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn update_thread(&self, id: i32, update: &ThreadUpdate) -> StoreResult<Option<Thread>> {
        let mut tables = self.tables.write().await;
        if (!update.author.is_empty() && !tables.users.contains_key(&update.author))
            || (!update.forum.is_empty() && !tables.forums.contains_key(&update.forum))
        {
            if !tables.threads.contains_key(&id) {
                return Ok(None);
            }
            return Err(Violation::MissingReference.into());
        }

        let Some(thread) = tables.threads.get_mut(&id) else {
            return Ok(None);
        };
        if !update.title.is_empty() {
            thread.title = update.title.clone();
        }
        if !update.author.is_empty() {
            thread.author = update.author.clone();
        }
        if !update.forum.is_empty() {
            thread.forum = update.forum.clone();
        }
        if !update.message.is_empty() {
            thread.message = update.message.clone();
        }
        Ok(Some(thread.clone()))
    }

    async fn insert_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&vote.nickname) || !tables.threads.contains_key(&thread_id) {
            return Err(Violation::MissingReference.into());
        }
        let key = (vote.nickname.clone(), thread_id);
        if tables.votes.contains_key(&key) {
            return Err(Violation::UniqueConflict.into());
        }
        tables.votes.insert(key, vote.voice);
        if let Some(thread) = tables.threads.get_mut(&thread_id) {
            thread.votes += vote.voice;
        }
        Ok(())
    }

    async fn update_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let key = (vote.nickname.clone(), thread_id);
        let Some(previous) = tables.votes.get_mut(&key) else {
            return Ok(false);
        };
        let delta = vote.voice - *previous;
        *previous = vote.voice;
        if let Some(thread) = tables.threads.get_mut(&thread_id) {
            thread.votes += delta;
        }
        Ok(true)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_posts(
        &self,
        thread: &Thread,
        posts: &[CreatePostRequest],
    ) -> StoreResult<Vec<Post>> {
        let mut tables = self.tables.write().await;
        if !tables.threads.contains_key(&thread.id) || !tables.forums.contains_key(&thread.forum) {
            return Err(Violation::MissingReference.into());
        }

        // Stage the whole batch so a rejected row leaves nothing behind
        let created = Utc::now();
        let mut next_id = tables.last_post_id;
        let mut staged: Vec<Post> = Vec::with_capacity(posts.len());
        for request in posts {
            let parent_path = if request.parent == 0 {
                None
            } else {
                let parent = tables
                    .posts
                    .get(&request.parent)
                    .or_else(|| staged.iter().find(|p| p.id == request.parent));
                match parent {
                    Some(p) if p.thread == thread.id => Some(p.path.clone()),
                    _ => return Err(Violation::InvalidParent.into()),
                }
            };

            next_id += 1;
            staged.push(Post {
                id: next_id,
                parent: request.parent,
                author: request.author.clone(),
                message: request.message.clone(),
                is_edited: false,
                forum: thread.forum.clone(),
                thread: thread.id,
                created,
                path: tree::child_path(parent_path.as_deref(), next_id),
            });
        }

        // Parents are checked row by row, authors once the batch is staged
        if staged.iter().any(|p| !tables.users.contains_key(&p.author)) {
            return Err(Violation::MissingReference.into());
        }

        tables.last_post_id = next_id;
        for post in &staged {
            tables.posts.insert(post.id, post.clone());
            tables.add_forum_user(&post.forum, &post.author);
        }
        if let Some(forum) = tables.forums.get_mut(&thread.forum) {
            forum.posts += staged.len() as i64;
        }
        Ok(staged)
    }

    async fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn thread_posts(&self, thread_id: i32, page: &PostPage) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let anchor = page.since.and_then(|id| tables.posts.get(&id).cloned());
        let posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.thread == thread_id)
            .cloned()
            .collect();
        Ok(tree::select_page(posts, page, anchor.as_ref()))
    }

    async fn update_post_message(&self, id: i64, message: &str) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        if post.message != message {
            post.message = message.to_string();
            post.is_edited = true;
        }
        Ok(Some(post.clone()))
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn status(&self) -> StoreResult<Status> {
        let tables = self.tables.read().await;
        Ok(Status {
            user: tables.users.len() as i64,
            forum: tables.forums.len() as i64,
            thread: tables.threads.len() as i64,
            post: tables.posts.len() as i64,
        })
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.forums.clear();
        tables.threads.clear();
        tables.posts.clear();
        tables.votes.clear();
        tables.forum_users.clear();
        Ok(())
    }
}
