// In-memory implementation of PostStore.
//
// Used by the service tests so the workflow can be exercised without a
// database. Same contract as the SQLite store: each call is one atomic
// operation on the map.

use crate::core::moderation::{
    ModerationError, ModerationFlags, NewPost, Post, PostEdit, PostFilter, PostId, PostStore,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryPostStore {
    posts: DashMap<PostId, Post>,
    next_id: AtomicI64,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// A store whose first post gets `first_id`.
    pub fn starting_at(first_id: i64) -> Self {
        Self {
            posts: DashMap::new(),
            next_id: AtomicI64::new(first_id),
        }
    }

    fn matching(&self, filter: PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first; ids break ties between posts created in the same instant
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError> {
        let id = PostId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let stored = Post {
            id,
            author: post.author,
            title: post.title,
            content: post.content,
            is_flagged: post.flags.is_flagged,
            is_moderated: post.flags.is_moderated,
            created_at: post.created_at,
        };
        self.posts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, ModerationError> {
        Ok(self.posts.get(&id).map(|entry| entry.clone()))
    }

    async fn set_flags(
        &self,
        id: PostId,
        flags: ModerationFlags,
    ) -> Result<Option<Post>, ModerationError> {
        // get_mut holds the shard lock, so both fields change together
        Ok(self.posts.get_mut(&id).map(|mut entry| {
            entry.is_flagged = flags.is_flagged;
            entry.is_moderated = flags.is_moderated;
            entry.clone()
        }))
    }

    async fn update_post(
        &self,
        id: PostId,
        edit: PostEdit,
    ) -> Result<Option<Post>, ModerationError> {
        Ok(self.posts.get_mut(&id).map(|mut entry| {
            entry.title = edit.title;
            entry.content = edit.content;
            entry.is_flagged = edit.flags.is_flagged;
            entry.is_moderated = edit.flags.is_moderated;
            entry.clone()
        }))
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, ModerationError> {
        Ok(self.posts.remove(&id).is_some())
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, ModerationError> {
        Ok(self
            .matching(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, ModerationError> {
        Ok(self
            .posts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn new_post(title: &str, is_flagged: bool, minutes_ago: i64) -> NewPost {
        NewPost {
            author: None,
            title: title.to_string(),
            content: "content".to_string(),
            flags: ModerationFlags {
                is_flagged,
                is_moderated: false,
            },
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryPostStore::starting_at(10);
        let a = store.insert_post(new_post("a", false, 0)).await.unwrap();
        let b = store.insert_post(new_post("b", false, 0)).await.unwrap();
        assert_eq!(a.id, PostId(10));
        assert_eq!(b.id, PostId(11));
    }

    #[tokio::test]
    async fn test_listing_filters_and_orders() {
        let store = InMemoryPostStore::new();
        store.insert_post(new_post("old", false, 30)).await.unwrap();
        store.insert_post(new_post("new", false, 1)).await.unwrap();
        store.insert_post(new_post("hidden", true, 5)).await.unwrap();

        let visible = store.list_posts(PostFilter::Visible, 0, 10).await.unwrap();
        let titles: Vec<&str> = visible.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);

        let pending = store.list_posts(PostFilter::Pending, 0, 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "hidden");

        assert_eq!(store.count_posts(PostFilter::Visible).await.unwrap(), 2);
        assert_eq!(store.count_posts(PostFilter::Pending).await.unwrap(), 1);

        let second = store.list_posts(PostFilter::Visible, 1, 10).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "old");
    }

    #[tokio::test]
    async fn test_set_flags_and_delete() {
        let store = InMemoryPostStore::new();
        let post = store.insert_post(new_post("p", true, 0)).await.unwrap();

        let updated = store
            .set_flags(
                post.id,
                ModerationFlags {
                    is_flagged: false,
                    is_moderated: true,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_flagged);
        assert!(updated.is_moderated);

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(!store.delete_post(post.id).await.unwrap());
        assert!(store
            .set_flags(post.id, ModerationFlags::default())
            .await
            .unwrap()
            .is_none());
    }
}
