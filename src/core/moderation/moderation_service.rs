// Moderation service - core business logic for the post review workflow.
//
// This service handles:
// - Submission (banned-word scan, trust bypass, moderator notification)
// - Approve / reject by moderators
// - Manual flagging by any member
// - Author edits (filtered again) and self-deletion
// - The moderation queue and the public board listings
//
// NO storage or delivery details here - just pure domain logic.

use super::banned_words::BannedWords;
use super::moderation_models::{
    transition, FlagNotice, ModerationEvent, ModerationFlags, NewPost, Page, PageWindow, Post,
    PostEdit, PostFilter, PostId, BOARD_PAGE_SIZE, MAX_TITLE_LEN, QUEUE_PAGE_SIZE,
};
use crate::core::members::Actor;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Permission denied: {action} requires moderator access")]
    PermissionDenied { action: &'static str },

    #[error("Post {0} not found")]
    NotFound(PostId),

    #[error("Invalid post: {0}")]
    InvalidPost(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Notifier configuration error: {0}")]
    ConfigError(String),
}

// ============================================================================
// PORTS
// ============================================================================

/// Trait for persisting posts.
///
/// Every method is a single write or read, so a transition is either fully
/// stored or not stored at all.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a new post and return it with its assigned id.
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError>;

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, ModerationError>;

    /// Write both moderation booleans at once. Returns `None` if the post is gone.
    async fn set_flags(
        &self,
        id: PostId,
        flags: ModerationFlags,
    ) -> Result<Option<Post>, ModerationError>;

    /// Replace title, content and flags in one write. Returns `None` if the
    /// post is gone.
    async fn update_post(
        &self,
        id: PostId,
        edit: PostEdit,
    ) -> Result<Option<Post>, ModerationError>;

    /// Remove a post. Returns whether a row was deleted.
    async fn delete_post(&self, id: PostId) -> Result<bool, ModerationError>;

    /// Posts matching `filter`, newest first.
    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, ModerationError>;

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, ModerationError>;
}

/// Tells moderators that a post needs review.
///
/// Fire-and-forget from the workflow's point of view: a failure is logged and
/// never undoes the transition that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &FlagNotice) -> Result<(), NotifyError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationService<S: PostStore, N: Notifier> {
    store: S,
    notifier: N,
    banned_words: Arc<BannedWords>,
}

impl<S: PostStore, N: Notifier> ModerationService<S, N> {
    pub fn new(store: S, notifier: N, banned_words: Arc<BannedWords>) -> Self {
        Self {
            store,
            notifier,
            banned_words,
        }
    }

    /// Submit a new post.
    ///
    /// Content containing a banned word is stored flagged and moderators are
    /// notified with the matched word as the reason. Clean content is visible
    /// right away; posts from moderators and trusted members are additionally
    /// marked as reviewed.
    pub async fn submit(
        &self,
        author: &Actor,
        title: &str,
        content: &str,
    ) -> Result<Post, ModerationError> {
        let (title, content) = validate_draft(title, content)?;

        let banned_word = self
            .banned_words
            .find_banned_word(content)
            .map(str::to_string);

        let flags = transition(
            Default::default(),
            &ModerationEvent::Submitted {
                banned_word: banned_word.clone(),
                trusted: author.bypasses_review(),
            },
        );

        let post = self
            .store
            .insert_post(NewPost {
                author: Some(author.member_id),
                title: title.to_string(),
                content: content.to_string(),
                flags,
                created_at: Utc::now(),
            })
            .await?;

        match banned_word {
            Some(word) => {
                tracing::info!(
                    post_id = post.id.0,
                    author_id = author.member_id.0,
                    banned_word = %word,
                    "Post flagged for review"
                );
                self.notify_moderators(&post, Some(word)).await;
            }
            None => {
                tracing::info!(
                    post_id = post.id.0,
                    author_id = author.member_id.0,
                    is_moderated = post.is_moderated,
                    "Post published"
                );
            }
        }

        Ok(post)
    }

    /// Clear a post for display. Moderators only.
    pub async fn approve(&self, post_id: PostId, actor: &Actor) -> Result<Post, ModerationError> {
        Self::require_moderator(actor, "approve")?;

        let post = self.get_post(post_id).await?;
        let next = transition(post.flags(), &ModerationEvent::Approved);
        if next == post.flags() {
            return Ok(post);
        }

        let post = self
            .store
            .set_flags(post_id, next)
            .await?
            .ok_or(ModerationError::NotFound(post_id))?;

        tracing::info!(
            post_id = post_id.0,
            moderator_id = actor.member_id.0,
            "Post approved"
        );
        Ok(post)
    }

    /// Delete a post permanently. Moderators only.
    pub async fn reject(&self, post_id: PostId, actor: &Actor) -> Result<(), ModerationError> {
        Self::require_moderator(actor, "reject")?;

        if !self.store.delete_post(post_id).await? {
            return Err(ModerationError::NotFound(post_id));
        }

        tracing::info!(
            post_id = post_id.0,
            moderator_id = actor.member_id.0,
            "Post rejected and deleted"
        );
        Ok(())
    }

    /// Report a post. Sends it back to the moderation queue without touching
    /// its review bit.
    pub async fn flag(&self, post_id: PostId, actor: &Actor) -> Result<Post, ModerationError> {
        let post = self.get_post(post_id).await?;
        let next = transition(post.flags(), &ModerationEvent::ManuallyFlagged);
        if next == post.flags() {
            return Ok(post);
        }

        let post = self
            .store
            .set_flags(post_id, next)
            .await?
            .ok_or(ModerationError::NotFound(post_id))?;

        tracing::info!(
            post_id = post_id.0,
            reporter_id = actor.member_id.0,
            "Post flagged for review by member"
        );
        Ok(post)
    }

    /// Let an author change their own post. Other members see `NotFound`.
    ///
    /// The new content is filtered again. A match sends the post back to the
    /// queue as unreviewed and notifies moderators; a clean edit keeps the
    /// current flags.
    pub async fn edit_own(
        &self,
        post_id: PostId,
        actor: &Actor,
        title: &str,
        content: &str,
    ) -> Result<Post, ModerationError> {
        let (title, content) = validate_draft(title, content)?;

        let post = self.get_post(post_id).await?;
        if post.author != Some(actor.member_id) {
            return Err(ModerationError::NotFound(post_id));
        }

        let banned_word = self
            .banned_words
            .find_banned_word(content)
            .map(str::to_string);
        let flags = transition(
            post.flags(),
            &ModerationEvent::Edited {
                banned_word: banned_word.clone(),
            },
        );

        let post = self
            .store
            .update_post(
                post_id,
                PostEdit {
                    title: title.to_string(),
                    content: content.to_string(),
                    flags,
                },
            )
            .await?
            .ok_or(ModerationError::NotFound(post_id))?;

        match banned_word {
            Some(word) => {
                tracing::info!(
                    post_id = post_id.0,
                    author_id = actor.member_id.0,
                    banned_word = %word,
                    "Edited post flagged for review"
                );
                self.notify_moderators(&post, Some(word)).await;
            }
            None => {
                tracing::info!(
                    post_id = post_id.0,
                    author_id = actor.member_id.0,
                    "Post edited by author"
                );
            }
        }

        Ok(post)
    }

    /// Let an author delete their own post. Other members see `NotFound`.
    pub async fn delete_own(&self, post_id: PostId, actor: &Actor) -> Result<(), ModerationError> {
        let post = self.get_post(post_id).await?;
        if post.author != Some(actor.member_id) {
            return Err(ModerationError::NotFound(post_id));
        }

        if !self.store.delete_post(post_id).await? {
            return Err(ModerationError::NotFound(post_id));
        }

        tracing::info!(
            post_id = post_id.0,
            author_id = actor.member_id.0,
            "Post deleted by author"
        );
        Ok(())
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<Post, ModerationError> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or(ModerationError::NotFound(post_id))
    }

    /// Flagged posts awaiting review, newest first. Moderators only.
    pub async fn moderation_queue(
        &self,
        actor: &Actor,
        page: u64,
    ) -> Result<Page<Post>, ModerationError> {
        Self::require_moderator(actor, "view the moderation queue")?;
        self.list_page(PostFilter::Pending, page, QUEUE_PAGE_SIZE)
            .await
    }

    /// Unflagged posts, newest first.
    pub async fn public_board(&self, page: u64) -> Result<Page<Post>, ModerationError> {
        self.list_page(PostFilter::Visible, page, BOARD_PAGE_SIZE)
            .await
    }

    async fn list_page(
        &self,
        filter: PostFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, ModerationError> {
        let total_items = self.store.count_posts(filter).await?;
        let window = PageWindow::locate(page, total_items, per_page);
        let items = self
            .store
            .list_posts(filter, window.offset, window.limit)
            .await?;

        Ok(Page {
            items,
            number: window.number,
            total_pages: window.total_pages,
            total_items,
        })
    }

    fn require_moderator(actor: &Actor, action: &'static str) -> Result<(), ModerationError> {
        if actor.can_moderate() {
            Ok(())
        } else {
            tracing::warn!(
                member_id = actor.member_id.0,
                action,
                "Moderation action refused"
            );
            Err(ModerationError::PermissionDenied { action })
        }
    }

    /// Delivery problems are logged and swallowed.
    async fn notify_moderators(&self, post: &Post, reason: Option<String>) {
        let notice = FlagNotice::for_post(post, reason);
        match self.notifier.notify(&notice).await {
            Ok(()) => tracing::info!(post_id = post.id.0, "Moderators notified"),
            Err(e) => tracing::error!(
                post_id = post.id.0,
                error = %e,
                "Failed to notify moderators"
            ),
        }
    }
}

/// Trim a title and body and check them. Returns the trimmed pair.
fn validate_draft<'a>(
    title: &'a str,
    content: &'a str,
) -> Result<(&'a str, &'a str), ModerationError> {
    let title = title.trim();
    let content = content.trim();

    if title.is_empty() {
        return Err(ModerationError::InvalidPost(
            "Title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ModerationError::InvalidPost(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    if content.is_empty() {
        return Err(ModerationError::InvalidPost(
            "Content must not be empty".to_string(),
        ));
    }

    Ok((title, content))
}

// ============================================================================
// TESTS
// ============================================================================
