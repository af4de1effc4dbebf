// Moderation domain models - posts, flag state, and the transition table.
//
// These are pure domain types with no storage or delivery dependencies.

use crate::core::members::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Posts per page on the public board.
pub const BOARD_PAGE_SIZE: u64 = 5;
/// Posts per page in the moderation queue.
pub const QUEUE_PAGE_SIZE: u64 = 10;
/// Longest title we accept, in characters.
pub const MAX_TITLE_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// `None` once the author has been removed.
    pub author: Option<MemberId>,
    pub title: String,
    pub content: String,
    pub is_flagged: bool,
    pub is_moderated: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn flags(&self) -> ModerationFlags {
        ModerationFlags {
            is_flagged: self.is_flagged,
            is_moderated: self.is_moderated,
        }
    }

    pub fn state(&self) -> ModerationState {
        self.flags().state()
    }

    /// Visibility is governed by the flag alone.
    pub fn is_visible(&self) -> bool {
        !self.is_flagged
    }
}

/// New text for an existing post, written together with its flags.
#[derive(Debug, Clone, PartialEq)]
pub struct PostEdit {
    pub title: String,
    pub content: String,
    pub flags: ModerationFlags,
}

/// A post that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub author: Option<MemberId>,
    pub title: String,
    pub content: String,
    pub flags: ModerationFlags,
    pub created_at: DateTime<Utc>,
}

/// The two moderation booleans, always written together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFlags {
    pub is_flagged: bool,
    pub is_moderated: bool,
}

impl ModerationFlags {
    pub fn state(&self) -> ModerationState {
        if self.is_flagged {
            ModerationState::Pending
        } else {
            ModerationState::Visible
        }
    }
}

/// Where a stored post sits in the workflow. Rejected posts are deleted, so
/// they have no state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationState {
    /// Shown on the public board.
    Visible,
    /// Hidden, waiting for a moderator.
    Pending,
}

impl fmt::Display for ModerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModerationState::Visible => write!(f, "Visible"),
            ModerationState::Pending => write!(f, "Pending"),
        }
    }
}

/// Something that happened to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationEvent {
    /// A new submission went through the banned-word filter.
    Submitted {
        banned_word: Option<String>,
        trusted: bool,
    },
    /// A moderator cleared the post.
    Approved,
    /// Someone reported the post.
    ManuallyFlagged,
    /// The author changed the text, which went through the filter again.
    Edited { banned_word: Option<String> },
}

/// Compute the flags that follow `event`.
///
/// Returns the whole pair so callers persist both fields in one write.
pub fn transition(current: ModerationFlags, event: &ModerationEvent) -> ModerationFlags {
    match event {
        ModerationEvent::Submitted {
            banned_word: Some(_),
            ..
        } => ModerationFlags {
            is_flagged: true,
            is_moderated: false,
        },
        ModerationEvent::Submitted {
            banned_word: None,
            trusted,
        } => ModerationFlags {
            is_flagged: false,
            is_moderated: *trusted,
        },
        ModerationEvent::Approved => ModerationFlags {
            is_flagged: false,
            is_moderated: true,
        },
        ModerationEvent::ManuallyFlagged => ModerationFlags {
            is_flagged: true,
            is_moderated: current.is_moderated,
        },
        ModerationEvent::Edited {
            banned_word: Some(_),
        } => ModerationFlags {
            is_flagged: true,
            is_moderated: false,
        },
        ModerationEvent::Edited { banned_word: None } => current,
    }
}

/// What moderators are told when a post gets flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagNotice {
    pub post_id: PostId,
    pub title: String,
    pub content: String,
    pub reason: Option<String>,
}

impl FlagNotice {
    pub fn for_post(post: &Post, reason: Option<String>) -> Self {
        Self {
            post_id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            reason,
        }
    }
}

/// Which posts a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Unflagged posts (the public board).
    Visible,
    /// Flagged posts (the moderation queue).
    Pending,
}

impl PostFilter {
    #[cfg(test)]
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::Visible => !post.is_flagged,
            PostFilter::Pending => post.is_flagged,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Where a requested page lands once clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub total_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Clamp `requested` into `1..=total_pages`. An empty listing still has
    /// one (empty) page.
    pub fn locate(requested: u64, total_items: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        let number = requested.clamp(1, total_pages);
        Self {
            number,
            total_pages,
            offset: (number - 1) * per_page,
            limit: per_page,
        }
    }
}
