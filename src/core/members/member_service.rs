// Member roster - the minimal user records the moderation workflow needs.
//
// Authentication happens outside this crate. By the time a request reaches
// the core we only need to know *who* is acting and which capabilities they
// carry (staff, moderator, trusted). That is what `Actor` captures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered board member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_moderator: bool,
    /// Trusted members skip the second review gate on clean posts.
    pub is_trusted: bool,
    pub date_joined: DateTime<Utc>,
}

impl Member {
    /// The capability view used for authorization checks.
    pub fn actor(&self) -> Actor {
        Actor {
            member_id: self.id,
            is_staff: self.is_staff,
            is_moderator: self.is_moderator,
            is_trusted: self.is_trusted,
        }
    }
}

/// Data needed to create (or update) a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_moderator: bool,
    pub is_trusted: bool,
}

/// Whoever is performing an operation, reduced to the capabilities we check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub member_id: MemberId,
    pub is_staff: bool,
    pub is_moderator: bool,
    pub is_trusted: bool,
}

impl Actor {
    /// A plain member with no extra capabilities.
    #[cfg(test)]
    pub fn regular(member_id: i64) -> Self {
        Self {
            member_id: MemberId(member_id),
            is_staff: false,
            is_moderator: false,
            is_trusted: false,
        }
    }

    #[cfg(test)]
    pub fn moderator(member_id: i64) -> Self {
        Self {
            is_moderator: true,
            ..Self::regular(member_id)
        }
    }

    #[cfg(test)]
    pub fn trusted(member_id: i64) -> Self {
        Self {
            is_trusted: true,
            ..Self::regular(member_id)
        }
    }

    /// Approve, reject and the moderation queue need this.
    pub fn can_moderate(&self) -> bool {
        self.is_staff || self.is_moderator
    }

    /// Whether a clean post from this actor counts as already reviewed.
    pub fn bypasses_review(&self) -> bool {
        self.can_moderate() || self.is_trusted
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum MemberError {
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Invalid member: {0}")]
    InvalidMember(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Insert a member, or update the roles and email of an existing username.
    async fn save_member(&self, member: NewMember) -> Result<Member, MemberError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, MemberError>;

    async fn get_member(&self, id: MemberId) -> Result<Option<Member>, MemberError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct MemberDirectory<S: MemberStore> {
    store: S,
}

impl<S: MemberStore> MemberDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and persist a member record.
    ///
    /// Usernames and emails are required; the email is lowercased the way the
    /// board normalizes addresses on sign-up.
    pub async fn register(&self, member: NewMember) -> Result<Member, MemberError> {
        let username = member.username.trim();
        if username.is_empty() {
            return Err(MemberError::InvalidMember(
                "Members must have a username".to_string(),
            ));
        }

        let email = member.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(MemberError::InvalidMember(format!(
                "Members must have a valid email address (got {:?})",
                member.email
            )));
        }

        let saved = self
            .store
            .save_member(NewMember {
                username: username.to_string(),
                email,
                ..member
            })
            .await?;

        tracing::info!(
            member_id = saved.id.0,
            username = %saved.username,
            is_staff = saved.is_staff,
            is_moderator = saved.is_moderator,
            is_trusted = saved.is_trusted,
            "Member saved"
        );
        Ok(saved)
    }

    /// Look a member up by username and return their capabilities.
    pub async fn resolve_actor(&self, username: &str) -> Result<Actor, MemberError> {
        self.store
            .find_by_username(username.trim())
            .await?
            .map(|member| member.actor())
            .ok_or_else(|| MemberError::UnknownMember(username.to_string()))
    }

    pub async fn get_member(&self, id: MemberId) -> Result<Member, MemberError> {
        self.store
            .get_member(id)
            .await?
            .ok_or_else(|| MemberError::UnknownMember(id.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// In-memory store for testing
    struct MockMemberStore {
        members: DashMap<String, Member>,
        next_id: AtomicI64,
    }

    impl MockMemberStore {
        fn new() -> Self {
            Self {
                members: DashMap::new(),
                next_id: AtomicI64::new(1),
            }
        }
    }

    #[async_trait]
    impl MemberStore for MockMemberStore {
        async fn save_member(&self, member: NewMember) -> Result<Member, MemberError> {
            let id = self
                .members
                .get(&member.username)
                .map(|m| m.id)
                .unwrap_or_else(|| MemberId(self.next_id.fetch_add(1, Ordering::SeqCst)));
            let saved = Member {
                id,
                username: member.username.clone(),
                email: member.email,
                is_staff: member.is_staff,
                is_moderator: member.is_moderator,
                is_trusted: member.is_trusted,
                date_joined: Utc::now(),
            };
            self.members.insert(member.username, saved.clone());
            Ok(saved)
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Member>, MemberError> {
            Ok(self.members.get(username).map(|m| m.clone()))
        }

        async fn get_member(&self, id: MemberId) -> Result<Option<Member>, MemberError> {
            Ok(self
                .members
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.clone()))
        }
    }

    fn new_member(username: &str, email: &str) -> NewMember {
        NewMember {
            username: username.to_string(),
            email: email.to_string(),
            is_staff: false,
            is_moderator: false,
            is_trusted: false,
        }
    }

    #[test]
    fn test_actor_capabilities() {
        assert!(!Actor::regular(1).can_moderate());
        assert!(!Actor::regular(1).bypasses_review());

        assert!(Actor::moderator(1).can_moderate());
        assert!(Actor::moderator(1).bypasses_review());

        assert!(!Actor::trusted(1).can_moderate());
        assert!(Actor::trusted(1).bypasses_review());

        let staff = Actor {
            is_staff: true,
            ..Actor::regular(1)
        };
        assert!(staff.can_moderate());
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let directory = MemberDirectory::new(MockMemberStore::new());

        let saved = directory
            .register(NewMember {
                is_moderator: true,
                ..new_member("  mod  ", "Mod@Example.com")
            })
            .await
            .unwrap();
        assert_eq!(saved.username, "mod");
        assert_eq!(saved.email, "mod@example.com");

        let actor = directory.resolve_actor("mod").await.unwrap();
        assert_eq!(actor.member_id, saved.id);
        assert!(actor.can_moderate());

        let fetched = directory.get_member(saved.id).await.unwrap();
        assert_eq!(fetched.username, "mod");
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let directory = MemberDirectory::new(MockMemberStore::new());

        let result = directory.register(new_member("   ", "a@b.c")).await;
        assert!(matches!(result, Err(MemberError::InvalidMember(_))));

        let result = directory.register(new_member("alice", "not-an-email")).await;
        assert!(matches!(result, Err(MemberError::InvalidMember(_))));
    }

    #[tokio::test]
    async fn test_unknown_member() {
        let directory = MemberDirectory::new(MockMemberStore::new());
        let result = directory.resolve_actor("ghost").await;
        assert!(matches!(result, Err(MemberError::UnknownMember(name)) if name == "ghost"));
    }
}
