// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "members/member_service.rs"]
pub mod members;

#[path = "moderation/mod.rs"]
pub mod moderation;
