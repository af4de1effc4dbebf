// Command handlers.
//
// **Notice the pattern:**
// 1. Resolve the acting member from the username
// 2. Call core service
// 3. Format the result as JSON
//
// This layer is THIN - no business logic, just translation.

use super::commands::BoardCommand;
use super::{Data, Error};
use crate::core::members::NewMember;
use crate::core::moderation::{Page, Post};
use anyhow::Context;
use serde_json::{json, Value};

/// Run one command and return what should be printed.
pub async fn run(data: &Data, command: BoardCommand) -> Result<Value, Error> {
    match command {
        BoardCommand::AddMember {
            username,
            email,
            is_staff,
            is_moderator,
            is_trusted,
        } => {
            let member = data
                .members
                .register(NewMember {
                    username,
                    email,
                    is_staff,
                    is_moderator,
                    is_trusted,
                })
                .await?;
            Ok(serde_json::to_value(member)?)
        }
        BoardCommand::Submit {
            username,
            title,
            content,
        } => {
            let author = data.members.resolve_actor(&username).await?;
            let post = data.moderation.submit(&author, &title, &content).await?;
            let message = if post.is_flagged {
                "Your post contains inappropriate content and has been flagged for moderation."
            } else {
                "Your post has been successfully published!"
            };
            Ok(post_with_message(&post, message))
        }
        BoardCommand::Edit {
            username,
            post_id,
            title,
            content,
        } => {
            let actor = data.members.resolve_actor(&username).await?;
            let post = data
                .moderation
                .edit_own(post_id, &actor, &title, &content)
                .await?;
            let message = if post.is_flagged {
                "Your post has been updated and is awaiting moderator review."
            } else {
                "Your post has been updated."
            };
            Ok(post_with_message(&post, message))
        }
        BoardCommand::Flag { username, post_id } => {
            let actor = data.members.resolve_actor(&username).await?;
            let post = data.moderation.flag(post_id, &actor).await?;
            Ok(post_with_message(&post, "The post has been flagged for review."))
        }
        BoardCommand::Approve { username, post_id } => {
            let actor = data.members.resolve_actor(&username).await?;
            let post = data.moderation.approve(post_id, &actor).await?;
            Ok(post_with_message(
                &post,
                "The post has been approved and is now visible.",
            ))
        }
        BoardCommand::Reject { username, post_id } => {
            let actor = data.members.resolve_actor(&username).await?;
            data.moderation.reject(post_id, &actor).await?;
            Ok(json!({
                "deleted": post_id,
                "message": "The post has been rejected and deleted.",
            }))
        }
        BoardCommand::Delete { username, post_id } => {
            let actor = data.members.resolve_actor(&username).await?;
            data.moderation.delete_own(post_id, &actor).await?;
            Ok(json!({
                "deleted": post_id,
                "message": "Your post has been deleted.",
            }))
        }
        BoardCommand::Show { post_id } => {
            let post = data.moderation.get_post(post_id).await?;
            let author = match post.author {
                Some(id) => Some(
                    data.members
                        .get_member(id)
                        .await
                        .with_context(|| format!("Loading author of post {}", post_id))?
                        .username,
                ),
                None => None,
            };
            Ok(json!({
                "post": post,
                "state": post.state().to_string(),
                "visible": post.is_visible(),
                "author": author,
            }))
        }
        BoardCommand::Queue { username, page } => {
            let actor = data.members.resolve_actor(&username).await?;
            let page = data.moderation.moderation_queue(&actor, page).await?;
            Ok(page_json(&page))
        }
        BoardCommand::Board { page } => {
            let page = data.moderation.public_board(page).await?;
            Ok(page_json(&page))
        }
        BoardCommand::Help => Ok(Value::String(super::commands::USAGE.to_string())),
    }
}

fn post_with_message(post: &Post, message: &str) -> Value {
    json!({
        "post": post,
        "state": post.state().to_string(),
        "message": message,
    })
}

fn page_json(page: &Page<Post>) -> Value {
    json!({
        "posts": page.items,
        "page": page.number,
        "total_pages": page.total_pages,
        "total_posts": page.total_items,
        "has_next": page.has_next(),
        "has_previous": page.has_previous(),
    })
}
