// Command-line parsing for the board tool.
//
// Only translation from argv to a `BoardCommand` lives here; handlers.rs
// does the work.

use crate::core::moderation::PostId;
use thiserror::Error;

pub const USAGE: &str = "\
Usage: board <command> [args]

Members:
  member add <username> <email> [--staff] [--moderator] [--trusted]

Posts:
  submit <username> <title> <content>   Post to the board (runs the banned-word filter)
  edit <username> <post_id> <title> <content>
                                        Change one of your own posts (filtered again)
  flag <username> <post_id>             Report a post for moderator review
  delete <username> <post_id>           Delete one of your own posts
  show <post_id>                        Show a single post
  board [page]                          List visible posts, newest first

Moderation (staff and moderators):
  queue <username> [page]               List posts awaiting review
  approve <username> <post_id>          Clear a post for display
  reject <username> <post_id>           Delete a post permanently

  help                                  Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    AddMember {
        username: String,
        email: String,
        is_staff: bool,
        is_moderator: bool,
        is_trusted: bool,
    },
    Submit {
        username: String,
        title: String,
        content: String,
    },
    Edit {
        username: String,
        post_id: PostId,
        title: String,
        content: String,
    },
    Flag {
        username: String,
        post_id: PostId,
    },
    Approve {
        username: String,
        post_id: PostId,
    },
    Reject {
        username: String,
        post_id: PostId,
    },
    Delete {
        username: String,
        post_id: PostId,
    },
    Show {
        post_id: PostId,
    },
    Queue {
        username: String,
        page: u64,
    },
    Board {
        page: u64,
    },
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Missing argument: <{0}>")]
    MissingArgument(&'static str),

    #[error("Invalid {name}: {value:?} is not a number")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// Walks the remaining arguments of one command.
struct Args<I: Iterator<Item = String>> {
    inner: I,
}

impl<I: Iterator<Item = String>> Args<I> {
    fn required(&mut self, name: &'static str) -> Result<String, UsageError> {
        self.inner.next().ok_or(UsageError::MissingArgument(name))
    }

    fn post_id(&mut self) -> Result<PostId, UsageError> {
        let value = self.required("post_id")?;
        value
            .parse::<i64>()
            .map(PostId)
            .map_err(|_| UsageError::InvalidNumber {
                name: "post_id",
                value,
            })
    }

    /// Optional page number, defaulting to the first page.
    fn page(&mut self) -> Result<u64, UsageError> {
        match self.inner.next() {
            None => Ok(1),
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| UsageError::InvalidNumber { name: "page", value }),
        }
    }

    fn finish(mut self) -> Result<(), UsageError> {
        match self.inner.next() {
            None => Ok(()),
            Some(extra) => Err(UsageError::UnexpectedArgument(extra)),
        }
    }
}

/// Parse the arguments that follow the program name.
pub fn parse_command<I>(args: I) -> Result<BoardCommand, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args {
        inner: args.into_iter(),
    };

    let name = match args.inner.next() {
        None => return Ok(BoardCommand::Help),
        Some(name) => name,
    };

    let command = match name.as_str() {
        "help" | "--help" | "-h" => BoardCommand::Help,
        "member" => {
            let sub = args.required("subcommand")?;
            if sub != "add" {
                return Err(UsageError::UnknownCommand(format!("member {}", sub)));
            }
            let username = args.required("username")?;
            let email = args.required("email")?;

            let (mut is_staff, mut is_moderator, mut is_trusted) = (false, false, false);
            for flag in args.inner.by_ref() {
                match flag.as_str() {
                    "--staff" => is_staff = true,
                    "--moderator" => is_moderator = true,
                    "--trusted" => is_trusted = true,
                    _ => return Err(UsageError::UnexpectedArgument(flag)),
                }
            }

            BoardCommand::AddMember {
                username,
                email,
                is_staff,
                is_moderator,
                is_trusted,
            }
        }
        "submit" => BoardCommand::Submit {
            username: args.required("username")?,
            title: args.required("title")?,
            content: args.required("content")?,
        },
        "edit" => BoardCommand::Edit {
            username: args.required("username")?,
            post_id: args.post_id()?,
            title: args.required("title")?,
            content: args.required("content")?,
        },
        "flag" => BoardCommand::Flag {
            username: args.required("username")?,
            post_id: args.post_id()?,
        },
        "approve" => BoardCommand::Approve {
            username: args.required("username")?,
            post_id: args.post_id()?,
        },
        "reject" => BoardCommand::Reject {
            username: args.required("username")?,
            post_id: args.post_id()?,
        },
        "delete" => BoardCommand::Delete {
            username: args.required("username")?,
            post_id: args.post_id()?,
        },
        "show" => BoardCommand::Show {
            post_id: args.post_id()?,
        },
        "queue" => BoardCommand::Queue {
            username: args.required("username")?,
            page: args.page()?,
        },
        "board" => BoardCommand::Board { page: args.page()? },
        other => return Err(UsageError::UnknownCommand(other.to_string())),
    };

    args.finish()?;
    Ok(command)
}
