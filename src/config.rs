// Runtime configuration, read from the environment (and `.env` via dotenv).

use crate::infra::notifications::SmtpSettings;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/board.db";
pub const DEFAULT_BANNED_WORDS_FILE: &str = "data/bad_words.txt";
/// Submission port, used with STARTTLS.
pub const DEFAULT_STARTTLS_PORT: u16 = 587;
/// Implicit-TLS port, used when STARTTLS is off.
pub const DEFAULT_TLS_PORT: u16 = 465;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub database_url: String,
    pub banned_words_file: PathBuf,
    /// `None` when SMTP_HOST is unset; notices are then only logged.
    pub smtp: Option<SmtpSettings>,
}

impl BoardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("BOARD_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let banned_words_file = get("BANNED_WORDS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BANNED_WORDS_FILE));

        let smtp = match get("SMTP_HOST") {
            None => None,
            Some(host) => {
                let use_starttls = match get("SMTP_STARTTLS") {
                    Some(raw) => raw
                        .parse::<bool>()
                        .with_context(|| format!("SMTP_STARTTLS must be true or false, got {:?}", raw))?,
                    None => true,
                };
                let port = match get("SMTP_PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .with_context(|| format!("SMTP_PORT must be a port number, got {:?}", raw))?,
                    None if use_starttls => DEFAULT_STARTTLS_PORT,
                    None => DEFAULT_TLS_PORT,
                };

                Some(SmtpSettings {
                    host,
                    port,
                    username: get("SMTP_USERNAME"),
                    password: get("SMTP_PASSWORD"),
                    use_starttls,
                    from: get("DEFAULT_FROM_EMAIL")
                        .context("DEFAULT_FROM_EMAIL must be set when SMTP_HOST is set")?,
                    moderator: get("MODERATOR_EMAIL")
                        .context("MODERATOR_EMAIL must be set when SMTP_HOST is set")?,
                })
            }
        };

        Ok(Self {
            database_url,
            banned_words_file,
            smtp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<BoardConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BoardConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(
            config.banned_words_file,
            PathBuf::from(DEFAULT_BANNED_WORDS_FILE)
        );
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_empty_host_disables_smtp() {
        let config = config(&[("SMTP_HOST", "  ")]).unwrap();
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_smtp_settings() {
        let config = config(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USERNAME", "board"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_STARTTLS", "false"),
            ("DEFAULT_FROM_EMAIL", "board@example.com"),
            ("MODERATOR_EMAIL", "mods@example.com"),
        ])
        .unwrap();

        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.username.as_deref(), Some("board"));
        assert!(!smtp.use_starttls);
        assert_eq!(smtp.moderator, "mods@example.com");
    }

    #[test]
    fn test_default_port_follows_tls_mode() {
        let base = [
            ("SMTP_HOST", "smtp.example.com"),
            ("DEFAULT_FROM_EMAIL", "board@example.com"),
            ("MODERATOR_EMAIL", "mods@example.com"),
        ];

        let smtp = config(&base).unwrap().smtp.unwrap();
        assert!(smtp.use_starttls);
        assert_eq!(smtp.port, DEFAULT_STARTTLS_PORT);

        let mut implicit_tls = base.to_vec();
        implicit_tls.push(("SMTP_STARTTLS", "false"));
        let smtp = config(&implicit_tls).unwrap().smtp.unwrap();
        assert!(!smtp.use_starttls);
        assert_eq!(smtp.port, DEFAULT_TLS_PORT);
    }

    #[test]
    fn test_smtp_requires_addresses() {
        let err = config(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("DEFAULT_FROM_EMAIL", "board@example.com"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("MODERATOR_EMAIL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "smtp"),
            ("DEFAULT_FROM_EMAIL", "board@example.com"),
            ("MODERATOR_EMAIL", "mods@example.com"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
    }
}
