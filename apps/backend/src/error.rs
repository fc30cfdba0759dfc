//! Application-level errors for infrastructure paths and collaborators.
//!
//! Gameplay violations use `errors::GameError`; this type covers startup
//! configuration and the stats/mail collaborators, whose failures are
//! logged and swallowed without touching gameplay.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("configuration error: {detail}")]
    Config { detail: String },

    #[error("account name is already registered")]
    AccountExists,

    #[error("unknown account or wrong password")]
    InvalidCredentials,

    #[error("no account or stats recorded under that name")]
    AccountNotFound,

    #[error("mail delivery failed: {detail}")]
    Mail { detail: String },
}
