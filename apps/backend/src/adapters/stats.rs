//! Accounts and statistics collaborator.
//!
//! The game consumes this store but never depends on it: every call site
//! treats a failure as log-and-continue. The in-process default keeps
//! accounts in a `DashMap` with blake3 password digests; a real deployment
//! can swap in a persistent implementation behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AppError;
use crate::ws::protocol::StatsSummary;

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn register_account(&self, name: &str, password: &str) -> Result<(), AppError>;

    async fn login(&self, name: &str, password: &str) -> Result<StatsSummary, AppError>;

    async fn delete_account(&self, name: &str, password: &str) -> Result<(), AppError>;

    async fn stats_for(&self, name: &str) -> Result<StatsSummary, AppError>;

    async fn set_avatar(&self, name: &str, avatar: &str) -> Result<(), AppError>;

    /// Upserts: results are counted even for names that never registered
    /// an account.
    async fn record_result(&self, name: &str, won: bool) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
struct AccountRecord {
    password_digest: Option<String>,
    avatar: Option<String>,
    summary: StatsSummary,
}

#[derive(Default)]
pub struct MemoryStatsStore {
    accounts: DashMap<String, AccountRecord>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn digest(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn register_account(&self, name: &str, password: &str) -> Result<(), AppError> {
        let mut record = self.accounts.entry(name.to_string()).or_default();
        if record.password_digest.is_some() {
            return Err(AppError::AccountExists);
        }
        record.password_digest = Some(digest(password));
        Ok(())
    }

    async fn login(&self, name: &str, password: &str) -> Result<StatsSummary, AppError> {
        let record = self.accounts.get(name).ok_or(AppError::InvalidCredentials)?;
        match &record.password_digest {
            Some(stored) if *stored == digest(password) => Ok(record.summary),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn delete_account(&self, name: &str, password: &str) -> Result<(), AppError> {
        let matches = {
            let record = self.accounts.get(name).ok_or(AppError::InvalidCredentials)?;
            record.password_digest.as_deref() == Some(digest(password).as_str())
        };
        if !matches {
            return Err(AppError::InvalidCredentials);
        }
        self.accounts.remove(name);
        Ok(())
    }

    async fn stats_for(&self, name: &str) -> Result<StatsSummary, AppError> {
        self.accounts
            .get(name)
            .map(|record| record.summary)
            .ok_or(AppError::AccountNotFound)
    }

    async fn set_avatar(&self, name: &str, avatar: &str) -> Result<(), AppError> {
        let mut record = self.accounts.entry(name.to_string()).or_default();
        record.avatar = Some(avatar.to_string());
        Ok(())
    }

    async fn record_result(&self, name: &str, won: bool) -> Result<(), AppError> {
        let mut record = self.accounts.entry(name.to_string()).or_default();
        record.summary.games_played += 1;
        if won {
            record.summary.wins += 1;
        } else {
            record.summary.losses += 1;
        }
        Ok(())
    }
}
