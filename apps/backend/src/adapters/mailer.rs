//! Outbound mail collaborator for contact messages and crash reports.
//!
//! Fire-and-forget: callers spawn the future and log the outcome. The
//! default implementation only logs; a real SMTP sender can replace it
//! behind the same trait.

use async_trait::async_trait;
use tracing::info;

use crate::error::AppError;

#[async_trait]
pub trait OutboundMailer: Send + Sync {
    async fn send_contact(
        &self,
        from: &str,
        reply_to: Option<&str>,
        body: &str,
    ) -> Result<(), AppError>;

    async fn send_crash_report(&self, from: &str, details: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl OutboundMailer for LogMailer {
    async fn send_contact(
        &self,
        from: &str,
        reply_to: Option<&str>,
        body: &str,
    ) -> Result<(), AppError> {
        info!(from, reply_to, body_len = body.len(), "[MAIL] contact message");
        Ok(())
    }

    async fn send_crash_report(&self, from: &str, details: &str) -> Result<(), AppError> {
        info!(from, details_len = details.len(), "[MAIL] crash report");
        Ok(())
    }
}
