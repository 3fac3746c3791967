//! Notification collaborator.
//!
//! Assembles the outcome summary and hands it to whichever notifier is
//! wired in. Actual mail transport is external; the default implementation
//! records the notification in the log.

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::NotifyConfig;

/// What a finished run looked like.
#[derive(Clone, Copy, Debug)]
pub struct DeploySummary {
    pub completed: usize,
    pub total: usize,
    /// Nothing differed; the remote was never contacted.
    pub unchanged: bool,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deploy_succeeded(&self, summary: &DeploySummary);
    async fn deploy_failed(&self, error: &str);
}

/// Notifier that writes the outcome to the log.
pub struct LogNotifier {
    config: Option<NotifyConfig>,
}

impl LogNotifier {
    pub fn new(config: Option<NotifyConfig>) -> Self {
        Self { config }
    }

    fn sender(&self) -> &str {
        self.config.as_ref().map_or("(nobody)", |c| c.from.as_str())
    }

    fn recipient(&self) -> &str {
        self.config.as_ref().map_or("(nobody)", |c| c.to.as_str())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deploy_succeeded(&self, summary: &DeploySummary) {
        if summary.unchanged {
            info!(
                from = self.sender(),
                to = self.recipient(),
                "deployment skipped: already up to date"
            );
        } else {
            info!(
                from = self.sender(),
                to = self.recipient(),
                completed = summary.completed,
                total = summary.total,
                "deployment succeeded"
            );
        }
    }

    async fn deploy_failed(&self, error: &str) {
        error!(
            from = self.sender(),
            to = self.recipient(),
            error,
            "deployment failed"
        );
    }
}
