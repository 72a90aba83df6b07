use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const INVITE_TEMPLATE: &str = "account/email/invite";
pub const NEW_CANDIDATE_TEMPLATE: &str = "admin/email/new_candidate";

/// Outbound e-mail job. Rendering and delivery happen elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub recipient: String,
    pub subject: String,
    pub template: String,
    pub context: BTreeMap<String, String>,
}

/// Background job queue for invites and new-candidate alerts.
pub trait NotificationQueue: Send + Sync {
    fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification queue unavailable: {0}")]
    Transport(String),
}

/// Fire-and-forget enqueue: failures are logged, never returned to the caller.
pub(crate) fn dispatch<N: NotificationQueue + ?Sized>(queue: &N, job: NotificationJob) {
    let template = job.template.clone();
    if let Err(err) = queue.enqueue(job) {
        warn!(%template, error = %err, "failed to enqueue notification");
    }
}

/// Queue backed by an unbounded tokio channel drained by [`spawn_notification_worker`].
#[derive(Debug, Clone)]
pub struct ChannelNotificationQueue {
    sender: UnboundedSender<NotificationJob>,
}

impl ChannelNotificationQueue {
    pub fn channel() -> (Self, UnboundedReceiver<NotificationJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationQueue for ChannelNotificationQueue {
    fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationError> {
        self.sender
            .send(job)
            .map_err(|_| NotificationError::Transport("worker has shut down".to_string()))
    }
}

/// Drain the queue until every sender is dropped.
pub fn spawn_notification_worker(mut receiver: UnboundedReceiver<NotificationJob>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            info!(
                recipient = %job.recipient,
                subject = %job.subject,
                template = %job.template,
                "notification handed to mailer"
            );
        }
    })
}
