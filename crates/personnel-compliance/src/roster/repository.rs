use std::path::PathBuf;

use serde::Serialize;

use super::domain::{EmployeeId, PersonnelRecord};
use super::validation::ValidatedRecord;

/// Storage abstraction over the personnel table so the form and service can
/// be exercised without a database.
pub trait PersonnelRepository: Send + Sync {
    /// Store a new row and return the key the store assigned to it.
    fn insert(&self, record: ValidatedRecord) -> Result<EmployeeId, RepositoryError>;
    /// Replace the full row stored under `id`.
    fn update(&self, id: EmployeeId, record: ValidatedRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: EmployeeId) -> Result<Option<PersonnelRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<PersonnelRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Mitarbeiter {0} nicht gefunden")]
    NotFound(EmployeeId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound mail hook (SMTP relay, provider API, test outbox).
pub trait NotificationSender: Send + Sync {
    fn send(&self, message: OutboundMessage) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub address: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub file_name: String,
    pub path: PathBuf,
}

/// A fully rendered e-mail: HTML body plus plain-text alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub to: Recipient,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachments: Vec<Attachment>,
}

/// Failure reported by the mail collaborator. `status` carries the
/// collaborator's own code when it has one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NotificationError {
    pub message: String,
    pub status: Option<u16>,
}

impl NotificationError {
    pub const DEFAULT_STATUS: u16 = 400;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status_code(&self) -> u16 {
        match self.status {
            Some(status) if status != 0 => status,
            _ => Self::DEFAULT_STATUS,
        }
    }
}
