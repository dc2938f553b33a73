use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{EmployeeDraft, EmployeeId, PersonnelRecord};
use super::form::{EmployeeFormState, FormError, SubmitError};
use super::notification::{DocumentRequest, DocumentRequestTemplate};
use super::repository::{
    NotificationError, NotificationSender, PersonnelRepository, RepositoryError,
};
use super::validation::ValidationError;

/// Service composing the form rules, the personnel store, and the mail hook.
pub struct PersonnelService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    template: DocumentRequestTemplate,
}

impl<R, N> PersonnelService<R, N>
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, template: DocumentRequestTemplate) -> Self {
        Self {
            repository,
            notifier,
            template,
        }
    }

    /// Create a new row. Any id in the payload is ignored; the store assigns
    /// one.
    pub fn insert(&self, mut draft: EmployeeDraft) -> Result<EmployeeId, PersonnelServiceError> {
        draft.id = None;
        let mut form = EmployeeFormState::from_draft(draft)?;
        let outcome = form.submit(self.repository.as_ref())?;
        info!(employee_id = %outcome.id(), "personnel record inserted");
        Ok(outcome.id())
    }

    /// Replace the row keyed by the draft's id.
    pub fn update(&self, draft: EmployeeDraft) -> Result<EmployeeId, PersonnelServiceError> {
        if draft.id.is_none() {
            return Err(PersonnelServiceError::InvalidRequest("Fehlende Daten."));
        }

        let mut form = EmployeeFormState::from_draft(draft)?;
        let outcome = form.submit(self.repository.as_ref())?;
        info!(employee_id = %outcome.id(), "personnel record updated");
        Ok(outcome.id())
    }

    pub fn get(&self, id: EmployeeId) -> Result<PersonnelRecord, PersonnelServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound(id))?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<PersonnelRecord>, PersonnelServiceError> {
        Ok(self.repository.list()?)
    }

    /// Mail the Führungszeugnis request with the bundled PDF.
    pub fn request_document(&self, request: DocumentRequest) -> Result<(), PersonnelServiceError> {
        if !request.is_complete() {
            return Err(PersonnelServiceError::InvalidRequest("Falsche Eingaben"));
        }

        let message = self.template.render(&request);
        let recipient = message.to.address.clone();
        match self.notifier.send(message) {
            Ok(()) => {
                info!(%recipient, "document request sent");
                Ok(())
            }
            Err(err) => {
                warn!(%recipient, status = err.status_code(), error = %err, "document request failed");
                Err(err.into())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersonnelServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("{0}")]
    InvalidRequest(&'static str),
}

impl From<SubmitError> for PersonnelServiceError {
    fn from(value: SubmitError) -> Self {
        match value {
            SubmitError::Validation(err) => Self::Validation(err),
            SubmitError::Persistence(err) => Self::Repository(err),
        }
    }
}
