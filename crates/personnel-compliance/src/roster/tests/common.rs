use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::roster::domain::{EmployeeDraft, EmployeeId, PersonnelRecord};
use crate::roster::notification::{DocumentRequest, DocumentRequestTemplate};
use crate::roster::repository::{
    NotificationError, NotificationSender, OutboundMessage, PersonnelRepository, RepositoryError,
};
use crate::roster::validation::ValidatedRecord;
use crate::roster::{personnel_router, PersonnelService};

pub(super) const CONTACT_ADDRESS: &str = "gewaltschutz@ecsa.de";

/// Anna Müller with a complete Führungszeugnis group.
pub(super) fn anna_draft() -> EmployeeDraft {
    EmployeeDraft {
        name: "Müller".to_string(),
        first_name: "Anna".to_string(),
        email: "A@X.com".to_string(),
        postal_address: "12345 Berlin".to_string(),
        fz_enrolled_on: "2024-01-01".to_string(),
        fz_verifier_first: "Max Mustermann".to_string(),
        fz_verifier_second: "Erika Musterfrau".to_string(),
        fz_verified_on: "2024-01-05".to_string(),
        ..EmployeeDraft::default()
    }
}

pub(super) fn minimal_draft() -> EmployeeDraft {
    EmployeeDraft {
        name: "Schmidt".to_string(),
        first_name: "Jonas".to_string(),
        email: "jonas@example.org".to_string(),
        ..EmployeeDraft::default()
    }
}

pub(super) fn document_request() -> DocumentRequest {
    DocumentRequest {
        email: "anna@example.org".to_string(),
        name: "Müller".to_string(),
        first_name: "Anna".to_string(),
    }
}

pub(super) fn template() -> DocumentRequestTemplate {
    DocumentRequestTemplate::new(CONTACT_ADDRESS, "assets/fuehrungszeugnis.pdf")
}

pub(super) fn build_service() -> (
    PersonnelService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = PersonnelService::new(repository.clone(), notifier.clone(), template());
    (service, repository, notifier)
}

pub(super) fn personnel_router_with_service(
    service: PersonnelService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    personnel_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<EmployeeId, PersonnelRecord>>,
    calls: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self, id: EmployeeId) -> Option<PersonnelRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .cloned()
    }
}

impl PersonnelRepository for MemoryRepository {
    fn insert(&self, record: ValidatedRecord) -> Result<EmployeeId, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let id = EmployeeId(guard.len() as u64 + 1);
        let mut record = record.into_record();
        record.id = Some(id);
        guard.insert(id, record);
        Ok(id)
    }

    fn update(&self, id: EmployeeId, record: ValidatedRecord) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&id) {
            return Err(RepositoryError::NotFound(id));
        }
        let mut record = record.into_record();
        record.id = Some(id);
        guard.insert(id, record);
        Ok(())
    }

    fn fetch(&self, id: EmployeeId) -> Result<Option<PersonnelRecord>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn list(&self) -> Result<Vec<PersonnelRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl PersonnelRepository for UnavailableRepository {
    fn insert(&self, _record: ValidatedRecord) -> Result<EmployeeId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _id: EmployeeId, _record: ValidatedRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: EmployeeId) -> Result<Option<PersonnelRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<PersonnelRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationSender for MemoryNotifier {
    fn send(&self, message: OutboundMessage) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Rejects every message with the configured error.
pub(super) struct FailingNotifier(pub(super) NotificationError);

impl NotificationSender for FailingNotifier {
    fn send(&self, _message: OutboundMessage) -> Result<(), NotificationError> {
        Err(self.0.clone())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
