use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use personnel_compliance::roster::derivation::parse_input_date;
use personnel_compliance::roster::{
    EmployeeId, NotificationError, NotificationSender, OutboundMessage, PersonnelRecord,
    PersonnelRepository, RepositoryError, ValidatedRecord,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const ATTACHMENT_MISSING: &str = "PDF Datei nicht gefunden";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local personnel table. Ids start at 1 and are never reused.
#[derive(Default)]
pub(crate) struct InMemoryPersonnelRepository {
    records: Mutex<BTreeMap<EmployeeId, PersonnelRecord>>,
    last_id: AtomicU64,
}

impl InMemoryPersonnelRepository {
    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<EmployeeId, PersonnelRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("personnel table lock poisoned".to_string()))
    }
}

impl PersonnelRepository for InMemoryPersonnelRepository {
    fn insert(&self, record: ValidatedRecord) -> Result<EmployeeId, RepositoryError> {
        let mut guard = self.rows()?;
        let id = EmployeeId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut record = record.into_record();
        record.id = Some(id);
        guard.insert(id, record);
        Ok(id)
    }

    fn update(&self, id: EmployeeId, record: ValidatedRecord) -> Result<(), RepositoryError> {
        let mut guard = self.rows()?;
        match guard.get_mut(&id) {
            Some(row) => {
                *row = record.into_record();
                row.id = Some(id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    fn fetch(&self, id: EmployeeId) -> Result<Option<PersonnelRecord>, RepositoryError> {
        Ok(self.rows()?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<PersonnelRecord>, RepositoryError> {
        Ok(self.rows()?.values().cloned().collect())
    }
}

/// Stands in for the mail relay: verifies attachments exist, logs the
/// delivery, and keeps the message for inspection.
#[derive(Default)]
pub(crate) struct OutboxNotifier {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl OutboxNotifier {
    #[cfg(test)]
    pub(crate) fn messages(&self) -> Vec<OutboundMessage> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSender for OutboxNotifier {
    fn send(&self, message: OutboundMessage) -> Result<(), NotificationError> {
        if message
            .attachments
            .iter()
            .any(|attachment| !attachment.path.is_file())
        {
            return Err(NotificationError::new(ATTACHMENT_MISSING).with_status(404));
        }

        let mut guard = self
            .messages
            .lock()
            .map_err(|_| NotificationError::new("outbox lock poisoned").with_status(500))?;
        info!(
            to = %message.to.address,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "mail queued"
        );
        guard.push(message);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_input_date(raw).ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD"))
}
