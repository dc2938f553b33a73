//! Personnel compliance roster: the rules behind the dashboard's add/edit
//! dialog, the collaborator seams for storage and mail, and the HTTP routes.
//!
//! Edits flow through [`EmployeeFormState`], which keeps derived expirations
//! current; submitting runs [`RecordValidator`] and only then reaches the
//! [`PersonnelRepository`].

pub mod address;
pub mod derivation;
pub mod domain;
pub mod form;
pub mod import;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use address::{parse_address, AddressError, PostalAddress};
pub use derivation::{
    background_check_validity_years, derive_expiration, derive_expiration_from_input,
};
pub use domain::{
    BackgroundCheck, ComplianceArea, EmployeeDraft, EmployeeId, FormField, FoundationalTraining,
    PersonnelRecord, SelfCommitment, UpgradeTraining,
};
pub use form::{EmployeeFormState, FormError, SubmitError, SubmitOutcome};
pub use import::{RosterEntry, RosterFinding, RosterImportError, RosterImporter};
pub use notification::{DocumentRequest, DocumentRequestTemplate};
pub use repository::{
    Attachment, NotificationError, NotificationSender, OutboundMessage, PersonnelRepository,
    Recipient, RepositoryError,
};
pub use router::{personnel_router, ApiResponse};
pub use service::{PersonnelService, PersonnelServiceError};
pub use validation::{validate_group, FieldSource, RecordValidator, ValidatedRecord, ValidationError};
