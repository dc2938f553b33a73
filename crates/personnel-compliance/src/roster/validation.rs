use chrono::{Datelike, NaiveDate};

use super::address::{parse_address, AddressError, PostalAddress};
use super::derivation::{
    background_check_validity_years, derive_expiration, parse_input_date, UPGRADE_TRAINING_YEARS,
};
use super::domain::{
    BackgroundCheck, ComplianceArea, EmployeeDraft, FormField, FoundationalTraining,
    PersonnelRecord, SelfCommitment, UpgradeTraining,
};

/// Enrollment dates must fall strictly after 1 January of this year.
pub const ENROLLMENT_EPOCH_YEAR: i32 = 2000;

/// Date inputs that are only checked for shape, not against the epoch.
const SECONDARY_DATE_FIELDS: [FormField; 4] = [
    FormField::FzExpiresOn,
    FormField::FzVerifiedOn,
    FormField::GsRenewedOn,
    FormField::UsExpiresOn,
];

/// Reasons a draft is turned away before it reaches persistence. Messages
/// are the ones shown to dashboard users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Bitte füllen Sie die Pflichtfelder Name, Vorname und E-Mail aus.")]
    MissingRequiredFields,
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error("{}: Bitte Felder ausfüllen: {}.", .group.label(), .missing.join(", "))]
    MissingFields {
        group: ComplianceArea,
        missing: Vec<&'static str>,
    },
    #[error("Das Datum ist falsch eingetragen: {}", .labels.join(", "))]
    InvalidDates { labels: Vec<&'static str> },
}

/// Read access to form values for the group check.
pub trait FieldSource {
    fn field_value(&self, field: FormField) -> &str;

    fn is_filled(&self, field: FormField) -> bool {
        !self.field_value(field).trim().is_empty()
    }
}

impl FieldSource for EmployeeDraft {
    fn field_value(&self, field: FormField) -> &str {
        self.value(field)
    }
}

/// All-or-nothing check for one compliance area.
pub fn validate_group<S: FieldSource + ?Sized>(
    group: ComplianceArea,
    source: &S,
) -> Result<(), ValidationError> {
    let fields = group.fields();
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|field| !source.is_filled(**field))
        .map(|field| field.label())
        .collect();

    if !missing.is_empty() && missing.len() < fields.len() {
        return Err(ValidationError::MissingFields { group, missing });
    }

    Ok(())
}

/// A record that passed [`RecordValidator::validate`]. Only the validator
/// builds these, so persistence never sees unchecked input. Expiration dates
/// are always derived here, whatever the draft carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord(PersonnelRecord);

impl ValidatedRecord {
    pub fn record(&self) -> &PersonnelRecord {
        &self.0
    }

    pub fn into_record(self) -> PersonnelRecord {
        self.0
    }
}

/// Runs the submit checks in the order the dashboard applies them and stops
/// at the first failing stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(&self, draft: &EmployeeDraft) -> Result<ValidatedRecord, ValidationError> {
        let required = [FormField::Name, FormField::FirstName, FormField::Email];
        if required.iter().any(|field| !draft.is_filled(*field)) {
            return Err(ValidationError::MissingRequiredFields);
        }

        let postal_address = if draft.is_filled(FormField::PostalAddress) {
            Some(parse_address(&draft.postal_address)?)
        } else {
            None
        };

        for group in ComplianceArea::ordered() {
            validate_group(group, draft)?;
        }

        check_dates(draft)?;

        Ok(ValidatedRecord(build_record(draft, postal_address)))
    }
}

pub fn is_after_epoch(date: NaiveDate) -> bool {
    (date.year(), date.ordinal()) > (ENROLLMENT_EPOCH_YEAR, 1)
}

/// Collects every offending label instead of stopping at the first one.
fn check_dates(draft: &EmployeeDraft) -> Result<(), ValidationError> {
    let mut labels = Vec::new();

    for group in ComplianceArea::ordered() {
        let field = group.enrollment_field();
        let raw = draft.value(field);
        if raw.trim().is_empty() {
            continue;
        }

        match parse_input_date(raw) {
            Some(date) if is_after_epoch(date) => {}
            _ => labels.push(field.label()),
        }
    }

    for field in SECONDARY_DATE_FIELDS {
        let raw = draft.value(field);
        if !raw.trim().is_empty() && parse_input_date(raw).is_none() {
            labels.push(field.label());
        }
    }

    if labels.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidDates { labels })
    }
}

fn build_record(
    draft: &EmployeeDraft,
    postal_address: Option<PostalAddress>,
) -> PersonnelRecord {
    let verified_by = format!(
        "{} {}",
        draft.fz_verifier_first.trim(),
        draft.fz_verifier_second.trim()
    );
    let fz_enrolled_on = parse_input_date(&draft.fz_enrolled_on);
    let us_enrolled_on = parse_input_date(&draft.us_enrolled_on);

    PersonnelRecord {
        id: draft.id,
        name: draft.name.trim().to_string(),
        first_name: draft.first_name.trim().to_string(),
        email: draft.email.trim().to_lowercase(),
        postal_address,
        municipality: text(&draft.municipality),
        background_check: BackgroundCheck {
            enrolled_on: fz_enrolled_on,
            expires_on: derive_expiration(
                fz_enrolled_on,
                background_check_validity_years(draft.is_full_time),
            ),
            verified_by: text(&verified_by),
            verified_on: parse_input_date(&draft.fz_verified_on),
        },
        foundational_training: FoundationalTraining {
            enrolled_on: parse_input_date(&draft.gs_enrolled_on),
            renewed_on: parse_input_date(&draft.gs_renewed_on),
            verified_by: text(&draft.gs_verified_by),
        },
        upgrade_training: UpgradeTraining {
            enrolled_on: us_enrolled_on,
            expires_on: derive_expiration(us_enrolled_on, UPGRADE_TRAINING_YEARS),
            verified_by: text(&draft.us_verified_by),
        },
        self_commitment: SelfCommitment {
            enrolled_on: parse_input_date(&draft.sve_enrolled_on),
            verified_by: text(&draft.sve_verified_by),
        },
        is_full_time: draft.is_full_time,
    }
}

fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
