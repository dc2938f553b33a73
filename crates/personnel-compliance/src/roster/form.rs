use super::derivation::{
    background_check_validity_years, derive_expiration_from_input, format_input_date,
    UPGRADE_TRAINING_YEARS,
};
use super::domain::{EmployeeDraft, EmployeeId, FormField, PersonnelRecord};
use super::repository::{PersonnelRepository, RepositoryError};
use super::validation::{RecordValidator, ValidatedRecord, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{} wird automatisch berechnet.", .0.label())]
    DerivedField(FormField),
    #[error("{} setzt {} voraus.", .0.label(), FormField::GsEnrolledOn.label())]
    RequiresEnrollment(FormField),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Inserted(EmployeeId),
    Updated(EmployeeId),
}

impl SubmitOutcome {
    pub fn id(self) -> EmployeeId {
        match self {
            SubmitOutcome::Inserted(id) | SubmitOutcome::Updated(id) => id,
        }
    }
}

/// Owns the draft behind the add/edit dialog. Every edit goes through
/// [`EmployeeFormState::apply_edit`] so sanitizing and derived expirations
/// stay consistent no matter where the values come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFormState {
    draft: EmployeeDraft,
}

impl EmployeeFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: &PersonnelRecord) -> Self {
        Self {
            draft: EmployeeDraft::from_record(record),
        }
    }

    /// Replays every value of `draft` as if typed into the form. A draft
    /// carrying only the combined `fz_kontrolliert` column has it split into
    /// the two verifier boxes first.
    pub fn from_draft(draft: EmployeeDraft) -> Result<Self, FormError> {
        let mut state = Self::new();
        state.draft.id = draft.id;
        state.draft.is_full_time = draft.is_full_time;
        let (verifier_first, verifier_second) = draft.verifier_boxes();

        for field in FormField::ALL {
            let value = match field {
                _ if field.is_derived() => continue,
                FormField::FzVerifierFirst => verifier_first.as_str(),
                FormField::FzVerifierSecond => verifier_second.as_str(),
                _ => draft.value(field),
            };
            state.apply_edit(field, value)?;
        }

        Ok(state)
    }

    pub fn draft(&self) -> &EmployeeDraft {
        &self.draft
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.draft.id
    }

    pub fn is_full_time(&self) -> bool {
        self.draft.is_full_time
    }

    /// Whether the dashboard would let the user type into `field` right now.
    pub fn is_editable(&self, field: FormField) -> bool {
        match field {
            FormField::FzExpiresOn | FormField::UsExpiresOn => false,
            FormField::GsRenewedOn => !self.draft.gs_enrolled_on.trim().is_empty(),
            _ => true,
        }
    }

    pub fn apply_edit(&mut self, field: FormField, raw: &str) -> Result<(), FormError> {
        if field.is_derived() {
            return Err(FormError::DerivedField(field));
        }
        if !raw.trim().is_empty() && !self.is_editable(field) {
            return Err(FormError::RequiresEnrollment(field));
        }

        let value = if field.is_name_like() {
            sanitize_name(raw)
        } else if field == FormField::Email {
            raw.to_lowercase()
        } else {
            raw.to_string()
        };

        *self.draft.value_mut(field) = value;

        match field {
            FormField::FzEnrolledOn => self.recompute_background_check_expiry(),
            FormField::UsEnrolledOn => {
                self.draft.us_expires_on =
                    expiry_text(&self.draft.us_enrolled_on, UPGRADE_TRAINING_YEARS);
            }
            _ => {}
        }

        Ok(())
    }

    pub fn set_full_time(&mut self, is_full_time: bool) {
        self.draft.is_full_time = is_full_time;
        if !self.draft.fz_enrolled_on.trim().is_empty() {
            self.recompute_background_check_expiry();
        }
    }

    pub fn validate(&self) -> Result<ValidatedRecord, ValidationError> {
        RecordValidator.validate(&self.draft)
    }

    /// Validate, then insert or update depending on whether the draft
    /// already carries a stored id. The repository is untouched when
    /// validation fails.
    pub fn submit<R>(&mut self, repository: &R) -> Result<SubmitOutcome, SubmitError>
    where
        R: PersonnelRepository + ?Sized,
    {
        let validated = self.validate()?;

        let outcome = match self.draft.id {
            Some(id) => {
                repository.update(id, validated)?;
                SubmitOutcome::Updated(id)
            }
            None => {
                let id = repository.insert(validated)?;
                self.draft.id = Some(id);
                SubmitOutcome::Inserted(id)
            }
        };

        Ok(outcome)
    }

    fn recompute_background_check_expiry(&mut self) {
        let years = background_check_validity_years(self.draft.is_full_time);
        self.draft.fz_expires_on = expiry_text(&self.draft.fz_enrolled_on, years);
    }
}

fn expiry_text(enrolled_on: &str, years: u32) -> String {
    derive_expiration_from_input(enrolled_on, years)
        .map(format_input_date)
        .unwrap_or_default()
}

/// Letters (with German umlauts and ß), whitespace and hyphens survive;
/// everything else is dropped.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|&c| {
            c.is_ascii_alphabetic()
                || c.is_whitespace()
                || matches!(c, '-' | 'ä' | 'ö' | 'ü' | 'Ä' | 'Ö' | 'Ü' | 'ß')
        })
        .collect()
}
