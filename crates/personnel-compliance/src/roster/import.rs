use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::derivation::{format_input_date, parse_input_date};
use super::domain::{parse_flag, split_verifiers, EmployeeDraft, EmployeeId};
use super::form::EmployeeFormState;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One data row of a personnel table export, as a form draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// 1-based line where the row starts in the source file, header
    /// included. Quoted fields may span several lines.
    pub line: u64,
    pub draft: EmployeeDraft,
}

/// Result of running one entry through the submit checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterFinding {
    pub line: u64,
    pub id: Option<EmployeeId>,
    pub display_name: String,
    pub problem: Option<String>,
}

impl RosterFinding {
    pub fn is_valid(&self) -> bool {
        self.problem.is_none()
    }
}

/// Reads CSV exports of the personnel table (database column names as
/// headers).
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RosterEntry>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut record = csv::StringRecord::new();
        let mut entries = Vec::new();

        while csv_reader.read_record(&mut record)? {
            let line = record
                .position()
                .map(|position| position.line())
                .unwrap_or_default();
            let row: RosterRow = record.deserialize(Some(&headers))?;
            entries.push(RosterEntry {
                line,
                draft: row.into_draft(),
            });
        }

        Ok(entries)
    }

    /// Replays each row through the form and validator without persisting.
    pub fn check(entries: &[RosterEntry]) -> Vec<RosterFinding> {
        entries
            .iter()
            .map(|entry| {
                let display_name = format!("{} {}", entry.draft.first_name, entry.draft.name)
                    .trim()
                    .to_string();
                let problem = EmployeeFormState::from_draft(entry.draft.clone())
                    .map_err(|err| err.to_string())
                    .and_then(|form| form.validate().map_err(|err| err.to_string()))
                    .err();

                RosterFinding {
                    line: entry.line,
                    id: entry.draft.id,
                    display_name,
                    problem,
                }
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RosterRow {
    id: Option<u64>,
    name: String,
    vorname: String,
    email: String,
    postadresse: String,
    gemeinde_freizeit: String,
    fz_eingetragen: String,
    fz_abgelaufen: String,
    fz_kontrolliert: String,
    fz_kontrolliert_am: String,
    gs_eingetragen: String,
    gs_erneuert: String,
    gs_kontrolliert: String,
    us_eingetragen: String,
    us_abgelaufen: String,
    us_kontrolliert: String,
    sve_eingetragen: String,
    sve_kontrolliert: String,
    hauptamt: String,
}

impl RosterRow {
    fn into_draft(self) -> EmployeeDraft {
        let (fz_verifier_first, fz_verifier_second) = split_verifiers(&self.fz_kontrolliert);

        EmployeeDraft {
            id: self.id.map(EmployeeId),
            name: self.name,
            first_name: self.vorname,
            email: self.email,
            postal_address: self.postadresse,
            municipality: self.gemeinde_freizeit,
            fz_enrolled_on: input_date(self.fz_eingetragen),
            fz_expires_on: input_date(self.fz_abgelaufen),
            fz_verifier_first,
            fz_verifier_second,
            fz_verified_by: String::new(),
            fz_verified_on: input_date(self.fz_kontrolliert_am),
            gs_enrolled_on: input_date(self.gs_eingetragen),
            gs_renewed_on: input_date(self.gs_erneuert),
            gs_verified_by: self.gs_kontrolliert,
            us_enrolled_on: input_date(self.us_eingetragen),
            us_expires_on: input_date(self.us_abgelaufen),
            us_verified_by: self.us_kontrolliert,
            sve_enrolled_on: input_date(self.sve_eingetragen),
            sve_verified_by: self.sve_kontrolliert,
            is_full_time: parse_flag(&self.hauptamt),
        }
    }
}

/// Database timestamps become form dates; anything unparseable is kept so
/// validation can point at it.
fn input_date(raw: String) -> String {
    match parse_input_date(&raw) {
        Some(date) => format_input_date(date),
        None => raw,
    }
}
