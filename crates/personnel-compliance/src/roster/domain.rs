use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::address::PostalAddress;
use super::derivation::parse_input_date;

/// Server-assigned key of a personnel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four compliance areas tracked per person. Each one is stored as an
/// all-or-nothing group of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceArea {
    BackgroundCheck,
    FoundationalTraining,
    UpgradeTraining,
    SelfCommitment,
}

impl ComplianceArea {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::BackgroundCheck,
            Self::FoundationalTraining,
            Self::UpgradeTraining,
            Self::SelfCommitment,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BackgroundCheck => "Führungszeugnis",
            Self::FoundationalTraining => "Grundlagenschulung",
            Self::UpgradeTraining => "Upgradeschulung",
            Self::SelfCommitment => "Selbstverpflichtungserklärung",
        }
    }

    /// Fields that must be filled together, in the order their labels are
    /// reported.
    pub const fn fields(self) -> &'static [FormField] {
        match self {
            Self::BackgroundCheck => &[
                FormField::FzEnrolledOn,
                FormField::FzVerifierFirst,
                FormField::FzVerifierSecond,
                FormField::FzVerifiedOn,
            ],
            Self::FoundationalTraining => &[FormField::GsEnrolledOn, FormField::GsVerifiedBy],
            Self::UpgradeTraining => &[
                FormField::UsEnrolledOn,
                FormField::UsExpiresOn,
                FormField::UsVerifiedBy,
            ],
            Self::SelfCommitment => &[FormField::SveEnrolledOn, FormField::SveVerifiedBy],
        }
    }

    pub const fn enrollment_field(self) -> FormField {
        match self {
            Self::BackgroundCheck => FormField::FzEnrolledOn,
            Self::FoundationalTraining => FormField::GsEnrolledOn,
            Self::UpgradeTraining => FormField::UsEnrolledOn,
            Self::SelfCommitment => FormField::SveEnrolledOn,
        }
    }
}

impl fmt::Display for ComplianceArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every input of the personnel edit form, keyed by the dashboard's input id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "vorname")]
    FirstName,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "postadresse")]
    PostalAddress,
    #[serde(rename = "gemeinde_freizeit")]
    Municipality,
    #[serde(rename = "fz_eingetragen")]
    FzEnrolledOn,
    #[serde(rename = "fz_abgelaufen")]
    FzExpiresOn,
    #[serde(rename = "fz_kontrolliert_first")]
    FzVerifierFirst,
    #[serde(rename = "fz_kontrolliert_second")]
    FzVerifierSecond,
    #[serde(rename = "fz_kontrolliert_am")]
    FzVerifiedOn,
    #[serde(rename = "gs_eingetragen")]
    GsEnrolledOn,
    #[serde(rename = "gs_erneuert")]
    GsRenewedOn,
    #[serde(rename = "gs_kontrolliert")]
    GsVerifiedBy,
    #[serde(rename = "us_eingetragen")]
    UsEnrolledOn,
    #[serde(rename = "us_abgelaufen")]
    UsExpiresOn,
    #[serde(rename = "us_kontrolliert")]
    UsVerifiedBy,
    #[serde(rename = "sve_eingetragen")]
    SveEnrolledOn,
    #[serde(rename = "sve_kontrolliert")]
    SveVerifiedBy,
}

impl FormField {
    /// Form order. Source dates come before the fields derived from or gated
    /// by them, so replaying a draft in this order is stable.
    pub const ALL: [FormField; 18] = [
        FormField::Name,
        FormField::FirstName,
        FormField::Email,
        FormField::PostalAddress,
        FormField::Municipality,
        FormField::FzEnrolledOn,
        FormField::FzExpiresOn,
        FormField::FzVerifierFirst,
        FormField::FzVerifierSecond,
        FormField::FzVerifiedOn,
        FormField::GsEnrolledOn,
        FormField::GsRenewedOn,
        FormField::GsVerifiedBy,
        FormField::UsEnrolledOn,
        FormField::UsExpiresOn,
        FormField::UsVerifiedBy,
        FormField::SveEnrolledOn,
        FormField::SveVerifiedBy,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FirstName => "vorname",
            Self::Email => "email",
            Self::PostalAddress => "postadresse",
            Self::Municipality => "gemeinde_freizeit",
            Self::FzEnrolledOn => "fz_eingetragen",
            Self::FzExpiresOn => "fz_abgelaufen",
            Self::FzVerifierFirst => "fz_kontrolliert_first",
            Self::FzVerifierSecond => "fz_kontrolliert_second",
            Self::FzVerifiedOn => "fz_kontrolliert_am",
            Self::GsEnrolledOn => "gs_eingetragen",
            Self::GsRenewedOn => "gs_erneuert",
            Self::GsVerifiedBy => "gs_kontrolliert",
            Self::UsEnrolledOn => "us_eingetragen",
            Self::UsExpiresOn => "us_abgelaufen",
            Self::UsVerifiedBy => "us_kontrolliert",
            Self::SveEnrolledOn => "sve_eingetragen",
            Self::SveVerifiedBy => "sve_kontrolliert",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::FirstName => "Vorname",
            Self::Email => "E-Mail",
            Self::PostalAddress => "Postadresse",
            Self::Municipality => "Gemeinde / Freizeit",
            Self::FzEnrolledOn => "Führungszeugnis gültig ab",
            Self::FzExpiresOn => "Führungszeugnis Ablaufdatum",
            Self::FzVerifierFirst => "Führungszeugnis kontrolliert von (Person 1)",
            Self::FzVerifierSecond => "Führungszeugnis kontrolliert von (Person 2)",
            Self::FzVerifiedOn => "Führungszeugnis kontrolliert am",
            Self::GsEnrolledOn => "Grundlagenschulung gültig ab",
            Self::GsRenewedOn => "Grundlagenschulung erneuert am",
            Self::GsVerifiedBy => "Grundlagenschulung kontrolliert von",
            Self::UsEnrolledOn => "Upgradeschulung gültig ab",
            Self::UsExpiresOn => "Upgradeschulung Ablaufdatum",
            Self::UsVerifiedBy => "Upgradeschulung kontrolliert von",
            Self::SveEnrolledOn => "Selbstverpflichtungserklärung gültig ab",
            Self::SveVerifiedBy => "Selbstverpflichtungserklärung kontrolliert von",
        }
    }

    pub const fn is_date(self) -> bool {
        matches!(
            self,
            Self::FzEnrolledOn
                | Self::FzExpiresOn
                | Self::FzVerifiedOn
                | Self::GsEnrolledOn
                | Self::GsRenewedOn
                | Self::UsEnrolledOn
                | Self::UsExpiresOn
                | Self::SveEnrolledOn
        )
    }

    /// Person-name inputs: the two name columns and every "kontrolliert von"
    /// box.
    pub const fn is_name_like(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::FirstName
                | Self::FzVerifierFirst
                | Self::FzVerifierSecond
                | Self::GsVerifiedBy
                | Self::UsVerifiedBy
                | Self::SveVerifiedBy
        )
    }

    /// Expiration dates the form computes itself.
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::FzExpiresOn | Self::UsExpiresOn)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim();
        FormField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| UnknownField(key.to_string()))
    }
}

/// Führungszeugnis columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundCheck {
    #[serde(
        rename = "fz_eingetragen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(
        rename = "fz_abgelaufen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub expires_on: Option<NaiveDate>,
    /// Both verifiers, joined by a single space.
    #[serde(
        rename = "fz_kontrolliert",
        default,
        deserialize_with = "deserialize_optional_text"
    )]
    pub verified_by: Option<String>,
    #[serde(
        rename = "fz_kontrolliert_am",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub verified_on: Option<NaiveDate>,
}

/// Grundlagenschulung columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundationalTraining {
    #[serde(
        rename = "gs_eingetragen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(
        rename = "gs_erneuert",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub renewed_on: Option<NaiveDate>,
    #[serde(
        rename = "gs_kontrolliert",
        default,
        deserialize_with = "deserialize_optional_text"
    )]
    pub verified_by: Option<String>,
}

/// Upgradeschulung columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTraining {
    #[serde(
        rename = "us_eingetragen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(
        rename = "us_abgelaufen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub expires_on: Option<NaiveDate>,
    #[serde(
        rename = "us_kontrolliert",
        default,
        deserialize_with = "deserialize_optional_text"
    )]
    pub verified_by: Option<String>,
}

/// Selbstverpflichtungserklärung columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfCommitment {
    #[serde(
        rename = "sve_eingetragen",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(
        rename = "sve_kontrolliert",
        default,
        deserialize_with = "deserialize_optional_text"
    )]
    pub verified_by: Option<String>,
}

/// One row of the personnel table. Absent values serialize as `null` so the
/// persistence layer always receives every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    #[serde(default)]
    pub id: Option<EmployeeId>,
    pub name: String,
    #[serde(rename = "vorname")]
    pub first_name: String,
    pub email: String,
    #[serde(
        rename = "postadresse",
        default,
        deserialize_with = "super::address::deserialize_optional_address"
    )]
    pub postal_address: Option<PostalAddress>,
    #[serde(
        rename = "gemeinde_freizeit",
        default,
        deserialize_with = "deserialize_optional_text"
    )]
    pub municipality: Option<String>,
    #[serde(flatten)]
    pub background_check: BackgroundCheck,
    #[serde(flatten)]
    pub foundational_training: FoundationalTraining,
    #[serde(flatten)]
    pub upgrade_training: UpgradeTraining,
    #[serde(flatten)]
    pub self_commitment: SelfCommitment,
    #[serde(rename = "hauptamt", default, deserialize_with = "deserialize_flag")]
    pub is_full_time: bool,
}

impl PersonnelRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.name).trim().to_string()
    }
}

/// Raw values of the edit form. Every input is kept as typed text; parsing
/// happens during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeDraft {
    pub id: Option<EmployeeId>,
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(rename = "vorname", deserialize_with = "deserialize_text")]
    pub first_name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(rename = "postadresse", deserialize_with = "deserialize_text")]
    pub postal_address: String,
    #[serde(rename = "gemeinde_freizeit", deserialize_with = "deserialize_text")]
    pub municipality: String,
    #[serde(rename = "fz_eingetragen", deserialize_with = "deserialize_text")]
    pub fz_enrolled_on: String,
    #[serde(rename = "fz_abgelaufen", deserialize_with = "deserialize_text")]
    pub fz_expires_on: String,
    #[serde(rename = "fz_kontrolliert_first", deserialize_with = "deserialize_text")]
    pub fz_verifier_first: String,
    #[serde(rename = "fz_kontrolliert_second", deserialize_with = "deserialize_text")]
    pub fz_verifier_second: String,
    /// The stored combined column. Only consulted when both verifier boxes
    /// are blank, so database-shaped payloads keep their verifiers.
    #[serde(
        rename = "fz_kontrolliert",
        deserialize_with = "deserialize_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub fz_verified_by: String,
    #[serde(rename = "fz_kontrolliert_am", deserialize_with = "deserialize_text")]
    pub fz_verified_on: String,
    #[serde(rename = "gs_eingetragen", deserialize_with = "deserialize_text")]
    pub gs_enrolled_on: String,
    #[serde(rename = "gs_erneuert", deserialize_with = "deserialize_text")]
    pub gs_renewed_on: String,
    #[serde(rename = "gs_kontrolliert", deserialize_with = "deserialize_text")]
    pub gs_verified_by: String,
    #[serde(rename = "us_eingetragen", deserialize_with = "deserialize_text")]
    pub us_enrolled_on: String,
    #[serde(rename = "us_abgelaufen", deserialize_with = "deserialize_text")]
    pub us_expires_on: String,
    #[serde(rename = "us_kontrolliert", deserialize_with = "deserialize_text")]
    pub us_verified_by: String,
    #[serde(rename = "sve_eingetragen", deserialize_with = "deserialize_text")]
    pub sve_enrolled_on: String,
    #[serde(rename = "sve_kontrolliert", deserialize_with = "deserialize_text")]
    pub sve_verified_by: String,
    #[serde(rename = "hauptamt", deserialize_with = "deserialize_flag")]
    pub is_full_time: bool,
}

impl EmployeeDraft {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::FirstName => &self.first_name,
            FormField::Email => &self.email,
            FormField::PostalAddress => &self.postal_address,
            FormField::Municipality => &self.municipality,
            FormField::FzEnrolledOn => &self.fz_enrolled_on,
            FormField::FzExpiresOn => &self.fz_expires_on,
            FormField::FzVerifierFirst => &self.fz_verifier_first,
            FormField::FzVerifierSecond => &self.fz_verifier_second,
            FormField::FzVerifiedOn => &self.fz_verified_on,
            FormField::GsEnrolledOn => &self.gs_enrolled_on,
            FormField::GsRenewedOn => &self.gs_renewed_on,
            FormField::GsVerifiedBy => &self.gs_verified_by,
            FormField::UsEnrolledOn => &self.us_enrolled_on,
            FormField::UsExpiresOn => &self.us_expires_on,
            FormField::UsVerifiedBy => &self.us_verified_by,
            FormField::SveEnrolledOn => &self.sve_enrolled_on,
            FormField::SveVerifiedBy => &self.sve_verified_by,
        }
    }

    pub(crate) fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::FirstName => &mut self.first_name,
            FormField::Email => &mut self.email,
            FormField::PostalAddress => &mut self.postal_address,
            FormField::Municipality => &mut self.municipality,
            FormField::FzEnrolledOn => &mut self.fz_enrolled_on,
            FormField::FzExpiresOn => &mut self.fz_expires_on,
            FormField::FzVerifierFirst => &mut self.fz_verifier_first,
            FormField::FzVerifierSecond => &mut self.fz_verifier_second,
            FormField::FzVerifiedOn => &mut self.fz_verified_on,
            FormField::GsEnrolledOn => &mut self.gs_enrolled_on,
            FormField::GsRenewedOn => &mut self.gs_renewed_on,
            FormField::GsVerifiedBy => &mut self.gs_verified_by,
            FormField::UsEnrolledOn => &mut self.us_enrolled_on,
            FormField::UsExpiresOn => &mut self.us_expires_on,
            FormField::UsVerifiedBy => &mut self.us_verified_by,
            FormField::SveEnrolledOn => &mut self.sve_enrolled_on,
            FormField::SveVerifiedBy => &mut self.sve_verified_by,
        }
    }

    /// Seed the form from a stored row, splitting the combined
    /// Führungszeugnis verifier column back into its two input boxes.
    pub fn from_record(record: &PersonnelRecord) -> Self {
        let (fz_verifier_first, fz_verifier_second) =
            split_verifiers(record.background_check.verified_by.as_deref().unwrap_or(""));

        Self {
            id: record.id,
            name: record.name.clone(),
            first_name: record.first_name.clone(),
            email: record.email.clone(),
            postal_address: record
                .postal_address
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            municipality: record.municipality.clone().unwrap_or_default(),
            fz_enrolled_on: date_text(record.background_check.enrolled_on),
            fz_expires_on: date_text(record.background_check.expires_on),
            fz_verifier_first,
            fz_verifier_second,
            fz_verified_by: String::new(),
            fz_verified_on: date_text(record.background_check.verified_on),
            gs_enrolled_on: date_text(record.foundational_training.enrolled_on),
            gs_renewed_on: date_text(record.foundational_training.renewed_on),
            gs_verified_by: record
                .foundational_training
                .verified_by
                .clone()
                .unwrap_or_default(),
            us_enrolled_on: date_text(record.upgrade_training.enrolled_on),
            us_expires_on: date_text(record.upgrade_training.expires_on),
            us_verified_by: record.upgrade_training.verified_by.clone().unwrap_or_default(),
            sve_enrolled_on: date_text(record.self_commitment.enrolled_on),
            sve_verified_by: record.self_commitment.verified_by.clone().unwrap_or_default(),
            is_full_time: record.is_full_time,
        }
    }

    /// The two verifier boxes, falling back to the combined column when
    /// both boxes are blank.
    pub fn verifier_boxes(&self) -> (String, String) {
        if self.fz_verifier_first.trim().is_empty() && self.fz_verifier_second.trim().is_empty() {
            split_verifiers(self.fz_verified_by.trim())
        } else {
            (
                self.fz_verifier_first.clone(),
                self.fz_verifier_second.clone(),
            )
        }
    }
}

/// Tokens one and two become the first verifier, tokens three and four the
/// second. Anything past the fourth token is dropped.
pub fn split_verifiers(combined: &str) -> (String, String) {
    let names: Vec<&str> = combined.split(' ').collect();
    if combined.is_empty() {
        return (String::new(), String::new());
    }

    let pair = |first: usize| -> String {
        match names.get(first) {
            Some(given) => format!("{} {}", given, names.get(first + 1).unwrap_or(&"")),
            None => String::new(),
        }
    };

    (pair(0), if names.len() > 2 { pair(2) } else { String::new() })
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "ja" | "yes"
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagInput {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<FlagInput>::deserialize(deserializer)?;
    Ok(match flag {
        Some(FlagInput::Bool(value)) => value,
        Some(FlagInput::Number(value)) => value != 0,
        Some(FlagInput::Text(value)) => parse_flag(&value),
        None => false,
    })
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_input_date(raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'"))),
    }
}
