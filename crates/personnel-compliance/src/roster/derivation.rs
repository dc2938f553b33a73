use chrono::{Months, NaiveDate, NaiveDateTime};

/// Führungszeugnis validity for full-time staff (Hauptamt).
pub const FULL_TIME_BACKGROUND_CHECK_YEARS: u32 = 3;
/// Führungszeugnis validity for everybody else.
pub const BACKGROUND_CHECK_YEARS: u32 = 5;
pub const UPGRADE_TRAINING_YEARS: u32 = 1;

const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
const STORED_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub const fn background_check_validity_years(is_full_time: bool) -> u32 {
    if is_full_time {
        FULL_TIME_BACKGROUND_CHECK_YEARS
    } else {
        BACKGROUND_CHECK_YEARS
    }
}

/// Add whole years, keeping month and day. A 29 February start lands on
/// 28 February when the target year has no leap day.
pub fn derive_expiration(enrolled_on: Option<NaiveDate>, validity_years: u32) -> Option<NaiveDate> {
    let months = validity_years.checked_mul(12)?;
    enrolled_on?.checked_add_months(Months::new(months))
}

/// Like [`derive_expiration`] but for raw form input; blank or unparseable
/// input yields `None`.
pub fn derive_expiration_from_input(raw: &str, validity_years: u32) -> Option<NaiveDate> {
    derive_expiration(parse_input_date(raw), validity_years)
}

/// Accepts the form's `YYYY-MM-DD` as well as the timestamp form the
/// database hands back.
pub fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, INPUT_DATE_FORMAT) {
        return Some(date);
    }

    STORED_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
}

pub fn format_input_date(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}
