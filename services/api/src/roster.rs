use crate::infra::parse_date;
use chrono::NaiveDate;
use clap::Args;
use personnel_compliance::error::AppError;
use personnel_compliance::roster::derivation::UPGRADE_TRAINING_YEARS;
use personnel_compliance::roster::{
    background_check_validity_years, derive_expiration, RosterFinding, RosterImporter,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DeriveArgs {
    /// Führungszeugnis issue date (YYYY-MM-DD)
    #[arg(long = "fz-eingetragen", value_parser = parse_date)]
    pub(crate) fz_enrolled_on: Option<NaiveDate>,
    /// Upgradeschulung date (YYYY-MM-DD)
    #[arg(long = "us-eingetragen", value_parser = parse_date)]
    pub(crate) us_enrolled_on: Option<NaiveDate>,
    /// Person works full time (shorter Führungszeugnis validity)
    #[arg(long = "hauptamt")]
    pub(crate) is_full_time: bool,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RosterCheckArgs {
    /// CSV export of the personnel table
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct DerivedDates {
    pub(crate) fz_abgelaufen: Option<NaiveDate>,
    pub(crate) us_abgelaufen: Option<NaiveDate>,
}

pub(crate) fn derive_dates(args: &DeriveArgs) -> DerivedDates {
    DerivedDates {
        fz_abgelaufen: derive_expiration(
            args.fz_enrolled_on,
            background_check_validity_years(args.is_full_time),
        ),
        us_abgelaufen: derive_expiration(args.us_enrolled_on, UPGRADE_TRAINING_YEARS),
    }
}

pub(crate) fn run_derive(args: DeriveArgs) -> Result<(), AppError> {
    let dates = derive_dates(&args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
        return Ok(());
    }

    let render = |date: Option<NaiveDate>| {
        date.map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("Führungszeugnis Ablaufdatum: {}", render(dates.fz_abgelaufen));
    println!("Upgradeschulung Ablaufdatum: {}", render(dates.us_abgelaufen));
    Ok(())
}

pub(crate) fn run_roster_check(args: RosterCheckArgs) -> Result<(), AppError> {
    let entries = RosterImporter::from_path(&args.csv)?;
    let findings = RosterImporter::check(&entries);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        print!("{}", render_findings(&findings));
    }

    Ok(())
}

pub(crate) fn render_findings(findings: &[RosterFinding]) -> String {
    let mut output = String::new();
    let invalid = findings.iter().filter(|finding| !finding.is_valid()).count();

    for finding in findings.iter().filter(|finding| !finding.is_valid()) {
        let id = finding
            .id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "neu".to_string());
        output.push_str(&format!(
            "Zeile {} ({}, {}): {}\n",
            finding.line,
            id,
            finding.display_name,
            finding.problem.as_deref().unwrap_or_default()
        ));
    }

    output.push_str(&format!(
        "{} von {} Einträgen fehlerhaft\n",
        invalid,
        findings.len()
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use personnel_compliance::roster::EmployeeId;

    fn date(raw: &str) -> NaiveDate {
        parse_date(raw).expect("valid date")
    }

    #[test]
    fn derive_uses_full_time_validity() {
        let mut args = DeriveArgs {
            fz_enrolled_on: Some(date("2024-01-01")),
            us_enrolled_on: None,
            is_full_time: false,
            json: false,
        };
        assert_eq!(derive_dates(&args).fz_abgelaufen, Some(date("2029-01-01")));

        args.is_full_time = true;
        args.us_enrolled_on = Some(date("2024-03-10"));
        assert_eq!(
            derive_dates(&args),
            DerivedDates {
                fz_abgelaufen: Some(date("2027-01-01")),
                us_abgelaufen: Some(date("2025-03-10")),
            }
        );
    }

    #[test]
    fn render_lists_only_failing_rows() {
        let findings = vec![
            RosterFinding {
                line: 2,
                id: Some(EmployeeId(1)),
                display_name: "Anna Müller".to_string(),
                problem: None,
            },
            RosterFinding {
                line: 3,
                id: None,
                display_name: "Jonas Schmidt".to_string(),
                problem: Some("Die Postleitzahl ist falsch eingetragen.".to_string()),
            },
        ];

        assert_eq!(
            render_findings(&findings),
            "Zeile 3 (neu, Jonas Schmidt): Die Postleitzahl ist falsch eingetragen.\n\
             1 von 2 Einträgen fehlerhaft\n"
        );
    }
}
