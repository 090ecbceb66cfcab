use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use skill_gap::config::{refresh_minutes, DataConfig};
use skill_gap::error::AppError;
use skill_gap::workflows::roster::{RosterImporter, RosterTables};
use skill_gap::workflows::skills::domain::{Proficiency, ValidationError};
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) data: Arc<DataConfig>,
}

/// Where a request's roster tables came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RosterSource {
    Inline,
    Configured,
}

/// Uses the inline tables when both are supplied and the configured files
/// when neither is. Supplying only one table is rejected.
pub(crate) fn load_roster(
    employees_csv: Option<String>,
    requirements_csv: Option<String>,
    data: &DataConfig,
) -> Result<(RosterTables, RosterSource), AppError> {
    match (employees_csv, requirements_csv) {
        (Some(employees), Some(requirements)) => {
            let tables = RosterImporter::load_from_readers(
                Cursor::new(employees.into_bytes()),
                Cursor::new(requirements.into_bytes()),
            )?;
            Ok((tables, RosterSource::Inline))
        }
        (Some(_), None) => Err(incomplete("employees", "requirements")),
        (None, Some(_)) => Err(incomplete("requirements", "employees")),
        (None, None) => {
            let tables = RosterImporter::load(&data.employees_csv, &data.requirements_csv)?;
            Ok((tables, RosterSource::Configured))
        }
    }
}

fn incomplete(provided: &'static str, missing: &'static str) -> AppError {
    ValidationError::IncompleteInlineRoster { provided, missing }.into()
}

/// Parses `SKILL=LEVEL` pairs given on the command line.
pub(crate) fn parse_target(raw: &str) -> Result<(String, Proficiency), String> {
    let (skill, level) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SKILL=LEVEL, got '{raw}'"))?;
    let skill = skill.trim();
    if skill.is_empty() {
        return Err(format!("missing skill name in '{raw}'"));
    }

    let level = level
        .trim()
        .parse::<Proficiency>()
        .map_err(|err| format!("invalid level in '{raw}' ({err})"))?;
    Ok((skill.to_string(), level))
}

pub(crate) fn parse_interval(raw: &str) -> Result<Duration, String> {
    refresh_minutes(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_split_on_last_equals_sign() {
        assert_eq!(
            parse_target("System Design=4"),
            Ok(("System Design".to_string(), 4))
        );
        assert_eq!(parse_target("C=C++=3"), Ok(("C=C++".to_string(), 3)));
        assert!(parse_target("SQL").is_err());
        assert!(parse_target("=3").is_err());
        assert!(parse_target("SQL=-1").is_err());
    }

    #[test]
    fn intervals_must_be_positive_minutes() {
        assert_eq!(parse_interval("5"), Ok(Duration::from_secs(300)));
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("soon").is_err());
    }
}
