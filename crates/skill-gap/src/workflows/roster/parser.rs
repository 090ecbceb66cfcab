use super::normalizer::normalize_header;
use crate::workflows::skills::domain::{
    parse_level, EmployeeId, EmployeeRecord, Grade, Proficiency, RoleRequirement, ValidationError,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

use super::RosterImportError;

pub(crate) const EMPLOYEE_TABLE: &str = "employees";
pub(crate) const REQUIREMENT_TABLE: &str = "role requirements";

const EMPLOYEE_ID: &str = "EmployeeID";
const NAME: &str = "Name";
const ROLE: &str = "Role";
const GRADE: &str = "Grade";
const SKILL: &str = "Skill";
const REQUIRED_PROFICIENCY: &str = "RequiredProficiency";

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn column_index(
    headers: &[String],
    table: &'static str,
    column: &'static str,
) -> Result<usize, ValidationError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or(ValidationError::MissingColumn { table, column })
}

struct EmployeeColumns {
    id: usize,
    name: usize,
    role: usize,
    grade: usize,
    skills: Vec<(usize, String)>,
}

impl EmployeeColumns {
    fn resolve(headers: &[String]) -> Result<Self, ValidationError> {
        let id = column_index(headers, EMPLOYEE_TABLE, EMPLOYEE_ID)?;
        let name = column_index(headers, EMPLOYEE_TABLE, NAME)?;
        let role = column_index(headers, EMPLOYEE_TABLE, ROLE)?;
        let grade = column_index(headers, EMPLOYEE_TABLE, GRADE)?;

        let fixed = [id, name, role, grade];
        let skills = headers
            .iter()
            .enumerate()
            .filter(|(index, header)| !fixed.contains(index) && !header.is_empty())
            .map(|(index, header)| (index, header.clone()))
            .collect();

        Ok(Self {
            id,
            name,
            role,
            grade,
            skills,
        })
    }
}

fn required_field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    table: &'static str,
    column: &'static str,
) -> Result<&'r str, ValidationError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::BlankField {
            table,
            line: record.position().map(|pos| pos.line()).unwrap_or_default(),
            column,
        }),
    }
}

/// Reads the wide employee table: four fixed columns, every other column is
/// a skill. Blank skill cells leave the skill absent.
pub(crate) fn parse_employees<R: Read>(
    reader: R,
) -> Result<Vec<EmployeeRecord>, RosterImportError> {
    let mut csv_reader = reader_for(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = EmployeeColumns::resolve(&headers)?;
    let mut employees = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let employee_id = required_field(&record, columns.id, EMPLOYEE_TABLE, EMPLOYEE_ID)?;
        let name = required_field(&record, columns.name, EMPLOYEE_TABLE, NAME)?;
        let role = required_field(&record, columns.role, EMPLOYEE_TABLE, ROLE)?;
        let grade = required_field(&record, columns.grade, EMPLOYEE_TABLE, GRADE)?;

        let mut skills = BTreeMap::new();
        for (index, skill) in &columns.skills {
            let raw = record.get(*index).unwrap_or_default();
            if raw.is_empty() {
                continue;
            }

            let level = parse_level(raw)
                .and_then(|value| Proficiency::try_from(value).ok())
                .ok_or_else(|| ValidationError::InvalidProficiency {
                    employee_id: employee_id.to_string(),
                    skill: skill.clone(),
                    value: raw.to_string(),
                })?;
            skills.insert(skill.clone(), level);
        }

        employees.push(EmployeeRecord {
            employee_id: EmployeeId::new(employee_id),
            name: name.to_string(),
            role: role.to_string(),
            grade: Grade::parse(grade),
            skills,
        });
    }

    Ok(employees)
}

#[derive(Debug, Deserialize)]
struct RequirementRow {
    #[serde(rename = "Role", default)]
    role: String,
    #[serde(rename = "Skill", default)]
    skill: String,
    #[serde(rename = "RequiredProficiency", default)]
    required_proficiency: String,
}

pub(crate) fn parse_requirements<R: Read>(
    reader: R,
) -> Result<Vec<RoleRequirement>, RosterImportError> {
    let mut csv_reader = reader_for(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    for column in [ROLE, SKILL, REQUIRED_PROFICIENCY] {
        column_index(&headers, REQUIREMENT_TABLE, column)?;
    }
    let headers = csv::StringRecord::from(headers);

    let mut requirements = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: RequirementRow = record.deserialize(Some(&headers))?;
        if row.role.is_empty() {
            return Err(blank(line, ROLE).into());
        }
        if row.skill.is_empty() {
            return Err(blank(line, SKILL).into());
        }

        let required_proficiency = parse_level(&row.required_proficiency)
            .filter(|value| *value > 0)
            .and_then(|value| Proficiency::try_from(value).ok())
            .ok_or_else(|| ValidationError::InvalidRequirement {
                role: row.role.clone(),
                skill: row.skill.clone(),
                value: row.required_proficiency.clone(),
            })?;

        requirements.push(RoleRequirement {
            role: row.role,
            skill: row.skill,
            required_proficiency,
        });
    }

    Ok(requirements)
}

fn blank(line: u64, column: &'static str) -> ValidationError {
    ValidationError::BlankField {
        table: REQUIREMENT_TABLE,
        line,
        column,
    }
}
