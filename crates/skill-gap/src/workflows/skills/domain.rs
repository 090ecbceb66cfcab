use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Integer skill level. The meaningful range is 0 through 5.
pub type Proficiency = u8;

/// Share of an average gap expected to close after training.
pub const TRAINING_EFFECTIVENESS: f64 = 0.70;

/// Cost factor applied to grades without a dedicated entry.
pub const DEFAULT_COST_FACTOR: f64 = 5000.0;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for EmployeeId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Seniority band used to weight cost-savings estimates.
///
/// Ordering follows seniority; grades outside the standard three sort after
/// them by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Junior,
    Mid,
    Senior,
    Other(String),
}

impl Grade {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "junior" => Self::Junior,
            "mid" => Self::Mid,
            "senior" => Self::Senior,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Junior => "Junior",
            Self::Mid => "Mid",
            Self::Senior => "Senior",
            Self::Other(name) => name,
        }
    }

    /// Savings per closed gap point for one employee of this grade.
    pub fn cost_factor(&self) -> f64 {
        match self {
            Self::Junior => 3000.0,
            Self::Mid => 5000.0,
            Self::Senior => 8000.0,
            Self::Other(_) => DEFAULT_COST_FACTOR,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the employee roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: String,
    pub grade: Grade,
    #[serde(default)]
    pub skills: BTreeMap<String, Proficiency>,
}

impl EmployeeRecord {
    pub fn new(
        employee_id: impl Into<EmployeeId>,
        name: impl Into<String>,
        role: impl Into<String>,
        grade: Grade,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
            role: role.into(),
            grade,
            skills: BTreeMap::new(),
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>, level: Proficiency) -> Self {
        self.skills.insert(skill.into(), level);
        self
    }

    /// Current level for `skill`; a skill the employee has no entry for is 0.
    pub fn proficiency(&self, skill: &str) -> Proficiency {
        self.skills.get(skill).copied().unwrap_or(0)
    }
}

/// A (role, skill, required level) row of the requirement table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role: String,
    pub skill: String,
    pub required_proficiency: Proficiency,
}

impl RoleRequirement {
    pub fn new(
        role: impl Into<String>,
        skill: impl Into<String>,
        required_proficiency: Proficiency,
    ) -> Self {
        Self {
            role: role.into(),
            skill: skill.into(),
            required_proficiency,
        }
    }
}

/// Input tables that are structurally or semantically malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("{table} table line {line}: column '{column}' must not be blank")]
    BlankField {
        table: &'static str,
        line: u64,
        column: &'static str,
    },
    #[error("employee {employee_id}: invalid proficiency '{value}' for skill '{skill}'")]
    InvalidProficiency {
        employee_id: String,
        skill: String,
        value: String,
    },
    #[error("requirement {role}/{skill}: required proficiency '{value}' must be a positive integer")]
    InvalidRequirement {
        role: String,
        skill: String,
        value: String,
    },
    #[error("requirement {role}/{skill} is listed more than once")]
    DuplicateRequirement { role: String, skill: String },
    #[error("skill '{skill}' is not required for role '{role}'")]
    UnknownRoleSkill { role: String, skill: String },
    #[error("role '{role}' has neither employees nor requirements")]
    UnknownRole { role: String },
    #[error("inline {provided} table was sent without the {missing} table")]
    IncompleteInlineRoster {
        provided: &'static str,
        missing: &'static str,
    },
}

/// Parses a proficiency cell. Integer-valued decimals such as `3.0` are
/// accepted.
pub(crate) fn parse_level(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Some(value as i64),
        _ => None,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parse_is_case_insensitive_and_keeps_custom_bands() {
        assert_eq!(Grade::parse(" junior "), Grade::Junior);
        assert_eq!(Grade::parse("MID"), Grade::Mid);
        assert_eq!(Grade::parse("Senior"), Grade::Senior);
        assert_eq!(Grade::parse("Principal"), Grade::Other("Principal".to_string()));
    }

    #[test]
    fn cost_factors_match_grade_table() {
        assert_eq!(Grade::Junior.cost_factor(), 3000.0);
        assert_eq!(Grade::Mid.cost_factor(), 5000.0);
        assert_eq!(Grade::Senior.cost_factor(), 8000.0);
        assert_eq!(Grade::Other("Lead".into()).cost_factor(), DEFAULT_COST_FACTOR);
    }

    #[test]
    fn grades_order_by_seniority_then_name() {
        let mut grades = vec![
            Grade::Other("Lead".into()),
            Grade::Senior,
            Grade::Junior,
            Grade::Other("Associate".into()),
            Grade::Mid,
        ];
        grades.sort();
        assert_eq!(
            grades,
            vec![
                Grade::Junior,
                Grade::Mid,
                Grade::Senior,
                Grade::Other("Associate".into()),
                Grade::Other("Lead".into()),
            ]
        );
    }

    #[test]
    fn missing_skill_reads_as_zero() {
        let employee =
            EmployeeRecord::new("1", "Ada", "Data Analyst", Grade::Mid).with_skill("SQL", 4);
        assert_eq!(employee.proficiency("SQL"), 4);
        assert_eq!(employee.proficiency("Statistics"), 0);
    }

    #[test]
    fn parse_level_accepts_integral_decimals_only() {
        assert_eq!(parse_level("3"), Some(3));
        assert_eq!(parse_level(" 4.0 "), Some(4));
        assert_eq!(parse_level("-1"), Some(-1));
        assert_eq!(parse_level("2.5"), None);
        assert_eq!(parse_level("high"), None);
        assert_eq!(parse_level("NaN"), None);
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(2.345_6), 2.35);
        assert_eq!(round2(3.0 * TRAINING_EFFECTIVENESS), 2.1);
    }
}
