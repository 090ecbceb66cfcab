use super::super::domain::{
    round2, EmployeeId, EmployeeRecord, Grade, DEFAULT_COST_FACTOR, TRAINING_EFFECTIVENESS,
};
use super::super::gaps::GapRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// What to do with gap rows whose (EmployeeID, Role) has no roster entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedGradePolicy {
    /// Group them under an explicit unknown grade.
    #[default]
    Bucket,
    /// Leave them out of the insight table.
    Drop,
}

impl FromStr for UnresolvedGradePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bucket" | "unknown" => Ok(Self::Bucket),
            "drop" => Ok(Self::Drop),
            other => Err(format!(
                "unsupported unresolved grade policy '{other}' (expected 'bucket' or 'drop')"
            )),
        }
    }
}

impl fmt::Display for UnresolvedGradePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket => f.write_str("bucket"),
            Self::Drop => f.write_str("drop"),
        }
    }
}

/// Role/grade level summary of skill gaps with a projected saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub role: String,
    /// `None` when the gap rows could not be joined to a roster grade.
    pub grade: Option<Grade>,
    pub average_gap: f64,
    pub expected_improvement: f64,
    pub num_employees: usize,
    pub estimated_cost_savings: f64,
}

impl InsightRecord {
    pub fn grade_label(&self) -> &str {
        self.grade.as_ref().map(Grade::label).unwrap_or("Unknown")
    }

    pub fn cost_factor(&self) -> f64 {
        self.grade
            .as_ref()
            .map(Grade::cost_factor)
            .unwrap_or(DEFAULT_COST_FACTOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GradeKey<'a> {
    Known(&'a Grade),
    Unknown,
}

#[derive(Debug, Default)]
struct GroupTotals<'a> {
    gap_sum: u64,
    rows: u64,
    employees: BTreeSet<&'a EmployeeId>,
}

/// Joins gap rows to roster grades on (EmployeeID, Role) and summarizes each
/// (Role, Grade) group. Groups without gap rows do not appear. Rows come back
/// ordered by role, then grade, with the unknown grade last.
pub fn generate_consultative_insights(
    employees: &[EmployeeRecord],
    gaps: &[GapRecord],
    policy: UnresolvedGradePolicy,
) -> Vec<InsightRecord> {
    let mut grades: HashMap<(&EmployeeId, &str), &Grade> =
        HashMap::with_capacity(employees.len());
    for employee in employees {
        grades
            .entry((&employee.employee_id, employee.role.as_str()))
            .or_insert(&employee.grade);
    }

    let mut groups: BTreeMap<(&str, GradeKey<'_>), GroupTotals<'_>> = BTreeMap::new();
    let mut unresolved = 0usize;

    for gap in gaps {
        let grade = match grades.get(&(&gap.employee_id, gap.role.as_str())) {
            Some(grade) => GradeKey::Known(*grade),
            None => {
                unresolved += 1;
                match policy {
                    UnresolvedGradePolicy::Bucket => GradeKey::Unknown,
                    UnresolvedGradePolicy::Drop => continue,
                }
            }
        };

        let totals = groups.entry((gap.role.as_str(), grade)).or_default();
        totals.gap_sum += u64::from(gap.gap);
        totals.rows += 1;
        totals.employees.insert(&gap.employee_id);
    }

    if unresolved > 0 {
        warn!(
            unresolved,
            %policy,
            "gap rows reference employees missing from the roster"
        );
    }

    let insights: Vec<InsightRecord> = groups
        .into_iter()
        .map(|((role, grade), totals)| {
            let grade = match grade {
                GradeKey::Known(grade) => Some(grade.clone()),
                GradeKey::Unknown => None,
            };
            summarize_group(role, grade, &totals)
        })
        .collect();

    debug!(
        gaps = gaps.len(),
        insights = insights.len(),
        "consultative insights generated"
    );

    insights
}

fn summarize_group(role: &str, grade: Option<Grade>, totals: &GroupTotals<'_>) -> InsightRecord {
    let num_employees = totals.employees.len();
    let average_gap = round2(totals.gap_sum as f64 / totals.rows as f64);
    let cost_factor = grade
        .as_ref()
        .map(Grade::cost_factor)
        .unwrap_or(DEFAULT_COST_FACTOR);

    InsightRecord {
        role: role.to_string(),
        grade,
        average_gap,
        expected_improvement: round2(average_gap * TRAINING_EFFECTIVENESS),
        num_employees,
        estimated_cost_savings: round2(
            average_gap * TRAINING_EFFECTIVENESS * cost_factor * num_employees as f64,
        ),
    }
}
