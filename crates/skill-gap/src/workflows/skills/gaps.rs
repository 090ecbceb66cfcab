use super::domain::{EmployeeId, EmployeeRecord, Proficiency, RoleRequirement, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One uncovered requirement for one employee. `gap` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRecord {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: String,
    pub skill: String,
    pub current_proficiency: Proficiency,
    pub required_proficiency: Proficiency,
    pub gap: Proficiency,
    pub recommended_training: String,
}

pub fn recommended_training(skill: &str) -> String {
    format!("Advanced {skill} Training")
}

/// Requirement rows grouped by role, keeping table order inside each role.
#[derive(Debug, Default)]
pub struct RequirementIndex<'a> {
    by_role: HashMap<&'a str, Vec<&'a RoleRequirement>>,
}

impl<'a> RequirementIndex<'a> {
    pub fn build(requirements: &'a [RoleRequirement]) -> Result<Self, ValidationError> {
        let mut by_role: HashMap<&'a str, Vec<&'a RoleRequirement>> = HashMap::new();
        let mut seen: HashSet<(&'a str, &'a str)> = HashSet::new();

        for requirement in requirements {
            if requirement.required_proficiency == 0 {
                return Err(ValidationError::InvalidRequirement {
                    role: requirement.role.clone(),
                    skill: requirement.skill.clone(),
                    value: requirement.required_proficiency.to_string(),
                });
            }

            if !seen.insert((requirement.role.as_str(), requirement.skill.as_str())) {
                return Err(ValidationError::DuplicateRequirement {
                    role: requirement.role.clone(),
                    skill: requirement.skill.clone(),
                });
            }

            by_role
                .entry(requirement.role.as_str())
                .or_default()
                .push(requirement);
        }

        Ok(Self { by_role })
    }

    pub fn for_role(&self, role: &str) -> &[&'a RoleRequirement] {
        self.by_role.get(role).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Emits one [`GapRecord`] per (employee, required skill) whose current level
/// falls short. Rows follow employee input order, then requirement order
/// within the employee's role. Employees whose role has no requirements
/// contribute nothing.
pub fn calculate_skill_gaps(
    employees: &[EmployeeRecord],
    requirements: &[RoleRequirement],
) -> Result<Vec<GapRecord>, ValidationError> {
    let index = RequirementIndex::build(requirements)?;
    Ok(gaps_with_index(employees, &index))
}

pub fn gaps_with_index(
    employees: &[EmployeeRecord],
    index: &RequirementIndex<'_>,
) -> Vec<GapRecord> {
    let mut gaps = Vec::new();
    let mut uncovered_roles = 0usize;

    for employee in employees {
        let role_requirements = index.for_role(&employee.role);
        if role_requirements.is_empty() {
            uncovered_roles += 1;
            continue;
        }

        for requirement in role_requirements {
            let current = employee.proficiency(&requirement.skill);
            let Some(gap) = requirement
                .required_proficiency
                .checked_sub(current)
                .filter(|gap| *gap > 0)
            else {
                continue;
            };

            gaps.push(GapRecord {
                employee_id: employee.employee_id.clone(),
                name: employee.name.clone(),
                role: employee.role.clone(),
                skill: requirement.skill.clone(),
                current_proficiency: current,
                required_proficiency: requirement.required_proficiency,
                gap,
                recommended_training: recommended_training(&requirement.skill),
            });
        }
    }

    debug!(
        employees = employees.len(),
        gaps = gaps.len(),
        employees_without_requirements = uncovered_roles,
        "skill gaps calculated"
    );

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::skills::domain::Grade;

    fn analyst(id: &str, sql: Proficiency) -> EmployeeRecord {
        EmployeeRecord::new(id, format!("Analyst {id}"), "Data Analyst", Grade::Junior)
            .with_skill("SQL", sql)
    }

    fn analyst_requirements() -> Vec<RoleRequirement> {
        vec![
            RoleRequirement::new("Data Analyst", "SQL", 5),
            RoleRequirement::new("Data Analyst", "Statistics", 4),
        ]
    }

    #[test]
    fn shortfall_produces_gap_with_training_label() {
        let employees = vec![analyst("1", 2)];
        let requirements = vec![RoleRequirement::new("Data Analyst", "SQL", 5)];

        let gaps = calculate_skill_gaps(&employees, &requirements).expect("valid tables");

        assert_eq!(gaps.len(), 1);
        let gap = &gaps[0];
        assert_eq!(gap.employee_id, EmployeeId::new("1"));
        assert_eq!(gap.skill, "SQL");
        assert_eq!(gap.current_proficiency, 2);
        assert_eq!(gap.required_proficiency, 5);
        assert_eq!(gap.gap, 3);
        assert_eq!(gap.recommended_training, "Advanced SQL Training");
    }

    #[test]
    fn met_or_exceeded_requirements_are_not_emitted() {
        let employees = vec![
            analyst("1", 5),
            EmployeeRecord::new("2", "Over", "Data Analyst", Grade::Senior).with_skill("SQL", 5),
        ];
        let requirements = vec![RoleRequirement::new("Data Analyst", "SQL", 4)];

        let gaps = calculate_skill_gaps(&employees, &requirements).expect("valid tables");
        assert!(gaps.is_empty());

        let exact = calculate_skill_gaps(
            &[analyst("3", 5)],
            &[RoleRequirement::new("Data Analyst", "SQL", 5)],
        )
        .expect("valid tables");
        assert!(exact.is_empty());
    }

    #[test]
    fn role_without_requirements_yields_no_rows() {
        let employees = vec![EmployeeRecord::new("9", "Pat", "Chief of Staff", Grade::Mid)];
        let gaps = calculate_skill_gaps(&employees, &analyst_requirements()).expect("valid");
        assert!(gaps.is_empty());
    }

    #[test]
    fn absent_skill_behaves_like_zero() {
        let missing =
            EmployeeRecord::new("1", "A", "Data Analyst", Grade::Mid).with_skill("SQL", 5);
        let zero = missing.clone().with_skill("Statistics", 0);

        let from_missing =
            calculate_skill_gaps(&[missing], &analyst_requirements()).expect("valid");
        let from_zero = calculate_skill_gaps(&[zero], &analyst_requirements()).expect("valid");

        assert_eq!(from_missing, from_zero);
        assert_eq!(from_missing.len(), 1);
        assert_eq!(from_missing[0].current_proficiency, 0);
        assert_eq!(from_missing[0].gap, 4);
    }

    #[test]
    fn output_follows_employee_then_requirement_order() {
        let employees = vec![analyst("20", 1), analyst("10", 1)];
        let gaps = calculate_skill_gaps(&employees, &analyst_requirements()).expect("valid");

        let order: Vec<(&str, &str)> = gaps
            .iter()
            .map(|gap| (gap.employee_id.as_str(), gap.skill.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("20", "SQL"),
                ("20", "Statistics"),
                ("10", "SQL"),
                ("10", "Statistics"),
            ]
        );
    }

    #[test]
    fn every_shortfall_has_exactly_one_positive_row() {
        let requirements = vec![
            RoleRequirement::new("Software Engineer", "Python", 5),
            RoleRequirement::new("Software Engineer", "Algorithms", 3),
            RoleRequirement::new("Data Analyst", "SQL", 4),
        ];
        let employees: Vec<EmployeeRecord> = (0..6u8)
            .map(|level| {
                let role = if level % 2 == 0 { "Software Engineer" } else { "Data Analyst" };
                EmployeeRecord::new(level.to_string().as_str(), "E", role, Grade::Mid)
                    .with_skill("Python", level)
                    .with_skill("SQL", level)
            })
            .collect();

        let gaps = calculate_skill_gaps(&employees, &requirements).expect("valid");
        assert!(gaps.iter().all(|gap| gap.gap > 0));

        for employee in &employees {
            for requirement in requirements.iter().filter(|r| r.role == employee.role) {
                let matches = gaps
                    .iter()
                    .filter(|gap| {
                        gap.employee_id == employee.employee_id && gap.skill == requirement.skill
                    })
                    .count();
                let expected = usize::from(
                    employee.proficiency(&requirement.skill) < requirement.required_proficiency,
                );
                assert_eq!(matches, expected, "{} / {}", employee.employee_id, requirement.skill);
            }
        }
    }

    #[test]
    fn zero_required_level_is_rejected() {
        let err = calculate_skill_gaps(&[], &[RoleRequirement::new("Data Analyst", "SQL", 0)])
            .expect_err("zero requirement rejected");
        assert!(matches!(err, ValidationError::InvalidRequirement { .. }));
    }

    #[test]
    fn duplicate_requirement_rows_are_rejected() {
        let requirements = vec![
            RoleRequirement::new("Data Analyst", "SQL", 5),
            RoleRequirement::new("Data Analyst", "SQL", 3),
        ];
        let err = calculate_skill_gaps(&[], &requirements).expect_err("duplicate rejected");
        assert_eq!(
            err,
            ValidationError::DuplicateRequirement {
                role: "Data Analyst".to_string(),
                skill: "SQL".to_string(),
            }
        );
    }

    #[test]
    fn empty_inputs_are_a_valid_empty_result() {
        let gaps = calculate_skill_gaps(&[], &[]).expect("empty tables are valid");
        assert!(gaps.is_empty());
    }
}
