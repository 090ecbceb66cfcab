use super::super::domain::{
    round2, EmployeeRecord, Proficiency, RoleRequirement, ValidationError,
};
use super::views::{
    ClosingApproach, ConsultativeAdvice, DreamTeamEntry, DreamTeamPlan, PrioritySkillAdvice,
    RoleDeepDive, SkillTowerEntry,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

pub const PRIORITY_SKILL_LIMIT: usize = 5;
const ADVICE_LIMIT: usize = 3;
const INTERNAL_TRAINING_MAX_GAP: Proficiency = 2;

pub const ACTION_PLAN: [&str; 3] = [
    "Kick off training for skills with gaps of 2 points or less; assign mentors.",
    "Open hiring for skills with gaps above 2 points to speed up capacity build.",
    "Reassess in 3 months and adjust targets as needed.",
];

/// Skills and targets picked for a dream team plan. With no skills the
/// role's priority skills are used; skills without a target aim for the
/// role's required level. A skill listed twice is planned once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DreamTeamSelection {
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub targets: BTreeMap<String, Proficiency>,
}

/// Distinct roles present in the roster, sorted.
pub fn available_roles(employees: &[EmployeeRecord]) -> Vec<String> {
    employees
        .iter()
        .map(|employee| employee.role.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn requirements_for<'a>(
    requirements: &'a [RoleRequirement],
    role: &'a str,
) -> impl Iterator<Item = &'a RoleRequirement> + 'a {
    requirements
        .iter()
        .filter(move |requirement| requirement.role == role)
}

/// Mean proficiency for `skill` across the role's employees; 0 when the
/// role has nobody on the roster.
fn team_average(team: &[&EmployeeRecord], skill: &str) -> f64 {
    if team.is_empty() {
        return 0.0;
    }

    let total: u64 = team
        .iter()
        .map(|employee| u64::from(employee.proficiency(skill)))
        .sum();
    total as f64 / team.len() as f64
}

fn to_blocks(average: f64) -> Proficiency {
    average.round().clamp(0.0, Proficiency::MAX as f64) as Proficiency
}

fn team_for<'a>(employees: &'a [EmployeeRecord], role: &str) -> Vec<&'a EmployeeRecord> {
    employees
        .iter()
        .filter(|employee| employee.role == role)
        .collect()
}

/// Filled versus missing blocks for each skill the role requires, in
/// requirement order.
pub fn skill_tower(
    employees: &[EmployeeRecord],
    requirements: &[RoleRequirement],
    role: &str,
) -> Vec<SkillTowerEntry> {
    let team = team_for(employees, role);
    requirements_for(requirements, role)
        .map(|requirement| {
            let average = team_average(&team, &requirement.skill);
            let filled = to_blocks(average);
            SkillTowerEntry {
                skill: requirement.skill.clone(),
                required: requirement.required_proficiency,
                average_proficiency: round2(average),
                filled,
                missing: requirement.required_proficiency.saturating_sub(filled),
            }
        })
        .collect()
}

fn by_missing_desc(tower: &[SkillTowerEntry]) -> Vec<&SkillTowerEntry> {
    let mut ranked: Vec<&SkillTowerEntry> = tower.iter().collect();
    ranked.sort_by(|a, b| b.missing.cmp(&a.missing));
    ranked
}

/// Skills with the largest missing blocks first, ties kept in requirement order.
pub fn priority_skills(tower: &[SkillTowerEntry], limit: usize) -> Vec<String> {
    by_missing_desc(tower)
        .into_iter()
        .take(limit)
        .map(|entry| entry.skill.clone())
        .collect()
}

pub fn dream_team(
    employees: &[EmployeeRecord],
    requirements: &[RoleRequirement],
    role: &str,
    selection: &DreamTeamSelection,
) -> Result<DreamTeamPlan, ValidationError> {
    let role_requirements: BTreeMap<&str, Proficiency> = requirements_for(requirements, role)
        .map(|requirement| (requirement.skill.as_str(), requirement.required_proficiency))
        .collect();

    let mut chosen = match &selection.skills {
        Some(skills) => skills.clone(),
        None => priority_skills(
            &skill_tower(employees, requirements, role),
            PRIORITY_SKILL_LIMIT,
        ),
    };
    let mut seen = BTreeSet::new();
    chosen.retain(|skill| seen.insert(skill.clone()));

    for skill in selection.targets.keys().chain(chosen.iter()) {
        if !role_requirements.contains_key(skill.as_str()) {
            return Err(ValidationError::UnknownRoleSkill {
                role: role.to_string(),
                skill: skill.clone(),
            });
        }
    }

    let team = team_for(employees, role);
    let entries: Vec<DreamTeamEntry> = chosen
        .into_iter()
        .map(|skill| {
            let max_required = role_requirements
                .get(skill.as_str())
                .copied()
                .unwrap_or(0);
            let target = selection
                .targets
                .get(&skill)
                .copied()
                .unwrap_or(max_required)
                .min(max_required);
            let current = to_blocks(team_average(&team, &skill));
            DreamTeamEntry {
                build_gap: target.saturating_sub(current),
                skill,
                current,
                target,
            }
        })
        .collect();

    let total_build_gap: u32 = entries.iter().map(|entry| u32::from(entry.build_gap)).sum();

    Ok(DreamTeamPlan {
        entries,
        total_build_gap,
    })
}

/// Next-step guidance derived from the tower; `None` when the role has no
/// requirements.
pub fn consultative_advice(tower: &[SkillTowerEntry]) -> Option<ConsultativeAdvice> {
    if tower.is_empty() {
        return None;
    }

    let total_missing: u64 = tower.iter().map(|entry| u64::from(entry.missing)).sum();
    let average_missing = round2(total_missing as f64 / tower.len() as f64);

    let priorities = by_missing_desc(tower)
        .into_iter()
        .take(ADVICE_LIMIT)
        .map(|entry| {
            let approach = if entry.missing <= INTERNAL_TRAINING_MAX_GAP {
                ClosingApproach::InternalTraining
            } else {
                ClosingApproach::ExternalHiring
            };
            PrioritySkillAdvice {
                skill: entry.skill.clone(),
                missing: entry.missing,
                approach,
                advice: approach.advice(),
            }
        })
        .collect();

    Some(ConsultativeAdvice {
        average_missing,
        priorities,
        action_plan: ACTION_PLAN.to_vec(),
    })
}

/// Everything the role dashboard shows for one role.
pub fn role_deep_dive(
    employees: &[EmployeeRecord],
    requirements: &[RoleRequirement],
    role: &str,
    selection: &DreamTeamSelection,
) -> Result<RoleDeepDive, ValidationError> {
    let headcount = team_for(employees, role).len();
    if headcount == 0 && requirements_for(requirements, role).next().is_none() {
        return Err(ValidationError::UnknownRole {
            role: role.to_string(),
        });
    }

    let tower = skill_tower(employees, requirements, role);
    let priority = priority_skills(&tower, PRIORITY_SKILL_LIMIT);
    let dream_team = dream_team(employees, requirements, role, selection)?;
    let advice = consultative_advice(&tower);

    Ok(RoleDeepDive {
        role: role.to_string(),
        headcount,
        skill_tower: tower,
        priority_skills: priority,
        dream_team,
        advice,
    })
}
