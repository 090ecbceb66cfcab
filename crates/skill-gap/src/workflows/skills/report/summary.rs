use super::super::catalog::learning_resources;
use super::super::domain::{round2, EmployeeRecord, RoleRequirement, ValidationError};
use super::super::gaps::{calculate_skill_gaps, GapRecord};
use super::insights::{generate_consultative_insights, InsightRecord, UnresolvedGradePolicy};
use super::views::{GapView, InsightView, SkillGapReportSummary, SkillGapTotals};
use std::collections::HashSet;

/// Gap and insight tables computed from one roster snapshot.
#[derive(Debug, Default, Clone)]
pub struct SkillGapReport {
    pub employees: usize,
    pub gaps: Vec<GapRecord>,
    pub insights: Vec<InsightRecord>,
}

impl SkillGapReport {
    pub fn build(
        employees: &[EmployeeRecord],
        requirements: &[RoleRequirement],
        policy: UnresolvedGradePolicy,
    ) -> Result<Self, ValidationError> {
        let gaps = calculate_skill_gaps(employees, requirements)?;
        let insights = generate_consultative_insights(employees, &gaps, policy);

        Ok(Self {
            employees: employees.len(),
            gaps,
            insights,
        })
    }

    pub fn totals(&self) -> SkillGapTotals {
        let employees_with_gaps = self
            .gaps
            .iter()
            .map(|gap| &gap.employee_id)
            .collect::<HashSet<_>>()
            .len();

        SkillGapTotals {
            employees: self.employees,
            employees_with_gaps,
            gap_rows: self.gaps.len(),
            total_gap_points: self.gaps.iter().map(|gap| u64::from(gap.gap)).sum(),
            estimated_cost_savings: round2(
                self.insights
                    .iter()
                    .map(|insight| insight.estimated_cost_savings)
                    .sum(),
            ),
        }
    }

    pub fn summary(&self, include_resources: bool) -> SkillGapReportSummary {
        let gaps = self
            .gaps
            .iter()
            .map(|gap| gap_view(gap, include_resources))
            .collect();
        let insights = self.insights.iter().map(insight_view).collect();

        SkillGapReportSummary {
            totals: self.totals(),
            gaps,
            insights,
        }
    }
}

pub fn gap_view(gap: &GapRecord, include_resources: bool) -> GapView {
    GapView {
        employee_id: gap.employee_id.to_string(),
        name: gap.name.clone(),
        role: gap.role.clone(),
        skill: gap.skill.clone(),
        current_proficiency: gap.current_proficiency,
        required_proficiency: gap.required_proficiency,
        gap: gap.gap,
        recommended_training: gap.recommended_training.clone(),
        learning_resources: if include_resources {
            learning_resources(&gap.skill)
        } else {
            Vec::new()
        },
    }
}

pub fn insight_view(insight: &InsightRecord) -> InsightView {
    InsightView {
        role: insight.role.clone(),
        grade: insight.grade_label().to_string(),
        average_gap: insight.average_gap,
        expected_improvement: insight.expected_improvement,
        num_employees: insight.num_employees,
        cost_factor: insight.cost_factor(),
        estimated_cost_savings: insight.estimated_cost_savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::skills::domain::Grade;

    fn roster() -> (Vec<EmployeeRecord>, Vec<RoleRequirement>) {
        let employees = vec![
            EmployeeRecord::new("1", "Ana", "Software Engineer", Grade::Junior)
                .with_skill("Python", 3),
            EmployeeRecord::new("2", "Ben", "Software Engineer", Grade::Junior)
                .with_skill("Python", 1),
            EmployeeRecord::new("3", "Cy", "Software Engineer", Grade::Senior)
                .with_skill("Python", 5),
        ];
        let requirements = vec![RoleRequirement::new("Software Engineer", "Python", 5)];
        (employees, requirements)
    }

    #[test]
    fn totals_roll_up_gaps_and_savings() {
        let (employees, requirements) = roster();
        let report =
            SkillGapReport::build(&employees, &requirements, UnresolvedGradePolicy::Bucket)
                .expect("report builds");

        let totals = report.totals();
        assert_eq!(totals.employees, 3);
        assert_eq!(totals.employees_with_gaps, 2);
        assert_eq!(totals.gap_rows, 2);
        assert_eq!(totals.total_gap_points, 6);
        assert_eq!(totals.estimated_cost_savings, 12600.0);
    }

    #[test]
    fn summary_can_attach_learning_resources() {
        let (employees, requirements) = roster();
        let report =
            SkillGapReport::build(&employees, &requirements, UnresolvedGradePolicy::Bucket)
                .expect("report builds");

        let plain = report.summary(false);
        assert!(plain.gaps.iter().all(|gap| gap.learning_resources.is_empty()));

        let enriched = report.summary(true);
        assert!(enriched
            .gaps
            .iter()
            .all(|gap| gap.learning_resources[0].contains("Python")));
        assert_eq!(enriched.insights[0].grade, "Junior");
        assert_eq!(enriched.insights[0].cost_factor, 3000.0);
    }
}
