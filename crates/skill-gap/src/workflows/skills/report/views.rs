use super::super::domain::Proficiency;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GapView {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub skill: String,
    pub current_proficiency: Proficiency,
    pub required_proficiency: Proficiency,
    pub gap: Proficiency,
    pub recommended_training: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightView {
    pub role: String,
    pub grade: String,
    pub average_gap: f64,
    pub expected_improvement: f64,
    pub num_employees: usize,
    pub cost_factor: f64,
    pub estimated_cost_savings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillGapTotals {
    pub employees: usize,
    pub employees_with_gaps: usize,
    pub gap_rows: usize,
    pub total_gap_points: u64,
    pub estimated_cost_savings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillGapReportSummary {
    pub totals: SkillGapTotals,
    pub gaps: Vec<GapView>,
    pub insights: Vec<InsightView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillTowerEntry {
    pub skill: String,
    pub required: Proficiency,
    pub average_proficiency: f64,
    pub filled: Proficiency,
    pub missing: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DreamTeamEntry {
    pub skill: String,
    pub current: Proficiency,
    pub target: Proficiency,
    pub build_gap: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DreamTeamPlan {
    pub entries: Vec<DreamTeamEntry>,
    pub total_build_gap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingApproach {
    InternalTraining,
    ExternalHiring,
}

impl ClosingApproach {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InternalTraining => "Internal training",
            Self::ExternalHiring => "External hiring",
        }
    }

    pub const fn advice(self) -> &'static str {
        match self {
            Self::InternalTraining => "Run a short internal training sprint.",
            Self::ExternalHiring => "Launch external hiring alongside training.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrioritySkillAdvice {
    pub skill: String,
    pub missing: Proficiency,
    pub approach: ClosingApproach,
    pub advice: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultativeAdvice {
    pub average_missing: f64,
    pub priorities: Vec<PrioritySkillAdvice>,
    pub action_plan: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleDeepDive {
    pub role: String,
    pub headcount: usize,
    pub skill_tower: Vec<SkillTowerEntry>,
    pub priority_skills: Vec<String>,
    pub dream_team: DreamTeamPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<ConsultativeAdvice>,
}
