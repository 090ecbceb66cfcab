mod agent;
pub mod catalog;
pub mod domain;
mod gaps;
mod pipeline;
pub mod report;

pub use agent::{RecommendationAgent, RefreshOutcome};
pub use domain::{EmployeeId, EmployeeRecord, Grade, RoleRequirement, ValidationError};
pub use gaps::{calculate_skill_gaps, recommended_training, GapRecord, RequirementIndex};
pub use pipeline::{PipelineRun, SkillGapPipeline};
pub use report::{
    generate_consultative_insights, InsightRecord, SkillGapReport, UnresolvedGradePolicy,
};
