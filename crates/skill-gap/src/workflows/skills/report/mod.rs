mod insights;
pub mod role;
mod summary;
pub mod views;

pub use insights::{generate_consultative_insights, InsightRecord, UnresolvedGradePolicy};
pub use role::{role_deep_dive, DreamTeamSelection};
pub use summary::{gap_view, insight_view, SkillGapReport};
