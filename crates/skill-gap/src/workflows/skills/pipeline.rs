use super::report::{SkillGapReport, UnresolvedGradePolicy};
use crate::config::DataConfig;
use crate::workflows::roster::export::{stage_gaps, stage_insights};
use crate::workflows::roster::{RosterImportError, RosterImporter};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Input tables and output artifacts for one batch computation.
#[derive(Debug, Clone)]
pub struct SkillGapPipeline {
    employees: PathBuf,
    requirements: PathBuf,
    recommendations: PathBuf,
    insights: PathBuf,
    policy: UnresolvedGradePolicy,
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub employees: usize,
    pub requirements: usize,
    pub gap_rows: usize,
    pub insight_rows: usize,
    pub generated_at: DateTime<Utc>,
    pub report: SkillGapReport,
}

impl SkillGapPipeline {
    pub fn new(
        employees: impl Into<PathBuf>,
        requirements: impl Into<PathBuf>,
        recommendations: impl Into<PathBuf>,
        insights: impl Into<PathBuf>,
    ) -> Self {
        Self {
            employees: employees.into(),
            requirements: requirements.into(),
            recommendations: recommendations.into(),
            insights: insights.into(),
            policy: UnresolvedGradePolicy::default(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(
            &config.employees_csv,
            &config.requirements_csv,
            &config.recommendations_csv,
            &config.insights_csv,
        )
        .with_policy(config.unresolved_grade)
    }

    pub fn with_policy(mut self, policy: UnresolvedGradePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn inputs(&self) -> [&Path; 2] {
        [&self.employees, &self.requirements]
    }

    pub fn outputs(&self) -> [&Path; 2] {
        [&self.recommendations, &self.insights]
    }

    /// Computes the report without touching the output artifacts.
    pub fn compute(&self) -> Result<(SkillGapReport, usize), RosterImportError> {
        let tables = RosterImporter::load(&self.employees, &self.requirements)?;
        let report = SkillGapReport::build(&tables.employees, &tables.requirements, self.policy)?;
        Ok((report, tables.requirements.len()))
    }

    /// Loads both tables, then writes the recommendations and insights
    /// tables. Both tables are staged before either target is replaced; any
    /// failure before the commits leaves the previous artifacts in place.
    pub fn run(&self) -> Result<PipelineRun, RosterImportError> {
        let (report, requirements) = self.compute()?;

        let gaps = stage_gaps(&self.recommendations, &report.gaps)?;
        let insights = stage_insights(&self.insights, &report.insights)?;
        gaps.commit()?;
        insights.commit()?;

        let run = PipelineRun {
            employees: report.employees,
            requirements,
            gap_rows: report.gaps.len(),
            insight_rows: report.insights.len(),
            generated_at: Utc::now(),
            report,
        };
        info!(
            employees = run.employees,
            requirements = run.requirements,
            gaps = run.gap_rows,
            insights = run.insight_rows,
            recommendations_csv = %self.recommendations.display(),
            insights_csv = %self.insights.display(),
            "skill gap pipeline completed"
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const EMPLOYEES: &str = "EmployeeID,Name,Role,Grade,Python\n\
1,Ana,Software Engineer,Junior,3\n\
2,Ben,Software Engineer,Junior,1\n";

    const REQUIREMENTS: &str = "Role,Skill,RequiredProficiency\nSoftware Engineer,Python,5\n";

    fn pipeline_in(dir: &Path) -> SkillGapPipeline {
        SkillGapPipeline::new(
            dir.join("employee_data.csv"),
            dir.join("role_skill_requirements.csv"),
            dir.join("training_recommendations.csv"),
            dir.join("consultative_insights.csv"),
        )
    }

    #[test]
    fn run_writes_both_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("employee_data.csv"), EMPLOYEES).expect("employees");
        fs::write(dir.path().join("role_skill_requirements.csv"), REQUIREMENTS)
            .expect("requirements");

        let run = pipeline_in(dir.path()).run().expect("pipeline runs");
        assert_eq!(run.employees, 2);
        assert_eq!(run.requirements, 1);
        assert_eq!(run.gap_rows, 2);
        assert_eq!(run.insight_rows, 1);
        assert_eq!(run.report.insights[0].estimated_cost_savings, 12600.0);

        let insights =
            fs::read_to_string(dir.path().join("consultative_insights.csv")).expect("insights");
        assert!(insights.contains("Software Engineer,Junior,3.0,2.1,2,12600.0"));
        assert!(dir.path().join("training_recommendations.csv").exists());
    }

    #[test]
    fn invalid_inputs_leave_no_partial_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("employee_data.csv"), EMPLOYEES).expect("employees");
        fs::write(
            dir.path().join("role_skill_requirements.csv"),
            "Role,Skill,RequiredProficiency\nSoftware Engineer,Python,0\n",
        )
        .expect("requirements");

        let pipeline = pipeline_in(dir.path());
        let error = pipeline.run().expect_err("zero requirement rejected");
        assert!(matches!(error, RosterImportError::Validation(_)));
        assert!(pipeline.outputs().iter().all(|path| !path.exists()));
    }

    #[test]
    fn missing_requirements_file_fails_fast() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("employee_data.csv"), EMPLOYEES).expect("employees");

        let error = pipeline_in(dir.path()).run().expect_err("missing input");
        match error {
            RosterImportError::MissingInput { path } => {
                assert!(path.ends_with("role_skill_requirements.csv"));
            }
            other => panic!("expected missing input, got {other:?}"),
        }
    }

    #[test]
    fn failed_insights_write_keeps_previous_recommendations() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("employee_data.csv"), EMPLOYEES).expect("employees");
        fs::write(dir.path().join("role_skill_requirements.csv"), REQUIREMENTS)
            .expect("requirements");

        let pipeline = pipeline_in(dir.path());
        let [recommendations, insights] = pipeline.outputs();
        fs::write(recommendations, "OLD\n").expect("seed recommendations");
        fs::create_dir(insights).expect("blocking directory");
        fs::write(insights.join("keep.txt"), "x").expect("occupant");

        let error = pipeline.run().expect_err("insights target is a directory");
        assert!(matches!(error, RosterImportError::Io(_)));
        assert_eq!(
            fs::read_to_string(recommendations).expect("recommendations"),
            "OLD\n"
        );

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
    }
}
