use crate::infra::{parse_interval, parse_target};
use clap::Args;
use skill_gap::config::{AppConfig, DataConfig};
use skill_gap::error::AppError;
use skill_gap::telemetry;
use skill_gap::workflows::roster::export::{write_gaps_to_path, write_insights_to_path};
use skill_gap::workflows::roster::RosterImporter;
use skill_gap::workflows::skills::catalog::{format_resources, learning_resources};
use skill_gap::workflows::skills::domain::Proficiency;
use skill_gap::workflows::skills::report::role::available_roles;
use skill_gap::workflows::skills::report::views::RoleDeepDive;
use skill_gap::workflows::skills::report::{role_deep_dive, DreamTeamSelection};
use skill_gap::workflows::skills::{
    EmployeeRecord, Grade, InsightRecord, RecommendationAgent, RoleRequirement, SkillGapPipeline,
    SkillGapReport, UnresolvedGradePolicy,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct RosterArgs {
    /// Employee roster CSV (defaults to APP_EMPLOYEES_CSV)
    #[arg(long)]
    pub(crate) employees: Option<PathBuf>,
    /// Role skill requirements CSV (defaults to APP_REQUIREMENTS_CSV)
    #[arg(long)]
    pub(crate) requirements: Option<PathBuf>,
}

impl RosterArgs {
    fn apply(self, mut data: DataConfig) -> DataConfig {
        if let Some(employees) = self.employees {
            data.employees_csv = employees;
        }
        if let Some(requirements) = self.requirements {
            data.requirements_csv = requirements;
        }
        data
    }
}

#[derive(Args, Debug)]
pub(crate) struct GapsArgs {
    #[command(flatten)]
    pub(crate) roster: RosterArgs,
    /// Where to write the training recommendations table
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Print every gap row with suggested learning resources
    #[arg(long)]
    pub(crate) list: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InsightsArgs {
    #[command(flatten)]
    pub(crate) roster: RosterArgs,
    /// Where to write the consultative insights table
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// How to treat gap rows without a roster grade: bucket or drop
    #[arg(long)]
    pub(crate) unresolved_grade: Option<UnresolvedGradePolicy>,
}

#[derive(Args, Debug)]
pub(crate) struct RoleArgs {
    #[command(flatten)]
    pub(crate) roster: RosterArgs,
    /// Role to analyse
    #[arg(long)]
    pub(crate) role: String,
    /// Skills for the dream team plan (defaults to the priority skills)
    #[arg(long = "skill")]
    pub(crate) skills: Vec<String>,
    /// Target level for a skill, as SKILL=LEVEL
    #[arg(long = "target", value_parser = parse_target)]
    pub(crate) targets: Vec<(String, Proficiency)>,
}

#[derive(Args, Debug)]
pub(crate) struct AgentArgs {
    #[command(flatten)]
    pub(crate) roster: RosterArgs,
    /// Minutes between refresh checks (defaults to APP_REFRESH_MINUTES)
    #[arg(long, value_parser = parse_interval)]
    pub(crate) interval_minutes: Option<Duration>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Role for the deep dive section (defaults to the first role on the roster)
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Include every gap row in the output
    #[arg(long)]
    pub(crate) list: bool,
}

pub(crate) fn run_gaps(args: GapsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut data = args.roster.apply(config.data);
    if let Some(output) = args.output {
        data.recommendations_csv = output;
    }

    let report = write_gap_table(&data)?;
    render_gap_summary(&report, args.list);
    println!("\nRecommendations written to {}", data.recommendations_csv.display());
    Ok(())
}

/// Computes the report and writes the recommendations table only.
fn write_gap_table(data: &DataConfig) -> Result<SkillGapReport, AppError> {
    let (report, _) = SkillGapPipeline::from_config(data).compute()?;
    write_gaps_to_path(&data.recommendations_csv, &report.gaps)?;
    Ok(report)
}

pub(crate) fn run_insights(args: InsightsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut data = args.roster.apply(config.data);
    if let Some(policy) = args.unresolved_grade {
        data.unresolved_grade = policy;
    }
    if let Some(output) = args.output {
        data.insights_csv = output;
    }

    let (report, _) = SkillGapPipeline::from_config(&data).compute()?;
    write_insights_to_path(&data.insights_csv, &report.insights)?;

    render_insights(&report.insights);
    println!("\nInsights written to {}", data.insights_csv.display());
    Ok(())
}

pub(crate) fn run_role(args: RoleArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let data = args.roster.apply(config.data);
    let tables = RosterImporter::load(&data.employees_csv, &data.requirements_csv)?;

    let selection = DreamTeamSelection {
        skills: if args.skills.is_empty() {
            None
        } else {
            Some(args.skills)
        },
        targets: args.targets.into_iter().collect(),
    };
    let dive = role_deep_dive(
        &tables.employees,
        &tables.requirements,
        &args.role,
        &selection,
    )?;

    println!(
        "Roles on roster: {}",
        available_roles(&tables.employees).join(", ")
    );
    render_role_report(&dive);
    Ok(())
}

pub(crate) async fn run_agent(args: AgentArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data = args.roster.apply(config.data);
    let period = args.interval_minutes.unwrap_or(data.refresh_interval);
    let agent = RecommendationAgent::new(SkillGapPipeline::from_config(&data), period);

    agent
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "unable to listen for ctrl-c; stopping agent");
            }
        })
        .await;
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let employees = demo_employees();
    let requirements = demo_requirements();
    let report =
        SkillGapReport::build(&employees, &requirements, UnresolvedGradePolicy::Bucket)?;

    println!("Skill gap demo ({} employees, built-in roster)", employees.len());
    render_gap_summary(&report, args.list);

    println!();
    render_insights(&report.insights);

    let roles = available_roles(&employees);
    let role = match args.role.or_else(|| roles.first().cloned()) {
        Some(role) => role,
        None => return Ok(()),
    };
    let dive = role_deep_dive(
        &employees,
        &requirements,
        &role,
        &DreamTeamSelection::default(),
    )?;

    println!();
    render_role_report(&dive);
    Ok(())
}

pub(crate) fn render_gap_summary(report: &SkillGapReport, list: bool) {
    let totals = report.totals();
    println!("\nSkill gaps");
    println!(
        "- {} employees | {} with gaps | {} gap rows | {} gap points",
        totals.employees, totals.employees_with_gaps, totals.gap_rows, totals.total_gap_points
    );
    println!(
        "- Estimated savings across all groups: {:.2}",
        totals.estimated_cost_savings
    );

    let mut by_skill: BTreeMap<&str, usize> = BTreeMap::new();
    for gap in &report.gaps {
        *by_skill.entry(gap.skill.as_str()).or_default() += 1;
    }
    if !by_skill.is_empty() {
        println!("Gap distribution by skill:");
        for (skill, count) in by_skill {
            println!("  - {skill}: {count}");
        }
    }

    if list {
        println!("Training recommendations:");
        for gap in &report.gaps {
            println!(
                "  - #{} {} ({}) {}: {} -> {} | {}",
                gap.employee_id,
                gap.name,
                gap.role,
                gap.skill,
                gap.current_proficiency,
                gap.required_proficiency,
                gap.recommended_training
            );
            let resources = format_resources(&learning_resources(&gap.skill));
            for line in resources.lines() {
                println!("      {line}");
            }
        }
    }
}

pub(crate) fn render_insights(insights: &[InsightRecord]) {
    if insights.is_empty() {
        println!("Consultative insights: none (no gaps found)");
        return;
    }

    println!("Consultative insights");
    for insight in insights {
        println!(
            "- {} / {}: avg gap {:.2} | expected improvement {:.2} | {} employees | est. savings {:.2}",
            insight.role,
            insight.grade_label(),
            insight.average_gap,
            insight.expected_improvement,
            insight.num_employees,
            insight.estimated_cost_savings
        );
    }
}

pub(crate) fn render_role_report(dive: &RoleDeepDive) {
    println!("Role deep dive: {} ({} on roster)", dive.role, dive.headcount);

    println!("Skill tower (filled / required)");
    for entry in &dive.skill_tower {
        println!(
            "  - {}: {} / {} | avg {:.2} | missing {}",
            entry.skill, entry.filled, entry.required, entry.average_proficiency, entry.missing
        );
    }

    if !dive.priority_skills.is_empty() {
        println!("Priority skills: {}", dive.priority_skills.join(", "));
    }

    println!("Dream team plan");
    for entry in &dive.dream_team.entries {
        println!(
            "  - {}: current {} -> target {} | build {}",
            entry.skill, entry.current, entry.target, entry.build_gap
        );
    }
    println!(
        "  Total blocks needed: {}",
        dive.dream_team.total_build_gap
    );

    if let Some(advice) = &dive.advice {
        println!("Average missing per skill: {:.2}", advice.average_missing);
        for priority in &advice.priorities {
            println!(
                "  - {} (missing {}): {} - {}",
                priority.skill,
                priority.missing,
                priority.approach.label(),
                priority.advice
            );
        }
        println!("Action plan");
        for (step, action) in advice.action_plan.iter().enumerate() {
            println!("  {}. {}", step + 1, action);
        }
    }
}

fn demo_requirements() -> Vec<RoleRequirement> {
    [
        ("Software Engineer", ["Python", "Algorithms", "System Design"]),
        ("Data Analyst", ["SQL", "Statistics", "Data Visualization"]),
        ("Product Manager", ["Market Analysis", "Communication", "Roadmapping"]),
    ]
    .into_iter()
    .flat_map(|(role, skills)| {
        skills
            .into_iter()
            .map(move |skill| RoleRequirement::new(role, skill, 5))
    })
    .collect()
}

fn demo_employees() -> Vec<EmployeeRecord> {
    vec![
        EmployeeRecord::new("1", "Employee_1", "Software Engineer", Grade::Junior)
            .with_skill("Python", 3)
            .with_skill("Algorithms", 2)
            .with_skill("System Design", 1),
        EmployeeRecord::new("2", "Employee_2", "Software Engineer", Grade::Junior)
            .with_skill("Python", 1)
            .with_skill("Algorithms", 5)
            .with_skill("System Design", 2),
        EmployeeRecord::new("3", "Employee_3", "Software Engineer", Grade::Senior)
            .with_skill("Python", 5)
            .with_skill("Algorithms", 4)
            .with_skill("System Design", 5),
        EmployeeRecord::new("4", "Employee_4", "Data Analyst", Grade::Mid)
            .with_skill("SQL", 2)
            .with_skill("Statistics", 3)
            .with_skill("Data Visualization", 4),
        EmployeeRecord::new("5", "Employee_5", "Data Analyst", Grade::Senior)
            .with_skill("SQL", 5)
            .with_skill("Statistics", 4),
        EmployeeRecord::new("6", "Employee_6", "Product Manager", Grade::Mid)
            .with_skill("Market Analysis", 2)
            .with_skill("Communication", 4)
            .with_skill("Roadmapping", 3),
    ]
}
