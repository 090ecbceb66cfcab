use crate::demo::{
    run_agent, run_demo, run_gaps, run_insights, run_role, AgentArgs, DemoArgs, GapsArgs,
    InsightsArgs, RoleArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skill_gap::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Skill Gap Advisor",
    about = "Compute skill gaps, reskilling insights and role deep dives from employee rosters",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute per-employee skill gaps and write the training recommendations table
    Gaps(GapsArgs),
    /// Summarize gaps per role and grade with projected cost savings
    Insights(InsightsArgs),
    /// Show the skill tower, dream team plan and advice for one role
    Role(RoleArgs),
    /// Refresh the recommendation tables whenever the inputs change
    Agent(AgentArgs),
    /// Run gaps, insights and a role deep dive over a built-in roster
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Gaps(args) => run_gaps(args),
        Command::Insights(args) => run_insights(args),
        Command::Role(args) => run_role(args),
        Command::Agent(args) => run_agent(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
