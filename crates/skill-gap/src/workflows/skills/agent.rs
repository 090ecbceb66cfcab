use super::pipeline::{PipelineRun, SkillGapPipeline};
use crate::workflows::roster::RosterImportError;
use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Result of a single refresh tick.
#[derive(Debug)]
pub enum RefreshOutcome {
    Refreshed(PipelineRun),
    Unchanged,
    InputsMissing,
}

/// Re-runs the pipeline on a fixed period whenever the input tables change
/// or an output artifact disappears.
#[derive(Debug)]
pub struct RecommendationAgent {
    pipeline: SkillGapPipeline,
    period: Duration,
    last_inputs: Option<[SystemTime; 2]>,
}

impl RecommendationAgent {
    pub fn new(pipeline: SkillGapPipeline, period: Duration) -> Self {
        Self {
            pipeline,
            period,
            last_inputs: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn poll_once(&mut self) -> Result<RefreshOutcome, RosterImportError> {
        let [employees, requirements] = self.pipeline.inputs();
        if !employees.exists() || !requirements.exists() {
            warn!(
                employees = %employees.display(),
                requirements = %requirements.display(),
                "required data files not found"
            );
            return Ok(RefreshOutcome::InputsMissing);
        }

        let stamps = [modified(employees)?, modified(requirements)?];
        let outputs_present = self.pipeline.outputs().iter().all(|path| path.exists());
        if outputs_present && self.last_inputs == Some(stamps) {
            debug!("inputs unchanged since last refresh");
            return Ok(RefreshOutcome::Unchanged);
        }

        let run = self.pipeline.run()?;
        self.last_inputs = Some(stamps);
        Ok(RefreshOutcome::Refreshed(run))
    }

    /// Ticks until `shutdown` resolves. Failed ticks are logged and the
    /// loop keeps going.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(period_secs = self.period.as_secs(), "recommendation agent started");
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => match self.poll_once() {
                    Ok(RefreshOutcome::Refreshed(run)) => info!(
                        gaps = run.gap_rows,
                        insights = run.insight_rows,
                        generated_at = %run.generated_at.to_rfc3339(),
                        "recommendations refreshed"
                    ),
                    Ok(_) => {}
                    Err(err) => error!(error = %err, "refresh failed"),
                },
            }
        }

        info!("recommendation agent stopped");
    }
}

fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
