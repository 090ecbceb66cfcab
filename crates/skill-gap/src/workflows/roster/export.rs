use super::RosterImportError;
use crate::workflows::skills::{GapRecord, InsightRecord};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const GAP_COLUMNS: [&str; 8] = [
    "EmployeeID",
    "Name",
    "Role",
    "Skill",
    "CurrentProficiency",
    "RequiredProficiency",
    "Gap",
    "RecommendedTraining",
];

pub const INSIGHT_COLUMNS: [&str; 6] = [
    "Role",
    "Grade",
    "AverageGap",
    "ExpectedImprovement",
    "NumEmployees",
    "EstimatedCostSavings",
];

#[derive(Serialize)]
struct GapRow<'a> {
    employee_id: &'a str,
    name: &'a str,
    role: &'a str,
    skill: &'a str,
    current_proficiency: u8,
    required_proficiency: u8,
    gap: u8,
    recommended_training: &'a str,
}

impl<'a> From<&'a GapRecord> for GapRow<'a> {
    fn from(gap: &'a GapRecord) -> Self {
        Self {
            employee_id: gap.employee_id.as_str(),
            name: &gap.name,
            role: &gap.role,
            skill: &gap.skill,
            current_proficiency: gap.current_proficiency,
            required_proficiency: gap.required_proficiency,
            gap: gap.gap,
            recommended_training: &gap.recommended_training,
        }
    }
}

#[derive(Serialize)]
struct InsightRow<'a> {
    role: &'a str,
    grade: &'a str,
    average_gap: f64,
    expected_improvement: f64,
    num_employees: usize,
    estimated_cost_savings: f64,
}

impl<'a> From<&'a InsightRecord> for InsightRow<'a> {
    fn from(insight: &'a InsightRecord) -> Self {
        Self {
            role: &insight.role,
            grade: insight.grade_label(),
            average_gap: insight.average_gap,
            expected_improvement: insight.expected_improvement,
            num_employees: insight.num_employees,
            estimated_cost_savings: insight.estimated_cost_savings,
        }
    }
}

/// Writes the header row even when there are no rows.
fn write_table<W, T, I>(writer: W, columns: &[&str], rows: I) -> csv::Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(columns)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_gaps<W: Write>(writer: W, gaps: &[GapRecord]) -> csv::Result<()> {
    write_table(writer, &GAP_COLUMNS, gaps.iter().map(GapRow::from))
}

pub fn write_insights<W: Write>(writer: W, insights: &[InsightRecord]) -> csv::Result<()> {
    write_table(writer, &INSIGHT_COLUMNS, insights.iter().map(InsightRow::from))
}

/// A table written beside its target but not yet moved into place. Dropping
/// it without [`StagedTable::commit`] removes the staging file.
#[derive(Debug)]
pub struct StagedTable {
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedTable {
    fn write<F>(path: &Path, write: F) -> Result<Self, RosterImportError>
    where
        F: FnOnce(&mut File) -> csv::Result<()>,
    {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if path.is_dir() {
            return Err(io::Error::other(format!("{} is a directory", path.display())).into());
        }

        let staged = Self {
            staging: path.with_extension("csv.partial"),
            target: path.to_path_buf(),
            committed: false,
        };
        let mut file = File::create(&staged.staging)?;
        write(&mut file)?;
        file.sync_all()?;
        Ok(staged)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Renames the staged table over its target.
    pub fn commit(mut self) -> Result<(), RosterImportError> {
        fs::rename(&self.staging, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedTable {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

pub fn stage_gaps<P: AsRef<Path>>(
    path: P,
    gaps: &[GapRecord],
) -> Result<StagedTable, RosterImportError> {
    StagedTable::write(path.as_ref(), |file| write_gaps(file, gaps))
}

pub fn stage_insights<P: AsRef<Path>>(
    path: P,
    insights: &[InsightRecord],
) -> Result<StagedTable, RosterImportError> {
    StagedTable::write(path.as_ref(), |file| write_insights(file, insights))
}

/// Replaces `path` only after the full table is written.
pub fn write_gaps_to_path<P: AsRef<Path>>(
    path: P,
    gaps: &[GapRecord],
) -> Result<(), RosterImportError> {
    stage_gaps(path, gaps)?.commit()
}

pub fn write_insights_to_path<P: AsRef<Path>>(
    path: P,
    insights: &[InsightRecord],
) -> Result<(), RosterImportError> {
    stage_insights(path, insights)?.commit()
}
