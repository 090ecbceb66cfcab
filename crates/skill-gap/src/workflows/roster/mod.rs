pub mod export;
mod normalizer;
mod parser;

use crate::workflows::skills::{
    EmployeeRecord, RequirementIndex, RoleRequirement, ValidationError,
};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub enum RosterImportError {
    MissingInput { path: PathBuf },
    Io(io::Error),
    Csv(csv::Error),
    Validation(ValidationError),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::MissingInput { path } => {
                write!(f, "required input {} not found", path.display())
            }
            RosterImportError::Io(err) => write!(f, "failed to access roster data: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Validation(err) => write!(f, "roster validation failed: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::MissingInput { .. } => None,
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Validation(err) => Some(err),
        }
    }
}

impl From<io::Error> for RosterImportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ValidationError> for RosterImportError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Employee roster and requirement table loaded together.
#[derive(Debug, Clone, Default)]
pub struct RosterTables {
    pub employees: Vec<EmployeeRecord>,
    pub requirements: Vec<RoleRequirement>,
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn employees_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<EmployeeRecord>, RosterImportError> {
        let file = open_input(path.as_ref())?;
        Self::employees_from_reader(file)
    }

    pub fn employees_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<EmployeeRecord>, RosterImportError> {
        parser::parse_employees(reader)
    }

    pub fn requirements_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<RoleRequirement>, RosterImportError> {
        let file = open_input(path.as_ref())?;
        Self::requirements_from_reader(file)
    }

    /// Parses and validates the requirement table; duplicate (Role, Skill)
    /// rows are rejected.
    pub fn requirements_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<RoleRequirement>, RosterImportError> {
        let requirements = parser::parse_requirements(reader)?;
        RequirementIndex::build(&requirements)?;
        Ok(requirements)
    }

    /// Loads both tables. Missing files are reported before either table is
    /// parsed.
    pub fn load<P, Q>(employees: P, requirements: Q) -> Result<RosterTables, RosterImportError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        for path in [employees.as_ref(), requirements.as_ref()] {
            if !path.exists() {
                return Err(RosterImportError::MissingInput {
                    path: path.to_path_buf(),
                });
            }
        }

        let tables = RosterTables {
            employees: Self::employees_from_path(employees)?,
            requirements: Self::requirements_from_path(requirements)?,
        };
        debug!(
            employees = tables.employees.len(),
            requirements = tables.requirements.len(),
            "roster tables loaded"
        );
        Ok(tables)
    }

    pub fn load_from_readers<A: Read, B: Read>(
        employees: A,
        requirements: B,
    ) -> Result<RosterTables, RosterImportError> {
        Ok(RosterTables {
            employees: Self::employees_from_reader(employees)?,
            requirements: Self::requirements_from_reader(requirements)?,
        })
    }
}

fn open_input(path: &Path) -> Result<File, RosterImportError> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => RosterImportError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => RosterImportError::Io(err),
    })
}
