//! Capacity Tracker Validation Rules
//!
//! Rules checked on every write, before anything reaches the database.
//! The storage engine does not enforce any of them.
//!
//! # Rules Implemented
//!
//! 1. **Required names**: projects, task groups, metrics and employees need a
//!    non-blank name on create
//! 2. **Platform keys**: every `countryPlatforms` key is one of the project's
//!    countries
//! 3. **Assigned projects**: employee assignments reference existing projects
//! 4. **Assigned countries**: per-project assignment countries are a subset of
//!    that project's countries

use capacity_core::{Assignments, CountryPlatforms, EntityKind};

use crate::error::{DbError, DbResult};

/// Validation rule identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Name must not be blank
    RequiredName,
    /// Platform keys must be project countries
    PlatformOutsideCountries,
    /// Assignment references a missing project
    UnknownAssignedProject,
    /// Assignment country outside the project's countries
    CountryOutsideProject,
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredName => write!(f, "Name is required"),
            Self::PlatformOutsideCountries => {
                write!(f, "Platform entries must belong to a project country")
            }
            Self::UnknownAssignedProject => write!(f, "Assigned project does not exist"),
            Self::CountryOutsideProject => {
                write!(f, "Assigned countries must belong to the project")
            }
        }
    }
}

/// Validates that a name is present on create.
///
/// Returns the name unchanged.
pub fn validate_name(kind: EntityKind, name: String) -> DbResult<String> {
    if name.trim().is_empty() {
        return Err(DbError::Validation(format!(
            "{}: {} name must not be empty",
            ValidationRule::RequiredName,
            kind
        )));
    }
    Ok(name)
}

/// Picks the name for an update: an absent or blank name keeps `current`.
pub fn name_or_keep(update: Option<String>, current: String) -> String {
    match update {
        Some(name) if !name.trim().is_empty() => name,
        _ => current,
    }
}

/// Validates that every platform key is one of `countries`.
pub fn validate_platforms(countries: &[String], platforms: &CountryPlatforms) -> DbResult<()> {
    if let Some(stray) = platforms.keys().find(|k| !countries.contains(k)) {
        return Err(DbError::Validation(format!(
            "{}: '{}' is not one of the project's countries",
            ValidationRule::PlatformOutsideCountries,
            stray
        )));
    }
    Ok(())
}

/// Drops platform entries for countries no longer on the project.
pub fn prune_platforms(platforms: CountryPlatforms, countries: &[String]) -> CountryPlatforms {
    platforms
        .into_iter()
        .filter(|(country, _)| countries.contains(country))
        .collect()
}

/// Validates employee assignments against the stored projects.
///
/// # Arguments
/// * `assignments` - The assignments to write
/// * `project_countries` - Looks up a project's countries; `None` when the
///   project does not exist
pub fn validate_assignments<F>(assignments: &Assignments, mut project_countries: F) -> DbResult<()>
where
    F: FnMut(&str) -> DbResult<Option<Vec<String>>>,
{
    for assignment in assignments.iter() {
        let Some(countries) = project_countries(&assignment.project_id)? else {
            return Err(DbError::Validation(format!(
                "{}: '{}'",
                ValidationRule::UnknownAssignedProject,
                assignment.project_id
            )));
        };
        if let Some(stray) = assignment.countries.iter().find(|c| !countries.contains(c)) {
            return Err(DbError::Validation(format!(
                "{}: '{}' is not a country of project '{}'",
                ValidationRule::CountryOutsideProject,
                stray,
                assignment.project_id
            )));
        }
    }
    Ok(())
}
