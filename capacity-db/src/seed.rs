//! Default seed data
//!
//! A fresh database gets the "Regulatory Activities 2025" project so the
//! tracker is usable before anything has been configured.

use capacity_core::{NewMetric, NewProject, NewTaskGroup};
use tracing::info;

use crate::error::DbResult;
use crate::repos::{CapacityDatabase, ProjectRepo, WriteMode};
use crate::services::project_service::write_project_tree;

/// Id of the seeded project
pub const SEED_PROJECT_ID: &str = "regulatory-2025";

const SEED_COUNTRIES: [&str; 26] = [
    "Israel",
    "Kuwait",
    "Lebanon",
    "Saudi Arabia",
    "Qatar",
    "Russia",
    "UAE",
    "Morocco",
    "South Africa",
    "Mexico",
    "Argentina",
    "Colombia",
    "Ecuador",
    "Panama",
    "Peru",
    "Uruguay",
    "Venezuela",
    "Dominican Republic",
    "Australia",
    "Indonesia",
    "Malaysia",
    "New Zealand",
    "Philippines",
    "Singapore",
    "Thailand",
    "Vietnam",
];

const SEED_PLATFORMS: [(&str, &str); 26] = [
    ("Israel", "X, Xi, X, SP, Ion"),
    ("Kuwait", "2 Xi"),
    ("Lebanon", "1 Xi"),
    ("Saudi Arabia", "20 Xi"),
    ("Qatar", "7 Xi"),
    ("Russia", "31 Xi"),
    ("UAE", "7 Xi"),
    ("Morocco", ""),
    ("South Africa", "5 X, 8 Xi"),
    ("Mexico", "10 X, 17 Xi"),
    ("Argentina", "2"),
    ("Colombia", "5"),
    ("Ecuador", "4"),
    ("Panama", "2"),
    ("Peru", "1"),
    ("Uruguay", "0"),
    ("Venezuela", "1"),
    ("Dominican Republic", "2"),
    ("Australia", "103"),
    ("Indonesia", "0"),
    ("Malaysia", "17"),
    ("New Zealand", "7"),
    ("Philippines", "5"),
    ("Singapore", "11"),
    ("Thailand", "10"),
    ("Vietnam", "1"),
];

/// (task group id, name, [(metric id, name, unit)])
type SeedGroup = (&'static str, &'static str, &'static [(&'static str, &'static str, &'static str)]);

const SEED_TASK_GROUPS: [SeedGroup; 3] = [
    (
        "assessing-changes",
        "Assessing changes (MRP/CAF/GRA)",
        &[
            ("mrp-time-per-mrp", "MRPs: Time per MRP", "hours per MRP"),
            ("mrp-time-per-pn", "MRPs: Time per PN", "hours per PN"),
            ("minor-change-notification", "Minor Change Notification", "hours per notification"),
            ("major-change-notification", "Major Change Notification", "hours per notification"),
        ],
    ),
    (
        "new-registrations",
        "New Registrations",
        &[
            ("new-registration-per-pn", "New Registration per PN", "hours per PN"),
            ("ha-queries-response", "Health Authority Queries Response", "hours per query"),
        ],
    ),
    (
        "renewals",
        "Renewals",
        &[
            ("license-renewal", "License Renewal", "hours per license"),
            ("monthly-surveillance", "Monthly Surveillance (RSR)", "hours per report"),
        ],
    ),
];

/// The default project, fully nested
pub fn default_project() -> NewProject {
    NewProject {
        id: Some(SEED_PROJECT_ID.to_string()),
        name: "Regulatory Activities 2025".to_string(),
        countries: SEED_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        country_platforms: SEED_PLATFORMS
            .iter()
            .map(|(c, p)| (c.to_string(), p.to_string()))
            .collect(),
        task_groups: SEED_TASK_GROUPS
            .iter()
            .map(|(id, name, metrics)| NewTaskGroup {
                id: Some(id.to_string()),
                name: name.to_string(),
                metrics: metrics
                    .iter()
                    .map(|(id, name, unit)| NewMetric {
                        id: Some(id.to_string()),
                        name: name.to_string(),
                        unit: Some(unit.to_string()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Insert the default project when no project exists yet.
///
/// Returns `true` when seed data was written.
pub async fn seed_if_empty(database: &CapacityDatabase) -> DbResult<bool> {
    let seeded = database
        .transaction(|conn| {
            if ProjectRepo::new(conn).count()? > 0 {
                return Ok(false);
            }
            write_project_tree(conn, default_project(), WriteMode::Insert)?;
            Ok(true)
        })
        .await?;

    if seeded {
        info!(project_id = SEED_PROJECT_ID, "Seeded default project");
    } else {
        info!("Database already has projects, skipping seed");
    }
    Ok(seeded)
}
