//! Schema migration framework.

use crate::ProjectError;
use crate::schema::ScenarioDef;

pub const LATEST_VERSION: u32 = 2;

/// Bring `scenario` to [`LATEST_VERSION`]. Option lines are folded into
/// `settings` at every version, so a current file may still carry them.
pub fn migrate_to_latest(mut scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    fold_resource_options(&mut scenario);
    Ok(scenario)
}

fn migrate_one_version(scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    match scenario.version {
        1 => migrate_v1_to_v2(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 1 kept ignore/reverse entries only as free-form option lines.
fn migrate_v1_to_v2(mut scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    fold_resource_options(&mut scenario);
    scenario.version = 2;
    Ok(scenario)
}

fn fold_resource_options(scenario: &mut ScenarioDef) {
    let lines = std::mem::take(&mut scenario.resource_options);
    scenario
        .settings
        .apply_resource_options(lines.iter().map(String::as_str));
}
