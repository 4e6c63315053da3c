//! hs-project: scenario file format, validation and migration.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn finish(project: Project) -> ProjectResult<Project> {
    let project = migrate_to_latest(project)?;
    validate_project(&project)?;
    Ok(project)
}

/// Parse, migrate and validate a YAML document.
pub fn from_yaml_str(content: &str) -> ProjectResult<Project> {
    // An empty file is the baseline scenario.
    if content.trim().is_empty() {
        return finish(Project::default());
    }
    finish(serde_yaml::from_str(content)?)
}

pub fn to_yaml_string(project: &Project) -> ProjectResult<String> {
    validate_project(project)?;
    Ok(serde_yaml::to_string(project)?)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, project: &Project) -> ProjectResult<()> {
    let content = to_yaml_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    finish(serde_json::from_str(&content)?)
}

pub fn save_json(path: &std::path::Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}
