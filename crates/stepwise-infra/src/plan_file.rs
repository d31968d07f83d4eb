//! Plan file loading.
//!
//! Plan files are YAML documents in the [`PlanFile`] format. Parsing rejects
//! unknown step kinds and executor types; validation then checks the rules
//! serde cannot express.

use std::path::{Path, PathBuf};

use stepwise_types::plan::{PlanFile, PlanValidationError};
use thiserror::Error;

/// Errors from reading, parsing or validating a plan file.
#[derive(Debug, Error)]
pub enum PlanFileError {
    #[error("failed to read plan file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("invalid plan: {0}")]
    Invalid(#[from] PlanValidationError),
}

/// Parse and validate a plan from a YAML string.
pub fn parse_plan_yaml(yaml: &str) -> Result<PlanFile, PlanFileError> {
    let plan: PlanFile = serde_yaml_ng::from_str(yaml)?;
    plan.validate()?;
    Ok(plan)
}

/// Serialize a plan to YAML.
pub fn serialize_plan_yaml(plan: &PlanFile) -> Result<String, PlanFileError> {
    Ok(serde_yaml_ng::to_string(plan)?)
}

/// Load, parse and validate a plan file.
pub async fn load_plan_file(path: &Path) -> Result<PlanFile, PlanFileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PlanFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let plan = parse_plan_yaml(&content)?;
    tracing::debug!(
        path = %path.display(),
        plan = %plan.name,
        steps = plan.steps.len(),
        "plan file loaded"
    );
    Ok(plan)
}
