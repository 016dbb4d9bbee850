use thiserror::Error;

/// Conditions the user can fix by passing different arguments
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("no projects")]
    NoProjects,

    #[error("project not found: {0}")]
    ProjectNotFound(i64),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("missing project name")]
    MissingName,
}

/// Parse a command line argument as a project reference or ID
pub fn parse_reference(arg: &str) -> Result<i64, TrackerError> {
    arg.trim()
        .parse()
        .map_err(|_| TrackerError::InvalidReference(arg.to_string()))
}
