use df_project::ProjectError;
use df_pump::PumpError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Pump error: {0}")]
    Pump(#[from] PumpError),

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Connector {0} is not linked")]
    NotLinked(String),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),
}

pub type CliResult<T> = Result<T, CliError>;
