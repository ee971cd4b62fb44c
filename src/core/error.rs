use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("unknown scenario key: {0}")]
    UnknownScenario(String),

    #[error("unknown scenario field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("exit value must be a finite number >= 0, got {0}")]
    InvalidExitValue(f64),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
