use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// A cached or freshly planned path does not start/end at the anchors it was requested for.
    #[error("Geometry inconsistency: {reason}")]
    GeometryInconsistency { reason: String },

    #[error("Not yet implemented: {operation}")]
    NotYetImplemented { operation: String },

    #[error("Teammate not known: {id}")]
    MissingTeammate { id: u32 },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Topological map stage error: expected {expected}, found {actual}")]
    InvalidStage { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event store error: {0}")]
    EventStore(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
