use thiserror::Error;

/// Malformed input and configuration errors, raised at the parse boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Malformed version: {0:?}")]
    MalformedVersion(String),

    #[error("Unknown range operator: {0:?}")]
    UnknownOperator(String),

    #[error("Malformed module id: {0:?} (expected name@version)")]
    MalformedModuleId(String),

    #[error("Unknown strategy: {0:?}")]
    UnknownStrategy(String),
}

/// Failures reported by the collaborators the engine talks to
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Module not registered: {0}")]
    UnknownModule(String),

    #[error("Registry lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
