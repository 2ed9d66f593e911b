use thiserror::Error;

/// A required binding input is missing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{engine} index is required. Check that your index exists and is valid.")]
    MissingIndex { engine: String },
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Raised by the engine's import or search call, passed through as is
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

impl BindingError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, BindingError::Configuration(_))
    }
}
