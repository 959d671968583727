//! Error types for GlucoRisk

/// Result type alias using GlucoRisk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for GlucoRisk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The trained artifact is missing, corrupt, or incompatible with the schema
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Required inputs were not supplied; lists every missing name
    #[error("missing feature(s): {}", .0.join(", "))]
    MissingFeature(Vec<String>),

    /// An input was outside its declared domain
    #[error("invalid value {value} for feature '{name}'")]
    InvalidFeatureValue { name: String, value: f64 },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Predictor contract violations and other internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new invalid-value error
    pub fn invalid_value(name: impl Into<String>, value: f64) -> Self {
        Self::InvalidFeatureValue {
            name: name.into(),
            value,
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::MissingFeature(_) => "missing_feature",
            Self::InvalidFeatureValue { .. } => "invalid_feature_value",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller can fix this error by correcting its input
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            Self::MissingFeature(_) | Self::InvalidFeatureValue { .. }
        )
    }
}
