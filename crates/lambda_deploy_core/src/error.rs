use std::path::PathBuf;

use crate::pipeline::PipelineStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AlreadyExists,
    NotFound,
    InvalidVersion,
    InvalidParameter,
    MalformedResponse,
    Service,
}

impl ProviderErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::InvalidVersion => "invalid_version",
            Self::InvalidParameter => "invalid_parameter",
            Self::MalformedResponse => "malformed_response",
            Self::Service => "service_error",
        }
    }
}

/// A failure reported by a function provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::AlreadyExists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn invalid_version(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidVersion, message)
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidParameter, message)
    }

    pub fn malformed_response(field: &str) -> Self {
        Self::new(
            ProviderErrorKind::MalformedResponse,
            format!("response is missing {field}"),
        )
    }

    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug)]
pub enum DeployError {
    Archive {
        path: PathBuf,
        message: String,
    },
    Provider(ProviderError),
    /// The invocation completed but the function itself reported an error.
    FunctionFailed {
        function_name: String,
        kind: String,
        payload: String,
    },
    Stage {
        stage: PipelineStage,
        source: Box<DeployError>,
    },
}

impl DeployError {
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stage at which the pipeline halted, if the error came from a pipeline run.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(error) => Some(error),
            Self::Stage { source, .. } => source.provider_error(),
            _ => None,
        }
    }

    pub fn root(&self) -> &DeployError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl std::fmt::Display for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive { path, message } => {
                write!(f, "failed to package '{}': {message}", path.display())
            }
            Self::Provider(error) => write!(f, "provider request failed: {error}"),
            Self::FunctionFailed {
                function_name,
                kind,
                payload,
            } => write!(
                f,
                "function '{function_name}' reported a {kind} error: {payload}"
            ),
            Self::Stage { stage, source } => {
                write!(f, "deployment halted while {}: {source}", stage.as_str())
            }
        }
    }
}

impl std::error::Error for DeployError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(error) => Some(error),
            Self::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ProviderError> for DeployError {
    fn from(error: ProviderError) -> Self {
        Self::Provider(error)
    }
}
