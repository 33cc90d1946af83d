use singularity_core::error::codes;
use thiserror::Error;

use crate::config::TOKEN_ENV;

/// Failures talking to the remote API, or the setup needed to do so.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Configuration(String),

    #[error("Singularity API returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Failed to reach Singularity API: {0}")]
    Transport(String),

    #[error("Singularity API did not respond within {0} seconds")]
    Timeout(u64),

    #[error("Singularity API sent an unreadable response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn missing_token() -> Self {
        Self::Configuration(format!(
            "{TOKEN_ENV} environment variable is required. \
             Get your token at https://me.singularity-app.com and export it, \
             or pass --token."
        ))
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Configuration(_) => codes::CONFIGURATION_ERROR,
            ClientError::Remote { .. } => codes::REMOTE_REQUEST_FAILED,
            ClientError::Transport(_) => codes::CONNECTION_ERROR,
            ClientError::Timeout(_) => codes::TIMEOUT,
            ClientError::Decode(_) => codes::RESPONSE_ERROR,
        }
    }
}

/// Failures of a single tool call. All of them become an error result for the
/// caller; none of them stop the server.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ToolError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ToolError::UnknownOperation(_) => codes::UNKNOWN_TOOL,
            ToolError::MissingArgument(_) => codes::MISSING_ARGUMENT,
            ToolError::InvalidArgument { .. } => codes::VALIDATION_FAILED,
            ToolError::Client(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_single_readable_lines() {
        let err = ToolError::from(ClientError::Remote {
            status: 404,
            message: "Task not found".to_string(),
        });
        assert_eq!(err.to_string(), "Singularity API returned 404: Task not found");
        assert_eq!(err.code(), codes::REMOTE_REQUEST_FAILED);

        let err = ToolError::UnknownOperation("fly_to_moon".to_string());
        assert_eq!(err.to_string(), "Unknown tool: fly_to_moon");
    }

    #[test]
    fn missing_token_names_the_environment_variable() {
        let err = ClientError::missing_token();
        assert!(err.to_string().contains("SINGULARITY_API_TOKEN"));
        assert!(!err.to_string().contains('\n'));
        assert_eq!(err.code(), codes::CONFIGURATION_ERROR);
    }
}
