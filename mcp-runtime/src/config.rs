use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use singularity_core::time::LocalZone;

use crate::client::SingularityClient;
use crate::error::ClientError;
use crate::transport::HttpTransport;

pub const DEFAULT_API_URL: &str = "https://api.singularity-app.com/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_ENV: &str = "SINGULARITY_API_TOKEN";

/// Everything needed to reach the remote API. Built once at process start.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Zone whose calendar defines "today" for date-derived operations.
    pub zone: LocalZone,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            zone: LocalZone::Host,
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("zone", &self.zone.describe())
            .finish()
    }
}

impl RuntimeConfig {
    pub fn require_token(&self) -> Result<&str, ClientError> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(ClientError::missing_token)
    }

    /// Builds the HTTP-backed client. Fails fast when no token is configured.
    pub fn connect(&self) -> Result<SingularityClient, ClientError> {
        let token = self.require_token()?;
        let transport = HttpTransport::new(&self.api_url, token.to_string(), self.timeout)?;
        Ok(SingularityClient::new(Arc::new(transport), self.zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_a_configuration_error() {
        let config = RuntimeConfig {
            token: Some("   ".to_string()),
            ..RuntimeConfig::default()
        };
        let err = config.connect().err().expect("blank token must be rejected");
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = RuntimeConfig {
            token: Some("secret-token".to_string()),
            ..RuntimeConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn token_is_trimmed() {
        let config = RuntimeConfig {
            token: Some(" abc \n".to_string()),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.require_token().unwrap(), "abc");
    }
}
