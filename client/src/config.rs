//! Workspace configuration loaded from the environment.

use std::env;

/// API root used when `CONTACTHUB_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.contactlab.it/hub/v1";

/// Credentials and location of a ContactHub workspace.
#[derive(Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Workspace identifier
    pub workspace_id: String,
    /// Bearer token
    pub token: String,
    /// Node the client acts on behalf of
    pub node_id: String,
    /// API root, without trailing slash
    pub base_url: String,
}

impl WorkspaceConfig {
    pub fn new(
        workspace_id: impl Into<String>,
        token: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            token: token.into(),
            node_id: node_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Load configuration from environment variables, reading a `.env` file
    /// first when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let workspace_id = required("CONTACTHUB_WORKSPACE_ID")?;
        let token = required("CONTACTHUB_TOKEN")?;
        let node_id = required("CONTACTHUB_NODE_ID")?;

        let config = Self::new(workspace_id, token, node_id);
        match env::var("CONTACTHUB_BASE_URL") {
            Ok(url) if url.trim().is_empty() => Err(ConfigError::InvalidBaseUrl(url)),
            Ok(url) if !url.starts_with("http") => Err(ConfigError::InvalidBaseUrl(url)),
            Ok(url) => Ok(config.with_base_url(url)),
            Err(_) => Ok(config),
        }
    }
}

impl std::fmt::Debug for WorkspaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfig")
            .field("workspace_id", &self.workspace_id)
            .field("token", &"***")
            .field("node_id", &self.node_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid CONTACTHUB_BASE_URL value: '{0}'")]
    InvalidBaseUrl(String),
}
