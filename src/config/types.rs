use crate::fetch::BackoffStrategy;
use crate::sources::Platform;
use serde::Deserialize;

/// Browser user agent sent when the config does not name one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Environment variable read for the GitHub token by default
pub const DEFAULT_GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Main configuration structure for Algo-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    /// Sources to query, in report order
    #[serde(default, rename = "profile")]
    pub profiles: Vec<ProfileEntry>,
}

/// HTTP client settings shared by every source
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Name of the environment variable holding the GitHub token
    #[serde(rename = "github-token-env", default = "default_github_token_env")]
    pub github_token_env: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            github_token_env: default_github_token_env(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_github_token_env() -> String {
    DEFAULT_GITHUB_TOKEN_ENV.to_string()
}

/// One source to query
///
/// Everything but `platform` and `identity` is optional and falls back to the
/// platform's defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileEntry {
    pub platform: Platform,

    /// Username, GitHub login, or Skillrack resume URL
    #[serde(default)]
    pub identity: String,

    /// GitHub token; takes precedence over the environment variable
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub max_attempts: Option<u32>,

    #[serde(default)]
    pub backoff_base_ms: Option<u64>,

    #[serde(default)]
    pub backoff: Option<BackoffStrategy>,
}

impl ProfileEntry {
    /// Entry with every override left at the platform default
    pub fn new(platform: Platform, identity: impl Into<String>) -> Self {
        Self {
            platform,
            identity: identity.into(),
            token: None,
            base_url: None,
            timeout_secs: None,
            max_attempts: None,
            backoff_base_ms: None,
            backoff: None,
        }
    }
}
