use ephany_core::hashing::sha256_hex;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// API key check settings.
    pub api_keys: ApiKeyConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`ApiKeyConfig::from_env`] for the API key variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            api_keys: ApiKeyConfig::from_env(),
        }
    }
}

/// A registered API client. Only the SHA-256 digest of its key is kept.
#[derive(Debug, Clone)]
pub struct ApiClientKey {
    pub name: String,
    pub key_hash: String,
}

impl ApiClientKey {
    pub fn new(name: impl Into<String>, plaintext_key: &str) -> Self {
        Self {
            name: name.into(),
            key_hash: sha256_hex(plaintext_key.as_bytes()),
        }
    }
}

/// Settings for the `X-API-Key` check.
#[derive(Debug, Clone)]
pub struct ApiKeyConfig {
    /// When `false`, every request is served as the anonymous client.
    pub enabled: bool,
    /// Path prefixes that require a key.
    pub protected_prefixes: Vec<String>,
    pub clients: Vec<ApiClientKey>,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            protected_prefixes: vec!["/api/".to_string()],
            clients: Vec::new(),
        }
    }
}

impl ApiKeyConfig {
    /// | Env Var                      | Default  |
    /// |------------------------------|----------|
    /// | `API_KEY_AUTH_ENABLED`       | `false`  |
    /// | `API_KEY_PROTECTED_PREFIXES` | `/api/`  |
    /// | `API_KEYS`                   | (empty)  |
    ///
    /// `API_KEYS` is a comma-separated list of `name:key` pairs.
    pub fn from_env() -> Self {
        let enabled = std::env::var("API_KEY_AUTH_ENABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let protected_prefixes = split_list(
            &std::env::var("API_KEY_PROTECTED_PREFIXES").unwrap_or_else(|_| "/api/".into()),
        );

        let clients = split_list(&std::env::var("API_KEYS").unwrap_or_default())
            .into_iter()
            .map(|pair| {
                let (name, key) = pair
                    .split_once(':')
                    .unwrap_or_else(|| panic!("API_KEYS entry '{pair}' must be name:key"));
                ApiClientKey::new(name.trim(), key.trim())
            })
            .collect();

        Self {
            enabled,
            protected_prefixes,
            clients,
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Find the client owning `plaintext_key`.
    pub fn find_client(&self, plaintext_key: &str) -> Option<&ApiClientKey> {
        let hash = sha256_hex(plaintext_key.as_bytes());
        self.clients.iter().find(|c| c.key_hash == hash)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
