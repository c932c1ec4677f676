use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Boxed error used where the concrete cause comes from the transport crate
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while loading, validating or applying a connection config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("host is required")]
    MissingHost,

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid CA certificate {}: {source}", .path.display())]
    InvalidCertificate { path: PathBuf, source: BoxError },

    #[error("failed to build HTTP transport: {0}")]
    Transport(#[source] BoxError),
}

/// Connection settings for a Qdrant server.
///
/// Zero-valued port, timeouts and pool size fall back to their defaults when
/// the derived values are computed, so a config assembled by hand behaves the
/// same as one deserialized with serde defaults.
#[derive(Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub tls: TlsOptions,
    /// Sent as the `api-key` header when non-empty
    #[serde(default)]
    pub api_key: String,

    /// How long a pooled keep-alive connection may sit idle (default 90s)
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Upper bound on a whole request, including reading the body (default 30s)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TlsOptions {
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// PEM bundle added to the trusted roots
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
}

/// Settings the transport is built from, with every default resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub idle_timeout: Duration,
    pub request_timeout: Duration,
    pub max_idle_per_host: usize,
    /// `Some` only when TLS is enabled
    pub tls: Option<TlsOptions>,
}

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6333;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 10;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_idle_per_host() -> usize {
    DEFAULT_MAX_IDLE_PER_HOST
}

fn or_default<T: PartialEq + Default>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.use_tls = true;
        self.tls = tls;
        self
    }

    pub fn with_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Load a config from a JSON file; absent fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ConnectionConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        Ok(())
    }

    pub fn resolved_port(&self) -> u16 {
        or_default(self.port, DEFAULT_PORT)
    }

    /// `scheme://host:port`, scheme chosen by `use_tls`
    pub fn base_url(&self) -> String {
        let host = if self.host.is_empty() {
            DEFAULT_HOST
        } else {
            self.host.as_str()
        };
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, host, self.resolved_port())
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            idle_timeout: Duration::from_secs(or_default(
                self.idle_timeout_secs,
                DEFAULT_IDLE_TIMEOUT_SECS,
            )),
            request_timeout: Duration::from_secs(or_default(
                self.request_timeout_secs,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            max_idle_per_host: or_default(self.max_idle_per_host, DEFAULT_MAX_IDLE_PER_HOST),
            tls: self.use_tls.then(|| self.tls.clone()),
        }
    }

    /// The API key, or `None` when no key is configured
    pub fn api_key(&self) -> Option<&str> {
        Some(self.api_key.as_str()).filter(|key| !key.is_empty())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            use_tls: false,
            tls: TlsOptions::default(),
            api_key: String::new(),
            idle_timeout_secs: default_idle_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

// The key is a credential, keep it out of logs
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("tls", &self.tls)
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_idle_per_host", &self.max_idle_per_host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, port: u16, api_key: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: host.to_string(),
            port,
            api_key: api_key.to_string(),
            ..ConnectionConfig::default()
        }
    }

    #[test]
    fn test_zero_port_resolves_to_default() {
        let cfg = config("localhost", 0, "");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.base_url(), "http://localhost:6333");
    }

    #[test]
    fn test_scheme_follows_tls_flag() {
        let plain = config("db.internal", 7000, "");
        assert_eq!(plain.base_url(), "http://db.internal:7000");

        let secure = plain.clone().with_tls(TlsOptions::default());
        assert_eq!(secure.base_url(), "https://db.internal:7000");
    }

    #[test]
    fn test_empty_host_is_rejected() {
        assert!(matches!(
            config("", 6333, "").validate(),
            Err(ConfigError::MissingHost)
        ));
        assert!(matches!(
            config("   ", 6333, "").validate(),
            Err(ConfigError::MissingHost)
        ));
    }

    #[test]
    fn test_transport_config_defaults() {
        let mut cfg = config("localhost", 0, "");
        cfg.idle_timeout_secs = 0;
        cfg.request_timeout_secs = 0;
        cfg.max_idle_per_host = 0;

        let transport = cfg.transport_config();
        assert_eq!(transport.idle_timeout, Duration::from_secs(90));
        assert_eq!(transport.request_timeout, Duration::from_secs(30));
        assert_eq!(transport.max_idle_per_host, 10);
        assert!(transport.tls.is_none());
    }

    #[test]
    fn test_idle_and_request_timeouts_stay_separate() {
        let cfg = ConnectionConfig::new("localhost")
            .with_idle_timeout_secs(5)
            .with_request_timeout_secs(7);

        let transport = cfg.transport_config();
        assert_eq!(transport.idle_timeout, Duration::from_secs(5));
        assert_eq!(transport.request_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_tls_options_only_with_tls() {
        let tls = TlsOptions {
            insecure_skip_verify: true,
            ca_cert_path: None,
        };
        let mut cfg = ConnectionConfig::new("localhost");
        cfg.tls = tls.clone();
        assert!(cfg.transport_config().tls.is_none());

        let cfg = cfg.with_tls(tls.clone());
        assert_eq!(cfg.transport_config().tls, Some(tls));
    }

    #[test]
    fn test_api_key_empty_means_none() {
        assert_eq!(config("localhost", 0, "").api_key(), None);
        assert_eq!(config("localhost", 0, "secret").api_key(), Some("secret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cfg: ConnectionConfig =
            serde_json::from_str(r#"{"host": "qdrant", "api_key": "k"}"#).unwrap();
        assert_eq!(cfg.port, 6333);
        assert_eq!(cfg.idle_timeout_secs, 90);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(!cfg.use_tls);
        assert_eq!(cfg.base_url(), "http://qdrant:6333");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "qdrant-http-config-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{
                "host": "10.0.0.5",
                "port": 6334,
                "use_tls": true,
                "tls": {"insecure_skip_verify": true}
            }"#,
        )
        .unwrap();

        let cfg = ConnectionConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.base_url(), "https://10.0.0.5:6334");
        assert!(cfg.transport_config().tls.unwrap().insecure_skip_verify);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConnectionConfig::load("/nonexistent/qdrant.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", config("localhost", 0, "top-secret"));
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
