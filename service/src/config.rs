use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default Sheets API root. Overridable so tests can point at a stub server.
pub const DEFAULT_SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";

/// Token endpoint used when a service-account key omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with DV_ prefix (always wins)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Spreadsheet holding the signature ledger (required).
    #[serde(default)]
    pub spreadsheet_id: String,

    /// A1-notation range read on every lookup.
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,

    /// Service-account key, either as a structured object or a JSON-encoded string (required).
    #[serde(default)]
    pub credentials: Option<Credential>,

    /// Sheets API root URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Optional request timeout for ledger calls. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Service-account credential as it arrives from configuration.
///
/// YAML gives a structured map; environment variables usually carry the
/// downloaded key file as one JSON string. Both normalize to
/// [`ServiceAccountKey`].
#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Credential {
    Structured(Map<String, Value>),
    Raw(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured(_) => f.write_str("Credential::Structured(<redacted>)"),
            Self::Raw(_) => f.write_str("Credential::Raw(<redacted>)"),
        }
    }
}

/// Canonical service-account key.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl Credential {
    /// Normalize into a [`ServiceAccountKey`].
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingCredentials`] for a blank string and
    /// [`ConfigError::MalformedCredentials`] when the payload is not a usable
    /// service-account key.
    pub fn normalize(&self) -> Result<ServiceAccountKey, ConfigError> {
        let key: ServiceAccountKey = match self {
            Self::Structured(map) => serde_json::from_value(Value::Object(map.clone()))
                .map_err(|e| ConfigError::MalformedCredentials(e.to_string()))?,
            Self::Raw(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::MissingCredentials);
            }
            Self::Raw(raw) => serde_json::from_str(raw)
                .map_err(|e| ConfigError::MalformedCredentials(e.to_string()))?,
        };

        if key.client_email.trim().is_empty() {
            return Err(ConfigError::MalformedCredentials(
                "client_email is empty".into(),
            ));
        }
        if !key.token_uri.starts_with("http://") && !key.token_uri.starts_with("https://") {
            return Err(ConfigError::MalformedCredentials(format!(
                "token_uri '{}' is not an http(s) URL",
                key.token_uri
            )));
        }
        jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ConfigError::MalformedCredentials(format!("private_key is not an RSA PEM key: {e}"))
        })?;

        Ok(key)
    }
}

impl LedgerConfig {
    /// Resolve the configured credential.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingCredentials`] if no credential is configured,
    /// or [`ConfigError::MalformedCredentials`] if it cannot be normalized.
    pub fn service_account(&self) -> Result<ServiceAccountKey, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials)?
            .normalize()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Externally visible root URL, embedded in verification codes.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sheet_range() -> String {
    "A:E".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_SHEETS_API_BASE_URL.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_base_url() -> String {
    "https://vitalypuzhenko-dms-qr-app.streamlit.app".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityHeadersConfig {
    /// Enable security headers (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Enable HSTS header (default: false, enable in production with HTTPS).
    #[serde(default)]
    pub hsts_enabled: bool,

    /// HSTS max-age in seconds (default: 31536000 = 1 year).
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    /// Include subdomains in HSTS (default: true).
    #[serde(default = "default_true")]
    pub hsts_include_subdomains: bool,

    /// X-Frame-Options value: "DENY" or "SAMEORIGIN" (default: "DENY").
    #[serde(default = "default_frame_options")]
    pub frame_options: String,

    /// Content-Security-Policy header value. The default allows the inline
    /// stylesheet and the `data:` verification code image.
    #[serde(default = "default_csp")]
    pub content_security_policy: String,

    /// Referrer-Policy header value (default: "strict-origin-when-cross-origin").
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,

    /// Cache-Control header value (default: "no-store"). Every page is a fresh ledger read.
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_hsts_max_age() -> u64 {
    31_536_000 // 1 year
}

fn default_frame_options() -> String {
    "DENY".to_string()
}

fn default_csp() -> String {
    "default-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

fn default_cache_control() -> String {
    "no-store".to_string()
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hsts_enabled: false,
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: default_true(),
            frame_options: default_frame_options(),
            content_security_policy: default_csp(),
            referrer_policy: default_referrer_policy(),
            cache_control: default_cache_control(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: default_port(),
                host: default_host(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
            ledger: LedgerConfig {
                spreadsheet_id: String::new(),
                sheet_range: default_sheet_range(),
                credentials: None,
                api_base_url: default_api_base_url(),
                timeout_secs: None,
            },
            site: SiteConfig::default(),
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("ledger.credentials is required. Set DV_LEDGER__CREDENTIALS or configure it in config.yaml.")]
    MissingCredentials,

    #[error("ledger.credentials is not a valid service-account key: {0}")]
    MalformedCredentials(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with DV_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let mut config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("DV_").split("__"))
            .extract()?;

        config.site.base_url = config.site.base_url.trim_end_matches('/').to_string();
        config.ledger.api_base_url = config.ledger.api_base_url.trim_end_matches('/').to_string();

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Credentials first: their absence is the most common startup failure
        self.ledger.service_account()?;

        if self.ledger.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ledger.spreadsheet_id is required. Set DV_LEDGER__SPREADSHEET_ID environment variable or configure in config.yaml.".into(),
            ));
        }

        if self.ledger.sheet_range.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ledger.sheet_range cannot be empty".into(),
            ));
        }

        if self.ledger.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "ledger.timeout_secs cannot be 0".into(),
            ));
        }

        for (field, url) in [
            ("ledger.api_base_url", &self.ledger.api_base_url),
            ("site.base_url", &self.site.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "{field} '{url}' must start with http:// or https://"
                )));
            }
        }

        // Port must be non-zero
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        // X-Frame-Options must be DENY or SAMEORIGIN
        let frame_opts = self.security_headers.frame_options.to_uppercase();
        if frame_opts != "DENY" && frame_opts != "SAMEORIGIN" {
            return Err(ConfigError::Validation(format!(
                "security_headers.frame_options must be 'DENY' or 'SAMEORIGIN', got: '{}'",
                self.security_headers.frame_options
            )));
        }

        Ok(())
    }
}
