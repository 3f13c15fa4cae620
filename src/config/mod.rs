//! Configuration loading and management
//!
//! Configuration is layered: built-in defaults, then an optional YAML file,
//! then environment overrides. Both token secrets and their expiries come
//! from the same [`AuthConfig`], whichever layer supplied them.

pub mod duration;

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub use duration::{format_duration, parse_duration};

/// Content type uid served by the post store
pub const POST_UID: &str = "api::post.post";

/// Longest accepted token lifetime, `100y`
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(36_525 * 24 * 60 * 60);

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1337,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Route prefix for the content API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Either empty or `/segment`, without trailing slash
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
        }
    }
}

/// Token signing settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for access tokens
    pub jwt_secret: String,

    /// Access token lifetime
    #[serde(with = "duration::serde_duration")]
    pub jwt_expires_in: Duration,

    /// Secret for refresh tokens (must differ from `jwt_secret`)
    pub refresh_secret: String,

    /// Refresh token lifetime
    #[serde(with = "duration::serde_duration")]
    pub refresh_expires_in: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expires_in: Duration::from_secs(20 * 60),
            refresh_secret: String::new(),
            refresh_expires_in: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field("refresh_secret", &redact(&self.refresh_secret))
            .field("refresh_expires_in", &self.refresh_expires_in)
            .finish()
    }
}

/// Outbound SMTP transport
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub require_tls: bool,
    pub reject_unauthorized: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            secure: true,
            require_tls: true,
            reject_unauthorized: true,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("require_tls", &self.require_tls)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(redact))
            .finish()
    }
}

/// Email provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub provider: String,
    pub service: String,
    pub smtp: SmtpConfig,
    pub default_from: String,
    pub default_reply_to: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: "smtp".to_string(),
            service: "gmail".to_string(),
            smtp: SmtpConfig::default(),
            default_from: "depo.dstu@gmail.com".to_string(),
            default_reply_to: "depo.dstu@gmail.com".to_string(),
        }
    }
}

/// A weighted searchable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKey {
    pub name: String,
    pub weight: i64,
}

impl SearchKey {
    pub fn new(name: impl Into<String>, weight: i64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Fuzzy search index over one content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContentType {
    pub uid: String,
    pub model_name: String,

    /// Also match Cyrillic text through its Latin transliteration
    #[serde(default)]
    pub transliterate: bool,

    /// Only index entries with a publication date
    #[serde(default = "default_true")]
    pub published_only: bool,

    /// Characters of each field considered for matching
    #[serde(default = "default_character_limit")]
    pub character_limit: usize,

    /// Minimum weighted score for a hit
    #[serde(default = "default_threshold")]
    pub threshold: i64,

    /// Maximum number of hits returned
    #[serde(default = "default_limit")]
    pub limit: usize,

    pub keys: Vec<SearchKey>,
}

fn default_true() -> bool {
    true
}

fn default_character_limit() -> usize {
    300
}

fn default_threshold() -> i64 {
    -600
}

fn default_limit() -> usize {
    10
}

impl SearchContentType {
    /// The post index: title +100, description +50, text +50
    pub fn posts() -> Self {
        Self {
            uid: POST_UID.to_string(),
            model_name: "post".to_string(),
            transliterate: true,
            published_only: true,
            character_limit: default_character_limit(),
            threshold: default_threshold(),
            limit: default_limit(),
            keys: vec![
                SearchKey::new("title", 100),
                SearchKey::new("description", 50),
                SearchKey::new("text", 50),
            ],
        }
    }

    /// Response key for this content type (`post` → `posts`)
    pub fn plural_name(&self) -> String {
        if self.model_name.ends_with('s') {
            self.model_name.clone()
        } else {
            format!("{}s", self.model_name)
        }
    }
}

/// Fuzzy search settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub content_types: Vec<SearchContentType>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            content_types: vec![SearchContentType::posts()],
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Full load: optional YAML file, then environment, then validation
    ///
    /// Variables missing from the process environment are looked up in a
    /// `.env` file in the working directory, if there is one.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_with_dotenv(path, ".env")
    }

    /// Same as [`AppConfig::load`] with an explicit `.env` location
    pub fn load_with_dotenv(
        path: Option<&str>,
        dotenv_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let dotenv = read_dotenv(dotenv_path.as_ref())?;
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.apply_env(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_port("PORT", &port)?;
        }
        if let Some(prefix) = get("API_PREFIX") {
            self.api.prefix = prefix;
        }

        if let Some(secret) = get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expires) = get("JWT_SECRET_EXPIRES") {
            self.auth.jwt_expires_in = parse_env_duration("JWT_SECRET_EXPIRES", &expires)?;
        }
        if let Some(secret) = get("REFRESH_SECRET") {
            self.auth.refresh_secret = secret;
        }
        if let Some(expires) = get("REFRESH_TOKEN_EXPIRES") {
            self.auth.refresh_expires_in = parse_env_duration("REFRESH_TOKEN_EXPIRES", &expires)?;
        }

        if let Some(host) = get("SMTP_HOST") {
            self.email.smtp.host = host;
        }
        if let Some(port) = get("SMTP_PORT") {
            self.email.smtp.port = parse_port("SMTP_PORT", &port)?;
        }
        if let Some(username) = get("SMTP_USERNAME") {
            self.email.smtp.username = Some(username);
        }
        if let Some(password) = get("SMTP_PASSWORD") {
            self.email.smtp.password = Some(password);
        }
        if let Some(from) = get("EMAIL_DEFAULT_FROM") {
            self.email.default_from = from;
        }
        if let Some(reply_to) = get("EMAIL_DEFAULT_REPLY_TO") {
            self.email.default_reply_to = reply_to;
        }

        Ok(self)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.api.prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(invalid(
                "api.prefix",
                prefix,
                "must be empty or start with '/' and not end with '/'",
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(missing("auth.jwt_secret", "auth (JWT_SECRET)"));
        }
        if self.auth.refresh_secret.is_empty() {
            return Err(missing("auth.refresh_secret", "auth (REFRESH_SECRET)"));
        }
        if self.auth.jwt_secret == self.auth.refresh_secret {
            return Err(invalid(
                "auth.refresh_secret",
                "<redacted>",
                "must differ from auth.jwt_secret",
            ));
        }
        for (field, expires_in) in [
            ("auth.jwt_expires_in", self.auth.jwt_expires_in),
            ("auth.refresh_expires_in", self.auth.refresh_expires_in),
        ] {
            if expires_in.is_zero() {
                return Err(invalid(field, "0s", "must be positive"));
            }
            if expires_in > MAX_TOKEN_LIFETIME {
                return Err(invalid(
                    field,
                    &format_duration(expires_in),
                    "must not exceed 100 years",
                ));
            }
        }

        if self.email.smtp.port == 0 {
            return Err(invalid("email.smtp.port", "0", "must be positive"));
        }
        for (field, address) in [
            ("email.default_from", &self.email.default_from),
            ("email.default_reply_to", &self.email.default_reply_to),
        ] {
            if !is_valid_email(address) {
                return Err(invalid(field, address, "not an email address"));
            }
        }

        for content_type in &self.search.content_types {
            if content_type.uid != POST_UID {
                return Err(invalid(
                    "search.content_types.uid",
                    &content_type.uid,
                    "only posts can be indexed",
                ));
            }
            if content_type.keys.is_empty() {
                return Err(missing("keys", &format!("search index '{}'", content_type.uid)));
            }
            if content_type.limit == 0 {
                return Err(invalid("search.content_types.limit", "0", "must be positive"));
            }
        }

        Ok(())
    }
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment; a missing file yields no variables
fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let parse_error = |e: dotenvy::Error| ConfigError::ParseError {
        file: Some(path.display().to_string()),
        message: e.to_string(),
    };

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(parse_error(e)),
    };

    let vars = entries
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(parse_error)?;
    tracing::debug!(path = %path.display(), count = vars.len(), "loaded dotenv file");
    Ok(vars)
}

fn parse_port(field: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(field, value, "not a valid port number"))
}

fn parse_env_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value).map_err(|_| invalid(field, value, "not a valid duration"))
}

fn missing(field: &str, context: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
        context: context.to_string(),
    }
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<empty>" } else { "<redacted>" }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
    });
    regex.is_match(email)
}
