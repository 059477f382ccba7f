//! Service configuration.
//!
//! Layered with figment, highest priority last:
//!
//! 1. Built-in defaults
//! 2. `portal.toml` (or the file passed on the command line)
//! 3. Environment variables, see [`ENV_KEYS`]
//!
//! Everything is resolved here once; the compiler receives plain values.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::value::Uncased;
use figment::Figment;

use portal_pptx::SlideContract;
use portal_records::CollectionNames;
use portal_report::{
    DepartmentConfig, DriveSettings, MalformedRecordPolicy, ReportConfig, ServiceAccountKey,
    UploadError,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ServerError};

/// Default config file name
pub const CONFIG_FILE: &str = "portal.toml";

/// Environment variables and the config keys they set
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("PORTAL_ADDR", "server.addr"),
    ("MONGODB_URI", "store.uri"),
    ("MONGODB_DATABASE", "store.database"),
    ("PORTAL_SESSION_TOKENS", "auth.session_tokens"),
    ("GOOGLE_SERVICE_ACCOUNT_KEY", "drive.service_account_key"),
    ("GOOGLE_SERVICE_ACCOUNT_FILE", "drive.service_account_file"),
    ("GOOGLE_SHARED_DRIVE_ID", "drive.shared_drive_id"),
    ("DISABLE_DRIVE_UPLOAD", "drive.disabled"),
    ("PORTAL_DEPARTMENT", "department.name"),
    ("PORTAL_DEPARTMENT_SHORT", "department.short_name"),
];

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

/// `[report]` overrides; unset values keep the compiler defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub currency_symbol: Option<String>,
    pub ongoing_activities: Option<Vec<String>>,
    pub malformed_records: Option<MalformedRecordPolicy>,
}

/// `[drive]` settings including where the service account key lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// `true`, `1` or `yes` in any case
    #[serde(default, deserialize_with = "flag")]
    pub disabled: bool,

    #[serde(default, deserialize_with = "optional_text")]
    pub shared_drive_id: Option<String>,

    /// Inline key JSON; takes precedence over the file
    #[serde(default, skip_serializing, deserialize_with = "key_json")]
    pub service_account_key: Option<String>,

    #[serde(default = "default_key_file")]
    pub service_account_file: PathBuf,
}

fn default_key_file() -> PathBuf {
    PathBuf::from("service-account.json")
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            shared_drive_id: None,
            service_account_key: None,
            service_account_file: default_key_file(),
        }
    }
}

impl DriveConfig {
    pub fn settings(&self) -> DriveSettings {
        DriveSettings {
            disabled: self.disabled,
            shared_drive_id: self.shared_drive_id.clone(),
        }
    }

    /// The inline key if set, else the key file if it exists
    pub fn service_account(&self) -> std::result::Result<Option<ServiceAccountKey>, UploadError> {
        if let Some(json) = self.service_account_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return ServiceAccountKey::from_json(json).map(Some);
        }
        if self.service_account_file.is_file() {
            return ServiceAccountKey::from_file(&self.service_account_file).map(Some);
        }
        Ok(None)
    }
}

/// `[auth]` settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accepted session tokens, a list or comma-separated text
    #[serde(default, skip_serializing, deserialize_with = "token_list")]
    pub session_tokens: Vec<String>,
}

/// `[store]` settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// MongoDB connection string
    #[serde(default, deserialize_with = "optional_text")]
    pub uri: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub collections: CollectionNames,

    /// JSON fixture used instead of MongoDB
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

fn default_database() -> String {
    "portal".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
            collections: CollectionNames::default(),
            fixture: None,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub department: DepartmentConfig,

    #[serde(default)]
    pub report: ReportSection,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub deck: SlideContract,
}

impl ServerConfig {
    /// Parse TOML and validate the embedded slide contract
    pub fn parse(toml_content: &str) -> Result<Self> {
        Self::extract(Figment::from(Toml::string(toml_content)))
    }

    /// File layer only. An explicit path must exist; `portal.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::extract(Self::file_layer(path)?)
    }

    /// File layer with environment overrides on top
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        Self::extract(Self::file_layer(path)?.merge(env_layer()))
    }

    fn file_layer(path: Option<&Path>) -> Result<Figment> {
        let file = match path {
            Some(path) if !path.is_file() => {
                return Err(ServerError::ConfigRead {
                    path: path.display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(CONFIG_FILE)).filter(|p| p.is_file()),
        };

        Ok(match file {
            Some(file) => Figment::new().merge(Toml::file(file)),
            None => Figment::new(),
        })
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config
            .deck
            .validate()
            .map_err(|e| ServerError::config(e.to_string()))?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server
            .addr
            .parse()
            .map_err(|e| ServerError::config(format!("listen address '{}': {}", self.server.addr, e)))
    }

    /// Compiler settings with `[report]` overrides applied
    pub fn report_config(&self) -> ReportConfig {
        let mut config = ReportConfig {
            department: self.department.clone(),
            deck: self.deck.clone(),
            ..ReportConfig::default()
        };
        if let Some(symbol) = &self.report.currency_symbol {
            config.currency_symbol = symbol.clone();
        }
        if let Some(activities) = &self.report.ongoing_activities {
            config.ongoing_activities = activities.clone();
        }
        if let Some(policy) = self.report.malformed_records {
            config.malformed_records = policy;
        }
        config
    }
}

/// `ENV_KEYS` variables mapped onto their config keys
fn env_layer() -> Env {
    let vars: Vec<&str> = ENV_KEYS.iter().map(|(var, _)| *var).collect();
    Env::raw().only(&vars).map(|key| {
        ENV_KEYS
            .iter()
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map(|(_, path)| Uncased::from(*path))
            .unwrap_or_else(|| Uncased::from(key.as_str()))
    })
}

/// Scalar as written in a file or environment variable
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text.trim().to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
        }
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let text = Scalar::deserialize(deserializer)?.into_text();
    Ok(matches!(text.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Blank counts as unset
fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .filter(|text| !text.is_empty()))
}

fn token_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tokens {
        List(Vec<Scalar>),
        Joined(Scalar),
    }

    let tokens: Vec<String> = match Tokens::deserialize(deserializer)? {
        Tokens::List(items) => items.into_iter().map(Scalar::into_text).collect(),
        Tokens::Joined(joined) => joined
            .into_text()
            .split(',')
            .map(|t| t.trim().to_string())
            .collect(),
    };
    Ok(tokens.into_iter().filter(|t| !t.is_empty()).collect())
}

/// Key JSON arrives as text, or already parsed into a table by the provider
fn key_json<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Null) | None => None,
        Some(value) => Some(value.to_string()),
    }
    .filter(|text| !text.trim().is_empty()))
}
