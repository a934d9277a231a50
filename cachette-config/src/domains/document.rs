//! Document backend options

use serde::{Deserialize, Serialize};

/// Document database options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Database host
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port; the driver default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username for the connection string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for the connection string, only used with a username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database to authenticate against and store entries in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Collection holding cache entries
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Require acknowledged, journaled writes for add and set
    #[serde(default = "crate::domains::utils::default_false")]
    pub safe: bool,

    /// Reuse one client per connection string across drivers
    #[serde(default = "crate::domains::utils::default_true")]
    pub pool: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            username: None,
            password: None,
            database: None,
            collection: default_collection(),
            safe: false,
            pool: true,
        }
    }
}

impl DocumentOptions {
    /// Name of the database entries are stored in
    pub fn database_name(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }
}

/// Database used when none is configured
pub const DEFAULT_DATABASE: &str = "cache";

fn default_host() -> String {
    "localhost".to_string()
}

fn default_collection() -> String {
    "cache".to_string()
}
