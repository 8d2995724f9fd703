use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "DIRECTORY_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

/// Which relational backend the directory is served from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded file database.
    #[default]
    Sqlite,
    /// Managed MySQL instance; host is discovered at startup.
    Mysql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub sqlite_url: String,
    pub mysql: MysqlConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            sqlite_url: "sqlite:./email.db?mode=rwc".to_string(),
            mysql: MysqlConfig::default(),
        }
    }
}

/// Credentials for the managed instance. The host is not configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            user: "admin".to_string(),
            password: "Clarusway_1".to_string(),
            name: "clarusway".to_string(),
            port: 3306,
        }
    }
}

impl Config {
    /// Defaults, then `config.toml` if present, then `DIRECTORY_*` env vars.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
