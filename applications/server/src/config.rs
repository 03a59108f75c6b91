/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_metadata")]
    pub metadata: MetadataSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Uploaded audio, images and lyrics live under this directory
    #[serde(default = "default_media_path")]
    pub media_path: PathBuf,

    /// Prefix for URLs handed out for uploaded files
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    #[serde(default = "default_token_expiration_hours")]
    pub token_expiration_hours: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `config.toml` in the working directory; a missing
    /// file is fine. Environment variables look like
    /// `MUSICIFY_STORAGE__DATABASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ServerError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("MUSICIFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set MUSICIFY_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.metadata.enabled {
            if self.metadata.access_token.as_deref().unwrap_or("").is_empty() {
                return Err(ServerError::Config(
                    "Metadata lookup is enabled but no access token is set".to_string(),
                ));
            }
            url::Url::parse(&self.metadata.api_base_url).map_err(|e| {
                ServerError::Config(format!("Invalid metadata API base URL: {}", e))
            })?;
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        media_path: default_media_path(),
        public_base_url: default_public_base_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/musicify.db".to_string()
}

fn default_media_path() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_public_base_url() -> String {
    "/media".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        token_expiration_hours: default_token_expiration_hours(),
    }
}

fn default_token_expiration_hours() -> u64 {
    24
}

fn default_metadata() -> MetadataSettings {
    MetadataSettings {
        enabled: false,
        api_base_url: default_api_base_url(),
        access_token: None,
    }
}

fn default_api_base_url() -> String {
    "https://api.spotify.com".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            metadata: default_metadata(),
        }
    }
}
