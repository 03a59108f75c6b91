//! Main Musicify client.

use crate::error::{ClientError, Result};
use crate::lyrics::{self, LyricLine};
use crate::playlists::PlaylistClient;
use crate::types::{ClientConfig, HealthInfo};
use musicify_core::Song;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Main client for a Musicify server.
///
/// Holds the HTTP connection pool and the bearer token, and hands out
/// [`PlaylistClient`]s for playlist operations.
///
/// # Example
///
/// ```ignore
/// use musicify_client::{ClientConfig, MusicifyClient};
///
/// let client = MusicifyClient::new(ClientConfig::with_token("https://music.example.com", token))?;
/// let playlists = client.playlists().await.list().await?;
/// ```
pub struct MusicifyClient {
    http: Client,
    config: Arc<RwLock<ClientConfig>>,
}

impl MusicifyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = normalize_url(&config.url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Musicify/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(ClientConfig {
                url,
                access_token: config.access_token,
            })),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Replace the bearer token (e.g. after the identity provider refreshed it).
    pub async fn set_token(&self, access_token: Option<String>) {
        self.config.write().await.access_token = access_token;
    }

    /// Test the connection to the server.
    pub async fn health(&self) -> Result<HealthInfo> {
        let url = format!("{}/api/health", self.url().await);
        debug!(url = %url, "Testing server connection");

        let response = self.http.get(&url).send().await?;
        let info: HealthInfo = read_json(response).await?;

        info!(version = %info.version, "Connected to server");
        Ok(info)
    }

    /// Songs in the catalog, optionally filtered by name/artist search.
    pub async fn songs(&self, search: Option<&str>) -> Result<Vec<Song>> {
        #[derive(Deserialize)]
        struct SongList {
            songs: Vec<Song>,
        }

        let config = self.config.read().await;
        let url = format!("{}/api/song/list", config.url);
        let mut request = authorized(self.http.get(&url), config.access_token.as_deref());
        drop(config);

        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }

        let list: SongList = read_json(request.send().await?).await?;
        debug!(songs = list.songs.len(), "Fetched songs");
        Ok(list.songs)
    }

    /// Playlist operations bound to the current URL and token.
    pub async fn playlists(&self) -> PlaylistClient {
        let config = self.config.read().await;
        PlaylistClient::new(
            self.http.clone(),
            config.url.clone(),
            config.access_token.clone(),
        )
    }

    /// Fetch and parse an LRC file. Relative URLs resolve against the server.
    ///
    /// Never fails: a missing or unreachable file yields no lines.
    pub async fn lyrics(&self, lrc_url: &str) -> Vec<LyricLine> {
        let base = self.url().await;
        let resolved = match url::Url::parse(&base).and_then(|base| base.join(lrc_url)) {
            Ok(url) => url.to_string(),
            Err(_) => lrc_url.to_string(),
        };
        lyrics::fetch_lyrics(&self.http, &resolved).await
    }
}

/// Trim the trailing slash and insist on http(s).
fn normalize_url(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = raw.trim().trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    url::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    Ok(url)
}

pub(crate) fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Decode a read-style envelope (`{success: true, ...payload}`).
///
/// Non-2xx statuses and `success: false` both become [`ClientError::Server`]
/// carrying the server's message.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) if status.is_success() => {
            return Err(ClientError::Parse(format!("Invalid JSON: {}", e)))
        }
        Err(_) => {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: text,
            })
        }
    };

    let succeeded = value
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(status.is_success());
    if !status.is_success() || !succeeded {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("Request failed")
            .to_string();
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_value(value).map_err(|e| ClientError::Parse(e.to_string()))
}
