/// Track metadata lookup against the Spotify Web API
use async_trait::async_trait;
use musicify_core::{LookupArtist, MetadataLookup, MusicifyError, TrackMetadata};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SpotifyMetadata {
    client: Client,
    api_base_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

impl SpotifyMetadata {
    pub fn new(api_base_url: impl Into<String>, access_token: impl Into<String>) -> musicify_core::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("musicify-server/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MusicifyError::external(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> musicify_core::Result<Option<T>> {
        let url = format!("{}{}", self.api_base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| MusicifyError::external(format!("Metadata request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| MusicifyError::external(format!("Malformed metadata response: {}", e))),
            status => Err(MusicifyError::external(format!(
                "Metadata service returned {}",
                status
            ))),
        }
    }

    /// Artist image, if the provider has one. Failures only cost the picture.
    async fn artist_image(&self, artist_id: &str) -> Option<String> {
        match self
            .get_json::<ArtistResponse>(&format!("/v1/artists/{}", artist_id))
            .await
        {
            Ok(artist) => artist?.images.into_iter().next().map(|i| i.url),
            Err(e) => {
                tracing::warn!(artist_id, "Artist image lookup failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl MetadataLookup for SpotifyMetadata {
    async fn lookup(&self, track_ref: &str) -> musicify_core::Result<TrackMetadata> {
        let track: TrackResponse = self
            .get_json(&format!("/v1/tracks/{}", track_ref))
            .await?
            .ok_or_else(|| MusicifyError::not_found("Track", track_ref))?;

        let mut artists = Vec::with_capacity(track.artists.len());
        for artist in track.artists {
            let image_url = match &artist.id {
                Some(id) => self.artist_image(id).await,
                None => None,
            };
            artists.push(LookupArtist {
                name: artist.name,
                image_url,
            });
        }

        tracing::info!(track_ref, title = %track.name, "Fetched track metadata");

        Ok(TrackMetadata {
            title: track.name,
            artists,
            image_url: track
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
            duration_ms: track.duration_ms,
        })
    }
}
