//! Social-network album source
//!
//! Lists every photo across a user's albums via the Graph API. The token exchange that
//! produces the access token happens elsewhere; this client only consumes it.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::AlbumPhotoRef;

pub const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com/v12.0";
const USER_AGENT: &str = concat!("moodlens/", env!("CARGO_PKG_VERSION"));
/// Nested field expansion: every album, every photo, its renditions and creation time
const ALBUM_PHOTO_FIELDS: &str = "albums{photos{id,images,created_time}}";

/// Album source errors (all batch-level)
#[derive(Debug, Error)]
pub enum AlbumSourceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Graph API error: {0}")]
    GraphError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Unexpected album listing: {0}")]
    UnexpectedShape(String),
}

/// Anything that can list a user's album photos
#[async_trait]
pub trait AlbumSource: Send + Sync {
    /// Flattened photo references across all albums, in listing order
    async fn list_photo_refs(&self, access_token: &str) -> Result<Vec<AlbumPhotoRef>, AlbumSourceError>;
}

#[derive(Debug, Deserialize)]
pub struct GraphAlbumsResponse {
    pub albums: Option<GraphPage<GraphAlbum>>,
    pub error: Option<GraphErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct GraphPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct GraphAlbum {
    pub photos: Option<GraphPage<GraphPhoto>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphPhoto {
    pub id: String,
    /// Renditions, largest first
    #[serde(default)]
    pub images: Vec<GraphImage>,
    pub created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphImage {
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphErrorBody {
    pub message: String,
}

/// Flatten a Graph album listing into photo references
///
/// Albums without photos contribute nothing. A photo whose first rendition has no
/// source keeps a `None` URL; the pipeline drops it later.
pub fn photo_refs_from_response(
    response: GraphAlbumsResponse,
) -> Result<Vec<AlbumPhotoRef>, AlbumSourceError> {
    if let Some(error) = response.error {
        return Err(AlbumSourceError::GraphError(error.message));
    }

    let albums = response
        .albums
        .ok_or_else(|| AlbumSourceError::UnexpectedShape("response has no albums".to_string()))?;

    Ok(albums
        .data
        .into_iter()
        .filter_map(|album| album.photos)
        .flat_map(|photos| photos.data)
        .map(|photo| {
            let source = photo.images.into_iter().next().and_then(|image| image.source);
            AlbumPhotoRef::new(photo.id, source).with_captured_at(photo.created_time)
        })
        .collect())
}

/// Graph API client
pub struct GraphAlbumClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GraphAlbumClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AlbumSourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AlbumSourceError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AlbumSource for GraphAlbumClient {
    async fn list_photo_refs(&self, access_token: &str) -> Result<Vec<AlbumPhotoRef>, AlbumSourceError> {
        let url = format!("{}/me", self.base_url);

        tracing::debug!(url = %url, "Listing album photos");

        let response = self
            .http_client
            .get(&url)
            .query(&[("fields", ALBUM_PHOTO_FIELDS), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AlbumSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AlbumSourceError::NetworkError(e.to_string()))?;

        let parsed: Result<GraphAlbumsResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            // Graph reports token and permission problems as an error object
            if let Ok(GraphAlbumsResponse { error: Some(error), .. }) = parsed {
                return Err(AlbumSourceError::GraphError(error.message));
            }
            return Err(AlbumSourceError::ApiError(status.as_u16(), body));
        }

        let parsed = parsed.map_err(|e| AlbumSourceError::UnexpectedShape(e.to_string()))?;
        let refs = photo_refs_from_response(parsed)?;

        tracing::info!(photo_count = refs.len(), "Retrieved album photo listing");

        Ok(refs)
    }
}
