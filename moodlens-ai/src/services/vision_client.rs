//! Vision annotation client
//!
//! Sends a staged image URL to the Cloud Vision `images:annotate` REST endpoint and
//! normalizes the response into a `RawAnnotation`.

use async_trait::async_trait;
use moodlens_common::{FaceEmotions, Likelihood};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::RawAnnotation;

pub const VISION_ENDPOINT: &str = "https://vision.googleapis.com";
const USER_AGENT: &str = concat!("moodlens/", env!("CARGO_PKG_VERSION"));

/// Vision client errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Annotation error: {0}")]
    AnnotationError(String),

    #[error("Empty annotation response")]
    EmptyResponse,
}

/// Anything that can annotate an image by URL
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn annotate(&self, image_url: &str) -> Result<RawAnnotation, VisionError>;
}

// ----------------------------------------------------------------------------
// Request wire types
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BatchAnnotateRequest<'a> {
    requests: Vec<AnnotateImageRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageRef<'a>,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageRef<'a> {
    source: ImageSource<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSource<'a> {
    image_uri: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

/// Feature set requested for every photo
fn requested_features() -> Vec<Feature> {
    vec![
        Feature { feature_type: "LABEL_DETECTION", max_results: Some(10) },
        Feature { feature_type: "LANDMARK_DETECTION", max_results: Some(5) },
        Feature { feature_type: "FACE_DETECTION", max_results: None },
        Feature { feature_type: "OBJECT_LOCALIZATION", max_results: Some(10) },
    ]
}

// ----------------------------------------------------------------------------
// Response wire types
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BatchAnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    pub label_annotations: Option<Vec<EntityAnnotation>>,
    pub landmark_annotations: Option<Vec<EntityAnnotation>>,
    pub face_annotations: Option<Vec<FaceAnnotation>>,
    pub localized_object_annotations: Option<Vec<LocalizedObjectAnnotation>>,
    pub error: Option<AnnotationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    #[serde(default)]
    pub joy_likelihood: Likelihood,
    #[serde(default)]
    pub sorrow_likelihood: Likelihood,
    #[serde(default)]
    pub anger_likelihood: Likelihood,
    #[serde(default)]
    pub surprise_likelihood: Likelihood,
}

#[derive(Debug, Deserialize)]
pub struct LocalizedObjectAnnotation {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationStatus {
    #[serde(default)]
    pub message: String,
}

impl From<AnnotateImageResponse> for RawAnnotation {
    /// Missing annotation kinds become empty lists
    fn from(response: AnnotateImageResponse) -> Self {
        RawAnnotation {
            labels: response
                .label_annotations
                .unwrap_or_default()
                .into_iter()
                .map(|label| label.description)
                .collect(),
            landmarks: response
                .landmark_annotations
                .unwrap_or_default()
                .into_iter()
                .map(|landmark| landmark.description)
                .collect(),
            faces: response
                .face_annotations
                .unwrap_or_default()
                .into_iter()
                .map(|face| FaceEmotions {
                    joy: face.joy_likelihood,
                    sorrow: face.sorrow_likelihood,
                    anger: face.anger_likelihood,
                    surprise: face.surprise_likelihood,
                })
                .collect(),
            objects: response
                .localized_object_annotations
                .unwrap_or_default()
                .into_iter()
                .map(|object| object.name)
                .collect(),
        }
    }
}

/// Turn the first per-image response into an annotation
pub fn annotation_from_batch(batch: BatchAnnotateResponse) -> Result<RawAnnotation, VisionError> {
    let response = batch
        .responses
        .into_iter()
        .next()
        .ok_or(VisionError::EmptyResponse)?;

    if let Some(error) = &response.error {
        return Err(VisionError::AnnotationError(error.message.clone()));
    }

    Ok(RawAnnotation::from(response))
}

/// Cloud Vision REST client (API key auth)
pub struct CloudVisionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CloudVisionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl VisionAnalyzer for CloudVisionClient {
    async fn annotate(&self, image_url: &str) -> Result<RawAnnotation, VisionError> {
        let url = format!("{}/v1/images:annotate", self.endpoint);
        let request = BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageRef {
                    source: ImageSource { image_uri: image_url },
                },
                features: requested_features(),
            }],
        };

        tracing::debug!(image_url = %image_url, "Requesting vision annotation");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VisionError::ApiError(status.as_u16(), error_text));
        }

        let batch: BatchAnnotateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::ParseError(e.to_string()))?;

        let annotation = annotation_from_batch(batch)?;

        tracing::debug!(
            image_url = %image_url,
            labels = annotation.labels.len(),
            faces = annotation.faces.len(),
            objects = annotation.objects.len(),
            "Received vision annotation"
        );

        Ok(annotation)
    }
}
