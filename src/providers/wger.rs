//! wger exercise database client.
//!
//! Endpoints used:
//! - `GET /exerciseinfo/` for listings (language, status and page size fixed)
//! - `GET /video/?exercise=` and `GET /exerciseimage/?exercise=` for media

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use super::error::{ProviderError, ProviderResult};
use super::types::{ExerciseQuery, ExerciseRecord};
use super::ExerciseProvider;

/// Provider name used in errors and logs.
const PROVIDER: &str = "wger";
/// English.
const LANGUAGE_ENGLISH: u32 = 2;
/// Approved exercises only.
const STATUS_APPROVED: u32 = 2;
/// Page size for listings.
const PAGE_LIMIT: u32 = 200;

/// HTTP client for the wger REST API.
pub struct WgerClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    image: Option<String>,
}

impl WgerClient {
    /// Create a client for `base_url` (e.g. `https://wger.de/api/v2`).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn listing_url(&self, query: &ExerciseQuery) -> ProviderResult<url::Url> {
        let mut url = url::Url::parse(&format!("{}/exerciseinfo/", self.base_url))?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("language", &LANGUAGE_ENGLISH.to_string());
            if let Some(category) = query.category {
                params.append_pair("category", &category.to_string());
            }
            if let Some(equipment) = query.equipment {
                params.append_pair("equipment", &equipment.to_string());
            }
            params.append_pair("limit", &PAGE_LIMIT.to_string());
            params.append_pair("status", &STATUS_APPROVED.to_string());
        }
        Ok(url)
    }

    fn media_url(&self, resource: &str, exercise_id: u64) -> ProviderResult<url::Url> {
        let mut url = url::Url::parse(&format!("{}/{resource}/", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("exercise", &exercise_id.to_string());
        Ok(url)
    }

    async fn get_page<T: DeserializeOwned>(&self, url: url::Url) -> ProviderResult<Vec<T>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let page: Page<T> = response
            .json()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;
        Ok(page.results)
    }
}

#[async_trait]
impl ExerciseProvider for WgerClient {
    async fn exercises(&self, query: &ExerciseQuery) -> ProviderResult<Vec<ExerciseRecord>> {
        let url = self.listing_url(query)?;
        self.get_page(url).await
    }

    async fn video_count(&self, exercise_id: u64) -> ProviderResult<usize> {
        let url = self.media_url("video", exercise_id)?;
        let videos: Vec<IgnoredAny> = self.get_page(url).await?;
        Ok(videos.len())
    }

    async fn image_urls(&self, exercise_id: u64) -> ProviderResult<Vec<String>> {
        let url = self.media_url("exerciseimage", exercise_id)?;
        let images: Vec<ImageRecord> = self.get_page(url).await?;
        Ok(images.into_iter().filter_map(|img| img.image).collect())
    }
}
