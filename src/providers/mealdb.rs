//! TheMealDB recipe client.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{ProviderError, ProviderResult};
use super::types::{Meal, MealSummary};
use super::RecipeProvider;

/// Provider name used in errors and logs.
const PROVIDER: &str = "mealdb";

/// HTTP client for TheMealDB JSON API.
pub struct MealDbClient {
    client: reqwest::Client,
    base_url: String,
}

/// TheMealDB wraps every payload in `{"meals": [...] | null}`.
#[derive(Debug, Deserialize)]
struct MealsEnvelope<T> {
    meals: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    #[serde(rename = "strCategory")]
    name: String,
}

impl MealDbClient {
    /// Create a client for `base_url` (e.g. `https://www.themealdb.com/api/json/v1/1`).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str, key: &str, value: &str) -> ProviderResult<url::Url> {
        let mut url = url::Url::parse(&format!("{}/{path}", self.base_url))?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    async fn get_meals<T: DeserializeOwned>(&self, url: url::Url) -> ProviderResult<Vec<T>> {
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

        let envelope: MealsEnvelope<T> =
            response
                .json()
                .await
                .map_err(|source| ProviderError::Request {
                    provider: PROVIDER,
                    source,
                })?;
        Ok(envelope.meals.unwrap_or_default())
    }
}

#[async_trait]
impl RecipeProvider for MealDbClient {
    async fn categories(&self) -> ProviderResult<Vec<String>> {
        let url = self.endpoint("list.php", "c", "list")?;
        let names: Vec<CategoryName> = self.get_meals(url).await?;
        Ok(names.into_iter().map(|c| c.name).collect())
    }

    async fn meals_in_category(&self, category: &str) -> ProviderResult<Vec<MealSummary>> {
        let url = self.endpoint("filter.php", "c", category)?;
        self.get_meals(url).await
    }

    async fn meal_details(&self, meal_id: &str) -> ProviderResult<Option<Meal>> {
        let url = self.endpoint("lookup.php", "i", meal_id)?;
        let meals: Vec<Meal> = self.get_meals(url).await?;
        Ok(meals.into_iter().next())
    }
}
