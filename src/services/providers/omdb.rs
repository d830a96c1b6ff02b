/// OMDb catalog provider
///
/// Looks titles up by IMDb id with the full plot. OMDb answers unknown ids with
/// HTTP 200 and `"Response": "False"` in the body, which maps to `None`.
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::CatalogMovie,
    services::providers::CatalogProvider,
};

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

impl OmdbProvider {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
        }
    }

    /// Interprets an OMDb response body
    fn parse_lookup(body: Value) -> AppResult<Option<CatalogMovie>> {
        if !body.is_object() {
            return Err(AppError::ExternalApi(
                "Invalid OMDb response format: expected an object".to_string(),
            ));
        }

        if body.get("Response").and_then(Value::as_str) == Some("False") {
            let reason = body
                .get("Error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            tracing::debug!(reason = %reason, "OMDb reported no match");
            return Ok(None);
        }

        let movie: CatalogMovie = serde_json::from_value(body)
            .map_err(|e| AppError::ExternalApi(format!("Invalid OMDb response format: {}", e)))?;

        if movie.imdb_id.trim().is_empty() {
            return Err(AppError::ExternalApi(
                "Invalid OMDb response format: missing imdbID".to_string(),
            ));
        }

        Ok(Some(movie))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for OmdbProvider {
    async fn lookup(&self, imdb_id: &str) -> AppResult<Option<CatalogMovie>> {
        let url = format!("{}/", self.api_url.trim_end_matches('/'));

        let mut query = vec![("i", imdb_id), ("plot", "full"), ("r", "json")];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        let movie = Self::parse_lookup(body)?;

        tracing::info!(
            imdb_id = %imdb_id,
            found = movie.is_some(),
            provider = self.name(),
            "Catalog lookup completed"
        );

        Ok(movie)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
