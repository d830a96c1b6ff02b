/// Bearer-token identity provider (Auth0-style HS256)
///
/// Tokens are verified locally with the shared client secret. Profiles come
/// from the configured userinfo endpoint, or from the token's own claims when
/// no endpoint is configured.
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::User,
    services::providers::{Claims, IdentityProvider},
};

#[derive(Clone)]
pub struct JwtIdentityProvider {
    http_client: HttpClient,
    decoding_key: DecodingKey,
    validation: Validation,
    userinfo_url: Option<String>,
}

impl JwtIdentityProvider {
    /// Builds a provider from the shared secret
    ///
    /// `secret_is_base64` decodes the secret as base64url first, which is how
    /// Auth0 hands out client secrets.
    pub fn new(
        secret: &str,
        secret_is_base64: bool,
        audience: Option<&str>,
        userinfo_url: Option<String>,
    ) -> AppResult<Self> {
        let decoding_key = if secret_is_base64 {
            DecodingKey::from_base64_secret(&to_standard_base64(secret))
                .map_err(|e| AppError::Internal(format!("Invalid identity secret: {}", e)))?
        } else {
            DecodingKey::from_secret(secret.as_bytes())
        };

        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            http_client: HttpClient::new(),
            decoding_key,
            validation,
            userinfo_url,
        })
    }

    async fn fetch_userinfo(&self, url: &str, token: &str) -> AppResult<Value> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Userinfo endpoint returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Rewrites base64url (optionally unpadded) into padded standard base64
fn to_standard_base64(secret: &str) -> String {
    let mut out: String = secret
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while out.len() % 4 != 0 {
        out.push('=');
    }
    out
}

#[async_trait::async_trait]
impl IdentityProvider for JwtIdentityProvider {
    fn validate(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    async fn fetch_profile(&self, token: &str) -> AppResult<User> {
        let claims = self.validate(token)?;

        let profile = match &self.userinfo_url {
            Some(url) => self.fetch_userinfo(url, token).await?,
            None => serde_json::to_value(&claims)
                .map_err(|e| AppError::Internal(format!("Claims serialization error: {}", e)))?,
        };

        tracing::debug!(subject = %claims.sub, "Fetched identity profile");

        Ok(User::from_profile(claims.sub, profile))
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}
