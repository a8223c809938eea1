use crate::domain::identity::{ExternalIdentity, IdentityProvider, IdentityVerifier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Fields of the Google tokeninfo response we rely on
#[derive(Debug, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    pub email: Option<String>,
    /// Google sends this as the string "true"
    pub email_verified: Option<serde_json::Value>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleTokenInfo {
    fn email_is_verified(&self) -> bool {
        match &self.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Check audience and email, then convert
    pub fn into_identity(self, allowed_client_ids: &[String]) -> Result<ExternalIdentity> {
        if !allowed_client_ids.iter().any(|id| *id == self.aud) {
            anyhow::bail!("Invalid Google token audience: {}", self.aud);
        }
        if !self.email_is_verified() {
            anyhow::bail!("Google account email is not verified");
        }

        let email = self
            .email
            .filter(|e| !e.is_empty())
            .context("Google token carries no email")?;
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(ExternalIdentity {
            email,
            name,
            picture_url: self.picture.filter(|p| !p.is_empty()),
        })
    }
}

pub struct GoogleIdentityVerifier {
    http_client: reqwest::Client,
    tokeninfo_url: String,
    allowed_client_ids: Vec<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(allowed_client_ids: Vec<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build Google HTTP client")?;

        Ok(Self::with_client(
            http_client,
            GOOGLE_TOKENINFO_URL.to_string(),
            allowed_client_ids,
        ))
    }

    pub fn with_client(
        http_client: reqwest::Client,
        tokeninfo_url: String,
        allowed_client_ids: Vec<String>,
    ) -> Self {
        Self {
            http_client,
            tokeninfo_url,
            allowed_client_ids,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Google
    }

    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity> {
        let response = self
            .http_client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .context("Failed to reach Google tokeninfo")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Google token validation failed with status: {}", status);
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .context("Malformed Google tokeninfo response")?;

        info.into_identity(&self.allowed_client_ids)
    }
}
