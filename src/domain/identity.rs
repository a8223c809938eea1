use anyhow::Result;
use async_trait::async_trait;

use crate::domain::users::UserSource;

/// Third-party identity providers accepted for federated login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Google,
}

impl IdentityProvider {
    /// Source tag stamped on accounts created through this provider
    pub fn user_source(&self) -> UserSource {
        match self {
            IdentityProvider::Google => UserSource::Google,
        }
    }
}

/// Identity asserted by a verified provider token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: String,
    pub picture_url: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    fn provider(&self) -> IdentityProvider;

    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity>;
}
