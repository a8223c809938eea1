use crate::domain::auth::{Claims, TokenCodec, TokenType};
use crate::domain::users::User;
use crate::infrastructure::config::JwtConfig;
use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// JWT codec using the HS256 algorithm
pub struct JwtAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtAuthService {
    pub fn new(config: &JwtConfig) -> Self {
        Self::from_secret(
            config.secret.as_bytes(),
            &config.issuer,
            &config.audience,
            config.access_token_expiry,
            config.refresh_token_expiry,
        )
    }

    pub fn from_secret(
        secret: &[u8],
        issuer: &str,
        audience: &str,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    fn issue(&self, user: &User, token_type: TokenType, ttl: i64) -> Result<(String, Claims)> {
        let claims = Claims::for_user(user, token_type, &self.issuer, &self.audience, ttl);
        let header = Header::new(Algorithm::HS256);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to generate {} token: {}", token_type, e))?;

        Ok((token, claims))
    }
}

impl TokenCodec for JwtAuthService {
    fn issue_access_token(&self, user: &User) -> Result<(String, Claims)> {
        self.issue(user, TokenType::Access, self.access_token_expiry)
    }

    fn issue_refresh_token(&self, user: &User) -> Result<(String, Claims)> {
        self.issue(user, TokenType::Refresh, self.refresh_token_expiry)
    }

    fn validate_token(&self, token: &str) -> Result<Claims> {
        // `Validation::new` pins the algorithm list, so a token whose header
        // names anything but HS256 fails before the signature is checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            anyhow::anyhow!("Invalid token: {}", e)
        })?;

        Ok(token_data.claims)
    }

    fn access_token_ttl(&self) -> i64 {
        self.access_token_expiry
    }

    fn refresh_token_ttl(&self) -> i64 {
        self.refresh_token_expiry
    }
}
