//! Bearer-token identity provider
//!
//! Tokens are minted by the organization's identity service; this side only
//! verifies them. [`JwtService::issue`] exists for tooling and tests that need
//! a token signed with the shared secret.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use collab_core::{DomainError, IdentityProvider, Principal, RepoResult, Role, Snowflake};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Missing roles mean a regular user
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn principal(&self) -> Result<Principal, AppError> {
        let roles = if self.roles.is_empty() {
            vec![Role::Regular]
        } else {
            self.roles.clone()
        };
        Ok(Principal {
            user_id: self.user_id()?,
            roles,
        })
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
    issuer: Option<String>,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            issuer: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            ..Self::new(&config.secret, config.access_token_expiry)
        }
    }

    /// Sign a token for `principal`
    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            roles: principal.roles.clone(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode JWT: {e}")))
    }

    /// Decode and validate signature, expiry and (when configured) issuer
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        self.decode_token(token)?.principal()
    }
}

#[async_trait]
impl IdentityProvider for JwtService {
    async fn authenticate(&self, credential: &str) -> RepoResult<Principal> {
        self.verify(credential)
            .map_err(|e| DomainError::Unauthenticated(e.to_string()))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiry_secs", &self.expiry_secs)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let token = svc.issue(&Principal::new(Snowflake::new(12345))).unwrap();
        let principal = svc.verify(&token).unwrap();
        assert_eq!(principal.user_id, Snowflake::new(12345));
        assert!(!principal.is_admin());
    }

    #[test]
    fn test_admin_role_survives() {
        let svc = service();
        let token = svc.issue(&Principal::admin(Snowflake::new(7))).unwrap();
        assert!(svc.verify(&token).unwrap().is_admin());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().decode_token("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(&Principal::new(Snowflake::new(1))).unwrap();
        let other = JwtService::new("another-secret-key-also-long-enough", 900);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let svc = JwtService::new("test-secret-key-that-is-long-enough", -600);
        let token = svc.issue(&Principal::new(Snowflake::new(1))).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_issuer_enforced() {
        let config = JwtConfig {
            secret: "test-secret-key-that-is-long-enough".to_string(),
            access_token_expiry: 900,
            issuer: Some("hr-platform".to_string()),
        };
        let strict = JwtService::from_config(&config);
        let token = service().issue(&Principal::new(Snowflake::new(1))).unwrap();
        assert!(strict.verify(&token).is_err());

        let token = strict.issue(&Principal::new(Snowflake::new(1))).unwrap();
        assert!(strict.verify(&token).is_ok());
    }

    #[test]
    fn test_claims_without_roles_are_regular() {
        let claims = Claims {
            sub: "42".to_string(),
            iat: 0,
            exp: i64::MAX,
            roles: Vec::new(),
            iss: None,
        };
        let principal = claims.principal().unwrap();
        assert_eq!(principal.roles, vec![Role::Regular]);
    }

    #[tokio::test]
    async fn test_identity_provider_maps_errors() {
        let err = service().authenticate("nope").await.unwrap_err();
        assert!(err.is_authentication());
    }
}
