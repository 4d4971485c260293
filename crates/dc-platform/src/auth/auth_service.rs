//! Authentication Service
//!
//! JWT token generation and validation.
//! Supports both RS256 (RSA) for production and HS256 (HMAC) for development.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};
use crate::User;
use crate::shared::error::{PlatformError, Result};

/// JWT Claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID (unique identifier)
    pub jti: String,

    /// Principal scope (ADMIN or CUSTOMER)
    pub scope: String,

    /// User email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    pub name: String,

    /// Roles assigned to this principal
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// RSA private key PEM content (for RS256)
    /// Takes precedence over secret_key if set
    pub rsa_private_key: Option<String>,

    /// RSA public key PEM content (for RS256)
    pub rsa_public_key: Option<String>,

    /// JWT secret key for HS256 (fallback for development)
    pub secret_key: String,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Access token expiration in seconds
    pub access_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            rsa_private_key: None,
            rsa_public_key: None,
            secret_key: String::new(),
            issuer: "depositcore".to_string(),
            audience: "depositcore".to_string(),
            access_token_expiry_secs: 28800, // 8 hours
        }
    }
}

impl AuthConfig {
    /// Load RSA keys from file paths
    /// Falls back to env vars if files not found
    pub fn load_rsa_keys(
        private_key_path: Option<&str>,
        public_key_path: Option<&str>,
    ) -> (Option<String>, Option<String>) {
        let private_key = private_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "DC_JWT_PRIVATE_KEY"));

        let public_key = public_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "DC_JWT_PUBLIC_KEY"));

        (private_key, public_key)
    }

    /// Load key from file path, or from env var if path is empty/missing
    fn load_key_from_path_or_env(path: &str, env_var: &str) -> Option<String> {
        // Try file path first
        if !path.is_empty() {
            if let Ok(content) = fs::read_to_string(path) {
                info!("Loaded JWT key from file: {}", path);
                return Some(content);
            }
        }

        // Fall back to env var
        if let Ok(content) = std::env::var(env_var) {
            if !content.is_empty() {
                info!("Loaded JWT key from env: {}", env_var);
                return Some(content);
            }
        }

        None
    }
}

/// Authentication service for token management
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl AuthService {
    /// Create auth service with RSA keys (RS256) - recommended for production
    pub fn new_with_rsa(config: AuthConfig, private_key_pem: &str, public_key_pem: &str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal {
                message: format!("Invalid RSA private key: {}", e)
            })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal {
                message: format!("Invalid RSA public key: {}", e)
            })?;

        info!("AuthService initialized with RS256");

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
        })
    }

    /// Create auth service with HMAC secret (HS256) - for development/simple setups
    pub fn new_with_secret(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!("AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
        }
    }

    /// Create auth service - uses RSA if keys provided, falls back to HMAC
    pub fn new(config: AuthConfig) -> Self {
        if let (Some(ref private_key), Some(ref public_key)) =
            (&config.rsa_private_key, &config.rsa_public_key)
        {
            match Self::new_with_rsa(config.clone(), private_key, public_key) {
                Ok(service) => return service,
                Err(e) => {
                    warn!("Failed to initialize RSA keys, falling back to HMAC: {}", e);
                }
            }
        }

        Self::new_with_secret(config)
    }

    /// Get the algorithm being used
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_expiry_secs);

        let scope = if user.roles.is_empty() { "CUSTOMER" } else { "ADMIN" };

        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: crate::TsidGenerator::generate(),
            scope: scope.to_string(),
            email: Some(user.email.clone()),
            name: user.name.clone(),
            roles: user.roles.clone(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode JWT: {}", e) })
    }

    /// Validate an access token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }

    /// Check if claims have a specific role
    pub fn has_role(&self, claims: &AccessTokenClaims, role: &str) -> bool {
        claims.roles.contains(&role.to_string())
    }

    /// Check if claims are for an admin
    pub fn is_admin(&self, claims: &AccessTokenClaims) -> bool {
        claims.scope == "ADMIN"
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    if auth_header.starts_with("Bearer ") {
        Some(&auth_header[7..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    fn test_config() -> AuthConfig {
        AuthConfig {
            secret_key: "test-secret-key".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = AuthService::new(test_config());

        let user = User::new("alice@example.com", "Alice");
        let token = service.generate_access_token(&user).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.scope, "CUSTOMER");
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_admin_scope_token() {
        let service = AuthService::new(test_config());

        let mut user = User::new("ops@example.com", "Ops");
        user.roles = vec!["depositcore:operations-admin".to_string()];

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.scope, "ADMIN");
        assert!(service.is_admin(&claims));
        assert!(service.has_role(&claims, "depositcore:operations-admin"));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = AuthService::new(test_config());
        assert!(service.validate_token("not-a-token").is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
