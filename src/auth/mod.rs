//! Authentication for nfs-web-ui
//!
//! A single static admin identity, checked against an Argon2 hash computed
//! once at startup, and HS256 bearer tokens issued on login.

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Settings;
use crate::error::{ExportsError, ExportsResult};

/// Password used when neither a password nor a hash is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Hash a password into an Argon2 PHC string
pub fn hash_password(plain: &str) -> ExportsResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| ExportsError::Auth(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// The admin identity
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password_hash: String,
}

impl Credentials {
    /// Create credentials from a username and a PHC hash
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> ExportsResult<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| ExportsError::Config(format!("Invalid admin password hash: {}", e)))?;

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Build credentials from settings
    ///
    /// A configured hash is used as-is; a plaintext password is hashed here,
    /// once. Without either the default password applies.
    pub fn from_settings(settings: &Settings) -> ExportsResult<Self> {
        let hash = match (&settings.admin_password_hash, &settings.admin_password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hash_password(password)?,
            (None, None) => {
                warn!(
                    username = %settings.admin_username,
                    "no admin password configured, using the default; change it in production"
                );
                hash_password(DEFAULT_ADMIN_PASSWORD)?
            }
        };

        Self::new(settings.admin_username.clone(), hash)
    }

    /// Admin username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a login attempt
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }

        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(PasswordHashError::Password) => false,
            Err(e) => {
                warn!(error = %e, "password verification failed");
                false
            }
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer for the given secret
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Build an issuer from settings, generating a secret when none is set
    pub fn from_settings(settings: &Settings) -> Self {
        let secret = match &settings.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("no JWT secret configured, tokens will not survive a restart");
                generate_secret()
            }
        };

        Self::new(secret.as_bytes(), Duration::hours(settings.token_ttl_hours))
    }

    /// Issue a token for `username`
    pub fn issue(&self, username: &str) -> ExportsResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ExportsError::Auth(format!("Failed to issue token: {}", e)))
    }

    /// Verify a token's signature and expiry
    pub fn verify(&self, token: &str) -> ExportsResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ExportsError::Auth(format!("Invalid token: {}", e)))
    }
}

fn generate_secret() -> String {
    // Two salts give 32 random bytes
    format!(
        "{}{}",
        SaltString::generate(&mut OsRng).as_str(),
        SaltString::generate(&mut OsRng).as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));

        let credentials = Credentials::new("admin", hash).unwrap();
        assert!(credentials.verify("admin", "s3cret"));
        assert!(!credentials.verify("admin", "wrong"));
        assert!(!credentials.verify("root", "s3cret"));
    }

    #[test]
    fn test_rejects_malformed_hash() {
        assert!(Credentials::new("admin", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_default_password() {
        let credentials = Credentials::from_settings(&Settings::default()).unwrap();
        assert_eq!(credentials.username(), "admin");
        assert!(credentials.verify("admin", DEFAULT_ADMIN_PASSWORD));
    }

    #[test]
    fn test_plaintext_password_from_settings() {
        let settings = Settings {
            admin_username: "ops".into(),
            admin_password: Some("hunter2".into()),
            ..Settings::default()
        };
        let credentials = Credentials::from_settings(&settings).unwrap();
        assert!(credentials.verify("ops", "hunter2"));
        assert!(!credentials.verify("ops", DEFAULT_ADMIN_PASSWORD));
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(24));
        let token = issuer.issue("admin").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(24));
        let other = TokenIssuer::new(b"other-secret", Duration::hours(24));

        let token = other.issue("admin").unwrap();
        assert!(matches!(issuer.verify(&token), Err(ExportsError::Auth(_))));
        assert!(issuer.verify("garbage").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(-2));
        let token = issuer.issue("admin").unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_generated_secret_is_random() {
        assert_ne!(generate_secret(), generate_secret());
        assert!(generate_secret().len() >= 40);
    }
}
