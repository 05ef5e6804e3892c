//! Token service - signed, time-limited bearer tokens
//!
//! Tokens are HS256 JWTs keyed with the server secret. They are stateless
//! and stay valid until `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::result::{Error, Result};
use crate::domain::Claims;

/// Default token lifetime in minutes
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Signing secret and token lifetime
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Issues and validates bearer tokens
pub struct TokenService {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: TokenSettings) -> Result<Self> {
        if settings.secret.is_empty() {
            return Err(Error::Config("token signing secret must not be empty".to_string()));
        }
        if settings.ttl <= Duration::zero() {
            return Err(Error::Config("token ttl must be positive".to_string()));
        }

        // Expiry is checked against the caller's clock in `validate_at`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        Ok(Self {
            ttl: settings.ttl,
            encoding_key: EncodingKey::from_secret(&settings.secret),
            decoding_key: DecodingKey::from_secret(&settings.secret),
            validation,
        })
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_at(subject, self.ttl, Utc::now())
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        if ttl <= Duration::zero() {
            return Err(Error::validation("token ttl must be positive"));
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Config(format!("token ttl {} is out of range", ttl)))?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Other(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return its subject
    pub fn validate(&self, token: &str) -> Result<String> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`
    ///
    /// Malformed, tampered and expired tokens all yield `Unauthorized`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| Error::Unauthorized)?
            .claims;

        if claims.sub.is_empty() || now.timestamp() >= claims.exp {
            return Err(Error::Unauthorized);
        }
        Ok(claims.sub)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(TokenSettings::new(
            secret.as_bytes().to_vec(),
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        ))
        .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_issue_then_validate() {
        let tokens = service("secret");
        let token = tokens.issue("alice").unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice");
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expiry_with_simulated_clock() {
        let tokens = service("secret");
        let token = tokens.issue_at("alice", Duration::seconds(30), t0()).unwrap();

        assert_eq!(
            tokens.validate_at(&token, t0() + Duration::seconds(29)).unwrap(),
            "alice"
        );
        assert!(matches!(
            tokens.validate_at(&token, t0() + Duration::seconds(31)),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("secret-a").issue("alice").unwrap();
        assert!(matches!(service("secret-b").validate(&token), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let tokens = service("secret");
        let alice = tokens.issue("alice").unwrap();
        let mallory = service("other").issue("mallory").unwrap();

        // Mallory's claims under Alice's signature
        let a: Vec<&str> = alice.split('.').collect();
        let m: Vec<&str> = mallory.split('.').collect();
        let forged = format!("{}.{}.{}", a[0], m[1], a[2]);

        assert!(matches!(tokens.validate(&forged), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_unsigned_algorithm_rejected() {
        let tokens = service("secret");
        // {"alg":"none"} . {"sub":"alice","exp":99999999999} . <empty>
        let token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJhbGljZSIsImV4cCI6OTk5OTk5OTk5OTl9.";

        assert!(matches!(tokens.validate(token), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service("secret");
        for bad in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(matches!(tokens.validate(bad), Err(Error::Unauthorized)), "{}", bad);
        }
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let tokens = service("secret");
        assert!(tokens.issue_with_ttl("alice", Duration::zero()).is_err());
        assert!(TokenService::new(TokenSettings::new(b"s".to_vec(), Duration::zero())).is_err());
        assert!(TokenService::new(TokenSettings::new(Vec::new(), Duration::minutes(1))).is_err());
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer   tok "), Some("tok"));
        assert_eq!(parse_bearer("Basic dXNlcjpwdw=="), None);
        assert_eq!(parse_bearer("Bearer "), None);
    }

    #[test]
    fn test_ttl_past_end_of_time_is_an_error() {
        let tokens = service("secret");
        let result = tokens.issue_at("alice", Duration::days(100_000_000), t0());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_debug_redacts_secret() {
        let settings = TokenSettings::new(b"super-secret".to_vec(), Duration::minutes(5));
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
