//! JWT token signing and verification
//!
//! The codec is TTL-agnostic: callers pass the lifetime on every `sign`.
//! Verification collapses every failure into `None`; the precise reason is
//! only visible in debug logs.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use storefront_shared::Role;
use tracing::debug;
use uuid::Uuid;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a session is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub purpose: TokenPurpose,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// The identity embedded in these claims, without timing data
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Why a token was refused. Internal only; never surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Malformed,
    BadSignature,
    Expired,
    WrongPurpose,
}

/// Pre-computed JWT keys
///
/// Derived once at startup and shared behind `Arc`.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }
}

/// HS256 token codec
#[derive(Clone)]
pub struct TokenCodec {
    keys: JwtKeys,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock so it can be tested at the boundary
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            validation: Arc::new(validation),
        }
    }

    /// Sign a token for `identity` valid for `ttl_secs` from now
    pub fn sign(&self, identity: &Identity, purpose: TokenPurpose, ttl_secs: i64) -> Result<String> {
        self.sign_at(identity, purpose, ttl_secs, Utc::now())
    }

    /// Sign a token as if issued at `now`
    pub fn sign_at(
        &self,
        identity: &Identity,
        purpose: TokenPurpose,
        ttl_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if ttl_secs <= 0 {
            anyhow::bail!("Token lifetime must be positive, got {}", ttl_secs);
        }

        let exp = Duration::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| anyhow::anyhow!("Token lifetime {}s is out of range", ttl_secs))?;
        let claims = IdentityClaims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            purpose,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign {} token: {}", purpose, e))
    }

    /// Verify a token for the given purpose
    #[inline]
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Option<IdentityClaims> {
        self.verify_at(token, purpose, Utc::now())
    }

    /// Verify a token as of `now`
    pub fn verify_at(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Option<IdentityClaims> {
        match self.inspect(token, purpose, now) {
            Ok(claims) => Some(claims),
            Err(reason) => {
                debug!(?reason, expected = %purpose, "Token rejected");
                None
            }
        }
    }

    /// Verify a token and classify any failure
    pub fn inspect(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<IdentityClaims, TokenRejection> {
        let claims = decode::<IdentityClaims>(token, &self.keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })?
            .claims;

        if claims.exp < now.timestamp() {
            return Err(TokenRejection::Expired);
        }
        if claims.purpose != purpose {
            return Err(TokenRejection::WrongPurpose);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret";

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            name: Name().fake(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let codec = TokenCodec::new(SECRET);
        let identity = identity();

        let token = codec.sign(&identity, TokenPurpose::Access, 900).unwrap();
        let claims = codec.verify(&token, TokenPurpose::Access).unwrap();

        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(SECRET);
        let issued = Utc::now();
        let ttl = 3600;
        let token = codec
            .sign_at(&identity(), TokenPurpose::Access, ttl, issued)
            .unwrap();

        let just_before = issued + Duration::seconds(ttl - 1);
        let just_after = issued + Duration::seconds(ttl + 1);

        assert!(codec.verify_at(&token, TokenPurpose::Access, just_before).is_some());
        assert!(codec.verify_at(&token, TokenPurpose::Access, just_after).is_none());
        assert_eq!(
            codec.inspect(&token, TokenPurpose::Access, just_after),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"another-secret");
        let token = signer.sign(&identity(), TokenPurpose::Access, 900).unwrap();

        assert!(other.verify(&token, TokenPurpose::Access).is_none());
        assert_eq!(
            other.inspect(&token, TokenPurpose::Access, Utc::now()),
            Err(TokenRejection::BadSignature)
        );
    }

    #[test]
    fn test_purpose_is_enforced() {
        let codec = TokenCodec::new(SECRET);
        let refresh = codec.sign(&identity(), TokenPurpose::Refresh, 900).unwrap();

        assert!(codec.verify(&refresh, TokenPurpose::Access).is_none());
        assert!(codec.verify(&refresh, TokenPurpose::Refresh).is_some());
        assert_eq!(
            codec.inspect(&refresh, TokenPurpose::Access, Utc::now()),
            Err(TokenRejection::WrongPurpose)
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.sign(&identity(), TokenPurpose::Access, 900).unwrap();

        // Flip a character in the middle of the signature segment
        let sig_start = token.rfind('.').unwrap() + 1;
        let idx = sig_start + (token.len() - sig_start) / 2;
        let original = token.as_bytes()[idx];
        let replacement = if original == b'A' { 'B' } else { 'A' };
        let mut tampered = token.clone();
        tampered.replace_range(idx..idx + 1, &replacement.to_string());

        assert_ne!(tampered, token);
        assert!(codec.verify(&tampered, TokenPurpose::Access).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = TokenCodec::new(SECRET);
        for token in ["", "invalid", "invalid.token.here", "a.b", "...."] {
            assert!(codec.verify(token, TokenPurpose::Access).is_none());
            assert_eq!(
                codec.inspect(token, TokenPurpose::Access, Utc::now()),
                Err(TokenRejection::Malformed)
            );
        }
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let codec = TokenCodec::new(SECRET);
        assert!(codec.sign(&identity(), TokenPurpose::Access, 0).is_err());
        assert!(codec.sign(&identity(), TokenPurpose::Access, -5).is_err());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let codec = TokenCodec::new(SECRET);
        assert!(codec
            .sign(&identity(), TokenPurpose::Refresh, 10_000_000_000_000_000)
            .is_err());
        assert!(codec.sign(&identity(), TokenPurpose::Refresh, i64::MAX).is_err());
    }

    #[test]
    fn test_payload_field_names() {
        use base64_payload::decode_payload;

        let codec = TokenCodec::new(SECRET);
        let token = codec.sign(&identity(), TokenPurpose::Refresh, 60).unwrap();
        let payload = decode_payload(&token);

        for field in ["userId", "email", "name", "role", "purpose", "iat", "exp"] {
            assert!(payload.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(payload["purpose"], "refresh");
    }

    #[test]
    fn test_codec_is_clone_cheap() {
        let codec = TokenCodec::new(SECRET);
        let cloned = codec.clone();
        let token = codec.sign(&identity(), TokenPurpose::Access, 60).unwrap();
        assert!(cloned.verify(&token, TokenPurpose::Access).is_some());
    }

    /// Reads the claims segment without verification, for asserting the wire shape.
    mod base64_payload {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        pub fn decode_payload(token: &str) -> serde_json::Value {
            let segment = token.split('.').nth(1).unwrap();
            let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_round_trip_preserves_identity(
            email in "[a-z]{1,12}@[a-z]{1,8}\\.com",
            name in "\\PC{1,30}",
            admin in any::<bool>(),
            ttl in 1i64..=30 * 86400,
        ) {
            let codec = TokenCodec::new(SECRET);
            let identity = Identity {
                user_id: Uuid::new_v4(),
                email,
                name,
                role: if admin { Role::Admin } else { Role::Customer },
            };
            let token = codec.sign(&identity, TokenPurpose::Access, ttl).unwrap();
            let claims = codec.verify(&token, TokenPurpose::Access);
            prop_assert_eq!(claims.map(|c| c.identity()), Some(identity));
        }
    }
}
