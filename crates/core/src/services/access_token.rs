//! Media-room access token issuer.
//!
//! Tokens are signed HS256 JWTs scoped to a single stream room. The
//! lifetime is fixed by configuration and does not track the stream:
//! a stream that ends early simply leaves tokens that no longer map to
//! a joinable room.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use streamgate_common::{AppError, AppResult, config::AccessTokenConfig};
use streamgate_db::entities::user::{self, UserRole};

/// Role the token grants inside the media room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantRole {
    /// The stream's creator.
    Creator,
    /// Platform staff joining as a moderator.
    Moderator,
    /// Everyone else.
    Viewer,
}

impl GrantRole {
    /// Room role for an account joining a given creator's stream.
    /// Owning the stream outranks a staff role.
    #[must_use]
    pub fn for_account(account: &user::Model, creator_id: &str) -> Self {
        if account.id == creator_id {
            Self::Creator
        } else if matches!(account.role, UserRole::Moderator | UserRole::Admin) {
            Self::Moderator
        } else {
            Self::Viewer
        }
    }
}

/// Signed claims of a room access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClaims {
    /// Account the token was issued to.
    pub sub: String,
    /// Room the token is valid for, `stream:{stream_id}`.
    pub room: String,
    /// Granted room role.
    pub role: GrantRole,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// An issued token together with its decoded claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed compact JWT.
    pub token: String,
    /// The claims it carries.
    pub claims: RoomClaims,
}

/// Access token issuer.
#[derive(Clone)]
pub struct AccessTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

// The keys wrap the signing secret and must never reach logs.
impl std::fmt::Debug for AccessTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenService")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

impl AccessTokenService {
    /// Create an issuer from configuration. An empty signing secret is
    /// a deployment error and is rejected up front.
    pub fn new(config: &AccessTokenConfig) -> AppResult<Self> {
        if config.signing_secret.is_empty() {
            return Err(AppError::Config(
                "access_token.signing_secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            ttl_hours: config.ttl_hours,
        })
    }

    /// Room identifier for a stream.
    #[must_use]
    pub fn room_for(stream_id: &str) -> String {
        format!("stream:{stream_id}")
    }

    /// Issue a token granting `role` in the room of `stream_id`.
    pub fn issue(
        &self,
        account_id: &str,
        stream_id: &str,
        role: GrantRole,
    ) -> AppResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = RoomClaims {
            sub: account_id.to_string(),
            room: Self::room_for(stream_id),
            role,
            iat: now,
            exp: now + self.ttl_hours * 3600,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::TokenSigning(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> AppResult<RoomClaims> {
        let data = jsonwebtoken::decode::<RoomClaims>(
            token,
            &self.decoding_key,
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use streamgate_db::entities::user::AccountStatus;

    fn config(secret: &str) -> AccessTokenConfig {
        AccessTokenConfig {
            signing_secret: secret.to_string(),
            ttl_hours: 24,
        }
    }

    fn account(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role,
            status: AccountStatus::Active,
            email_verified: true,
            ban_reason: None,
            ban_expires_at: None,
            suspension_reason: None,
            suspension_expires_at: None,
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = AccessTokenService::new(&config("")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn debug_output_redacts_the_signing_secret() {
        let service = AccessTokenService::new(&config("super-secret")).unwrap();
        let rendered = format!("{service:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("ttl_hours"));
    }

    #[test]
    fn issued_token_round_trips() {
        let service = AccessTokenService::new(&config("test-secret")).unwrap();
        let issued = service
            .issue("user1", "stream1", GrantRole::Viewer)
            .unwrap();

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.room, "stream:stream1");
        assert_eq!(claims.role, GrantRole::Viewer);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn verification_fails_with_a_different_secret() {
        let issuer = AccessTokenService::new(&config("secret-a")).unwrap();
        let verifier = AccessTokenService::new(&config("secret-b")).unwrap();
        let issued = issuer.issue("user1", "stream1", GrantRole::Viewer).unwrap();

        let err = verifier.verify(&issued.token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn creator_grant_outranks_staff_role() {
        let admin_creator = account("creator1", UserRole::Admin);
        assert_eq!(
            GrantRole::for_account(&admin_creator, "creator1"),
            GrantRole::Creator
        );

        let moderator = account("mod1", UserRole::Moderator);
        assert_eq!(
            GrantRole::for_account(&moderator, "creator1"),
            GrantRole::Moderator
        );

        let viewer = account("user1", UserRole::Viewer);
        assert_eq!(
            GrantRole::for_account(&viewer, "creator1"),
            GrantRole::Viewer
        );
    }
}
