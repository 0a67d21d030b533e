use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Member, MemberType};

/// JWT claims describing the authenticated member
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (member ID)
    pub sub: String,
    /// Empty for guests
    pub email: String,
    pub nickname: String,
    pub tag: String,
    pub member_type: MemberType,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `member` valid for `expiration_secs` seconds.
    pub fn for_member(member: &Member, expiration_secs: i64) -> Self {
        let now = jiff::Timestamp::now().as_second();

        Self {
            sub: member.id.to_string(),
            email: member.email.clone().unwrap_or_default(),
            nickname: member.nickname.clone(),
            tag: member.tag.clone(),
            member_type: member.member_type,
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Member id carried in `sub`
    pub fn member_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("invalid access token"))
    }
}

/// Signs an access token for `member` (HS256)
pub fn generate_access_token(
    member: &Member,
    secret: &str,
    expiration_secs: i64,
) -> AppResult<String> {
    let claims = Claims::for_member(member, expiration_secs);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates and decodes an access token
pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::unauthorized("Invalid token"),
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("Invalid token signature")
        }
        _ => AppError::unauthorized(format!("Token validation failed: {}", e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff_diesel::ToDiesel;

    const SECRET: &str = "test_secret_key_that_is_long_enough_for_hs256";

    fn member(member_type: MemberType, email: Option<&str>) -> Member {
        let now = crate::utils::time::now().to_diesel();
        Member {
            id: 42,
            nickname: "hana".to_string(),
            password: "hash".to_string(),
            member_type,
            tag: "AB12cd".to_string(),
            email: email.map(str::to_string),
            bio: None,
            profile_image_url: None,
            api_key: "api_key".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_round_trip_member_claims() {
        let member = member(MemberType::Member, Some("hana@example.com"));
        let token = generate_access_token(&member, SECRET, 3600).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();

        assert_eq!(claims.member_id().unwrap(), 42);
        assert_eq!(claims.email, "hana@example.com");
        assert_eq!(claims.nickname, "hana");
        assert_eq!(claims.tag, "AB12cd");
        assert_eq!(claims.member_type, MemberType::Member);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_guest_claims_have_empty_email() {
        let guest = member(MemberType::Guest, None);
        let claims = Claims::for_member(&guest, 60);
        assert_eq!(claims.email, "");
        assert_eq!(claims.member_type, MemberType::Guest);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token =
            generate_access_token(&member(MemberType::Member, None), SECRET, 3600).unwrap();
        let result = validate_access_token(&token, "another_secret_key_that_is_long_enough");
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token =
            generate_access_token(&member(MemberType::Member, None), SECRET, -3600).unwrap();
        match validate_access_token(&token, SECRET) {
            Err(AppError::Unauthorized { message }) => assert_eq!(message, "Token has expired"),
            other => panic!("Expected expired token error, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            validate_access_token("not.a.jwt", SECRET),
            Err(AppError::Unauthorized { .. })
        ));
    }
}
