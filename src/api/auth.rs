use crate::error::{Error, Result};
use crate::types::ids::UserId;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: u64,     // Expiration time
    pub iat: u64,     // Issued at
    pub role: String, // User role (user, admin)
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId> {
        UserId::parse(&self.sub).map_err(|_| Error::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.role != ADMIN_ROLE {
            return Err(Error::AdminRequired);
        }
        Ok(())
    }
}

pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        JwtAuth {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, user_id: UserId, role: &str, duration_secs: u64) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + duration_secs,
            iat: now,
            role: role.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| Error::AuthenticationError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| Error::AuthenticationError(e.to_string()))?;

        Ok(token_data.claims)
    }
}

lazy_static::lazy_static! {
    static ref JWT_AUTH: JwtAuth = {
        let secret = std::env::var("STREAMPOINTS_JWT_SECRET")
            .unwrap_or_else(|_| "default_secret_change_in_production".to_string());
        JwtAuth::new(&secret)
    };
}

pub async fn auth_middleware(
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = JWT_AUTH
        .verify_token(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let auth = JwtAuth::new("test-secret");
        let user = UserId::new();

        let token = auth.generate_token(user, "user", 3600).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
        assert!(claims.require_admin().is_err());
    }

    #[test]
    fn admin_role_passes_the_gate() {
        let auth = JwtAuth::new("test-secret");
        let token = auth.generate_token(UserId::new(), ADMIN_ROLE, 3600).unwrap();
        let claims = auth.verify_token(&token).unwrap();
        claims.require_admin().unwrap();
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = JwtAuth::new("secret-a")
            .generate_token(UserId::new(), "user", 3600)
            .unwrap();
        assert!(JwtAuth::new("secret-b").verify_token(&token).is_err());
    }
}
