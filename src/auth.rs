/// Bearer-token auth gate.
///
/// Verifies HS256 JWTs from the Authorization header and hands the
/// caller's identity to the handlers. Every failure mode (missing,
/// malformed, expired) gets the same 401 body on purpose.
use actix_web::error::InternalError;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponse};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::{ready, Ready};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub login_name: String,
    /// Expiry, seconds since epoch
    pub exp: usize,
}

/// Signing and verification keys plus the token lifetime, shared with
/// the handlers as app data.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
}

impl AuthKeys {
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        AuthKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Issue a token for a freshly authenticated user.
    pub fn issue(
        &self,
        user_id: &str,
        login_name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            login_name: login_name.to_string(),
            exp: (Utc::now().timestamp() + self.token_ttl_secs) as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub login_name: String,
}

fn unauthorized() -> actix_web::Error {
    InternalError::from_response(
        "Unauthorized",
        HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" })),
    )
    .into()
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let keys = match req.app_data::<web::Data<AuthKeys>>() {
            Some(keys) => keys,
            None => return ready(Err(unauthorized())),
        };

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token,
            None => return ready(Err(unauthorized())),
        };

        match keys.verify(token) {
            Ok(claims) => ready(Ok(AuthUser {
                user_id: claims.sub,
                login_name: claims.login_name,
            })),
            Err(_) => ready(Err(unauthorized())),
        }
    }
}
