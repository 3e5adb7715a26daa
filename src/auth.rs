use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderMap};
use actix_web::middleware::Next;
use actix_web::{HttpMessage, web};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Who made the request, as established by the [`Authenticator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token expiry {0} is out of range")]
    BadExpiry(i64),
}

/// Turns a bearer credential into an identity, or refuses it.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credential: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// HS256 tokens signed with a shared secret.
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, credential: &str) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(credential, &self.key, &self.validation)?.claims;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::BadExpiry(claims.exp))?;
        Ok(Identity {
            subject: claims.sub,
            expires_at,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &ServiceRequest) -> Result<Identity, ApiError> {
    let authenticator = req
        .app_data::<web::Data<dyn Authenticator>>()
        .ok_or_else(|| ApiError::Internal("authenticator is not configured".to_string()))?;

    let Some(token) = bearer_token(req.headers()) else {
        tracing::warn!(path = %req.path(), "request without bearer token");
        return Err(ApiError::Unauthorized("Not authorized, no token".to_string()));
    };

    authenticator.authenticate(token).map_err(|err| {
        tracing::warn!(path = %req.path(), error = %err, "bearer token rejected");
        ApiError::Unauthorized("Not authorized, token failed".to_string())
    })
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header
/// and makes the caller's [`Identity`] available to handlers.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, actix_web::Error> {
    let identity = match authenticate(&req) {
        Ok(identity) => identity,
        Err(err) => return Ok(req.error_response(err).map_into_right_body()),
    };

    tracing::debug!(subject = %identity.subject, expires_at = %identity.expires_at, "authenticated");
    req.extensions_mut().insert(identity);
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
pub(crate) fn issue_token(secret: &str, subject: &str, ttl: chrono::Duration) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        sub: subject.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::test::{TestRequest, call_and_read_body, call_service, init_service, read_body_json};
    use actix_web::{App, HttpResponse};
    use chrono::Duration;

    use super::*;
    use crate::model::Message;

    const SECRET: &str = "test-secret";

    #[test]
    fn accepts_token_signed_with_secret() {
        let token = issue_token(SECRET, "user-42", Duration::hours(1));
        let identity = JwtAuthenticator::new(SECRET).authenticate(&token).unwrap();
        assert_eq!(identity.subject, "user-42");
        assert!(identity.expires_at > Utc::now());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = issue_token("other-secret", "user-42", Duration::hours(1));
        assert!(JwtAuthenticator::new(SECRET).authenticate(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let token = issue_token(SECRET, "user-42", Duration::hours(-2));
        assert!(JwtAuthenticator::new(SECRET).authenticate(&token).is_err());
    }

    #[test]
    fn parses_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    async fn whoami(identity: web::ReqData<Identity>) -> HttpResponse {
        HttpResponse::Ok().body(identity.subject.clone())
    }

    #[actix_web::test]
    async fn gate_passes_identity_through() {
        let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(SECRET));
        let app = init_service(
            App::new()
                .app_data(web::Data::from(authenticator))
                .service(
                    web::scope("/private")
                        .wrap(from_fn(require_bearer))
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        let token = issue_token(SECRET, "user-7", Duration::minutes(5));
        let req = TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"user-7"));
    }

    #[actix_web::test]
    async fn gate_rejects_missing_and_bad_tokens() {
        let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(SECRET));
        let app = init_service(
            App::new()
                .app_data(web::Data::from(authenticator))
                .service(
                    web::scope("/private")
                        .wrap(from_fn(require_bearer))
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        let req = TestRequest::get().uri("/private").to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Message = read_body_json(res).await;
        assert_eq!(body, Message::new("Not authorized, no token"));

        let req = TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, "Bearer garbage"))
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Message = read_body_json(res).await;
        assert_eq!(body, Message::new("Not authorized, token failed"));
    }
}
