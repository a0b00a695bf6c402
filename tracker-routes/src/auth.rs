//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs issued elsewhere with the same shared secret. The subject claim is the id
//! of the user the token was issued to. [`validate_token`] runs on every request and only rejects
//! requests that carry a bad token; handlers that need an identity ask for an [`AuthedUser`].
use crate::routes::responses::ApiError;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use engine::id::UserId;
use error_stack::{Report, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub type AuthResult<T> = Result<T, Report<MissingAuthProperty>>;

#[derive(Debug, thiserror::Error)]
#[error("{0} auth property not specified")]
pub struct MissingAuthProperty(&'static str);

const JWT_SECRET: &str = "JWT_SECRET";
const JWT_ISSUER: &str = "JWT_ISSUER";

#[derive(Clone)]
pub struct AuthConfig {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn new(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_env() -> AuthResult<Self> {
        let secret =
            std::env::var(JWT_SECRET).change_context(MissingAuthProperty(JWT_SECRET))?;
        let issuer = std::env::var(JWT_ISSUER).ok();
        if issuer.is_none() {
            info!("{JWT_ISSUER} not specified, token issuers will not be checked");
        }

        Ok(Self::new(secret.as_bytes(), issuer.as_deref()))
    }

    fn authenticate(&self, token: &str) -> Result<AuthedUser, InvalidToken> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| InvalidToken(e.to_string()))?;

        token_data.claims.try_into()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid token: {0}")]
pub struct InvalidToken(String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// expiration, seconds since the epoch
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl TryFrom<Claims> for AuthedUser {
    type Error = InvalidToken;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| InvalidToken(format!("subject '{}' is not a user id", claims.sub)))?;

        Ok(AuthedUser {
            id,
            email: claims.email.map(Into::into),
        })
    }
}

/// The identity behind a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthedUser {
    pub id: UserId,
    pub email: Option<Arc<str>>,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthedUser>().cloned().ok_or_else(|| {
            debug!("endpoint requires an authenticated user, none was found");
            ApiError::unauthorized("No token, authorization denied")
        })
    }
}

#[instrument(skip_all)]
pub async fn validate_token(
    State(config): State<AuthConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    // public endpoints accept requests without a token, protected ones extract `AuthedUser`
    if let Some(auth_header) = auth_header {
        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            error!("invalid authorization type");
            return ApiError::unauthorized("Token is not valid").into_response();
        };

        let authed_user = match config.authenticate(token) {
            Ok(user) => user,
            Err(e) => {
                error!("token validation error: {e}");
                return ApiError::unauthorized("Token is not valid").into_response();
            }
        };

        debug!("token validated for user '{}'", authed_user.id);
        request.extensions_mut().insert(authed_user);
    }

    next.run(request).await
}
