//! Bearer-token authentication
//!
//! Sessions are issued elsewhere; this service only verifies HS256 tokens whose
//! `sub` claim is the user id. Without a configured secret, verification is
//! disabled and every request is treated as coming from a trusted front end.
//!
//! Catalog writes additionally need a verified subject listed in
//! `auth.admin_subjects`, so they are refused outright while verification is
//! disabled.

use actix_web::{dev::Payload, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;

use crate::models::{ErrorResponse, UserId};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token subject does not match user {0}")]
    Forbidden(UserId),

    #[error("Catalog changes require an administrator token")]
    AdminRequired,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) | AuthError::AdminRequired => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unauthorized")
                .to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// JWT claims issued by the session layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies bearer tokens when a secret is configured
#[derive(Clone)]
pub struct Authenticator {
    key: Option<DecodingKey>,
    validation: Validation,
    admin_subjects: Vec<UserId>,
}

impl Authenticator {
    pub fn new(secret: Option<&str>, admin_subjects: Vec<UserId>) -> Self {
        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation: Validation::new(Algorithm::HS256),
            admin_subjects,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Resolve the caller from an `Authorization` header value
    pub fn authenticate(&self, header: Option<&str>) -> Result<Caller, AuthError> {
        let Some(key) = &self.key else {
            return Ok(Caller::trusted());
        };

        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken(format!("non-numeric subject {:?}", data.claims.sub)))?;

        Ok(Caller {
            subject: Some(user_id),
            admin: self.admin_subjects.contains(&user_id),
        })
    }
}

/// The authenticated caller
///
/// `subject` is `None` when authentication is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    subject: Option<UserId>,
    admin: bool,
}

impl Caller {
    /// Caller behind a trusted front end, with no verified identity
    pub fn trusted() -> Self {
        Self {
            subject: None,
            admin: false,
        }
    }

    pub fn subject(&self) -> Option<UserId> {
        self.subject
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Ensure the caller may change the scholarship catalog
    pub fn authorize_admin(&self) -> Result<(), AuthError> {
        if self.admin {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }

    /// Ensure the caller may act on behalf of `user_id`
    pub fn authorize(&self, user_id: UserId) -> Result<(), AuthError> {
        match self.subject {
            None => Ok(()),
            Some(id) if id == user_id => Ok(()),
            Some(_) => Err(AuthError::Forbidden(user_id)),
        }
    }
}

impl FromRequest for Caller {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let result = match req.app_data::<web::Data<Authenticator>>() {
            Some(auth) => auth.authenticate(header),
            None => Ok(Caller::trusted()),
        };

        if let Err(e) = &result {
            tracing::info!("Rejected request to {}: {}", req.path(), e);
        }

        ready(result)
    }
}
