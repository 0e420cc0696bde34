//! Caller identification and access levels for the command endpoint.
//!
//! A small allow-list of actions runs anonymously, the rest require an
//! authenticated caller or an administrator. Privilege is checked before any
//! store access, so an unauthorized request never touches the database.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::security::decode_token;

/// Privilege required by a command, derived statically from its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Anonymous,
    Authenticated,
    Admin,
}

/// The validated identity of the request's sender, if any.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    fn level(&self) -> AccessLevel {
        if self.is_admin {
            AccessLevel::Admin
        } else {
            AccessLevel::Authenticated
        }
    }
}

/// Extractor that resolves the bearer token into an optional caller.
///
/// No Authorization header yields an anonymous caller (`None`); a header that
/// is present but malformed or carrying an invalid token is rejected with
/// 401 rather than silently downgraded.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Caller>);

impl MaybeCaller {
    /// Enforce the access level a command requires.
    pub fn require(&self, level: AccessLevel) -> Result<(), AppError> {
        match level {
            AccessLevel::Anonymous => Ok(()),
            AccessLevel::Authenticated => match &self.0 {
                Some(_) => Ok(()),
                None => Err(AppError::Unauthorized(
                    "Authentication required".to_string(),
                )),
            },
            AccessLevel::Admin => match &self.0 {
                Some(caller) if caller.level() >= AccessLevel::Admin => Ok(()),
                Some(_) => Err(AppError::Forbidden(
                    "Administrator access required".to_string(),
                )),
                None => Err(AppError::Unauthorized(
                    "Authentication required".to_string(),
                )),
            },
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|c| c.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(h) => h,
            None => return Ok(MaybeCaller(None)),
        };

        let auth_str = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let claims = decode_token(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(MaybeCaller(Some(Caller {
            user_id,
            email: claims.email,
            is_admin: claims.role.as_deref() == Some("admin"),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_admin: bool) -> MaybeCaller {
        MaybeCaller(Some(Caller {
            user_id: 7,
            email: Some("someone@example.com".to_string()),
            is_admin,
        }))
    }

    #[test]
    fn test_anonymous_passes_anonymous_level() {
        assert!(MaybeCaller(None).require(AccessLevel::Anonymous).is_ok());
    }

    #[test]
    fn test_anonymous_rejected_for_authenticated_level() {
        let err = MaybeCaller(None)
            .require(AccessLevel::Authenticated)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_member_rejected_for_admin_level() {
        let err = caller(false).require(AccessLevel::Admin).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_admin_passes_all_levels() {
        let admin = caller(true);
        assert!(admin.require(AccessLevel::Anonymous).is_ok());
        assert!(admin.require(AccessLevel::Authenticated).is_ok());
        assert!(admin.require(AccessLevel::Admin).is_ok());
    }

    #[test]
    fn test_caller_level_ordering() {
        assert!(AccessLevel::Anonymous < AccessLevel::Authenticated);
        assert!(AccessLevel::Authenticated < AccessLevel::Admin);
        assert_eq!(caller(true).0.unwrap().level(), AccessLevel::Admin);
    }
}
