//! Caller identity.
//!
//! Authentication happens upstream; the gateway verifies the session and
//! forwards `X-User-Id` / `X-User-Role`. This extractor trusts those headers
//! as-is and only validates their shape.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::Role;
use crate::utils::error::AppError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn require_organizer(&self) -> Result<(), AppError> {
        if self.role == Role::Organizer {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Organizer role required".to_string(),
            ))
        }
    }

    pub fn require_customer(&self) -> Result<(), AppError> {
        if self.role == Role::Customer {
            Ok(())
        } else {
            Err(AppError::Forbidden("Customer role required".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_str(parts, USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::AuthError("Malformed user id".to_string()))?;
        let role = header_str(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|_| AppError::AuthError("Unknown role".to_string()))?;

        Ok(Identity { user_id, role })
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::AuthError(format!("Missing {name} header")))?
        .to_str()
        .map_err(|_| AppError::AuthError(format!("Invalid {name} header")))
}
