//! Middleware de autenticación JWT
//!
//! Verifica el token del header Authorization, inyecta el
//! `AuthenticatedUser` en las extensions y controla el acceso por rol.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::warn;

use crate::{
    models::user::AuthenticatedUser,
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError, AppResult},
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;
    let user = AuthenticatedUser::try_from(claims)?;

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Solo admin y staff entran al back-office
pub async fn back_office_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.role.is_back_office() {
        warn!("🚫 Usuario {} sin acceso al back-office", user.user_id);
        return Err(AppError::Forbidden(
            "Se requiere rol admin o staff".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Las operaciones destructivas requieren rol admin
pub fn require_admin(user: &AuthenticatedUser, operation: &str) -> AppResult<()> {
    if !user.is_admin() {
        warn!("🚫 Usuario {} intentó {} sin rol admin", user.user_id, operation);
        return Err(forbidden_error(operation, "admin role required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use uuid::Uuid;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: None,
            role,
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&user(UserRole::Admin), "delete vehicle").is_ok());
        assert!(matches!(
            require_admin(&user(UserRole::Staff), "delete vehicle"),
            Err(AppError::Forbidden(_))
        ));
    }
}
