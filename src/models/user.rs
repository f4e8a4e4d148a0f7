//! Modelo de usuario autenticado
//!
//! Los usuarios viven en el proveedor de autenticación externo; aquí solo
//! modelamos lo que llega en los claims del JWT.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rol del usuario - claim `role` del token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
    Customer,
}

impl UserRole {
    /// Puede entrar al back-office
    pub fn is_back_office(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }
}

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
