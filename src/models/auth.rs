//! Identidad del llamador
//!
//! El colaborador de autorización externo entrega un rol opaco; el motor solo
//! necesita saber si el llamador tiene la capacidad de administrador.

use serde::{Deserialize, Serialize};

use crate::utils::errors::{AppError, AppResult};

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Administrator,
    Dispatcher,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Administrator => "administrator",
            UserRole::Dispatcher => "dispatcher",
        }
    }
}

/// Llamador autenticado de una operación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub subject: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(subject: impl Into<String>, role: UserRole) -> Self {
        Self { subject: subject.into(), role }
    }

    pub fn administrator(subject: impl Into<String>) -> Self {
        Self::new(subject, UserRole::Administrator)
    }

    pub fn dispatcher(subject: impl Into<String>) -> Self {
        Self::new(subject, UserRole::Dispatcher)
    }

    pub fn is_administrator(&self) -> bool {
        self.role == UserRole::Administrator
    }

    /// Rechazar llamadas sin la capacidad de administrador
    pub fn require_admin(&self, operation: &str) -> AppResult<()> {
        if self.is_administrator() {
            return Ok(());
        }
        tracing::warn!(subject = %self.subject, role = self.role.as_str(), operation, "🚫 Operación rechazada: se requiere administrador");
        Err(AppError::Forbidden(format!(
            "Se requieren permisos de administrador para {}",
            operation
        )))
    }
}
