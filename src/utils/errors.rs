//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::assignment::{ResourceConflict, ResourceKind};

/// Detalle de un conflicto de asignación o de borrado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ResourceConflict>,
    /// Campo de entrada responsable (placa o DUI duplicados)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl ConflictDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), conflicts: Vec::new(), field: None }
    }

    /// ¿Este conflicto nombra el recurso indicado?
    pub fn names(&self, resource: ResourceKind, id: Uuid) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.resource == resource && c.resource_id == id)
    }
}

impl fmt::Display for ConflictDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictDetail),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),
}

/// Respuesta de error para la API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                // El detalle de SQL se queda en el log
                tracing::error!(error = %e, "❌ Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "An error occurred while accessing the database".to_string(),
                        "DB_ERROR",
                    ),
                )
            }

            AppError::Validation(e) => {
                tracing::debug!(error = %e, "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Validation Error", "The provided data is invalid".to_string(), "VALIDATION_ERROR")
                        .with_details(json!(e)),
                )
            }

            AppError::Unauthorized(msg) => {
                tracing::debug!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"))
            }

            AppError::Forbidden(msg) => {
                tracing::debug!("Forbidden access: {}", msg);
                (StatusCode::FORBIDDEN, ErrorResponse::new("Forbidden", msg, "FORBIDDEN"))
            }

            AppError::NotFound(msg) => {
                tracing::debug!("Resource not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorResponse::new("Not Found", msg, "NOT_FOUND"))
            }

            AppError::Conflict(detail) => {
                tracing::debug!("Conflict: {}", detail);
                let details = json!({
                    "conflicts": detail.conflicts,
                    "field": detail.field,
                });
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Conflict", detail.message, "CONFLICT").with_details(details),
                )
            }

            AppError::BadRequest(msg) => {
                tracing::debug!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"))
            }

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        "INTERNAL_ERROR",
                    ),
                )
            }

            AppError::Jwt(msg) => {
                tracing::debug!("JWT error: {}", msg);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("JWT Error", msg, "JWT_ERROR"))
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación de un campo
pub fn validation_error(field: &'static str, code: &'static str, message: impl Into<String>) -> AppError {
    AppError::Validation(crate::utils::validation::single_field_error(field, code, message))
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} con id '{}' no encontrado", resource, id))
}

/// Función helper para conflictos de recursos ya vinculados
pub fn binding_conflict_error(conflicts: Vec<ResourceConflict>) -> AppError {
    let names: Vec<String> = conflicts
        .iter()
        .map(|c| match c.route_id {
            Some(route_id) => format!("el {} {} ya está asignado a la ruta {}", c.resource.label(), c.resource_id, route_id),
            None => format!("el {} {} ya está asignado a otra ruta", c.resource.label(), c.resource_id),
        })
        .collect();
    AppError::Conflict(ConflictDetail {
        message: format!("Conflicto de asignación: {}", names.join("; ")),
        conflicts,
        field: None,
    })
}

/// Función helper para borrados bloqueados por una ruta que referencia el recurso
pub fn resource_in_use_error(resource: ResourceKind, resource_id: Uuid, route_id: Uuid) -> AppError {
    AppError::Conflict(ConflictDetail {
        message: format!(
            "No se puede eliminar el {} {}: está asignado a la ruta {}",
            resource.label(),
            resource_id,
            route_id
        ),
        conflicts: vec![ResourceConflict { resource, resource_id, route_id: Some(route_id) }],
        field: None,
    })
}

/// Función helper para conflictos de unicidad de un campo
pub fn unique_conflict_error(resource: &str, field: &'static str, value: &str) -> AppError {
    AppError::Conflict(ConflictDetail {
        message: format!("Ya existe un {} con {} '{}'", resource, field, value),
        conflicts: Vec::new(),
        field: Some(field),
    })
}
