//! Autenticación por JWT
//!
//! Extractor que convierte el header `Authorization: Bearer …` en el `Actor`
//! de la operación. El rol llega firmado por el colaborador de autorización.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    models::auth::Actor,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let claims = verify_token(token, &state.jwt)?;
        Ok(Actor::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::auth::UserRole;
    use crate::repositories::MemoryFleetStore;
    use crate::utils::jwt::generate_token;
    use axum::http::Request;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(EnvironmentConfig::for_tests("secreto-de-prueba"), Arc::new(MemoryFleetStore::new()))
    }

    async fn extract(state: &AppState, header_value: Option<String>) -> Result<Actor, AppError> {
        let mut builder = Request::builder().uri("/api/vehicles");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_token_yields_actor() {
        let state = state();
        let token = generate_token("ana", UserRole::Administrator, &state.jwt).unwrap();
        let actor = extract(&state, Some(format!("Bearer {}", token))).await.unwrap();
        assert_eq!(actor, Actor::administrator("ana"));
    }

    #[tokio::test]
    async fn test_missing_or_foreign_token_is_rejected() {
        let state = state();
        assert!(matches!(extract(&state, None).await, Err(AppError::Unauthorized(_))));

        let mut other = state.jwt.clone();
        other.secret = "otro-secreto".to_string();
        let token = generate_token("ana", UserRole::Administrator, &other).unwrap();
        assert!(matches!(extract(&state, Some(format!("Bearer {}", token))).await, Err(AppError::Jwt(_))));
    }
}
