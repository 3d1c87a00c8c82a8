//! Middleware del sistema
//!
//! Extracción del llamador desde el JWT y configuración de CORS.

pub mod auth;
pub mod cors;

pub use cors::*;
