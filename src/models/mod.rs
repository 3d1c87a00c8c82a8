//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! y los tipos del motor de asignación.

pub mod assignment;
pub mod auth;
pub mod driver;
pub mod route;
pub mod vehicle;
