//! Fleet Dispatch
//!
//! Administración de vehículos, conductores y rutas de reparto, con el motor
//! de disponibilidad y asignación que impide vincular un recurso a dos rutas.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app;
pub use state::AppState;
