//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla `vehicles` del schema PostgreSQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_plate, PLATE_REGEX};

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(regex(path = "PLATE_REGEX", message = "La placa admite mayúsculas, dígitos y guion (máximo 10)"))]
    pub plate: String,

    pub active: Option<bool>,
}

impl CreateVehicleRequest {
    pub fn normalized(mut self) -> Self {
        self.plate = normalize_plate(&self.plate);
        self
    }
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(regex(path = "PLATE_REGEX", message = "La placa admite mayúsculas, dígitos y guion (máximo 10)"))]
    pub plate: Option<String>,

    pub active: Option<bool>,
}

impl UpdateVehicleRequest {
    pub fn normalized(mut self) -> Self {
        self.plate = self.plate.map(|p| normalize_plate(&p));
        self
    }
}

/// Datos validados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub plate: String,
    pub active: bool,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            plate: request.plate,
            active: request.active.unwrap_or(true),
        }
    }
}

/// Cambios parciales aplicables a un vehículo
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub plate: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateVehicleRequest> for VehicleChanges {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            plate: request.plate,
            active: request.active,
        }
    }
}

impl VehicleChanges {
    pub fn activation(active: bool) -> Self {
        Self { plate: None, active: Some(active) }
    }

    pub fn apply(self, vehicle: &mut Vehicle, now: DateTime<Utc>) {
        if let Some(plate) = self.plate {
            vehicle.plate = plate;
        }
        if let Some(active) = self.active {
            vehicle.active = active;
        }
        vehicle.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_normalizes_plate() {
        let request = CreateVehicleRequest { plate: " p001-2024".to_string(), active: None }.normalized();
        assert_eq!(request.plate, "P001-2024");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_long_plate() {
        let request = CreateVehicleRequest { plate: "P001-2024-XYZ".to_string(), active: None }.normalized();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("plate"));
    }

    #[test]
    fn test_update_request_without_plate_is_valid() {
        let request = UpdateVehicleRequest { plate: None, active: Some(false) }.normalized();
        assert!(request.validate().is_ok());
    }
}
