//! Modelo de Route
//!
//! Este módulo contiene el struct Route y sus variantes para CRUD operations.
//! Cada ruta vincula exactamente un vehículo y un conductor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::models::assignment::RouteBinding;
use crate::utils::validation::normalize_optional;

/// Grupo de producto - mapea al ENUM product_group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "product_group", rename_all = "snake_case")]
pub enum ProductGroup {
    BigCola,
    OtherProducts,
}

impl ProductGroup {
    pub const ALL: [ProductGroup; 2] = [ProductGroup::BigCola, ProductGroup::OtherProducts];
}

/// Route principal - mapea a la tabla routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub route_number: String,
    pub travel_description: String,
    pub product_group: ProductGroup,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Route {
    pub fn binding(&self) -> RouteBinding {
        RouteBinding {
            route_id: self.id,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
        }
    }
}

/// Request para crear o reemplazar una ruta
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RouteRequest {
    #[validate(length(min = 2, max = 50, message = "El número de ruta debe tener al menos 2 caracteres"))]
    pub route_number: String,

    #[validate(length(min = 5, max = 500, message = "La descripción del recorrido debe tener al menos 5 caracteres"))]
    pub travel_description: String,

    pub product_group: ProductGroup,

    pub vehicle_id: Uuid,

    pub driver_id: Uuid,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    pub active: Option<bool>,
}

impl RouteRequest {
    pub fn normalized(mut self) -> Self {
        self.route_number = self.route_number.trim().to_string();
        self.travel_description = self.travel_description.trim().to_string();
        self.notes = normalize_optional(self.notes);
        self
    }
}

/// Datos validados de una ruta, listos para reservar
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDraft {
    pub route_number: String,
    pub travel_description: String,
    pub product_group: ProductGroup,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub notes: Option<String>,
    /// `None` conserva el estado actual al actualizar (activa al crear)
    pub active: Option<bool>,
}

impl From<RouteRequest> for RouteDraft {
    fn from(request: RouteRequest) -> Self {
        Self {
            route_number: request.route_number,
            travel_description: request.travel_description,
            product_group: request.product_group,
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            notes: request.notes,
            active: request.active,
        }
    }
}

impl RouteDraft {
    /// Materializar una ruta nueva
    pub fn into_route(self, id: Uuid, now: DateTime<Utc>) -> Route {
        Route {
            id,
            route_number: self.route_number,
            travel_description: self.travel_description,
            product_group: self.product_group,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            notes: self.notes,
            active: self.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reemplazar los campos de una ruta existente
    pub fn apply(self, route: &mut Route, now: DateTime<Utc>) {
        route.route_number = self.route_number;
        route.travel_description = self.travel_description;
        route.product_group = self.product_group;
        route.vehicle_id = self.vehicle_id;
        route.driver_id = self.driver_id;
        route.notes = self.notes;
        if let Some(active) = self.active {
            route.active = active;
        }
        route.updated_at = now;
    }
}

/// Ruta con los datos legibles de sus recursos vinculados
#[derive(Debug, Clone, Serialize)]
pub struct RouteListing {
    #[serde(flatten)]
    pub route: Route,
    pub vehicle_plate: Option<String>,
    pub driver_name: Option<String>,
}
