//! Tipos del motor de asignación
//!
//! Vínculos ruta → (vehículo, conductor), reservas y el resultado de
//! disponibilidad que consumen los formularios de rutas.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::route::RouteDraft;
use crate::models::vehicle::Vehicle;

/// Tipo de recurso asignable a una ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vehicle,
    Driver,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Vehicle => "vehículo",
            ResourceKind::Driver => "conductor",
        }
    }

    /// Nombre del campo de entrada que referencia este recurso
    pub fn field(&self) -> &'static str {
        match self {
            ResourceKind::Vehicle => "vehicle_id",
            ResourceKind::Driver => "driver_id",
        }
    }
}

/// Par (vehículo, conductor) que una ruta mantiene ocupado
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RouteBinding {
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
}

/// Recurso que bloquea una reserva o un borrado
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceConflict {
    pub resource: ResourceKind,
    pub resource_id: Uuid,
    /// Ruta que ya mantiene el recurso, si se conoce
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<Uuid>,
}

/// Solicitud atómica de vincular un vehículo y un conductor a una ruta.
///
/// Con `exempt_route` la reserva actualiza esa ruta, y su vínculo actual no
/// cuenta como conflicto contra sí mismo. Sin ella se inserta una ruta nueva.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub exempt_route: Option<Uuid>,
    pub draft: RouteDraft,
}

impl Reservation {
    pub fn create(draft: RouteDraft) -> Self {
        Self { exempt_route: None, draft }
    }

    pub fn update(route_id: Uuid, draft: RouteDraft) -> Self {
        Self { exempt_route: Some(route_id), draft }
    }

    pub fn vehicle_id(&self) -> Uuid {
        self.draft.vehicle_id
    }

    pub fn driver_id(&self) -> Uuid {
        self.draft.driver_id
    }
}

/// Etiqueta de disponibilidad de un recurso ofrecido a un formulario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityTag {
    Available,
    /// Recurso que la ruta en edición ya tiene vinculado
    CurrentAssignment,
    /// Igual que `CurrentAssignment`, pero el recurso fue desactivado
    CurrentAssignmentInactive,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableVehicle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub availability: AvailabilityTag,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableDriver {
    #[serde(flatten)]
    pub driver: Driver,
    pub availability: AvailabilityTag,
}

/// Resultado de `AvailabilityResolver::resolve`
#[derive(Debug, Clone, Serialize)]
pub struct AvailableResources {
    pub exempt_route_id: Option<Uuid>,
    pub vehicles: Vec<AvailableVehicle>,
    pub drivers: Vec<AvailableDriver>,
}

impl AvailableResources {
    pub fn contains_vehicle(&self, id: Uuid) -> bool {
        self.vehicles.iter().any(|v| v.vehicle.id == id)
    }

    pub fn contains_driver(&self, id: Uuid) -> bool {
        self.drivers.iter().any(|d| d.driver.id == id)
    }
}
