//! AssignmentGuard
//!
//! Frontera transaccional de las asignaciones. `check_reservation` contiene
//! las reglas; cada `FleetStore` la evalúa dentro de su unidad atómica (bloqueo
//! de escritor único en memoria, transacción con `FOR UPDATE` en PostgreSQL),
//! de modo que la comprobación y la escritura nunca se separan.

use std::borrow::Cow;
use std::sync::Arc;

use validator::{ValidationError, ValidationErrors};

use crate::models::{
    assignment::{Reservation, ResourceConflict, ResourceKind, RouteBinding},
    driver::Driver,
    route::Route,
    vehicle::Vehicle,
};
use crate::repositories::FleetStore;
use crate::utils::errors::{binding_conflict_error, not_found_error, AppError, AppResult};

/// Estado leído dentro de la unidad atómica de una reserva
#[derive(Debug, Clone, Copy)]
pub struct ReservationContext<'a> {
    /// Vínculo actual de la ruta exenta (`None` si no existe o no hay exenta)
    pub current: Option<&'a RouteBinding>,
    pub vehicle: Option<&'a Vehicle>,
    pub driver: Option<&'a Driver>,
    /// Vínculos existentes; puede incluir el de la ruta exenta
    pub bindings: &'a [RouteBinding],
}

/// Vínculos de otras rutas que chocan con la reserva
pub fn find_conflicts(bindings: &[RouteBinding], reservation: &Reservation) -> Vec<ResourceConflict> {
    let others = bindings
        .iter()
        .filter(|b| Some(b.route_id) != reservation.exempt_route);

    let mut conflicts = Vec::new();
    for binding in others {
        if binding.vehicle_id == reservation.vehicle_id() {
            conflicts.push(ResourceConflict {
                resource: ResourceKind::Vehicle,
                resource_id: binding.vehicle_id,
                route_id: Some(binding.route_id),
            });
        }
        if binding.driver_id == reservation.driver_id() {
            conflicts.push(ResourceConflict {
                resource: ResourceKind::Driver,
                resource_id: binding.driver_id,
                route_id: Some(binding.route_id),
            });
        }
    }
    // Vehículo antes que conductor
    conflicts.sort_by_key(|c| c.resource != ResourceKind::Vehicle);
    conflicts
}

/// Reglas de una reserva, en orden: existencia, actividad, exclusividad.
///
/// Un recurso inactivo solo puede conservarse si la ruta exenta ya lo tiene.
pub fn check_reservation(reservation: &Reservation, ctx: ReservationContext<'_>) -> AppResult<()> {
    if let Some(route_id) = reservation.exempt_route {
        if ctx.current.is_none() {
            return Err(not_found_error("Ruta", route_id));
        }
    }

    let vehicle = ctx
        .vehicle
        .ok_or_else(|| not_found_error("Vehículo", reservation.vehicle_id()))?;
    let driver = ctx
        .driver
        .ok_or_else(|| not_found_error("Conductor", reservation.driver_id()))?;

    let keeps_vehicle = ctx.current.map(|b| b.vehicle_id) == Some(vehicle.id);
    let keeps_driver = ctx.current.map(|b| b.driver_id) == Some(driver.id);

    let mut inactive = Vec::new();
    if !vehicle.active && !keeps_vehicle {
        inactive.push(ResourceKind::Vehicle);
    }
    if !driver.active && !keeps_driver {
        inactive.push(ResourceKind::Driver);
    }
    if !inactive.is_empty() {
        return Err(AppError::Validation(inactive_errors(&inactive)));
    }

    let conflicts = find_conflicts(ctx.bindings, reservation);
    if !conflicts.is_empty() {
        return Err(binding_conflict_error(conflicts));
    }

    Ok(())
}

fn inactive_errors(kinds: &[ResourceKind]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for kind in kinds {
        let mut error = ValidationError::new("inactive");
        error.message = Some(Cow::Owned(format!("El {} está inactivo", kind.label())));
        errors.add(kind.field(), error);
    }
    errors
}

/// Punto de entrada de las reservas para `RouteRegistry`
#[derive(Clone)]
pub struct AssignmentGuard {
    store: Arc<dyn FleetStore>,
}

impl AssignmentGuard {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Reservar vehículo y conductor y persistir la ruta en un solo paso.
    ///
    /// No reintenta: ante un conflicto el llamador debe elegir otro recurso.
    pub async fn reserve(&self, reservation: Reservation) -> AppResult<Route> {
        let vehicle_id = reservation.vehicle_id();
        let driver_id = reservation.driver_id();
        let exempt_route = reservation.exempt_route;

        match self.store.reserve(reservation).await {
            Ok(route) => {
                tracing::info!(
                    route_id = %route.id,
                    %vehicle_id,
                    %driver_id,
                    "🔒 Reserva confirmada"
                );
                Ok(route)
            }
            Err(AppError::Conflict(detail)) => {
                tracing::warn!(
                    %vehicle_id,
                    %driver_id,
                    exempt_route = ?exempt_route,
                    "⚠️ Reserva rechazada: {}",
                    detail
                );
                Err(AppError::Conflict(detail))
            }
            Err(e) => Err(e),
        }
    }
}
