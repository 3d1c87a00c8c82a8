//! AvailabilityResolver
//!
//! Calcula qué vehículos y conductores puede ofrecer un formulario de rutas.
//! El resultado es solo una pista optimista: la autoridad es `AssignmentGuard`.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::assignment::{AvailabilityTag, AvailableDriver, AvailableResources, AvailableVehicle};
use crate::repositories::{FleetSnapshot, FleetStore};
use crate::utils::errors::{not_found_error, AppResult};

/// Resolver sobre una instantánea ya leída.
///
/// Elegibles son los recursos activos; se descartan los referenciados por
/// cualquier ruta salvo la exenta, cuyos recursos actuales se devuelven
/// siempre etiquetados (también si están inactivos).
pub fn resolve_from(snapshot: &FleetSnapshot, exempt_route: Option<Uuid>) -> AppResult<AvailableResources> {
    let current = match exempt_route {
        Some(id) => Some(snapshot.route(id).ok_or_else(|| not_found_error("Ruta", id))?),
        None => None,
    };

    let (taken_vehicles, taken_drivers): (HashSet<Uuid>, HashSet<Uuid>) = snapshot
        .routes
        .iter()
        .filter(|r| Some(r.id) != exempt_route)
        .map(|r| (r.vehicle_id, r.driver_id))
        .unzip();

    let current_tag = |active: bool| {
        if active {
            AvailabilityTag::CurrentAssignment
        } else {
            AvailabilityTag::CurrentAssignmentInactive
        }
    };

    let vehicles = snapshot
        .vehicles
        .iter()
        .filter_map(|v| {
            let availability = if current.map(|r| r.vehicle_id) == Some(v.id) {
                current_tag(v.active)
            } else if v.active && !taken_vehicles.contains(&v.id) {
                AvailabilityTag::Available
            } else {
                return None;
            };
            Some(AvailableVehicle { vehicle: v.clone(), availability })
        })
        .collect();

    let drivers = snapshot
        .drivers
        .iter()
        .filter_map(|d| {
            let availability = if current.map(|r| r.driver_id) == Some(d.id) {
                current_tag(d.active)
            } else if d.active && !taken_drivers.contains(&d.id) {
                AvailabilityTag::Available
            } else {
                return None;
            };
            Some(AvailableDriver { driver: d.clone(), availability })
        })
        .collect();

    Ok(AvailableResources { exempt_route_id: exempt_route, vehicles, drivers })
}

#[derive(Clone)]
pub struct AvailabilityResolver {
    store: Arc<dyn FleetStore>,
}

impl AvailabilityResolver {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, exempt_route: Option<Uuid>) -> AppResult<AvailableResources> {
        let snapshot = self.store.snapshot().await?;
        let resources = resolve_from(&snapshot, exempt_route)?;
        tracing::debug!(
            exempt_route = ?exempt_route,
            vehicles = resources.vehicles.len(),
            drivers = resources.drivers.len(),
            "Disponibilidad resuelta"
        );
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::{Driver, LicenseType};
    use crate::models::route::{ProductGroup, Route};
    use crate::models::vehicle::Vehicle;
    use chrono::Utc;

    fn vehicle(plate: &str, active: bool) -> Vehicle {
        let now = Utc::now();
        Vehicle { id: Uuid::new_v4(), plate: plate.to_string(), active, created_at: now, updated_at: now }
    }

    fn driver(name: &str, active: bool) -> Driver {
        let now = Utc::now();
        Driver {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            national_id: "12345678-9".to_string(),
            license_number: "L1".to_string(),
            license_type: LicenseType::Light,
            phone: None,
            address: None,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    fn route(vehicle: &Vehicle, driver: &Driver, active: bool) -> Route {
        let now = Utc::now();
        Route {
            id: Uuid::new_v4(),
            route_number: "R001".to_string(),
            travel_description: "Centro - Norte".to_string(),
            product_group: ProductGroup::BigCola,
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            notes: None,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_bound_and_inactive_resources_are_hidden() {
        let (v1, v2, v3) = (vehicle("A1", true), vehicle("A2", true), vehicle("A3", false));
        let (d1, d2) = (driver("Ana", true), driver("Beto", true));
        // una ruta inactiva también ocupa sus recursos
        let r1 = route(&v1, &d1, false);
        let snapshot = FleetSnapshot { vehicles: vec![v1.clone(), v2.clone(), v3.clone()], drivers: vec![d1.clone(), d2.clone()], routes: vec![r1] };

        let resources = resolve_from(&snapshot, None).unwrap();
        assert!(!resources.contains_vehicle(v1.id));
        assert!(resources.contains_vehicle(v2.id));
        assert!(!resources.contains_vehicle(v3.id));
        assert!(!resources.contains_driver(d1.id));
        assert!(resources.contains_driver(d2.id));
    }

    #[test]
    fn test_exempt_route_keeps_its_resources() {
        let (v1, d1) = (vehicle("A1", false), driver("Ana", true));
        let r1 = route(&v1, &d1, true);
        let snapshot = FleetSnapshot { vehicles: vec![v1.clone()], drivers: vec![d1.clone()], routes: vec![r1.clone()] };

        let resources = resolve_from(&snapshot, Some(r1.id)).unwrap();
        assert_eq!(resources.vehicles[0].availability, AvailabilityTag::CurrentAssignmentInactive);
        assert_eq!(resources.drivers[0].availability, AvailabilityTag::CurrentAssignment);
    }

    #[test]
    fn test_unknown_exempt_route_is_not_found() {
        let result = resolve_from(&FleetSnapshot::default(), Some(Uuid::new_v4()));
        assert!(matches!(result, Err(crate::utils::errors::AppError::NotFound(_))));
    }
}
