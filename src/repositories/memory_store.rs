//! Almacén en memoria
//!
//! Un `RwLock` de Tokio protege las tres tablas. Toda escritura toma el
//! bloqueo exclusivo y hace comprobación y mutación sin ningún `.await`
//! intermedio, así que una cancelación nunca deja estado parcial.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    assignment::{Reservation, ResourceKind},
    driver::{Driver, DriverChanges, NewDriver},
    route::Route,
    vehicle::{NewVehicle, Vehicle, VehicleChanges},
};
use crate::repositories::{FleetSnapshot, FleetStore};
use crate::services::assignment_guard::{check_reservation, ReservationContext};
use crate::utils::errors::{not_found_error, resource_in_use_error, unique_conflict_error, AppResult};

#[derive(Debug, Default)]
struct FleetTables {
    vehicles: HashMap<Uuid, Vehicle>,
    drivers: HashMap<Uuid, Driver>,
    routes: HashMap<Uuid, Route>,
}

impl FleetTables {
    fn route_holding(&self, kind: ResourceKind, id: Uuid) -> Option<Uuid> {
        self.routes
            .values()
            .find(|r| match kind {
                ResourceKind::Vehicle => r.vehicle_id == id,
                ResourceKind::Driver => r.driver_id == id,
            })
            .map(|r| r.id)
    }

    fn plate_taken(&self, plate: &str, except: Option<Uuid>) -> bool {
        self.vehicles
            .values()
            .any(|v| v.plate == plate && Some(v.id) != except)
    }

    fn national_id_taken(&self, national_id: &str, except: Option<Uuid>) -> bool {
        self.drivers
            .values()
            .any(|d| d.national_id == national_id && Some(d.id) != except)
    }
}

/// `FleetStore` de un solo proceso
#[derive(Debug, Default)]
pub struct MemoryFleetStore {
    tables: RwLock<FleetTables>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    async fn snapshot(&self) -> AppResult<FleetSnapshot> {
        let tables = self.tables.read().await;
        // Mismo orden que el almacén PostgreSQL
        let mut vehicles: Vec<_> = tables.vehicles.values().cloned().collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        let mut drivers: Vec<_> = tables.drivers.values().cloned().collect();
        drivers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        let mut routes: Vec<_> = tables.routes.values().cloned().collect();
        routes.sort_by(|a, b| a.route_number.cmp(&b.route_number));
        Ok(FleetSnapshot { vehicles, drivers, routes })
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(&id).cloned())
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        if tables.plate_taken(&vehicle.plate, None) {
            return Err(unique_conflict_error("vehículo", "plate", &vehicle.plate));
        }

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            plate: vehicle.plate,
            active: vehicle.active,
            created_at: now,
            updated_at: now,
        };
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        if !tables.vehicles.contains_key(&id) {
            return Err(not_found_error("Vehículo", id));
        }
        if let Some(plate) = &changes.plate {
            if tables.plate_taken(plate, Some(id)) {
                return Err(unique_conflict_error("vehículo", "plate", plate));
            }
        }

        let vehicle = tables
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Vehículo", id))?;
        changes.apply(vehicle, Utc::now());
        Ok(vehicle.clone())
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.vehicles.contains_key(&id) {
            return Err(not_found_error("Vehículo", id));
        }
        if let Some(route_id) = tables.route_holding(ResourceKind::Vehicle, id) {
            return Err(resource_in_use_error(ResourceKind::Vehicle, id, route_id));
        }
        tables.vehicles.remove(&id);
        Ok(())
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        Ok(self.tables.read().await.drivers.get(&id).cloned())
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        if tables.national_id_taken(&driver.national_id, None) {
            return Err(unique_conflict_error("conductor", "national_id", &driver.national_id));
        }

        let now = Utc::now();
        let driver = Driver {
            id: Uuid::new_v4(),
            full_name: driver.full_name,
            national_id: driver.national_id,
            license_number: driver.license_number,
            license_type: driver.license_type,
            phone: driver.phone,
            address: driver.address,
            active: driver.active,
            created_at: now,
            updated_at: now,
        };
        tables.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        if !tables.drivers.contains_key(&id) {
            return Err(not_found_error("Conductor", id));
        }
        if let Some(national_id) = &changes.national_id {
            if tables.national_id_taken(national_id, Some(id)) {
                return Err(unique_conflict_error("conductor", "national_id", national_id));
            }
        }

        let driver = tables
            .drivers
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Conductor", id))?;
        changes.apply(driver, Utc::now());
        Ok(driver.clone())
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.drivers.contains_key(&id) {
            return Err(not_found_error("Conductor", id));
        }
        if let Some(route_id) = tables.route_holding(ResourceKind::Driver, id) {
            return Err(resource_in_use_error(ResourceKind::Driver, id, route_id));
        }
        tables.drivers.remove(&id);
        Ok(())
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>> {
        Ok(self.tables.read().await.routes.get(&id).cloned())
    }

    async fn set_route_active(&self, id: Uuid, active: bool) -> AppResult<Route> {
        let mut tables = self.tables.write().await;
        let route = tables
            .routes
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Ruta", id))?;
        route.active = active;
        route.updated_at = Utc::now();
        Ok(route.clone())
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<Route> {
        self.tables
            .write()
            .await
            .routes
            .remove(&id)
            .ok_or_else(|| not_found_error("Ruta", id))
    }

    async fn reserve(&self, reservation: Reservation) -> AppResult<Route> {
        let mut tables = self.tables.write().await;

        let bindings: Vec<_> = tables.routes.values().map(Route::binding).collect();
        let current = reservation
            .exempt_route
            .and_then(|id| tables.routes.get(&id))
            .map(Route::binding);
        check_reservation(
            &reservation,
            ReservationContext {
                current: current.as_ref(),
                vehicle: tables.vehicles.get(&reservation.vehicle_id()),
                driver: tables.drivers.get(&reservation.driver_id()),
                bindings: &bindings,
            },
        )?;

        let now = Utc::now();
        match reservation.exempt_route {
            Some(id) => {
                let route = tables
                    .routes
                    .get_mut(&id)
                    .ok_or_else(|| not_found_error("Ruta", id))?;
                reservation.draft.apply(route, now);
                Ok(route.clone())
            }
            None => {
                let route = reservation.draft.into_route(Uuid::new_v4(), now);
                tables.routes.insert(route.id, route.clone());
                Ok(route)
            }
        }
    }
}
