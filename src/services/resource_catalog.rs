//! ResourceCatalog
//!
//! CRUD de vehículos y conductores. Toda mutación exige administrador; el
//! formato se valida en el servidor y la unicidad la garantiza el almacén.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    auth::Actor,
    driver::{CreateDriverRequest, Driver, DriverChanges, LicenseType, UpdateDriverRequest},
    vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleChanges},
};
use crate::repositories::FleetStore;
use crate::services::search_paginator::{ListQuery, ListResult, SearchFilterPaginator, Searchable};
use crate::utils::errors::{not_found_error, AppResult};

/// Vehículo con la ruta que lo mantiene ocupado
#[derive(Debug, Clone, Serialize)]
pub struct VehicleListing {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub assigned_route_id: Option<Uuid>,
}

impl Searchable for VehicleListing {
    type Category = Infallible;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.vehicle.plate]
    }

    fn is_active(&self) -> bool {
        self.vehicle.active
    }

    fn is_assigned(&self) -> Option<bool> {
        Some(self.assigned_route_id.is_some())
    }
}

/// Conductor con la ruta que lo mantiene ocupado
#[derive(Debug, Clone, Serialize)]
pub struct DriverListing {
    #[serde(flatten)]
    pub driver: Driver,
    pub assigned_route_id: Option<Uuid>,
}

impl Searchable for DriverListing {
    type Category = LicenseType;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.driver.full_name.as_str(),
            self.driver.national_id.as_str(),
            self.driver.license_number.as_str(),
        ];
        fields.extend(self.driver.phone.as_deref());
        fields
    }

    fn is_active(&self) -> bool {
        self.driver.active
    }

    fn category(&self) -> Option<LicenseType> {
        Some(self.driver.license_type)
    }

    fn is_assigned(&self) -> Option<bool> {
        Some(self.assigned_route_id.is_some())
    }
}

/// Estadísticas de vehículos; `available` cuenta activos sin ruta
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VehicleStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub assigned: usize,
    pub available: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub assigned: usize,
    pub available: usize,
    pub by_license_type: HashMap<LicenseType, usize>,
}

impl VehicleStats {
    fn from_listings(listings: &[VehicleListing]) -> Self {
        let mut stats = Self { total: listings.len(), ..Self::default() };
        for listing in listings {
            let assigned = listing.assigned_route_id.is_some();
            if listing.vehicle.active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            if assigned {
                stats.assigned += 1;
            } else if listing.vehicle.active {
                stats.available += 1;
            }
        }
        stats
    }
}

impl DriverStats {
    fn from_listings(listings: &[DriverListing]) -> Self {
        let mut stats = Self {
            total: listings.len(),
            by_license_type: LicenseType::ALL.iter().map(|t| (*t, 0)).collect(),
            ..Self::default()
        };
        for listing in listings {
            let assigned = listing.assigned_route_id.is_some();
            if listing.driver.active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            if assigned {
                stats.assigned += 1;
            } else if listing.driver.active {
                stats.available += 1;
            }
            *stats.by_license_type.entry(listing.driver.license_type).or_default() += 1;
        }
        stats
    }
}

#[derive(Clone)]
pub struct ResourceCatalog {
    store: Arc<dyn FleetStore>,
    paginator: SearchFilterPaginator,
}

impl ResourceCatalog {
    pub fn new(store: Arc<dyn FleetStore>, paginator: SearchFilterPaginator) -> Self {
        Self { store, paginator }
    }

    // ==================== VEHÍCULOS ====================

    pub async fn create_vehicle(&self, actor: &Actor, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        actor.require_admin("crear vehículos")?;
        let request = request.normalized();
        request.validate()?;

        let vehicle = self.store.insert_vehicle(request.into()).await?;
        tracing::info!(vehicle_id = %vehicle.id, plate = %vehicle.plate, by = %actor.subject, "🚗 Vehículo creado");
        Ok(vehicle)
    }

    pub async fn update_vehicle(&self, actor: &Actor, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        actor.require_admin("actualizar vehículos")?;
        let request = request.normalized();
        request.validate()?;

        let vehicle = self.store.update_vehicle(id, request.into()).await?;
        tracing::info!(vehicle_id = %id, by = %actor.subject, "✏️ Vehículo actualizado");
        Ok(vehicle)
    }

    /// No se propaga a las rutas: un vehículo vinculado sigue vinculado
    pub async fn set_vehicle_active(&self, actor: &Actor, id: Uuid, active: bool) -> AppResult<Vehicle> {
        actor.require_admin("cambiar el estado de vehículos")?;
        let vehicle = self.store.update_vehicle(id, VehicleChanges::activation(active)).await?;
        tracing::info!(vehicle_id = %id, active, by = %actor.subject, "🔄 Estado de vehículo actualizado");
        Ok(vehicle)
    }

    pub async fn delete_vehicle(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require_admin("eliminar vehículos")?;
        self.store.delete_vehicle(id).await?;
        tracing::info!(vehicle_id = %id, by = %actor.subject, "🗑️ Vehículo eliminado");
        Ok(())
    }

    pub async fn get_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehículo", id))
    }

    /// Listado ordenado por placa; estadísticas sobre todos los vehículos
    pub async fn list_vehicles(
        &self,
        query: &ListQuery<Infallible>,
    ) -> AppResult<ListResult<VehicleListing, VehicleStats>> {
        let snapshot = self.store.snapshot().await?;
        let holders: HashMap<Uuid, Uuid> = snapshot.routes.iter().map(|r| (r.vehicle_id, r.id)).collect();

        let mut listings: Vec<VehicleListing> = snapshot
            .vehicles
            .into_iter()
            .map(|vehicle| VehicleListing {
                assigned_route_id: holders.get(&vehicle.id).copied(),
                vehicle,
            })
            .collect();
        listings.sort_by(|a, b| a.vehicle.plate.cmp(&b.vehicle.plate));

        let stats = VehicleStats::from_listings(&listings);
        Ok(self.paginator.list(listings, stats, query))
    }

    // ==================== CONDUCTORES ====================

    pub async fn create_driver(&self, actor: &Actor, request: CreateDriverRequest) -> AppResult<Driver> {
        actor.require_admin("crear conductores")?;
        let request = request.normalized();
        request.validate()?;

        let driver = self.store.insert_driver(request.into()).await?;
        tracing::info!(driver_id = %driver.id, by = %actor.subject, "👤 Conductor creado");
        Ok(driver)
    }

    pub async fn update_driver(&self, actor: &Actor, id: Uuid, request: UpdateDriverRequest) -> AppResult<Driver> {
        actor.require_admin("actualizar conductores")?;
        let request = request.normalized();
        request.validate()?;

        let driver = self.store.update_driver(id, request.into()).await?;
        tracing::info!(driver_id = %id, by = %actor.subject, "✏️ Conductor actualizado");
        Ok(driver)
    }

    /// No se propaga a las rutas: un conductor vinculado sigue vinculado
    pub async fn set_driver_active(&self, actor: &Actor, id: Uuid, active: bool) -> AppResult<Driver> {
        actor.require_admin("cambiar el estado de conductores")?;
        let driver = self.store.update_driver(id, DriverChanges::activation(active)).await?;
        tracing::info!(driver_id = %id, active, by = %actor.subject, "🔄 Estado de conductor actualizado");
        Ok(driver)
    }

    pub async fn delete_driver(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require_admin("eliminar conductores")?;
        self.store.delete_driver(id).await?;
        tracing::info!(driver_id = %id, by = %actor.subject, "🗑️ Conductor eliminado");
        Ok(())
    }

    pub async fn get_driver(&self, id: Uuid) -> AppResult<Driver> {
        self.store
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Conductor", id))
    }

    /// Listado ordenado por nombre; estadísticas sobre todos los conductores
    pub async fn list_drivers(
        &self,
        query: &ListQuery<LicenseType>,
    ) -> AppResult<ListResult<DriverListing, DriverStats>> {
        let snapshot = self.store.snapshot().await?;
        let holders: HashMap<Uuid, Uuid> = snapshot.routes.iter().map(|r| (r.driver_id, r.id)).collect();

        let mut listings: Vec<DriverListing> = snapshot
            .drivers
            .into_iter()
            .map(|driver| DriverListing {
                assigned_route_id: holders.get(&driver.id).copied(),
                driver,
            })
            .collect();
        listings.sort_by(|a, b| a.driver.full_name.cmp(&b.driver.full_name));

        let stats = DriverStats::from_listings(&listings);
        Ok(self.paginator.list(listings, stats, query))
    }
}
