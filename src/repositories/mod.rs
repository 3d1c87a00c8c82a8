//! Repositorios
//!
//! `FleetStore` es la frontera de almacenamiento del motor. Hay dos
//! implementaciones: PostgreSQL (transacciones + restricciones de unicidad) y
//! memoria (un único escritor), usada en desarrollo y en las pruebas.

pub mod memory_store;
pub mod postgres_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    assignment::Reservation,
    driver::{Driver, DriverChanges, NewDriver},
    route::Route,
    vehicle::{NewVehicle, Vehicle, VehicleChanges},
};
use crate::utils::errors::AppResult;

pub use memory_store::MemoryFleetStore;
pub use postgres_store::PgFleetStore;

/// Vista consistente de las tres tablas en un mismo instante
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub routes: Vec<Route>,
}

impl FleetSnapshot {
    pub fn vehicle(&self, id: Uuid) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn driver(&self, id: Uuid) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn route(&self, id: Uuid) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }
}

/// Almacenamiento de la flota.
///
/// Contrato de las implementaciones:
/// - `reserve` comprueba y escribe en una sola unidad atómica; al devolver
///   `Ok` ningún vehículo ni conductor está vinculado a dos rutas.
/// - `delete_vehicle`/`delete_driver` fallan con `Conflict` si alguna ruta
///   referencia el recurso, también de forma atómica.
/// - Placa y DUI son únicos (`Conflict` con el campo).
/// - Un id inexistente produce `NotFound`.
#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn snapshot(&self) -> AppResult<FleetSnapshot>;

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;
    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle>;
    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()>;

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;
    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver>;
    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver>;
    async fn delete_driver(&self, id: Uuid) -> AppResult<()>;

    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>>;
    async fn set_route_active(&self, id: Uuid, active: bool) -> AppResult<Route>;
    /// Elimina la ruta y libera sus recursos; devuelve la ruta eliminada
    async fn delete_route(&self, id: Uuid) -> AppResult<Route>;

    /// Única vía de escritura que crea o mueve un vínculo
    async fn reserve(&self, reservation: Reservation) -> AppResult<Route>;
}
