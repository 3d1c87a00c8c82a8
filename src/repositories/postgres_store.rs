//! Almacén PostgreSQL
//!
//! Cada operación de escritura es una transacción. Las reservas bloquean con
//! `FOR UPDATE`, siempre en el orden ruta → vehículo → conductor, la ruta
//! exenta y los recursos pedidos, y evalúan las reglas sobre esas filas. Las
//! restricciones `routes_vehicle_id_key` y `routes_driver_id_key` y las FK con
//! `ON DELETE RESTRICT` son la autoridad final.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{
    assignment::{Reservation, ResourceConflict, ResourceKind, RouteBinding},
    driver::{Driver, DriverChanges, NewDriver},
    route::Route,
    vehicle::{NewVehicle, Vehicle, VehicleChanges},
};
use crate::repositories::{FleetSnapshot, FleetStore};
use crate::services::assignment_guard::{check_reservation, ReservationContext};
use crate::utils::errors::{
    binding_conflict_error, not_found_error, resource_in_use_error, validation_error, AppError,
    AppResult, ConflictDetail,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Traducir violaciones de restricciones a errores del dominio
fn map_constraint_error(error: sqlx::Error, reservation: Option<&Reservation>) -> AppError {
    let (code, constraint) = match &error {
        sqlx::Error::Database(db) => (
            db.code().map(|c| c.into_owned()),
            db.constraint().map(str::to_string),
        ),
        _ => (None, None),
    };

    match (code.as_deref(), constraint.as_deref()) {
        (Some(UNIQUE_VIOLATION), Some("vehicles_plate_key")) => AppError::Conflict(ConflictDetail {
            field: Some("plate"),
            ..ConflictDetail::new("Ya existe un vehículo con esa placa")
        }),
        (Some(UNIQUE_VIOLATION), Some("drivers_national_id_key")) => AppError::Conflict(ConflictDetail {
            field: Some("national_id"),
            ..ConflictDetail::new("Ya existe un conductor con ese DUI")
        }),
        (Some(UNIQUE_VIOLATION), Some(name @ ("routes_vehicle_id_key" | "routes_driver_id_key"))) => {
            let (resource, resource_id) = match (name, reservation) {
                ("routes_vehicle_id_key", Some(r)) => (ResourceKind::Vehicle, r.vehicle_id()),
                (_, Some(r)) => (ResourceKind::Driver, r.driver_id()),
                _ => return AppError::Conflict(ConflictDetail::new("El recurso ya está asignado a otra ruta")),
            };
            binding_conflict_error(vec![ResourceConflict { resource, resource_id, route_id: None }])
        }
        (Some(FOREIGN_KEY_VIOLATION), _) => {
            AppError::Conflict(ConflictDetail::new("El recurso está referenciado por una ruta o ya no existe"))
        }
        (Some(CHECK_VIOLATION), Some(name)) => validation_error(check_field(name), "format", "Formato inválido"),
        _ => AppError::Database(error),
    }
}

fn check_field(constraint: &str) -> &'static str {
    match constraint {
        "vehicles_plate_format" => "plate",
        "drivers_national_id_format" => "national_id",
        "drivers_phone_format" => "phone",
        _ => "input",
    }
}

/// `FleetStore` respaldado por PostgreSQL
#[derive(Debug, Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_vehicle(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(vehicle)
    }

    async fn lock_driver(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(driver)
    }

    async fn route_holding(
        tx: &mut Transaction<'_, Postgres>,
        kind: ResourceKind,
        id: Uuid,
    ) -> AppResult<Option<Uuid>> {
        let sql = match kind {
            ResourceKind::Vehicle => "SELECT id FROM routes WHERE vehicle_id = $1 LIMIT 1",
            ResourceKind::Driver => "SELECT id FROM routes WHERE driver_id = $1 LIMIT 1",
        };
        let row: Option<(Uuid,)> = sqlx::query_as(sql).bind(id).fetch_optional(&mut **tx).await?;
        Ok(row.map(|(route_id,)| route_id))
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn snapshot(&self) -> AppResult<FleetSnapshot> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY plate")
            .fetch_all(&mut *tx)
            .await?;
        let drivers = sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY full_name")
            .fetch_all(&mut *tx)
            .await?;
        let routes = sqlx::query_as::<_, Route>("SELECT * FROM routes ORDER BY route_number")
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(FleetSnapshot { vehicles, drivers, routes })
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, plate, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&vehicle.plate)
        .bind(vehicle.active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, None))
    }

    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;
        let mut vehicle = Self::lock_vehicle(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehículo", id))?;
        changes.apply(&mut vehicle, Utc::now());

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET plate = $2, active = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&vehicle.plate)
        .bind(vehicle.active)
        .bind(vehicle.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, None))?;

        tx.commit().await?;
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_vehicle(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehículo", id))?;
        if let Some(route_id) = Self::route_holding(&mut tx, ResourceKind::Vehicle, id).await? {
            return Err(resource_in_use_error(ResourceKind::Vehicle, id, route_id));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, None))?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(driver)
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, full_name, national_id, license_number, license_type, phone, address, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&driver.full_name)
        .bind(&driver.national_id)
        .bind(&driver.license_number)
        .bind(driver.license_type)
        .bind(&driver.phone)
        .bind(&driver.address)
        .bind(driver.active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, None))
    }

    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;
        let mut driver = Self::lock_driver(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Conductor", id))?;
        changes.apply(&mut driver, Utc::now());

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET full_name = $2, national_id = $3, license_number = $4, license_type = $5,
                phone = $6, address = $7, active = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&driver.full_name)
        .bind(&driver.national_id)
        .bind(&driver.license_number)
        .bind(driver.license_type)
        .bind(&driver.phone)
        .bind(&driver.address)
        .bind(driver.active)
        .bind(driver.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, None))?;

        tx.commit().await?;
        Ok(driver)
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_driver(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Conductor", id))?;
        if let Some(route_id) = Self::route_holding(&mut tx, ResourceKind::Driver, id).await? {
            return Err(resource_in_use_error(ResourceKind::Driver, id, route_id));
        }

        sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, None))?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>> {
        let route = sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(route)
    }

    async fn set_route_active(&self, id: Uuid, active: bool) -> AppResult<Route> {
        sqlx::query_as::<_, Route>("UPDATE routes SET active = $2, updated_at = $3 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Ruta", id))
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<Route> {
        sqlx::query_as::<_, Route>("DELETE FROM routes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Ruta", id))
    }

    async fn reserve(&self, reservation: Reservation) -> AppResult<Route> {
        // Un error antes de commit descarta la transacción (rollback al soltarla)
        let mut tx = self.pool.begin().await?;

        let current = match reservation.exempt_route {
            Some(route_id) => {
                sqlx::query_as::<_, RouteBinding>(
                    "SELECT id AS route_id, vehicle_id, driver_id FROM routes WHERE id = $1 FOR UPDATE",
                )
                .bind(route_id)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => None,
        };
        let vehicle = Self::lock_vehicle(&mut tx, reservation.vehicle_id()).await?;
        let driver = Self::lock_driver(&mut tx, reservation.driver_id()).await?;
        let bindings = sqlx::query_as::<_, RouteBinding>(
            "SELECT id AS route_id, vehicle_id, driver_id FROM routes WHERE vehicle_id = $1 OR driver_id = $2",
        )
        .bind(reservation.vehicle_id())
        .bind(reservation.driver_id())
        .fetch_all(&mut *tx)
        .await?;

        check_reservation(
            &reservation,
            ReservationContext {
                current: current.as_ref(),
                vehicle: vehicle.as_ref(),
                driver: driver.as_ref(),
                bindings: &bindings,
            },
        )?;

        let now = Utc::now();
        let write = match reservation.exempt_route {
            None => {
                let route = reservation.draft.clone().into_route(Uuid::new_v4(), now);
                sqlx::query_as::<_, Route>(
                    r#"
                    INSERT INTO routes (id, route_number, travel_description, product_group, vehicle_id, driver_id, notes, active, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                    RETURNING *
                    "#,
                )
                .bind(route.id)
                .bind(&route.route_number)
                .bind(&route.travel_description)
                .bind(route.product_group)
                .bind(route.vehicle_id)
                .bind(route.driver_id)
                .bind(&route.notes)
                .bind(route.active)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
            }
            Some(route_id) => {
                let draft = &reservation.draft;
                sqlx::query_as::<_, Route>(
                    r#"
                    UPDATE routes
                    SET route_number = $2, travel_description = $3, product_group = $4,
                        vehicle_id = $5, driver_id = $6, notes = $7,
                        active = COALESCE($8, active), updated_at = $9
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(route_id)
                .bind(&draft.route_number)
                .bind(&draft.travel_description)
                .bind(draft.product_group)
                .bind(draft.vehicle_id)
                .bind(draft.driver_id)
                .bind(&draft.notes)
                .bind(draft.active)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
            }
        };
        let route = write.map_err(|e| map_constraint_error(e, Some(&reservation)))?;

        tx.commit().await?;
        Ok(route)
    }
}
