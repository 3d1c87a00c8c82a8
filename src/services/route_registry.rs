//! RouteRegistry
//!
//! CRUD de rutas. Crear y actualizar pasan siempre por `AssignmentGuard`;
//! borrar libera los recursos en el acto.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    assignment::{AvailableResources, Reservation},
    auth::Actor,
    route::{ProductGroup, Route, RouteDraft, RouteListing, RouteRequest},
};
use crate::repositories::{FleetSnapshot, FleetStore};
use crate::services::assignment_guard::AssignmentGuard;
use crate::services::availability_resolver::resolve_from;
use crate::services::search_paginator::{ListQuery, ListResult, SearchFilterPaginator, Searchable};
use crate::utils::errors::{not_found_error, AppResult};

impl Searchable for RouteListing {
    type Category = ProductGroup;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.route.route_number.as_str(), self.route.travel_description.as_str()];
        fields.extend(self.route.notes.as_deref());
        fields.extend(self.vehicle_plate.as_deref());
        fields.extend(self.driver_name.as_deref());
        fields
    }

    fn is_active(&self) -> bool {
        self.route.active
    }

    fn category(&self) -> Option<ProductGroup> {
        Some(self.route.product_group)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub by_product_group: HashMap<ProductGroup, usize>,
}

impl RouteStats {
    fn from_routes(routes: &[Route]) -> Self {
        let mut stats = Self {
            total: routes.len(),
            by_product_group: ProductGroup::ALL.iter().map(|g| (*g, 0)).collect(),
            ..Self::default()
        };
        for route in routes {
            if route.active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            *stats.by_product_group.entry(route.product_group).or_default() += 1;
        }
        stats
    }
}

/// Página de rutas más los recursos libres para una ruta nueva
#[derive(Debug, Clone, Serialize)]
pub struct RouteList {
    #[serde(flatten)]
    pub page: ListResult<RouteListing, RouteStats>,
    pub available_resources: AvailableResources,
}

fn listing(snapshot: &FleetSnapshot, route: Route) -> RouteListing {
    RouteListing {
        vehicle_plate: snapshot.vehicle(route.vehicle_id).map(|v| v.plate.clone()),
        driver_name: snapshot.driver(route.driver_id).map(|d| d.full_name.clone()),
        route,
    }
}

#[derive(Clone)]
pub struct RouteRegistry {
    store: Arc<dyn FleetStore>,
    guard: AssignmentGuard,
    paginator: SearchFilterPaginator,
}

impl RouteRegistry {
    pub fn new(store: Arc<dyn FleetStore>, paginator: SearchFilterPaginator) -> Self {
        Self {
            guard: AssignmentGuard::new(store.clone()),
            store,
            paginator,
        }
    }

    fn draft(request: RouteRequest) -> AppResult<RouteDraft> {
        let request = request.normalized();
        request.validate()?;
        Ok(request.into())
    }

    pub async fn create(&self, actor: &Actor, request: RouteRequest) -> AppResult<Route> {
        actor.require_admin("crear rutas")?;
        let draft = Self::draft(request)?;

        let route = self.guard.reserve(Reservation::create(draft)).await?;
        tracing::info!(route_id = %route.id, route_number = %route.route_number, by = %actor.subject, "🛣️ Ruta creada");
        Ok(route)
    }

    /// Reemplazo completo; el vínculo propio de la ruta nunca es conflicto
    pub async fn update(&self, actor: &Actor, id: Uuid, request: RouteRequest) -> AppResult<Route> {
        actor.require_admin("actualizar rutas")?;
        let draft = Self::draft(request)?;

        let route = self.guard.reserve(Reservation::update(id, draft)).await?;
        tracing::info!(route_id = %id, by = %actor.subject, "✏️ Ruta actualizada");
        Ok(route)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<Route> {
        actor.require_admin("eliminar rutas")?;
        let route = self.store.delete_route(id).await?;
        tracing::info!(
            route_id = %id,
            vehicle_id = %route.vehicle_id,
            driver_id = %route.driver_id,
            by = %actor.subject,
            "🗑️ Ruta eliminada, recursos liberados"
        );
        Ok(route)
    }

    /// Solo cambia la bandera; la asignación no se altera
    pub async fn set_active(&self, actor: &Actor, id: Uuid, active: bool) -> AppResult<Route> {
        actor.require_admin("cambiar el estado de rutas")?;
        let route = self.store.set_route_active(id, active).await?;
        tracing::info!(route_id = %id, active, by = %actor.subject, "🔄 Estado de ruta actualizado");
        Ok(route)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<RouteListing> {
        let route = self
            .store
            .find_route(id)
            .await?
            .ok_or_else(|| not_found_error("Ruta", id))?;
        let vehicle = self.store.find_vehicle(route.vehicle_id).await?;
        let driver = self.store.find_driver(route.driver_id).await?;

        Ok(RouteListing {
            vehicle_plate: vehicle.map(|v| v.plate),
            driver_name: driver.map(|d| d.full_name),
            route,
        })
    }

    /// Listado ordenado por número de ruta, con la disponibilidad calculada
    /// sobre la misma instantánea
    pub async fn list(&self, query: &ListQuery<ProductGroup>) -> AppResult<RouteList> {
        let snapshot = self.store.snapshot().await?;
        let available_resources = resolve_from(&snapshot, None)?;
        let stats = RouteStats::from_routes(&snapshot.routes);

        let mut listings: Vec<RouteListing> = snapshot
            .routes
            .iter()
            .cloned()
            .map(|route| listing(&snapshot, route))
            .collect();
        listings.sort_by(|a, b| a.route.route_number.cmp(&b.route.route_number));

        Ok(RouteList {
            page: self.paginator.list(listings, stats, query),
            available_resources,
        })
    }
}
