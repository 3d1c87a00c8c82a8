use std::collections::HashSet;
use std::sync::Arc;

use fleet_dispatch::models::{
    assignment::{AvailabilityTag, ResourceKind},
    auth::Actor,
    driver::{CreateDriverRequest, LicenseType},
    route::{ProductGroup, RouteRequest},
    vehicle::CreateVehicleRequest,
};
use fleet_dispatch::repositories::{FleetStore, MemoryFleetStore};
use fleet_dispatch::services::{AvailabilityResolver, ResourceCatalog, RouteRegistry, SearchFilterPaginator};
use fleet_dispatch::utils::errors::AppError;
use uuid::Uuid;

struct Fleet {
    store: Arc<MemoryFleetStore>,
    catalog: ResourceCatalog,
    routes: RouteRegistry,
    availability: AvailabilityResolver,
    admin: Actor,
}

fn fleet() -> Fleet {
    let store = Arc::new(MemoryFleetStore::new());
    let paginator = SearchFilterPaginator::default();
    Fleet {
        catalog: ResourceCatalog::new(store.clone(), paginator),
        routes: RouteRegistry::new(store.clone(), paginator),
        availability: AvailabilityResolver::new(store.clone()),
        store,
        admin: Actor::administrator("admin"),
    }
}

impl Fleet {
    async fn vehicle(&self, plate: &str) -> Uuid {
        let request = CreateVehicleRequest { plate: plate.to_string(), active: Some(true) };
        self.catalog.create_vehicle(&self.admin, request).await.unwrap().id
    }

    async fn driver(&self, name: &str, national_id: &str) -> Uuid {
        let request = CreateDriverRequest {
            full_name: name.to_string(),
            national_id: national_id.to_string(),
            license_number: "L1234".to_string(),
            license_type: LicenseType::Heavy,
            phone: None,
            address: None,
            active: None,
        };
        self.catalog.create_driver(&self.admin, request).await.unwrap().id
    }

    async fn assert_invariant(&self) {
        let snapshot = self.store.snapshot().await.unwrap();
        let vehicles: HashSet<_> = snapshot.routes.iter().map(|r| r.vehicle_id).collect();
        let drivers: HashSet<_> = snapshot.routes.iter().map(|r| r.driver_id).collect();
        assert_eq!(vehicles.len(), snapshot.routes.len());
        assert_eq!(drivers.len(), snapshot.routes.len());
    }
}

fn route_request(number: &str, vehicle_id: Uuid, driver_id: Uuid) -> RouteRequest {
    RouteRequest {
        route_number: number.to_string(),
        travel_description: "San Salvador - Santa Ana".to_string(),
        product_group: ProductGroup::BigCola,
        vehicle_id,
        driver_id,
        notes: None,
        active: None,
    }
}

#[tokio::test]
async fn test_create_route_takes_resources_out_of_availability() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001-2024").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;

    fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    let available = fleet.availability.resolve(None).await.unwrap();
    assert!(!available.contains_vehicle(vehicle_id));
    assert!(!available.contains_driver(driver_id));
    fleet.assert_invariant().await;
}

#[tokio::test]
async fn test_reusing_a_bound_vehicle_conflicts() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001-2024").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let other_driver = fleet.driver("Maria Lopez", "87654321-0").await;
    let first = fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    match fleet.routes.create(&fleet.admin, route_request("R002", vehicle_id, other_driver)).await {
        Err(AppError::Conflict(detail)) => {
            assert!(detail.names(ResourceKind::Vehicle, vehicle_id));
            assert!(!detail.names(ResourceKind::Driver, other_driver));
            assert_eq!(detail.conflicts[0].route_id, Some(first.id));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    fleet.assert_invariant().await;
}

#[tokio::test]
async fn test_deleting_a_route_frees_its_resources() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001-2024").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let route = fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    fleet.routes.delete(&fleet.admin, route.id).await.unwrap();

    let available = fleet.availability.resolve(None).await.unwrap();
    assert!(available.contains_vehicle(vehicle_id));
    assert!(available.contains_driver(driver_id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_one_driver_have_one_winner() {
    let fleet = fleet();
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let v1 = fleet.vehicle("P001").await;
    let v2 = fleet.vehicle("P002").await;

    let tasks: Vec<_> = [("R001", v1), ("R002", v2)]
        .into_iter()
        .map(|(number, vehicle_id)| {
            let routes = fleet.routes.clone();
            let admin = fleet.admin.clone();
            tokio::spawn(async move { routes.create(&admin, route_request(number, vehicle_id, driver_id)).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results.iter().filter(|r| matches!(r, Err(AppError::Conflict(_)))).count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    fleet.assert_invariant().await;
}

#[tokio::test]
async fn test_self_edit_keeping_resources_never_conflicts() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let route = fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    let mut edit = route_request("R001-B", vehicle_id, driver_id);
    edit.travel_description = "San Salvador - Sonsonate".to_string();
    let updated = fleet.routes.update(&fleet.admin, route.id, edit.clone()).await.unwrap();
    assert_eq!(updated.route_number, "R001-B");

    // repetir la misma edición
    fleet.routes.update(&fleet.admin, route.id, edit).await.unwrap();
    fleet.assert_invariant().await;
}

#[tokio::test]
async fn test_update_can_swap_to_a_free_vehicle() {
    let fleet = fleet();
    let v1 = fleet.vehicle("P001").await;
    let v2 = fleet.vehicle("P002").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let route = fleet.routes.create(&fleet.admin, route_request("R001", v1, driver_id)).await.unwrap();

    fleet.routes.update(&fleet.admin, route.id, route_request("R001", v2, driver_id)).await.unwrap();

    let available = fleet.availability.resolve(None).await.unwrap();
    assert!(available.contains_vehicle(v1));
    assert!(!available.contains_vehicle(v2));
}

#[tokio::test]
async fn test_availability_counts_match_referenced_resources() {
    let fleet = fleet();
    let mut vehicles = Vec::new();
    let mut drivers = Vec::new();
    for i in 0..5 {
        vehicles.push(fleet.vehicle(&format!("P00{}", i)).await);
        drivers.push(fleet.driver(&format!("Conductor {}", i), &format!("1234567{}-0", i)).await);
    }
    let r0 = fleet.routes.create(&fleet.admin, route_request("R0", vehicles[0], drivers[0])).await.unwrap();
    fleet.routes.create(&fleet.admin, route_request("R1", vehicles[1], drivers[1])).await.unwrap();
    fleet.catalog.set_vehicle_active(&fleet.admin, vehicles[4], false).await.unwrap();

    // 4 activos elegibles, 2 referenciados
    let all = fleet.availability.resolve(None).await.unwrap();
    assert_eq!(all.vehicles.len(), 4 - 2);
    assert_eq!(all.drivers.len(), 5 - 2);

    // la ruta exenta recupera sus propios recursos
    let editing = fleet.availability.resolve(Some(r0.id)).await.unwrap();
    assert_eq!(editing.vehicles.len(), 4 - 1);
    let own = editing.vehicles.iter().find(|v| v.vehicle.id == vehicles[0]).unwrap();
    assert_eq!(own.availability, AvailabilityTag::CurrentAssignment);
}

#[tokio::test]
async fn test_deactivated_bound_vehicle_stays_with_its_route() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let route = fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    fleet.catalog.set_vehicle_active(&fleet.admin, vehicle_id, false).await.unwrap();

    let editing = fleet.availability.resolve(Some(route.id)).await.unwrap();
    let own = editing.vehicles.iter().find(|v| v.vehicle.id == vehicle_id).unwrap();
    assert_eq!(own.availability, AvailabilityTag::CurrentAssignmentInactive);

    // conservarlo en una edición está permitido
    fleet.routes.update(&fleet.admin, route.id, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    // vincularlo a otra ruta no
    fleet.routes.delete(&fleet.admin, route.id).await.unwrap();
    let result = fleet.routes.create(&fleet.admin, route_request("R002", vehicle_id, driver_id)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_bound_resources_cannot_be_deleted() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let route = fleet.routes.create(&fleet.admin, route_request("R001", vehicle_id, driver_id)).await.unwrap();

    assert!(matches!(fleet.catalog.delete_vehicle(&fleet.admin, vehicle_id).await, Err(AppError::Conflict(_))));
    assert!(matches!(fleet.catalog.delete_driver(&fleet.admin, driver_id).await, Err(AppError::Conflict(_))));

    fleet.routes.delete(&fleet.admin, route.id).await.unwrap();
    fleet.catalog.delete_vehicle(&fleet.admin, vehicle_id).await.unwrap();
    fleet.catalog.delete_driver(&fleet.admin, driver_id).await.unwrap();
}

#[tokio::test]
async fn test_dispatcher_cannot_create_routes() {
    let fleet = fleet();
    let vehicle_id = fleet.vehicle("P001").await;
    let driver_id = fleet.driver("Juan Perez", "12345678-9").await;
    let dispatcher = Actor::dispatcher("despacho");

    let result = fleet.routes.create(&dispatcher, route_request("R001", vehicle_id, driver_id)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(fleet.store.snapshot().await.unwrap().routes.is_empty());
}
