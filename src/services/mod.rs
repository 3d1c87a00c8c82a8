//! Services module
//!
//! Motor de disponibilidad y asignación de la flota. `ResourceCatalog` y
//! `RouteRegistry` son los puntos de entrada; `AssignmentGuard` es la única
//! vía de escritura de los vínculos ruta → recursos.

pub mod assignment_guard;
pub mod availability_resolver;
pub mod resource_catalog;
pub mod route_registry;
pub mod search_paginator;

pub use assignment_guard::AssignmentGuard;
pub use availability_resolver::AvailabilityResolver;
pub use resource_catalog::ResourceCatalog;
pub use route_registry::RouteRegistry;
pub use search_paginator::SearchFilterPaginator;
