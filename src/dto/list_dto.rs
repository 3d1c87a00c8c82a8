//! Parámetros de query de los listados

use std::convert::Infallible;

use serde::Deserialize;
use uuid::Uuid;

use crate::models::{driver::LicenseType, route::ProductGroup};
use crate::services::search_paginator::{AssignmentFilter, ListQuery, SearchFilter, StatusFilter};

fn list_query<C>(
    search: Option<String>,
    status: Option<StatusFilter>,
    category: Option<C>,
    assignment: Option<AssignmentFilter>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> ListQuery<C> {
    ListQuery {
        filter: SearchFilter {
            search,
            status: status.unwrap_or_default(),
            category,
            assignment: assignment.unwrap_or_default(),
        },
        page,
        page_size,
    }
}

// GET /api/vehicles
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListParams {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub assignment: Option<AssignmentFilter>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<VehicleListParams> for ListQuery<Infallible> {
    fn from(p: VehicleListParams) -> Self {
        list_query(p.search, p.status, None, p.assignment, p.page, p.page_size)
    }
}

// GET /api/drivers
#[derive(Debug, Default, Deserialize)]
pub struct DriverListParams {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub license_type: Option<LicenseType>,
    pub assignment: Option<AssignmentFilter>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<DriverListParams> for ListQuery<LicenseType> {
    fn from(p: DriverListParams) -> Self {
        list_query(p.search, p.status, p.license_type, p.assignment, p.page, p.page_size)
    }
}

// GET /api/routes
#[derive(Debug, Default, Deserialize)]
pub struct RouteListParams {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub product_group: Option<ProductGroup>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<RouteListParams> for ListQuery<ProductGroup> {
    fn from(p: RouteListParams) -> Self {
        list_query(p.search, p.status, p.product_group, None, p.page, p.page_size)
    }
}

// GET /api/routes/availability
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub exclude_route_id: Option<Uuid>,
}
