//! SearchFilterPaginator
//!
//! Búsqueda de texto, filtros y paginación genéricos sobre cualquier listado
//! que implemente `Searchable`. Las estadísticas las calcula el llamador
//! sobre la colección completa y se devuelven junto a la página.

use serde::{Deserialize, Serialize};

/// Elemento que el paginador sabe buscar y filtrar
pub trait Searchable {
    /// Valor del filtro de enumeración (tipo de licencia, grupo de producto)
    type Category: PartialEq + Copy;

    /// Campos sobre los que se aplica la búsqueda libre
    fn search_fields(&self) -> Vec<&str>;

    fn is_active(&self) -> bool;

    fn category(&self) -> Option<Self::Category> {
        None
    }

    /// `None` si el elemento no participa en asignaciones
    fn is_assigned(&self) -> Option<bool> {
        None
    }
}

/// Filtro por estado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Inactive,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(&self, active: bool) -> bool {
        match self {
            StatusFilter::Active => active,
            StatusFilter::Inactive => !active,
            StatusFilter::All => true,
        }
    }
}

/// Filtro por asignación; "available" significa sin ruta, sin mirar `active`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentFilter {
    Available,
    Assigned,
    #[default]
    All,
}

impl AssignmentFilter {
    pub fn matches(&self, assigned: Option<bool>) -> bool {
        match (self, assigned) {
            (AssignmentFilter::All, _) | (_, None) => true,
            (AssignmentFilter::Available, Some(assigned)) => !assigned,
            (AssignmentFilter::Assigned, Some(assigned)) => assigned,
        }
    }
}

/// Combinación de filtros (AND)
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter<C> {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub category: Option<C>,
    pub assignment: AssignmentFilter,
}

impl<C> Default for SearchFilter<C> {
    fn default() -> Self {
        Self {
            search: None,
            status: StatusFilter::All,
            category: None,
            assignment: AssignmentFilter::All,
        }
    }
}

impl<C: PartialEq + Copy> SearchFilter<C> {
    pub fn matches<T: Searchable<Category = C>>(&self, item: &T) -> bool {
        self.matches_search(item)
            && self.status.matches(item.is_active())
            && self.category.map_or(true, |c| item.category() == Some(c))
            && self.assignment.matches(item.is_assigned())
    }

    fn matches_search<T: Searchable>(&self, item: &T) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Consulta de listado. Cambiar cualquier filtro vuelve a la página 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<C> {
    pub filter: SearchFilter<C>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl<C> Default for ListQuery<C> {
    fn default() -> Self {
        Self { filter: SearchFilter::default(), page: None, page_size: None }
    }
}

impl<C> ListQuery<C> {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.filter.search = Some(search.into());
        self.reset_page()
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.filter.status = status;
        self.reset_page()
    }

    pub fn with_category(mut self, category: Option<C>) -> Self {
        self.filter.category = category;
        self.reset_page()
    }

    pub fn with_assignment(mut self, assignment: AssignmentFilter) -> Self {
        self.filter.assignment = assignment;
        self.reset_page()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    fn reset_page(mut self) -> Self {
        self.page = Some(1);
        self
    }
}

/// Metadatos de paginación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_records: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total_records: usize) -> Self {
        let total_pages = total_records.div_ceil(page_size as usize);
        Self {
            page,
            page_size,
            total_records,
            total_pages,
            has_previous: page > 1,
            has_next: (page as usize) < total_pages,
        }
    }
}

/// Página de resultados con estadísticas de la colección completa
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T, S> {
    pub items: Vec<T>,
    pub stats: S,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchFilterPaginator {
    default_page_size: u32,
    max_page_size: u32,
}

impl Default for SearchFilterPaginator {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

impl SearchFilterPaginator {
    pub fn new(default_page_size: u32, max_page_size: u32) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            default_page_size: default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    /// Página 0 o ausente → 1; tamaño ausente → por defecto, acotado a 1..=máximo
    pub fn page_request(&self, page: Option<u32>, page_size: Option<u32>) -> (u32, u32) {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        (page, page_size)
    }

    /// Filtrar y paginar `items`, que llegan ya ordenados
    pub fn list<T, S>(&self, items: Vec<T>, stats: S, query: &ListQuery<T::Category>) -> ListResult<T, S>
    where
        T: Searchable,
    {
        let (page, page_size) = self.page_request(query.page, query.page_size);
        let matching: Vec<T> = items
            .into_iter()
            .filter(|item| query.filter.matches(item))
            .collect();
        let pagination = Pagination::new(page, page_size, matching.len());

        let offset = (page as usize - 1).saturating_mul(page_size as usize);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        ListResult { items, stats, pagination }
    }
}
