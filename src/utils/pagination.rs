//! Paginación y helpers de consultas de listado
//!
//! Todas las rutas de listado devuelven `{ data, pagination }` con el total
//! de registros que cumplen los filtros.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Página normalizada (page >= 1, 1 <= page_size <= 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Metadatos de paginación
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let total = total.max(0);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            total_pages: (total + pagination.page_size - 1) / pagination.page_size,
        }
    }
}

/// Página de resultados
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            data,
            pagination: PageMeta::new(pagination, total),
        }
    }

    /// Convertir los registros (fila → DTO) manteniendo los metadatos
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Patrón `ILIKE` de substring, escapando los comodines del usuario
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Texto de búsqueda útil (no vacío tras trim)
pub fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        assert_eq!(Pagination::new(None, None), Pagination::default());

        let p = Pagination::new(Some(0), Some(500));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);

        let p = Pagination::new(Some(-3), Some(0));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(Some(1), Some(20)).offset(), 0);
        assert_eq!(Pagination::new(Some(3), Some(25)).offset(), 50);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(20));
        assert_eq!(PageMeta::new(p, 0).total_pages, 0);
        assert_eq!(PageMeta::new(p, 20).total_pages, 1);
        assert_eq!(PageMeta::new(p, 57).total_pages, 3);
    }

    #[test]
    fn test_paginated_map_keeps_meta() {
        let page = Paginated::new(vec![1, 2, 3], Pagination::new(Some(2), Some(3)), 9);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.data, vec!["1", "2", "3"]);
        assert_eq!(mapped.pagination.page, 2);
        assert_eq!(mapped.pagination.total_pages, 3);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("civic"), "%civic%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_search_term_ignores_blank() {
        assert_eq!(search_term(None), None);
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some("Honda")), Some("%Honda%".to_string()));
    }
}
