//! Back-office e inventario de la concesionaria
//!
//! API HTTP (axum + sqlx/PostgreSQL) para el inventario de vehículos con su
//! clasificación pública de estados, CRM de clientes, consultas de la web,
//! facturación y dashboard.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;

use axum::Router;

use crate::state::AppState;

/// Construir la aplicación completa a partir del estado
pub fn create_app(state: AppState) -> Router {
    routes::create_router(state)
}
