//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, paginación y la clasificación pública de estados de vehículos.

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod validation;
pub mod vehicle_status;
