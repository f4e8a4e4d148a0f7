//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (`migrations/`).

pub mod customer;
pub mod dashboard;
pub mod inquiry;
pub mod invoice;
pub mod user;
pub mod vehicle;
