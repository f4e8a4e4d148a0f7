//! Modelos del dashboard de administración
//!
//! Las agregaciones por estado se hacen en Rust sobre los conteos crudos de
//! la base de datos, usando el clasificador de estados.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::vehicle::{StatusCount, VehicleStatus};
use crate::utils::vehicle_status::{public_class, PublicClass};

/// Desglose del inventario por estado y por clase pública
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryBreakdown {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub arriving_soon: i64,
    pub arrived: i64,
    pub reserved: i64,
    pub hidden: i64,
    /// Valores guardados que no existen en la taxonomía actual
    pub unknown: i64,
}

impl InventoryBreakdown {
    pub fn from_counts(counts: &[StatusCount]) -> Self {
        let mut breakdown = Self::default();

        for row in counts {
            breakdown.total += row.count;
            *breakdown
                .by_status
                .entry(row.current_status.clone())
                .or_insert(0) += row.count;

            match row.current_status.parse::<VehicleStatus>().map(public_class) {
                Ok(PublicClass::ArrivingSoon) => breakdown.arriving_soon += row.count,
                Ok(PublicClass::Arrived) => breakdown.arrived += row.count,
                Ok(PublicClass::Reserved) => breakdown.reserved += row.count,
                Ok(PublicClass::Hidden) => breakdown.hidden += row.count,
                Err(_) => breakdown.unknown += row.count,
            }
        }

        breakdown
    }
}

/// Conteos de las tres pestañas públicas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicInventorySummary {
    pub all: i64,
    pub arrived: i64,
    pub arriving_soon: i64,
}

impl From<&InventoryBreakdown> for PublicInventorySummary {
    fn from(breakdown: &InventoryBreakdown) -> Self {
        Self {
            all: breakdown.arriving_soon + breakdown.arrived + breakdown.reserved,
            arrived: breakdown.arrived,
            arriving_soon: breakdown.arriving_soon,
        }
    }
}

/// Métricas comerciales
#[derive(Debug, Clone, Serialize)]
pub struct SalesMetrics {
    pub inventory_value: Decimal,
    pub open_inquiries: i64,
    pub new_inquiries_last_7_days: i64,
    pub outstanding_balance: Decimal,
    pub revenue_this_month: Decimal,
}

/// Respuesta completa del dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub inventory: InventoryBreakdown,
    pub public_inventory: PublicInventorySummary,
    pub sales: SalesMetrics,
}
