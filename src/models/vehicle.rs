//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, el historial de estados y la
//! taxonomía cerrada de estados del ciclo de vida (subasta → entrega).
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del vehículo dentro del pipeline de importación.
///
/// En base de datos se guarda como TEXT (`as_str`), no como ENUM de Postgres,
/// para tolerar valores antiguos que ya no existen en este enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    AuctionWon,
    PaymentPending,
    PaymentCompleted,
    PickupScheduled,
    PickedUp,
    AtOriginPort,
    Shipped,
    InTransit,
    AtDestinationPort,
    CustomsClearance,
    ReleasedFromCustoms,
    AtYard,
    UnderEnhancement,
    ReadyForSale,
    Reserved,
    Sold,
    Delivered,
}

impl VehicleStatus {
    /// Todos los estados, en orden de ciclo de vida
    pub const ALL: [VehicleStatus; 17] = [
        VehicleStatus::AuctionWon,
        VehicleStatus::PaymentPending,
        VehicleStatus::PaymentCompleted,
        VehicleStatus::PickupScheduled,
        VehicleStatus::PickedUp,
        VehicleStatus::AtOriginPort,
        VehicleStatus::Shipped,
        VehicleStatus::InTransit,
        VehicleStatus::AtDestinationPort,
        VehicleStatus::CustomsClearance,
        VehicleStatus::ReleasedFromCustoms,
        VehicleStatus::AtYard,
        VehicleStatus::UnderEnhancement,
        VehicleStatus::ReadyForSale,
        VehicleStatus::Reserved,
        VehicleStatus::Sold,
        VehicleStatus::Delivered,
    ];

    /// Valor en formato wire (snake_case)
    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::AuctionWon => "auction_won",
            VehicleStatus::PaymentPending => "payment_pending",
            VehicleStatus::PaymentCompleted => "payment_completed",
            VehicleStatus::PickupScheduled => "pickup_scheduled",
            VehicleStatus::PickedUp => "picked_up",
            VehicleStatus::AtOriginPort => "at_origin_port",
            VehicleStatus::Shipped => "shipped",
            VehicleStatus::InTransit => "in_transit",
            VehicleStatus::AtDestinationPort => "at_destination_port",
            VehicleStatus::CustomsClearance => "customs_clearance",
            VehicleStatus::ReleasedFromCustoms => "released_from_customs",
            VehicleStatus::AtYard => "at_yard",
            VehicleStatus::UnderEnhancement => "under_enhancement",
            VehicleStatus::ReadyForSale => "ready_for_sale",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Sold => "sold",
            VehicleStatus::Delivered => "delivered",
        }
    }

    /// Etiqueta para las vistas de administración
    pub const fn label(&self) -> &'static str {
        match self {
            VehicleStatus::AuctionWon => "Auction Won",
            VehicleStatus::PaymentPending => "Payment Pending",
            VehicleStatus::PaymentCompleted => "Payment Completed",
            VehicleStatus::PickupScheduled => "Pickup Scheduled",
            VehicleStatus::PickedUp => "Picked Up",
            VehicleStatus::AtOriginPort => "At Origin Port",
            VehicleStatus::Shipped => "Shipped",
            VehicleStatus::InTransit => "In Transit",
            VehicleStatus::AtDestinationPort => "At Destination Port",
            VehicleStatus::CustomsClearance => "Customs Clearance",
            VehicleStatus::ReleasedFromCustoms => "Released From Customs",
            VehicleStatus::AtYard => "At Yard",
            VehicleStatus::UnderEnhancement => "Under Enhancement",
            VehicleStatus::ReadyForSale => "Ready For Sale",
            VehicleStatus::Reserved => "Reserved",
            VehicleStatus::Sold => "Sold",
            VehicleStatus::Delivered => "Delivered",
        }
    }
}

impl Default for VehicleStatus {
    fn default() -> Self {
        VehicleStatus::AuctionWon
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error al parsear un estado que no existe en la taxonomía
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle status '{0}'")]
pub struct ParseVehicleStatusError(pub String);

impl FromStr for VehicleStatus {
    type Err = ParseVehicleStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ParseVehicleStatusError(value.to_string()))
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub stock_number: String,
    pub vin: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub trim: Option<String>,
    pub color: Option<String>,
    pub mileage: i32,
    pub purchase_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,
    /// Valor crudo: puede no existir en `VehicleStatus` si hubo drift de datos
    pub current_status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Estado tipado, `None` si el valor guardado no está en la taxonomía actual
    pub fn status(&self) -> Option<VehicleStatus> {
        self.current_status.parse().ok()
    }
}

/// Entrada del historial de estados (append-only, nunca se modifica)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleStatusHistory {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

/// Conteo de vehículos por estado crudo (dashboard)
#[derive(Debug, Clone, FromRow)]
pub struct StatusCount {
    pub current_status: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_round_trip_through_from_str() {
        for status in VehicleStatus::ALL {
            assert_eq!(status.as_str().parse::<VehicleStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_is_a_parse_error() {
        let err = "lost_at_sea".parse::<VehicleStatus>().unwrap_err();
        assert_eq!(err, ParseVehicleStatusError("lost_at_sea".to_string()));
        // El parseo es estricto: sin normalizar mayúsculas
        assert!("AT_YARD".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&VehicleStatus::ReleasedFromCustoms).unwrap();
        assert_eq!(json, "\"released_from_customs\"");

        let parsed: VehicleStatus = serde_json::from_str("\"at_destination_port\"").unwrap();
        assert_eq!(parsed, VehicleStatus::AtDestinationPort);
    }

    #[test]
    fn test_default_is_auction_won() {
        assert_eq!(VehicleStatus::default(), VehicleStatus::AuctionWon);
    }

    #[test]
    fn test_vehicle_status_tolerates_drift() {
        let now = Utc::now();
        let mut vehicle = Vehicle {
            id: Uuid::new_v4(),
            stock_number: "STK-001".to_string(),
            vin: None,
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2019,
            trim: None,
            color: None,
            mileage: 42_000,
            purchase_price: None,
            listing_price: None,
            current_status: "in_transit".to_string(),
            location: None,
            description: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(vehicle.status(), Some(VehicleStatus::InTransit));

        vehicle.current_status = "legacy_state".to_string();
        assert_eq!(vehicle.status(), None);
    }
}
