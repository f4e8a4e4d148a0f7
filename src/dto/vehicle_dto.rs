use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{Vehicle, VehicleStatus, VehicleStatusHistory};
use crate::utils::validation::validate_vin;
use crate::utils::vehicle_status::{
    classify_raw, BadgeCategory, PublicStatusLabel, StatusClassification, StatusGroup,
};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 30))]
    pub stock_number: String,

    #[validate(custom = "validate_vin")]
    pub vin: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub make: String,

    #[validate(length(min = 1, max = 60))]
    pub model: String,

    pub year: i32,

    #[validate(length(max = 60))]
    pub trim: Option<String>,

    #[validate(length(max = 40))]
    pub color: Option<String>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    pub purchase_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,

    /// Por defecto `auction_won`
    pub initial_status: Option<VehicleStatus>,

    #[validate(length(max = 120))]
    pub location: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

// Request para actualizar un vehículo (el estado va por su propio endpoint)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 30))]
    pub stock_number: Option<String>,

    #[validate(custom = "validate_vin")]
    pub vin: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub model: Option<String>,

    pub year: Option<i32>,

    #[validate(length(max = 60))]
    pub trim: Option<String>,

    #[validate(length(max = 40))]
    pub color: Option<String>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    pub purchase_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,

    #[validate(length(max = 120))]
    pub location: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

// Request para cambiar el estado del vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleStatusRequest {
    pub status: VehicleStatus,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

// Filtros del listado de administración (query string)
#[derive(Debug, Default, Deserialize)]
pub struct VehicleQuery {
    pub search: Option<String>,
    /// Lista separada por comas de estados exactos
    pub status: Option<String>,
    pub group: Option<String>,
    pub make: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// Filtros del listado público
#[derive(Debug, Default, Deserialize)]
pub struct PublicVehicleQuery {
    pub group: Option<String>,
    pub search: Option<String>,
    pub make: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// Response de vehículo (administración)
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
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
    #[serde(flatten)]
    pub classification: StatusClassification,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            classification: classify_raw(&vehicle.current_status),
            id: vehicle.id,
            stock_number: vehicle.stock_number,
            vin: vehicle.vin,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            trim: vehicle.trim,
            color: vehicle.color,
            mileage: vehicle.mileage,
            purchase_price: vehicle.purchase_price,
            listing_price: vehicle.listing_price,
            location: vehicle.location,
            description: vehicle.description,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

// Response de vehículo (web pública): sin precio de compra ni VIN
#[derive(Debug, Serialize)]
pub struct PublicVehicleResponse {
    pub id: Uuid,
    pub stock_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub trim: Option<String>,
    pub color: Option<String>,
    pub mileage: i32,
    pub listing_price: Option<Decimal>,
    pub status_label: Option<PublicStatusLabel>,
    pub badge: BadgeCategory,
    pub badge_color: &'static str,
    pub group: StatusGroup,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl From<Vehicle> for PublicVehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        let classification = classify_raw(&vehicle.current_status);
        Self {
            id: vehicle.id,
            stock_number: vehicle.stock_number,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            trim: vehicle.trim,
            color: vehicle.color,
            mileage: vehicle.mileage,
            listing_price: vehicle.listing_price,
            status_label: classification.public_label,
            badge: classification.badge,
            badge_color: classification.badge_color,
            group: classification.group,
            location: vehicle.location,
            description: vehicle.description,
        }
    }
}

// Entrada del historial con etiquetas
#[derive(Debug, Serialize)]
pub struct StatusHistoryResponse {
    pub id: Uuid,
    pub from_status: Option<String>,
    pub from_label: Option<&'static str>,
    pub to_status: String,
    pub to_label: Option<&'static str>,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

impl From<VehicleStatusHistory> for StatusHistoryResponse {
    fn from(entry: VehicleStatusHistory) -> Self {
        Self {
            id: entry.id,
            from_label: entry
                .from_status
                .as_deref()
                .and_then(|s| classify_raw(s).status_label),
            to_label: classify_raw(&entry.to_status).status_label,
            from_status: entry.from_status,
            to_status: entry.to_status,
            notes: entry.notes,
            changed_by: entry.changed_by,
            changed_at: entry.changed_at,
        }
    }
}

// Response del cambio de estado: vehículo + entrada de historial creada
#[derive(Debug, Serialize)]
pub struct VehicleStatusChangeResponse {
    pub vehicle: VehicleResponse,
    pub history_entry: StatusHistoryResponse,
}
