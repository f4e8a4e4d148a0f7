//! Modelo de Inquiry
//!
//! Consultas que llegan desde la web pública (sobre un vehículo o generales)
//! y que el equipo comercial gestiona desde el back-office.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tipo de consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryType {
    General,
    Vehicle,
    Financing,
    TradeIn,
}

impl InquiryType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InquiryType::General => "general",
            InquiryType::Vehicle => "vehicle",
            InquiryType::Financing => "financing",
            InquiryType::TradeIn => "trade_in",
        }
    }
}

impl FromStr for InquiryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "general" => Ok(InquiryType::General),
            "vehicle" => Ok(InquiryType::Vehicle),
            "financing" => Ok(InquiryType::Financing),
            "trade_in" => Ok(InquiryType::TradeIn),
            other => Err(format!("unknown inquiry type '{}'", other)),
        }
    }
}

/// Estado de seguimiento de la consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    New,
    Contacted,
    Qualified,
    Closed,
    Lost,
}

impl InquiryStatus {
    pub const OPEN: [InquiryStatus; 3] = [
        InquiryStatus::New,
        InquiryStatus::Contacted,
        InquiryStatus::Qualified,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Qualified => "qualified",
            InquiryStatus::Closed => "closed",
            InquiryStatus::Lost => "lost",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new" => Ok(InquiryStatus::New),
            "contacted" => Ok(InquiryStatus::Contacted),
            "qualified" => Ok(InquiryStatus::Qualified),
            "closed" => Ok(InquiryStatus::Closed),
            "lost" => Ok(InquiryStatus::Lost),
            other => Err(format!("unknown inquiry status '{}'", other)),
        }
    }
}

/// Inquiry - mapea a la tabla inquiries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub inquiry_type: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_statuses() {
        assert!(InquiryStatus::New.is_open());
        assert!(InquiryStatus::Qualified.is_open());
        assert!(!InquiryStatus::Closed.is_open());
        assert!(!InquiryStatus::Lost.is_open());
    }

    #[test]
    fn test_wire_values_match_serde() {
        for status in [
            InquiryStatus::New,
            InquiryStatus::Contacted,
            InquiryStatus::Qualified,
            InquiryStatus::Closed,
            InquiryStatus::Lost,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<InquiryStatus>(), Ok(status));
        }
        assert_eq!("trade_in".parse::<InquiryType>(), Ok(InquiryType::TradeIn));
        assert!("spam".parse::<InquiryType>().is_err());
    }
}
