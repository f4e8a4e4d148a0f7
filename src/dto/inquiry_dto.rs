use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::inquiry::{Inquiry, InquiryStatus, InquiryType};
use crate::utils::validation::validate_phone;

// Request pública para enviar una consulta
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitInquiryRequest {
    pub vehicle_id: Option<Uuid>,

    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,

    pub inquiry_type: Option<InquiryType>,
}

// Request de administración para gestionar una consulta
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: Option<InquiryStatus>,
    pub assigned_to: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub inquiry_type: Option<InquiryType>,
}

// Filtros del listado
#[derive(Debug, Default, Deserialize)]
pub struct InquiryQuery {
    pub search: Option<String>,
    pub status: Option<InquiryStatus>,
    pub inquiry_type: Option<InquiryType>,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// Response de consulta
#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub inquiry_type: String,
    pub status: String,
    pub is_open: bool,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Inquiry> for InquiryResponse {
    fn from(inquiry: Inquiry) -> Self {
        Self {
            is_open: inquiry
                .status
                .parse::<InquiryStatus>()
                .map(|s| s.is_open())
                .unwrap_or(false),
            id: inquiry.id,
            vehicle_id: inquiry.vehicle_id,
            customer_id: inquiry.customer_id,
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            inquiry_type: inquiry.inquiry_type,
            status: inquiry.status,
            assigned_to: inquiry.assigned_to,
            created_at: inquiry.created_at,
            updated_at: inquiry.updated_at,
        }
    }
}

// Acuse de recibo para la web pública
#[derive(Debug, Serialize)]
pub struct InquiryReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_validation() {
        let request: SubmitInquiryRequest = serde_json::from_value(serde_json::json!({
            "name": "Luis",
            "email": "luis@example.com",
            "message": "Is the Civic still available?",
            "inquiry_type": "financing"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.inquiry_type, Some(InquiryType::Financing));

        let empty: SubmitInquiryRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "email": "luis",
            "message": ""
        }))
        .unwrap();
        let errors = empty.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }
}
