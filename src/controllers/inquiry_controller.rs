use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::inquiry_dto::{
    InquiryQuery, InquiryReceipt, InquiryResponse, SubmitInquiryRequest, UpdateInquiryRequest,
};
use crate::models::inquiry::InquiryType;
use crate::repositories::customer_repository::CustomerRepository;
use crate::repositories::inquiry_repository::{
    InquiryChanges, InquiryListFilter, InquiryRepository, NewInquiry,
};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::{search_term, Paginated, Pagination};
use crate::utils::validation::{
    field_error, normalize_optional, parse_date_bound, validate_date_order,
};
use crate::utils::vehicle_status::classify_raw;

/// Tipo por defecto: `vehicle` si hay vehículo adjunto, si no `general`
fn default_inquiry_type(requested: Option<InquiryType>, vehicle_id: Option<Uuid>) -> InquiryType {
    requested.unwrap_or(if vehicle_id.is_some() {
        InquiryType::Vehicle
    } else {
        InquiryType::General
    })
}

pub struct InquiryController {
    repository: InquiryRepository,
    vehicles: VehicleRepository,
    customers: CustomerRepository,
}

impl InquiryController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InquiryRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool),
        }
    }

    /// Alta desde la web pública
    pub async fn submit(
        &self,
        request: SubmitInquiryRequest,
    ) -> Result<ApiResponse<InquiryReceipt>, AppError> {
        request.validate()?;

        // El vehículo debe existir y ser visible al público
        if let Some(vehicle_id) = request.vehicle_id {
            let visible = self
                .vehicles
                .find_by_id(vehicle_id)
                .await?
                .map(|v| classify_raw(&v.current_status).is_public)
                .unwrap_or(false);
            if !visible {
                return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
            }
        }

        let email = request.email.trim().to_lowercase();
        let customer_id = self.customers.find_by_email(&email).await?.map(|c| c.id);

        let inquiry = self
            .repository
            .create(NewInquiry {
                vehicle_id: request.vehicle_id,
                customer_id,
                name: request.name.trim().to_string(),
                email,
                phone: normalize_optional(request.phone),
                message: request.message.trim().to_string(),
                inquiry_type: default_inquiry_type(request.inquiry_type, request.vehicle_id),
            })
            .await?;

        info!("📨 Nueva consulta {} ({})", inquiry.id, inquiry.inquiry_type);

        Ok(ApiResponse::success_with_message(
            InquiryReceipt {
                id: inquiry.id,
                received_at: inquiry.created_at,
            },
            "Inquiry received",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<InquiryResponse, AppError> {
        let inquiry = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Inquiry", &id.to_string()))?;

        Ok(InquiryResponse::from(inquiry))
    }

    pub async fn list(&self, query: InquiryQuery) -> Result<Paginated<InquiryResponse>, AppError> {
        let created_after = query
            .created_after
            .as_deref()
            .map(parse_date_bound)
            .transpose()
            .map_err(|e| field_error("created_after", e))?;
        let created_before = query
            .created_before
            .as_deref()
            .map(parse_date_bound)
            .transpose()
            .map_err(|e| field_error("created_before", e))?;
        validate_date_order(created_after.as_ref(), created_before.as_ref())
            .map_err(|e| field_error("created_after", e))?;

        let filter = InquiryListFilter {
            search: search_term(query.search.as_deref()),
            status: query.status,
            inquiry_type: query.inquiry_type,
            vehicle_id: query.vehicle_id,
            customer_id: query.customer_id,
            assigned_to: query.assigned_to,
            created_after,
            created_before,
        };

        let page = self
            .repository
            .list(&filter, Pagination::new(query.page, query.page_size))
            .await?;

        Ok(page.map(InquiryResponse::from))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateInquiryRequest,
    ) -> Result<ApiResponse<InquiryResponse>, AppError> {
        if let Some(customer_id) = request.customer_id {
            if self.customers.find_by_id(customer_id).await?.is_none() {
                return Err(not_found_error("Customer", &customer_id.to_string()));
            }
        }

        let inquiry = self
            .repository
            .update(
                id,
                InquiryChanges {
                    status: request.status,
                    assigned_to: request.assigned_to,
                    customer_id: request.customer_id,
                    inquiry_type: request.inquiry_type,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            InquiryResponse::from(inquiry),
            "Inquiry updated",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        info!("🗑️ Consulta eliminada: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inquiry_type() {
        assert_eq!(default_inquiry_type(None, Some(Uuid::nil())), InquiryType::Vehicle);
        assert_eq!(default_inquiry_type(None, None), InquiryType::General);
        assert_eq!(
            default_inquiry_type(Some(InquiryType::TradeIn), Some(Uuid::nil())),
            InquiryType::TradeIn
        );
    }
}
