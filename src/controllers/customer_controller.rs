use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerQuery, CustomerResponse, UpdateCustomerRequest,
};
use crate::repositories::customer_repository::{CustomerChanges, CustomerRepository, NewCustomer};
use crate::utils::errors::{conflict_error, not_found_error, AppError};
use crate::utils::pagination::{search_term, Paginated, Pagination};
use crate::utils::validation::normalize_optional;

pub struct CustomerController {
    repository: CustomerRepository,
}

impl CustomerController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ApiResponse<CustomerResponse>, AppError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(conflict_error("Customer", "email", &email));
        }

        let customer = self
            .repository
            .create(NewCustomer {
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                email,
                phone: normalize_optional(request.phone),
                address: normalize_optional(request.address),
                notes: normalize_optional(request.notes),
            })
            .await?;

        info!("👤 Cliente creado: {}", customer.id);

        Ok(ApiResponse::success_with_message(
            CustomerResponse::from(customer),
            "Customer created",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CustomerResponse, AppError> {
        let customer = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))?;

        Ok(CustomerResponse::from(customer))
    }

    pub async fn list(
        &self,
        query: CustomerQuery,
    ) -> Result<Paginated<CustomerResponse>, AppError> {
        let page = self
            .repository
            .list(
                search_term(query.search.as_deref()),
                Pagination::new(query.page, query.page_size),
            )
            .await?;

        Ok(page.map(CustomerResponse::from))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<ApiResponse<CustomerResponse>, AppError> {
        request.validate()?;

        let email = request.email.map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            if let Some(existing) = self.repository.find_by_email(email).await? {
                if existing.id != id {
                    return Err(conflict_error("Customer", "email", email));
                }
            }
        }

        let customer = self
            .repository
            .update(
                id,
                CustomerChanges {
                    first_name: normalize_optional(request.first_name),
                    last_name: normalize_optional(request.last_name),
                    email,
                    phone: normalize_optional(request.phone),
                    address: normalize_optional(request.address),
                    notes: normalize_optional(request.notes),
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            CustomerResponse::from(customer),
            "Customer updated",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.repository.has_invoices(id).await? {
            warn!("⚠️ Cliente {} con facturas, no se elimina", id);
            return Err(AppError::Conflict(
                "Customer has invoices and cannot be deleted".to_string(),
            ));
        }

        self.repository.delete(id).await?;
        info!("🗑️ Cliente eliminado: {}", id);
        Ok(())
    }
}
