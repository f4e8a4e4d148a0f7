use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::invoice_dto::{
    CreateInvoiceRequest, InvoiceDetailResponse, InvoiceQuery, InvoiceSummaryResponse,
    PaymentRecordedResponse, RecordPaymentRequest,
};
use crate::models::invoice::{compute_totals, InvoiceStatus};
use crate::models::user::AuthenticatedUser;
use crate::repositories::customer_repository::CustomerRepository;
use crate::repositories::invoice_repository::{
    InvoiceListFilter, InvoiceRepository, NewInvoice, NewInvoiceItem, NewPayment,
};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, validation_error, AppError};
use crate::utils::pagination::{search_term, Paginated, Pagination};
use crate::utils::validation::{
    field_error, normalize_optional, validate_date, validate_date_order, validate_money,
    validate_positive, validate_range, validate_scale,
};

/// Validación de la request completa, líneas incluidas
fn validate_invoice_request(request: &CreateInvoiceRequest) -> Result<(), AppError> {
    request.validate()?;
    for item in &request.items {
        item.validate()?;
        validate_money(item.unit_price).map_err(|e| field_error("unit_price", e))?;
    }
    if let Some(tax_rate) = request.tax_rate {
        validate_range(tax_rate, Decimal::ZERO, Decimal::ONE_HUNDRED)
            .map_err(|e| field_error("tax_rate", e))?;
        validate_scale(tax_rate, 2).map_err(|e| field_error("tax_rate", e))?;
    }
    Ok(())
}

pub struct InvoiceController {
    repository: InvoiceRepository,
    customers: CustomerRepository,
    vehicles: VehicleRepository,
}

impl InvoiceController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<ApiResponse<InvoiceDetailResponse>, AppError> {
        validate_invoice_request(&request)?;

        let issue_date = request.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        validate_date_order(Some(&issue_date), request.due_date.as_ref())
            .map_err(|e| field_error("due_date", e))?;

        if self.customers.find_by_id(request.customer_id).await?.is_none() {
            return Err(not_found_error("Customer", &request.customer_id.to_string()));
        }
        if let Some(vehicle_id) = request.vehicle_id {
            if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
                return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
            }
        }

        let tax_rate = request.tax_rate.unwrap_or(Decimal::ZERO);
        let totals = compute_totals(
            request.items.iter().map(|item| (item.quantity, item.unit_price)),
            tax_rate,
        )
        .ok_or_else(|| validation_error("items", "invoice total exceeds the supported amount"))?;

        let status = if request.issue {
            InvoiceStatus::Issued
        } else {
            InvoiceStatus::Draft
        };

        let items = request
            .items
            .into_iter()
            .zip(totals.line_totals.iter().copied())
            .map(|(item, line_total)| NewInvoiceItem {
                description: item.description.trim().to_string(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total,
            })
            .collect();

        let (invoice, items) = self
            .repository
            .create(NewInvoice {
                customer_id: request.customer_id,
                vehicle_id: request.vehicle_id,
                status,
                issue_date,
                due_date: request.due_date,
                tax_rate,
                totals,
                notes: normalize_optional(request.notes),
                items,
            })
            .await?;

        info!(
            "🧾 Factura {} creada ({}, total {})",
            invoice.invoice_number, invoice.status, invoice.total
        );

        Ok(ApiResponse::success_with_message(
            InvoiceDetailResponse::new(invoice, items, Vec::new()),
            "Invoice created",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<InvoiceDetailResponse, AppError> {
        let invoice = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Invoice", &id.to_string()))?;

        let items = self.repository.items(id).await?;
        let payments = self.repository.payments(id).await?;

        Ok(InvoiceDetailResponse::new(invoice, items, payments))
    }

    pub async fn list(
        &self,
        query: InvoiceQuery,
    ) -> Result<Paginated<InvoiceSummaryResponse>, AppError> {
        let issued_from = query
            .issued_from
            .as_deref()
            .map(validate_date)
            .transpose()
            .map_err(|e| field_error("issued_from", e))?;
        let issued_to = query
            .issued_to
            .as_deref()
            .map(validate_date)
            .transpose()
            .map_err(|e| field_error("issued_to", e))?;
        validate_date_order(issued_from.as_ref(), issued_to.as_ref())
            .map_err(|e| field_error("issued_from", e))?;

        let filter = InvoiceListFilter {
            search: search_term(query.search.as_deref()),
            status: query.status,
            customer_id: query.customer_id,
            vehicle_id: query.vehicle_id,
            issued_from,
            issued_to,
        };

        let page = self
            .repository
            .list(&filter, Pagination::new(query.page, query.page_size))
            .await?;

        Ok(page.map(InvoiceSummaryResponse::from))
    }

    /// Borrador → emitida
    pub async fn issue(&self, id: Uuid) -> Result<ApiResponse<InvoiceSummaryResponse>, AppError> {
        let invoice = self
            .repository
            .transition(id, &[InvoiceStatus::Draft], InvoiceStatus::Issued)
            .await?;

        info!("📤 Factura emitida: {}", invoice.invoice_number);

        Ok(ApiResponse::success_with_message(
            InvoiceSummaryResponse::from(invoice),
            "Invoice issued",
        ))
    }

    /// Anulación; solo facturas sin pagos
    pub async fn void(&self, id: Uuid) -> Result<ApiResponse<InvoiceSummaryResponse>, AppError> {
        if self.repository.has_payments(id).await? {
            warn!("⚠️ Factura {} con pagos, no se puede anular", id);
            return Err(AppError::Conflict(
                "Invoice has payments and cannot be voided".to_string(),
            ));
        }

        let invoice = self
            .repository
            .transition(
                id,
                &[InvoiceStatus::Draft, InvoiceStatus::Issued],
                InvoiceStatus::Void,
            )
            .await?;

        info!("🚫 Factura anulada: {}", invoice.invoice_number);

        Ok(ApiResponse::success_with_message(
            InvoiceSummaryResponse::from(invoice),
            "Invoice voided",
        ))
    }

    pub async fn record_payment(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<ApiResponse<PaymentRecordedResponse>, AppError> {
        request.validate()?;
        validate_positive(request.amount).map_err(|e| field_error("amount", e))?;
        validate_money(request.amount).map_err(|e| field_error("amount", e))?;

        let (payment, invoice) = self
            .repository
            .record_payment(
                id,
                NewPayment {
                    amount: request.amount,
                    method: request.method,
                    reference: normalize_optional(request.reference),
                    paid_at: request.paid_at.unwrap_or_else(Utc::now),
                    notes: normalize_optional(request.notes),
                },
                Some(user.user_id),
            )
            .await?;

        info!(
            "💰 Pago de {} registrado en {} (estado: {})",
            payment.amount, invoice.invoice_number, invoice.status
        );

        Ok(ApiResponse::success_with_message(
            PaymentRecordedResponse {
                payment,
                invoice: InvoiceSummaryResponse::from(invoice),
            },
            "Payment recorded",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete_draft(id).await?;
        info!("🗑️ Factura eliminada: {}", id);
        Ok(())
    }
}
