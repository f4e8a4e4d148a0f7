use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::invoice::{Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentMethod};

// Línea de factura en la request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub description: String,

    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,

    pub unit_price: Decimal,
}

// Request para crear una factura
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub customer_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    /// Por defecto, hoy (UTC)
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Porcentaje, 0..=100
    pub tax_rate: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub items: Vec<InvoiceItemRequest>,

    /// Emitir directamente en lugar de dejar en borrador
    #[serde(default)]
    pub issue: bool,
}

// Request para registrar un pago
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,

    #[validate(length(max = 120))]
    pub reference: Option<String>,

    pub paid_at: Option<DateTime<Utc>>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

// Filtros del listado
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub issued_from: Option<String>,
    pub issued_to: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// Response de factura para listados
#[derive(Debug, Serialize)]
pub struct InvoiceSummaryResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub balance_due: Decimal,
}

impl From<Invoice> for InvoiceSummaryResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            balance_due: invoice.balance_due(),
            invoice,
        }
    }
}

// Response de factura con líneas y pagos
#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    #[serde(flatten)]
    pub summary: InvoiceSummaryResponse,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
}

impl InvoiceDetailResponse {
    pub fn new(invoice: Invoice, items: Vec<InvoiceItem>, payments: Vec<Payment>) -> Self {
        Self {
            summary: InvoiceSummaryResponse::from(invoice),
            items,
            payments,
        }
    }
}

// Response tras registrar un pago
#[derive(Debug, Serialize)]
pub struct PaymentRecordedResponse {
    pub payment: Payment,
    pub invoice: InvoiceSummaryResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_invoice_requires_items() {
        let request: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::new_v4(),
            "items": []
        }))
        .unwrap();
        assert!(!request.issue);
        assert!(request.validate().unwrap_err().field_errors().contains_key("items"));
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        let item: InvoiceItemRequest = serde_json::from_value(serde_json::json!({
            "description": "Detailing",
            "quantity": 0,
            "unit_price": "120.00"
        }))
        .unwrap();
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_too_many_items_are_rejected() {
        let item = serde_json::json!({
            "description": "Detailing",
            "quantity": 1,
            "unit_price": "120.00"
        });
        let items: Vec<serde_json::Value> = std::iter::repeat(item).take(101).collect();
        let request: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::new_v4(),
            "items": items
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn test_payment_request_parses_method() {
        let request: RecordPaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": "500.00",
            "method": "bank_transfer"
        }))
        .unwrap();
        assert_eq!(request.method, PaymentMethod::BankTransfer);
        assert!(request.paid_at.is_none());
    }
}
