//! Modelo de Invoice, InvoiceItem y Payment
//!
//! Además de las filas, contiene las reglas de cálculo de totales y de
//! estado de pago, que son funciones puras.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::validation::MAX_MONEY;

/// Estado de la factura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    PartiallyPaid,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }

    /// Solo facturas emitidas con saldo pendiente aceptan pagos
    pub fn accepts_payments(&self) -> bool {
        matches!(self, InvoiceStatus::Issued | InvoiceStatus::PartiallyPaid)
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(InvoiceStatus::Draft),
            "issued" => Ok(InvoiceStatus::Issued),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// Medio de pago
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    Cheque,
    Financing,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Financing => "financing",
        }
    }
}

/// Invoice - mapea a la tabla invoices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Estado tipado; un valor desconocido se trata como borrador
    pub fn status(&self) -> InvoiceStatus {
        self.status.parse().unwrap_or(InvoiceStatus::Draft)
    }

    pub fn balance_due(&self) -> Decimal {
        (self.total - self.amount_paid).max(Decimal::ZERO)
    }
}

/// Línea de factura
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub position: i32,
}

/// Pago registrado contra una factura
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Totales calculados de una factura
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    /// Un importe por línea, en el orden de entrada
    pub line_totals: Vec<Decimal>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `None` si el producto desborda
pub fn line_total(quantity: i32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price).map(round_money)
}

/// Subtotal, impuesto (porcentaje) y total a partir de (cantidad, precio unitario).
///
/// Devuelve `None` si la aritmética desborda o si algún importe no cabe en
/// una columna `NUMERIC(12, 2)`.
pub fn compute_totals<I>(lines: I, tax_rate: Decimal) -> Option<InvoiceTotals>
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    let mut line_totals = Vec::new();
    let mut subtotal = Decimal::ZERO;
    for (quantity, unit_price) in lines {
        let line = line_total(quantity, unit_price)?;
        subtotal = subtotal.checked_add(line)?;
        line_totals.push(line);
    }

    let tax_amount = round_money(
        subtotal
            .checked_mul(tax_rate)?
            .checked_div(Decimal::ONE_HUNDRED)?,
    );
    let total = subtotal.checked_add(tax_amount)?;

    if total > MAX_MONEY || line_totals.iter().any(|line| *line > MAX_MONEY) {
        return None;
    }

    Some(InvoiceTotals {
        line_totals,
        subtotal,
        tax_amount,
        total,
    })
}

/// Estado resultante tras acumular `amount_paid` sobre una factura emitida
pub fn status_after_payment(total: Decimal, amount_paid: Decimal) -> InvoiceStatus {
    if amount_paid <= Decimal::ZERO {
        InvoiceStatus::Issued
    } else if amount_paid < total {
        InvoiceStatus::PartiallyPaid
    } else {
        InvoiceStatus::Paid
    }
}

/// Número de factura `INV-YYYYMMDD-XXXXXX`
pub fn invoice_number(issue_date: NaiveDate, id: Uuid) -> String {
    let suffix: String = id.simple().to_string().chars().take(6).collect();
    format!("INV-{}-{}", issue_date.format("%Y%m%d"), suffix.to_uppercase())
}
