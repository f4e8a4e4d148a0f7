use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::invoice::{
    invoice_number, status_after_payment, Invoice, InvoiceItem, InvoiceStatus, InvoiceTotals,
    Payment, PaymentMethod,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::{Paginated, Pagination};

/// Línea ya validada
#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Factura ya validada con los totales calculados
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub customer_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Decimal,
    pub totals: InvoiceTotals,
    pub notes: Option<String>,
    pub items: Vec<NewInvoiceItem>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceListFilter {
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub issued_from: Option<NaiveDate>,
    pub issued_to: Option<NaiveDate>,
}

fn push_invoice_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &InvoiceListFilter) {
    if let Some(pattern) = &filter.search {
        qb.push(" AND concat_ws(' ', invoice_number, notes) ILIKE ")
            .push_bind(pattern.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        qb.push(" AND vehicle_id = ").push_bind(vehicle_id);
    }
    if let Some(from) = filter.issued_from {
        qb.push(" AND issue_date >= ").push_bind(from);
    }
    if let Some(to) = filter.issued_to {
        qb.push(" AND issue_date <= ").push_bind(to);
    }
}

pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crea la factura y sus líneas en una sola transacción
    pub async fn create(
        &self,
        invoice: NewInvoice,
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_id, vehicle_id, status, issue_date, due_date,
                subtotal, tax_rate, tax_amount, total, amount_paid, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12, $13, $13)
            RETURNING *
            "#
        )
        .bind(id)
        .bind(invoice_number(invoice.issue_date, id))
        .bind(invoice.customer_id)
        .bind(invoice.vehicle_id)
        .bind(invoice.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.totals.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.totals.tax_amount)
        .bind(invoice.totals.total)
        .bind(invoice.notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(invoice.items.len());
        for (position, item) in invoice.items.into_iter().enumerate() {
            let line = sqlx::query_as::<_, InvoiceItem>(
                r#"
                INSERT INTO invoice_items (id, invoice_id, description, quantity, unit_price, line_total, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            items.push(line);
        }

        tx.commit().await?;
        Ok((created, items))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    pub async fn items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, AppError> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY position ASC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn payments(&self, invoice_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE invoice_id = $1 ORDER BY paid_at ASC, created_at ASC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    pub async fn list(
        &self,
        filter: &InvoiceListFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Invoice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices WHERE 1=1");
        push_invoice_filters(&mut qb, filter);
        qb.push(" ORDER BY issue_date DESC, created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(pagination.limit());
        qb.push(" OFFSET ").push_bind(pagination.offset());

        let invoices = qb
            .build_query_as::<Invoice>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM invoices WHERE 1=1");
        push_invoice_filters(&mut count_qb, filter);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(Paginated::new(invoices, pagination, total))
    }

    /// Transición de estado condicionada al estado actual
    pub async fn transition(
        &self,
        id: Uuid,
        from: &[InvoiceStatus],
        to: InvoiceStatus,
    ) -> Result<Invoice, AppError> {
        let allowed: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let updated = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = ANY($4)
            RETURNING *
            "#
        )
        .bind(id)
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(allowed)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(invoice) => Ok(invoice),
            None => match self.find_by_id(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "Invoice in status '{}' cannot become '{}'",
                    current.status,
                    to.as_str()
                ))),
                None => Err(AppError::NotFound("Invoice not found".to_string())),
            },
        }
    }

    /// Registra un pago bloqueando la factura; rechaza importes por encima del saldo
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        payment: NewPayment,
        recorded_by: Option<Uuid>,
    ) -> Result<(Payment, Invoice), AppError> {
        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1 FOR UPDATE")
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;

        if !invoice.status().accepts_payments() {
            return Err(AppError::Conflict(format!(
                "Invoice in status '{}' does not accept payments",
                invoice.status
            )));
        }

        let balance = invoice.balance_due();
        if payment.amount > balance {
            return Err(AppError::Conflict(format!(
                "Payment of {} exceeds the balance due of {}",
                payment.amount, balance
            )));
        }

        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, invoice_id, amount, method, reference, paid_at, notes, recorded_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.reference)
        .bind(payment.paid_at)
        .bind(payment.notes)
        .bind(recorded_by)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let amount_paid = invoice.amount_paid + payment.amount;
        let status = status_after_payment(invoice.total, amount_paid);

        let updated = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET amount_paid = $2, status = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(invoice_id)
        .bind(amount_paid)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((created, updated))
    }

    pub async fn has_payments(&self, invoice_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM payments WHERE invoice_id = $1)")
                .bind(invoice_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// Solo se borran borradores; las líneas caen en cascada
    pub async fn delete_draft(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND status = 'draft'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(AppError::Conflict(
                    "Only draft invoices can be deleted".to_string(),
                )),
                None => Err(AppError::NotFound("Invoice not found".to_string())),
            };
        }

        Ok(())
    }

    /// Saldo pendiente de las facturas en los estados indicados
    pub async fn outstanding_balance(
        &self,
        statuses: &[InvoiceStatus],
    ) -> Result<Decimal, AppError> {
        let values: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let (balance,): (Option<Decimal>,) = sqlx::query_as(
            "SELECT SUM(total - amount_paid) FROM invoices WHERE status = ANY($1)",
        )
        .bind(values)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    pub async fn revenue_since(&self, since: DateTime<Utc>) -> Result<Decimal, AppError> {
        let (revenue,): (Option<Decimal>,) =
            sqlx::query_as("SELECT SUM(amount) FROM payments WHERE paid_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(revenue.unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_sql() {
        let filter = InvoiceListFilter {
            status: Some(InvoiceStatus::Issued),
            issued_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            issued_to: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM invoices WHERE 1=1");
        push_invoice_filters(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM invoices WHERE 1=1 AND status = $1 AND issue_date >= $2 AND issue_date <= $3"
        );
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices WHERE 1=1");
        push_invoice_filters(&mut qb, &InvoiceListFilter::default());
        assert_eq!(qb.sql(), "SELECT * FROM invoices WHERE 1=1");
    }
}
