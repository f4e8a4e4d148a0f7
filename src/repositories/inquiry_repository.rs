use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::inquiry::{Inquiry, InquiryStatus, InquiryType};
use crate::utils::errors::AppError;
use crate::utils::pagination::{Paginated, Pagination};

/// Datos de alta de una consulta
#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub inquiry_type: InquiryType,
}

/// Cambios de gestión; `None` conserva el valor actual
#[derive(Debug, Clone, Default)]
pub struct InquiryChanges {
    pub status: Option<InquiryStatus>,
    pub assigned_to: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub inquiry_type: Option<InquiryType>,
}

/// Filtros ya validados del listado
#[derive(Debug, Clone, Default)]
pub struct InquiryListFilter {
    pub search: Option<String>,
    pub status: Option<InquiryStatus>,
    pub inquiry_type: Option<InquiryType>,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

fn push_inquiry_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &InquiryListFilter) {
    if let Some(pattern) = &filter.search {
        qb.push(" AND concat_ws(' ', name, email, phone, message) ILIKE ")
            .push_bind(pattern.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(inquiry_type) = filter.inquiry_type {
        qb.push(" AND inquiry_type = ").push_bind(inquiry_type.as_str());
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        qb.push(" AND vehicle_id = ").push_bind(vehicle_id);
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(assigned_to) = filter.assigned_to {
        qb.push(" AND assigned_to = ").push_bind(assigned_to);
    }
    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
    if let Some(before) = filter.created_before {
        qb.push(" AND created_at < ").push_bind(before);
    }
}

pub struct InquiryRepository {
    pool: PgPool,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, inquiry: NewInquiry) -> Result<Inquiry, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (
                id, vehicle_id, customer_id, name, email, phone, message,
                inquiry_type, status, assigned_to, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'new', NULL, $9, $9)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(inquiry.vehicle_id)
        .bind(inquiry.customer_id)
        .bind(inquiry.name)
        .bind(inquiry.email)
        .bind(inquiry.phone)
        .bind(inquiry.message)
        .bind(inquiry.inquiry_type.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Inquiry>, AppError> {
        let inquiry = sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(inquiry)
    }

    pub async fn list(
        &self,
        filter: &InquiryListFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Inquiry>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM inquiries WHERE 1=1");
        push_inquiry_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(pagination.limit());
        qb.push(" OFFSET ").push_bind(pagination.offset());

        let inquiries = qb
            .build_query_as::<Inquiry>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM inquiries WHERE 1=1");
        push_inquiry_filters(&mut count_qb, filter);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(Paginated::new(inquiries, pagination, total))
    }

    pub async fn update(&self, id: Uuid, changes: InquiryChanges) -> Result<Inquiry, AppError> {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries
            SET status       = COALESCE($2, status),
                assigned_to  = COALESCE($3, assigned_to),
                customer_id  = COALESCE($4, customer_id),
                inquiry_type = COALESCE($5, inquiry_type),
                updated_at   = $6
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.assigned_to)
        .bind(changes.customer_id)
        .bind(changes.inquiry_type.map(|t| t.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Inquiry not found".to_string()))?;

        Ok(inquiry)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inquiry not found".to_string()));
        }

        Ok(())
    }

    pub async fn count_with_statuses(&self, statuses: &[InquiryStatus]) -> Result<i64, AppError> {
        let values: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries WHERE status = ANY($1)")
            .bind(values)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_created_since(&self, since: DateTime<Utc>) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
