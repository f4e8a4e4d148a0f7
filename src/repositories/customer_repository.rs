use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::customer::Customer;
use crate::utils::errors::AppError;
use crate::utils::pagination::{Paginated, Pagination};

/// Datos de alta de un cliente
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Cambios parciales; `None` conserva el valor actual
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

fn push_customer_filters(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&String>) {
    if let Some(pattern) = search {
        qb.push(" AND concat_ws(' ', first_name, last_name, email, phone) ILIKE ")
            .push_bind(pattern.clone());
    }
}

pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, customer: NewCustomer) -> Result<Customer, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, first_name, last_name, email, phone, address, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(customer.first_name)
        .bind(customer.last_name)
        .bind(customer.email)
        .bind(customer.phone)
        .bind(customer.address)
        .bind(customer.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Búsqueda por email (sin distinguir mayúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE LOWER(email) = LOWER($1) LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> Result<Paginated<Customer>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM customers WHERE 1=1");
        push_customer_filters(&mut qb, search.as_ref());
        qb.push(" ORDER BY last_name ASC, first_name ASC, id ASC");
        qb.push(" LIMIT ").push_bind(pagination.limit());
        qb.push(" OFFSET ").push_bind(pagination.offset());

        let customers = qb
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers WHERE 1=1");
        push_customer_filters(&mut count_qb, search.as_ref());
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(Paginated::new(customers, pagination, total))
    }

    pub async fn update(&self, id: Uuid, changes: CustomerChanges) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                email      = COALESCE($4, email),
                phone      = COALESCE($5, phone),
                address    = COALESCE($6, address),
                notes      = COALESCE($7, notes),
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.address)
        .bind(changes.notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        Ok(customer)
    }

    pub async fn has_invoices(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM invoices WHERE customer_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers WHERE 1=1");
        push_customer_filters(&mut qb, Some(&"%ana%".to_string()));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM customers WHERE 1=1 AND concat_ws(' ', first_name, last_name, email, phone) ILIKE $1"
        );
    }
}
