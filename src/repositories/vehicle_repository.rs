use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::vehicle::{StatusCount, Vehicle, VehicleStatus, VehicleStatusHistory};
use crate::utils::errors::AppError;
use crate::utils::pagination::{Paginated, Pagination};

/// Orden del listado (claves en lista blanca)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    YearDesc,
    MileageAsc,
}

impl VehicleSort {
    /// Claves desconocidas caen en `Newest`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => VehicleSort::Oldest,
            Some("price_asc") => VehicleSort::PriceAsc,
            Some("price_desc") => VehicleSort::PriceDesc,
            Some("year_desc") => VehicleSort::YearDesc,
            Some("mileage_asc") => VehicleSort::MileageAsc,
            _ => VehicleSort::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            VehicleSort::Newest => "created_at DESC, id DESC",
            VehicleSort::Oldest => "created_at ASC, id ASC",
            VehicleSort::PriceAsc => "listing_price ASC NULLS LAST, created_at DESC",
            VehicleSort::PriceDesc => "listing_price DESC NULLS LAST, created_at DESC",
            VehicleSort::YearDesc => "year DESC, created_at DESC",
            VehicleSort::MileageAsc => "mileage ASC, created_at DESC",
        }
    }
}

/// Filtros ya validados del listado de vehículos
#[derive(Debug, Clone, Default)]
pub struct VehicleListFilter {
    /// Patrón ILIKE ya escapado
    pub search: Option<String>,
    /// Predicado `current_status = ANY(...)`
    pub statuses: Option<Vec<String>>,
    pub make: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub sort: VehicleSort,
}

/// Añade el WHERE de los filtros (la consulta base ya termina en `WHERE 1=1`)
fn push_vehicle_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &VehicleListFilter) {
    if let Some(pattern) = &filter.search {
        qb.push(" AND concat_ws(' ', stock_number, vin, make, model, trim, color) ILIKE ")
            .push_bind(pattern.clone());
    }
    if let Some(statuses) = &filter.statuses {
        qb.push(" AND current_status = ANY(")
            .push_bind(statuses.clone())
            .push(")");
    }
    if let Some(make) = &filter.make {
        qb.push(" AND LOWER(make) = LOWER(").push_bind(make.clone()).push(")");
    }
    if let Some(year_from) = filter.year_from {
        qb.push(" AND year >= ").push_bind(year_from);
    }
    if let Some(year_to) = filter.year_to {
        qb.push(" AND year <= ").push_bind(year_to);
    }
    if let Some(price_min) = filter.price_min {
        qb.push(" AND listing_price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filter.price_max {
        qb.push(" AND listing_price <= ").push_bind(price_max);
    }
    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
    if let Some(before) = filter.created_before {
        qb.push(" AND created_at < ").push_bind(before);
    }
}

fn list_query(
    filter: &VehicleListFilter,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM vehicles WHERE 1=1");
    push_vehicle_filters(&mut qb, filter);
    qb.push(" ORDER BY ").push(filter.sort.order_by());
    qb.push(" LIMIT ").push_bind(pagination.limit());
    qb.push(" OFFSET ").push_bind(pagination.offset());
    qb
}

fn count_query(filter: &VehicleListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM vehicles WHERE 1=1");
    push_vehicle_filters(&mut qb, filter);
    qb
}

/// Datos de alta de un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub stock_number: String,
    pub vin: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub trim: Option<String>,
    pub color: Option<String>,
    pub mileage: i32,
    pub purchase_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,
    pub status: VehicleStatus,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Cambios parciales; `None` conserva el valor actual
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub stock_number: Option<String>,
    pub vin: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub trim: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub purchase_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Alta + entrada inicial del historial, en una transacción
    pub async fn create(
        &self,
        vehicle: NewVehicle,
        created_by: Option<Uuid>,
    ) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, stock_number, vin, make, model, year, trim, color, mileage,
                purchase_price, listing_price, current_status, location, description,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.stock_number)
        .bind(vehicle.vin)
        .bind(vehicle.make)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.trim)
        .bind(vehicle.color)
        .bind(vehicle.mileage)
        .bind(vehicle.purchase_price)
        .bind(vehicle.listing_price)
        .bind(vehicle.status.as_str())
        .bind(vehicle.location)
        .bind(vehicle.description)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO vehicle_status_history (id, vehicle_id, from_status, to_status, notes, changed_by, changed_at)
            VALUES ($1, $2, NULL, $3, 'Vehicle created', $4, $5)
            "#
        )
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(&created.current_status)
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn list(
        &self,
        filter: &VehicleListFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Vehicle>, AppError> {
        let vehicles = list_query(filter, pagination)
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        let (total,): (i64,) = count_query(filter)
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(vehicles, pagination, total))
    }

    pub async fn stock_number_exists(
        &self,
        stock_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE stock_number = $1 AND ($2::uuid IS NULL OR id <> $2))"
        )
        .bind(stock_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn vin_exists(
        &self,
        vin: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE vin = $1 AND ($2::uuid IS NULL OR id <> $2))"
        )
        .bind(vin)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    /// Actualiza campos descriptivos y financieros; nunca el estado
    pub async fn update(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET stock_number   = COALESCE($2, stock_number),
                vin            = COALESCE($3, vin),
                make           = COALESCE($4, make),
                model          = COALESCE($5, model),
                year           = COALESCE($6, year),
                trim           = COALESCE($7, trim),
                color          = COALESCE($8, color),
                mileage        = COALESCE($9, mileage),
                purchase_price = COALESCE($10, purchase_price),
                listing_price  = COALESCE($11, listing_price),
                location       = COALESCE($12, location),
                description    = COALESCE($13, description),
                updated_at     = $14
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(changes.stock_number)
        .bind(changes.vin)
        .bind(changes.make)
        .bind(changes.model)
        .bind(changes.year)
        .bind(changes.trim)
        .bind(changes.color)
        .bind(changes.mileage)
        .bind(changes.purchase_price)
        .bind(changes.listing_price)
        .bind(changes.location)
        .bind(changes.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        Ok(vehicle)
    }

    /// Único camino para cambiar el estado: actualiza el vehículo y añade
    /// una entrada al historial en la misma transacción.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        notes: Option<String>,
        changed_by: Option<Uuid>,
    ) -> Result<(Vehicle, VehicleStatusHistory), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let (from_status,): (String,) =
            sqlx::query_as("SELECT current_status FROM vehicles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        if from_status == status.as_str() {
            return Err(AppError::BadRequest(format!(
                "Vehicle is already in status '{}'",
                status
            )));
        }

        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET current_status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let entry = sqlx::query_as::<_, VehicleStatusHistory>(
            r#"
            INSERT INTO vehicle_status_history (id, vehicle_id, from_status, to_status, notes, changed_by, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(from_status)
        .bind(status.as_str())
        .bind(notes)
        .bind(changed_by)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((vehicle, entry))
    }

    pub async fn history(&self, vehicle_id: Uuid) -> Result<Vec<VehicleStatusHistory>, AppError> {
        let entries = sqlx::query_as::<_, VehicleStatusHistory>(
            "SELECT * FROM vehicle_status_history WHERE vehicle_id = $1 ORDER BY changed_at ASC, id ASC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }

    /// Conteo por estado crudo (incluye valores fuera de la taxonomía)
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, AppError> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT current_status, COUNT(*) AS count FROM vehicles GROUP BY current_status ORDER BY current_status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Suma de precios de venta excluyendo los estados indicados
    pub async fn inventory_value(
        &self,
        excluded_statuses: Vec<String>,
    ) -> Result<Decimal, AppError> {
        let (value,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(listing_price), 0) FROM vehicles WHERE NOT (current_status = ANY($1))",
        )
        .bind(excluded_statuses)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }
}
