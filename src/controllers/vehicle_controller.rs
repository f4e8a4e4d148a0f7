use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, PublicVehicleQuery, PublicVehicleResponse, StatusHistoryResponse,
    UpdateVehicleRequest, UpdateVehicleStatusRequest, VehicleQuery, VehicleResponse,
    VehicleStatusChangeResponse,
};
use crate::models::user::AuthenticatedUser;
use crate::models::vehicle::VehicleStatus;
use crate::repositories::vehicle_repository::{
    NewVehicle, VehicleChanges, VehicleListFilter, VehicleRepository, VehicleSort,
};
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppError};
use crate::utils::pagination::{search_term, Paginated, Pagination};
use crate::utils::validation::{
    field_error, normalize_optional, parse_date_bound, validate_date_order, validate_model_year,
    validate_money, validate_non_negative,
};
use crate::utils::vehicle_status::{
    classify_raw, status_catalog, status_values_for_group, StatusClassification, StatusGroup,
};

/// Grupo opcional del query string; un valor desconocido es un 400
fn parse_group(value: Option<&str>) -> Result<Option<StatusGroup>, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<StatusGroup>().map_err(AppError::BadRequest))
        .transpose()
}

/// Lista de estados exactos separada por comas (parseo estricto)
fn parse_status_list(value: &str) -> Result<Vec<String>, AppError> {
    let statuses = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<VehicleStatus>()
                .map(|status| status.as_str().to_string())
                .map_err(|e| AppError::BadRequest(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if statuses.is_empty() {
        return Err(AppError::BadRequest("status filter is empty".to_string()));
    }
    Ok(statuses)
}

fn validate_price(field: &'static str, value: Option<Decimal>) -> Result<(), AppError> {
    match value {
        Some(price) => validate_money(price).map_err(|e| field_error(field, e)),
        None => Ok(()),
    }
}

/// Stock number sin espacios alrededor; vacío es un error de validación
fn normalize_stock_number(value: &str) -> Result<String, AppError> {
    let stock_number = value.trim();
    if stock_number.is_empty() {
        return Err(validation_error("stock_number", "must not be blank"));
    }
    Ok(stock_number.to_string())
}

/// Rangos comunes a los listados público y de administración
fn validate_ranges(
    year_from: Option<i32>,
    year_to: Option<i32>,
    price_min: Option<Decimal>,
    price_max: Option<Decimal>,
) -> Result<(), AppError> {
    validate_date_order(year_from.as_ref(), year_to.as_ref())
        .map_err(|e| field_error("year_from", e))?;
    for (field, bound) in [("price_min", price_min), ("price_max", price_max)] {
        if let Some(price) = bound {
            validate_non_negative(price).map_err(|e| field_error(field, e))?;
        }
    }
    validate_date_order(price_min.as_ref(), price_max.as_ref())
        .map_err(|e| field_error("price_min", e))?;
    Ok(())
}

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        validate_model_year(request.year).map_err(|e| field_error("year", e))?;
        validate_price("purchase_price", request.purchase_price)?;
        validate_price("listing_price", request.listing_price)?;

        let stock_number = normalize_stock_number(&request.stock_number)?;
        let vin = normalize_optional(request.vin).map(|v| v.to_ascii_uppercase());

        // Verificar unicidad de stock number y VIN
        if self.repository.stock_number_exists(&stock_number, None).await? {
            return Err(conflict_error("Vehicle", "stock_number", &stock_number));
        }
        if let Some(vin) = &vin {
            if self.repository.vin_exists(vin, None).await? {
                return Err(conflict_error("Vehicle", "vin", vin));
            }
        }

        let vehicle = self
            .repository
            .create(
                NewVehicle {
                    stock_number,
                    vin,
                    make: request.make.trim().to_string(),
                    model: request.model.trim().to_string(),
                    year: request.year,
                    trim: normalize_optional(request.trim),
                    color: normalize_optional(request.color),
                    mileage: request.mileage.unwrap_or(0),
                    purchase_price: request.purchase_price,
                    listing_price: request.listing_price,
                    status: request.initial_status.unwrap_or_default(),
                    location: normalize_optional(request.location),
                    description: normalize_optional(request.description),
                },
                Some(user.user_id),
            )
            .await?;

        info!("🚗 Vehículo creado: {} ({})", vehicle.stock_number, vehicle.current_status);

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle created",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self, query: VehicleQuery) -> Result<Paginated<VehicleResponse>, AppError> {
        validate_ranges(query.year_from, query.year_to, query.price_min, query.price_max)?;

        // Lista explícita de estados > grupo > sin filtro
        let statuses = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(list) => Some(parse_status_list(list)?),
            None => parse_group(query.group.as_deref())?.map(status_values_for_group),
        };

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

        let filter = VehicleListFilter {
            search: search_term(query.search.as_deref()),
            statuses,
            make: normalize_optional(query.make),
            year_from: query.year_from,
            year_to: query.year_to,
            price_min: query.price_min,
            price_max: query.price_max,
            created_after,
            created_before,
            sort: VehicleSort::parse(query.sort.as_deref()),
        };

        let page = self
            .repository
            .list(&filter, Pagination::new(query.page, query.page_size))
            .await?;

        Ok(page.map(VehicleResponse::from))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        if let Some(year) = request.year {
            validate_model_year(year).map_err(|e| field_error("year", e))?;
        }
        validate_price("purchase_price", request.purchase_price)?;
        validate_price("listing_price", request.listing_price)?;

        let stock_number = request
            .stock_number
            .as_deref()
            .map(normalize_stock_number)
            .transpose()?;
        let vin = normalize_optional(request.vin).map(|v| v.to_ascii_uppercase());

        if let Some(stock_number) = &stock_number {
            if self.repository.stock_number_exists(stock_number, Some(id)).await? {
                return Err(conflict_error("Vehicle", "stock_number", stock_number));
            }
        }
        if let Some(vin) = &vin {
            if self.repository.vin_exists(vin, Some(id)).await? {
                return Err(conflict_error("Vehicle", "vin", vin));
            }
        }

        let vehicle = self
            .repository
            .update(
                id,
                VehicleChanges {
                    stock_number,
                    vin,
                    make: normalize_optional(request.make),
                    model: normalize_optional(request.model),
                    year: request.year,
                    trim: normalize_optional(request.trim),
                    color: normalize_optional(request.color),
                    mileage: request.mileage,
                    purchase_price: request.purchase_price,
                    listing_price: request.listing_price,
                    location: normalize_optional(request.location),
                    description: normalize_optional(request.description),
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle updated",
        ))
    }

    pub async fn update_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleStatusRequest,
    ) -> Result<ApiResponse<VehicleStatusChangeResponse>, AppError> {
        request.validate()?;

        let (vehicle, entry) = self
            .repository
            .update_status(
                id,
                request.status,
                normalize_optional(request.notes),
                Some(user.user_id),
            )
            .await?;

        info!(
            "🔄 Vehículo {}: {} → {}",
            vehicle.stock_number,
            entry.from_status.as_deref().unwrap_or("-"),
            entry.to_status
        );

        Ok(ApiResponse::success_with_message(
            VehicleStatusChangeResponse {
                vehicle: VehicleResponse::from(vehicle),
                history_entry: StatusHistoryResponse::from(entry),
            },
            "Vehicle status updated",
        ))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<StatusHistoryResponse>, AppError> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }

        let entries = self.repository.history(id).await?;
        Ok(entries.into_iter().map(StatusHistoryResponse::from).collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        info!("🗑️ Vehículo eliminado: {}", id);
        Ok(())
    }

    // --- Web pública ---

    /// Listado público: siempre limitado a los estados visibles del grupo
    pub async fn list_public(
        &self,
        query: PublicVehicleQuery,
    ) -> Result<Paginated<PublicVehicleResponse>, AppError> {
        validate_ranges(query.year_from, query.year_to, query.price_min, query.price_max)?;
        let group = parse_group(query.group.as_deref())?.unwrap_or_default();

        let filter = VehicleListFilter {
            search: search_term(query.search.as_deref()),
            statuses: Some(status_values_for_group(group)),
            make: normalize_optional(query.make),
            year_from: query.year_from,
            year_to: query.year_to,
            price_min: query.price_min,
            price_max: query.price_max,
            created_after: None,
            created_before: None,
            sort: VehicleSort::parse(query.sort.as_deref()),
        };

        let page = self
            .repository
            .list(&filter, Pagination::new(query.page, query.page_size))
            .await?;

        Ok(page.map(PublicVehicleResponse::from))
    }

    /// Ficha pública; los vehículos ocultos responden 404
    pub async fn get_public(&self, id: Uuid) -> Result<PublicVehicleResponse, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .filter(|v| classify_raw(&v.current_status).is_public)
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(PublicVehicleResponse::from(vehicle))
    }

    pub fn status_catalog() -> Vec<StatusClassification> {
        status_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group(None).unwrap(), None);
        assert_eq!(parse_group(Some("  ")).unwrap(), None);
        assert_eq!(parse_group(Some("arrived")).unwrap(), Some(StatusGroup::Arrived));
        assert!(matches!(parse_group(Some("sold")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_parse_status_list_is_strict() {
        assert_eq!(
            parse_status_list("at_yard, shipped").unwrap(),
            vec!["at_yard".to_string(), "shipped".to_string()]
        );
        assert!(matches!(parse_status_list("at_yard,unknown"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_status_list(" , "), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_blank_stock_number_is_rejected() {
        assert_eq!(normalize_stock_number("  STK-1042 ").unwrap(), "STK-1042");
        assert!(matches!(normalize_stock_number("   "), Err(AppError::Validation(_))));

        // Un update con stock number en blanco pasa el derive pero no la normalización
        let request = UpdateVehicleRequest {
            stock_number: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
        assert!(matches!(
            request.stock_number.as_deref().map(normalize_stock_number).transpose(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_stored_prices_must_fit_money_columns() {
        assert!(validate_price("listing_price", Some(Decimal::new(1_899_900, 2))).is_ok());
        assert!(validate_price("listing_price", Some(Decimal::MAX)).is_err());
        assert!(validate_price("listing_price", Some(Decimal::new(19_999, 3))).is_err());
        assert!(validate_price("listing_price", None).is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate_ranges(Some(2015), Some(2020), None, None).is_ok());
        assert!(matches!(
            validate_ranges(Some(2021), Some(2020), None, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_ranges(None, None, Some(Decimal::from(-1)), None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_ranges(None, None, Some(Decimal::from(5000)), Some(Decimal::from(1000))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_status_catalog_lists_every_status() {
        assert_eq!(VehicleController::status_catalog().len(), VehicleStatus::ALL.len());
    }
}
