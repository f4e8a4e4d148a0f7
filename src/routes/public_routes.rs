//! API pública (web de la concesionaria), sin autenticación

use axum::{
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::dashboard_controller::DashboardController;
use crate::controllers::inquiry_controller::InquiryController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_response::ApiResponse;
use crate::dto::inquiry_dto::{InquiryReceipt, SubmitInquiryRequest};
use crate::dto::vehicle_dto::{PublicVehicleQuery, PublicVehicleResponse};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::dashboard::PublicInventorySummary;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;
use crate::utils::vehicle_status::StatusClassification;

pub fn create_public_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_public_vehicles))
        .route("/vehicles/:id", get(get_public_vehicle))
        .route("/vehicle-statuses", get(vehicle_statuses))
        .route("/inventory-summary", get(inventory_summary))
        .route(
            "/inquiries",
            post(submit_inquiry).route_layer(from_fn_with_state(state, rate_limit_middleware)),
        )
}

async fn list_public_vehicles(
    State(state): State<AppState>,
    Query(query): Query<PublicVehicleQuery>,
) -> Result<Json<Paginated<PublicVehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list_public(query).await?;
    Ok(Json(response))
}

async fn get_public_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicVehicleResponse>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get_public(id).await?;
    Ok(Json(response))
}

async fn vehicle_statuses() -> Json<Vec<StatusClassification>> {
    Json(VehicleController::status_catalog())
}

async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<Json<PublicInventorySummary>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    let response = controller.public_summary().await?;
    Ok(Json(response))
}

async fn submit_inquiry(
    State(state): State<AppState>,
    Json(request): Json<SubmitInquiryRequest>,
) -> Result<Json<ApiResponse<InquiryReceipt>>, AppError> {
    let controller = InquiryController::new(state.pool.clone());
    let response = controller.submit(request).await?;
    Ok(Json(response))
}
