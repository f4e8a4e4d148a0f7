use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::inquiry_controller::InquiryController;
use crate::dto::api_response::ApiResponse;
use crate::dto::inquiry_dto::{InquiryQuery, InquiryResponse, UpdateInquiryRequest};
use crate::middleware::auth::require_admin;
use crate::models::user::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

/// Gestión de consultas; el alta va por la API pública
pub fn create_inquiry_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inquiries))
        .route(
            "/:id",
            get(get_inquiry).patch(update_inquiry).delete(delete_inquiry),
        )
}

async fn list_inquiries(
    State(state): State<AppState>,
    Query(query): Query<InquiryQuery>,
) -> Result<Json<Paginated<InquiryResponse>>, AppError> {
    let controller = InquiryController::new(state.pool.clone());
    let response = controller.list(query).await?;
    Ok(Json(response))
}

async fn get_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InquiryResponse>, AppError> {
    let controller = InquiryController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInquiryRequest>,
) -> Result<Json<ApiResponse<InquiryResponse>>, AppError> {
    let controller = InquiryController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_inquiry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&user, "delete inquiry")?;
    let controller = InquiryController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Inquiry deleted")))
}
