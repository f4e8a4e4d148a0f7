use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::invoice_controller::InvoiceController;
use crate::dto::api_response::ApiResponse;
use crate::dto::invoice_dto::{
    CreateInvoiceRequest, InvoiceDetailResponse, InvoiceQuery, InvoiceSummaryResponse,
    PaymentRecordedResponse, RecordPaymentRequest,
};
use crate::middleware::auth::require_admin;
use crate::models::user::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_invoice_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice).delete(delete_invoice))
        .route("/:id/issue", post(issue_invoice))
        .route("/:id/void", post(void_invoice))
        .route("/:id/payments", post(record_payment))
}

async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<ApiResponse<InvoiceDetailResponse>>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<Paginated<InvoiceSummaryResponse>>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.list(query).await?;
    Ok(Json(response))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetailResponse>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn issue_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceSummaryResponse>>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.issue(id).await?;
    Ok(Json(response))
}

async fn void_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceSummaryResponse>>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.void(id).await?;
    Ok(Json(response))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<ApiResponse<PaymentRecordedResponse>>, AppError> {
    let controller = InvoiceController::new(state.pool.clone());
    let response = controller.record_payment(&user, id, request).await?;
    Ok(Json(response))
}

async fn delete_invoice(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&user, "delete invoice")?;
    let controller = InvoiceController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Invoice deleted")))
}
