pub mod customer_routes;
pub mod dashboard_routes;
pub mod inquiry_routes;
pub mod invoice_routes;
pub mod public_routes;
pub mod vehicle_routes;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::auth::{auth_middleware, back_office_middleware};
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    // Back-office: JWT primero, después el control de rol
    let admin = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/inquiries", inquiry_routes::create_inquiry_router())
        .nest("/invoices", invoice_routes::create_invoice_router())
        .nest("/dashboard", dashboard_routes::create_dashboard_router())
        .route_layer(from_fn(back_office_middleware))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/public", public_routes::create_public_router(state.clone()))
        .nest("/api/admin", admin)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
