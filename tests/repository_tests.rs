//! Tests contra PostgreSQL real
//!
//! `#[sqlx::test]` crea una base de datos limpia por test y aplica las
//! migraciones; requiere `DATABASE_URL` apuntando a un servidor accesible.

use axum::{http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use dealership_backoffice::controllers::dashboard_controller::DashboardController;
use dealership_backoffice::controllers::vehicle_controller::VehicleController;
use dealership_backoffice::dto::vehicle_dto::PublicVehicleQuery;
use dealership_backoffice::models::invoice::{compute_totals, InvoiceStatus, PaymentMethod};
use dealership_backoffice::models::vehicle::{Vehicle, VehicleStatus};
use dealership_backoffice::repositories::customer_repository::NewCustomer;
use dealership_backoffice::repositories::invoice_repository::{
    NewInvoice, NewInvoiceItem, NewPayment,
};
use dealership_backoffice::repositories::vehicle_repository::NewVehicle;
use dealership_backoffice::repositories::{CustomerRepository, InvoiceRepository, VehicleRepository};
use dealership_backoffice::utils::errors::AppError;
use dealership_backoffice::utils::vehicle_status::{BadgeCategory, StatusGroup};

fn new_vehicle(stock_number: &str, status: VehicleStatus) -> NewVehicle {
    NewVehicle {
        stock_number: stock_number.to_string(),
        vin: None,
        make: "Toyota".to_string(),
        model: "Land Cruiser".to_string(),
        year: 2019,
        trim: None,
        color: Some("White".to_string()),
        mileage: 42_000,
        purchase_price: Some(Decimal::new(2_100_000, 2)),
        listing_price: Some(Decimal::new(2_890_000, 2)),
        status,
        location: None,
        description: None,
    }
}

async fn seed_vehicle(pool: &PgPool, stock_number: &str, status: VehicleStatus) -> Vehicle {
    VehicleRepository::new(pool.clone())
        .create(new_vehicle(stock_number, status), None)
        .await
        .unwrap()
}

async fn seed_invoice(pool: &PgPool, status: InvoiceStatus, total: Decimal) -> Uuid {
    let customer = CustomerRepository::new(pool.clone())
        .create(NewCustomer {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            phone: None,
            address: None,
            notes: None,
        })
        .await
        .unwrap();

    let totals = compute_totals(vec![(1, total)], Decimal::ZERO).unwrap();
    let (invoice, _) = InvoiceRepository::new(pool.clone())
        .create(NewInvoice {
            customer_id: customer.id,
            vehicle_id: None,
            status,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: None,
            tax_rate: Decimal::ZERO,
            items: vec![NewInvoiceItem {
                description: "Vehicle sale".to_string(),
                quantity: 1,
                unit_price: total,
                line_total: totals.line_totals[0],
            }],
            totals,
            notes: None,
        })
        .await
        .unwrap();

    invoice.id
}

fn payment(amount: i64) -> NewPayment {
    NewPayment {
        amount: Decimal::from(amount),
        method: PaymentMethod::BankTransfer,
        reference: None,
        paid_at: Utc::now(),
        notes: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_writes_initial_history(pool: PgPool) {
    let vehicle = seed_vehicle(&pool, "STK-1001", VehicleStatus::AuctionWon).await;

    let history = VehicleRepository::new(pool).history(vehicle.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_status, None);
    assert_eq!(history[0].to_status, "auction_won");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_status_appends_one_history_entry(pool: PgPool) {
    let repository = VehicleRepository::new(pool.clone());
    let vehicle = seed_vehicle(&pool, "STK-1002", VehicleStatus::AuctionWon).await;
    let staff = Uuid::new_v4();

    let notes = Some("On vessel".to_string());
    let (updated, entry) = repository
        .update_status(vehicle.id, VehicleStatus::Shipped, notes, Some(staff))
        .await
        .unwrap();
    assert_eq!(updated.current_status, "shipped");
    assert_eq!(entry.from_status.as_deref(), Some("auction_won"));
    assert_eq!(entry.to_status, "shipped");
    assert_eq!(entry.changed_by, Some(staff));

    let history = repository.history(vehicle.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].to_status, "shipped");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_status_rejects_same_status(pool: PgPool) {
    let repository = VehicleRepository::new(pool.clone());
    let vehicle = seed_vehicle(&pool, "STK-1003", VehicleStatus::AtYard).await;

    let error = repository
        .update_status(vehicle.id, VehicleStatus::AtYard, None, None)
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::BadRequest(_)));
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

    // Sin entrada nueva en el historial
    assert_eq!(repository.history(vehicle.id).await.unwrap().len(), 1);

    let missing = repository
        .update_status(Uuid::new_v4(), VehicleStatus::Sold, None, None)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_public_views_exclude_hidden_and_drifted(pool: PgPool) {
    seed_vehicle(&pool, "STK-A", VehicleStatus::Shipped).await;
    seed_vehicle(&pool, "STK-B", VehicleStatus::AtYard).await;
    seed_vehicle(&pool, "STK-C", VehicleStatus::Reserved).await;
    let sold = seed_vehicle(&pool, "STK-D", VehicleStatus::Sold).await;
    seed_vehicle(&pool, "STK-E", VehicleStatus::Delivered).await;
    let drifted = seed_vehicle(&pool, "STK-F", VehicleStatus::AtYard).await;
    sqlx::query("UPDATE vehicles SET current_status = 'repossessed' WHERE id = $1")
        .bind(drifted.id)
        .execute(&pool)
        .await
        .unwrap();

    let controller = VehicleController::new(pool.clone());

    let page = controller.list_public(PublicVehicleQuery::default()).await.unwrap();
    let mut stock_numbers: Vec<_> = page.data.iter().map(|v| v.stock_number.clone()).collect();
    stock_numbers.sort();
    assert_eq!(stock_numbers, vec!["STK-A", "STK-B", "STK-C"]);
    assert_eq!(page.pagination.total, 3);

    let arrived = controller
        .list_public(PublicVehicleQuery {
            group: Some("arrived".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(arrived.pagination.total, 1);
    assert_eq!(arrived.data[0].group, StatusGroup::Arrived);

    assert!(matches!(controller.get_public(sold.id).await, Err(AppError::NotFound(_))));
    let drifted_view = controller.get_public(drifted.id).await.unwrap();
    assert_eq!(drifted_view.badge, BadgeCategory::Unknown);

    let dashboard = DashboardController::new(pool);
    let summary = dashboard.public_summary().await.unwrap();
    assert_eq!(summary.all, 3);
    assert_eq!(summary.arrived, 1);
    assert_eq!(summary.arriving_soon, 1);

    let admin = dashboard.summary().await.unwrap();
    assert_eq!(admin.inventory.total, 6);
    assert_eq!(admin.inventory.hidden, 2);
    assert_eq!(admin.inventory.unknown, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payments_move_invoice_to_paid(pool: PgPool) {
    let repository = InvoiceRepository::new(pool.clone());
    let id = seed_invoice(&pool, InvoiceStatus::Issued, Decimal::from(1000)).await;

    let (_, invoice) = repository.record_payment(id, payment(400), None).await.unwrap();
    assert_eq!(invoice.status(), InvoiceStatus::PartiallyPaid);
    assert_eq!(invoice.amount_paid, Decimal::from(400));

    // Supera el saldo pendiente de 600
    let overpaid = repository.record_payment(id, payment(700), None).await;
    assert!(matches!(overpaid, Err(AppError::Conflict(_))));

    let (_, invoice) = repository.record_payment(id, payment(600), None).await.unwrap();
    assert_eq!(invoice.status(), InvoiceStatus::Paid);
    assert_eq!(invoice.balance_due(), Decimal::ZERO);

    let after_paid = repository.record_payment(id, payment(1), None).await;
    assert!(matches!(after_paid, Err(AppError::Conflict(_))));

    assert_eq!(repository.payments(id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_draft_invoice_rejects_payments(pool: PgPool) {
    let repository = InvoiceRepository::new(pool.clone());
    let id = seed_invoice(&pool, InvoiceStatus::Draft, Decimal::from(500)).await;

    let result = repository.record_payment(id, payment(100), None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(!repository.has_payments(id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_draft_only(pool: PgPool) {
    let repository = InvoiceRepository::new(pool.clone());
    let draft = seed_invoice(&pool, InvoiceStatus::Draft, Decimal::from(250)).await;
    let issued = seed_invoice(&pool, InvoiceStatus::Issued, Decimal::from(250)).await;

    repository.delete_draft(draft).await.unwrap();
    assert!(repository.find_by_id(draft).await.unwrap().is_none());
    assert!(repository.items(draft).await.unwrap().is_empty());

    assert!(matches!(repository.delete_draft(issued).await, Err(AppError::Conflict(_))));
    assert!(repository.find_by_id(issued).await.unwrap().is_some());

    assert!(matches!(
        repository.delete_draft(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invoice_transitions(pool: PgPool) {
    let repository = InvoiceRepository::new(pool.clone());
    let id = seed_invoice(&pool, InvoiceStatus::Draft, Decimal::from(300)).await;

    let issued = repository
        .transition(id, &[InvoiceStatus::Draft], InvoiceStatus::Issued)
        .await
        .unwrap();
    assert_eq!(issued.status(), InvoiceStatus::Issued);

    // Emitir dos veces es un conflicto
    let again = repository
        .transition(id, &[InvoiceStatus::Draft], InvoiceStatus::Issued)
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}
