use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::models::dashboard::{
    DashboardSummary, InventoryBreakdown, PublicInventorySummary, SalesMetrics,
};
use crate::models::inquiry::InquiryStatus;
use crate::models::invoice::InvoiceStatus;
use crate::repositories::inquiry_repository::InquiryRepository;
use crate::repositories::invoice_repository::InvoiceRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::vehicle_status::hidden_status_values;

/// Primer instante del mes de `now` (UTC)
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now)
}

pub struct DashboardController {
    vehicles: VehicleRepository,
    inquiries: InquiryRepository,
    invoices: InvoiceRepository,
}

impl DashboardController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            inquiries: InquiryRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool),
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let now = Utc::now();

        let inventory = InventoryBreakdown::from_counts(&self.vehicles.status_counts().await?);
        let sales = SalesMetrics {
            inventory_value: self.vehicles.inventory_value(hidden_status_values()).await?,
            open_inquiries: self.inquiries.count_with_statuses(&InquiryStatus::OPEN).await?,
            new_inquiries_last_7_days: self
                .inquiries
                .count_created_since(now - Duration::days(7))
                .await?,
            outstanding_balance: self
                .invoices
                .outstanding_balance(&[InvoiceStatus::Issued, InvoiceStatus::PartiallyPaid])
                .await?,
            revenue_this_month: self.invoices.revenue_since(month_start(now)).await?,
        };

        debug!(
            "📊 Dashboard: {} vehículos, {} desconocidos",
            inventory.total, inventory.unknown
        );

        Ok(DashboardSummary {
            public_inventory: PublicInventorySummary::from(&inventory),
            inventory,
            sales,
        })
    }

    /// Conteos de las pestañas de la web pública
    pub async fn public_summary(&self) -> Result<PublicInventorySummary, AppError> {
        let inventory = InventoryBreakdown::from_counts(&self.vehicles.status_counts().await?);
        Ok(PublicInventorySummary::from(&inventory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 14, 30, 5).unwrap();
        assert_eq!(month_start(now), Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());

        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start(first), first);
    }
}
