pub mod customer_controller;
pub mod dashboard_controller;
pub mod inquiry_controller;
pub mod invoice_controller;
pub mod vehicle_controller;
