pub mod customer_repository;
pub mod inquiry_repository;
pub mod invoice_repository;
pub mod vehicle_repository;

pub use customer_repository::CustomerRepository;
pub use inquiry_repository::InquiryRepository;
pub use invoice_repository::InvoiceRepository;
pub use vehicle_repository::VehicleRepository;
