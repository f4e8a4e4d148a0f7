pub mod api_response;
pub mod customer_dto;
pub mod inquiry_dto;
pub mod invoice_dto;
pub mod vehicle_dto;
