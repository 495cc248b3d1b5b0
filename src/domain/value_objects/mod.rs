pub mod album_accounts;
pub mod album_service_errors;
pub mod enums;
pub mod upload_request;
pub mod upload_result;
