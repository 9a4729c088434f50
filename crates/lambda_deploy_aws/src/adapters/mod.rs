pub mod error_mapping;
pub mod lambda_client;
