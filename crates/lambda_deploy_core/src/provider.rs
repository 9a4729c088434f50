//! Contract between the deployment pipeline and a function-as-a-service
//! backend.
//!
//! Requests and responses mirror the Lambda control and data plane shapes the
//! pipeline needs. Implementations report failures as [`ProviderError`] so the
//! pipeline never sees SDK types.

use serde::{Deserialize, Serialize};

pub use crate::error::{ProviderError, ProviderErrorKind};

pub const LATEST_VERSION: &str = "$LATEST";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    RequestResponse,
    Event,
    DryRun,
}

impl InvocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestResponse => "RequestResponse",
            Self::Event => "Event",
            Self::DryRun => "DryRun",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    None,
    Tail,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Tail => "Tail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFunctionRequest {
    pub function_name: String,
    pub runtime: String,
    pub role: String,
    pub handler: String,
    pub zip_file: Vec<u8>,
    pub timeout_seconds: i32,
    pub memory_size_mb: i32,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfiguration {
    pub function_name: String,
    pub function_arn: String,
    pub runtime: String,
    pub role: String,
    pub handler: String,
    pub timeout_seconds: i32,
    pub memory_size_mb: i32,
    pub code_sha256: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub function_name: String,
    pub invocation_type: InvocationType,
    pub log_type: LogType,
}

impl InvokeRequest {
    /// Synchronous invocation with the log tail requested.
    pub fn request_response(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            invocation_type: InvocationType::RequestResponse,
            log_type: LogType::Tail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutput {
    pub status_code: i32,
    pub payload: Vec<u8>,
    /// `Handled` or `Unhandled` when the function itself failed.
    pub function_error: Option<String>,
    /// Base64-encoded tail of the execution log.
    pub log_result: Option<String>,
    pub executed_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedVersion {
    pub function_name: String,
    pub version: String,
    pub function_arn: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAliasRequest {
    pub function_name: String,
    pub alias_name: String,
    pub function_version: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfiguration {
    pub name: String,
    pub alias_arn: String,
    pub function_version: String,
    pub description: Option<String>,
}

pub trait FunctionProvider {
    fn create_function(
        &self,
        request: &CreateFunctionRequest,
    ) -> Result<FunctionConfiguration, ProviderError>;

    fn invoke(&self, request: &InvokeRequest) -> Result<InvocationOutput, ProviderError>;

    fn publish_version(
        &self,
        function_name: &str,
        description: &str,
    ) -> Result<PublishedVersion, ProviderError>;

    fn create_alias(&self, request: &CreateAliasRequest)
        -> Result<AliasConfiguration, ProviderError>;

    fn get_alias(
        &self,
        function_name: &str,
        alias_name: &str,
    ) -> Result<AliasConfiguration, ProviderError>;
}
