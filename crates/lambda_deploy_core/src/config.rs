use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE_FILE: &str = "lambda_function.py";
pub const DEFAULT_ARCHIVE_FILE_NAME: &str = "lambda_function.zip";
pub const DEFAULT_FUNCTION_NAME: &str = "MyLambdaFunction";
pub const DEFAULT_RUNTIME: &str = "python3.8";
pub const DEFAULT_ROLE_ARN: &str = "arn:aws:iam::your-account-id:role/your-lambda-role";
pub const DEFAULT_HANDLER: &str = "lambda_function.lambda_handler";
pub const DEFAULT_TIMEOUT_SECONDS: i32 = 10;
pub const DEFAULT_MEMORY_SIZE_MB: i32 = 128;
pub const DEFAULT_VERSION_DESCRIPTION: &str = "Version 1";
pub const DEFAULT_ALIAS_NAME: &str = "prod";

/// Settings for the function resource created by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionSpec {
    pub function_name: String,
    pub runtime: String,
    pub role: String,
    pub handler: String,
    pub timeout_seconds: i32,
    pub memory_size_mb: i32,
    /// Publish version 1 as part of creation.
    pub publish: bool,
}

impl Default for FunctionSpec {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            role: DEFAULT_ROLE_ARN.to_string(),
            handler: DEFAULT_HANDLER.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            memory_size_mb: DEFAULT_MEMORY_SIZE_MB,
            publish: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub source_path: PathBuf,
    pub archive_path: PathBuf,
    pub function: FunctionSpec,
    pub version_description: String,
    pub alias_name: String,
    /// Keep going when the invocation reports a function-level error.
    pub allow_function_errors: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_FILE),
            archive_path: default_archive_path(),
            function: FunctionSpec::default(),
            version_description: DEFAULT_VERSION_DESCRIPTION.to_string(),
            alias_name: DEFAULT_ALIAS_NAME.to_string(),
            allow_function_errors: false,
        }
    }
}

pub fn default_archive_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_ARCHIVE_FILE_NAME)
}
