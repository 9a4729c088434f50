//! Stateful in-memory function provider.
//!
//! Models the subset of Lambda semantics the pipeline relies on: unique
//! function names, monotonically numbered versions, publish returning the
//! existing version when the code is unchanged, and aliases bound to published
//! versions. Identifiers are deterministic so repeated runs compare equal.

use std::collections::BTreeMap;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::archive::sha256_hex;
use crate::provider::{
    AliasConfiguration, CreateAliasRequest, CreateFunctionRequest, FunctionConfiguration,
    FunctionProvider, InvocationOutput, InvocationType, InvokeRequest, LogType, ProviderError,
    PublishedVersion, LATEST_VERSION,
};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";
pub const DEFAULT_PAYLOAD: &str = r#"{"statusCode": 200, "body": "\"Hello from Lambda!\""}"#;

const SUPPORTED_RUNTIMES: &[&str] = &[
    "python3.8",
    "python3.9",
    "python3.10",
    "python3.11",
    "python3.12",
    "nodejs18.x",
    "nodejs20.x",
    "java17",
    "java21",
    "provided.al2",
    "provided.al2023",
];

#[derive(Debug, Clone)]
struct StoredVersion {
    version: u64,
    code_sha256: String,
    description: String,
}

#[derive(Debug, Clone)]
struct StoredFunction {
    configuration: FunctionConfiguration,
    versions: Vec<StoredVersion>,
    aliases: BTreeMap<String, AliasConfiguration>,
}

#[derive(Debug, Default)]
struct ProviderState {
    functions: BTreeMap<String, StoredFunction>,
    invocation_count: u64,
}

#[derive(Debug)]
pub struct InMemoryFunctionProvider {
    region: String,
    account_id: String,
    payload: Vec<u8>,
    function_error: Option<String>,
    state: Mutex<ProviderState>,
}

impl Default for InMemoryFunctionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFunctionProvider {
    pub fn new() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            payload: DEFAULT_PAYLOAD.as_bytes().to_vec(),
            function_error: None,
            state: Mutex::new(ProviderState::default()),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Payload returned by every invocation.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Makes every invocation report a function-level error of `kind`.
    pub fn with_function_error(mut self, kind: impl Into<String>) -> Self {
        self.function_error = Some(kind.into());
        self
    }

    pub fn function_count(&self) -> usize {
        self.lock().functions.len()
    }

    pub fn invocation_count(&self) -> u64 {
        self.lock().invocation_count
    }

    pub fn published_versions(&self, function_name: &str) -> Vec<String> {
        self.lock()
            .functions
            .get(function_name)
            .map(|function| {
                function
                    .versions
                    .iter()
                    .map(|stored| stored.version.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        self.state.lock().expect("poisoned mutex")
    }

    fn function_arn(&self, function_name: &str) -> String {
        format!(
            "arn:aws:lambda:{}:{}:function:{function_name}",
            self.region, self.account_id
        )
    }

    fn not_found(&self, function_name: &str) -> ProviderError {
        ProviderError::not_found(format!(
            "Function not found: {}",
            self.function_arn(function_name)
        ))
    }
}

impl FunctionProvider for InMemoryFunctionProvider {
    fn create_function(
        &self,
        request: &CreateFunctionRequest,
    ) -> Result<FunctionConfiguration, ProviderError> {
        if !SUPPORTED_RUNTIMES.contains(&request.runtime.as_str()) {
            return Err(ProviderError::invalid_parameter(format!(
                "The runtime parameter of {} is not supported",
                request.runtime
            )));
        }
        if !request.role.starts_with("arn:aws:iam::") || !request.role.contains(":role/") {
            return Err(ProviderError::invalid_parameter(format!(
                "The role defined for the function cannot be assumed by Lambda: {}",
                request.role
            )));
        }

        let mut state = self.lock();
        if state.functions.contains_key(&request.function_name) {
            return Err(ProviderError::already_exists(format!(
                "Function already exist: {}",
                request.function_name
            )));
        }

        let code_sha256 = sha256_hex(&request.zip_file);
        let configuration = FunctionConfiguration {
            function_name: request.function_name.clone(),
            function_arn: self.function_arn(&request.function_name),
            runtime: request.runtime.clone(),
            role: request.role.clone(),
            handler: request.handler.clone(),
            timeout_seconds: request.timeout_seconds,
            memory_size_mb: request.memory_size_mb,
            code_sha256: Some(code_sha256.clone()),
            version: LATEST_VERSION.to_string(),
        };

        let versions = if request.publish {
            vec![StoredVersion {
                version: 1,
                code_sha256,
                description: String::new(),
            }]
        } else {
            Vec::new()
        };

        state.functions.insert(
            request.function_name.clone(),
            StoredFunction {
                configuration: configuration.clone(),
                versions,
                aliases: BTreeMap::new(),
            },
        );
        Ok(configuration)
    }

    fn invoke(&self, request: &InvokeRequest) -> Result<InvocationOutput, ProviderError> {
        let mut state = self.lock();
        if !state.functions.contains_key(&request.function_name) {
            return Err(self.not_found(&request.function_name));
        }
        state.invocation_count += 1;
        let request_id = format!("00000000-0000-0000-0000-{:012}", state.invocation_count);

        let log_result = match request.log_type {
            LogType::Tail => Some(STANDARD.encode(format!(
                "START RequestId: {request_id} Version: {LATEST_VERSION}\n\
                 END RequestId: {request_id}\n\
                 REPORT RequestId: {request_id}\tDuration: 1.00 ms\n"
            ))),
            LogType::None => None,
        };

        let output = match request.invocation_type {
            InvocationType::RequestResponse => InvocationOutput {
                status_code: 200,
                payload: self.payload.clone(),
                function_error: self.function_error.clone(),
                log_result,
                executed_version: Some(LATEST_VERSION.to_string()),
            },
            InvocationType::Event => InvocationOutput {
                status_code: 202,
                payload: Vec::new(),
                function_error: None,
                log_result: None,
                executed_version: None,
            },
            InvocationType::DryRun => InvocationOutput {
                status_code: 204,
                payload: Vec::new(),
                function_error: None,
                log_result: None,
                executed_version: None,
            },
        };
        Ok(output)
    }

    fn publish_version(
        &self,
        function_name: &str,
        description: &str,
    ) -> Result<PublishedVersion, ProviderError> {
        let mut state = self.lock();
        let Some(function) = state.functions.get_mut(function_name) else {
            return Err(self.not_found(function_name));
        };

        let current_sha = function
            .configuration
            .code_sha256
            .clone()
            .unwrap_or_default();

        let stored = match function.versions.last() {
            Some(latest) if latest.code_sha256 == current_sha => latest.clone(),
            latest => {
                let stored = StoredVersion {
                    version: latest.map_or(1, |value| value.version + 1),
                    code_sha256: current_sha,
                    description: description.to_string(),
                };
                function.versions.push(stored.clone());
                stored
            }
        };

        Ok(PublishedVersion {
            function_name: function_name.to_string(),
            version: stored.version.to_string(),
            function_arn: format!(
                "{}:{}",
                function.configuration.function_arn, stored.version
            ),
            description: stored.description,
        })
    }

    fn create_alias(
        &self,
        request: &CreateAliasRequest,
    ) -> Result<AliasConfiguration, ProviderError> {
        let mut state = self.lock();
        let Some(function) = state.functions.get_mut(&request.function_name) else {
            return Err(self.not_found(&request.function_name));
        };

        if function.aliases.contains_key(&request.alias_name) {
            return Err(ProviderError::already_exists(format!(
                "Alias already exists: {}:{}",
                function.configuration.function_arn, request.alias_name
            )));
        }

        let is_published = request.function_version == LATEST_VERSION
            || function
                .versions
                .iter()
                .any(|stored| stored.version.to_string() == request.function_version);
        if !is_published {
            return Err(ProviderError::invalid_version(format!(
                "Version {} of function {} has not been published",
                request.function_version, request.function_name
            )));
        }

        let alias = AliasConfiguration {
            name: request.alias_name.clone(),
            alias_arn: format!(
                "{}:{}",
                function.configuration.function_arn, request.alias_name
            ),
            function_version: request.function_version.clone(),
            description: request.description.clone(),
        };
        function
            .aliases
            .insert(request.alias_name.clone(), alias.clone());
        Ok(alias)
    }

    fn get_alias(
        &self,
        function_name: &str,
        alias_name: &str,
    ) -> Result<AliasConfiguration, ProviderError> {
        let state = self.lock();
        let Some(function) = state.functions.get(function_name) else {
            return Err(self.not_found(function_name));
        };
        function.aliases.get(alias_name).cloned().ok_or_else(|| {
            ProviderError::not_found(format!(
                "Alias not found: {}:{alias_name}",
                function.configuration.function_arn
            ))
        })
    }
}
