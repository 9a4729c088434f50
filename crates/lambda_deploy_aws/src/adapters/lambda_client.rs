use std::future::Future;

use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{
    FunctionCode, InvocationType as SdkInvocationType, LogType as SdkLogType, Runtime,
};
use lambda_deploy_core::provider::{
    AliasConfiguration, CreateAliasRequest, CreateFunctionRequest, FunctionConfiguration,
    FunctionProvider, InvocationOutput, InvocationType, InvokeRequest, LogType, ProviderError,
    PublishedVersion, LATEST_VERSION,
};

use crate::adapters::error_mapping::{provider_error, required};

/// [`FunctionProvider`] backed by the AWS Lambda API.
///
/// Calls block the current worker thread, so this must run inside a
/// multi-threaded tokio runtime.
#[derive(Clone)]
pub struct AwsLambdaProvider {
    lambda_client: aws_sdk_lambda::Client,
}

impl AwsLambdaProvider {
    pub fn new(lambda_client: aws_sdk_lambda::Client) -> Self {
        Self { lambda_client }
    }

    /// Builds a client from the default credential and region chain.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(aws_sdk_lambda::Client::new(&config))
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub fn sdk_invocation_type(invocation_type: InvocationType) -> SdkInvocationType {
    match invocation_type {
        InvocationType::RequestResponse => SdkInvocationType::RequestResponse,
        InvocationType::Event => SdkInvocationType::Event,
        InvocationType::DryRun => SdkInvocationType::DryRun,
    }
}

pub fn sdk_log_type(log_type: LogType) -> SdkLogType {
    match log_type {
        LogType::None => SdkLogType::None,
        LogType::Tail => SdkLogType::Tail,
    }
}

impl FunctionProvider for AwsLambdaProvider {
    fn create_function(
        &self,
        request: &CreateFunctionRequest,
    ) -> Result<FunctionConfiguration, ProviderError> {
        let output = block_on(
            self.lambda_client
                .create_function()
                .function_name(&request.function_name)
                .runtime(Runtime::from(request.runtime.as_str()))
                .role(&request.role)
                .handler(&request.handler)
                .code(
                    FunctionCode::builder()
                        .zip_file(Blob::new(request.zip_file.clone()))
                        .build(),
                )
                .timeout(request.timeout_seconds)
                .memory_size(request.memory_size_mb)
                .publish(request.publish)
                .send(),
        )
        .map_err(|error| provider_error("CreateFunction", error))?;

        Ok(FunctionConfiguration {
            function_name: output
                .function_name()
                .unwrap_or(&request.function_name)
                .to_string(),
            function_arn: required(output.function_arn(), "FunctionArn")?.to_string(),
            runtime: output
                .runtime()
                .map(|runtime| runtime.as_str().to_string())
                .unwrap_or_else(|| request.runtime.clone()),
            role: output.role().unwrap_or(&request.role).to_string(),
            handler: output.handler().unwrap_or(&request.handler).to_string(),
            timeout_seconds: output.timeout().unwrap_or(request.timeout_seconds),
            memory_size_mb: output.memory_size().unwrap_or(request.memory_size_mb),
            code_sha256: output.code_sha256().map(str::to_string),
            version: output.version().unwrap_or(LATEST_VERSION).to_string(),
        })
    }

    fn invoke(&self, request: &InvokeRequest) -> Result<InvocationOutput, ProviderError> {
        let output = block_on(
            self.lambda_client
                .invoke()
                .function_name(&request.function_name)
                .invocation_type(sdk_invocation_type(request.invocation_type))
                .log_type(sdk_log_type(request.log_type))
                .send(),
        )
        .map_err(|error| provider_error("Invoke", error))?;

        Ok(InvocationOutput {
            status_code: output.status_code(),
            payload: output
                .payload()
                .map(|payload| payload.as_ref().to_vec())
                .unwrap_or_default(),
            function_error: output.function_error().map(str::to_string),
            log_result: output.log_result().map(str::to_string),
            executed_version: output.executed_version().map(str::to_string),
        })
    }

    fn publish_version(
        &self,
        function_name: &str,
        description: &str,
    ) -> Result<PublishedVersion, ProviderError> {
        let output = block_on(
            self.lambda_client
                .publish_version()
                .function_name(function_name)
                .description(description)
                .send(),
        )
        .map_err(|error| provider_error("PublishVersion", error))?;

        Ok(PublishedVersion {
            function_name: output.function_name().unwrap_or(function_name).to_string(),
            version: required(output.version(), "Version")?.to_string(),
            function_arn: required(output.function_arn(), "FunctionArn")?.to_string(),
            description: output.description().unwrap_or(description).to_string(),
        })
    }

    fn create_alias(
        &self,
        request: &CreateAliasRequest,
    ) -> Result<AliasConfiguration, ProviderError> {
        let output = block_on(
            self.lambda_client
                .create_alias()
                .function_name(&request.function_name)
                .name(&request.alias_name)
                .function_version(&request.function_version)
                .set_description(request.description.clone())
                .send(),
        )
        .map_err(|error| provider_error("CreateAlias", error))?;

        Ok(AliasConfiguration {
            name: output.name().unwrap_or(&request.alias_name).to_string(),
            alias_arn: required(output.alias_arn(), "AliasArn")?.to_string(),
            function_version: output
                .function_version()
                .unwrap_or(&request.function_version)
                .to_string(),
            description: output.description().map(str::to_string),
        })
    }

    fn get_alias(
        &self,
        function_name: &str,
        alias_name: &str,
    ) -> Result<AliasConfiguration, ProviderError> {
        let output = block_on(
            self.lambda_client
                .get_alias()
                .function_name(function_name)
                .name(alias_name)
                .send(),
        )
        .map_err(|error| provider_error("GetAlias", error))?;

        Ok(AliasConfiguration {
            name: output.name().unwrap_or(alias_name).to_string(),
            alias_arn: required(output.alias_arn(), "AliasArn")?.to_string(),
            function_version: required(output.function_version(), "FunctionVersion")?
                .to_string(),
            description: output.description().map(str::to_string),
        })
    }
}
