//! The deployment pipeline: package, create, invoke, publish, alias.
//!
//! Each step is a small function over an explicit [`FunctionProvider`] so the
//! same control flow runs against AWS or the in-memory provider. Progress is
//! logged as one JSON object per line on stderr.

use std::path::Path;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::json;

use crate::archive::{package_source, FunctionArchive};
use crate::config::{DeploymentConfig, FunctionSpec};
use crate::error::{DeployError, ProviderError};
use crate::provider::{
    AliasConfiguration, CreateAliasRequest, CreateFunctionRequest, FunctionConfiguration,
    FunctionProvider, InvokeRequest, PublishedVersion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Packaging,
    Creating,
    Invoking,
    Publishing,
    Aliasing,
    Done,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Packaging => "packaging",
            Self::Creating => "creating",
            Self::Invoking => "invoking",
            Self::Publishing => "publishing",
            Self::Aliasing => "aliasing",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSummary {
    pub status_code: i32,
    pub output_text: String,
    pub function_error: Option<String>,
    pub log_tail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    pub function_arn: String,
    pub function_output: String,
    pub version: String,
    pub alias_arn: String,
}

impl DeploymentReport {
    pub fn lines(&self) -> Vec<String> {
        vec![
            created_function_line(&self.function_arn),
            function_output_line(&self.function_output),
            published_version_line(&self.version),
            created_alias_line(&self.alias_arn),
        ]
    }
}

fn created_function_line(function_arn: &str) -> String {
    format!("Created Lambda Function: {function_arn}")
}

fn function_output_line(output: &str) -> String {
    format!("Function output: {output}")
}

fn published_version_line(version: &str) -> String {
    format!("Published Version: {version}")
}

fn created_alias_line(alias_arn: &str) -> String {
    format!("Created Alias: {alias_arn}")
}

pub fn package(source: &Path, staging_path: &Path) -> Result<FunctionArchive, DeployError> {
    package_source(source, staging_path)
}

pub fn create_function(
    provider: &impl FunctionProvider,
    function: &FunctionSpec,
    archive: &FunctionArchive,
) -> Result<FunctionConfiguration, ProviderError> {
    provider.create_function(&CreateFunctionRequest {
        function_name: function.function_name.clone(),
        runtime: function.runtime.clone(),
        role: function.role.clone(),
        handler: function.handler.clone(),
        zip_file: archive.bytes.clone(),
        timeout_seconds: function.timeout_seconds,
        memory_size_mb: function.memory_size_mb,
        publish: function.publish,
    })
}

/// Invokes `function_name` synchronously and decodes the payload as text.
///
/// A function-level error is returned as [`DeployError::FunctionFailed`]
/// unless `allow_function_errors` is set.
pub fn invoke_function(
    provider: &impl FunctionProvider,
    function_name: &str,
    allow_function_errors: bool,
) -> Result<InvocationSummary, DeployError> {
    let output = provider.invoke(&InvokeRequest::request_response(function_name))?;
    let summary = InvocationSummary {
        status_code: output.status_code,
        output_text: String::from_utf8_lossy(&output.payload).into_owned(),
        function_error: output.function_error,
        log_tail: output.log_result.as_deref().map(decode_log_tail),
    };

    if let Some(tail) = &summary.log_tail {
        log_pipeline_info(
            "invocation_log_tail",
            json!({
                "function_name": function_name,
                "log_tail": tail,
            }),
        );
    }

    let Some(kind) = summary.function_error.clone() else {
        return Ok(summary);
    };

    if !allow_function_errors {
        return Err(DeployError::FunctionFailed {
            function_name: function_name.to_string(),
            kind,
            payload: summary.output_text,
        });
    }

    log_pipeline_info(
        "function_error_ignored",
        json!({
            "function_name": function_name,
            "function_error": kind,
        }),
    );
    Ok(summary)
}

pub fn publish_version(
    provider: &impl FunctionProvider,
    function_name: &str,
    description: &str,
) -> Result<PublishedVersion, ProviderError> {
    provider.publish_version(function_name, description)
}

pub fn create_alias(
    provider: &impl FunctionProvider,
    function_name: &str,
    alias_name: &str,
    version: &str,
) -> Result<AliasConfiguration, ProviderError> {
    provider.create_alias(&CreateAliasRequest {
        function_name: function_name.to_string(),
        alias_name: alias_name.to_string(),
        function_version: version.to_string(),
        description: None,
    })
}

/// Runs all five steps in order, stopping at the first failure.
///
/// `on_output` receives each report line as soon as its step completes, so a
/// later failure does not hide what was already created.
pub fn run_pipeline(
    provider: &impl FunctionProvider,
    config: &DeploymentConfig,
    on_output: &mut dyn FnMut(&str),
) -> Result<DeploymentReport, DeployError> {
    let function_name = config.function.function_name.as_str();

    let archive = run_stage(
        PipelineStage::Packaging,
        || package(&config.source_path, &config.archive_path),
        |archive| {
            json!({
                "entry_name": archive.entry_name,
                "staged_path": archive.staged_path.display().to_string(),
                "archive_bytes": archive.len(),
                "sha256": archive.sha256_hex,
            })
        },
    )?;

    let function = run_stage(
        PipelineStage::Creating,
        || Ok(create_function(provider, &config.function, &archive)?),
        |function| {
            json!({
                "function_name": function.function_name,
                "function_arn": function.function_arn,
                "runtime": function.runtime,
            })
        },
    )?;
    on_output(&created_function_line(&function.function_arn));

    let invocation = run_stage(
        PipelineStage::Invoking,
        || invoke_function(provider, function_name, config.allow_function_errors),
        |invocation| {
            json!({
                "status_code": invocation.status_code,
                "payload_bytes": invocation.output_text.len(),
                "function_error": invocation.function_error,
            })
        },
    )?;
    on_output(&function_output_line(&invocation.output_text));

    let published = run_stage(
        PipelineStage::Publishing,
        || Ok(publish_version(provider, function_name, &config.version_description)?),
        |published| {
            json!({
                "version": published.version,
                "function_arn": published.function_arn,
            })
        },
    )?;
    on_output(&published_version_line(&published.version));

    let alias = run_stage(
        PipelineStage::Aliasing,
        || {
            Ok(create_alias(
                provider,
                function_name,
                &config.alias_name,
                &published.version,
            )?)
        },
        |alias| {
            json!({
                "alias_name": alias.name,
                "alias_arn": alias.alias_arn,
                "function_version": alias.function_version,
            })
        },
    )?;
    on_output(&created_alias_line(&alias.alias_arn));

    log_pipeline_info(
        "pipeline_completed",
        json!({
            "stage": PipelineStage::Done,
            "function_name": function_name,
            "version": published.version,
            "alias_name": alias.name,
        }),
    );

    Ok(DeploymentReport {
        function_arn: function.function_arn,
        function_output: invocation.output_text,
        version: published.version,
        alias_arn: alias.alias_arn,
    })
}

fn run_stage<T>(
    stage: PipelineStage,
    action: impl FnOnce() -> Result<T, DeployError>,
    describe: impl FnOnce(&T) -> serde_json::Value,
) -> Result<T, DeployError> {
    let started_at = Instant::now();
    log_pipeline_info("stage_started", json!({ "stage": stage }));

    match action() {
        Ok(value) => {
            log_pipeline_info(
                "stage_completed",
                json!({
                    "stage": stage,
                    "duration_ms": started_at.elapsed().as_millis(),
                    "result": describe(&value),
                }),
            );
            Ok(value)
        }
        Err(error) => {
            log_pipeline_error(
                "stage_failed",
                json!({
                    "stage": stage,
                    "duration_ms": started_at.elapsed().as_millis(),
                    "error": error.to_string(),
                }),
            );
            Err(DeployError::Stage {
                stage,
                source: Box::new(error),
            })
        }
    }
}

fn decode_log_tail(encoded: &str) -> String {
    match STANDARD.decode(encoded) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => encoded.to_string(),
    }
}

fn log_pipeline_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "deploy_pipeline",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_pipeline_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "deploy_pipeline",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::error::ProviderErrorKind;
    use crate::memory_provider::InMemoryFunctionProvider;

    use super::*;

    fn config_in(dir: &Path) -> DeploymentConfig {
        let source_path = dir.join("lambda_function.py");
        fs::write(
            &source_path,
            "def lambda_handler(event, context):\n    return {'statusCode': 200}\n",
        )
        .expect("source should be writable");
        DeploymentConfig {
            source_path,
            archive_path: dir.join("lambda_function.zip"),
            ..DeploymentConfig::default()
        }
    }

    #[test]
    fn report_lines_follow_execution_order() {
        let report = DeploymentReport {
            function_arn: "arn:fn".to_string(),
            function_output: "ok".to_string(),
            version: "1".to_string(),
            alias_arn: "arn:fn:prod".to_string(),
        };

        assert_eq!(
            report.lines(),
            vec![
                "Created Lambda Function: arn:fn",
                "Function output: ok",
                "Published Version: 1",
                "Created Alias: arn:fn:prod",
            ]
        );
    }

    #[test]
    fn streamed_lines_match_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = InMemoryFunctionProvider::new();
        let mut streamed = Vec::new();

        let report = run_pipeline(&provider, &config_in(dir.path()), &mut |line: &str| {
            streamed.push(line.to_string())
        })
        .expect("pipeline should succeed");

        assert_eq!(streamed, report.lines());
    }

    #[test]
    fn function_error_halts_before_publish() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = InMemoryFunctionProvider::new()
            .with_function_error("Unhandled")
            .with_payload(r#"{"errorMessage": "boom"}"#);
        let mut streamed = Vec::new();

        let error = run_pipeline(&provider, &config_in(dir.path()), &mut |line: &str| {
            streamed.push(line.to_string())
        })
        .expect_err("function error should fail the run");

        assert_eq!(error.stage(), Some(PipelineStage::Invoking));
        assert!(matches!(
            error.root(),
            DeployError::FunctionFailed { kind, .. } if kind == "Unhandled"
        ));
        assert_eq!(streamed.len(), 1);
        assert_eq!(provider.invocation_count(), 1);
        let alias_error = provider
            .get_alias("MyLambdaFunction", "prod")
            .expect_err("alias should not exist");
        assert_eq!(alias_error.kind(), ProviderErrorKind::NotFound);
    }

    #[test]
    fn allowed_function_error_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = InMemoryFunctionProvider::new()
            .with_function_error("Handled")
            .with_payload(r#"{"errorMessage": "boom"}"#);
        let config = DeploymentConfig {
            allow_function_errors: true,
            ..config_in(dir.path())
        };

        let report =
            run_pipeline(&provider, &config, &mut |_| {}).expect("pipeline should succeed");

        assert_eq!(report.function_output, r#"{"errorMessage": "boom"}"#);
        assert_eq!(report.version, "1");
    }

    #[test]
    fn invoke_decodes_payload_lossily() {
        let provider = InMemoryFunctionProvider::new().with_payload(vec![b'o', b'k', 0xff]);
        provider
            .create_function(&CreateFunctionRequest {
                function_name: "fn".to_string(),
                runtime: "python3.8".to_string(),
                role: "arn:aws:iam::123456789012:role/r".to_string(),
                handler: "h".to_string(),
                zip_file: Vec::new(),
                timeout_seconds: 3,
                memory_size_mb: 128,
                publish: false,
            })
            .expect("create");

        let summary = invoke_function(&provider, "fn", false).expect("invoke");
        assert_eq!(summary.output_text, "ok\u{fffd}");
        assert!(summary
            .log_tail
            .as_deref()
            .is_some_and(|tail| tail.contains("REPORT RequestId")));
    }

    #[test]
    fn invoking_missing_function_is_not_found() {
        let provider = InMemoryFunctionProvider::new();
        let error = invoke_function(&provider, "ghost", false).expect_err("missing function");
        assert_eq!(
            error.provider_error().map(ProviderError::kind),
            Some(ProviderErrorKind::NotFound)
        );
    }

    #[test]
    fn undecodable_log_tail_is_kept_verbatim() {
        assert_eq!(decode_log_tail("not base64!"), "not base64!");
    }
}
