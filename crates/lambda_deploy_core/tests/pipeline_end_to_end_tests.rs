mod support;

use std::io::Cursor;

use lambda_deploy_core::error::ProviderErrorKind;
use lambda_deploy_core::memory_provider::InMemoryFunctionProvider;
use lambda_deploy_core::pipeline::{
    create_alias, create_function, invoke_function, package, publish_version, run_pipeline,
    PipelineStage,
};
use lambda_deploy_core::provider::FunctionProvider;
use support::deployment_config_in;
use zip::ZipArchive;

#[test]
fn deploys_function_step_by_step() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = deployment_config_in(dir.path());
    let provider = InMemoryFunctionProvider::new().with_payload("\"Hello from Lambda!\"");

    let archive = package(&config.source_path, &config.archive_path).expect("package");
    let mut zip = ZipArchive::new(Cursor::new(archive.bytes.clone())).expect("valid zip");
    assert_eq!(zip.len(), 1);
    assert_eq!(zip.by_index(0).expect("entry").name(), "lambda_function.py");

    let function = create_function(&provider, &config.function, &archive).expect("create");
    assert!(function.function_arn.ends_with(":MyLambdaFunction"));
    assert_eq!(function.code_sha256.as_deref(), Some(archive.sha256_hex.as_str()));

    let invocation = invoke_function(&provider, "MyLambdaFunction", false).expect("invoke");
    assert_eq!(invocation.output_text, "\"Hello from Lambda!\"");
    assert_eq!(invocation.status_code, 200);

    let published = publish_version(&provider, "MyLambdaFunction", "Version 1").expect("publish");
    assert_eq!(published.version, "1");

    let alias = create_alias(&provider, "MyLambdaFunction", "prod", &published.version)
        .expect("alias");
    assert!(alias.alias_arn.ends_with(":MyLambdaFunction:prod"));

    let fetched = provider
        .get_alias("MyLambdaFunction", "prod")
        .expect("alias should be retrievable");
    assert_eq!(fetched.function_version, "1");
    assert_eq!(fetched, alias);
}

#[test]
fn full_pipeline_reports_four_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = deployment_config_in(dir.path());
    let provider = InMemoryFunctionProvider::new().with_payload("\"Hello from Lambda!\"");

    let report = run_pipeline(&provider, &config, &mut |_| {}).expect("pipeline should succeed");

    assert_eq!(
        report.lines(),
        vec![
            "Created Lambda Function: arn:aws:lambda:us-east-1:123456789012:function:MyLambdaFunction",
            "Function output: \"Hello from Lambda!\"",
            "Published Version: 1",
            "Created Alias: arn:aws:lambda:us-east-1:123456789012:function:MyLambdaFunction:prod",
        ]
    );
    assert!(config.archive_path.exists());
}

#[test]
fn publishes_version_one_when_create_does_not_publish() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = deployment_config_in(dir.path());
    config.function.publish = false;
    let provider = InMemoryFunctionProvider::new();

    let report = run_pipeline(&provider, &config, &mut |_| {}).expect("pipeline should succeed");

    assert_eq!(report.version, "1");
    assert_eq!(
        provider.published_versions("MyLambdaFunction"),
        vec!["1".to_string()]
    );
}

#[test]
fn pipeline_is_repeatable_against_fresh_providers() {
    let first_dir = tempfile::tempdir().expect("tempdir");
    let second_dir = tempfile::tempdir().expect("tempdir");

    let first = run_pipeline(
        &InMemoryFunctionProvider::new(),
        &deployment_config_in(first_dir.path()),
        &mut |_| {},
    )
    .expect("first run");
    let second = run_pipeline(
        &InMemoryFunctionProvider::new(),
        &deployment_config_in(second_dir.path()),
        &mut |_| {},
    )
    .expect("second run");

    assert_eq!(first.lines(), second.lines());
}

#[test]
fn rerun_against_same_provider_halts_at_create() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = deployment_config_in(dir.path());
    let provider = InMemoryFunctionProvider::new();

    run_pipeline(&provider, &config, &mut |_| {}).expect("first run");
    let mut lines = Vec::new();
    let error = run_pipeline(&provider, &config, &mut |line: &str| {
        lines.push(line.to_string())
    })
    .expect_err("second run should fail");

    assert_eq!(error.stage(), Some(PipelineStage::Creating));
    assert_eq!(
        error.provider_error().map(|inner| inner.kind()),
        Some(ProviderErrorKind::AlreadyExists)
    );
    assert!(lines.is_empty());
    assert_eq!(provider.function_count(), 1);
}

#[test]
fn missing_source_halts_at_packaging() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = deployment_config_in(dir.path());
    config.source_path = dir.path().join("missing.py");
    let provider = InMemoryFunctionProvider::new();

    let error = run_pipeline(&provider, &config, &mut |_| {}).expect_err("should fail");

    assert_eq!(error.stage(), Some(PipelineStage::Packaging));
    assert_eq!(provider.function_count(), 0);
}

#[test]
fn rejected_runtime_halts_at_create() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = deployment_config_in(dir.path());
    config.function.runtime = "python2.7".to_string();
    let provider = InMemoryFunctionProvider::new();

    let error = run_pipeline(&provider, &config, &mut |_| {}).expect_err("should fail");

    assert_eq!(error.stage(), Some(PipelineStage::Creating));
    assert_eq!(
        error.provider_error().map(|inner| inner.kind()),
        Some(ProviderErrorKind::InvalidParameter)
    );
}
