use std::process::ExitCode;

use clap::Parser;
use lambda_deploy_aws::adapters::lambda_client::AwsLambdaProvider;
use lambda_deploy_aws::cli::Cli;
use lambda_deploy_core::pipeline::run_pipeline;
use serde_json::json;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.deployment_config();
    let provider = AwsLambdaProvider::from_env(cli.region.clone()).await;

    match run_pipeline(&provider, &config, &mut |line: &str| println!("{line}")) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let mut causes = Vec::new();
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                causes.push(cause.to_string());
                source = cause.source();
            }
            eprintln!(
                "{}",
                json!({
                    "component": "deploy_function",
                    "level": "error",
                    "event": "deployment_failed",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "details": {
                        "stage": error.stage().map(|stage| stage.as_str()),
                        "error": error.to_string(),
                        "causes": causes,
                    },
                })
            );
            ExitCode::FAILURE
        }
    }
}
