use std::path::PathBuf;

use clap::Parser;
use lambda_deploy_core::config::{
    default_archive_path, DeploymentConfig, FunctionSpec, DEFAULT_ALIAS_NAME, DEFAULT_FUNCTION_NAME,
    DEFAULT_HANDLER, DEFAULT_MEMORY_SIZE_MB, DEFAULT_ROLE_ARN, DEFAULT_RUNTIME,
    DEFAULT_SOURCE_FILE, DEFAULT_TIMEOUT_SECONDS, DEFAULT_VERSION_DESCRIPTION,
};

#[derive(Debug, Parser)]
#[command(
    name = "deploy_function",
    about = "Package, create, invoke, publish and alias a Lambda function",
    long_about = "Zips one source file, creates a new Lambda function from it, invokes it\n\
                  synchronously, publishes a version and points an alias at that version.\n\
                  Every step mutates the target account; re-running with an existing\n\
                  function name fails."
)]
pub struct Cli {
    /// Source file to package
    #[arg(long, env = "DEPLOY_SOURCE_FILE", default_value = DEFAULT_SOURCE_FILE)]
    pub source: PathBuf,
    /// Where the zip archive is staged (defaults to the temp directory)
    #[arg(long, env = "DEPLOY_ARCHIVE_PATH")]
    pub archive_path: Option<PathBuf>,
    /// Name of the function to create
    #[arg(long, env = "DEPLOY_FUNCTION_NAME", default_value = DEFAULT_FUNCTION_NAME)]
    pub function_name: String,
    /// Runtime identifier
    #[arg(long, env = "DEPLOY_RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,
    /// Execution role ARN
    #[arg(long, env = "DEPLOY_ROLE_ARN", default_value = DEFAULT_ROLE_ARN)]
    pub role: String,
    /// Entry point, as `module.function`
    #[arg(long, env = "DEPLOY_HANDLER", default_value = DEFAULT_HANDLER)]
    pub handler: String,
    /// Function timeout in seconds
    #[arg(long, env = "DEPLOY_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout: i32,
    /// Function memory in MB
    #[arg(long, env = "DEPLOY_MEMORY_SIZE", default_value_t = DEFAULT_MEMORY_SIZE_MB)]
    pub memory_size: i32,
    /// Skip publishing version 1 at creation time
    #[arg(long)]
    pub no_publish: bool,
    /// Description attached to the published version
    #[arg(long, default_value = DEFAULT_VERSION_DESCRIPTION)]
    pub version_description: String,
    /// Alias bound to the published version
    #[arg(long, env = "DEPLOY_ALIAS_NAME", default_value = DEFAULT_ALIAS_NAME)]
    pub alias: String,
    /// Region override; the SDK default chain applies otherwise
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,
    /// Continue when the invocation reports a function-level error
    #[arg(long)]
    pub allow_function_errors: bool,
}

impl Cli {
    pub fn deployment_config(&self) -> DeploymentConfig {
        DeploymentConfig {
            source_path: self.source.clone(),
            archive_path: self
                .archive_path
                .clone()
                .unwrap_or_else(default_archive_path),
            function: FunctionSpec {
                function_name: self.function_name.clone(),
                runtime: self.runtime.clone(),
                role: self.role.clone(),
                handler: self.handler.clone(),
                timeout_seconds: self.timeout,
                memory_size_mb: self.memory_size,
                publish: !self.no_publish,
            },
            version_description: self.version_description.clone(),
            alias_name: self.alias.clone(),
            allow_function_errors: self.allow_function_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_matches_default_config() {
        let cli = Cli::try_parse_from(["deploy_function"]).expect("defaults should parse");
        let config = cli.deployment_config();
        let defaults = DeploymentConfig::default();

        assert_eq!(config.function, defaults.function);
        assert_eq!(config.alias_name, defaults.alias_name);
        assert_eq!(config.version_description, defaults.version_description);
        assert_eq!(config.archive_path, defaults.archive_path);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "deploy_function",
            "--source",
            "handlers/app.py",
            "--archive-path",
            "/tmp/app.zip",
            "--function-name",
            "Orders",
            "--runtime",
            "python3.12",
            "--handler",
            "app.handle",
            "--timeout",
            "30",
            "--memory-size",
            "256",
            "--no-publish",
            "--alias",
            "staging",
            "--allow-function-errors",
        ])
        .expect("flags should parse");
        let config = cli.deployment_config();

        assert_eq!(config.source_path, PathBuf::from("handlers/app.py"));
        assert_eq!(config.archive_path, PathBuf::from("/tmp/app.zip"));
        assert_eq!(config.function.function_name, "Orders");
        assert_eq!(config.function.runtime, "python3.12");
        assert_eq!(config.function.handler, "app.handle");
        assert_eq!(config.function.timeout_seconds, 30);
        assert_eq!(config.function.memory_size_mb, 256);
        assert!(!config.function.publish);
        assert_eq!(config.alias_name, "staging");
        assert!(config.allow_function_errors);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let result = Cli::try_parse_from(["deploy_function", "--timeout", "ten"]);
        assert!(result.is_err());
    }
}
