use std::fs;
use std::path::Path;

use lambda_deploy_core::config::DeploymentConfig;

pub const HANDLER_SOURCE: &str = "import json\n\n\
def lambda_handler(event, context):\n    \
return {'statusCode': 200, 'body': json.dumps('Hello from Lambda!')}\n";

/// Writes `lambda_function.py` into `dir` and points the config at it.
pub fn deployment_config_in(dir: &Path) -> DeploymentConfig {
    let source_path = dir.join("lambda_function.py");
    fs::write(&source_path, HANDLER_SOURCE).expect("source should be writable");
    DeploymentConfig {
        source_path,
        archive_path: dir.join("lambda_function.zip"),
        ..DeploymentConfig::default()
    }
}
