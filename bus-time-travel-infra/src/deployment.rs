//! The bus time travel deployment: the history bucket, the reader role and
//! the `get_history` function.

use std::path::PathBuf;

use log::info;

use crate::archive::{AssetArchive, FileArchive};
use crate::aws::{Bucket, Function, FunctionArgs, Policy, Role};
use crate::error::InfraResult;
use crate::grants::{lambda_logs_policy, read_from_bucket_role};
use crate::stack::Stack;

/// Where `cargo lambda build` leaves the history function, relative to the infra directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "../backend/target/lambda/bus_history";

/// Amazon Linux 2023 custom runtime.
pub const DEFAULT_RUNTIME: &str = "provided.al2023";

/// Custom runtimes execute the `bootstrap` binary.
pub const DEFAULT_HANDLER: &str = "bootstrap";

/// Logical names and packaging of the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub bucket_name: String,
    pub logs_policy_name: String,
    pub reader_role_name: String,
    pub function_name: String,
    pub runtime: String,
    pub handler: String,
    pub artifact_dir: PathBuf,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            bucket_name: "bus-time-travel".to_string(),
            logs_policy_name: "shared-lambda-logs".to_string(),
            reader_role_name: "get_history_role".to_string(),
            function_name: "get_history".to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            handler: DEFAULT_HANDLER.to_string(),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

/// Handles to everything [`deploy`] declared.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub bucket: Bucket,
    pub logs_policy: Policy,
    pub reader_role: Role,
    pub function: Function,
}

/// Declare the deployment into `stack`.
pub fn deploy(stack: &mut Stack, config: &DeploymentConfig) -> InfraResult<Deployment> {
    let logs_policy = lambda_logs_policy(stack, &config.logs_policy_name)?;
    let bucket = Bucket::new(stack, &config.bucket_name)?;
    let reader_role = read_from_bucket_role(stack, &config.reader_role_name, &bucket, &logs_policy)?;

    let artifact = FileArchive::locate(&config.artifact_dir)?;
    info!("Packaging '{}' from {}", config.function_name, artifact.path().display());

    let function = Function::new(
        stack,
        &config.function_name,
        FunctionArgs {
            runtime: config.runtime.clone(),
            handler: config.handler.clone(),
            role: reader_role.arn.clone(),
            code: AssetArchive::new().with_asset(".", artifact),
        },
    )?;

    Ok(Deployment {
        bucket,
        logs_policy,
        reader_role,
        function,
    })
}
