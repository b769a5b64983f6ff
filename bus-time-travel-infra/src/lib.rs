//! This crate declares the cloud infrastructure of the bus time travel
//! history service:
//! - an S3 bucket holding the recorded history
//! - least-privilege IAM roles scoped to that bucket, sharing one log-write policy
//! - the `get_history` Lambda function packaged from a prebuilt binary
//!
//! Resources are registered into a [`Stack`] and connected through deferred
//! [`Output`] values. [`Stack::synthesize`] resolves them into a
//! [`Manifest`] describing the desired state for a provisioning engine.

pub mod archive;
pub mod aws;
pub mod deployment;
mod error;
pub mod grants;
pub mod stack;
pub mod synthesis;
pub mod types;

// Re-exports for a small, focused public API
pub use archive::{AssetArchive, FileArchive};
pub use aws::{Bucket, Function, FunctionArgs, Policy, Role, RolePolicyAttachment};
pub use deployment::{deploy, Deployment, DeploymentConfig, DEFAULT_ARTIFACT_DIR};
pub use error::{InfraError, InfraResult};
pub use grants::{
    attach, lambda_logs_policy, lambda_role, read_from_bucket_role, s3_read_policy,
    s3_write_policy, write_to_bucket_role,
};
pub use stack::{
    Manifest, ManifestResource, NamingStrategy, Output, OutputError, ProviderContext,
    ResourceType, Stack, Urn,
};
pub use types::{ActionType, BucketAccess, Effect, PolicyDocument, Principal, Statement};
