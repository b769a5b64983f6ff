//! Least-privilege roles for functions that touch a single bucket.
//!
//! Every role built here trusts only the Lambda service, carries the shared
//! log-write policy, and gets exactly one bucket-scoped policy limited to
//! `<bucket-arn>/*`. The shared log policy is created once by the caller and
//! passed in, so every role attaches the same managed policy.

use log::debug;

use crate::aws::{Bucket, Policy, Role, RolePolicyAttachment};
use crate::error::{InfraError, InfraResult};
use crate::stack::{Output, ResourceType, Stack};
use crate::synthesis::{bucket_object_document, lambda_trust_document, logs_write_document};
use crate::types::BucketAccess;

/// The log-write policy shared by every function role.
pub fn lambda_logs_policy(stack: &mut Stack, name: &str) -> InfraResult<Policy> {
    let document = logs_write_document().to_json()?;
    Policy::new(stack, name, Output::known(document))
}

pub fn s3_write_policy(
    stack: &mut Stack,
    name: &str,
    bucket_arn: &Output<String>,
) -> InfraResult<Policy> {
    bucket_policy(stack, name, bucket_arn, BucketAccess::Write)
}

pub fn s3_read_policy(
    stack: &mut Stack,
    name: &str,
    bucket_arn: &Output<String>,
) -> InfraResult<Policy> {
    bucket_policy(stack, name, bucket_arn, BucketAccess::Read)
}

fn bucket_policy(
    stack: &mut Stack,
    name: &str,
    bucket_arn: &Output<String>,
    access: BucketAccess,
) -> InfraResult<Policy> {
    // The ARN is only known once the bucket exists.
    let document =
        bucket_arn.and_then(move |arn| Ok(bucket_object_document(access, &arn).to_json()?));
    Policy::new(stack, name, document)
}

/// A role only the Lambda service may assume.
pub fn lambda_role(stack: &mut Stack, name: &str) -> InfraResult<Role> {
    let trust = lambda_trust_document().to_json()?;
    Role::new(stack, name, &trust)
}

/// Attach `policy` to `role` under `name`.
///
/// Repeating an identical attachment is a no-op; reusing `name` for a
/// different role or policy is a duplicate resource.
pub fn attach(stack: &mut Stack, role: &Role, policy: &Policy, name: &str) -> InfraResult<()> {
    if let Some(existing) = stack.dependencies_of(ResourceType::RolePolicyAttachment, name) {
        if existing.contains(&role.urn) && existing.contains(&policy.urn) {
            debug!("Attachment '{}' already links {} and {}", name, role.urn, policy.urn);
            return Ok(());
        }
        return Err(InfraError::duplicate(
            ResourceType::RolePolicyAttachment.token(),
            name,
        ));
    }

    RolePolicyAttachment::new(stack, name, role, policy)?;
    Ok(())
}

/// Role `<name>-role` allowed to put objects into `bucket`.
pub fn write_to_bucket_role(
    stack: &mut Stack,
    name: &str,
    bucket: &Bucket,
    logs_policy: &Policy,
) -> InfraResult<Role> {
    bucket_role(stack, name, bucket, logs_policy, BucketAccess::Write)
}

/// Role `<name>-role` allowed to get objects from `bucket`.
pub fn read_from_bucket_role(
    stack: &mut Stack,
    name: &str,
    bucket: &Bucket,
    logs_policy: &Policy,
) -> InfraResult<Role> {
    bucket_role(stack, name, bucket, logs_policy, BucketAccess::Read)
}

fn bucket_role(
    stack: &mut Stack,
    name: &str,
    bucket: &Bucket,
    logs_policy: &Policy,
    access: BucketAccess,
) -> InfraResult<Role> {
    let role = lambda_role(stack, &format!("{name}-role"))?;

    let (policy, attachment) = match access {
        BucketAccess::Read => (
            s3_read_policy(stack, &format!("{name}-s3-read"), &bucket.arn)?,
            format!("{name}-read-attach"),
        ),
        BucketAccess::Write => (
            s3_write_policy(stack, &format!("{name}-s3-write"), &bucket.arn)?,
            format!("{name}-write-attach"),
        ),
    };

    let logs_attachment = format!("{name}-logs");
    attach(stack, &role, logs_policy, &logs_attachment)?;
    attach(stack, &role, &policy, &attachment)?;

    // Consumers of the role must not start before its policies are attached.
    let attachments = [
        stack.urn(ResourceType::RolePolicyAttachment, &logs_attachment),
        stack.urn(ResourceType::RolePolicyAttachment, &attachment),
    ];
    Ok(role.with_dependencies(&attachments))
}
