//! Builders for the policy documents the stack attaches to its roles.

use crate::types::{ActionType, BucketAccess, Effect, PolicyDocument, Principal, Statement};

/// Actions a Lambda function needs to ship its logs.
pub const LOG_WRITE_ACTIONS: [&str; 3] = [
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

pub const LOG_RESOURCE: &str = "arn:aws:logs:*:*:*";

pub const LAMBDA_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";

pub const ASSUME_ROLE_ACTION: &str = "sts:AssumeRole";

/// Build a single allow statement for `action` on `resource`.
pub fn build_single_statement(action: ActionType, resource: impl Into<String>) -> Statement {
    Statement {
        sid: None,
        effect: Effect::Allow,
        principal: None,
        action,
        resource: Some(resource.into()),
    }
}

/// Objects of a bucket, never the bucket itself or anything wider.
pub fn bucket_objects_resource(bucket_arn: &str) -> String {
    format!("{bucket_arn}/*")
}

/// Allow creating log groups and streams and writing events anywhere in CloudWatch Logs.
pub fn logs_write_document() -> PolicyDocument {
    PolicyDocument::new(vec![build_single_statement(
        ActionType::Multiple(LOG_WRITE_ACTIONS.iter().map(|a| a.to_string()).collect()),
        LOG_RESOURCE,
    )])
}

pub fn bucket_object_document(access: BucketAccess, bucket_arn: &str) -> PolicyDocument {
    PolicyDocument::new(vec![build_single_statement(
        ActionType::Single(access.action().to_string()),
        bucket_objects_resource(bucket_arn),
    )])
}

/// Trust policy letting only the Lambda service assume a role.
pub fn lambda_trust_document() -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        sid: None,
        effect: Effect::Allow,
        principal: Some(Principal {
            service: LAMBDA_SERVICE_PRINCIPAL.to_string(),
        }),
        action: ActionType::Single(ASSUME_ROLE_ACTION.to_string()),
        resource: None,
    }])
}
