//! Typed handles for the AWS resources the stack declares.

pub mod iam;
pub mod lambda;
pub mod s3;

use serde_json::Value;

use crate::stack::Output;

pub use iam::{Policy, Role, RolePolicyAttachment};
pub use lambda::{Function, FunctionArgs};
pub use s3::Bucket;

/// A string input known at declaration time.
fn literal(value: &str) -> Output<Value> {
    Output::known(Value::String(value.to_string()))
}

/// A string input resolved at provisioning time.
fn deferred(value: &Output<String>) -> Output<Value> {
    value.map(Value::String)
}
