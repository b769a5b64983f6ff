//! S3 buckets.

use crate::error::InfraResult;
use crate::stack::{Output, ResourceType, Stack, Urn};

#[derive(Debug, Clone)]
pub struct Bucket {
    pub urn: Urn,
    pub id: Output<String>,
    pub arn: Output<String>,
    /// Provider-side bucket name.
    pub bucket: Output<String>,
}

impl Bucket {
    pub fn new(stack: &mut Stack, name: &str) -> InfraResult<Self> {
        let mut outputs = stack.register(ResourceType::Bucket, name, Vec::new())?;
        Ok(Self {
            urn: outputs.urn().clone(),
            id: outputs.take("id"),
            arn: outputs.take("arn"),
            bucket: outputs.take("bucket"),
        })
    }
}
