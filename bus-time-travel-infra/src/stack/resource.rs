//! Resource types known to the stack and the provider context used to
//! derive their provider-assigned identifiers.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Wildcard used when an account or region is not known.
pub const UNKNOWN: &str = "*";

/// Partition, region and account that ARNs are rendered against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderContext {
    pub partition: String,
    pub region: String,
    pub account: String,
}

impl ProviderContext {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account: account.into(),
        }
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self::new("aws", UNKNOWN, UNKNOWN)
    }
}

/// Every resource type this stack can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Bucket,
    Policy,
    Role,
    RolePolicyAttachment,
    Function,
}

impl ResourceType {
    /// Provider type token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Bucket => "aws:s3/bucket:Bucket",
            Self::Policy => "aws:iam/policy:Policy",
            Self::Role => "aws:iam/role:Role",
            Self::RolePolicyAttachment => "aws:iam/rolePolicyAttachment:RolePolicyAttachment",
            Self::Function => "aws:lambda/function:Function",
        }
    }

    /// Properties published once the resource exists.
    pub const fn output_properties(self) -> &'static [&'static str] {
        match self {
            Self::Bucket => &["id", "arn", "bucket"],
            Self::Policy | Self::Role | Self::Function => &["id", "arn", "name"],
            Self::RolePolicyAttachment => &["id"],
        }
    }

    /// Whether the engine may append a random suffix to the physical name.
    pub const fn auto_named(self) -> bool {
        !matches!(self, Self::RolePolicyAttachment)
    }

    /// Outputs the provider would assign to a resource with `physical_name`.
    pub fn outputs(self, context: &ProviderContext, physical_name: &str) -> Vec<(&'static str, String)> {
        let ProviderContext {
            partition,
            region,
            account,
        } = context;
        match self {
            Self::Bucket => vec![
                ("id", physical_name.to_string()),
                ("arn", format!("arn:{partition}:s3:::{physical_name}")),
                ("bucket", physical_name.to_string()),
            ],
            Self::Policy => {
                let arn = format!("arn:{partition}:iam::{account}:policy/{physical_name}");
                vec![
                    ("id", arn.clone()),
                    ("arn", arn),
                    ("name", physical_name.to_string()),
                ]
            }
            Self::Role => vec![
                ("id", physical_name.to_string()),
                ("arn", format!("arn:{partition}:iam::{account}:role/{physical_name}")),
                ("name", physical_name.to_string()),
            ],
            Self::RolePolicyAttachment => vec![("id", physical_name.to_string())],
            Self::Function => vec![
                ("id", physical_name.to_string()),
                (
                    "arn",
                    format!("arn:{partition}:lambda:{region}:{account}:function:{physical_name}"),
                ),
                ("name", physical_name.to_string()),
            ],
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}
