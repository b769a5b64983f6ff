//! IAM policies, roles and the attachments between them.

use crate::error::InfraResult;
use crate::stack::{Output, ResourceType, Stack, Urn};

use super::{deferred, literal};

/// A managed policy holding one JSON document.
#[derive(Debug, Clone)]
pub struct Policy {
    pub urn: Urn,
    pub id: Output<String>,
    pub arn: Output<String>,
    pub name: Output<String>,
}

impl Policy {
    /// `document` may be deferred when it embeds other resources' outputs.
    pub fn new(stack: &mut Stack, name: &str, document: Output<String>) -> InfraResult<Self> {
        let mut outputs =
            stack.register(ResourceType::Policy, name, vec![("policy", deferred(&document))])?;
        Ok(Self {
            urn: outputs.urn().clone(),
            id: outputs.take("id"),
            arn: outputs.take("arn"),
            name: outputs.take("name"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Role {
    pub urn: Urn,
    pub id: Output<String>,
    pub arn: Output<String>,
    pub name: Output<String>,
}

impl Role {
    pub fn new(stack: &mut Stack, name: &str, assume_role_policy: &str) -> InfraResult<Self> {
        let mut outputs = stack.register(
            ResourceType::Role,
            name,
            vec![("assumeRolePolicy", literal(assume_role_policy))],
        )?;
        Ok(Self {
            urn: outputs.urn().clone(),
            id: outputs.take("id"),
            arn: outputs.take("arn"),
            name: outputs.take("name"),
        })
    }

    /// Order every consumer of this role after `resources`.
    pub(crate) fn with_dependencies(self, resources: &[Urn]) -> Self {
        Self {
            urn: self.urn,
            id: self.id.depends_on(resources.iter().cloned()),
            arn: self.arn.depends_on(resources.iter().cloned()),
            name: self.name.depends_on(resources.iter().cloned()),
        }
    }
}

/// Join between a role and a managed policy.
#[derive(Debug, Clone)]
pub struct RolePolicyAttachment {
    pub urn: Urn,
    pub id: Output<String>,
}

impl RolePolicyAttachment {
    pub fn new(stack: &mut Stack, name: &str, role: &Role, policy: &Policy) -> InfraResult<Self> {
        let mut outputs = stack.register(
            ResourceType::RolePolicyAttachment,
            name,
            vec![("role", deferred(&role.id)), ("policyArn", deferred(&policy.arn))],
        )?;
        Ok(Self {
            urn: outputs.urn().clone(),
            id: outputs.take("id"),
        })
    }
}
