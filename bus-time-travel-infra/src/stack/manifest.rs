//! The desired-state manifest produced by synthesis.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::{ProviderContext, ResourceType, Urn};
use crate::error::InfraResult;

/// Every resource of a stack with its resolved inputs and outputs, in an
/// order where each resource follows everything it depends on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub stack: String,
    pub context: ProviderContext,
    pub resources: Vec<ManifestResource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub name: String,
    pub physical_name: String,
    pub inputs: BTreeMap<String, Value>,
    pub outputs: BTreeMap<String, String>,
    pub depends_on: Vec<Urn>,
}

impl ManifestResource {
    pub fn input(&self, property: &str) -> Option<&Value> {
        self.inputs.get(property)
    }

    /// A string input, such as a rendered policy document.
    pub fn input_str(&self, property: &str) -> Option<&str> {
        self.input(property).and_then(Value::as_str)
    }

    pub fn output(&self, property: &str) -> Option<&str> {
        self.outputs.get(property).map(String::as_str)
    }

    pub fn depends_on(&self, urn: &Urn) -> bool {
        self.depends_on.contains(urn)
    }
}

impl Manifest {
    pub fn resource(&self, kind: ResourceType, name: &str) -> Option<&ManifestResource> {
        self.resources
            .iter()
            .find(|resource| resource.kind == kind && resource.name == name)
    }

    pub fn of_type(&self, kind: ResourceType) -> impl Iterator<Item = &ManifestResource> {
        self.resources
            .iter()
            .filter(move |resource| resource.kind == kind)
    }

    /// Attachments that link a policy to `role`.
    pub fn attachments_of(&self, role: &Urn) -> Vec<&ManifestResource> {
        self.of_type(ResourceType::RolePolicyAttachment)
            .filter(|attachment| attachment.depends_on(role))
            .collect()
    }

    /// Policies attached to `role`, found through its attachments.
    pub fn policies_of(&self, role: &Urn) -> Vec<&ManifestResource> {
        self.attachments_of(role)
            .into_iter()
            .flat_map(|attachment| attachment.depends_on.iter())
            .filter_map(|urn| {
                self.of_type(ResourceType::Policy)
                    .find(|policy| &policy.urn == urn)
            })
            .collect()
    }

    pub fn to_json(&self) -> InfraResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> InfraResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable plan of what an engine would create.
    pub fn preview(&self) -> String {
        let mut out = format!(
            "Stack '{}' ({} resources, partition {}, region {}, account {})\n",
            self.stack,
            self.resources.len(),
            self.context.partition,
            self.context.region,
            self.context.account
        );
        for resource in &self.resources {
            out.push_str(&format!(
                "  + {} {} -> {}\n",
                resource.kind, resource.name, resource.physical_name
            ));
            for dependency in &resource.depends_on {
                out.push_str(&format!("      depends on {}\n", dependency));
            }
        }
        out
    }
}
