//! Offline synthesis: assign physical names, publish every resource's
//! outputs, then resolve every input into the manifest.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use super::output::OutputError;
use super::{
    Manifest, ManifestResource, NamingStrategy, ProviderContext, Registration, Stack,
};
use crate::error::{InfraError, InfraResult};

impl Stack {
    /// Resolve the stack into a [`Manifest`].
    ///
    /// Outputs are published for all resources before any input is awaited,
    /// so an input may derive from any resource registered before its consumer.
    pub async fn synthesize(
        self,
        context: &ProviderContext,
        naming: NamingStrategy,
    ) -> InfraResult<Manifest> {
        let Stack {
            name: stack_name,
            registrations,
            ..
        } = self;

        let mut published = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let Registration {
                urn,
                kind,
                name,
                inputs,
                senders,
            } = registration;

            let physical_name = naming.physical_name(kind, &name);
            let outputs: BTreeMap<String, String> = kind
                .outputs(context, &physical_name)
                .into_iter()
                .map(|(property, value)| (property.to_string(), value))
                .collect();

            for sender in senders {
                match outputs.get(sender.property()) {
                    Some(value) => sender.resolve(value.clone()),
                    None => {
                        let error = OutputError::Unresolved {
                            urn: urn.to_string(),
                            property: sender.property().to_string(),
                        };
                        sender.reject(error);
                    }
                }
            }
            debug!("Published outputs of {} as '{}'", urn, physical_name);

            published.push((urn, kind, name, physical_name, inputs, outputs));
        }

        let mut positions = HashMap::new();
        let mut resources = Vec::with_capacity(published.len());
        for (position, (urn, kind, name, physical_name, inputs, outputs)) in
            published.into_iter().enumerate()
        {
            let mut depends_on: Vec<_> = inputs
                .iter()
                .flat_map(|(_, input)| input.dependencies().iter().cloned())
                .collect();
            depends_on.sort();
            depends_on.dedup();
            depends_on.retain(|dependency| *dependency != urn);

            // Checked before awaiting: an output of a resource outside this
            // stack is never published and would never resolve.
            for dependency in &depends_on {
                match positions.get(dependency) {
                    Some(&earlier) if earlier < position => {}
                    _ => {
                        return Err(InfraError::DependencyOrder {
                            resource: urn.to_string(),
                            dependency: dependency.to_string(),
                        })
                    }
                }
            }
            positions.insert(urn.clone(), position);

            let mut resolved = BTreeMap::new();
            for (property, input) in inputs {
                resolved.insert(property.to_string(), input.get().await?);
            }

            resources.push(ManifestResource {
                urn,
                kind,
                name,
                physical_name,
                inputs: resolved,
                outputs,
                depends_on,
            });
        }

        info!(
            "Synthesized stack '{}' with {} resources",
            stack_name,
            resources.len()
        );

        Ok(Manifest {
            stack: stack_name,
            context: context.clone(),
            resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{Output, ResourceType};
    use serde_json::Value;
    use std::time::Duration;

    #[tokio::test]
    async fn test_inputs_resolve_against_published_outputs() {
        let mut stack = Stack::new("dev");
        let mut bucket = stack
            .register(ResourceType::Bucket, "bus-time-travel", Vec::new())
            .unwrap();
        let resource = bucket.take("arn").map(|arn| Value::String(format!("{arn}/*")));
        stack
            .register(ResourceType::Policy, "reader", vec![("policy", resource)])
            .unwrap();

        let manifest = stack
            .synthesize(&ProviderContext::default(), NamingStrategy::Exact)
            .await
            .unwrap();

        let policy = manifest.resource(ResourceType::Policy, "reader").unwrap();
        assert_eq!(
            policy.input_str("policy"),
            Some("arn:aws:s3:::bus-time-travel/*")
        );
        assert_eq!(policy.depends_on, vec![bucket.urn().clone()]);
        assert_eq!(
            policy.output("arn"),
            Some("arn:aws:iam::*:policy/reader")
        );
    }

    #[tokio::test]
    async fn test_suffixed_names_flow_into_dependents() {
        let mut stack = Stack::new("dev");
        let mut bucket = stack
            .register(ResourceType::Bucket, "bus-time-travel", Vec::new())
            .unwrap();
        let arn = bucket.take("arn").to_json();
        stack
            .register(ResourceType::Policy, "reader", vec![("policy", arn)])
            .unwrap();

        let manifest = stack
            .synthesize(&ProviderContext::default(), NamingStrategy::Suffixed)
            .await
            .unwrap();

        let bucket = manifest
            .resource(ResourceType::Bucket, "bus-time-travel")
            .unwrap();
        assert_ne!(bucket.physical_name, "bus-time-travel");
        let policy = manifest.resource(ResourceType::Policy, "reader").unwrap();
        assert_eq!(
            policy.input_str("policy"),
            bucket.output("arn")
        );
    }

    #[tokio::test]
    async fn test_dependency_on_dropped_stack_is_rejected() {
        let mut stack = Stack::new("dev");
        let mut other = Stack::new("other");
        let mut foreign = other
            .register(ResourceType::Bucket, "elsewhere", Vec::new())
            .unwrap();
        let foreign_arn = foreign.take("arn").to_json();
        drop(other);

        stack
            .register(ResourceType::Policy, "p", vec![("policy", foreign_arn)])
            .unwrap();

        let result = stack
            .synthesize(&ProviderContext::default(), NamingStrategy::Exact)
            .await;
        assert!(matches!(result, Err(InfraError::DependencyOrder { .. })));
    }

    #[tokio::test]
    async fn test_dependency_on_live_foreign_stack_fails_without_waiting() {
        let mut stack = Stack::new("dev");
        let mut other = Stack::new("other");
        let mut foreign = other
            .register(ResourceType::Bucket, "elsewhere", Vec::new())
            .unwrap();
        stack
            .register(
                ResourceType::Policy,
                "p",
                vec![("policy", foreign.take("arn").to_json())],
            )
            .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            stack.synthesize(&ProviderContext::default(), NamingStrategy::Exact),
        )
        .await
        .expect("synthesis should not wait on another stack");

        match result {
            Err(InfraError::DependencyOrder { resource, dependency }) => {
                assert_eq!(resource, "dev::aws:iam/policy:Policy::p");
                assert_eq!(dependency, foreign.urn().to_string());
            }
            unexpected => panic!("expected a dependency order error, got {unexpected:?}"),
        }
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn test_dependency_on_later_resource_is_rejected() {
        let mut stack = Stack::new("dev");
        let later = stack.urn(ResourceType::Role, "later");
        stack
            .register(
                ResourceType::Policy,
                "p",
                vec![("policy", Output::known(Value::Null).depends_on([later]))],
            )
            .unwrap();
        stack
            .register(ResourceType::Role, "later", Vec::new())
            .unwrap();

        let result = stack
            .synthesize(&ProviderContext::default(), NamingStrategy::Exact)
            .await;
        assert!(matches!(result, Err(InfraError::DependencyOrder { .. })));
    }

    #[tokio::test]
    async fn test_known_inputs_have_no_dependencies() {
        let mut stack = Stack::new("dev");
        stack
            .register(
                ResourceType::Role,
                "r",
                vec![("assumeRolePolicy", Output::known(Value::String("{}".into())))],
            )
            .unwrap();
        let manifest = stack
            .synthesize(&ProviderContext::default(), NamingStrategy::Exact)
            .await
            .unwrap();
        assert!(manifest.resources[0].depends_on.is_empty());
    }
}
