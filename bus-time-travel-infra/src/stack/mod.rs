//! The stack: a namespace of declared resources and the deferred outputs
//! that connect them.

mod manifest;
mod naming;
pub(crate) mod output;
mod resource;
mod synth;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::{InfraError, InfraResult};
pub use manifest::{Manifest, ManifestResource};
pub use naming::NamingStrategy;
pub use output::{Output, OutputError};
use output::OutputSender;
pub use resource::{ProviderContext, ResourceType, UNKNOWN};

/// Stack-unique resource identifier: `<stack>::<type-token>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    pub fn new(stack: &str, kind: ResourceType, name: &str) -> Self {
        Self(format!("{stack}::{}::{name}", kind.token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declared resource, waiting for synthesis.
pub(crate) struct Registration {
    urn: Urn,
    kind: ResourceType,
    name: String,
    inputs: Vec<(&'static str, Output<Value>)>,
    senders: Vec<OutputSender<String>>,
}

impl Registration {
    fn dependencies(&self) -> BTreeSet<Urn> {
        self.inputs
            .iter()
            .flat_map(|(_, input)| input.dependencies().iter().cloned())
            .filter(|urn| *urn != self.urn)
            .collect()
    }
}

/// Deferred outputs handed back from [`Stack::register`].
#[derive(Debug)]
pub(crate) struct RegisteredOutputs {
    urn: Urn,
    outputs: BTreeMap<&'static str, Output<String>>,
}

impl RegisteredOutputs {
    pub(crate) fn urn(&self) -> &Urn {
        &self.urn
    }

    pub(crate) fn take(&mut self, property: &'static str) -> Output<String> {
        self.outputs
            .remove(property)
            .unwrap_or_else(|| Output::unavailable(&self.urn, property))
    }
}

/// Resources declared for one deployment, in registration order.
pub struct Stack {
    name: String,
    registrations: Vec<Registration>,
    index: HashMap<Urn, usize>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrations: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn urn(&self, kind: ResourceType, name: &str) -> Urn {
        Urn::new(&self.name, kind, name)
    }

    pub fn contains(&self, kind: ResourceType, name: &str) -> bool {
        self.index.contains_key(&self.urn(kind, name))
    }

    /// Registered URNs in declaration order.
    pub fn urns(&self) -> impl Iterator<Item = &Urn> {
        self.registrations.iter().map(|registration| &registration.urn)
    }

    /// Resources a registered resource's inputs derive from.
    pub fn dependencies_of(&self, kind: ResourceType, name: &str) -> Option<BTreeSet<Urn>> {
        self.index
            .get(&self.urn(kind, name))
            .map(|&position| self.registrations[position].dependencies())
    }

    /// Declare a resource. Logical names are unique per resource type.
    pub(crate) fn register(
        &mut self,
        kind: ResourceType,
        name: &str,
        inputs: Vec<(&'static str, Output<Value>)>,
    ) -> InfraResult<RegisteredOutputs> {
        let urn = self.urn(kind, name);
        if self.index.contains_key(&urn) {
            return Err(InfraError::duplicate(kind.token(), name));
        }

        let mut senders = Vec::new();
        let mut outputs = BTreeMap::new();
        for &property in kind.output_properties() {
            let (sender, output) = Output::pending(urn.clone(), property);
            senders.push(sender);
            outputs.insert(property, output);
        }

        debug!("Registered {} '{}' ({} inputs)", kind, name, inputs.len());

        self.index.insert(urn.clone(), self.registrations.len());
        self.registrations.push(Registration {
            urn: urn.clone(),
            kind,
            name: name.to_string(),
            inputs,
            senders,
        });

        Ok(RegisteredOutputs { urn, outputs })
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("name", &self.name)
            .field("resources", &self.urns().collect::<Vec<_>>())
            .finish()
    }
}
