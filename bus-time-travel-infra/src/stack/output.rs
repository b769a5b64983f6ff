//! Deferred resource outputs.
//!
//! An [`Output`] is a value that only becomes known once the resource that
//! produces it has been provisioned (a bucket ARN, a role name). Outputs are
//! lazy: transformations registered with [`Output::map`] run only when the
//! value is awaited, after the producing resource has been resolved by
//! [`Stack::synthesize`](super::Stack::synthesize). Every output also carries
//! the set of resources it derives from, which becomes the dependency edge
//! set of whatever resource consumes it.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use super::Urn;

/// Failure to produce a deferred value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutputError {
    /// The producing resource never published this property.
    #[error("output '{property}' of {urn} was never resolved")]
    Unresolved { urn: String, property: String },

    #[error("failed to serialize value: {0}")]
    Serialization(String),

    #[error("{0}")]
    Failed(String),
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

type SharedValue<T> = Shared<BoxFuture<'static, Result<T, OutputError>>>;

/// A lazily resolved, cloneable value produced at provisioning time.
pub struct Output<T> {
    value: SharedValue<T>,
    dependencies: BTreeSet<Urn>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A value that is already known at declaration time.
    pub fn known(value: T) -> Self {
        Self {
            value: future::ready(Ok::<T, OutputError>(value)).boxed().shared(),
            dependencies: BTreeSet::new(),
        }
    }

    /// A value computed by an arbitrary future, evaluated on first await.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, OutputError>> + Send + 'static,
    {
        Self {
            value: fut.boxed().shared(),
            dependencies: BTreeSet::new(),
        }
    }

    /// An output of `urn` that the engine fulfils through the returned sender.
    pub(crate) fn pending(urn: Urn, property: &'static str) -> (OutputSender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        let unresolved = OutputError::Unresolved {
            urn: urn.to_string(),
            property: property.to_string(),
        };
        let value = async move { rx.await.unwrap_or(Err(unresolved)) }
            .boxed()
            .shared();

        let sender = OutputSender {
            urn: urn.clone(),
            property,
            tx,
        };
        let output = Self {
            value,
            dependencies: BTreeSet::from([urn]),
        };
        (sender, output)
    }

    /// An output that fails as soon as it is awaited.
    pub(crate) fn unavailable(urn: &Urn, property: &str) -> Self {
        Self {
            value: future::ready(Err::<T, OutputError>(OutputError::Unresolved {
                urn: urn.to_string(),
                property: property.to_string(),
            }))
            .boxed()
            .shared(),
            dependencies: BTreeSet::from([urn.clone()]),
        }
    }

    /// Transform the eventual value. `f` runs only once the value is known.
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let source = self.value.clone();
        Output {
            value: async move { source.await.map(f) }.boxed().shared(),
            dependencies: self.dependencies.clone(),
        }
    }

    /// Fallible variant of [`Output::map`].
    pub fn and_then<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, OutputError> + Send + 'static,
    {
        let source = self.value.clone();
        Output {
            value: async move { source.await.and_then(f) }.boxed().shared(),
            dependencies: self.dependencies.clone(),
        }
    }

    /// Combine two outputs; the result depends on both sources.
    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let left = self.value.clone();
        let right = other.value.clone();
        let mut dependencies = self.dependencies.clone();
        dependencies.extend(other.dependencies.iter().cloned());
        Output {
            value: async move {
                let (left, right) = future::join(left, right).await;
                Ok::<_, OutputError>((left?, right?))
            }
            .boxed()
            .shared(),
            dependencies,
        }
    }

    /// Add ordering-only dependencies without changing the value.
    pub fn depends_on(mut self, urns: impl IntoIterator<Item = Urn>) -> Self {
        self.dependencies.extend(urns);
        self
    }

    pub fn dependencies(&self) -> &BTreeSet<Urn> {
        &self.dependencies
    }

    /// Wait for the value.
    ///
    /// Awaiting an output of a registered resource before the stack is
    /// synthesized never completes, since nothing has fulfilled it yet.
    pub async fn get(&self) -> Result<T, OutputError> {
        self.value.clone().await
    }
}

impl<T> Output<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    /// Render the eventual value as JSON.
    pub fn to_json(&self) -> Output<Value> {
        self.and_then(|value| Ok(serde_json::to_value(value)?))
    }
}

/// The engine side of a pending [`Output`].
pub(crate) struct OutputSender<T> {
    urn: Urn,
    property: &'static str,
    tx: oneshot::Sender<Result<T, OutputError>>,
}

impl<T> OutputSender<T> {
    pub(crate) fn property(&self) -> &'static str {
        self.property
    }

    pub(crate) fn resolve(self, value: T) {
        if self.tx.send(Ok(value)).is_err() {
            log::trace!("No consumer left for {} of {}", self.property, self.urn);
        }
    }

    pub(crate) fn reject(self, error: OutputError) {
        if self.tx.send(Err(error)).is_err() {
            log::trace!("No consumer left for {} of {}", self.property, self.urn);
        }
    }
}
