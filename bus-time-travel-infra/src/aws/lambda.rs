//! Lambda functions.

use crate::archive::AssetArchive;
use crate::error::InfraResult;
use crate::stack::{Output, OutputError, ResourceType, Stack, Urn};

use super::{deferred, literal};

/// Inputs of a function.
#[derive(Debug, Clone)]
pub struct FunctionArgs {
    /// Runtime identifier, e.g. `provided.al2023` for custom runtimes.
    pub runtime: String,
    /// Entry-point symbol; custom runtimes use the executable name.
    pub handler: String,
    /// ARN of the execution role.
    pub role: Output<String>,
    pub code: AssetArchive,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub urn: Urn,
    pub id: Output<String>,
    pub arn: Output<String>,
    pub name: Output<String>,
}

impl Function {
    pub fn new(stack: &mut Stack, name: &str, args: FunctionArgs) -> InfraResult<Self> {
        let FunctionArgs {
            runtime,
            handler,
            role,
            code,
        } = args;

        // The package is read only when the stack is synthesized.
        let code = Output::from_future(async move {
            code.describe()
                .await
                .map_err(|e| OutputError::Failed(e.to_string()))
        });

        let mut outputs = stack.register(
            ResourceType::Function,
            name,
            vec![
                ("runtime", literal(&runtime)),
                ("handler", literal(&handler)),
                ("role", deferred(&role)),
                ("code", code),
            ],
        )?;
        Ok(Self {
            urn: outputs.urn().clone(),
            id: outputs.take("id"),
            arn: outputs.take("arn"),
            name: outputs.take("name"),
        })
    }
}
