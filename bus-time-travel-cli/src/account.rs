//! Account id resolution for ARN rendering.

use anyhow::{Context, Result};
use aws_sdk_sts::Client as StsClient;
use bus_time_travel_infra::stack::UNKNOWN;
use log::info;

/// Use the explicit account, ask STS when `lookup` is set, else leave it unknown.
pub async fn resolve_account(explicit: Option<String>, lookup: bool) -> Result<String> {
    if let Some(account) = explicit {
        return Ok(account);
    }
    if !lookup {
        return Ok(UNKNOWN.to_string());
    }

    // Load AWS configuration using the standard credential provider chain.
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let account = caller_account_id(&StsClient::new(&config)).await?;
    info!("Resolved account {} from caller identity", account);
    Ok(account)
}

async fn caller_account_id(client: &StsClient) -> Result<String> {
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .context("Failed to call sts:GetCallerIdentity")?;
    identity
        .account()
        .map(str::to_string)
        .context("Caller identity did not include an account id")
}
