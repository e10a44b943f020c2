//! Action invoker
//!
//! Loads credentials, builds a client and submits exactly one power action.
//! The provider's response is an acknowledgment only: nothing here waits for
//! or checks the instance's resulting power state.

use tracing::{debug, info};

use crate::client::ComputeApi;
use ocipower_common::{ActionRequest, ActionResponse, ConfigLocation, OciConfig, Result};

/// Outcome of a completed invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config: OciConfig,
    pub response: ActionResponse,
}

/// Submit one action through the given API
pub async fn invoke_action<A>(api: &A, request: &ActionRequest) -> Result<ActionResponse>
where
    A: ComputeApi + ?Sized,
{
    info!("Submitting {} for {}", request.action, request.instance_id);
    let response = api.instance_action(request).await?;
    info!(
        "{} acknowledged for {} (lifecycle state {}, opc-request-id {})",
        request.action,
        request.instance_id,
        if response.instance.lifecycle_state.is_empty() {
            "unknown"
        } else {
            response.instance.lifecycle_state.as_str()
        },
        response.request_id.as_deref().unwrap_or("-"),
    );
    Ok(response)
}

/// Load credentials, connect and submit the action, in that order
///
/// `connect` is only called once the credentials loaded successfully, so a
/// configuration failure never reaches the network.
pub async fn run<A, F>(location: &ConfigLocation, connect: F, request: &ActionRequest) -> Result<Invocation>
where
    A: ComputeApi,
    F: FnOnce(&OciConfig) -> Result<A>,
{
    debug!("Loading profile {} from {:?}", location.profile, location.path);
    let config = location.load()?;
    let api = connect(&config)?;
    let response = invoke_action(&api, request).await?;
    Ok(Invocation { config, response })
}
