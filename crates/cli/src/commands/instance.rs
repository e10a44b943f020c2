//! Instance Commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::time::Duration;

use crate::client::{ClientOptions, ComputeClient};
use crate::invoker;
use crate::output::{print_info, print_item, print_success, ConfigDisplay, OutputFormat, ResponseDisplay};
use ocipower_common::{
    ActionRequest, ConfigLocation, InstanceId, InstancePowerActionDetails, PowerAction,
};

#[derive(Subcommand)]
pub enum InstanceCommands {
    /// Submit a power action for an instance
    Action {
        /// Instance OCID
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,

        /// Power action (START, STOP, RESET, SOFTSTOP, SOFTRESET, ...)
        #[arg(short, long, default_value = "RESET", value_parser = parse_action)]
        action: PowerAction,

        #[command(flatten)]
        args: ActionArgs,
    },

    /// Reset (hard power cycle) an instance
    Reset {
        /// Instance OCID
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,

        #[command(flatten)]
        args: ActionArgs,
    },
}

/// Options shared by every action command
#[derive(Args, Debug, Clone, Default)]
pub struct ActionArgs {
    /// Region to send the request to (defaults to the profile's region)
    #[arg(long)]
    pub region: Option<String>,

    /// API endpoint override, e.g. for a private endpoint
    #[arg(long, env = "OCIPOWER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout_secs: u64,

    /// Idempotency token sent as opc-retry-token
    #[arg(long)]
    pub retry_token: Option<String>,

    /// Only act if the instance's current etag matches
    #[arg(long)]
    pub if_match: Option<String>,

    /// Allow the reset to migrate the instance off a dense host (RESET/SOFTRESET only)
    #[arg(long)]
    pub allow_dense_reboot_migration: bool,

    /// Print the loaded credential profile before submitting
    #[arg(long)]
    pub show_config: bool,
}

impl ActionArgs {
    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn parse_instance_id(s: &str) -> std::result::Result<InstanceId, String> {
    InstanceId::new(s).map_err(|e| e.to_string())
}

fn parse_action(s: &str) -> std::result::Result<PowerAction, String> {
    s.parse().map_err(|e: ocipower_common::Error| e.to_string())
}

/// Build the request the flags describe
pub fn build_request(instance_id: InstanceId, action: PowerAction, args: &ActionArgs) -> Result<ActionRequest> {
    let mut request = ActionRequest::new(instance_id, action);

    if args.allow_dense_reboot_migration {
        let details = InstancePowerActionDetails::for_action(action, Some(true)).with_context(|| {
            format!("--allow-dense-reboot-migration cannot be used with {}", action)
        })?;
        request = request.with_details(details)?;
    }
    if let Some(token) = &args.retry_token {
        request = request.with_retry_token(token.clone());
    }
    if let Some(etag) = &args.if_match {
        request = request.with_if_match(etag.clone());
    }

    Ok(request)
}

pub async fn execute(cmd: InstanceCommands, location: &ConfigLocation, format: OutputFormat) -> Result<()> {
    let (instance_id, action, args) = match cmd {
        InstanceCommands::Action {
            instance_id,
            action,
            args,
        } => (instance_id, action, args),
        InstanceCommands::Reset { instance_id, args } => (instance_id, PowerAction::Reset, args),
    };

    let request = build_request(instance_id, action, &args)?;
    let options = args.client_options();

    let invocation = invoker::run(
        location,
        |config| {
            if args.show_config {
                // Printed before the client exists, so it shows even if the key is unusable
                if let Err(e) = print_item(&ConfigDisplay::from(config), format) {
                    tracing::warn!("Could not print config: {}", e);
                }
            }
            ComputeClient::new(config, options)
        },
        &request,
    )
    .await
    .with_context(|| format!("{} {} failed", request.action, request.instance_id))?;

    print_item(&ResponseDisplay::from(invocation.response), format)?;
    if format == OutputFormat::Table {
        print_success(&format!("{} accepted for {}", request.action, request.instance_id));
        print_info("The provider acknowledged the request; the instance may still be transitioning");
    }

    Ok(())
}
