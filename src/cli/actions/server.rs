use crate::gateway::{self, GatewayConfig};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub gateway: GatewayConfig,
}

/// # Errors
/// Returns an error if the gateway cannot bind or fails while serving.
pub async fn execute(args: Args) -> Result<()> {
    gateway::new(args.gateway).await
}
