use anyhow::Result;
use async_trait::async_trait;

use crate::db::{NotFoundError, Store};
use crate::models::*;
use crate::parsers;
use crate::utils::{ssh_run_command_async, SshTarget};

/// Runs an exec-mode command on a managed device and returns its raw output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, device: &Device, command: &str) -> Result<String>;
}

/// The device could not be reached or rejected the command
#[derive(Debug)]
pub struct DeviceCommandError {
    pub device: String,
    pub message: String,
}

impl std::fmt::Display for DeviceCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command failed on {}: {}", self.device, self.message)
    }
}

impl std::error::Error for DeviceCommandError {}

/// CommandRunner backed by an SSH session per command
pub struct SshCommandRunner {
    pub timeout_secs: u64,
}

#[async_trait]
impl CommandRunner for SshCommandRunner {
    async fn run(&self, device: &Device, command: &str) -> Result<String> {
        let target = SshTarget {
            host: device.address.clone(),
            port: device.port,
            user: device.ssh_user.clone().unwrap_or_default(),
            pass: device.ssh_pass.clone().unwrap_or_default(),
            timeout_secs: self.timeout_secs,
        };
        ssh_run_command_async(target, command)
            .await
            .map_err(|e| anyhow::anyhow!("{} on {}: {}", command, device.name, e))
    }
}

/// Turn the extracted port table into the action output, ordered by port
pub fn to_mappings(table: parsers::PortTable) -> Vec<AclMapping> {
    table
        .into_iter()
        .map(|(port, protocol)| AclMapping { port, protocol })
        .collect()
}

/// acl-alias-mapping action: ask the device which TCP port keywords it knows,
/// store them and return them.
pub async fn run(
    store: &Store,
    runner: &dyn CommandRunner,
    command: &str,
    device_name: &str,
) -> Result<AclAliasMappingResponse> {
    let device = store
        .get_device(device_name)
        .await?
        .ok_or_else(|| NotFoundError::new("Device", device_name))?;

    tracing::info!("Running '{}' on {}", command, device.name);
    let output = runner
        .run(&device, command)
        .await
        .map_err(|e| DeviceCommandError {
            device: device.name.clone(),
            message: format!("{:#}", e),
        })?;

    let mappings = to_mappings(parsers::extract(&output));
    if mappings.is_empty() {
        tracing::warn!("No port aliases found in output from {}", device.name);
    }
    store.replace_acl_mappings(&device.name, &mappings).await?;

    tracing::info!("Stored {} ACL port aliases for {}", mappings.len(), device.name);
    Ok(AclAliasMappingResponse {
        device: device.name,
        acl_mapping: mappings,
    })
}
