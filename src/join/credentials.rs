// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential material handed to krustlet nodes before the service starts

use crate::config::{Config, CredentialMode};
use crate::constants::paths;
use crate::error::{Result, StepContext};
use crate::nodes::{write_file, Node, NodeCommand};
use crate::providers::Provider;
use tracing::{debug, info};
use url::Url;

/// Put the credentials selected by `config` on `node`
pub async fn provision_credentials(
    node: &dyn Node,
    control_plane: &dyn Node,
    provider: &dyn Provider,
    config: &Config,
) -> Result<()> {
    match &config.credentials {
        CredentialMode::StaticKubeconfig => {
            let kubeconfig = provider
                .kubeconfig(&config.cluster_name, config.internal_kubeconfig)
                .await
                .step("failed to get kubeconfig")?;
            write_file(node, paths::KRUSTLET_KUBECONFIG, &kubeconfig)
                .await
                .step("failed to write kubeconfig")
        }
        CredentialMode::BootstrapToken { script_url } => {
            let bootstrap_conf = generate_bootstrap_kubeconfig(control_plane, script_url).await?;
            write_file(node, paths::BOOTSTRAP_KUBELET_CONF, &bootstrap_conf)
                .await
                .step("failed to write bootstrap kubeconfig")
        }
    }
}

/// Run the bootstrap script on the control plane and return the kubeconfig it generated.
///
/// Every worker runs this concurrently against the same control-plane node and
/// the script always writes the same file, so a worker can read a file another
/// worker's run is still writing. Each generated file is a valid bootstrap
/// kubeconfig for any node, which is what keeps this usable.
async fn generate_bootstrap_kubeconfig(
    control_plane: &dyn Node,
    script_url: &Url,
) -> Result<String> {
    info!("Generating bootstrap token on {}", control_plane.name());

    let script = control_plane
        .run(&NodeCommand::new(["curl", "-sSL", script_url.as_str()]))
        .await
        .step("failed to download bootstrap script")?
        .join("\n");

    let lines = control_plane
        .run(&NodeCommand::new(["bash", "-c", script.as_str()]))
        .await
        .step("failed to run bootstrap script")?;
    debug!("{}", lines.join("\n"));

    let conf = control_plane
        .run(&NodeCommand::new(["cat", paths::GENERATED_BOOTSTRAP_CONF]))
        .await
        .step("failed to read bootstrap kubeconfig")?;
    Ok(format!("{}\n", conf.join("\n")))
}
