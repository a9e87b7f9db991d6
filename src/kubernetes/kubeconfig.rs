// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig rewriting and client creation

use crate::error::{KrustletError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;

fn parse(kubeconfig: &str) -> Result<Kubeconfig> {
    serde_yaml::from_str(kubeconfig)
        .map_err(|e| KrustletError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}

/// Point every cluster entry of `kubeconfig` at `server`
pub fn rewrite_server(kubeconfig: &str, server: &str) -> Result<String> {
    let mut parsed = parse(kubeconfig)?;

    if parsed.clusters.is_empty() {
        return Err(KrustletError::KubeconfigError(
            "kubeconfig does not define any cluster".to_string(),
        ));
    }
    for named in parsed.clusters.iter_mut() {
        if let Some(cluster) = named.cluster.as_mut() {
            cluster.server = Some(server.to_string());
        }
    }

    serde_yaml::to_string(&parsed).map_err(|e| {
        KrustletError::KubeconfigError(format!("Failed to serialize kubeconfig: {}", e))
    })
}

/// Create a Kubernetes client from a kubeconfig string
pub async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed = parse(kubeconfig)?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                KrustletError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| KrustletError::KubeconfigError(format!("Failed to create client: {}", e)))
}
