// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

use crate::constants::{self, csr};

/// How a krustlet node obtains its credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// Copy the cluster's admin kubeconfig to the node
    StaticKubeconfig,
    /// Run the bootstrap script on the control plane and hand the node a bootstrap kubeconfig
    BootstrapToken { script_url: Url },
}

/// Which backend checks for and approves the node's CSR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproverKind {
    /// `kubectl` executed on the control-plane node
    Kubectl,
    /// Direct calls to the API server
    Api,
}

/// Action configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub cluster_name: String,
    pub credentials: CredentialMode,
    /// Maximum number of CSR existence checks per node
    pub csr_poll_attempts: u32,
    pub csr_poll_interval: Duration,
    /// Use the in-cluster API server address when copying the static kubeconfig
    pub internal_kubeconfig: bool,
    pub approver: ApproverKind,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cluster_name = lookup("KIND_CLUSTER_NAME")
            .unwrap_or_else(|| constants::DEFAULT_CLUSTER_NAME.to_string());

        let credentials = match lookup("KRUSTLET_BOOTSTRAP_MODE").as_deref() {
            None | Some("kubeconfig") => CredentialMode::StaticKubeconfig,
            Some("bootstrap-token") => {
                let raw = lookup("KRUSTLET_BOOTSTRAP_SCRIPT_URL")
                    .unwrap_or_else(|| constants::DEFAULT_BOOTSTRAP_SCRIPT_URL.to_string());
                let script_url = Url::parse(&raw).with_context(|| {
                    format!("KRUSTLET_BOOTSTRAP_SCRIPT_URL is not a valid URL: {}", raw)
                })?;
                CredentialMode::BootstrapToken { script_url }
            }
            Some(other) => bail!(
                "KRUSTLET_BOOTSTRAP_MODE must be 'kubeconfig' or 'bootstrap-token', got '{}'",
                other
            ),
        };

        let csr_poll_attempts = match lookup("CSR_POLL_ATTEMPTS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CSR_POLL_ATTEMPTS is not a number: {}", raw))?,
            None => match credentials {
                CredentialMode::StaticKubeconfig => csr::STATIC_POLL_ATTEMPTS,
                CredentialMode::BootstrapToken { .. } => csr::BOOTSTRAP_POLL_ATTEMPTS,
            },
        };
        if csr_poll_attempts == 0 {
            bail!("CSR_POLL_ATTEMPTS must be at least 1");
        }

        let interval_secs: u64 = match lookup("CSR_POLL_INTERVAL_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CSR_POLL_INTERVAL_SECS is not a number: {}", raw))?,
            None => csr::POLL_INTERVAL_SECS,
        };

        let internal_kubeconfig: bool = match lookup("KRUSTLET_INTERNAL_KUBECONFIG") {
            Some(raw) => raw.parse().with_context(|| {
                format!("KRUSTLET_INTERNAL_KUBECONFIG is not a boolean: {}", raw)
            })?,
            None => false,
        };

        let approver = match lookup("CSR_APPROVER").as_deref() {
            None | Some("kubectl") => ApproverKind::Kubectl,
            Some("api") => ApproverKind::Api,
            Some(other) => bail!("CSR_APPROVER must be 'kubectl' or 'api', got '{}'", other),
        };

        Ok(Config {
            cluster_name,
            credentials,
            csr_poll_attempts,
            csr_poll_interval: Duration::from_secs(interval_secs),
            internal_kubeconfig,
            approver,
        })
    }
}
