// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Certificate signing request polling and approval

use crate::constants::paths;
use crate::error::Result;
use crate::nodes::{Node, NodeCommand};
use async_trait::async_trait;
use k8s_openapi::api::certificates::v1::{
    CertificateSigningRequest, CertificateSigningRequestCondition,
    CertificateSigningRequestStatus,
};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// Checks for and approves certificate signing requests
#[async_trait]
pub trait CsrApprover: Send + Sync {
    /// Succeeds once the CSR is visible to the API server
    async fn csr_exists(&self, name: &str) -> Result<()>;

    async fn approve(&self, name: &str) -> Result<()>;
}

/// Runs `kubectl` with the admin kubeconfig on a control-plane node
pub struct KubectlApprover {
    node: Arc<dyn Node>,
    kubeconfig: String,
}

impl KubectlApprover {
    pub fn new(node: Arc<dyn Node>) -> Self {
        Self {
            node,
            kubeconfig: paths::ADMIN_CONF.to_string(),
        }
    }

    fn kubectl(&self, args: &[&str]) -> NodeCommand {
        NodeCommand::new(
            ["kubectl", "--kubeconfig", self.kubeconfig.as_str()]
                .into_iter()
                .chain(args.iter().copied()),
        )
    }
}

#[async_trait]
impl CsrApprover for KubectlApprover {
    async fn csr_exists(&self, name: &str) -> Result<()> {
        self.node.run(&self.kubectl(&["get", "csr", name])).await?;
        Ok(())
    }

    async fn approve(&self, name: &str) -> Result<()> {
        let lines = self
            .node
            .run(&self.kubectl(&["certificate", "approve", name]))
            .await?;
        debug!("{}", lines.join("\n"));
        Ok(())
    }
}

/// Talks to the API server directly
pub struct ApiApprover {
    client: Client,
}

impl ApiApprover {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn csrs(&self) -> Api<CertificateSigningRequest> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl CsrApprover for ApiApprover {
    async fn csr_exists(&self, name: &str) -> Result<()> {
        self.csrs().get(name).await?;
        Ok(())
    }

    async fn approve(&self, name: &str) -> Result<()> {
        let approval = CertificateSigningRequestCondition {
            type_: "Approved".to_string(),
            status: "True".to_string(),
            reason: Some("KrustletJoinApprove".to_string()),
            message: Some("Approved by krustlet-join".to_string()),
            ..Default::default()
        };
        let status = CertificateSigningRequestStatus {
            conditions: Some(vec![approval]),
            ..Default::default()
        };
        let patch = Patch::Merge(serde_json::json!({ "status": status }));

        self.csrs()
            .patch_approval(name, &PatchParams::default(), &patch)
            .await?;
        info!("Approved certificate signing request {}", name);
        Ok(())
    }
}

/// Terminal states of [`wait_for_csr`]; neither is an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Found { attempts: u32 },
    Exhausted { attempts: u32 },
}

enum PollState {
    Polling { attempt: u32 },
    Done(PollOutcome),
}

/// Wait for the CSR `name` to appear, checking at most `max_attempts` times and
/// sleeping `interval` before every check. Misses are logged, never returned.
#[instrument(skip(approver, interval))]
pub async fn wait_for_csr(
    approver: &dyn CsrApprover,
    name: &str,
    max_attempts: u32,
    interval: Duration,
) -> PollOutcome {
    let max_attempts = max_attempts.max(1);
    let mut state = PollState::Polling { attempt: 1 };

    loop {
        state = match state {
            PollState::Polling { attempt } => {
                sleep(interval).await;
                match approver.csr_exists(name).await {
                    Ok(()) => PollState::Done(PollOutcome::Found { attempts: attempt }),
                    Err(e) => {
                        error!(
                            "CSR {} not found (attempt {}/{}): {}",
                            name, attempt, max_attempts, e
                        );
                        if attempt >= max_attempts {
                            PollState::Done(PollOutcome::Exhausted { attempts: attempt })
                        } else {
                            PollState::Polling {
                                attempt: attempt + 1,
                            }
                        }
                    }
                }
            }
            PollState::Done(outcome) => return outcome,
        };
    }
}
