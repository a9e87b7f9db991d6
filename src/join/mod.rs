// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Joins krustlet nodes to an existing cluster.

pub mod concurrent;
pub mod credentials;
pub mod worker;

use crate::config::{ApproverKind, Config};
use crate::constants::roles;
use crate::error::{KrustletError, Result, StepContext};
use crate::kubernetes::{create_client_from_kubeconfig, ApiApprover, CsrApprover, KubectlApprover};
use crate::nodes::{select_nodes_by_role, Node};
use crate::providers::Provider;
use crate::status::Status;
use futures::FutureExt;
use std::sync::Arc;
use tracing::{info, instrument};

pub use concurrent::until_error_concurrent;
pub use worker::WorkerJoin;

/// What an action gets to work with
#[derive(Clone)]
pub struct ActionContext {
    pub provider: Arc<dyn Provider>,
    pub config: Arc<Config>,
}

impl ActionContext {
    pub fn new(provider: Arc<dyn Provider>, config: Config) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    pub async fn nodes(&self) -> Result<Vec<Arc<dyn Node>>> {
        self.provider.list_nodes(&self.config.cluster_name).await
    }
}

/// Joins every krustlet-role node, approving its certificate through the
/// first control-plane node
#[derive(Debug, Default)]
pub struct JoinAction;

impl JoinAction {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(cluster = %ctx.config.cluster_name))]
    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let all_nodes = ctx.nodes().await?;

        let workers = select_nodes_by_role(&all_nodes, roles::KRUSTLET).await?;
        if workers.is_empty() {
            info!("No krustlet nodes to join");
            return Ok(());
        }

        let control_plane = select_nodes_by_role(&all_nodes, roles::CONTROL_PLANE)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| KrustletError::NoNodesWithRole(roles::CONTROL_PLANE.to_string()))?;

        let approver = build_approver(ctx, &control_plane).await?;
        join_workers(ctx, workers, control_plane, approver).await
    }
}

async fn build_approver(
    ctx: &ActionContext,
    control_plane: &Arc<dyn Node>,
) -> Result<Arc<dyn CsrApprover>> {
    match ctx.config.approver {
        ApproverKind::Kubectl => Ok(Arc::new(KubectlApprover::new(Arc::clone(control_plane)))),
        ApproverKind::Api => {
            let kubeconfig = ctx
                .provider
                .kubeconfig(&ctx.config.cluster_name, false)
                .await
                .step("failed to get kubeconfig")?;
            let client = create_client_from_kubeconfig(&kubeconfig).await?;
            Ok(Arc::new(ApiApprover::new(client)))
        }
    }
}

async fn join_workers(
    ctx: &ActionContext,
    workers: Vec<Arc<dyn Node>>,
    control_plane: Arc<dyn Node>,
    approver: Arc<dyn CsrApprover>,
) -> Result<()> {
    let status = Status::start("Joining krustlet nodes 🦀");

    let tasks = workers
        .into_iter()
        .map(|node| {
            WorkerJoin {
                node,
                control_plane: Arc::clone(&control_plane),
                approver: Arc::clone(&approver),
                provider: Arc::clone(&ctx.provider),
                config: Arc::clone(&ctx.config),
            }
            .run()
            .boxed()
        })
        .collect();
    until_error_concurrent(tasks).await?;

    status.success();
    Ok(())
}
