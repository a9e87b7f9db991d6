// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Nodes running as Docker containers

use crate::constants::{labels, paths, roles, API_SERVER_PORT};
use crate::error::{KrustletError, Result, StepContext};
use crate::exec::combined_output_lines;
use crate::kubernetes::kubeconfig::rewrite_server;
use crate::nodes::{select_nodes_by_role, Node, NodeCommand};
use crate::providers::Provider;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Subset of `docker inspect` output we care about
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerInspect {
    config: ContainerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerConfig {
    #[serde(default)]
    labels: Option<HashMap<String, String>>,
}

/// A node backed by a container, driven through `docker exec`
#[derive(Debug, Clone)]
pub struct DockerNode {
    name: String,
}

impl DockerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn exec_command(&self, cmd: &NodeCommand) -> Command {
        let mut docker = Command::new("docker");
        docker.arg("exec").arg("--privileged");
        if cmd.stdin.is_some() {
            docker.arg("-i");
        }
        docker.arg(&self.name).args(&cmd.args);
        docker
    }
}

#[async_trait]
impl Node for DockerNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn role(&self) -> Result<String> {
        let mut cmd = Command::new("docker");
        cmd.arg("inspect").arg(&self.name);
        let output = combined_output_lines(cmd, None)
            .await
            .step(format!("failed to inspect node {}", self.name))?;
        role_from_inspect(&output.join("\n"))
    }

    async fn run(&self, cmd: &NodeCommand) -> Result<Vec<String>> {
        debug!("Running `{}` on node {}", cmd, self.name);
        combined_output_lines(self.exec_command(cmd), cmd.stdin.as_deref()).await
    }
}

fn role_from_inspect(raw: &str) -> Result<String> {
    let containers: Vec<ContainerInspect> = serde_json::from_str(raw)
        .map_err(|e| {
            KrustletError::NodeInspect(format!("unreadable docker inspect output: {}", e))
        })?;

    containers
        .into_iter()
        .next()
        .and_then(|c| c.config.labels)
        .and_then(|mut l| l.remove(labels::ROLE))
        .ok_or_else(|| {
            KrustletError::NodeInspect(format!("container has no {} label", labels::ROLE))
        })
}

/// Provider for kind clusters whose nodes are local Docker containers
#[derive(Debug, Clone, Default)]
pub struct DockerProvider;

impl DockerProvider {
    pub fn new() -> Self {
        Self
    }

    async fn host_binding(&self, node: &str) -> Result<String> {
        let mut cmd = Command::new("docker");
        cmd.arg("port")
            .arg(node)
            .arg(format!("{}/tcp", API_SERVER_PORT));
        let lines = combined_output_lines(cmd, None)
            .await
            .step(format!("failed to get API server port of {}", node))?;
        parse_host_binding(&lines).ok_or_else(|| {
            KrustletError::KubeconfigError(format!("no host binding for API server on {}", node))
        })
    }
}

/// First host binding from `docker port`, with wildcard addresses mapped to loopback
fn parse_host_binding(lines: &[String]) -> Option<String> {
    let first = lines.iter().map(|l| l.trim()).find(|l| !l.is_empty())?;
    let (host, port) = first.rsplit_once(':')?;
    let host = match host {
        "0.0.0.0" | "" => "127.0.0.1",
        "[::]" => "[::1]",
        other => other,
    };
    Some(format!("{}:{}", host, port))
}

#[async_trait]
impl Provider for DockerProvider {
    #[instrument(skip(self))]
    async fn list_nodes(&self, cluster: &str) -> Result<Vec<Arc<dyn Node>>> {
        let mut cmd = Command::new("docker");
        cmd.args(["ps", "-a", "--format", "{{.Names}}", "--filter"])
            .arg(format!("label={}={}", labels::CLUSTER, cluster));
        let mut names = combined_output_lines(cmd, None)
            .await
            .step("failed to list nodes")?;
        names.retain(|n| !n.trim().is_empty());
        names.sort();

        debug!("Found {} nodes", names.len());
        Ok(names
            .into_iter()
            .map(|n| Arc::new(DockerNode::new(n.trim())) as Arc<dyn Node>)
            .collect())
    }

    #[instrument(skip(self))]
    async fn kubeconfig(&self, cluster: &str, internal: bool) -> Result<String> {
        let nodes = self.list_nodes(cluster).await?;
        let control_planes = select_nodes_by_role(&nodes, roles::CONTROL_PLANE).await?;
        let bootstrap = control_planes
            .first()
            .ok_or_else(|| KrustletError::NoNodesWithRole(roles::CONTROL_PLANE.to_string()))?;

        let raw = bootstrap
            .run(&NodeCommand::new(["cat", paths::ADMIN_CONF]))
            .await
            .step("failed to read admin kubeconfig")?
            .join("\n");

        // HA clusters are fronted by a load balancer
        let load_balancers = select_nodes_by_role(&nodes, roles::EXTERNAL_LOAD_BALANCER).await?;
        let endpoint = load_balancers.first().unwrap_or(bootstrap).name().to_string();

        let server = if internal {
            format!("https://{}:{}", endpoint, API_SERVER_PORT)
        } else {
            format!("https://{}", self.host_binding(&endpoint).await?)
        };
        rewrite_server(&raw, &server)
    }
}
