// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster node abstraction and helpers shared by every provider

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A command to execute on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCommand {
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl NodeCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for NodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// A node of a cluster that commands can be executed on.
///
/// Implementations must tolerate concurrent `run` calls; every krustlet worker
/// talks to the same control-plane node at the same time.
#[async_trait]
pub trait Node: Send + Sync {
    fn name(&self) -> &str;

    /// Value of the node's role label
    async fn role(&self) -> Result<String>;

    /// Execute a command, returning its combined output lines.
    /// A non-zero exit status is an error.
    async fn run(&self, cmd: &NodeCommand) -> Result<Vec<String>>;
}

/// Nodes whose role label equals `role`, in input order
pub async fn select_nodes_by_role(
    nodes: &[Arc<dyn Node>],
    role: &str,
) -> Result<Vec<Arc<dyn Node>>> {
    let mut selected = Vec::new();
    for node in nodes {
        if node.role().await? == role {
            selected.push(Arc::clone(node));
        }
    }
    Ok(selected)
}

/// Write `contents` to `path` on `node`, creating the parent directory
pub async fn write_file(node: &dyn Node, path: &str, contents: &str) -> Result<()> {
    if let Some(dir) = Path::new(path).parent().and_then(Path::to_str) {
        if !dir.is_empty() {
            node.run(&NodeCommand::new(["mkdir", "-p", dir])).await?;
        }
    }

    node.run(&NodeCommand::new(["cp", "/dev/stdin", path]).with_stdin(contents))
        .await?;
    Ok(())
}
