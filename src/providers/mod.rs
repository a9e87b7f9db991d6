// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backends that materialize cluster nodes.

pub mod docker;

use crate::error::Result;
use crate::nodes::Node;
use async_trait::async_trait;
use std::sync::Arc;

pub use docker::{DockerNode, DockerProvider};

#[async_trait]
pub trait Provider: Send + Sync {
    /// All nodes belonging to `cluster`
    async fn list_nodes(&self, cluster: &str) -> Result<Vec<Arc<dyn Node>>>;

    /// Admin kubeconfig for `cluster`. With `internal` the API server address is
    /// the one reachable from inside the cluster network, otherwise from the host.
    async fn kubeconfig(&self, cluster: &str, internal: bool) -> Result<String>;
}
