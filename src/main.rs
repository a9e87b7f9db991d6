// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use krustlet_join::config::Config;
use krustlet_join::join::{ActionContext, JoinAction};
use krustlet_join::providers::DockerProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: cluster={}, credentials={:?}, approver={:?}",
        config.cluster_name, config.credentials, config.approver
    );

    let ctx = ActionContext::new(Arc::new(DockerProvider::new()), config);
    JoinAction::new().execute(&ctx).await?;

    info!("All krustlet nodes joined");
    Ok(())
}
