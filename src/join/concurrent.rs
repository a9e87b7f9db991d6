// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fail-fast fan-out of independent tasks

use crate::error::{KrustletError, Result};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;

/// Spawn every task and wait for them, returning the first error reported.
/// A task that panics counts as an error as soon as it dies.
///
/// Tasks still running when an error comes in are detached, not aborted: they
/// keep going until their own completion.
pub async fn until_error_concurrent(tasks: Vec<BoxFuture<'static, Result<()>>>) -> Result<()> {
    let mut handles: FuturesUnordered<JoinHandle<Result<()>>> =
        tasks.into_iter().map(tokio::spawn).collect();

    while let Some(joined) = handles.next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(KrustletError::TaskFailed(e.to_string())),
        }
    }

    Ok(())
}
