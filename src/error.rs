// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KrustletError {
    #[error("command `{command}` failed with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("kubeconfig error: {0}")]
    KubeconfigError(String),

    #[error("Node inspection failed: {0}")]
    NodeInspect(String),

    #[error("no nodes with role {0} found")]
    NoNodesWithRole(String),

    #[error("worker task failed: {0}")]
    TaskFailed(String),

    #[error("{context}: {source}")]
    Step {
        context: String,
        #[source]
        source: Box<KrustletError>,
    },
}

impl KrustletError {
    /// The innermost error, skipping any step wrappers
    pub fn root_cause(&self) -> &KrustletError {
        match self {
            KrustletError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, KrustletError>;

/// Wraps an error with a message describing the step that failed
pub trait StepContext<T> {
    fn step(self, context: impl Into<String>) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn step(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| KrustletError::Step {
            context: context.into(),
            source: Box::new(e),
        })
    }
}
